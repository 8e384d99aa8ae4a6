//! Navigation by route name.
//!
//! Thin wrappers combining reverse routing with [`Router::open`].

use signpost_urls::{Params, RouterError, SearchParams, build_path, build_path_with_search};

use crate::history::NavigationSource;
use crate::router::Router;

/// Builds the path of route `name` in `router`'s table.
///
/// # Errors
///
/// See [`build_path`].
pub fn get_page_path<H: NavigationSource + 'static>(
	router: &Router<H>,
	name: &str,
	params: &Params,
) -> Result<String, RouterError> {
	build_path(router.routes(), name, params)
}

/// Builds the path of route `name` followed by a query string.
///
/// # Errors
///
/// See [`build_path_with_search`].
pub fn get_page_path_with_search<H: NavigationSource + 'static>(
	router: &Router<H>,
	name: &str,
	params: &Params,
	search: &SearchParams,
) -> Result<String, RouterError> {
	build_path_with_search(router.routes(), name, params, search)
}

/// Opens route `name`, adding a history entry.
pub fn open_page<H: NavigationSource + 'static>(
	router: &Router<H>,
	name: &str,
	params: &Params,
) -> Result<(), RouterError> {
	let path = get_page_path(router, name, params)?;
	router.open(&path, false)
}

/// Opens route `name`, replacing the current history entry.
pub fn redirect_page<H: NavigationSource + 'static>(
	router: &Router<H>,
	name: &str,
	params: &Params,
) -> Result<(), RouterError> {
	let path = get_page_path(router, name, params)?;
	router.open(&path, true)
}

/// Opens route `name` with a query string, adding a history entry.
///
/// Unless the router matches on the query string, a change of query alone is
/// an unchanged path and does not navigate. Use
/// [`SearchParamsStore::open`](crate::SearchParamsStore::open) for that.
pub fn open_page_with_search<H: NavigationSource + 'static>(
	router: &Router<H>,
	name: &str,
	params: &Params,
	search: &SearchParams,
) -> Result<(), RouterError> {
	let path = get_page_path_with_search(router, name, params, search)?;
	router.open(&path, false)
}

/// Opens route `name` with a query string, replacing the current entry.
pub fn redirect_page_with_search<H: NavigationSource + 'static>(
	router: &Router<H>,
	name: &str,
	params: &Params,
	search: &SearchParams,
) -> Result<(), RouterError> {
	let path = get_page_path_with_search(router, name, params, search)?;
	router.open(&path, true)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::history::MemoryHistory;
	use rstest::{fixture, rstest};
	use signpost_urls::{Regex, RouteTable};

	#[fixture]
	fn router() -> Router<MemoryHistory> {
		let table = RouteTable::builder()
			.route("home", "/")
			.route("post", "/posts/:categoryId/:id")
			.custom("file", Regex::new(r"^/files/(.+)$").unwrap(), |groups| {
				Params::from([("path", groups[0].unwrap_or_default())])
			})
			.build()
			.unwrap();
		Router::new(table, MemoryHistory::new("/"))
	}

	#[rstest]
	fn test_get_page_path(router: Router<MemoryHistory>) {
		let params = Params::from([("categoryId", "guides"), ("id", "10")]);
		assert_eq!(get_page_path(&router, "post", &params).unwrap(), "/posts/guides/10");
	}

	#[rstest]
	fn test_get_page_path_with_search(router: Router<MemoryHistory>) {
		let params = Params::from([("categoryId", "guides"), ("id", "10")]);
		let search = SearchParams::from([("highlight", "intro")]);
		assert_eq!(
			get_page_path_with_search(&router, "post", &params, &search).unwrap(),
			"/posts/guides/10?highlight=intro"
		);
	}

	#[rstest]
	fn test_open_page(router: Router<MemoryHistory>) {
		let params = Params::from([("categoryId", "guides"), ("id", "10")]);
		open_page(&router, "post", &params).unwrap();
		assert_eq!(router.get().unwrap().route, "post");
		assert_eq!(router.history().len(), 2);
	}

	#[rstest]
	fn test_redirect_page(router: Router<MemoryHistory>) {
		let params = Params::from([("categoryId", "guides"), ("id", "10")]);
		redirect_page(&router, "post", &params).unwrap();
		assert_eq!(router.history().len(), 1);
		assert_eq!(router.history().location().pathname, "/posts/guides/10");
	}

	#[rstest]
	fn test_open_page_with_search(router: Router<MemoryHistory>) {
		let params = Params::from([("categoryId", "guides"), ("id", "10")]);
		let search = SearchParams::from([("page", "2")]);
		open_page_with_search(&router, "post", &params, &search).unwrap();
		assert_eq!(
			router.history().location().path_and_search(),
			"/posts/guides/10?page=2"
		);
		assert_eq!(router.get().unwrap().path, "/posts/guides/10");
	}

	#[rstest]
	fn test_redirect_page_with_search(router: Router<MemoryHistory>) {
		let search = SearchParams::from([("page", "2")]);
		redirect_page_with_search(&router, "home", &Params::new(), &search).unwrap();
		assert_eq!(router.history().len(), 1);
		assert_eq!(router.history().location().relative(), "/?page=2");
	}

	#[rstest]
	#[case("nonexistent", RouterError::UnknownRoute("nonexistent".to_string()))]
	#[case("file", RouterError::NoTemplate("file".to_string()))]
	fn test_open_page_errors(
		router: Router<MemoryHistory>,
		#[case] name: &str,
		#[case] expected: RouterError,
	) {
		assert_eq!(open_page(&router, name, &Params::new()).unwrap_err(), expected);
		assert_eq!(router.history().len(), 1);
	}

	#[rstest]
	fn test_missing_parameter(router: Router<MemoryHistory>) {
		let err = get_page_path(&router, "post", &Params::from([("id", "10")])).unwrap_err();
		assert_eq!(
			err,
			RouterError::MissingParameter {
				route: "post".to_string(),
				param: "categoryId".to_string(),
			}
		);
	}
}
