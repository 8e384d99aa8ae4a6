//! Reverse routing: route name and parameters to a concrete path.

use crate::error::RouterError;
use crate::params::Params;
use crate::pattern::{RoutePattern, Segment};
use crate::query::SearchParams;
use crate::route::RouteTable;

/// Fills a compiled template with parameter values.
///
/// Optional markers are dropped when their value is absent or empty.
/// Required markers must have a value.
fn fill(route: &str, pattern: &RoutePattern, params: &Params) -> Result<String, RouterError> {
	let mut path = String::with_capacity(pattern.template().len());

	for segment in pattern.segments() {
		match segment {
			Segment::Literal(text) => path.push_str(text),
			Segment::Param { name, optional } => match params.get(name) {
				Some(value) if !value.is_empty() => {
					path.push('/');
					path.push_str(&urlencoding::encode(value));
				}
				_ if *optional => {}
				_ => {
					tracing::warn!(route, param = %name, "missing required parameter");
					return Err(RouterError::MissingParameter {
						route: route.to_string(),
						param: name.clone(),
					});
				}
			},
		}
	}

	if path.is_empty() {
		path.push('/');
	}
	Ok(path)
}

/// Builds the path for route `name`.
///
/// # Errors
///
/// - [`RouterError::UnknownRoute`] if no route has that name
/// - [`RouterError::NoTemplate`] if the route uses a custom matcher
/// - [`RouterError::MissingParameter`] if a required parameter is absent
///
/// # Example
///
/// ```
/// use signpost_urls::{Params, RouteTable, build_path};
///
/// let table = RouteTable::build([("post", "/posts/:categoryId/:id")]).unwrap();
/// let path = build_path(&table, "post", &Params::from([("categoryId", "guides"), ("id", "10")]));
/// assert_eq!(path.unwrap(), "/posts/guides/10");
/// ```
pub fn build_path(table: &RouteTable, name: &str, params: &Params) -> Result<String, RouterError> {
	let route = table
		.get(name)
		.ok_or_else(|| RouterError::UnknownRoute(name.to_string()))?;

	let pattern = route.pattern().ok_or_else(|| {
		tracing::warn!(route = name, "reverse lookup on a custom matcher route");
		RouterError::NoTemplate(name.to_string())
	})?;

	fill(name, pattern, params)
}

/// Builds the path for route `name` and appends `search` as a query string.
pub fn build_path_with_search(
	table: &RouteTable,
	name: &str,
	params: &Params,
	search: &SearchParams,
) -> Result<String, RouterError> {
	let mut path = build_path(table, name, params)?;
	path.push_str(&search.to_search()?);
	Ok(path)
}

impl RouteTable {
	/// Generates a path by route name. See [`build_path`].
	pub fn reverse(&self, name: &str, params: &Params) -> Result<String, RouterError> {
		build_path(self, name, params)
	}
}
