//! Router - navigation state store
//!
//! A [`Router`] is a [`Store`] of `Option<Page>` bound to a
//! [`NavigationSource`]. While it has subscribers it follows the source's
//! location: back/forward navigation re-parses the location and same-origin
//! anchor clicks are routed through [`Router::open`] instead of reloading
//! the page. A link whose target matches no route is not intercepted.
//!
//! ## Example
//!
//! ```
//! use signpost_pages::{MemoryHistory, Router};
//! use signpost_urls::RouteTable;
//!
//! let table = RouteTable::build([
//!     ("home", "/"),
//!     ("post", "/posts/:categoryId/:id"),
//! ])
//! .unwrap();
//!
//! let history = MemoryHistory::new("/");
//! let router = Router::new(table, history.clone());
//!
//! let _sub = router.subscribe(|page| {
//!     println!("now at {:?}", page.as_ref().map(|p| &p.route));
//! });
//! assert_eq!(router.get().unwrap().route, "home");
//!
//! router.open("/posts/guides/10", false).unwrap();
//! assert_eq!(router.get().unwrap().route, "post");
//! assert_eq!(history.len(), 2);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use signpost_urls::{
	Matcher, Page, ParseOutcome, RouteTable, RouterConfig, RouterError, RouterOptions,
};

use crate::history::{ClickEvent, NavigationSource};
use crate::links;
use crate::store::{Store, Subscription, Teardown, WeakStore};

struct Shared<H> {
	table: Arc<RouteTable>,
	matcher: RefCell<Matcher>,
	history: H,
	options: RouterOptions,
}

impl<H: NavigationSource> Shared<H> {
	/// Runs the matcher on `path` and, on a match, records it in history.
	///
	/// Returns whether the location moved.
	fn navigate(
		&self,
		store: &Store<Option<Page>>,
		path: &str,
		redirect: bool,
	) -> Result<bool, RouterError> {
		let previous = self.matcher.borrow().last_path().map(str::to_string);
		let page = match self.matcher.borrow_mut().parse(path, self.options.search) {
			ParseOutcome::Matched(page) => page,
			outcome => {
				tracing::trace!(path, ?outcome, "navigation skipped");
				return Ok(false);
			}
		};

		let written = if redirect {
			self.history.replace(path)
		} else {
			self.history.push(path)
		};
		if let Err(err) = written {
			// Keep the memo in step with the unchanged location.
			self.matcher.borrow_mut().restore(previous);
			return Err(err);
		}
		tracing::debug!(path, route = %page.route, redirect, "navigated");
		store.set(Some(page));
		Ok(true)
	}

	/// Re-reads the current location without touching history.
	fn sync(&self, store: &Store<Option<Page>>) {
		let location = self.history.location();
		let path = if self.options.search {
			location.path_and_search()
		} else {
			location.pathname
		};

		let outcome = self.matcher.borrow_mut().parse(&path, self.options.search);
		if let ParseOutcome::Matched(page) = outcome {
			tracing::debug!(path = %path, route = %page.route, "location changed");
			store.set(Some(page));
		}
	}

	fn click(&self, store: &Store<Option<Page>>, event: &dyn ClickEvent) {
		if event.default_prevented() {
			return;
		}
		let current = self.history.location();
		let base = match url::Url::parse(&current.href()) {
			Ok(base) => base,
			Err(err) => {
				tracing::warn!(href = %current.href(), error = %err, "invalid current location");
				return;
			}
		};
		let Some(target) = links::intercept(event.link(), &base) else {
			return;
		};

		let path = links::path_and_search(&target);
		if self.matcher.borrow().peek(&path, self.options.search).is_none() {
			tracing::trace!(href = %target, "link matches no route, left to the browser");
			return;
		}

		event.prevent_default();
		let hash = links::hash(&target);
		let hash_changed = hash != current.hash;

		let navigated = match self.navigate(store, &path, false) {
			Ok(navigated) => navigated,
			Err(err) => {
				tracing::warn!(href = %target, error = %err, "link navigation failed");
				return;
			}
		};
		if !navigated && path != current.path_and_search() {
			// Same page, different query string.
			let url = format!("{}{}", path, hash);
			if let Err(err) = self.history.push(&url) {
				tracing::warn!(url = %url, error = %err, "link navigation failed");
			}
		} else if hash_changed {
			if let Err(err) = self.history.set_hash(&hash) {
				tracing::warn!(hash = %hash, error = %err, "failed to update location hash");
			}
		}
	}
}

/// Navigation state for one route table.
///
/// Clones share state. The state is `None` until a location matches.
pub struct Router<H: NavigationSource + 'static> {
	store: Store<Option<Page>>,
	shared: Rc<Shared<H>>,
}

impl<H: NavigationSource + 'static> Clone for Router<H> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			shared: Rc::clone(&self.shared),
		}
	}
}

impl<H: NavigationSource + 'static> fmt::Debug for Router<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Router")
			.field("page", &self.store.get())
			.field("routes", &self.shared.table.len())
			.field("options", &self.shared.options)
			.finish_non_exhaustive()
	}
}

impl<H: NavigationSource + 'static> Router<H> {
	/// Creates a router with default options.
	pub fn new(table: impl Into<Arc<RouteTable>>, history: H) -> Self {
		Self::with_options(table, history, RouterOptions::default())
	}

	/// Creates a router with explicit options.
	pub fn with_options(
		table: impl Into<Arc<RouteTable>>,
		history: H,
		options: RouterOptions,
	) -> Self {
		let table = table.into();
		let shared = Rc::new(Shared {
			matcher: RefCell::new(Matcher::new(Arc::clone(&table))),
			table,
			history,
			options,
		});

		let store = Store::new(None);
		store.on_mount({
			let shared = Rc::downgrade(&shared);
			move |store| mount(&shared, store)
		});

		Self { store, shared }
	}

	/// Builds the route table and options from a [`RouterConfig`].
	///
	/// # Errors
	///
	/// Returns the table build error, see [`RouteTable::build`].
	pub fn from_config(config: &RouterConfig, history: H) -> Result<Self, RouterError> {
		Ok(Self::with_options(config.build_table()?, history, config.options()))
	}

	/// Returns the current page.
	pub fn get(&self) -> Option<Page> {
		self.store.get()
	}

	/// Subscribes and immediately receives the current page.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&Option<Page>) + 'static,
	{
		self.store.subscribe(listener)
	}

	/// Subscribes to changes only.
	pub fn listen<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&Option<Page>) + 'static,
	{
		self.store.listen(listener)
	}

	/// Navigates to `path`.
	///
	/// On a match the path is pushed to history, or replaces the current entry
	/// when `redirect` is set, and the state is updated. A path that matches
	/// no route or equals the last parsed path changes nothing.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Navigation`] if the navigation source refuses
	/// the history update. The state and the path memo are left untouched in
	/// that case, so the same path can be opened again.
	pub fn open(&self, path: &str, redirect: bool) -> Result<(), RouterError> {
		self.shared.navigate(&self.store, path, redirect).map(|_| ())
	}

	/// The route table.
	pub fn routes(&self) -> &Arc<RouteTable> {
		&self.shared.table
	}

	/// Router options.
	pub fn options(&self) -> RouterOptions {
		self.shared.options
	}

	/// The navigation source.
	pub fn history(&self) -> &H {
		&self.shared.history
	}

	/// Whether the router currently follows the navigation source.
	pub fn is_mounted(&self) -> bool {
		self.store.is_mounted()
	}

	/// The path memo of the router's matcher.
	pub fn last_path(&self) -> Option<String> {
		self.shared.matcher.borrow().last_path().map(str::to_string)
	}
}

fn mount<H: NavigationSource + 'static>(
	shared: &Weak<Shared<H>>,
	store: &Store<Option<Page>>,
) -> Option<Teardown> {
	let shared = shared.upgrade()?;
	shared.sync(store);

	let weak_shared = Rc::downgrade(&shared);
	let weak_store: WeakStore<Option<Page>> = store.downgrade();

	let navigate = shared.history.on_navigate(Rc::new({
		let shared = weak_shared.clone();
		let store = weak_store.clone();
		move || {
			if let (Some(shared), Some(store)) = (shared.upgrade(), store.upgrade()) {
				shared.sync(&store);
			}
		}
	}));

	let click = if shared.options.links {
		shared.history.on_click(Rc::new({
			let shared = weak_shared.clone();
			let store = weak_store;
			move |event: &dyn ClickEvent| {
				if let (Some(shared), Some(store)) = (shared.upgrade(), store.upgrade()) {
					shared.click(&store, event);
				}
			}
		}))
	} else {
		Subscription::noop()
	};
	tracing::debug!(links = shared.options.links, "router listeners attached");

	Some(Box::new(move || {
		drop(navigate);
		drop(click);
		if let Some(shared) = weak_shared.upgrade() {
			shared.matcher.borrow_mut().reset();
		}
		tracing::debug!("router listeners detached");
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::history::MemoryHistory;
	use crate::links::LinkClick;
	use rstest::{fixture, rstest};
	use signpost_urls::Params;
	use std::cell::Cell;

	#[fixture]
	fn table() -> RouteTable {
		RouteTable::build([
			("home", "/"),
			("category", "/posts/:categoryId"),
			("post", "/posts/:categoryId/:id"),
		])
		.unwrap()
	}

	#[rstest]
	fn test_idle_until_subscribed(table: RouteTable) {
		let router = Router::new(table, MemoryHistory::new("/posts/guides"));
		assert_eq!(router.get(), None);
		assert!(!router.is_mounted());

		let _sub = router.listen(|_| {});
		assert_eq!(router.get().unwrap().route, "category");
	}

	#[rstest]
	fn test_open_pushes_and_updates(table: RouteTable) {
		let history = MemoryHistory::new("/");
		let router = Router::new(table, history.clone());
		let _sub = router.listen(|_| {});

		router.open("/posts/guides/10", false).unwrap();
		let page = router.get().unwrap();
		assert_eq!(page.route, "post");
		assert_eq!(page.params, Params::from([("categoryId", "guides"), ("id", "10")]));
		assert_eq!(history.len(), 2);
		assert_eq!(history.location().pathname, "/posts/guides/10");
	}

	#[rstest]
	fn test_redirect_replaces(table: RouteTable) {
		let history = MemoryHistory::new("/");
		let router = Router::new(table, history.clone());

		router.open("/posts/guides", true).unwrap();
		assert_eq!(history.len(), 1);
		assert_eq!(history.location().pathname, "/posts/guides");
		assert_eq!(router.get().unwrap().route, "category");
	}

	#[rstest]
	fn test_unmatched_open_changes_nothing(table: RouteTable) {
		let history = MemoryHistory::new("/");
		let router = Router::new(table, history.clone());
		let _sub = router.listen(|_| {});

		router.open("/nowhere/at/all/here", false).unwrap();
		assert_eq!(history.len(), 1);
		assert_eq!(router.get().unwrap().route, "home");
	}

	#[rstest]
	fn test_open_same_path_twice_is_one_transition(table: RouteTable) {
		let history = MemoryHistory::new("/");
		let router = Router::new(table, history.clone());
		let transitions = Rc::new(Cell::new(0));
		let _sub = router.listen({
			let transitions = Rc::clone(&transitions);
			move |_| transitions.set(transitions.get() + 1)
		});

		router.open("/posts/guides", false).unwrap();
		router.open("/posts/guides/", false).unwrap();
		assert_eq!(transitions.get(), 1);
		assert_eq!(history.len(), 2);
	}

	#[rstest]
	fn test_back_button_resyncs(table: RouteTable) {
		let history = MemoryHistory::new("/");
		let router = Router::new(table, history.clone());
		let _sub = router.listen(|_| {});

		router.open("/posts/guides", false).unwrap();
		history.back();
		assert_eq!(router.get().unwrap().route, "home");
		assert_eq!(history.len(), 2);

		history.forward();
		assert_eq!(router.get().unwrap().route, "category");
	}

	#[rstest]
	fn test_listeners_detached_on_last_unsubscribe(table: RouteTable) {
		let history = MemoryHistory::new("/");
		let router = Router::new(table, history.clone());

		let a = router.listen(|_| {});
		let b = router.subscribe(|_| {});
		assert_eq!(history.navigate_listener_count(), 1);
		assert_eq!(history.click_listener_count(), 1);

		drop(a);
		assert_eq!(history.navigate_listener_count(), 1);

		drop(b);
		assert_eq!(history.navigate_listener_count(), 0);
		assert_eq!(history.click_listener_count(), 0);
		assert_eq!(router.last_path(), None);
	}

	#[rstest]
	fn test_links_disabled(table: RouteTable) {
		let history = MemoryHistory::new("/");
		let router = Router::with_options(
			table,
			history.clone(),
			RouterOptions::default().with_links(false),
		);
		let _sub = router.listen(|_| {});
		assert_eq!(history.click_listener_count(), 0);
	}

	#[rstest]
	fn test_link_click_routed(table: RouteTable) {
		let history = MemoryHistory::new("/");
		let router = Router::new(table, history.clone());
		let _sub = router.listen(|_| {});

		let prevented = history.click(LinkClick::new("/posts/guides/10"));
		assert!(prevented);
		assert_eq!(router.get().unwrap().route, "post");
		assert_eq!(history.location().pathname, "/posts/guides/10");
	}

	#[rstest]
	fn test_link_click_sets_hash(table: RouteTable) {
		let history = MemoryHistory::new("/");
		let router = Router::new(table, history.clone());
		let _sub = router.listen(|_| {});

		history.click(LinkClick::new("/posts/guides#comments"));
		assert_eq!(history.location().relative(), "/posts/guides#comments");
		assert_eq!(history.len(), 3);

		history.back();
		assert_eq!(history.location().relative(), "/posts/guides");
	}

	#[rstest]
	fn test_unmatched_link_left_to_browser(table: RouteTable) {
		let history = MemoryHistory::new("/");
		let router = Router::new(table, history.clone());
		let _sub = router.listen(|_| {});

		let prevented = history.click(LinkClick::new("/nowhere/at/all/here#top"));

		assert!(!prevented);
		assert_eq!(history.location().relative(), "/");
		assert_eq!(history.len(), 1);
		assert_eq!(router.get().unwrap().route, "home");
	}

	#[rstest]
	fn test_query_only_link_moves_location(table: RouteTable) {
		let history = MemoryHistory::new("/posts/guides");
		let router = Router::new(table, history.clone());
		let transitions = Rc::new(Cell::new(0));
		let _sub = router.listen({
			let transitions = Rc::clone(&transitions);
			move |_| transitions.set(transitions.get() + 1)
		});

		assert!(history.click(LinkClick::new("/posts/guides?page=2")));
		assert_eq!(history.location().relative(), "/posts/guides?page=2");
		assert_eq!(history.len(), 2);

		assert!(history.click(LinkClick::new("?page=3#top")));
		assert_eq!(history.location().relative(), "/posts/guides?page=3#top");
		assert_eq!(history.len(), 3);
		assert_eq!(transitions.get(), 0);
	}

	#[rstest]
	fn test_redirect_from_listener_reaches_every_subscriber() {
		let table = RouteTable::build([("home", "/"), ("admin", "/admin"), ("login", "/login")])
			.unwrap();
		let history = MemoryHistory::new("/");
		let router = Router::new(table, history.clone());
		let _guard = router.listen({
			let router = router.clone();
			move |page: &Option<Page>| {
				if page.as_ref().is_some_and(|p| p.route == "admin") {
					router.open("/login", true).unwrap();
				}
			}
		});
		let seen = Rc::new(RefCell::new(Vec::new()));
		let _sub = router.listen({
			let seen = Rc::clone(&seen);
			move |page: &Option<Page>| seen.borrow_mut().push(page.as_ref().map(|p| p.route.clone()))
		});

		router.open("/admin", false).unwrap();

		assert_eq!(router.get().unwrap().route, "login");
		assert_eq!(
			*seen.borrow(),
			vec![Some("admin".to_string()), Some("login".to_string())]
		);
		assert_eq!(history.location().pathname, "/login");
		assert_eq!(history.len(), 2);
	}

	/// Memory history whose writes can be switched to fail.
	#[derive(Clone)]
	struct FlakyHistory {
		inner: MemoryHistory,
		fail: Rc<Cell<bool>>,
	}

	impl FlakyHistory {
		fn check(&self) -> Result<(), RouterError> {
			if self.fail.get() {
				return Err(RouterError::Navigation("history write refused".to_string()));
			}
			Ok(())
		}
	}

	impl NavigationSource for FlakyHistory {
		fn location(&self) -> crate::history::Location {
			self.inner.location()
		}

		fn push(&self, url: &str) -> Result<(), RouterError> {
			self.check()?;
			self.inner.push(url)
		}

		fn replace(&self, url: &str) -> Result<(), RouterError> {
			self.check()?;
			self.inner.replace(url)
		}

		fn on_navigate(&self, callback: crate::history::NavigateCallback) -> Subscription {
			self.inner.on_navigate(callback)
		}
	}

	#[rstest]
	fn test_failed_history_write_can_be_retried(table: RouteTable) {
		let history = FlakyHistory {
			inner: MemoryHistory::new("/"),
			fail: Rc::new(Cell::new(true)),
		};
		let router = Router::new(table, history.clone());
		let _sub = router.listen(|_| {});

		assert!(router.open("/posts/guides/10", false).is_err());
		assert_eq!(router.get().unwrap().route, "home");
		assert_eq!(router.last_path().as_deref(), Some("/"));

		history.fail.set(false);
		router.open("/posts/guides/10", false).unwrap();
		assert_eq!(router.get().unwrap().route, "post");
		assert_eq!(history.inner.len(), 2);
	}

	#[rstest]
	fn test_search_option_matches_query() {
		let table = RouteTable::builder()
			.custom(
				"search",
				signpost_urls::Regex::new(r"^/find\?q=(\w+)$").unwrap(),
				|groups| Params::from([("q", groups[0].unwrap_or_default())]),
			)
			.build()
			.unwrap();
		let router = Router::with_options(
			table,
			MemoryHistory::new("/find?q=rust"),
			RouterOptions::default().with_search(true),
		);
		let _sub = router.listen(|_| {});
		assert_eq!(router.get().unwrap().params.get("q"), Some("rust"));
	}

	#[rstest]
	fn test_from_config() {
		let config = RouterConfig::from_toml_str(
			r#"
links = false

[[routes]]
name = "home"
path = "/"
"#,
		)
		.unwrap();
		let router = Router::from_config(&config, MemoryHistory::new("/")).unwrap();
		assert!(!router.options().links);
		assert!(router.routes().has_route("home"));
	}
}
