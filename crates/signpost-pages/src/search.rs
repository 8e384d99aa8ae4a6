//! Search params state
//!
//! [`SearchParamsStore`] mirrors the query string of the current location as
//! [`SearchParams`]. Opening new params rewrites the query string in history
//! and keeps the path and fragment. Link clicks are followed by reading the
//! location back after the click was handled, so the params always agree
//! with history.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use signpost_urls::{RouterError, SearchParams};

use crate::history::{ClickEvent, NavigationSource};
use crate::links;
use crate::store::{Store, Subscription, Teardown};

struct Shared<H> {
	history: H,
	links: bool,
	/// Last seen query string, `?`-prefixed or empty.
	last_search: RefCell<Option<String>>,
}

impl<H: NavigationSource> Shared<H> {
	/// Records `search` as seen. Returns false if it already was.
	fn remember(&self, search: &str) -> bool {
		let mut last = self.last_search.borrow_mut();
		if last.as_deref() == Some(search) {
			tracing::trace!(search, "search unchanged");
			return false;
		}
		*last = Some(search.to_string());
		true
	}

	fn sync(&self, store: &Store<SearchParams>) {
		let search = self.history.location().search;
		if self.remember(&search) {
			store.set(SearchParams::parse(&search));
		}
	}

	/// Whether a click may move the location within this document.
	fn routable(&self, event: &dyn ClickEvent) -> bool {
		let Ok(base) = url::Url::parse(&self.history.location().href()) else {
			return false;
		};
		links::intercept(event.link(), &base).is_some()
	}
}

/// Store of the current query parameters.
///
/// ```
/// use signpost_pages::{MemoryHistory, SearchParamsStore};
/// use signpost_pages::history::NavigationSource;
/// use signpost_urls::SearchParams;
///
/// let history = MemoryHistory::new("/posts?page=1");
/// let search = SearchParamsStore::new(history.clone());
/// let _sub = search.listen(|_| {});
/// assert_eq!(search.get().get("page"), Some("1"));
///
/// search.open(&SearchParams::from([("page", "2")]), false).unwrap();
/// assert_eq!(history.location().relative(), "/posts?page=2");
/// ```
pub struct SearchParamsStore<H: NavigationSource + 'static> {
	store: Store<SearchParams>,
	shared: Rc<Shared<H>>,
}

impl<H: NavigationSource + 'static> Clone for SearchParamsStore<H> {
	fn clone(&self) -> Self {
		Self {
			store: self.store.clone(),
			shared: Rc::clone(&self.shared),
		}
	}
}

impl<H: NavigationSource + 'static> fmt::Debug for SearchParamsStore<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SearchParamsStore")
			.field("params", &self.store.get())
			.field("links", &self.shared.links)
			.finish_non_exhaustive()
	}
}

impl<H: NavigationSource + 'static> SearchParamsStore<H> {
	/// Creates a store that follows link clicks.
	pub fn new(history: H) -> Self {
		Self::with_links(history, true)
	}

	/// Creates a store, choosing whether link clicks trigger a re-read.
	pub fn with_links(history: H, links: bool) -> Self {
		let shared = Rc::new(Shared {
			history,
			links,
			last_search: RefCell::new(None),
		});

		let store = Store::new(SearchParams::new());
		store.on_mount({
			let shared = Rc::downgrade(&shared);
			move |store| mount(&shared, store)
		});

		Self { store, shared }
	}

	/// Returns the current params.
	pub fn get(&self) -> SearchParams {
		self.store.get()
	}

	/// Subscribes and immediately receives the current params.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&SearchParams) + 'static,
	{
		self.store.subscribe(listener)
	}

	/// Subscribes to changes only.
	pub fn listen<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&SearchParams) + 'static,
	{
		self.store.listen(listener)
	}

	/// Replaces the query string of the current location.
	///
	/// The new URL keeps the current path and fragment. It is pushed, or
	/// replaces the current entry when `redirect` is set. Params that
	/// serialize to the last seen query string change nothing.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Search`] if the params cannot be serialized and
	/// [`RouterError::Navigation`] if the navigation source refuses.
	pub fn open(&self, params: &SearchParams, redirect: bool) -> Result<(), RouterError> {
		let search = params.to_search()?;
		if self.shared.last_search.borrow().as_deref() == Some(search.as_str()) {
			tracing::trace!(search = %search, "search unchanged");
			return Ok(());
		}

		let location = self.shared.history.location();
		let url = format!("{}{}{}", location.pathname, search, location.hash);
		if redirect {
			self.shared.history.replace(&url)?;
		} else {
			self.shared.history.push(&url)?;
		}

		tracing::debug!(url = %url, redirect, "search params changed");
		*self.shared.last_search.borrow_mut() = Some(search);
		self.store.set(params.clone());
		Ok(())
	}

	/// Re-reads the query string from the navigation source.
	///
	/// Needed after navigations that bypass this store, such as
	/// [`Router::open`](crate::Router::open) with a query string.
	pub fn sync(&self) {
		self.shared.sync(&self.store);
	}

	/// Whether the store currently follows the navigation source.
	pub fn is_mounted(&self) -> bool {
		self.store.is_mounted()
	}
}

fn mount<H: NavigationSource + 'static>(
	shared: &Weak<Shared<H>>,
	store: &Store<SearchParams>,
) -> Option<Teardown> {
	let shared = shared.upgrade()?;
	shared.sync(store);

	let weak_shared = Rc::downgrade(&shared);
	let weak_store = store.downgrade();

	let navigate = shared.history.on_navigate(Rc::new({
		let shared = weak_shared.clone();
		let store = weak_store.clone();
		move || {
			if let (Some(shared), Some(store)) = (shared.upgrade(), store.upgrade()) {
				shared.sync(&store);
			}
		}
	}));

	// The query is read back once the router has handled the click, so a
	// link it leaves alone never updates the params.
	let click = if shared.links {
		shared.history.on_click(Rc::new({
			let shared = weak_shared.clone();
			move |event: &dyn ClickEvent| {
				if !shared.upgrade().is_some_and(|shared| shared.routable(event)) {
					return;
				}
				let shared = shared.clone();
				let store = weak_store.clone();
				event.after(Box::new(move || {
					if let (Some(shared), Some(store)) = (shared.upgrade(), store.upgrade()) {
						shared.sync(&store);
					}
				}));
			}
		}))
	} else {
		Subscription::noop()
	};
	tracing::debug!(links = shared.links, "search listeners attached");

	Some(Box::new(move || {
		drop(navigate);
		drop(click);
		if let Some(shared) = weak_shared.upgrade() {
			shared.last_search.borrow_mut().take();
		}
		tracing::debug!("search listeners detached");
	}))
}
