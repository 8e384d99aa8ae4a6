//! Signpost Pages - navigation state for client-side routing
//!
//! This crate binds a [`RouteTable`](signpost_urls::RouteTable) to a
//! navigation source and exposes the result as reactive state:
//!
//! - [`Router`] - the current [`Page`](signpost_urls::Page), or `None`
//! - [`SearchParamsStore`] - the current query parameters
//! - [`navigate`] - open or build paths by route name
//!
//! Both stores follow the navigation source only while they have
//! subscribers. The first subscriber reads the current location and attaches
//! the `popstate` and link click listeners; dropping the last
//! [`Subscription`] detaches them.
//!
//! On `wasm32` the [`BrowserHistory`] source uses the History API. Everywhere
//! else, and in tests, [`MemoryHistory`] keeps the entry stack in memory.
//!
//! ## Example
//!
//! ```
//! use signpost_pages::{MemoryHistory, Router, navigate};
//! use signpost_urls::{Params, RouteTable};
//!
//! let table = RouteTable::build([
//!     ("home", "/"),
//!     ("category", "/posts/:categoryId"),
//!     ("post", "/posts/:categoryId/:id"),
//! ])
//! .unwrap();
//! let router = Router::new(table, MemoryHistory::new("/"));
//! let _sub = router.subscribe(|_| {});
//!
//! let params = Params::from([("categoryId", "guides"), ("id", "10")]);
//! navigate::open_page(&router, "post", &params).unwrap();
//!
//! let page = router.get().unwrap();
//! assert_eq!(page.path, "/posts/guides/10");
//! assert_eq!(page.params.get("id"), Some("10"));
//! ```

#![warn(missing_docs)]

pub mod history;
pub mod links;
pub mod navigate;
pub mod router;
pub mod search;
pub mod store;

#[cfg(target_arch = "wasm32")]
pub mod browser;

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHistory;
pub use history::{ClickEvent, Location, MemoryHistory, NavigationSource};
pub use links::{LinkClick, Modifiers, intercept};
pub use navigate::{
	get_page_path, get_page_path_with_search, open_page, open_page_with_search, redirect_page,
	redirect_page_with_search,
};
pub use router::Router;
pub use search::SearchParamsStore;
pub use store::{Store, Subscription, WeakStore};
