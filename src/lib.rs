//! # Signpost
//!
//! A client-side URL router. Routes are declared as an ordered list of named
//! path templates; the router parses the current location into a typed
//! [`Page`] and builds paths back from route names.
//!
//! ## Crates
//!
//! - [`urls`] - template compiler, route table, matcher and path builder
//! - [`pages`] - navigation state stores, history sources and link
//!   interception (feature `pages`, enabled by default)
//!
//! ## Feature Flags
//!
//! - `pages` (default) - reactive navigation state on top of [`urls`]
//!
//! ## Quick Example
//!
//! ```
//! use signpost::prelude::*;
//!
//! let routes = RouteTable::build([
//!     ("home", "/"),
//!     ("category", "/posts/:categoryId"),
//!     ("post", "/posts/:categoryId/:id"),
//! ])
//! .unwrap();
//!
//! let router = Router::new(routes, MemoryHistory::new("/posts/guides/10"));
//! let _sub = router.subscribe(|page| {
//!     if let Some(page) = page {
//!         println!("{} {:?}", page.route, page.params);
//!     }
//! });
//!
//! let page = router.get().unwrap();
//! assert_eq!(page.route, "post");
//! assert_eq!(page.param::<u32>("id").unwrap(), 10);
//!
//! let path = get_page_path(&router, "category", &Params::from([("categoryId", "news")]));
//! assert_eq!(path.unwrap(), "/posts/news");
//! ```

#[cfg(feature = "pages")]
pub mod pages;
pub mod urls;

pub use signpost_urls::{
	Matcher, Page, ParseOutcome, Params, RouteEntry, RouteTable, RouterConfig, RouterError,
	RouterOptions, SearchParams, build_path,
};

#[cfg(feature = "pages")]
pub use signpost_pages::{MemoryHistory, NavigationSource, Router, SearchParamsStore};

#[cfg(all(feature = "pages", target_arch = "wasm32"))]
pub use signpost_pages::BrowserHistory;

/// Commonly used types.
pub mod prelude {
	pub use signpost_urls::{
		FromParam, Page, ParseOutcome, Params, RouteEntry, RouteTable, RouterConfig, RouterError,
		RouterOptions, SearchParams, build_path, build_path_with_search,
	};

	#[cfg(feature = "pages")]
	pub use signpost_pages::{
		LinkClick, MemoryHistory, NavigationSource, Router, SearchParamsStore, Subscription,
		get_page_path, get_page_path_with_search, open_page, open_page_with_search, redirect_page,
		redirect_page_with_search,
	};

	#[cfg(all(feature = "pages", target_arch = "wasm32"))]
	pub use signpost_pages::BrowserHistory;
}
