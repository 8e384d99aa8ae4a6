//! Reactive navigation state bound to the History API
//!
//! This module provides access to signpost-pages:
//!
//! - **Router**: current page as a store with a mount lifecycle
//! - **Search params**: current query string as a store
//! - **Navigation sources**: `MemoryHistory` everywhere, `BrowserHistory` on WASM
//! - **Link interception**: same-origin anchor clicks routed without reloads
//!
//! ## Example
//!
//! ```
//! use signpost::pages::{MemoryHistory, Router};
//! use signpost::urls::RouteTable;
//!
//! let table = RouteTable::build([("home", "/"), ("post", "/posts/:id")]).unwrap();
//! let router = Router::new(table, MemoryHistory::new("/posts/7"));
//!
//! let _sub = router.subscribe(|_| {});
//! assert_eq!(router.get().unwrap().params.get("id"), Some("7"));
//! ```

// Re-export all signpost-pages functionality
pub use signpost_pages::*;
