//! Signpost URLs - route compilation, matching and reverse routing
//!
//! This crate is the platform independent half of Signpost. It turns an ordered
//! set of named route templates into a [`RouteTable`], parses paths into
//! [`Page`] values and builds paths back from route names.
//!
//! ## Template syntax
//!
//! - `/posts` - literal, matched case-insensitively
//! - `/posts/:id` - required segment, captured as `id`
//! - `/posts/:tag?` - optional segment; `tag` is absent when omitted
//!
//! Trailing slashes are insignificant: `/posts/` and `/posts` are the same
//! route and the same path.
//!
//! ## Example
//!
//! ```
//! use signpost_urls::{Matcher, ParseOutcome, Params, RouteTable};
//! use std::sync::Arc;
//!
//! let table = Arc::new(
//!     RouteTable::build([
//!         ("home", "/"),
//!         ("category", "/posts/:categoryId"),
//!         ("post", "/posts/:categoryId/:id"),
//!     ])
//!     .unwrap(),
//! );
//!
//! let mut matcher = Matcher::new(Arc::clone(&table));
//! let ParseOutcome::Matched(page) = matcher.parse("/posts/guides/10", false) else {
//!     panic!("expected a match");
//! };
//! assert_eq!(page.route, "post");
//! assert_eq!(page.params, Params::from([("categoryId", "guides"), ("id", "10")]));
//!
//! let path = table.reverse("post", &page.params).unwrap();
//! assert_eq!(path, "/posts/guides/10");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod matcher;
pub mod page;
pub mod params;
pub mod path;
pub mod pattern;
pub mod query;
pub mod reverse;
pub mod route;

pub use config::{RouteConfig, RouterConfig, RouterOptions};
pub use error::{ParamError, PatternError, RouterError};
pub use matcher::{Matcher, ParseOutcome};
pub use page::Page;
pub use params::{FromParam, Params};
pub use pattern::{RoutePattern, Segment};
pub use query::SearchParams;
pub use regex::Regex;
pub use reverse::{build_path, build_path_with_search};
pub use route::{CompiledRoute, Decoder, RouteEntry, RouteTable, RouteTableBuilder};
