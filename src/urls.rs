//! Route templates, matching and reverse routing
//!
//! Re-exports signpost-urls. Platform independent; available without the
//! `pages` feature.

pub use signpost_urls::*;
