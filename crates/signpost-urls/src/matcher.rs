//! Stateful path matching with duplicate suppression.

use std::sync::Arc;

use crate::page::Page;
use crate::path::{normalize_location, strip_fragment, strip_query};
use crate::route::RouteTable;

/// Result of [`Matcher::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
	/// A route matched.
	Matched(Page),
	/// No route matched the path.
	NoMatch,
	/// The path equals the last parsed path; nothing to update.
	Unchanged,
}

impl ParseOutcome {
	/// Returns the page for a match.
	pub fn into_page(self) -> Option<Page> {
		match self {
			Self::Matched(page) => Some(page),
			Self::NoMatch | Self::Unchanged => None,
		}
	}

	/// Returns whether this outcome is [`ParseOutcome::Unchanged`].
	pub fn is_unchanged(&self) -> bool {
		matches!(self, Self::Unchanged)
	}
}

/// Scans a [`RouteTable`] and remembers the last parsed path.
///
/// The memo only suppresses re-parsing the same normalized path. Each
/// matcher owns its memo, so independent routers never share it.
#[derive(Debug, Clone)]
pub struct Matcher {
	table: Arc<RouteTable>,
	last_path: Option<String>,
}

impl Matcher {
	/// Creates a matcher over `table` with an empty memo.
	pub fn new(table: Arc<RouteTable>) -> Self {
		Self {
			table,
			last_path: None,
		}
	}

	/// Returns the route table.
	pub fn table(&self) -> &Arc<RouteTable> {
		&self.table
	}

	/// Returns the memoized path.
	pub fn last_path(&self) -> Option<&str> {
		self.last_path.as_deref()
	}

	/// Clears the memo so the next parse is never treated as a duplicate.
	pub fn reset(&mut self) {
		self.last_path = None;
	}

	/// Puts back a memo previously read with [`Matcher::last_path`].
	pub fn restore(&mut self, last_path: Option<String>) {
		self.last_path = last_path;
	}

	/// Matches a location without reading or updating the memo.
	pub fn peek(&self, path: &str, include_query: bool) -> Option<Page> {
		self.table.match_normalized(&key(path, include_query))
	}

	/// Parses a location.
	///
	/// When `include_query` is false everything from the first `?` is dropped
	/// before matching. The fragment is always dropped. The trailing slash is
	/// normalized the same way templates are.
	pub fn parse(&mut self, path: &str, include_query: bool) -> ParseOutcome {
		let path = key(path, include_query);

		if self.last_path.as_deref() == Some(path.as_str()) {
			tracing::trace!(path = %path, "path unchanged since last parse");
			return ParseOutcome::Unchanged;
		}
		self.last_path = Some(path.clone());

		match self.table.match_normalized(&path) {
			Some(page) => {
				tracing::trace!(path = %page.path, route = %page.route, "matched route");
				ParseOutcome::Matched(page)
			}
			None => {
				tracing::trace!(path = %path, "no route matched");
				ParseOutcome::NoMatch
			}
		}
	}
}

fn key(path: &str, include_query: bool) -> String {
	let path = strip_fragment(path);
	if include_query {
		normalize_location(path)
	} else {
		normalize_location(strip_query(path))
	}
}
