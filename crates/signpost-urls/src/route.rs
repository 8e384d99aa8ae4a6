//! Route table construction.
//!
//! Routes are declared in priority order. A route is either a template
//! string, compiled by [`RoutePattern`], or a custom regex with its own
//! decoder. The table keeps declaration order: the first route whose
//! matcher accepts a path wins.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::error::RouterError;
use crate::page::Page;
use crate::params::Params;
use crate::path::normalize;
use crate::pattern::RoutePattern;

/// Decoder turning positional capture groups into named parameters.
///
/// The slice holds one entry per capture group of the matcher, `None` for
/// groups that did not participate in the match.
pub type Decoder = Arc<dyn Fn(&[Option<&str>]) -> Params + Send + Sync>;

/// A route as declared by the caller, before compilation.
#[derive(Clone)]
pub enum RouteEntry {
	/// A path template such as `/posts/:id`.
	Template(String),
	/// A prebuilt matcher and decoder. Reverse lookup is not available.
	Custom {
		/// Matcher applied to the normalized path.
		matcher: Regex,
		/// Decoder for the matcher's capture groups.
		decoder: Decoder,
	},
}

impl RouteEntry {
	/// Creates a template entry.
	pub fn template(template: impl Into<String>) -> Self {
		Self::Template(template.into())
	}

	/// Creates a custom entry.
	pub fn custom<F>(matcher: Regex, decoder: F) -> Self
	where
		F: Fn(&[Option<&str>]) -> Params + Send + Sync + 'static,
	{
		Self::Custom {
			matcher,
			decoder: Arc::new(decoder),
		}
	}
}

impl std::fmt::Debug for RouteEntry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
			Self::Custom { matcher, .. } => f
				.debug_struct("Custom")
				.field("matcher", &matcher.as_str())
				.finish_non_exhaustive(),
		}
	}
}

impl From<&str> for RouteEntry {
	fn from(template: &str) -> Self {
		Self::template(template)
	}
}

impl From<String> for RouteEntry {
	fn from(template: String) -> Self {
		Self::Template(template)
	}
}

/// How a compiled route decodes its captures.
#[derive(Clone)]
enum RouteKind {
	Template(RoutePattern),
	Custom { matcher: Regex, decoder: Decoder },
}

/// A compiled route: name, matcher, decoder and, for template routes, the
/// template used for reverse lookups.
#[derive(Clone)]
pub struct CompiledRoute {
	name: String,
	kind: RouteKind,
}

impl std::fmt::Debug for CompiledRoute {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CompiledRoute")
			.field("name", &self.name)
			.field("matcher", &self.matcher().as_str())
			.field("template", &self.template())
			.finish()
	}
}

impl CompiledRoute {
	/// Compiles a route entry.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Pattern`] if a template fails to compile.
	pub fn compile(name: impl Into<String>, entry: RouteEntry) -> Result<Self, RouterError> {
		let name = name.into();
		let kind = match entry {
			RouteEntry::Template(template) => {
				let pattern = RoutePattern::new(&template).map_err(|source| RouterError::Pattern {
					route: name.clone(),
					source,
				})?;
				RouteKind::Template(pattern)
			}
			RouteEntry::Custom { matcher, decoder } => RouteKind::Custom { matcher, decoder },
		};
		Ok(Self { name, kind })
	}

	/// Returns the route name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the regex the route matches paths with.
	pub fn matcher(&self) -> &Regex {
		match &self.kind {
			RouteKind::Template(pattern) => pattern.regex(),
			RouteKind::Custom { matcher, .. } => matcher,
		}
	}

	/// Returns the template for string routes, `None` for custom routes.
	pub fn template(&self) -> Option<&str> {
		self.pattern().map(RoutePattern::template)
	}

	/// Returns the compiled template for string routes.
	pub fn pattern(&self) -> Option<&RoutePattern> {
		match &self.kind {
			RouteKind::Template(pattern) => Some(pattern),
			RouteKind::Custom { .. } => None,
		}
	}

	/// Runs the route's decoder over positional capture groups.
	pub fn decode(&self, groups: &[Option<&str>]) -> Params {
		match &self.kind {
			RouteKind::Template(pattern) => pattern.decode(groups),
			RouteKind::Custom { decoder, .. } => decoder(groups),
		}
	}

	/// Matches a normalized path, returning the decoded parameters.
	pub fn matches(&self, path: &str) -> Option<Params> {
		let caps = self.matcher().captures(path)?;
		let groups: Vec<Option<&str>> = caps
			.iter()
			.skip(1)
			.map(|m| m.map(|m| m.as_str()))
			.collect();
		Some(self.decode(&groups))
	}
}

/// Ordered collection of compiled routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
	/// Routes in declaration order.
	routes: Vec<CompiledRoute>,
	/// Route name to index in `routes`.
	named_routes: HashMap<String, usize>,
}

impl RouteTable {
	/// Builds a table from `(name, entry)` pairs, preserving their order.
	///
	/// # Errors
	///
	/// Returns [`RouterError::DuplicateRoute`] if a name is declared twice and
	/// [`RouterError::Pattern`] if a template fails to compile.
	pub fn build<I, N, E>(entries: I) -> Result<Self, RouterError>
	where
		I: IntoIterator<Item = (N, E)>,
		N: Into<String>,
		E: Into<RouteEntry>,
	{
		let mut table = Self::default();
		for (name, entry) in entries {
			let route = CompiledRoute::compile(name, entry.into())?;
			if table.named_routes.contains_key(route.name()) {
				return Err(RouterError::DuplicateRoute(route.name().to_string()));
			}
			table
				.named_routes
				.insert(route.name().to_string(), table.routes.len());
			table.routes.push(route);
		}

		tracing::debug!(
			routes = ?table.routes.iter().map(CompiledRoute::name).collect::<Vec<_>>(),
			"built route table"
		);
		Ok(table)
	}

	/// Starts a builder.
	pub fn builder() -> RouteTableBuilder {
		RouteTableBuilder::default()
	}

	/// Returns the route registered under `name`.
	pub fn get(&self, name: &str) -> Option<&CompiledRoute> {
		self.named_routes.get(name).map(|&idx| &self.routes[idx])
	}

	/// Checks if a route name exists.
	pub fn has_route(&self, name: &str) -> bool {
		self.named_routes.contains_key(name)
	}

	/// Iterates over routes in priority order.
	pub fn iter(&self) -> impl Iterator<Item = &CompiledRoute> {
		self.routes.iter()
	}

	/// Returns the number of registered routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns whether the table has no routes.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}

	/// Finds the first route matching an already normalized path.
	pub fn match_normalized(&self, path: &str) -> Option<Page> {
		self.routes.iter().find_map(|route| {
			route.matches(path).map(|params| Page {
				path: path.to_string(),
				route: route.name().to_string(),
				params,
			})
		})
	}

	/// Normalizes `path` and finds the first matching route.
	///
	/// Query string and fragment are ignored. Unlike
	/// [`Matcher::parse`](crate::Matcher::parse) this keeps no memo.
	pub fn find(&self, path: &str) -> Option<Page> {
		let path = crate::path::strip_query(crate::path::strip_fragment(path));
		self.match_normalized(&normalize(path))
	}
}

/// Builder collecting routes in declaration order.
///
/// # Example
///
/// ```
/// use signpost_urls::{Params, Regex, RouteTable};
///
/// let table = RouteTable::builder()
///     .route("home", "/")
///     .route("post", "/posts/:categoryId/:id")
///     .custom("raw", Regex::new("^/raw/(.*)$").unwrap(), |groups| {
///         Params::from([("rest", groups[0].unwrap_or_default())])
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(table.len(), 3);
/// ```
#[derive(Debug, Default)]
pub struct RouteTableBuilder {
	entries: Vec<(String, RouteEntry)>,
}

impl RouteTableBuilder {
	/// Adds a template route.
	pub fn route(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
		self.entries
			.push((name.into(), RouteEntry::Template(template.into())));
		self
	}

	/// Adds a custom matcher route.
	pub fn custom<F>(mut self, name: impl Into<String>, matcher: Regex, decoder: F) -> Self
	where
		F: Fn(&[Option<&str>]) -> Params + Send + Sync + 'static,
	{
		self.entries
			.push((name.into(), RouteEntry::custom(matcher, decoder)));
		self
	}

	/// Compiles the collected routes.
	pub fn build(self) -> Result<RouteTable, RouterError> {
		RouteTable::build(self.entries)
	}
}
