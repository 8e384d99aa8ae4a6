//! Router options and TOML route configuration.
//!
//! ```toml
//! search = false
//! links = true
//!
//! [[routes]]
//! name = "home"
//! path = "/"
//!
//! [[routes]]
//! name = "post"
//! path = "/posts/:categoryId/:id"
//! ```
//!
//! Routes are an array of tables so that declaration order, which decides
//! match priority, survives deserialization.

use serde::{Deserialize, Serialize};

use crate::error::RouterError;
use crate::route::RouteTable;

fn default_links() -> bool {
	true
}

/// Behavioral options for a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterOptions {
	/// Include the query string in path matching.
	#[serde(default)]
	pub search: bool,
	/// Intercept same-origin left clicks on anchors.
	#[serde(default = "default_links")]
	pub links: bool,
}

impl Default for RouterOptions {
	fn default() -> Self {
		Self {
			search: false,
			links: true,
		}
	}
}

impl RouterOptions {
	/// Sets whether the query string takes part in matching.
	pub fn with_search(mut self, search: bool) -> Self {
		self.search = search;
		self
	}

	/// Sets whether anchor clicks are intercepted.
	pub fn with_links(mut self, links: bool) -> Self {
		self.links = links;
		self
	}
}

/// One declared route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
	/// Route name.
	pub name: String,
	/// Path template.
	pub path: String,
}

/// Router options plus template routes, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
	/// Include the query string in path matching.
	#[serde(default)]
	pub search: bool,
	/// Intercept same-origin left clicks on anchors.
	#[serde(default = "default_links")]
	pub links: bool,
	/// Routes in priority order.
	#[serde(default)]
	pub routes: Vec<RouteConfig>,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			search: false,
			links: true,
			routes: Vec::new(),
		}
	}
}

impl RouterConfig {
	/// Parses a TOML document.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Config`] on malformed TOML or unknown keys.
	pub fn from_toml_str(source: &str) -> Result<Self, RouterError> {
		toml::from_str(source).map_err(|e| RouterError::Config(e.to_string()))
	}

	/// Returns the options part of the configuration.
	pub fn options(&self) -> RouterOptions {
		RouterOptions {
			search: self.search,
			links: self.links,
		}
	}

	/// Compiles the declared routes.
	pub fn build_table(&self) -> Result<RouteTable, RouterError> {
		RouteTable::build(
			self.routes
				.iter()
				.map(|route| (route.name.as_str(), route.path.as_str())),
		)
	}
}
