//! The value produced by a successful match.

use serde::{Deserialize, Serialize};

use crate::error::ParamError;
use crate::params::{FromParam, Params};

/// A matched location: normalized path, route name and decoded parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
	/// Normalized path that was matched.
	pub path: String,
	/// Name of the matching route.
	pub route: String,
	/// Decoded parameters.
	pub params: Params,
}

impl Page {
	/// Returns whether this page belongs to `route`.
	pub fn is(&self, route: &str) -> bool {
		self.route == route
	}

	/// Parses a parameter of this page.
	pub fn param<T: FromParam>(&self, name: &str) -> Result<T, ParamError> {
		self.params.parse(name)
	}
}
