//! Decoded route parameters and typed extraction.
//!
//! # Example
//!
//! ```
//! use signpost_urls::Params;
//!
//! let params = Params::from([("categoryId", "guides"), ("id", "10")]);
//! let id: i64 = params.parse("id").unwrap();
//! assert_eq!(id, 10);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ParamError;

/// Mapping from parameter name to its URL-decoded value.
///
/// Optional parameters that were not present in the matched path are absent
/// from the mapping rather than stored as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, String>);

impl Params {
	/// Creates an empty parameter mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the raw value for `name`.
	pub fn get(&self, name: &str) -> Option<&str> {
		self.0.get(name).map(String::as_str)
	}

	/// Inserts a value, returning the previous one.
	pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.0.insert(name.into(), value.into())
	}

	/// Removes a value.
	pub fn remove(&mut self, name: &str) -> Option<String> {
		self.0.remove(name)
	}

	/// Returns whether `name` has a value.
	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	/// Number of parameters.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns whether no parameter is set.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over `(name, value)` pairs in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}

	/// Parses the value for `name` into `T`.
	///
	/// # Errors
	///
	/// Returns [`ParamError::Missing`] if the parameter is absent and
	/// [`ParamError::Parse`] if the value cannot be converted.
	pub fn parse<T: FromParam>(&self, name: &str) -> Result<T, ParamError> {
		let raw = self
			.get(name)
			.ok_or_else(|| ParamError::Missing(name.to_string()))?;
		T::from_param(name, raw)
	}

	/// Parses an optional parameter, returning `Ok(None)` when it is absent.
	pub fn parse_opt<T: FromParam>(&self, name: &str) -> Result<Option<T>, ParamError> {
		self.get(name).map(|raw| T::from_param(name, raw)).transpose()
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Params {
	fn from(pairs: [(K, V); N]) -> Self {
		pairs.into_iter().collect()
	}
}

impl From<BTreeMap<String, String>> for Params {
	fn from(map: BTreeMap<String, String>) -> Self {
		Self(map)
	}
}

impl IntoIterator for Params {
	type Item = (String, String);
	type IntoIter = std::collections::btree_map::IntoIter<String, String>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Conversion from a single decoded parameter value.
pub trait FromParam: Sized {
	/// Converts the raw value of parameter `name`.
	fn from_param(name: &str, raw: &str) -> Result<Self, ParamError>;
}

macro_rules! impl_from_param_for_primitive {
	($($ty:ty => $type_name:expr),* $(,)?) => {
		$(
			impl FromParam for $ty {
				fn from_param(name: &str, raw: &str) -> Result<Self, ParamError> {
					raw.parse::<$ty>().map_err(|e| ParamError::Parse {
						name: name.to_string(),
						param_type: $type_name,
						raw_value: raw.to_string(),
						reason: e.to_string(),
					})
				}
			}
		)*
	};
}

impl_from_param_for_primitive! {
	i32 => "i32",
	i64 => "i64",
	u32 => "u32",
	u64 => "u64",
	usize => "usize",
	f64 => "f64",
	bool => "bool",
}

impl FromParam for String {
	fn from_param(_name: &str, raw: &str) -> Result<Self, ParamError> {
		Ok(raw.to_string())
	}
}
