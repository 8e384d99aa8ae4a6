//! Query string mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RouterError;

/// Mapping from query key to value.
///
/// Repeated keys keep their last value. Serialization uses
/// `application/x-www-form-urlencoded`, keys in sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchParams(BTreeMap<String, String>);

impl SearchParams {
	/// Creates an empty mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a query string, with or without the leading `?`.
	///
	/// Pairs that cannot be decoded are dropped.
	pub fn parse(query: &str) -> Self {
		let query = query.strip_prefix('?').unwrap_or(query);
		match serde_urlencoded::from_str::<Vec<(String, String)>>(query) {
			Ok(pairs) => pairs.into_iter().collect(),
			Err(err) => {
				tracing::warn!(query, error = %err, "failed to decode query string");
				Self::default()
			}
		}
	}

	/// Serializes to a query string without the leading `?`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Search`] if serialization fails.
	pub fn to_query_string(&self) -> Result<String, RouterError> {
		serde_urlencoded::to_string(&self.0).map_err(|e| RouterError::Search(e.to_string()))
	}

	/// Serializes to `?query`, or an empty string when there are no pairs.
	pub fn to_search(&self) -> Result<String, RouterError> {
		let query = self.to_query_string()?;
		Ok(if query.is_empty() {
			query
		} else {
			format!("?{}", query)
		})
	}

	/// Returns the value for `key`.
	pub fn get(&self, key: &str) -> Option<&str> {
		self.0.get(key).map(String::as_str)
	}

	/// Inserts a value, returning the previous one.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
		self.0.insert(key.into(), value.into())
	}

	/// Removes a value.
	pub fn remove(&mut self, key: &str) -> Option<String> {
		self.0.remove(key)
	}

	/// Number of pairs.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns whether there are no pairs.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over `(key, value)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SearchParams {
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self(
			iter.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		)
	}
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for SearchParams {
	fn from(pairs: [(K, V); N]) -> Self {
		pairs.into_iter().collect()
	}
}
