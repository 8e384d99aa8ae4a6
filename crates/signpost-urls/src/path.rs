//! Path normalization shared by the template compiler and the matcher.

/// Strips a single trailing `/`, keeping the root path as `/`.
///
/// An empty input normalizes to `/`.
pub fn normalize(path: &str) -> String {
	let trimmed = path.strip_suffix('/').unwrap_or(path);
	if trimmed.is_empty() {
		"/".to_string()
	} else {
		trimmed.to_string()
	}
}

/// Normalizes the path part of a location, leaving any query string untouched.
///
/// `/posts/?page=2` becomes `/posts?page=2`.
pub fn normalize_location(location: &str) -> String {
	match location.split_once('?') {
		Some((path, query)) => format!("{}?{}", normalize(path), query),
		None => normalize(location),
	}
}

/// Drops the fragment identifier.
pub fn strip_fragment(location: &str) -> &str {
	location.split_once('#').map_or(location, |(before, _)| before)
}

/// Drops the query string.
pub fn strip_query(location: &str) -> &str {
	location.split_once('?').map_or(location, |(before, _)| before)
}
