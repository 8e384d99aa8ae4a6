//! Route template compilation.
//!
//! A template is a path such as `/posts/:categoryId/:id` or `/posts/:tag?`.
//! Every `/:name` marker captures exactly one path segment; a trailing `?`
//! makes the whole `/segment` optional. Everything else is matched literally
//! and case-insensitively.
//!
//! | Template          | Matches                         | Params             |
//! |-------------------|---------------------------------|--------------------|
//! | `/`               | `/`                             | `{}`               |
//! | `/posts/:id`      | `/posts/10`                     | `{id: "10"}`       |
//! | `/posts/:tag?`    | `/posts`, `/posts/news`         | `{}`, `{tag: ...}` |

use std::borrow::Cow;
use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::error::PatternError;
use crate::params::Params;
use crate::path::normalize;

/// Maximum allowed length for a route template in bytes.
const MAX_TEMPLATE_LENGTH: usize = 1024;

/// Maximum allowed number of path segments in a route template.
const MAX_TEMPLATE_SEGMENTS: usize = 32;

/// Maximum allowed size for a compiled template regex (in bytes).
const MAX_TEMPLATE_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
	/// Literal text, matched verbatim.
	Literal(String),
	/// A `/:name` or `/:name?` marker. The leading `/` belongs to the marker.
	Param {
		/// Parameter name.
		name: String,
		/// Whether the marker ends with `?`.
		optional: bool,
	},
}

/// A compiled route template.
#[derive(Debug, Clone)]
pub struct RoutePattern {
	/// Normalized template string.
	template: String,
	/// Parsed template, literals and parameter markers in order.
	segments: Vec<Segment>,
	/// Parameter names in capture-group order.
	param_names: Vec<String>,
	/// Anchored, case-insensitive matcher.
	regex: Regex,
}

impl RoutePattern {
	/// Compiles a template.
	///
	/// # Errors
	///
	/// Returns [`PatternError`] if:
	/// - the template exceeds 1024 bytes
	/// - the template has more than 32 path segments
	/// - a parameter name is used twice
	/// - the generated regex fails to compile
	pub fn new(template: &str) -> Result<Self, PatternError> {
		if template.len() > MAX_TEMPLATE_LENGTH {
			return Err(PatternError::TooLong {
				len: template.len(),
				max: MAX_TEMPLATE_LENGTH,
			});
		}

		let segment_count = template.split('/').count();
		if segment_count > MAX_TEMPLATE_SEGMENTS {
			return Err(PatternError::TooManySegments {
				count: segment_count,
				max: MAX_TEMPLATE_SEGMENTS,
			});
		}

		let template = normalize(template);
		let segments = parse_segments(&template);

		let mut seen = HashSet::new();
		let mut param_names = Vec::new();
		for segment in &segments {
			if let Segment::Param { name, .. } = segment {
				if !seen.insert(name.as_str()) {
					return Err(PatternError::DuplicateParameter(name.clone()));
				}
				param_names.push(name.clone());
			}
		}

		let regex = RegexBuilder::new(&to_regex(&segments))
			.case_insensitive(true)
			.size_limit(MAX_TEMPLATE_REGEX_SIZE)
			.build()
			.map_err(|e| PatternError::Regex(e.to_string()))?;

		tracing::debug!(template = %template, params = ?param_names, "compiled route template");

		Ok(Self {
			template,
			segments,
			param_names,
			regex,
		})
	}

	/// Returns the normalized template string.
	pub fn template(&self) -> &str {
		&self.template
	}

	/// Returns the parsed segments.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Returns the parameter names in capture order.
	pub fn param_names(&self) -> &[String] {
		&self.param_names
	}

	/// Returns the compiled regex.
	pub fn regex(&self) -> &Regex {
		&self.regex
	}

	/// Returns whether the template has no parameters.
	pub fn is_exact(&self) -> bool {
		self.param_names.is_empty()
	}

	/// Checks whether a normalized path matches this template.
	pub fn is_match(&self, path: &str) -> bool {
		self.regex.is_match(path)
	}

	/// Matches a normalized path and decodes its parameters.
	pub fn matches(&self, path: &str) -> Option<Params> {
		let caps = self.regex.captures(path)?;
		let groups: Vec<Option<&str>> = caps
			.iter()
			.skip(1)
			.map(|m| m.map(|m| m.as_str()))
			.collect();
		Some(self.decode(&groups))
	}

	/// Zips captured groups with the parameter names.
	///
	/// Groups that did not participate in the match (unmatched optional
	/// parameters) are skipped. Present values are URL-decoded.
	pub fn decode(&self, groups: &[Option<&str>]) -> Params {
		self.param_names
			.iter()
			.zip(groups)
			.filter_map(|(name, group)| group.map(|raw| (name.as_str(), decode_component(raw))))
			.collect()
	}
}

impl PartialEq for RoutePattern {
	fn eq(&self, other: &Self) -> bool {
		self.template == other.template
	}
}

impl Eq for RoutePattern {}

impl std::fmt::Display for RoutePattern {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.template)
	}
}

/// Splits a normalized template into literals and `/:name` markers.
///
/// A `/:` that is not followed by at least one word character stays literal.
fn parse_segments(template: &str) -> Vec<Segment> {
	let mut segments = Vec::new();
	let mut literal = String::new();
	let mut rest = template;

	while let Some(idx) = rest.find("/:") {
		let after = &rest[idx + 2..];
		let name_len = after
			.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
			.unwrap_or(after.len());

		if name_len == 0 {
			literal.push_str(&rest[..idx + 2]);
			rest = after;
			continue;
		}

		literal.push_str(&rest[..idx]);
		if !literal.is_empty() {
			segments.push(Segment::Literal(std::mem::take(&mut literal)));
		}

		let (name, tail) = after.split_at(name_len);
		let (optional, tail) = match tail.strip_prefix('?') {
			Some(tail) => (true, tail),
			None => (false, tail),
		};
		segments.push(Segment::Param {
			name: name.to_string(),
			optional,
		});
		rest = tail;
	}

	literal.push_str(rest);
	if !literal.is_empty() {
		segments.push(Segment::Literal(literal));
	}
	segments
}

fn to_regex(segments: &[Segment]) -> String {
	let mut regex_str = String::from("^");
	for segment in segments {
		match segment {
			Segment::Literal(text) => regex_str.push_str(&regex::escape(text)),
			Segment::Param { optional: true, .. } => regex_str.push_str("(?:/([^/]+))?"),
			Segment::Param { optional: false, .. } => regex_str.push_str("/([^/]+)"),
		}
	}
	regex_str.push('$');
	regex_str
}

/// Percent-decodes one captured segment.
///
/// Sequences that do not decode to UTF-8 are replaced lossily instead of
/// rejecting the match.
pub(crate) fn decode_component(raw: &str) -> String {
	match urlencoding::decode(raw) {
		Ok(Cow::Borrowed(s)) => s.to_string(),
		Ok(Cow::Owned(s)) => s,
		Err(_) => {
			tracing::warn!(raw, "route parameter is not valid UTF-8 once decoded");
			String::from_utf8_lossy(&urlencoding::decode_binary(raw.as_bytes())).into_owned()
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_exact_pattern() {
		let pattern = RoutePattern::new("/users").unwrap();
		assert!(pattern.is_exact());
		assert!(pattern.is_match("/users"));
		assert!(!pattern.is_match("/users/123"));
	}

	#[rstest]
	fn test_root_matches_only_root() {
		let pattern = RoutePattern::new("/").unwrap();
		assert_eq!(pattern.template(), "/");
		assert!(pattern.is_match("/"));
		assert!(!pattern.is_match("/posts"));
		assert!(!pattern.is_match(""));
	}

	#[rstest]
	fn test_trailing_slash_is_normalized() {
		let pattern = RoutePattern::new("/posts/").unwrap();
		assert_eq!(pattern.template(), "/posts");
		assert!(pattern.is_match("/posts"));
	}

	#[rstest]
	fn test_required_params() {
		let pattern = RoutePattern::new("/posts/:categoryId/:id").unwrap();
		assert_eq!(pattern.param_names(), &["categoryId", "id"]);

		let params = pattern.matches("/posts/guides/10").unwrap();
		assert_eq!(params.get("categoryId"), Some("guides"));
		assert_eq!(params.get("id"), Some("10"));

		assert!(pattern.matches("/posts/guides").is_none());
		assert!(pattern.matches("/posts/guides/10/extra").is_none());
	}

	#[rstest]
	fn test_optional_param() {
		let pattern = RoutePattern::new("/posts/:tag?").unwrap();

		let params = pattern.matches("/posts").unwrap();
		assert!(params.is_empty());
		assert!(!params.contains("tag"));

		let params = pattern.matches("/posts/news").unwrap();
		assert_eq!(params.get("tag"), Some("news"));
	}

	#[rstest]
	fn test_optional_param_in_the_middle() {
		let pattern = RoutePattern::new("/shop/:lang?/items/:id").unwrap();

		let params = pattern.matches("/shop/items/5").unwrap();
		assert_eq!(params, Params::from([("id", "5")]));

		let params = pattern.matches("/shop/en/items/5").unwrap();
		assert_eq!(params, Params::from([("lang", "en"), ("id", "5")]));
	}

	#[rstest]
	fn test_params_are_url_decoded() {
		let pattern = RoutePattern::new("/tags/:name").unwrap();
		let params = pattern.matches("/tags/hello%20world%2Fx").unwrap();
		assert_eq!(params.get("name"), Some("hello world/x"));
	}

	#[rstest]
	fn test_invalid_utf8_decodes_lossily() {
		let pattern = RoutePattern::new("/tags/:name").unwrap();
		let params = pattern.matches("/tags/%FF").unwrap();
		assert_eq!(params.get("name"), Some("\u{FFFD}"));
	}

	#[rstest]
	fn test_case_insensitive() {
		let pattern = RoutePattern::new("/Posts/:id").unwrap();
		assert!(pattern.is_match("/posts/1"));
		assert!(pattern.is_match("/POSTS/1"));
	}

	#[rstest]
	#[case("/api/v1.0", "/api/v1.0", true)]
	#[case("/api/v1.0", "/api/v1X0", false)]
	#[case("/a+b", "/a+b", true)]
	#[case("/a+b", "/aab", false)]
	#[case("/files/(x)", "/files/(x)", true)]
	#[case("/price/$5", "/price/$5", true)]
	fn test_special_chars_escaped(#[case] template: &str, #[case] path: &str, #[case] expected: bool) {
		let pattern = RoutePattern::new(template).unwrap();
		assert_eq!(pattern.is_match(path), expected);
	}

	#[rstest]
	fn test_colon_without_name_is_literal() {
		let pattern = RoutePattern::new("/a/:/b").unwrap();
		assert!(pattern.is_exact());
		assert!(pattern.is_match("/a/:/b"));
	}

	#[rstest]
	fn test_colon_inside_segment_is_literal() {
		let pattern = RoutePattern::new("/time/12:30").unwrap();
		assert!(pattern.is_exact());
		assert!(pattern.is_match("/time/12:30"));
	}

	#[rstest]
	fn test_segments() {
		let pattern = RoutePattern::new("/posts/:tag?").unwrap();
		assert_eq!(
			pattern.segments(),
			&[
				Segment::Literal("/posts".to_string()),
				Segment::Param {
					name: "tag".to_string(),
					optional: true
				},
			]
		);
	}

	#[rstest]
	fn test_decode_skips_unmatched_groups() {
		let pattern = RoutePattern::new("/:a/:b?").unwrap();
		let params = pattern.decode(&[Some("x"), None]);
		assert_eq!(params, Params::from([("a", "x")]));
	}

	#[rstest]
	fn test_rejects_duplicate_parameter() {
		let result = RoutePattern::new("/:id/:id");
		assert_eq!(
			result.unwrap_err(),
			PatternError::DuplicateParameter("id".to_string())
		);
	}

	#[rstest]
	fn test_rejects_excessive_length() {
		// Arrange: a template exceeding 1024 bytes
		let long_template = "/".to_string() + &"a".repeat(1025);

		// Act
		let result = RoutePattern::new(&long_template);

		// Assert
		assert!(matches!(result, Err(PatternError::TooLong { .. })));
	}

	#[rstest]
	fn test_rejects_excessive_segments() {
		// Arrange: a template with more than 32 segments
		let segments: Vec<&str> = (0..35).map(|_| "seg").collect();
		let template = format!("/{}", segments.join("/"));

		// Act
		let result = RoutePattern::new(&template);

		// Assert
		assert!(matches!(result, Err(PatternError::TooManySegments { .. })));
	}

	#[rstest]
	fn test_pattern_display_and_equality() {
		let p1 = RoutePattern::new("/users/:id/").unwrap();
		let p2 = RoutePattern::new("/users/:id").unwrap();
		let p3 = RoutePattern::new("/users/:user_id").unwrap();

		assert_eq!(format!("{}", p1), "/users/:id");
		assert_eq!(p1, p2);
		assert_ne!(p1, p3);
	}
}
