//! Error types for route compilation, reverse lookup and navigation.

/// Error raised while compiling a route template.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
	/// Template is longer than the allowed maximum.
	#[error("Template length {len} exceeds maximum allowed length of {max} bytes")]
	TooLong {
		/// Length of the rejected template.
		len: usize,
		/// Configured maximum.
		max: usize,
	},

	/// Template has too many path segments.
	#[error("Template has {count} path segments, exceeding maximum of {max}")]
	TooManySegments {
		/// Number of segments in the rejected template.
		count: usize,
		/// Configured maximum.
		max: usize,
	},

	/// The same parameter name is used twice.
	#[error("Parameter '{0}' appears more than once in template")]
	DuplicateParameter(String),

	/// The generated regex was rejected.
	#[error("Failed to compile template regex: {0}")]
	Regex(String),
}

/// Error type for typed parameter extraction.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
	/// The parameter is absent.
	#[error("Missing parameter: {0}")]
	Missing(String),

	/// The value could not be converted.
	#[error("Failed to parse parameter '{name}' value '{raw_value}' as {param_type}: {reason}")]
	Parse {
		/// Parameter name.
		name: String,
		/// Expected type name.
		param_type: &'static str,
		/// Raw string value that failed to parse.
		raw_value: String,
		/// Error message from parsing.
		reason: String,
	},
}

/// Error type for router operations.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
	/// No route is registered under the given name.
	#[error("Unknown route: {0}")]
	UnknownRoute(String),

	/// Reverse lookup on a route registered with a custom matcher.
	#[error("Route '{0}' was registered with a custom matcher and has no template to build a path from")]
	NoTemplate(String),

	/// A required template parameter was not supplied when building a path.
	#[error("Missing required parameter '{param}' for route '{route}'")]
	MissingParameter {
		/// Route being reversed.
		route: String,
		/// Required parameter that was absent.
		param: String,
	},

	/// Two routes were declared under the same name.
	#[error("Duplicate route name: {0}")]
	DuplicateRoute(String),

	/// Template compilation failed.
	#[error("Invalid template for route '{route}': {source}")]
	Pattern {
		/// Route whose template was rejected.
		route: String,
		/// Underlying compilation error.
		#[source]
		source: PatternError,
	},

	/// The navigation source rejected a history update.
	#[error("Navigation failed: {0}")]
	Navigation(String),

	/// Route configuration could not be loaded.
	#[error("Invalid router configuration: {0}")]
	Config(String),

	/// Query string serialization failed.
	#[error("Failed to serialize search params: {0}")]
	Search(String),
}
