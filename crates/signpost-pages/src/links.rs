//! Anchor click interception.
//!
//! [`LinkClick`] describes an anchor activation independently of the DOM.
//! [`intercept`] decides whether the router should handle it instead of the
//! browser.

use url::Url;

/// Attribute that opts a link out of interception.
pub const NO_ROUTER_ATTRIBUTE: &str = "data-no-router";

/// Main mouse button, as reported by `MouseEvent.button`.
pub const PRIMARY_BUTTON: i16 = 0;

/// Modifier keys held during a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
	/// Meta (Cmd on macOS).
	pub meta: bool,
	/// Control.
	pub ctrl: bool,
	/// Shift.
	pub shift: bool,
	/// Alt / Option.
	pub alt: bool,
}

impl Modifiers {
	/// Returns whether any modifier is held.
	pub fn any(&self) -> bool {
		self.meta || self.ctrl || self.shift || self.alt
	}
}

/// An anchor activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkClick {
	/// Raw `href` attribute, possibly relative.
	pub href: String,
	/// Mouse button.
	pub button: i16,
	/// Modifier keys.
	pub modifiers: Modifiers,
	/// `target` attribute.
	pub target: Option<String>,
	/// `rel` attribute.
	pub rel: Option<String>,
	/// Whether the anchor has a `download` attribute.
	pub download: bool,
	/// Whether the anchor carries [`NO_ROUTER_ATTRIBUTE`].
	pub no_router: bool,
}

impl LinkClick {
	/// A plain primary-button click on `href`.
	pub fn new(href: impl Into<String>) -> Self {
		Self {
			href: href.into(),
			button: PRIMARY_BUTTON,
			modifiers: Modifiers::default(),
			target: None,
			rel: None,
			download: false,
			no_router: false,
		}
	}

	/// Sets the mouse button.
	pub fn with_button(mut self, button: i16) -> Self {
		self.button = button;
		self
	}

	/// Sets the modifier keys.
	pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
		self.modifiers = modifiers;
		self
	}

	/// Sets the `target` attribute.
	pub fn with_target(mut self, target: impl Into<String>) -> Self {
		self.target = Some(target.into());
		self
	}

	/// Sets the `rel` attribute.
	pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
		self.rel = Some(rel.into());
		self
	}

	/// Marks the anchor as a download link.
	pub fn with_download(mut self) -> Self {
		self.download = true;
		self
	}

	/// Marks the anchor with [`NO_ROUTER_ATTRIBUTE`].
	pub fn with_no_router(mut self) -> Self {
		self.no_router = true;
		self
	}

	fn is_external(&self) -> bool {
		self.rel
			.as_deref()
			.is_some_and(|rel| rel.split_ascii_whitespace().any(|t| t == "external"))
	}
}

/// Resolves `click` against `base` and returns the target URL when the router
/// should handle the click.
///
/// A click is handled only if all of these hold:
///
/// - the `href` is not empty
/// - primary button, no modifier keys
/// - `target` is not `_blank`
/// - no [`NO_ROUTER_ATTRIBUTE`], no `download`, `rel` without `external`
/// - the resolved URL has the same origin as `base`
pub fn intercept(click: &LinkClick, base: &Url) -> Option<Url> {
	if click.href.is_empty()
		|| click.button != PRIMARY_BUTTON
		|| click.modifiers.any()
		|| click.target.as_deref() == Some("_blank")
		|| click.no_router
		|| click.is_external()
		|| click.download
	{
		return None;
	}

	let target = match base.join(&click.href) {
		Ok(target) => target,
		Err(err) => {
			tracing::debug!(href = %click.href, error = %err, "ignoring unparsable link");
			return None;
		}
	};

	(target.origin() == base.origin()).then_some(target)
}

/// Path plus query of a resolved link, the part the router opens.
pub fn path_and_search(url: &Url) -> String {
	match url.query() {
		Some(query) => format!("{}?{}", url.path(), query),
		None => url.path().to_string(),
	}
}

/// Fragment of a resolved link with its `#`, or empty.
pub fn hash(url: &Url) -> String {
	match url.fragment() {
		Some(fragment) if !fragment.is_empty() => format!("#{}", fragment),
		_ => String::new(),
	}
}
