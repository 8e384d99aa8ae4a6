//! Browser navigation source (WASM only).
//!
//! [`BrowserHistory`] reads `window.location`, writes through the History
//! API and forwards `popstate` and document `click` events.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, MouseEvent};

use signpost_urls::RouterError;

use crate::history::{
	ClickCallback, ClickEvent, ClickTask, Location, NavigateCallback, NavigationSource,
};
use crate::links::{LinkClick, Modifiers, NO_ROUTER_ATTRIBUTE};
use crate::store::Subscription;

fn navigation_error(context: &str, err: JsValue) -> RouterError {
	RouterError::Navigation(format!("{}: {:?}", context, err))
}

fn window() -> Result<web_sys::Window, RouterError> {
	web_sys::window().ok_or_else(|| RouterError::Navigation("no global window".to_string()))
}

/// History API backed navigation source.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHistory;

impl BrowserHistory {
	/// Creates the navigation source for the current window.
	pub fn new() -> Self {
		Self
	}

	fn history(&self) -> Result<web_sys::History, RouterError> {
		window()?
			.history()
			.map_err(|err| navigation_error("history unavailable", err))
	}
}

impl NavigationSource for BrowserHistory {
	fn location(&self) -> Location {
		let Ok(window) = window() else {
			return Location::parse("", "/");
		};
		let location = window.location();
		Location {
			origin: location.origin().unwrap_or_default(),
			pathname: location.pathname().unwrap_or_else(|_| "/".to_string()),
			search: location.search().unwrap_or_default(),
			hash: location.hash().unwrap_or_default(),
		}
	}

	fn push(&self, url: &str) -> Result<(), RouterError> {
		self.history()?
			.push_state_with_url(&JsValue::NULL, "", Some(url))
			.map_err(|err| navigation_error("pushState failed", err))
	}

	fn replace(&self, url: &str) -> Result<(), RouterError> {
		self.history()?
			.replace_state_with_url(&JsValue::NULL, "", Some(url))
			.map_err(|err| navigation_error("replaceState failed", err))
	}

	fn set_hash(&self, hash: &str) -> Result<(), RouterError> {
		if hash.is_empty() || hash == "#" {
			let mut location = self.location();
			location.hash.clear();
			return self.push(&location.relative());
		}
		window()?
			.location()
			.set_hash(hash)
			.map_err(|err| navigation_error("setting location.hash failed", err))
	}

	fn on_navigate(&self, callback: NavigateCallback) -> Subscription {
		let Ok(window) = window() else {
			return Subscription::noop();
		};

		let closure = Closure::wrap(Box::new(move |_event: Event| {
			callback();
		}) as Box<dyn FnMut(_)>);

		if let Err(err) =
			window.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())
		{
			tracing::warn!(error = ?err, "failed to add popstate listener");
			return Subscription::noop();
		}

		Subscription::new(move || {
			let _ = window
				.remove_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
		})
	}

	fn on_click(&self, callback: ClickCallback) -> Subscription {
		let Some(document) = window().ok().and_then(|w| w.document()) else {
			return Subscription::noop();
		};

		let closure = Closure::wrap(Box::new(move |event: Event| {
			if let Some(click) = BrowserClick::from_event(event) {
				callback(&click);
			}
		}) as Box<dyn FnMut(_)>);

		if let Err(err) =
			document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
		{
			tracing::warn!(error = ?err, "failed to add click listener");
			return Subscription::noop();
		}

		Subscription::new(move || {
			let _ = document
				.remove_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
		})
	}
}

/// A document click on, or inside, an anchor.
struct BrowserClick {
	link: LinkClick,
	event: Event,
}

impl BrowserClick {
	fn from_event(event: Event) -> Option<Self> {
		let mouse = event.dyn_ref::<MouseEvent>()?;
		let target = event.target()?.dyn_into::<Element>().ok()?;
		let anchor = target.closest("a").ok()??;

		let link = LinkClick {
			href: anchor.get_attribute("href").unwrap_or_default(),
			button: mouse.button(),
			modifiers: Modifiers {
				meta: mouse.meta_key(),
				ctrl: mouse.ctrl_key(),
				shift: mouse.shift_key(),
				alt: mouse.alt_key(),
			},
			target: anchor.get_attribute("target"),
			rel: anchor.get_attribute("rel"),
			download: anchor.has_attribute("download"),
			no_router: anchor.has_attribute(NO_ROUTER_ATTRIBUTE),
		};
		Some(Self { link, event })
	}
}

impl ClickEvent for BrowserClick {
	fn link(&self) -> &LinkClick {
		&self.link
	}

	fn prevent_default(&self) {
		self.event.prevent_default();
	}

	fn default_prevented(&self) -> bool {
		self.event.default_prevented()
	}

	fn after(&self, task: ClickTask) {
		// The other document click listeners run before a zero-delay timeout.
		let Ok(window) = window() else {
			return;
		};
		let callback = Closure::once_into_js(move || task());
		if let Err(err) = window.set_timeout_with_callback(callback.unchecked_ref()) {
			tracing::warn!(error = ?err, "failed to schedule click task");
		}
	}
}
