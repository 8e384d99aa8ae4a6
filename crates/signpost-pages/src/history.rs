//! Navigation sources
//!
//! A [`NavigationSource`] is where a router reads the current location from
//! and where it writes navigations to. The browser implementation lives in
//! [`crate::browser`] (WASM only). [`MemoryHistory`] keeps an entry stack in
//! memory and is used on native targets and in tests.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use signpost_urls::RouterError;

use crate::links::LinkClick;
use crate::store::Subscription;

/// Origin used by [`MemoryHistory::new`].
pub const DEFAULT_ORIGIN: &str = "http://localhost";

/// Callback invoked on external navigation (back/forward, initial load).
pub type NavigateCallback = Rc<dyn Fn()>;

/// Callback invoked for anchor activations.
pub type ClickCallback = Rc<dyn Fn(&dyn ClickEvent)>;

/// Work scheduled with [`ClickEvent::after`].
pub type ClickTask = Box<dyn FnOnce()>;

/// Current location split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
	/// Scheme, host and port, e.g. `https://example.com`.
	pub origin: String,
	/// Path, always starting with `/`.
	pub pathname: String,
	/// Query string including `?`, or empty.
	pub search: String,
	/// Fragment including `#`, or empty.
	pub hash: String,
}

impl Location {
	/// Splits a path-relative URL such as `/posts?page=2#top`.
	pub fn parse(origin: impl Into<String>, url: &str) -> Self {
		let (rest, hash) = match url.find('#') {
			Some(idx) => (&url[..idx], &url[idx..]),
			None => (url, ""),
		};
		let (pathname, search) = match rest.find('?') {
			Some(idx) => (&rest[..idx], &rest[idx..]),
			None => (rest, ""),
		};
		let pathname = if pathname.starts_with('/') {
			pathname.to_string()
		} else {
			format!("/{}", pathname)
		};

		Self {
			origin: origin.into(),
			pathname,
			search: normalize_marker(search, '?'),
			hash: normalize_marker(hash, '#'),
		}
	}

	/// Path plus query string.
	pub fn path_and_search(&self) -> String {
		format!("{}{}", self.pathname, self.search)
	}

	/// Path, query and fragment, without the origin.
	pub fn relative(&self) -> String {
		format!("{}{}{}", self.pathname, self.search, self.hash)
	}

	/// Full URL.
	pub fn href(&self) -> String {
		format!("{}{}", self.origin, self.relative())
	}
}

/// A lone `?` or `#` reads back as empty, like `location.search`.
fn normalize_marker(part: &str, marker: char) -> String {
	if part.len() == marker.len_utf8() {
		String::new()
	} else {
		part.to_string()
	}
}

/// An anchor activation delivered by a navigation source.
pub trait ClickEvent {
	/// Describes the activated link.
	fn link(&self) -> &LinkClick;

	/// Cancels the default browser navigation.
	fn prevent_default(&self);

	/// Whether a callback already cancelled the default navigation.
	fn default_prevented(&self) -> bool;

	/// Runs `task` once every click callback has handled the event.
	///
	/// Stores that only mirror the location use this to read it back after
	/// the router has acted on the click.
	fn after(&self, task: ClickTask);
}

/// Reads and writes the current location and reports external navigation.
pub trait NavigationSource {
	/// Returns the current location.
	fn location(&self) -> Location;

	/// Adds a history entry for a path-relative URL.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Navigation`] if the platform refuses.
	fn push(&self, url: &str) -> Result<(), RouterError>;

	/// Replaces the current history entry.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Navigation`] if the platform refuses.
	fn replace(&self, url: &str) -> Result<(), RouterError>;

	/// Changes the fragment, `hash` with or without `#`.
	///
	/// Adds a history entry, the same as assigning `location.hash`.
	///
	/// # Errors
	///
	/// Returns [`RouterError::Navigation`] if the platform refuses.
	fn set_hash(&self, hash: &str) -> Result<(), RouterError> {
		let mut location = self.location();
		location.hash = normalize_marker(&with_marker(hash, '#'), '#');
		self.push(&location.relative())
	}

	/// Registers a callback for navigation the router did not initiate.
	fn on_navigate(&self, callback: NavigateCallback) -> Subscription;

	/// Registers a callback for anchor clicks.
	///
	/// Sources without a document return an inert subscription.
	fn on_click(&self, callback: ClickCallback) -> Subscription {
		let _ = callback;
		Subscription::noop()
	}
}

fn with_marker(part: &str, marker: char) -> String {
	if part.is_empty() || part.starts_with(marker) {
		part.to_string()
	} else {
		format!("{}{}", marker, part)
	}
}

impl<H: NavigationSource + ?Sized> NavigationSource for Rc<H> {
	fn location(&self) -> Location {
		(**self).location()
	}

	fn push(&self, url: &str) -> Result<(), RouterError> {
		(**self).push(url)
	}

	fn replace(&self, url: &str) -> Result<(), RouterError> {
		(**self).replace(url)
	}

	fn set_hash(&self, hash: &str) -> Result<(), RouterError> {
		(**self).set_hash(hash)
	}

	fn on_navigate(&self, callback: NavigateCallback) -> Subscription {
		(**self).on_navigate(callback)
	}

	fn on_click(&self, callback: ClickCallback) -> Subscription {
		(**self).on_click(callback)
	}
}

/// A click produced by [`MemoryHistory::click`].
struct MemoryClick {
	link: LinkClick,
	prevented: Cell<bool>,
	deferred: RefCell<Vec<ClickTask>>,
}

impl ClickEvent for MemoryClick {
	fn link(&self) -> &LinkClick {
		&self.link
	}

	fn prevent_default(&self) {
		self.prevented.set(true);
	}

	fn default_prevented(&self) -> bool {
		self.prevented.get()
	}

	fn after(&self, task: ClickTask) {
		self.deferred.borrow_mut().push(task);
	}
}

struct MemoryState {
	origin: String,
	entries: Vec<Location>,
	index: usize,
	navigate: Vec<(u64, NavigateCallback)>,
	click: Vec<(u64, ClickCallback)>,
	next_id: u64,
}

/// In-memory history stack.
///
/// Clones share the same stack. `back`, `forward` and `go` fire
/// [`NavigationSource::on_navigate`] callbacks the way `popstate` does.
///
/// ```
/// use signpost_pages::history::{MemoryHistory, NavigationSource};
///
/// let history = MemoryHistory::new("/posts");
/// history.push("/posts/guides").unwrap();
/// assert_eq!(history.location().pathname, "/posts/guides");
///
/// history.back();
/// assert_eq!(history.location().pathname, "/posts");
/// ```
#[derive(Clone)]
pub struct MemoryHistory {
	state: Rc<RefCell<MemoryState>>,
}

impl fmt::Debug for MemoryHistory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let state = self.state.borrow();
		f.debug_struct("MemoryHistory")
			.field("entries", &state.entries)
			.field("index", &state.index)
			.finish_non_exhaustive()
	}
}

impl Default for MemoryHistory {
	fn default() -> Self {
		Self::new("/")
	}
}

impl MemoryHistory {
	/// Creates a history whose single entry is `url` on [`DEFAULT_ORIGIN`].
	pub fn new(url: &str) -> Self {
		Self::with_origin(DEFAULT_ORIGIN, url)
	}

	/// Creates a history on a specific origin.
	pub fn with_origin(origin: impl Into<String>, url: &str) -> Self {
		let origin = origin.into();
		let entry = Location::parse(origin.clone(), url);
		Self {
			state: Rc::new(RefCell::new(MemoryState {
				origin,
				entries: vec![entry],
				index: 0,
				navigate: Vec::new(),
				click: Vec::new(),
				next_id: 0,
			})),
		}
	}

	/// Number of entries in the stack.
	pub fn len(&self) -> usize {
		self.state.borrow().entries.len()
	}

	/// Always false: the stack holds at least the initial entry.
	pub fn is_empty(&self) -> bool {
		self.state.borrow().entries.is_empty()
	}

	/// Position of the current entry.
	pub fn index(&self) -> usize {
		self.state.borrow().index
	}

	/// All entries, oldest first.
	pub fn entries(&self) -> Vec<Location> {
		self.state.borrow().entries.clone()
	}

	/// Registered navigate callbacks.
	pub fn navigate_listener_count(&self) -> usize {
		self.state.borrow().navigate.len()
	}

	/// Registered click callbacks.
	pub fn click_listener_count(&self) -> usize {
		self.state.borrow().click.len()
	}

	/// Moves by `delta` entries and fires navigate callbacks.
	///
	/// Out-of-range moves are ignored, like `history.go`.
	pub fn go(&self, delta: isize) {
		let moved = {
			let mut state = self.state.borrow_mut();
			match state.index.checked_add_signed(delta) {
				Some(target) if delta != 0 && target < state.entries.len() => {
					state.index = target;
					true
				}
				_ => false,
			}
		};
		if moved {
			self.emit_navigate();
		}
	}

	/// Goes one entry back.
	pub fn back(&self) {
		self.go(-1);
	}

	/// Goes one entry forward.
	pub fn forward(&self) {
		self.go(1);
	}

	/// Simulates the user editing the address bar: pushes an entry and fires
	/// navigate callbacks.
	pub fn visit(&self, url: &str) {
		self.push_entry(url);
		self.emit_navigate();
	}

	/// Dispatches an anchor click to the click callbacks.
	///
	/// Returns `true` if any callback prevented the default action. The
	/// memory source has no default action: an unprevented click changes
	/// nothing. Tasks scheduled with [`ClickEvent::after`] run before this
	/// returns.
	pub fn click(&self, link: LinkClick) -> bool {
		let callbacks: Vec<ClickCallback> = self
			.state
			.borrow()
			.click
			.iter()
			.map(|(_, cb)| Rc::clone(cb))
			.collect();

		let event = MemoryClick {
			link,
			prevented: Cell::new(false),
			deferred: RefCell::new(Vec::new()),
		};
		for callback in callbacks {
			callback(&event);
		}
		for task in event.deferred.take() {
			task();
		}
		event.prevented.get()
	}

	fn push_entry(&self, url: &str) {
		let mut state = self.state.borrow_mut();
		let entry = Location::parse(state.origin.clone(), url);
		let next = state.index + 1;
		state.entries.truncate(next);
		state.entries.push(entry);
		state.index = next;
	}

	fn emit_navigate(&self) {
		let callbacks: Vec<NavigateCallback> = self
			.state
			.borrow()
			.navigate
			.iter()
			.map(|(_, cb)| Rc::clone(cb))
			.collect();
		for callback in callbacks {
			callback();
		}
	}

	fn next_id(state: &mut MemoryState) -> u64 {
		let id = state.next_id;
		state.next_id += 1;
		id
	}
}

impl NavigationSource for MemoryHistory {
	fn location(&self) -> Location {
		let state = self.state.borrow();
		state.entries[state.index].clone()
	}

	fn push(&self, url: &str) -> Result<(), RouterError> {
		self.push_entry(url);
		Ok(())
	}

	fn replace(&self, url: &str) -> Result<(), RouterError> {
		let mut state = self.state.borrow_mut();
		let entry = Location::parse(state.origin.clone(), url);
		let index = state.index;
		state.entries[index] = entry;
		Ok(())
	}

	fn on_navigate(&self, callback: NavigateCallback) -> Subscription {
		let id = {
			let mut state = self.state.borrow_mut();
			let id = Self::next_id(&mut state);
			state.navigate.push((id, callback));
			id
		};
		let weak = Rc::downgrade(&self.state);
		Subscription::new(move || {
			if let Some(state) = weak.upgrade() {
				state.borrow_mut().navigate.retain(|(i, _)| *i != id);
			}
		})
	}

	fn on_click(&self, callback: ClickCallback) -> Subscription {
		let id = {
			let mut state = self.state.borrow_mut();
			let id = Self::next_id(&mut state);
			state.click.push((id, callback));
			id
		};
		let weak = Rc::downgrade(&self.state);
		Subscription::new(move || {
			if let Some(state) = weak.upgrade() {
				state.borrow_mut().click.retain(|(i, _)| *i != id);
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("/posts?page=2#top", "/posts", "?page=2", "#top")]
	#[case("/posts", "/posts", "", "")]
	#[case("/posts?", "/posts", "", "")]
	#[case("/posts#", "/posts", "", "")]
	#[case("/a#b?c", "/a", "", "#b?c")]
	#[case("posts", "/posts", "", "")]
	fn test_location_parse(
		#[case] url: &str,
		#[case] pathname: &str,
		#[case] search: &str,
		#[case] hash: &str,
	) {
		let location = Location::parse(DEFAULT_ORIGIN, url);
		assert_eq!(location.pathname, pathname);
		assert_eq!(location.search, search);
		assert_eq!(location.hash, hash);
	}

	#[rstest]
	fn test_location_href() {
		let location = Location::parse("https://example.com", "/a?b=1#c");
		assert_eq!(location.href(), "https://example.com/a?b=1#c");
		assert_eq!(location.path_and_search(), "/a?b=1");
	}

	#[rstest]
	fn test_push_truncates_forward_entries() {
		let history = MemoryHistory::new("/a");
		history.push("/b").unwrap();
		history.push("/c").unwrap();
		history.back();
		history.back();
		history.push("/d").unwrap();

		let paths: Vec<String> = history.entries().into_iter().map(|l| l.pathname).collect();
		assert_eq!(paths, vec!["/a", "/d"]);
		assert_eq!(history.index(), 1);
	}

	#[rstest]
	fn test_replace_keeps_length() {
		let history = MemoryHistory::new("/a");
		history.replace("/b").unwrap();
		assert_eq!(history.len(), 1);
		assert_eq!(history.location().pathname, "/b");
	}

	#[rstest]
	fn test_back_forward_fire_navigate() {
		let history = MemoryHistory::new("/a");
		history.push("/b").unwrap();

		let fired = Rc::new(Cell::new(0));
		let sub = history.on_navigate(Rc::new({
			let fired = Rc::clone(&fired);
			move || fired.set(fired.get() + 1)
		}));

		history.back();
		history.back();
		history.forward();
		assert_eq!(fired.get(), 2);

		drop(sub);
		assert_eq!(history.navigate_listener_count(), 0);
		history.back();
		assert_eq!(fired.get(), 2);
	}

	#[rstest]
	#[case(isize::MAX)]
	#[case(isize::MIN)]
	#[case(2)]
	#[case(-2)]
	fn test_go_out_of_range_is_ignored(#[case] delta: isize) {
		let history = MemoryHistory::new("/a");
		history.push("/b").unwrap();
		let fired = Rc::new(Cell::new(0));
		let _sub = history.on_navigate(Rc::new({
			let fired = Rc::clone(&fired);
			move || fired.set(fired.get() + 1)
		}));

		history.go(delta);

		assert_eq!(history.index(), 1);
		assert_eq!(fired.get(), 0);
	}

	#[rstest]
	fn test_set_hash_adds_entries() {
		let history = MemoryHistory::new("/a?x=1");
		history.set_hash("top").unwrap();
		assert_eq!(history.location().relative(), "/a?x=1#top");
		assert_eq!(history.len(), 2);

		history.set_hash("").unwrap();
		assert_eq!(history.location().relative(), "/a?x=1");
		assert_eq!(history.len(), 3);

		history.back();
		assert_eq!(history.location().hash, "#top");
	}

	#[rstest]
	fn test_unprevented_click_changes_nothing() {
		let history = MemoryHistory::new("/a");
		let prevented = history.click(LinkClick::new("/b?c=1"));
		assert!(!prevented);
		assert_eq!(history.location().path_and_search(), "/a");
		assert_eq!(history.len(), 1);
	}

	#[rstest]
	fn test_click_callbacks_can_prevent() {
		let history = MemoryHistory::new("/a");
		let seen = Rc::new(RefCell::new(Vec::new()));
		let _sub = history.on_click(Rc::new({
			let seen = Rc::clone(&seen);
			move |event: &dyn ClickEvent| {
				seen.borrow_mut().push(event.link().href.clone());
				event.prevent_default();
			}
		}));

		assert!(history.click(LinkClick::new("/b")));
		assert_eq!(*seen.borrow(), vec!["/b".to_string()]);
		assert_eq!(history.click_listener_count(), 1);
	}

	#[rstest]
	fn test_after_tasks_run_once_callbacks_finish() {
		let history = MemoryHistory::new("/a");
		let order = Rc::new(RefCell::new(Vec::new()));
		let _first = history.on_click(Rc::new({
			let order = Rc::clone(&order);
			move |event: &dyn ClickEvent| {
				let order_after = Rc::clone(&order);
				event.after(Box::new(move || order_after.borrow_mut().push("after")));
				order.borrow_mut().push("first");
			}
		}));
		let _second = history.on_click(Rc::new({
			let order = Rc::clone(&order);
			move |_: &dyn ClickEvent| order.borrow_mut().push("second")
		}));

		history.click(LinkClick::new("/b"));

		assert_eq!(*order.borrow(), vec!["first", "second", "after"]);
	}
}
