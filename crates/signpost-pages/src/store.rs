//! Store - reactive value with a mount lifecycle
//!
//! `Store<T>` holds a value and notifies listeners when it changes. It also
//! knows whether anybody is listening:
//!
//! - the first listener mounts the store, running the callback registered
//!   with [`Store::on_mount`]
//! - dropping the last [`Subscription`] unmounts it, running the teardown the
//!   mount callback returned
//!
//! Routers use this to attach browser listeners only while the navigation
//! state is observed.
//!
//! ## Example
//!
//! ```
//! use signpost_pages::store::Store;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let count = Store::new(0);
//! let seen = Rc::new(Cell::new(0));
//!
//! let sub = count.subscribe({
//!     let seen = Rc::clone(&seen);
//!     move |value| seen.set(*value)
//! });
//! count.set(42);
//! assert_eq!(seen.get(), 42);
//!
//! drop(sub);
//! count.set(7);
//! assert_eq!(seen.get(), 42);
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

/// Cleanup returned by a mount callback.
pub type Teardown = Box<dyn FnOnce()>;

type Listener<T> = Rc<dyn Fn(&T)>;
type MountFn<T> = Rc<dyn Fn(&Store<T>) -> Option<Teardown>>;

struct Inner<T: 'static> {
	value: T,
	listeners: Vec<(u64, Listener<T>)>,
	// Pending deliveries, drained by the outermost `set`.
	queue: VecDeque<(u64, Listener<T>, T)>,
	notifying: bool,
	next_id: u64,
	on_mount: Option<MountFn<T>>,
	teardown: Option<Teardown>,
	mounted: bool,
}

/// A single-threaded reactive value.
///
/// Clones share the same value and listeners.
pub struct Store<T: 'static> {
	inner: Rc<RefCell<Inner<T>>>,
}

impl<T: 'static> Clone for Store<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Rc::clone(&self.inner),
		}
	}
}

impl<T: fmt::Debug + 'static> fmt::Debug for Store<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let inner = self.inner.borrow();
		f.debug_struct("Store")
			.field("value", &inner.value)
			.field("listeners", &inner.listeners.len())
			.field("mounted", &inner.mounted)
			.finish()
	}
}

impl<T: Clone + PartialEq + 'static> Store<T> {
	/// Creates an unmounted store.
	pub fn new(value: T) -> Self {
		Self {
			inner: Rc::new(RefCell::new(Inner {
				value,
				listeners: Vec::new(),
				queue: VecDeque::new(),
				notifying: false,
				next_id: 0,
				on_mount: None,
				teardown: None,
				mounted: false,
			})),
		}
	}

	/// Returns a clone of the current value.
	pub fn get(&self) -> T {
		self.inner.borrow().value.clone()
	}

	/// Borrows the current value.
	pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
		f(&self.inner.borrow().value)
	}

	/// Replaces the value and notifies listeners.
	///
	/// Setting a value equal to the current one is a no-op. A listener that
	/// sets the store again does not interrupt the current round: the new
	/// value is queued behind it, so every listener sees the values in order
	/// and ends on the latest one.
	pub fn set(&self, value: T) {
		{
			let mut inner = self.inner.borrow_mut();
			if inner.value == value {
				return;
			}
			inner.value = value.clone();
			let pending: Vec<_> = inner
				.listeners
				.iter()
				.map(|(id, l)| (*id, Rc::clone(l), value.clone()))
				.collect();
			inner.queue.extend(pending);
			if inner.notifying {
				return;
			}
			inner.notifying = true;
		}

		let _drain = DrainGuard { inner: &self.inner };
		loop {
			let next = {
				let mut inner = self.inner.borrow_mut();
				let mut next = None;
				while let Some((id, listener, value)) = inner.queue.pop_front() {
					// Skip listeners detached since they were queued.
					if inner.listeners.iter().any(|(live, _)| *live == id) {
						next = Some((listener, value));
						break;
					}
				}
				next
			};
			match next {
				Some((listener, value)) => listener(&value),
				None => break,
			}
		}
	}

	/// Registers the mount callback.
	///
	/// The callback runs when the first listener arrives, before that
	/// listener is added. The teardown it returns runs when the last listener
	/// leaves. A store mounted at registration time runs the callback at once.
	pub fn on_mount<F>(&self, mount: F)
	where
		F: Fn(&Self) -> Option<Teardown> + 'static,
	{
		let already_mounted = {
			let mut inner = self.inner.borrow_mut();
			inner.on_mount = Some(Rc::new(mount));
			inner.mounted
		};
		if already_mounted {
			self.run_mount();
		}
	}

	/// Adds a listener called on every change, without an initial call.
	pub fn listen<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&T) + 'static,
	{
		self.add_listener(Rc::new(listener))
	}

	/// Adds a listener and immediately calls it with the current value.
	pub fn subscribe<F>(&self, listener: F) -> Subscription
	where
		F: Fn(&T) + 'static,
	{
		let listener: Listener<T> = Rc::new(listener);
		let subscription = self.add_listener(Rc::clone(&listener));
		let value = self.get();
		listener(&value);
		subscription
	}

	/// Returns whether the store currently has listeners.
	pub fn is_mounted(&self) -> bool {
		self.inner.borrow().mounted
	}

	/// Returns the number of active listeners.
	pub fn listener_count(&self) -> usize {
		self.inner.borrow().listeners.len()
	}

	/// Creates a handle that does not keep the store alive.
	pub fn downgrade(&self) -> WeakStore<T> {
		WeakStore {
			inner: Rc::downgrade(&self.inner),
		}
	}

	fn add_listener(&self, listener: Listener<T>) -> Subscription {
		let first = {
			let mut inner = self.inner.borrow_mut();
			let first = !inner.mounted;
			inner.mounted = true;
			first
		};
		if first {
			self.run_mount();
		}

		let id = {
			let mut inner = self.inner.borrow_mut();
			let id = inner.next_id;
			inner.next_id += 1;
			inner.listeners.push((id, listener));
			id
		};

		let weak = Rc::downgrade(&self.inner);
		Subscription::new(move || {
			if let Some(inner) = weak.upgrade() {
				remove_listener(&inner, id);
			}
		})
	}

	fn run_mount(&self) {
		let mount = self.inner.borrow().on_mount.clone();
		if let Some(mount) = mount {
			let teardown = mount(self);
			let previous = self.inner.borrow_mut().teardown.take();
			if let Some(previous) = previous {
				previous();
			}
			self.inner.borrow_mut().teardown = teardown;
		}
	}
}

/// Clears the notifying flag even if a listener panics.
struct DrainGuard<'a, T: 'static> {
	inner: &'a Rc<RefCell<Inner<T>>>,
}

impl<T: 'static> Drop for DrainGuard<'_, T> {
	fn drop(&mut self) {
		if let Ok(mut inner) = self.inner.try_borrow_mut() {
			inner.notifying = false;
			inner.queue.clear();
		}
	}
}

fn remove_listener<T: 'static>(inner: &Rc<RefCell<Inner<T>>>, id: u64) {
	let teardown = {
		let mut state = inner.borrow_mut();
		state.listeners.retain(|(listener_id, _)| *listener_id != id);
		if state.listeners.is_empty() && state.mounted {
			state.mounted = false;
			state.teardown.take()
		} else {
			None
		}
	};
	if let Some(teardown) = teardown {
		teardown();
	}
}

/// Non-owning handle to a [`Store`].
pub struct WeakStore<T: 'static> {
	inner: Weak<RefCell<Inner<T>>>,
}

impl<T: 'static> Clone for WeakStore<T> {
	fn clone(&self) -> Self {
		Self {
			inner: Weak::clone(&self.inner),
		}
	}
}

impl<T: 'static> fmt::Debug for WeakStore<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakStore")
			.field("alive", &(self.inner.strong_count() > 0))
			.finish()
	}
}

impl<T: 'static> WeakStore<T> {
	/// Returns the store if it is still alive.
	pub fn upgrade(&self) -> Option<Store<T>> {
		self.inner.upgrade().map(|inner| Store { inner })
	}
}

/// RAII guard for a listener.
///
/// Dropping it detaches the listener synchronously.
#[must_use = "dropping a Subscription detaches the listener immediately"]
pub struct Subscription {
	detach: Option<Box<dyn FnOnce()>>,
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.detach.is_some())
			.finish()
	}
}

impl Subscription {
	/// Wraps a detach callback.
	pub fn new<F>(detach: F) -> Self
	where
		F: FnOnce() + 'static,
	{
		Self {
			detach: Some(Box::new(detach)),
		}
	}

	/// A subscription with nothing to detach.
	pub fn noop() -> Self {
		Self { detach: None }
	}

	/// Detaches now. Same as dropping.
	pub fn unsubscribe(mut self) {
		if let Some(detach) = self.detach.take() {
			detach();
		}
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		if let Some(detach) = self.detach.take() {
			detach();
		}
	}
}
