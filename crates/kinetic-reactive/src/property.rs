#![forbid(unsafe_code)]

//! Named, observable mutable slots with a declared write mode.
//!
//! A [`Property`] is the only thing the runtime ever writes to: a
//! version-tracked value cell, optionally wired to a host object through a
//! write-back sink installed at construction. Wrappers create properties
//! for each settable attribute they expose; the sink is what carries a
//! stored value through to the underlying object.
//!
//! # Design
//!
//! `Property<T>` is a cheap-clone handle over shared single-threaded
//! interior state. Subscribers are stored as `Weak` function slots and
//! cleaned up lazily during notification, exactly like
//! [`MotionObservable`](crate::stream::MotionObservable). A property is
//! itself a [`MotionSource`]: subscribing delivers the current value
//! synchronously, then every subsequent change — which is what makes one
//! property bindable to another.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per value-changing write.
//! 2. Writing a value equal to the current one is a complete no-op: no
//!    store, no version bump, no sink call, no notifications.
//! 3. Subscribers are notified in registration order.
//! 4. The sink observes a value before any subscriber does.
//!
//! # Failure Modes
//!
//! - The sink may write back to the same property; nested writes settle
//!   through the equality no-op. A *subscriber* writing to the property
//!   it is subscribed to panics on the re-entrant slot borrow.
//! - Two subscriptions writing conflicting values interleave as
//!   last-write-wins; preventing conflicting bindings is the caller's
//!   concern.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::stream::MotionSource;
use crate::subscription::Subscription;

/// How writes to a property should be delivered by a producer.
///
/// A property declares its mode at construction; the runtime forwards it
/// to the producer at subscribe time. Producers without a
/// transition-capable delivery path ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WriteMode {
    /// Set the value immediately.
    #[default]
    Direct,
    /// The property's target can accept handed-off transitions; producers
    /// that know how may drive it through that path instead of discrete
    /// writes.
    TransitionCapable,
}

type SubscriberSlot<T> = RefCell<Box<dyn FnMut(T)>>;

struct PropertyInner<T> {
    name: &'static str,
    mode: WriteMode,
    value: RefCell<T>,
    version: Cell<u64>,
    /// Write-back into the host object; `None` for free-standing properties.
    sink: Option<Box<dyn Fn(&T)>>,
    subscribers: RefCell<Vec<Weak<SubscriberSlot<T>>>>,
}

/// A named, observable mutable slot.
///
/// Cloning produces another handle to the **same** slot.
pub struct Property<T> {
    inner: Rc<PropertyInner<T>>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.inner.name)
            .field("value", &*self.inner.value.borrow())
            .field("mode", &self.inner.mode)
            .field("version", &self.inner.version.get())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    /// Create a free-standing property with no write-back sink.
    #[must_use]
    pub fn new(name: &'static str, initial: T, mode: WriteMode) -> Self {
        Self::build(name, initial, mode, None)
    }

    /// Create a property whose writes are pushed through `sink`.
    ///
    /// The sink is how a wrapper carries stored values into the host
    /// object's attribute. It runs on every value-changing write, before
    /// subscribers are notified. It is *not* run with the initial value.
    #[must_use]
    pub fn with_sink(
        name: &'static str,
        initial: T,
        mode: WriteMode,
        sink: impl Fn(&T) + 'static,
    ) -> Self {
        Self::build(name, initial, mode, Some(Box::new(sink)))
    }

    fn build(name: &'static str, initial: T, mode: WriteMode, sink: Option<Box<dyn Fn(&T)>>) -> Self {
        Self {
            inner: Rc::new(PropertyInner {
                name,
                mode,
                value: RefCell::new(initial),
                version: Cell::new(0),
                sink,
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// The current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Access the current value by reference without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Write a value through the property.
    ///
    /// Stores the value, bumps the version, pushes it through the sink,
    /// then notifies subscribers in registration order. Writing a value
    /// equal to the current one does none of that.
    pub fn set(&self, value: T) {
        {
            let current = self.inner.value.borrow();
            if *current == value {
                return;
            }
        }
        *self.inner.value.borrow_mut() = value.clone();
        self.inner.version.set(self.inner.version.get() + 1);
        if let Some(sink) = &self.inner.sink {
            sink(&value);
        }
        let live: Vec<Rc<SubscriberSlot<T>>> = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers.retain(|slot| slot.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for slot in live {
            (slot.borrow_mut())(value.clone());
        }
    }

    /// The property's diagnostic name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// The write mode this property declared at construction.
    #[must_use]
    pub fn write_mode(&self) -> WriteMode {
        self.inner.mode
    }

    /// Monotonically increasing version, bumped once per value change.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.version.get()
    }
}

impl<T: Clone + PartialEq + 'static> MotionSource for Property<T> {
    type Output = T;

    /// Subscribe to the property's value over time.
    ///
    /// The current value is delivered synchronously before this returns,
    /// then every subsequent change follows.
    fn subscribe_with(
        &self,
        _mode: WriteMode,
        mut next: impl FnMut(T) + 'static,
    ) -> Subscription {
        next(self.get());
        let slot: Rc<SubscriberSlot<T>> = Rc::new(RefCell::new(Box::new(next)));
        self.inner.subscribers.borrow_mut().push(Rc::downgrade(&slot));
        Subscription::new(move || drop(slot))
    }
}
