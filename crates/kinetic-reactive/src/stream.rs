#![forbid(unsafe_code)]

//! The producer contract and the minimal concrete stream.
//!
//! [`MotionSource`] is the only interface the runtime needs from a value
//! producer: synchronous subscription yielding a [`Subscription`], with the
//! consuming property's [`WriteMode`] forwarded so transition-capable
//! producers can pick their delivery path.
//!
//! [`MotionObservable`] is the concrete producer this crate ships: an
//! unbuffered multicast push stream. Calling [`next()`](MotionObservable::next)
//! delivers the value synchronously to every live subscriber, in
//! registration order. There is no replay, no buffering, and no dedupe —
//! consumers that need consecutive-duplicate suppression do it themselves.
//!
//! # Invariants
//!
//! 1. Delivery order equals registration order.
//! 2. A dropped [`Subscription`] receives nothing from the next delivery
//!    cycle onward.
//! 3. Dead subscriber slots are cleaned up lazily during notification.
//!
//! # Failure Modes
//!
//! - A subscriber that calls `next()` on the same stream from inside its
//!   own callback panics on the re-entrant slot borrow. Fan-out to *other*
//!   streams from inside a callback is fine.
//! - Subscribing from inside a callback works; the new subscriber first
//!   sees the *following* delivery, not the in-flight one.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::property::WriteMode;
use crate::subscription::Subscription;

/// A live subscriber: the boxed callback, kept alive by its [`Subscription`].
type SubscriberSlot<T> = RefCell<Box<dyn FnMut(T)>>;

/// Anything the runtime can subscribe to.
///
/// Producers are assumed well-formed: they emit or go quiet, they never
/// fail. The `Output: PartialEq` bound is the equality comparison the
/// at-rest aggregator needs for consecutive-duplicate suppression.
pub trait MotionSource {
    /// The value type this producer emits.
    type Output: Clone + PartialEq + 'static;

    /// Subscribe with an explicit write mode.
    ///
    /// The mode is the consuming property's declared mode; producers with
    /// no transition-capable delivery path may ignore it.
    fn subscribe_with(
        &self,
        mode: WriteMode,
        next: impl FnMut(Self::Output) + 'static,
    ) -> Subscription;

    /// Subscribe for plain direct delivery.
    fn subscribe(&self, next: impl FnMut(Self::Output) + 'static) -> Subscription {
        self.subscribe_with(WriteMode::Direct, next)
    }
}

/// An unbuffered multicast push stream.
///
/// Cloning produces another handle to the **same** stream; any handle can
/// emit and any handle can subscribe.
pub struct MotionObservable<T> {
    inner: Rc<ObservableInner<T>>,
}

struct ObservableInner<T> {
    subscribers: RefCell<Vec<Weak<SubscriberSlot<T>>>>,
}

impl<T> Clone for MotionObservable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> std::fmt::Debug for MotionObservable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionObservable")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<T> Default for MotionObservable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MotionObservable<T> {
    /// Create a stream with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ObservableInner {
                subscribers: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Number of live subscribers.
    ///
    /// Slots whose [`Subscription`] has been dropped but which have not yet
    /// been swept by a delivery cycle are not counted.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .borrow()
            .iter()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }
}

impl<T: Clone + PartialEq + 'static> MotionObservable<T> {
    /// Emit a value to every live subscriber, in registration order.
    ///
    /// Dead slots are swept before delivery. The subscriber list borrow is
    /// released before any callback runs, so callbacks may subscribe or
    /// emit to other streams freely.
    pub fn next(&self, value: T) {
        let live: Vec<Rc<SubscriberSlot<T>>> = {
            let mut subscribers = self.inner.subscribers.borrow_mut();
            subscribers.retain(|slot| slot.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };
        for slot in live {
            (slot.borrow_mut())(value.clone());
        }
    }
}

impl<T: Clone + PartialEq + 'static> MotionSource for MotionObservable<T> {
    type Output = T;

    fn subscribe_with(
        &self,
        _mode: WriteMode,
        next: impl FnMut(T) + 'static,
    ) -> Subscription {
        let slot: Rc<SubscriberSlot<T>> = Rc::new(RefCell::new(Box::new(next)));
        self.inner.subscribers.borrow_mut().push(Rc::downgrade(&slot));
        // The subscription's only job is to own the slot; dropping it makes
        // the weak entry inert before the next sweep.
        Subscription::new(move || drop(slot))
    }
}
