#![forbid(unsafe_code)]

//! RAII handle for one active stream-to-sink binding.
//!
//! A [`Subscription`] is minted by a producer at subscribe time and owns
//! whatever keeps the binding alive (typically the strong reference to the
//! subscriber slot). Dropping it — or consuming it via
//! [`unsubscribe()`](Subscription::unsubscribe) — cancels the binding and
//! stops all further deliveries.
//!
//! # Invariants
//!
//! 1. The cancel action runs at most once, no matter how the handle dies.
//! 2. Cancellation is immediate: no delivery is observed after the handle
//!    is released.
//!
//! # Failure Modes
//!
//! - Double release is structurally impossible: `unsubscribe()` consumes
//!   the handle, and the subsequent drop sees an already-taken action.
//! - A cancel action that panics propagates the panic to whoever released
//!   the handle; the action is still consumed and will not run again.

/// Owned handle for one active binding. Cancels on drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Create a subscription from a cancel action.
    ///
    /// The action usually just owns (and eventually drops) the strong
    /// reference keeping a subscriber slot alive.
    #[must_use]
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// An inert subscription with nothing to cancel.
    ///
    /// Useful for producers that complete synchronously during subscribe.
    #[must_use]
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Cancel the binding now instead of waiting for drop.
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("live", &self.cancel.is_some())
            .finish()
    }
}
