#![forbid(unsafe_code)]

//! Reactive value and stream primitives for the kinetic motion runtime.
//!
//! This crate provides the building blocks the runtime binds together:
//!
//! - [`Property`]: a named, version-tracked mutable slot with change
//!   notification and an optional write-back sink into a host object.
//! - [`MotionObservable`]: a single-threaded multicast push stream.
//! - [`MotionSource`]: the producer contract both of the above implement —
//!   anything the runtime can subscribe to.
//! - [`Subscription`]: RAII guard that cancels a binding on drop.
//! - [`MotionState`]: the two-valued activity signal emitted by streams
//!   that report whether they are doing work.
//!
//! # Architecture
//!
//! Everything here is single-threaded by construction: shared state lives
//! behind `Rc<RefCell<..>>`, subscribers are stored as `Weak` function
//! slots and cleaned up lazily during notification, and value delivery is
//! a synchronous callback invocation on the producer's own call stack.
//!
//! # Invariants
//!
//! 1. Subscribers are notified in registration order.
//! 2. Dropping a [`Subscription`] makes its slot inert before the next
//!    delivery cycle.
//! 3. A [`Property`] bumps its version exactly once per value-changing
//!    write; writing an equal value is a no-op.

pub mod property;
pub mod state;
pub mod stream;
pub mod subscription;

pub use property::{Property, WriteMode};
pub use state::MotionState;
pub use stream::{MotionObservable, MotionSource};
pub use subscription::Subscription;
