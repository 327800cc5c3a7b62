#![forbid(unsafe_code)]

//! The kinetic binding runtime.
//!
//! A [`MotionRuntime`] node owns stream subscriptions, mediates every write
//! to a target property, caches one reactive wrapper per target object, and
//! aggregates activity streams into a single at-rest signal. Nodes compose
//! into a tree via [`create_child`](MotionRuntime::create_child); each node
//! is an independent binding scope that inherits the root's container
//! context.
//!
//! Reactive primitives (properties, streams, subscriptions) live in
//! [`kinetic_reactive`], re-exported here as [`reactive`].

pub mod at_rest;
pub mod interaction;
pub mod recognizer;
pub mod runtime;
pub mod target;

pub use kinetic_reactive as reactive;
pub use kinetic_reactive::{
    MotionObservable, MotionSource, MotionState, Property, Subscription, WriteMode,
};

pub use interaction::{ObjectInteraction, PropertyInteraction, TransitionInteraction};
pub use recognizer::GestureRecognizer;
pub use runtime::MotionRuntime;
pub use target::ReactiveTarget;
