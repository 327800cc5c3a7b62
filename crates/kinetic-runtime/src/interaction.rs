#![forbid(unsafe_code)]

//! The interaction attachment protocol.
//!
//! An interaction is a behavior that binds itself to something through a
//! runtime node. Behaviors vary in *what* they bind to, so the protocol is
//! a small closed set of capability traits rather than a type hierarchy:
//!
//! - [`ObjectInteraction`]: attaches to a wrapped object. Opaque to the
//!   runtime beyond "it may call back into the node's write/subscribe
//!   primitives".
//! - [`PropertyInteraction`]: governs a single property's value over time,
//!   eventually through the node's write primitive.
//! - [`TransitionInteraction`]: a property interaction that additionally
//!   computes an initial value, read once before attachment so observers
//!   never see an uninitialized property.
//!
//! A concrete behavior implements whichever roles apply; a
//! transition-capable interaction is always also a property interaction
//! (supertrait).
//!
//! Value/property type agreement is enforced by the type system at the
//! `add_*` call site — there is no runtime role dispatch to get wrong.

use std::rc::Rc;

use kinetic_reactive::Property;

use crate::runtime::MotionRuntime;
use crate::target::ReactiveTarget;

/// A behavior that attaches to a wrapped object.
pub trait ObjectInteraction<O: 'static, C: 'static>: 'static {
    /// Attach to `target`, using `runtime` as the binding context.
    ///
    /// The runtime retains the interaction afterwards; anything the
    /// interaction subscribes through `runtime` is released with the node.
    fn attach(&self, target: &Rc<ReactiveTarget<O>>, runtime: &MotionRuntime<C>);
}

/// A behavior that governs one property's value over time.
pub trait PropertyInteraction<C: 'static>: 'static {
    /// The value type of the property this interaction can govern.
    type Value: Clone + PartialEq + 'static;

    /// Attach to `property`, using `runtime` as the binding context.
    ///
    /// Implementations are expected to register their stream through
    /// [`MotionRuntime::write`] (directly or indirectly) so the node owns
    /// the resulting subscription. The runtime does not retain the
    /// interaction value itself; state that must outlive this call belongs
    /// in the subscriptions it registers.
    fn attach(&self, property: &Property<Self::Value>, runtime: &MotionRuntime<C>);
}

/// A property interaction that seeds the property before attaching.
pub trait TransitionInteraction<C: 'static>: PropertyInteraction<C> {
    /// The value the property must hold before the interaction's stream
    /// delivers anything. Read exactly once, before `attach`.
    fn initial_value(&self) -> Self::Value;
}
