#![forbid(unsafe_code)]

//! Host contract for the gesture-recognizer target category.
//!
//! Recognizers are ordinary targets with one extra wrinkle: wrapping one
//! for the first time attaches it to the runtime's root container if the
//! host reports it dangling. The side effect is gated on first-wrap — a
//! recognizer already attached anywhere (the container or elsewhere) is
//! left alone, and repeated wraps of the same recognizer never re-attach.

use std::rc::Rc;

/// A gesture recognizer the host wants driven through the runtime.
///
/// `C` is the container type the owning runtime tree was rooted with.
pub trait GestureRecognizer<C>: 'static {
    /// Whether the recognizer is currently attached to any host surface.
    fn is_attached(&self) -> bool;

    /// Attach the recognizer to `container`.
    ///
    /// Called by the runtime at most once per recognizer, and only when
    /// [`is_attached`](Self::is_attached) reported `false` at first wrap.
    fn attach_to(&self, container: &Rc<C>);
}
