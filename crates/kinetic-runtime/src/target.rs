#![forbid(unsafe_code)]

//! Identity-bound reactive wrappers around host objects.
//!
//! A [`ReactiveTarget`] adapts one host object, exposing its settable
//! attributes as [`Property`]s. Wrappers are created by the owning runtime
//! node's identity cache — never directly — so each (node, object) pair has
//! at most one wrapper for the node's lifetime.
//!
//! # Design
//!
//! The wrapper holds the host object strongly and a name-keyed map of
//! type-erased properties, populated lazily: the first
//! [`property()`](ReactiveTarget::property) call for a name creates the
//! property seeded from the object's current attribute value, with a
//! write-back sink that pushes every stored value into the attribute.
//! Later calls recover the cached entry through a downcast validated at
//! lookup time.
//!
//! # Invariants
//!
//! 1. One property per attribute name per wrapper, created on first
//!    request and never replaced.
//! 2. The `read` and `apply` accessors of later calls for a cached name
//!    are ignored; the first registration wins.
//!
//! # Failure Modes
//!
//! - Requesting a cached name with a different value type is a host
//!   programming error and panics with the offending name. Attribute
//!   names identify one typed slot each; pick distinct names.

use std::any::Any;
use std::any::TypeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use kinetic_reactive::{Property, WriteMode};

/// Cache key for one wrapped object: concrete type plus pointer identity.
///
/// Keying on `Rc::as_ptr` (never value equality) is what guarantees two
/// attribute-equal but distinct objects get distinct wrappers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TargetKey {
    type_id: TypeId,
    addr: usize,
}

impl TargetKey {
    pub(crate) fn of<O: 'static>(object: &Rc<O>) -> Self {
        Self {
            type_id: TypeId::of::<O>(),
            addr: Rc::as_ptr(object) as usize,
        }
    }
}

/// Reactive wrapper exposing a host object's attributes as properties.
pub struct ReactiveTarget<O> {
    object: Rc<O>,
    properties: RefCell<HashMap<&'static str, Box<dyn Any>>>,
}

impl<O> std::fmt::Debug for ReactiveTarget<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReactiveTarget")
            .field("properties", &self.properties.borrow().len())
            .finish()
    }
}

impl<O: 'static> ReactiveTarget<O> {
    pub(crate) fn new(object: Rc<O>) -> Rc<Self> {
        Rc::new(Self {
            object,
            properties: RefCell::new(HashMap::new()),
        })
    }

    /// The wrapped host object.
    #[must_use]
    pub fn object(&self) -> &Rc<O> {
        &self.object
    }

    /// Look up or create the property for attribute `name`.
    ///
    /// On first request the property is seeded from `read(&object)` and
    /// wired so every value-changing write runs `apply(&object, &value)`.
    /// On later requests both accessors are ignored and the cached
    /// property is returned.
    ///
    /// # Panics
    ///
    /// If `name` was previously requested with a different value type.
    pub fn property<T: Clone + PartialEq + 'static>(
        &self,
        name: &'static str,
        mode: WriteMode,
        read: impl FnOnce(&O) -> T,
        apply: impl Fn(&O, &T) + 'static,
    ) -> Property<T> {
        if let Some(entry) = self.properties.borrow().get(name) {
            return match entry.downcast_ref::<Property<T>>() {
                Some(property) => property.clone(),
                None => panic!("property `{name}` was created with a different value type"),
            };
        }
        let initial = read(&self.object);
        let object = Rc::clone(&self.object);
        let property = Property::with_sink(name, initial, mode, move |value| apply(&object, value));
        let _ = self
            .properties
            .borrow_mut()
            .insert(name, Box::new(property.clone()));
        property
    }

    /// Number of properties created on this wrapper so far.
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.properties.borrow().len()
    }
}
