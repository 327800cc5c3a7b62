#![forbid(unsafe_code)]

//! The runtime node: binding scope, subscription owner, wrapper cache.
//!
//! A [`MotionRuntime`] writes the output of streams to properties and
//! owns everything those bindings need to stay alive: the subscriptions,
//! the attached interactions, and one reactive wrapper per target object.
//! Nodes form a tree — [`create_child`](MotionRuntime::create_child) makes
//! a scoped node that inherits the root's container context — and every
//! registration is synchronous bookkeeping on the current call stack.
//!
//! # Ownership
//!
//! A `MotionRuntime` is a cheap-clone handle; the node behind it owns its
//! children, and a child reaches its parent only through a non-owning
//! back-reference. Dropping the last handle to a root releases its
//! subscriptions (stopping every write it mediated) and, transitively, any
//! descendant no external handle retains. Wrapper caches are per node by
//! design: the same object wrapped in two nodes gets two independent
//! wrappers, because wrappers may hold node-scoped state.
//!
//! # Child activity
//!
//! Activity registered on a child node is *not* automatically visible to
//! ancestors. To react when a child's work settles, pass the child-bound
//! activity streams to `when_all_at_rest` on whichever node should
//! observe them.
//!
//! # Invariants
//!
//! 1. `get` is idempotent per (node, object identity) for the node's
//!    lifetime.
//! 2. A recognizer is attached to the container at most once, gated on
//!    first wrap.
//! 3. Every binding registered through this node produces exactly one
//!    owned [`Subscription`].
//! 4. A transition interaction's initial value is stored before its
//!    stream can deliver anything.
//!
//! # Failure Modes
//!
//! - Stream/property value-type mismatch does not exist at runtime; the
//!   `write` signature rejects it at compile time.
//! - All state is single-threaded (`Rc`/`RefCell`); the handle is `!Send`
//!   and a tree must stay on the thread that created it.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use kinetic_reactive::{MotionSource, MotionState, Property, Subscription};
use tracing::trace;

use crate::at_rest;
use crate::interaction::{ObjectInteraction, PropertyInteraction, TransitionInteraction};
use crate::recognizer::GestureRecognizer;
use crate::target::{ReactiveTarget, TargetKey};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

fn next_node_id() -> u64 {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identity-keyed cache of type-erased wrappers for one target category.
type WrapperCache = RefCell<HashMap<TargetKey, Rc<dyn Any>>>;

struct Node<C: 'static> {
    id: u64,
    /// Non-owning back-reference; `None` for the root only.
    parent: Option<Weak<Node<C>>>,
    container: Rc<C>,
    children: RefCell<Vec<Rc<Node<C>>>>,
    subscriptions: RefCell<Vec<Subscription>>,
    /// Attached object interactions, retained for the node's lifetime.
    interactions: RefCell<Vec<Box<dyn Any>>>,
    targets: WrapperCache,
    recognizers: WrapperCache,
}

impl<C: 'static> Node<C> {
    fn empty(id: u64, parent: Option<Weak<Node<C>>>, container: Rc<C>) -> Self {
        Self {
            id,
            parent,
            container,
            children: RefCell::new(Vec::new()),
            subscriptions: RefCell::new(Vec::new()),
            interactions: RefCell::new(Vec::new()),
            targets: RefCell::new(HashMap::new()),
            recognizers: RefCell::new(HashMap::new()),
        }
    }
}

/// A binding scope: writes stream output to properties and owns the
/// resulting subscriptions.
///
/// Cloning produces another handle to the **same** node.
pub struct MotionRuntime<C: 'static> {
    node: Rc<Node<C>>,
}

impl<C: 'static> Clone for MotionRuntime<C> {
    fn clone(&self) -> Self {
        Self {
            node: Rc::clone(&self.node),
        }
    }
}

impl<C: 'static> std::fmt::Debug for MotionRuntime<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MotionRuntime")
            .field("id", &self.node.id)
            .field("root", &self.node.parent.is_none())
            .field("children", &self.node.children.borrow().len())
            .field("subscriptions", &self.node.subscriptions.borrow().len())
            .finish()
    }
}

impl<C: 'static> MotionRuntime<C> {
    /// Create a root runtime node.
    ///
    /// All motion in this tree is relative to `container`; descendants
    /// inherit it unchanged.
    #[must_use]
    pub fn new(container: Rc<C>) -> Self {
        let node = Rc::new(Node::empty(next_node_id(), None, container));
        trace!(node_id = node.id, "created root runtime node");
        Self { node }
    }

    /// Create a child node scoped under this one.
    ///
    /// The child inherits the root's container and is owned by this node;
    /// the returned handle is an additional reference, not the owner.
    /// There is no bound on depth or fan-out.
    #[must_use]
    pub fn create_child(&self) -> Self {
        let child = Rc::new(Node::empty(
            next_node_id(),
            Some(Rc::downgrade(&self.node)),
            Rc::clone(&self.node.container),
        ));
        self.node.children.borrow_mut().push(Rc::clone(&child));
        trace!(parent_id = self.node.id, node_id = child.id, "created child runtime node");
        Self { node: child }
    }

    /// The container context this tree was rooted with.
    #[must_use]
    pub fn container(&self) -> &Rc<C> {
        &self.node.container
    }

    /// Handle to the parent node, if this is not the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.node
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|node| Self { node })
    }

    /// Whether this node is the root of its tree.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.node.parent.is_none()
    }

    /// Number of child nodes created under this one.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.node.children.borrow().len()
    }

    /// Number of subscriptions this node currently owns.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.node.subscriptions.borrow().len()
    }

    /// Look up or create the reactive wrapper for `object`.
    ///
    /// Idempotent per object identity: repeated calls return the same
    /// wrapper instance for the life of the node. Identity is pointer
    /// identity — two attribute-equal objects get two wrappers, and the
    /// same object wrapped by a *different* node gets an independent
    /// wrapper there.
    #[must_use]
    pub fn get<O: 'static>(&self, object: &Rc<O>) -> Rc<ReactiveTarget<O>> {
        let key = TargetKey::of(object);
        if let Some(target) = Self::cached(&self.node.targets, key) {
            return target;
        }
        let target = ReactiveTarget::new(Rc::clone(object));
        let _ = self
            .node
            .targets
            .borrow_mut()
            .insert(key, Rc::clone(&target) as Rc<dyn Any>);
        trace!(node_id = self.node.id, "wrapped target object");
        target
    }

    /// Look up or create the reactive wrapper for a gesture recognizer.
    ///
    /// Same contract as [`get`](Self::get), against the recognizer
    /// category's own cache, with one side effect on first wrap only: a
    /// recognizer that reports no attachment is attached to the root
    /// container.
    #[must_use]
    pub fn get_recognizer<G: GestureRecognizer<C>>(&self, recognizer: &Rc<G>) -> Rc<ReactiveTarget<G>> {
        let key = TargetKey::of(recognizer);
        if let Some(target) = Self::cached(&self.node.recognizers, key) {
            return target;
        }
        if !recognizer.is_attached() {
            recognizer.attach_to(&self.node.container);
            trace!(node_id = self.node.id, "attached recognizer to the root container");
        }
        let target = ReactiveTarget::new(Rc::clone(recognizer));
        let _ = self
            .node
            .recognizers
            .borrow_mut()
            .insert(key, Rc::clone(&target) as Rc<dyn Any>);
        target
    }

    fn cached<O: 'static>(cache: &WrapperCache, key: TargetKey) -> Option<Rc<ReactiveTarget<O>>> {
        cache.borrow().get(&key).map(|entry| {
            Rc::clone(entry)
                .downcast::<ReactiveTarget<O>>()
                .unwrap_or_else(|_| unreachable!("cache keys embed the wrapper's concrete type"))
        })
    }

    /// Subscribe to `stream` and write its output to `property`.
    ///
    /// Each emitted value is stored through the property's write path,
    /// with the property's declared write mode forwarded to the producer
    /// at subscribe time. The resulting subscription is owned by this
    /// node; values are applied in emission order for as long as the node
    /// lives.
    pub fn write<S: MotionSource>(&self, stream: &S, property: &Property<S::Output>) {
        let sink = property.clone();
        let subscription = stream.subscribe_with(property.write_mode(), move |value| sink.set(value));
        trace!(node_id = self.node.id, property = property.name(), "bound stream to property");
        self.node.subscriptions.borrow_mut().push(subscription);
    }

    /// Attach an interaction to a wrapped object.
    ///
    /// Delegates entirely to the interaction's own `attach`, passing this
    /// node as context, then retains the interaction for the node's
    /// lifetime — nothing else owns it.
    pub fn add_interaction<O: 'static, I: ObjectInteraction<O, C>>(
        &self,
        interaction: I,
        target: &Rc<ReactiveTarget<O>>,
    ) {
        interaction.attach(target, self);
        self.node.interactions.borrow_mut().push(Box::new(interaction));
    }

    /// Attach an interaction to an object, wrapping it first.
    pub fn add_interaction_to<O: 'static, I: ObjectInteraction<O, C>>(
        &self,
        interaction: I,
        object: &Rc<O>,
    ) {
        let target = self.get(object);
        self.add_interaction(interaction, &target);
    }

    /// Attach a property interaction to `property`.
    pub fn add_to_property<I: PropertyInteraction<C>>(
        &self,
        interaction: I,
        property: &Property<I::Value>,
    ) {
        interaction.attach(property, self);
    }

    /// Attach a transition interaction to `property`.
    ///
    /// The interaction's initial value is stored into the property
    /// *before* attachment, so observers never see an uninitialized
    /// value.
    pub fn add_transition<I: TransitionInteraction<C>>(
        &self,
        interaction: I,
        property: &Property<I::Value>,
    ) {
        property.set(interaction.initial_value());
        interaction.attach(property, self);
    }

    /// Run `body` every time the given activity streams settle.
    ///
    /// See [`at_rest`](crate::at_rest) for the exact semantics: the body
    /// fires on each transition of the active-index set from non-empty to
    /// empty, with per-stream consecutive-duplicate suppression. The
    /// per-stream subscriptions are owned by this node and released with
    /// it.
    pub fn when_all_at_rest<S>(
        &self,
        streams: impl IntoIterator<Item = S>,
        body: impl FnMut() + 'static,
    ) where
        S: MotionSource<Output = MotionState>,
    {
        let subscriptions = at_rest::aggregate(self.node.id, streams, body);
        trace!(
            node_id = self.node.id,
            stream_count = subscriptions.len(),
            "registered at-rest aggregation"
        );
        self.node.subscriptions.borrow_mut().extend(subscriptions);
    }
}
