#![forbid(unsafe_code)]

//! At-rest aggregation: N activity streams, one completion signal.
//!
//! The aggregator watches a fixed set of [`MotionState`] streams and
//! invokes a completion body every time the set of currently-active stream
//! indices transitions from non-empty to empty. "All at rest" here means
//! *no stream that ever reported active is still active* — a stream that
//! never emits is never inserted into the active set and cannot block
//! completion.
//!
//! # Invariants
//!
//! 1. Consecutive identical states from one stream are deduplicated before
//!    processing; repeated `Active` or repeated `AtRest` are not new
//!    transitions.
//! 2. `AtRest` from a stream not currently in the active set is a no-op
//!    (no spurious fire before a stream ever reported active).
//! 3. The body runs exactly once per non-empty→empty transition, and may
//!    run many times over the aggregator's lifetime.
//!
//! # Failure Modes
//!
//! - A body that synchronously re-activates one of the watched streams
//!   runs again when that activity settles; a body that emits on a watched
//!   stream *while the body is still running* panics on the re-entrant
//!   body borrow.
//! - A body that captures a strong handle to the runtime node that owns
//!   these subscriptions keeps the node alive; capture the specific
//!   handles it needs instead.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use kinetic_reactive::{MotionSource, MotionState, Subscription};
use tracing::trace;

/// Shared aggregation state: one per `when_all_at_rest` call.
struct Aggregator {
    node_id: u64,
    active: RefCell<BTreeSet<usize>>,
    body: RefCell<Box<dyn FnMut()>>,
}

impl Aggregator {
    /// Process a deduplicated state for stream `index`.
    fn transition(&self, index: usize, state: MotionState) {
        match state {
            MotionState::Active => {
                let _ = self.active.borrow_mut().insert(index);
            }
            MotionState::AtRest => {
                let emptied = {
                    let mut active = self.active.borrow_mut();
                    active.remove(&index) && active.is_empty()
                };
                // Active-set borrow is released before the body runs so the
                // body can perturb the watched streams.
                if emptied {
                    trace!(node_id = self.node_id, "active set emptied; running at-rest body");
                    (self.body.borrow_mut())();
                }
            }
        }
    }
}

/// Subscribe to every stream and wire the aggregation state.
///
/// Returns the per-stream subscriptions; the caller (the runtime node)
/// owns them, so the aggregation lives exactly as long as the node.
pub(crate) fn aggregate<S>(
    node_id: u64,
    streams: impl IntoIterator<Item = S>,
    body: impl FnMut() + 'static,
) -> Vec<Subscription>
where
    S: MotionSource<Output = MotionState>,
{
    let aggregator = Rc::new(Aggregator {
        node_id,
        active: RefCell::new(BTreeSet::new()),
        body: RefCell::new(Box::new(body)),
    });

    streams
        .into_iter()
        .enumerate()
        .map(|(index, stream)| {
            let aggregator = Rc::clone(&aggregator);
            let mut last_seen: Option<MotionState> = None;
            stream.subscribe(move |state| {
                if last_seen == Some(state) {
                    return;
                }
                last_seen = Some(state);
                aggregator.transition(index, state);
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinetic_reactive::MotionObservable;
    use std::cell::Cell;

    fn counter_body() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let fires = Rc::new(Cell::new(0u32));
        let fires_clone = Rc::clone(&fires);
        (fires, move || fires_clone.set(fires_clone.get() + 1))
    }

    fn streams(n: usize) -> Vec<MotionObservable<MotionState>> {
        (0..n).map(|_| MotionObservable::new()).collect()
    }

    #[test]
    fn three_stream_scenario_fires_exactly_once() {
        let s = streams(3);
        let (fires, body) = counter_body();
        let _subs = aggregate(0, s.clone(), body);

        s[0].next(MotionState::Active);
        s[1].next(MotionState::Active);
        s[0].next(MotionState::AtRest); // s[1] still active: no fire
        assert_eq!(fires.get(), 0);

        s[1].next(MotionState::AtRest); // set empties: fire
        assert_eq!(fires.get(), 1);
        // s[2] never emitted and never blocked completion.
    }

    #[test]
    fn consecutive_duplicates_are_deduplicated() {
        let s = streams(2);
        let (fires, body) = counter_body();
        let _subs = aggregate(0, s.clone(), body);

        s[0].next(MotionState::Active);
        s[0].next(MotionState::Active); // duplicate: not a second activation
        s[0].next(MotionState::AtRest);
        assert_eq!(fires.get(), 1);

        s[0].next(MotionState::AtRest); // duplicate: not a second deactivation
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn at_rest_without_prior_active_never_fires() {
        let s = streams(2);
        let (fires, body) = counter_body();
        let _subs = aggregate(0, s.clone(), body);

        s[0].next(MotionState::AtRest);
        assert_eq!(fires.get(), 0);

        // And it must not have poisoned the set for the real cycle.
        s[1].next(MotionState::Active);
        s[1].next(MotionState::AtRest);
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn fires_once_per_emptying_transition() {
        let s = streams(1);
        let (fires, body) = counter_body();
        let _subs = aggregate(0, s.clone(), body);

        for _ in 0..3 {
            s[0].next(MotionState::Active);
            s[0].next(MotionState::AtRest);
        }
        assert_eq!(fires.get(), 3);
    }

    #[test]
    fn overlapping_activity_coalesces_into_one_fire() {
        let s = streams(3);
        let (fires, body) = counter_body();
        let _subs = aggregate(0, s.clone(), body);

        s[0].next(MotionState::Active);
        s[1].next(MotionState::Active);
        s[2].next(MotionState::Active);
        s[1].next(MotionState::AtRest);
        s[0].next(MotionState::AtRest);
        assert_eq!(fires.get(), 0);

        s[2].next(MotionState::AtRest);
        assert_eq!(fires.get(), 1);
    }

    #[test]
    fn empty_stream_set_never_fires() {
        let (fires, body) = counter_body();
        let subs = aggregate(0, Vec::<MotionObservable<MotionState>>::new(), body);
        assert!(subs.is_empty());
        assert_eq!(fires.get(), 0);
    }

    #[test]
    fn dropping_subscriptions_stops_aggregation() {
        let s = streams(1);
        let (fires, body) = counter_body();
        let subs = aggregate(0, s.clone(), body);

        s[0].next(MotionState::Active);
        drop(subs);
        s[0].next(MotionState::AtRest);
        assert_eq!(fires.get(), 0);
    }

    #[test]
    fn a_stream_may_re_activate_after_a_fire() {
        let s = streams(2);
        let (fires, body) = counter_body();
        let _subs = aggregate(0, s.clone(), body);

        s[0].next(MotionState::Active);
        s[0].next(MotionState::AtRest);
        assert_eq!(fires.get(), 1);

        s[0].next(MotionState::Active);
        s[1].next(MotionState::Active);
        s[0].next(MotionState::AtRest);
        assert_eq!(fires.get(), 1);
        s[1].next(MotionState::AtRest);
        assert_eq!(fires.get(), 2);
    }
}
