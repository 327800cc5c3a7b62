#![forbid(unsafe_code)]

//! Property-based invariant tests for `Property` and `MotionObservable`.
//!
//! Verified for **any** write/emission sequence:
//!
//! 1. A property's final value equals the last value written.
//! 2. A property's version equals the number of value-*changing* writes.
//! 3. A subscriber sees the initial value plus every change, in order.
//! 4. A stream delivers every emission to every live subscriber, in order.

use std::cell::RefCell;
use std::rc::Rc;

use kinetic_reactive::{MotionObservable, MotionSource, Property, WriteMode};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

/// Write sequences with plenty of consecutive duplicates.
fn writes() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(-3i64..3, 0..80)
}

// ── Invariants ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn final_value_is_last_write(values in writes()) {
        let property = Property::new("p", 0i64, WriteMode::Direct);
        for &v in &values {
            property.set(v);
        }
        let expected = values.last().copied().unwrap_or(0);
        prop_assert_eq!(property.get(), expected);
    }
}

proptest! {
    #[test]
    fn version_counts_value_changes(values in writes()) {
        let property = Property::new("p", 0i64, WriteMode::Direct);

        let mut current = 0i64;
        let mut changes = 0u64;
        for &v in &values {
            property.set(v);
            if v != current {
                current = v;
                changes += 1;
            }
        }
        prop_assert_eq!(property.version(), changes);
    }
}

proptest! {
    #[test]
    fn subscriber_sees_initial_then_every_change(values in writes()) {
        let property = Property::new("p", 0i64, WriteMode::Direct);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = Rc::clone(&seen);
        let _sub = property.subscribe(move |v| seen_clone.borrow_mut().push(v));

        let mut expected = vec![0i64];
        for &v in &values {
            property.set(v);
            if *expected.last().expect("seeded with the initial value") != v {
                expected.push(v);
            }
        }
        prop_assert_eq!(&*seen.borrow(), &expected);
    }
}

proptest! {
    #[test]
    fn stream_multicasts_in_order(values in writes()) {
        let stream = MotionObservable::new();
        let first = Rc::new(RefCell::new(Vec::new()));
        let second = Rc::new(RefCell::new(Vec::new()));

        let first_clone = Rc::clone(&first);
        let _sub_a = stream.subscribe(move |v| first_clone.borrow_mut().push(v));
        let second_clone = Rc::clone(&second);
        let _sub_b = stream.subscribe(move |v| second_clone.borrow_mut().push(v));

        for &v in &values {
            stream.next(v);
        }
        prop_assert_eq!(&*first.borrow(), &values);
        prop_assert_eq!(&*second.borrow(), &values);
    }
}
