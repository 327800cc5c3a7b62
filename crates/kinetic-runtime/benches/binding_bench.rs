//! Benchmarks for the hot paths: property writes through a binding and
//! at-rest aggregation cycles.
//!
//! Run with: cargo bench -p kinetic-runtime --bench binding_bench

use std::cell::Cell;
use std::hint::black_box;
use std::rc::Rc;

use criterion::{Criterion, criterion_group, criterion_main};
use kinetic_reactive::{MotionObservable, MotionState, Property, WriteMode};
use kinetic_runtime::MotionRuntime;

struct Surface;

struct Dot {
    x: Cell<f64>,
}

fn bench_property_write(c: &mut Criterion) {
    let runtime = MotionRuntime::new(Rc::new(Surface));
    let element = Rc::new(Dot { x: Cell::new(0.0) });
    let x = runtime
        .get(&element)
        .property("x", WriteMode::Direct, |d| d.x.get(), |d, v| d.x.set(*v));
    let stream = MotionObservable::new();
    runtime.write(&stream, &x);

    let mut value = 0.0f64;
    c.bench_function("stream_to_attribute_write", |b| {
        b.iter(|| {
            value += 1.0;
            stream.next(black_box(value));
        });
    });
}

fn bench_free_property_write(c: &mut Criterion) {
    let property = Property::new("x", 0u64, WriteMode::Direct);
    let mut value = 0u64;
    c.bench_function("free_property_write", |b| {
        b.iter(|| {
            value += 1;
            property.set(black_box(value));
        });
    });
}

fn bench_at_rest_cycle(c: &mut Criterion) {
    let runtime = MotionRuntime::new(Rc::new(Surface));
    let streams: Vec<MotionObservable<MotionState>> =
        (0..8).map(|_| MotionObservable::new()).collect();
    runtime.when_all_at_rest(streams.clone(), || {});

    c.bench_function("at_rest_cycle_8_streams", |b| {
        b.iter(|| {
            for stream in &streams {
                stream.next(MotionState::Active);
            }
            for stream in &streams {
                stream.next(MotionState::AtRest);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_property_write,
    bench_free_property_write,
    bench_at_rest_cycle
);
criterion_main!(benches);
