use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;

use mpp_core::errors::ErrorInfo;
use mpp_core::{MarkId, MppError, Point};
use mpp_image::{ChannelStack, StackDimensions};
use mpp_model::{Mark, Orientation, Shape};
use mpp_sampler::cache::{FeatureCache, FeatureSlot};
use mpp_sampler::features::UnaryFeature;

struct CountingFeature {
    calls: AtomicUsize,
    value: f64,
}

impl CountingFeature {
    fn new(value: f64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            value,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl UnaryFeature for CountingFeature {
    fn name(&self) -> &str {
        "counting"
    }

    fn evaluate(&self, _mark: &Mark, _stack: &ChannelStack) -> Result<f64, MppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value)
    }
}

struct FailingFeature {
    calls: AtomicUsize,
}

impl UnaryFeature for FailingFeature {
    fn name(&self) -> &str {
        "failing"
    }

    fn evaluate(&self, _mark: &Mark, _stack: &ChannelStack) -> Result<f64, MppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(MppError::Feature(ErrorInfo::new(
            "missing-channel",
            "channel 3 absent",
        )))
    }
}

fn sample_stack() -> ChannelStack {
    ChannelStack::uniform(StackDimensions::new(8, 8, 1, 1), 1.0).unwrap()
}

fn sample_mark(id: u64) -> Mark {
    Mark::new(
        MarkId::from_raw(id),
        Point::new(4.0, 4.0, 0.0),
        Orientation::identity(),
        Shape::Sphere { radius: 2.0 },
    )
}

#[test]
fn repeated_queries_compute_once_and_return_identical_values() {
    let cache = FeatureCache::new();
    let stack = sample_stack();
    let mark = sample_mark(1);
    let feature = CountingFeature::new(0.1 + 0.2);

    let first = cache
        .evaluate_unary(FeatureSlot(0), &feature, &mark, &stack)
        .unwrap();
    for _ in 0..10 {
        let again = cache
            .evaluate_unary(FeatureSlot(0), &feature, &mark, &stack)
            .unwrap();
        assert_eq!(first.to_bits(), again.to_bits());
    }
    assert_eq!(feature.calls(), 1);
    assert_eq!(cache.computation_count(), 1);
}

#[test]
fn modified_marks_are_distinct_cache_entries() {
    let cache = FeatureCache::new();
    let stack = sample_stack();
    let mark = sample_mark(1);
    let moved = mark.with_position(Point::new(5.0, 4.0, 0.0));
    let feature = CountingFeature::new(7.0);

    cache
        .evaluate_unary(FeatureSlot(0), &feature, &mark, &stack)
        .unwrap();
    cache
        .evaluate_unary(FeatureSlot(0), &feature, &moved, &stack)
        .unwrap();
    assert_eq!(feature.calls(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn distinct_stacks_are_distinct_cache_entries() {
    let cache = FeatureCache::new();
    let stack_a = sample_stack();
    let stack_b = sample_stack();
    let mark = sample_mark(1);
    let feature = CountingFeature::new(7.0);

    cache
        .evaluate_unary(FeatureSlot(0), &feature, &mark, &stack_a)
        .unwrap();
    cache
        .evaluate_unary(FeatureSlot(0), &feature, &mark, &stack_b)
        .unwrap();
    assert_eq!(feature.calls(), 2);
}

#[test]
fn errors_are_memoized_like_values() {
    let cache = FeatureCache::new();
    let stack = sample_stack();
    let mark = sample_mark(1);
    let feature = FailingFeature {
        calls: AtomicUsize::new(0),
    };

    for _ in 0..3 {
        let err = cache
            .evaluate_unary(FeatureSlot(0), &feature, &mark, &stack)
            .unwrap_err();
        assert_eq!(err.info().code, "missing-channel");
    }
    assert_eq!(feature.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_queries_for_one_key_compute_once() {
    const THREADS: usize = 8;
    let cache = FeatureCache::new();
    let stack = sample_stack();
    let mark = sample_mark(1);
    let feature = CountingFeature::new(13.5);
    let barrier = Barrier::new(THREADS);

    let results: Vec<f64> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(|| {
                    barrier.wait();
                    cache
                        .evaluate_unary(FeatureSlot(0), &feature, &mark, &stack)
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(feature.calls(), 1);
    assert_eq!(cache.computation_count(), 1);
    assert!(results.iter().all(|value| value.to_bits() == results[0].to_bits()));
}

#[test]
fn clear_evicts_entries_and_allows_recomputation() {
    let cache = FeatureCache::new();
    let stack = sample_stack();
    let mark = sample_mark(1);
    let feature = CountingFeature::new(2.0);

    cache
        .evaluate_unary(FeatureSlot(0), &feature, &mark, &stack)
        .unwrap();
    cache.clear();
    assert!(cache.is_empty());
    cache
        .evaluate_unary(FeatureSlot(0), &feature, &mark, &stack)
        .unwrap();
    assert_eq!(feature.calls(), 2);
}
