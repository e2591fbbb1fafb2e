use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mpp_core::{MarkId, MppError, Point};
use mpp_image::{ChannelStack, StackDimensions};
use mpp_model::{Configuration, Mark, Orientation, Shape};
use mpp_sampler::cache::FeatureCache;
use mpp_sampler::energy::{CombinePolicy, EnergyScheme, PairwiseTerm, UnaryTerm};
use mpp_sampler::features::{MeanIntensity, PairwiseFeature, UnaryFeature};

struct ConstantFeature {
    value: f64,
    calls: AtomicUsize,
}

impl ConstantFeature {
    fn new(value: f64) -> Arc<Self> {
        Arc::new(Self {
            value,
            calls: AtomicUsize::new(0),
        })
    }
}

impl UnaryFeature for ConstantFeature {
    fn name(&self) -> &str {
        "constant"
    }

    fn evaluate(&self, _mark: &Mark, _stack: &ChannelStack) -> Result<f64, MppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.value)
    }
}

struct CountingGap {
    calls: AtomicUsize,
}

impl CountingGap {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
        })
    }
}

impl PairwiseFeature for CountingGap {
    fn name(&self) -> &str {
        "counting-gap"
    }

    fn evaluate(&self, a: &Mark, b: &Mark, _stack: &ChannelStack) -> Result<f64, MppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(a.position().distance_to(b.position()))
    }
}

fn sample_stack() -> ChannelStack {
    ChannelStack::uniform(StackDimensions::new(32, 8, 1, 1), 1.0).unwrap()
}

fn sphere(id: u64, x: f64) -> Mark {
    Mark::new(
        MarkId::from_raw(id),
        Point::new(x, 4.0, 0.0),
        Orientation::identity(),
        Shape::Sphere { radius: 0.5 },
    )
}

/// Three marks; the interaction radius covers the pair (1, 2) but leaves
/// mark 3 isolated.
fn three_marks() -> Configuration {
    Configuration::from_marks(vec![sphere(1, 1.0), sphere(2, 2.0), sphere(3, 20.0)]).unwrap()
}

#[test]
fn constant_unary_scheme_scales_with_mark_count() {
    let stack = sample_stack();
    let cache = FeatureCache::new();
    let scheme = EnergyScheme::new(
        vec![UnaryTerm {
            feature: ConstantFeature::new(2.0),
            weight: 1.0,
        }],
        Vec::new(),
        2.0,
        CombinePolicy::Sum,
    );

    let configuration = three_marks();
    let total = scheme.total_energy(&configuration, &stack, &cache).unwrap();
    assert!((total - 2.0 * configuration.len() as f64).abs() < 1e-12);

    let empty = Configuration::empty();
    assert_eq!(scheme.total_energy(&empty, &stack, &cache).unwrap(), 0.0);
}

#[test]
fn incremental_delta_matches_full_recomputation() {
    let stack = sample_stack();
    let scheme = EnergyScheme::new(
        vec![UnaryTerm {
            feature: Arc::new(MeanIntensity { channel: 0 }),
            weight: 1.5,
        }],
        vec![PairwiseTerm {
            feature: CountingGap::new(),
            weight: -0.5,
        }],
        2.0,
        CombinePolicy::Sum,
    );

    let current = three_marks();
    let mut candidate = current.duplicate();
    let moved = current.marks()[0].with_position(Point::new(1.5, 4.0, 0.0));
    candidate.replace(moved).unwrap();

    let shared = FeatureCache::new();
    let incremental = scheme
        .energy_delta(&current, &candidate, MarkId::from_raw(1), &stack, &shared)
        .unwrap();

    let fresh_a = FeatureCache::new();
    let fresh_b = FeatureCache::new();
    let full = scheme.total_energy(&candidate, &stack, &fresh_a).unwrap()
        - scheme.total_energy(&current, &stack, &fresh_b).unwrap();

    let tolerance = 1e-9 * full.abs().max(1.0);
    assert!(
        (incremental - full).abs() <= tolerance,
        "incremental {incremental} vs full {full}"
    );
}

#[test]
fn moving_one_mark_only_recomputes_local_terms() {
    let stack = sample_stack();
    let cache = FeatureCache::new();
    let unary = ConstantFeature::new(2.0);
    let pairwise = CountingGap::new();
    let scheme = EnergyScheme::new(
        vec![UnaryTerm {
            feature: unary.clone(),
            weight: 1.0,
        }],
        vec![PairwiseTerm {
            feature: pairwise.clone(),
            weight: 1.0,
        }],
        2.0,
        CombinePolicy::Sum,
    );

    let current = three_marks();
    scheme.total_energy(&current, &stack, &cache).unwrap();
    // Only the (1, 2) pair lies within the interaction radius.
    assert_eq!(unary.calls.load(Ordering::SeqCst), 3);
    assert_eq!(pairwise.calls.load(Ordering::SeqCst), 1);

    let mut candidate = current.duplicate();
    let moved = current.marks()[0].with_position(Point::new(0.5, 4.0, 0.0));
    candidate.replace(moved).unwrap();
    scheme
        .energy_delta(&current, &candidate, MarkId::from_raw(1), &stack, &cache)
        .unwrap();

    // The delta re-evaluates the moved mark's unary term and its pairwise
    // term against mark 2; the (2, 3) pair state is never touched.
    assert_eq!(unary.calls.load(Ordering::SeqCst), 4);
    assert_eq!(pairwise.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn pairs_outside_the_interaction_radius_contribute_zero() {
    let stack = sample_stack();
    let cache = FeatureCache::new();
    let pairwise = CountingGap::new();
    let scheme = EnergyScheme::new(
        Vec::new(),
        vec![PairwiseTerm {
            feature: pairwise.clone(),
            weight: 1.0,
        }],
        2.0,
        CombinePolicy::Sum,
    );

    let spread =
        Configuration::from_marks(vec![sphere(1, 1.0), sphere(2, 10.0), sphere(3, 20.0)]).unwrap();
    let total = scheme.total_energy(&spread, &stack, &cache).unwrap();
    assert_eq!(total, 0.0);
    assert_eq!(pairwise.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn non_additive_policies_fall_back_to_full_recomputation() {
    let stack = sample_stack();
    let scheme = EnergyScheme::new(
        vec![UnaryTerm {
            feature: Arc::new(MeanIntensity { channel: 0 }),
            weight: 1.0,
        }],
        Vec::new(),
        2.0,
        CombinePolicy::Max,
    );

    let current = three_marks();
    let mut candidate = current.duplicate();
    let moved = current.marks()[0].with_position(Point::new(3.0, 4.0, 0.0));
    candidate.replace(moved).unwrap();

    let cache = FeatureCache::new();
    let delta = scheme
        .energy_delta(&current, &candidate, MarkId::from_raw(1), &stack, &cache)
        .unwrap();
    let full = scheme.total_energy(&candidate, &stack, &cache).unwrap()
        - scheme.total_energy(&current, &stack, &cache).unwrap();
    assert!((delta - full).abs() < 1e-12);
}

#[test]
fn missing_channels_surface_as_feature_errors() {
    let stack = sample_stack();
    let cache = FeatureCache::new();
    let scheme = EnergyScheme::new(
        vec![UnaryTerm {
            feature: Arc::new(MeanIntensity { channel: 5 }),
            weight: 1.0,
        }],
        Vec::new(),
        2.0,
        CombinePolicy::Sum,
    );

    let err = scheme
        .total_energy(&three_marks(), &stack, &cache)
        .unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(err.info().code, "missing-channel");
}
