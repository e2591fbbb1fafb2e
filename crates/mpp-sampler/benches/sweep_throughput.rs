use std::sync::Arc;

use criterion::{criterion_group, criterion_main, Criterion};
use mpp_core::{MarkId, Point};
use mpp_image::{ChannelStack, StackDimensions};
use mpp_model::{Configuration, Mark, Orientation, Shape};
use mpp_sampler::energy::{CombinePolicy, EnergyScheme, PairwiseTerm, UnaryTerm};
use mpp_sampler::features::{MeanIntensity, OverlapPenalty};
use mpp_sampler::{run, MoveCounts, RunConfig};

fn sample_stack() -> ChannelStack {
    ChannelStack::uniform(StackDimensions::new(64, 64, 1, 1), 0.5).unwrap()
}

fn sample_scheme() -> EnergyScheme {
    EnergyScheme::new(
        vec![UnaryTerm {
            feature: Arc::new(MeanIntensity { channel: 0 }),
            weight: -1.0,
        }],
        vec![PairwiseTerm {
            feature: Arc::new(OverlapPenalty),
            weight: 5.0,
        }],
        8.0,
        CombinePolicy::Sum,
    )
}

fn seed_configuration() -> Configuration {
    let marks = (0..8)
        .map(|index| {
            Mark::new(
                MarkId::from_raw(index),
                Point::new(8.0 + 6.0 * index as f64 % 48.0, 32.0, 0.0),
                Orientation::identity(),
                Shape::Sphere { radius: 2.0 },
            )
        })
        .collect();
    Configuration::from_marks(marks).unwrap()
}

fn bench_sweep(c: &mut Criterion) {
    let stack = sample_stack();
    let scheme = sample_scheme();
    let initial = seed_configuration();
    let config = RunConfig {
        sweeps: 5,
        move_counts: MoveCounts {
            births: 2,
            deaths: 2,
            shifts: 2,
            reshapes: 2,
        },
        ..RunConfig::default()
    };

    c.bench_function("sampler_sweep", |b| {
        b.iter(|| {
            let _ = run(&config, 42, &scheme, &stack, &initial).unwrap();
        })
    });
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
