#![deny(missing_docs)]

//! Energy-guided stochastic sampler over mark configurations.
//!
//! The sampler searches a space of candidate spatial configurations with
//! birth, death, shift, and reshape proposals, scoring candidates through a
//! memoizing feature cache and accepting them with a Metropolis rule.

/// Concurrent memoizing feature cache keyed by shallow identity.
pub mod cache;
/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Energy scheme composing weighted feature terms.
pub mod energy;
/// Feature traits and built-in image features.
pub mod features;
/// Core sampling kernel and the public `run` entry point.
pub mod kernel;
/// In-memory metrics collection.
pub mod metrics;
/// Shared proposal types and preconditions.
pub mod moves;
/// Shift and reshape proposal utilities.
pub mod moves_spatial;
/// Birth and death proposal utilities.
pub mod moves_structural;

pub use cache::{FeatureCache, FeatureSlot};
pub use config::{MoveCounts, ProposalSettings, RunConfig, SeedPolicy};
pub use energy::{CombinePolicy, EnergyScheme, PairwiseTerm, UnaryTerm};
pub use features::{PairwiseFeature, UnaryFeature};
pub use kernel::{run, RunSummary};
pub use metrics::{EnergySummary, MetricSample};
pub use moves::{MoveKind, MoveProposal};
