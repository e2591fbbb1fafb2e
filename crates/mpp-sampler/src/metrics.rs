//! In-memory metrics collection for sampling runs.
//!
//! Downstream report generation (CSV, manifests) is an external
//! collaborator; this module only records and summarizes.

use indexmap::IndexSet;
use mpp_model::Configuration;
use serde::{Deserialize, Serialize};

/// Per-sample metrics recorded during a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSample {
    /// Sweep number when the sample was recorded.
    pub sweep: usize,
    /// Chain index within the run.
    pub chain: usize,
    /// Total energy of the chain state.
    pub energy: f64,
    /// Number of marks in the chain state.
    pub mark_count: usize,
}

/// Aggregate statistics over the recorded samples.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnergySummary {
    /// Mean energy over the recorded samples.
    pub mean_energy: f64,
    /// Variance of the recorded energy values.
    pub energy_variance: f64,
    /// Number of distinct mark-id sets visited.
    pub unique_mark_sets: usize,
}

impl EnergySummary {
    /// Returns an empty summary.
    pub fn empty() -> Self {
        Self {
            mean_energy: 0.0,
            energy_variance: 0.0,
            unique_mark_sets: 0,
        }
    }
}

/// Collects per-sweep samples and computes aggregate statistics.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    samples: Vec<MetricSample>,
    visited: IndexSet<Vec<u64>>,
}

impl MetricsRecorder {
    /// Creates a new recorder instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sample together with the state it was drawn from.
    pub fn push_sample(&mut self, sample: MetricSample, state: &Configuration) {
        let signature: Vec<u64> = state.mark_id_set().iter().map(|id| id.as_raw()).collect();
        self.visited.insert(signature);
        self.samples.push(sample);
    }

    /// Returns an immutable view over the recorded samples.
    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }

    /// Computes summary statistics from the recorded data.
    pub fn summary(&self) -> EnergySummary {
        if self.samples.is_empty() {
            return EnergySummary::empty();
        }
        let energies: Vec<f64> = self.samples.iter().map(|sample| sample.energy).collect();
        let mean = energies.iter().sum::<f64>() / energies.len() as f64;
        let variance = if energies.len() > 1 {
            let mean_sq = energies.iter().map(|&e| e * e).sum::<f64>() / energies.len() as f64;
            (mean_sq - mean * mean).max(0.0)
        } else {
            0.0
        };
        EnergySummary {
            mean_energy: mean,
            energy_variance: variance,
            unique_mark_sets: self.visited.len(),
        }
    }
}
