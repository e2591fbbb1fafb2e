//! Run configuration schema and defaults.

use mpp_core::errors::ErrorInfo;
use mpp_core::MppError;
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing a sampling run.
///
/// The energy scheme itself arrives as an already-assembled object; this
/// structure only carries the search-control knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunConfig {
    /// Number of full sweeps to execute.
    pub sweeps: usize,
    /// Number of initial sweeps to discard when recording samples.
    #[serde(default)]
    pub burn_in: usize,
    /// Interval at which to record samples after burn-in.
    #[serde(default = "default_thinning")]
    pub thinning: usize,
    /// Number of independent chains (parallel restarts).
    #[serde(default = "default_chains")]
    pub chains: usize,
    /// Metropolis temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Number of proposals of each move kind per sweep.
    #[serde(default)]
    pub move_counts: MoveCounts,
    /// Geometric parameters for the proposers.
    #[serde(default)]
    pub proposal: ProposalSettings,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
    /// Whether to retain and flatten per-chain diagnostic trees.
    #[serde(default)]
    pub diagnostics: bool,
}

fn default_thinning() -> usize {
    1
}

fn default_chains() -> usize {
    1
}

fn default_temperature() -> f64 {
    1.0
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            sweeps: 32,
            burn_in: 0,
            thinning: default_thinning(),
            chains: default_chains(),
            temperature: default_temperature(),
            move_counts: MoveCounts::default(),
            proposal: ProposalSettings::default(),
            seed_policy: SeedPolicy::default(),
            diagnostics: false,
        }
    }
}

impl RunConfig {
    /// Parses a configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, MppError> {
        serde_yaml::from_str(text).map_err(|err| {
            MppError::Serde(
                ErrorInfo::new("config-parse", err.to_string())
                    .with_hint("check the run configuration YAML against the documented schema"),
            )
        })
    }
}

/// Number of proposals per move kind performed within a sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoveCounts {
    /// Birth proposals (insert a new mark).
    #[serde(default = "default_move_weight")]
    pub births: usize,
    /// Death proposals (remove an existing mark).
    #[serde(default = "default_move_weight")]
    pub deaths: usize,
    /// Shift proposals (relocate a mark within its bound).
    #[serde(default = "default_move_weight")]
    pub shifts: usize,
    /// Reshape proposals (alter a mark's shape parameters).
    #[serde(default = "default_move_weight")]
    pub reshapes: usize,
}

fn default_move_weight() -> usize {
    1
}

impl Default for MoveCounts {
    fn default() -> Self {
        Self {
            births: default_move_weight(),
            deaths: default_move_weight(),
            shifts: default_move_weight(),
            reshapes: default_move_weight(),
        }
    }
}

impl MoveCounts {
    /// Total number of proposals attempted per sweep.
    pub fn total(&self) -> usize {
        self.births + self.deaths + self.shifts + self.reshapes
    }
}

/// Geometric parameters consumed by the proposers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProposalSettings {
    /// Largest radius a birth proposal may request.
    #[serde(default = "default_birth_radius")]
    pub birth_radius: f64,
    /// Smallest scale factor a reshape proposal may draw.
    #[serde(default = "default_reshape_min")]
    pub reshape_min: f64,
    /// Largest scale factor a reshape proposal may draw.
    #[serde(default = "default_reshape_max")]
    pub reshape_max: f64,
}

fn default_birth_radius() -> f64 {
    4.0
}

fn default_reshape_min() -> f64 {
    0.5
}

fn default_reshape_max() -> f64 {
    1.5
}

impl Default for ProposalSettings {
    fn default() -> Self {
        Self {
            birth_radius: default_birth_radius(),
            reshape_min: default_reshape_min(),
            reshape_max: default_reshape_max(),
        }
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedPolicy {
    /// Master seed used for the run.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label documenting the substream derivation context.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x0B5E_55ED_CAFE_F00D_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}
