//! Shared proposal types and preconditions.
//!
//! Every proposer follows the same contract: `Ok(Some(proposal))` for a
//! produced candidate, `Ok(None)` for an ordinary rejection (explained on
//! the caller's diagnostic node, never through an error), and `Err` only
//! for abnormal failures that violate a precondition the proposer assumes,
//! which the kernel treats as fatal to the whole run.

use mpp_core::errors::ErrorInfo;
use mpp_core::{MarkId, MppError};
use mpp_model::Configuration;
use serde::{Deserialize, Serialize};

/// Kind of move performed by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// Insert a new mark at a sampled location.
    Birth,
    /// Remove an existing mark.
    Death,
    /// Relocate an existing mark within its geometric bound.
    Shift,
    /// Alter an existing mark's shape parameters.
    Reshape,
}

impl MoveKind {
    /// Stable kebab-case label used in summaries and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveKind::Birth => "birth",
            MoveKind::Death => "death",
            MoveKind::Shift => "shift",
            MoveKind::Reshape => "reshape",
        }
    }
}

/// Candidate configuration produced by a proposer.
#[derive(Debug, Clone)]
pub struct MoveProposal {
    /// Candidate configuration (the current one is never mutated).
    pub candidate: Configuration,
    /// Move type that produced the candidate.
    pub kind: MoveKind,
    /// Identifier of the mark the move touched.
    pub touched: MarkId,
    /// Forward proposal probability reported by the move generator.
    pub forward_prob: f64,
    /// Reverse proposal probability reported by the move generator.
    pub reverse_prob: f64,
    /// Human readable description for debugging.
    pub description: String,
}

/// Checks the precondition every proposer assumes: a structurally sound
/// configuration. A violation is an abnormal failure, not a rejection.
pub fn ensure_sound(configuration: &Configuration) -> Result<(), MppError> {
    configuration.validate().map_err(|err| {
        MppError::Proposal(
            ErrorInfo::new(
                "corrupt-configuration",
                "proposal precondition violated; halting the sampling run",
            )
            .with_hint(err.to_string()),
        )
    })
}
