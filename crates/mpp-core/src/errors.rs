//! Structured error types shared across MPP crates.
//!
//! The sampler distinguishes three outcomes per operation: a success value,
//! ordinary absence (`Ok(None)` on proposal paths), and a fatal error. This
//! module covers only the last: errors here are never used to signal an
//! ordinary proposal rejection.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`MppError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (mark ids, channel indices, sizes).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the MPP sampler.
///
/// The `Feature` family is recoverable at the proposal level: the kernel
/// rejects the offending proposal and keeps sampling. Every other family is
/// fatal to the current sampling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum MppError {
    /// Mark or configuration structural errors (duplicate ids, absent marks).
    #[error("model error: {0}")]
    Model(ErrorInfo),
    /// Raster context errors (missing channels, buffer size mismatches).
    #[error("raster error: {0}")]
    Raster(ErrorInfo),
    /// Geometry errors outside the degenerate-bound convention.
    #[error("geometry error: {0}")]
    Geometry(ErrorInfo),
    /// Feature calculation errors; recoverable per proposal.
    #[error("feature error: {0}")]
    Feature(ErrorInfo),
    /// Abnormal proposal failures; fatal to the sampling run.
    #[error("proposal error: {0}")]
    Proposal(ErrorInfo),
    /// Randomness and seeding errors.
    #[error("rng error: {0}")]
    Rng(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl MppError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            MppError::Model(info)
            | MppError::Raster(info)
            | MppError::Geometry(info)
            | MppError::Feature(info)
            | MppError::Proposal(info)
            | MppError::Rng(info)
            | MppError::Serde(info) => info,
        }
    }

    /// Whether the error is recoverable by rejecting the current proposal.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, MppError::Feature(_))
    }
}
