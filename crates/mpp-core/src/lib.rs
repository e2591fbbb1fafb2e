#![deny(missing_docs)]

//! Core types, errors, deterministic RNG, and diagnostics for the MPP
//! (marked point process) sampler.

use serde::{Deserialize, Serialize};

pub mod diagnostics;
pub mod errors;
pub mod rng;

pub use diagnostics::ErrorNode;
pub use errors::{ErrorInfo, MppError};
pub use rng::{derive_substream_seed, RngHandle};

/// Identifier for a mark within a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkId(u64);

impl MarkId {
    /// Creates a new identifier from its raw integer representation.
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw integer representation of the identifier.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// A point in scene coordinates. Two-dimensional scenes use `z = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    /// Coordinate along the first spatial axis.
    pub x: f64,
    /// Coordinate along the second spatial axis.
    pub y: f64,
    /// Coordinate along the third spatial axis.
    pub z: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns the coordinate along the given axis (0, 1, or 2).
    pub fn component(&self, axis: usize) -> f64 {
        match axis {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    /// Returns a copy with the coordinate along `axis` replaced by `value`.
    pub fn with_component(&self, axis: usize, value: f64) -> Self {
        let mut point = *self;
        match axis {
            0 => point.x = value,
            1 => point.y = value,
            _ => point.z = value,
        }
        point
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}
