//! Immutable mark snapshots.

use mpp_core::{MarkId, Point};
use serde::{Deserialize, Serialize};

use crate::bounds::Orientation;

/// Parameterized shape of a mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Shape {
    /// A dimensionless point; every extent is zero.
    Point,
    /// A sphere with the given radius.
    Sphere {
        /// Sphere radius in scene units.
        radius: f64,
    },
    /// An axis-aligned ellipsoid with per-axis radii.
    Ellipsoid {
        /// Radii along the three spatial axes.
        radii: [f64; 3],
    },
}

impl Shape {
    /// Extent of the shape along the given spatial axis.
    pub fn extent_along(&self, axis: usize) -> f64 {
        match self {
            Shape::Point => 0.0,
            Shape::Sphere { radius } => radius.max(0.0),
            Shape::Ellipsoid { radii } => radii.get(axis).copied().unwrap_or(0.0).max(0.0),
        }
    }

    /// Largest extent along any axis.
    pub fn max_extent(&self) -> f64 {
        match self {
            Shape::Point => 0.0,
            Shape::Sphere { radius } => radius.max(0.0),
            Shape::Ellipsoid { radii } => radii.iter().copied().fold(0.0, f64::max),
        }
    }

    /// Volume of the shape in scene units.
    pub fn volume(&self) -> f64 {
        const SPHERE_FACTOR: f64 = 4.0 / 3.0 * std::f64::consts::PI;
        match self {
            Shape::Point => 0.0,
            Shape::Sphere { radius } => SPHERE_FACTOR * radius.max(0.0).powi(3),
            Shape::Ellipsoid { radii } => {
                SPHERE_FACTOR * radii.iter().map(|r| r.max(0.0)).product::<f64>()
            }
        }
    }

    /// Whether every extent is zero.
    pub fn is_degenerate(&self) -> bool {
        self.max_extent() <= 0.0
    }

    /// Returns the shape uniformly scaled by `factor` (negative factors
    /// collapse to zero extents).
    pub fn scaled(&self, factor: f64) -> Shape {
        let factor = factor.max(0.0);
        match self {
            Shape::Point => Shape::Point,
            Shape::Sphere { radius } => Shape::Sphere {
                radius: radius * factor,
            },
            Shape::Ellipsoid { radii } => Shape::Ellipsoid {
                radii: [radii[0] * factor, radii[1] * factor, radii[2] * factor],
            },
        }
    }
}

/// Identity of one mark snapshot, used as a shallow cache key component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkStamp {
    /// Identifier of the mark within its configuration.
    pub id: MarkId,
    /// Generation counter of the snapshot.
    pub generation: u64,
}

/// A spatial object candidate: position, orientation, and shape.
///
/// Marks are immutable value snapshots. A "modified" mark is a new instance
/// with an incremented generation counter, never an in-place mutation; this
/// is a hard invariant the feature cache relies on, since its keys are built
/// from [`MarkStamp`] identities rather than deep comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    id: MarkId,
    generation: u64,
    position: Point,
    orientation: Orientation,
    shape: Shape,
}

impl Mark {
    /// Creates a fresh mark snapshot at generation zero.
    pub fn new(id: MarkId, position: Point, orientation: Orientation, shape: Shape) -> Self {
        Self {
            id,
            generation: 0,
            position,
            orientation,
            shape,
        }
    }

    /// Returns the mark identifier.
    pub fn id(&self) -> MarkId {
        self.id
    }

    /// Returns the generation counter of this snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the mark position.
    pub fn position(&self) -> &Point {
        &self.position
    }

    /// Returns the mark orientation.
    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    /// Returns the mark shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the identity stamp used by cache keys.
    pub fn stamp(&self) -> MarkStamp {
        MarkStamp {
            id: self.id,
            generation: self.generation,
        }
    }

    /// Returns a new snapshot at the given position.
    pub fn with_position(&self, position: Point) -> Mark {
        Mark {
            position,
            generation: self.generation + 1,
            ..self.clone()
        }
    }

    /// Returns a new snapshot with the given orientation.
    pub fn with_orientation(&self, orientation: Orientation) -> Mark {
        Mark {
            orientation,
            generation: self.generation + 1,
            ..self.clone()
        }
    }

    /// Returns a new snapshot with the given shape.
    pub fn with_shape(&self, shape: Shape) -> Mark {
        Mark {
            shape,
            generation: self.generation + 1,
            ..self.clone()
        }
    }
}
