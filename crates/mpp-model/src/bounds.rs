//! Orientation transforms and directional bound calculation.
//!
//! The bound calculator is a pure function of a point, an orientation, and a
//! shape rule. Degenerate inputs yield the zero bound rather than an error;
//! deciding whether a zero bound rejects a proposal belongs to the caller.

use mpp_core::Point;
use serde::{Deserialize, Serialize};

use crate::mark::Shape;

/// Axis-indexed rotation applied to a mark.
///
/// A rotation offset is added to each queried axis and reduced modulo the
/// number of spatial dimensions, so rotations compose identically in 2D and
/// 3D without special-casing the axis count. A full turn (`axis_shift`
/// congruent to 0 modulo the dimension count) is the identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Orientation {
    axis_shift: usize,
}

impl Orientation {
    /// The identity orientation.
    pub fn identity() -> Self {
        Self { axis_shift: 0 }
    }

    /// Creates an orientation with the given axis shift.
    pub fn new(axis_shift: usize) -> Self {
        Self { axis_shift }
    }

    /// Returns the raw axis shift.
    pub fn axis_shift(&self) -> usize {
        self.axis_shift
    }

    /// Resolves a spatial axis under this orientation.
    pub fn resolve_axis(&self, axis: usize, dims: usize) -> usize {
        if dims == 0 {
            return 0;
        }
        (axis + self.axis_shift) % dims
    }

    /// Composes two orientations (shifts add).
    pub fn compose(&self, other: &Orientation) -> Orientation {
        Orientation {
            axis_shift: self.axis_shift.wrapping_add(other.axis_shift),
        }
    }
}

/// Signed extents along the negative and positive ray directions at which a
/// mark's boundary is crossed, in scene units.
///
/// Produced fresh per query and never cached; the computation is pure
/// arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BidirectionalBound {
    near: f64,
    far: f64,
}

impl BidirectionalBound {
    /// The zero bound returned for degenerate inputs.
    pub fn zero() -> Self {
        Self { near: 0.0, far: 0.0 }
    }

    /// Creates a bound, clamping negative extents to zero.
    pub fn new(near: f64, far: f64) -> Self {
        Self {
            near: near.max(0.0),
            far: far.max(0.0),
        }
    }

    /// Extent in the negative ray direction.
    pub fn near(&self) -> f64 {
        self.near
    }

    /// Extent in the positive ray direction.
    pub fn far(&self) -> f64 {
        self.far
    }

    /// Total span covered by the bound.
    pub fn span(&self) -> f64 {
        self.near + self.far
    }

    /// Whether the bound covers no extent at all.
    pub fn is_degenerate(&self) -> bool {
        self.span() <= 0.0
    }
}

/// Continuous spatial domain the marks live in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneExtent {
    size: [f64; 3],
    dims: usize,
}

impl SceneExtent {
    /// Builds a scene extent from voxel dimensions; a single-slice depth
    /// yields a two-dimensional scene.
    pub fn from_voxel_dims(width: usize, height: usize, depth: usize) -> Self {
        let dims = if depth > 1 { 3 } else { 2 };
        Self {
            size: [width as f64, height as f64, depth as f64],
            dims,
        }
    }

    /// Number of spatial dimensions (2 or 3).
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Size of the scene along the given axis.
    pub fn size_along(&self, axis: usize) -> f64 {
        self.size.get(axis).copied().unwrap_or(0.0)
    }

    /// Whether the point lies inside the scene.
    pub fn contains(&self, point: &Point) -> bool {
        (0..self.dims).all(|axis| {
            let c = point.component(axis);
            c >= 0.0 && c <= self.size_along(axis)
        })
    }
}

/// Computes the bidirectional bound of a shape at a point along an axis.
///
/// The queried axis is first resolved under the orientation; the extent of
/// the shape along the resolved axis is then clamped by the distance from
/// the point to the scene border in each ray direction. Zero-extent shapes
/// yield the zero bound.
pub fn directional_bound(
    point: &Point,
    orientation: &Orientation,
    shape: &Shape,
    axis: usize,
    scene: &SceneExtent,
) -> BidirectionalBound {
    let resolved = orientation.resolve_axis(axis, scene.dims());
    let extent = shape.extent_along(resolved);
    if extent <= 0.0 {
        return BidirectionalBound::zero();
    }
    let coordinate = point.component(resolved);
    let near = extent.min(coordinate);
    let far = extent.min(scene.size_along(resolved) - coordinate);
    BidirectionalBound::new(near, far)
}

/// Whether the shape, centred at `point` under `orientation`, lies fully
/// inside the scene along every spatial axis.
pub fn shape_fits(
    point: &Point,
    orientation: &Orientation,
    shape: &Shape,
    scene: &SceneExtent,
) -> bool {
    (0..scene.dims()).all(|axis| {
        let resolved = orientation.resolve_axis(axis, scene.dims());
        let extent = shape.extent_along(resolved);
        let coordinate = point.component(resolved);
        extent <= coordinate && extent <= scene.size_along(resolved) - coordinate
    })
}

/// The largest extent a shape may take at `point` without leaving the scene,
/// considering every spatial axis under the mark's orientation.
pub fn admissible_extent(
    point: &Point,
    orientation: &Orientation,
    shape: &Shape,
    scene: &SceneExtent,
) -> f64 {
    (0..scene.dims())
        .map(|axis| {
            let bound = directional_bound(point, orientation, shape, axis, scene);
            bound.near().min(bound.far())
        })
        .fold(f64::INFINITY, f64::min)
        .max(0.0)
}
