//! Feature traits and the built-in image features.
//!
//! A feature is a named scalar computation over a mark (or a mark pair),
//! optionally reading the raster context. Failures here use the `Feature`
//! error family and are recoverable: the kernel rejects the current proposal
//! and keeps sampling.

use mpp_core::errors::ErrorInfo;
use mpp_core::MppError;
use mpp_image::ChannelStack;
use mpp_model::Mark;

/// A scalar computation over a single mark.
pub trait UnaryFeature: Send + Sync {
    /// Stable name of the feature, used in diagnostics.
    fn name(&self) -> &str;

    /// Evaluates the feature for the given mark against the raster context.
    fn evaluate(&self, mark: &Mark, stack: &ChannelStack) -> Result<f64, MppError>;
}

/// A scalar computation over an unordered pair of marks.
///
/// Implementations must be symmetric in their arguments: the cache
/// normalizes pair keys to unordered form, so `evaluate(a, b)` and
/// `evaluate(b, a)` are treated as the same computation.
pub trait PairwiseFeature: Send + Sync {
    /// Stable name of the feature, used in diagnostics.
    fn name(&self) -> &str;

    /// Evaluates the feature for the given mark pair.
    fn evaluate(&self, a: &Mark, b: &Mark, stack: &ChannelStack) -> Result<f64, MppError>;
}

/// Rejects non-finite feature values as calculation errors.
pub fn ensure_finite(value: f64, feature: &str) -> Result<f64, MppError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MppError::Feature(
            ErrorInfo::new("non-finite-value", "feature computation produced a non-finite value")
                .with_context("feature", feature)
                .with_context("value", value.to_string()),
        ))
    }
}

/// Mean intensity of one channel over the voxels covered by the mark.
///
/// Voxels are tested against the mark's shape through the normalized radial
/// distance; a mark covering no voxel centre yields zero.
#[derive(Debug, Clone, Copy)]
pub struct MeanIntensity {
    /// Channel index to read.
    pub channel: usize,
}

impl UnaryFeature for MeanIntensity {
    fn name(&self) -> &str {
        "mean-intensity"
    }

    fn evaluate(&self, mark: &Mark, stack: &ChannelStack) -> Result<f64, MppError> {
        let buffer = stack.channel(self.channel).map_err(|err| {
            MppError::Feature(
                ErrorInfo::new("missing-channel", "required channel absent from raster context")
                    .with_context("feature", self.name())
                    .with_context("channel", self.channel.to_string())
                    .with_hint(err.info().message.clone()),
            )
        })?;
        let dims = stack.dimensions();
        let position = mark.position();
        let reach = mark.shape().max_extent();
        if reach <= 0.0 || dims.volume() == 0 {
            return Ok(0.0);
        }

        let lo = |c: f64| (c - reach).floor().max(0.0) as usize;
        let hi = |c: f64, max: usize| ((c + reach).ceil() as usize).min(max.saturating_sub(1));
        let (x0, x1) = (lo(position.x), hi(position.x, dims.width));
        let (y0, y1) = (lo(position.y), hi(position.y, dims.height));
        let (z0, z1) = (lo(position.z), hi(position.z, dims.depth));

        let mut sum = 0.0;
        let mut covered = 0usize;
        for z in z0..=z1 {
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let voxel = mpp_core::Point::new(x as f64, y as f64, z as f64);
                    if radial_distance(mark, &voxel) <= 1.0 {
                        sum += buffer[(z * dims.height + y) * dims.width + x] as f64;
                        covered += 1;
                    }
                }
            }
        }
        if covered == 0 {
            return Ok(0.0);
        }
        ensure_finite(sum / covered as f64, self.name())
    }
}

/// Normalized radial distance of a point from a mark centre (1.0 on the
/// shape boundary). Degenerate extents place every point outside.
fn radial_distance(mark: &Mark, point: &mpp_core::Point) -> f64 {
    let mut sum = 0.0;
    for axis in 0..3 {
        let extent = mark.shape().extent_along(axis);
        let offset = point.component(axis) - mark.position().component(axis);
        if extent <= 0.0 {
            if offset.abs() > 0.0 {
                return f64::INFINITY;
            }
        } else {
            let ratio = offset / extent;
            sum += ratio * ratio;
        }
    }
    sum.sqrt()
}

/// Volume of the mark's shape; image-independent regularization term.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeVolume;

impl UnaryFeature for ShapeVolume {
    fn name(&self) -> &str {
        "shape-volume"
    }

    fn evaluate(&self, mark: &Mark, _stack: &ChannelStack) -> Result<f64, MppError> {
        ensure_finite(mark.shape().volume(), self.name())
    }
}

/// Penalizes overlapping mark pairs.
///
/// Returns the overlap depth of the two bounding radii normalized by their
/// sum: zero for disjoint marks, approaching one as the centres coincide.
/// Degenerate pairs have no reach to overlap and score zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverlapPenalty;

impl PairwiseFeature for OverlapPenalty {
    fn name(&self) -> &str {
        "overlap-penalty"
    }

    fn evaluate(&self, a: &Mark, b: &Mark, _stack: &ChannelStack) -> Result<f64, MppError> {
        let reach = a.shape().max_extent() + b.shape().max_extent();
        let distance = a.position().distance_to(b.position());
        if distance >= reach {
            return Ok(0.0);
        }
        ensure_finite((reach - distance) / reach, self.name())
    }
}

/// Signed gap between two mark boundaries (negative when they overlap).
#[derive(Debug, Clone, Copy, Default)]
pub struct SeparationGap;

impl PairwiseFeature for SeparationGap {
    fn name(&self) -> &str {
        "separation-gap"
    }

    fn evaluate(&self, a: &Mark, b: &Mark, _stack: &ChannelStack) -> Result<f64, MppError> {
        let distance = a.position().distance_to(b.position());
        let gap = distance - a.shape().max_extent() - b.shape().max_extent();
        ensure_finite(gap, self.name())
    }
}
