//! Shift and reshape proposals: moves that perturb an existing mark.

use mpp_core::{ErrorNode, MppError, RngHandle};
use mpp_model::{directional_bound, shape_fits, Configuration, SceneExtent};

use crate::config::ProposalSettings;
use crate::moves::{ensure_sound, MoveKind, MoveProposal};

/// Proposes relocating a uniformly chosen mark along one rotated axis,
/// within its bidirectional bound.
pub fn propose_shift(
    configuration: &Configuration,
    scene: &SceneExtent,
    rng: &mut RngHandle,
    trace: &mut ErrorNode,
) -> Result<Option<MoveProposal>, MppError> {
    ensure_sound(configuration)?;

    let index = match rng.index(configuration.len()) {
        Some(index) => index,
        None => {
            trace.push("shift rejected: configuration is empty");
            return Ok(None);
        }
    };
    let mark = &configuration.marks()[index];
    let axis = rng.index(scene.dims()).unwrap_or(0);
    let bound = directional_bound(mark.position(), mark.orientation(), mark.shape(), axis, scene);
    if bound.is_degenerate() {
        trace.push_for_mark(
            format!("shift rejected: degenerate bound along axis {axis}"),
            mark.id(),
        );
        return Ok(None);
    }

    let resolved = mark.orientation().resolve_axis(axis, scene.dims());
    let offset = rng.uniform_in(-bound.near(), bound.far());
    let coordinate = mark.position().component(resolved) + offset;
    let moved = mark.with_position(mark.position().with_component(resolved, coordinate));

    let mut candidate = configuration.duplicate();
    let touched = moved.id();
    candidate.replace(moved)?;

    let span = bound.span();
    Ok(Some(MoveProposal {
        candidate,
        kind: MoveKind::Shift,
        touched,
        forward_prob: 1.0 / (configuration.len() as f64 * span),
        reverse_prob: 1.0 / (configuration.len() as f64 * span),
        description: format!("shift:m{}:axis{resolved}:{offset:+.3}", touched.as_raw()),
    }))
}

/// Proposes rescaling a uniformly chosen mark's shape.
///
/// The scaled shape must still fit within the admissible extent at the
/// mark's position; a shape that would poke out of the scene, or collapse to
/// zero extent, is an ordinary rejection.
pub fn propose_reshape(
    configuration: &Configuration,
    scene: &SceneExtent,
    settings: &ProposalSettings,
    rng: &mut RngHandle,
    trace: &mut ErrorNode,
) -> Result<Option<MoveProposal>, MppError> {
    ensure_sound(configuration)?;

    let index = match rng.index(configuration.len()) {
        Some(index) => index,
        None => {
            trace.push("reshape rejected: configuration is empty");
            return Ok(None);
        }
    };
    let mark = &configuration.marks()[index];
    let factor = rng.uniform_in(settings.reshape_min, settings.reshape_max);
    let reshaped = mark.shape().scaled(factor);
    if reshaped.is_degenerate() {
        trace.push_for_mark(
            format!("reshape rejected: factor {factor:.3} collapses the shape"),
            mark.id(),
        );
        return Ok(None);
    }
    if !shape_fits(mark.position(), mark.orientation(), &reshaped, scene) {
        trace.push_for_mark(
            format!("reshape rejected: factor {factor:.3} pushes the shape out of the scene"),
            mark.id(),
        );
        return Ok(None);
    }

    let resized = mark.with_shape(reshaped);
    let mut candidate = configuration.duplicate();
    let touched = resized.id();
    candidate.replace(resized)?;

    Ok(Some(MoveProposal {
        candidate,
        kind: MoveKind::Reshape,
        touched,
        forward_prob: 1.0 / configuration.len() as f64,
        reverse_prob: 1.0 / configuration.len() as f64,
        description: format!("reshape:m{}:x{factor:.3}", touched.as_raw()),
    }))
}
