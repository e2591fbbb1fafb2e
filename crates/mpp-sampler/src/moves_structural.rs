//! Birth and death proposals: moves that change the mark count.

use mpp_core::{ErrorNode, MppError, Point, RngHandle};
use mpp_model::{admissible_extent, Configuration, Mark, Orientation, SceneExtent, Shape};

use crate::config::ProposalSettings;
use crate::moves::{ensure_sound, MoveKind, MoveProposal};

/// Proposes inserting a new spherical mark at a uniformly sampled position.
///
/// The requested radius is clamped by the directional bounds at the sampled
/// position; a position whose bound collapses to zero is an ordinary
/// rejection.
pub fn propose_birth(
    configuration: &Configuration,
    scene: &SceneExtent,
    settings: &ProposalSettings,
    rng: &mut RngHandle,
    trace: &mut ErrorNode,
) -> Result<Option<MoveProposal>, MppError> {
    ensure_sound(configuration)?;

    let mut position = Point::default();
    for axis in 0..scene.dims() {
        position = position.with_component(axis, rng.uniform_in(0.0, scene.size_along(axis)));
    }
    let orientation = Orientation::new(rng.index(scene.dims()).unwrap_or(0));
    let desired = rng.uniform_in(0.0, settings.birth_radius);
    let requested = Shape::Sphere { radius: desired };
    let allowed = admissible_extent(&position, &orientation, &requested, scene);
    if allowed <= 0.0 {
        trace.push(format!(
            "birth bound collapsed at ({:.2}, {:.2}, {:.2})",
            position.x, position.y, position.z
        ));
        return Ok(None);
    }

    let id = configuration.next_free_id();
    let mark = Mark::new(
        id,
        position,
        orientation,
        Shape::Sphere {
            radius: desired.min(allowed),
        },
    );
    let mut candidate = configuration.duplicate();
    candidate.insert(mark)?;

    let population = candidate.len() as f64;
    Ok(Some(MoveProposal {
        candidate,
        kind: MoveKind::Birth,
        touched: id,
        forward_prob: 1.0 / population,
        reverse_prob: 1.0 / population,
        description: format!("birth:m{}:r{:.3}", id.as_raw(), desired.min(allowed)),
    }))
}

/// Proposes removing a uniformly chosen mark.
///
/// An empty configuration is an ordinary rejection; there is nothing to
/// remove and no precondition has been violated.
pub fn propose_death(
    configuration: &Configuration,
    rng: &mut RngHandle,
    trace: &mut ErrorNode,
) -> Result<Option<MoveProposal>, MppError> {
    ensure_sound(configuration)?;

    let index = match rng.index(configuration.len()) {
        Some(index) => index,
        None => {
            trace.push("death rejected: configuration is empty");
            return Ok(None);
        }
    };
    let victim = configuration.marks()[index].id();
    let population = configuration.len() as f64;

    let mut candidate = configuration.duplicate();
    candidate.remove(victim)?;

    Ok(Some(MoveProposal {
        candidate,
        kind: MoveKind::Death,
        touched: victim,
        forward_prob: 1.0 / population,
        reverse_prob: 1.0 / population,
        description: format!("death:m{}", victim.as_raw()),
    }))
}
