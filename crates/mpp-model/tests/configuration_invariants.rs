use std::sync::Arc;

use mpp_core::{MarkId, Point};
use mpp_model::{Configuration, Mark, Orientation, Shape};

fn sphere(id: u64, x: f64, radius: f64) -> Mark {
    Mark::new(
        MarkId::from_raw(id),
        Point::new(x, 0.0, 0.0),
        Orientation::identity(),
        Shape::Sphere { radius },
    )
}

#[test]
fn duplicate_id_insert_is_rejected() {
    let mut configuration = Configuration::empty();
    configuration.insert(sphere(1, 0.0, 1.0)).unwrap();
    let err = configuration.insert(sphere(1, 5.0, 2.0)).unwrap_err();
    assert_eq!(err.info().code, "duplicate-mark-id");
    assert_eq!(configuration.len(), 1);
}

#[test]
fn remove_absent_id_is_an_error() {
    let mut configuration = Configuration::empty();
    let err = configuration.remove(MarkId::from_raw(9)).unwrap_err();
    assert_eq!(err.info().code, "absent-mark-id");
}

#[test]
fn validate_detects_smuggled_duplicates() {
    let configuration =
        Configuration::from_marks_unvalidated(vec![sphere(1, 0.0, 1.0), sphere(1, 3.0, 1.0)]);
    assert!(configuration.validate().is_err());

    let sound = Configuration::from_marks(vec![sphere(1, 0.0, 1.0), sphere(2, 3.0, 1.0)]).unwrap();
    assert!(sound.validate().is_ok());
}

#[test]
fn duplicate_shares_mark_handles() {
    let configuration = Configuration::from_marks(vec![sphere(1, 0.0, 1.0)]).unwrap();
    let copy = configuration.duplicate();
    assert!(Arc::ptr_eq(
        &configuration.marks()[0],
        &copy.marks()[0]
    ));
    assert_eq!(configuration, copy);
}

#[test]
fn modified_marks_are_new_snapshots() {
    let original = sphere(1, 0.0, 1.0);
    let moved = original.with_position(Point::new(2.0, 0.0, 0.0));
    assert_eq!(original.generation(), 0);
    assert_eq!(moved.generation(), 1);
    assert_eq!(original.position().x, 0.0);
    assert_ne!(original.stamp(), moved.stamp());
    assert_eq!(original.id(), moved.id());
}

#[test]
fn replace_swaps_the_snapshot_for_an_id() {
    let mut configuration = Configuration::from_marks(vec![sphere(1, 0.0, 1.0)]).unwrap();
    let reshaped = configuration.marks()[0].with_shape(Shape::Sphere { radius: 2.5 });
    configuration.replace(reshaped).unwrap();
    assert_eq!(
        configuration.get(MarkId::from_raw(1)).unwrap().shape(),
        &Shape::Sphere { radius: 2.5 }
    );

    let stray = sphere(7, 0.0, 1.0);
    assert!(configuration.replace(stray).is_err());
}

#[test]
fn next_free_id_skips_existing_ids() {
    let configuration = Configuration::from_marks(vec![sphere(0, 0.0, 1.0), sphere(4, 2.0, 1.0)]).unwrap();
    assert_eq!(configuration.next_free_id(), MarkId::from_raw(5));
    assert_eq!(Configuration::empty().next_free_id(), MarkId::from_raw(0));
}

#[test]
fn serde_roundtrip_re_checks_uniqueness() {
    let configuration = Configuration::from_marks(vec![sphere(1, 0.0, 1.0), sphere(2, 4.0, 0.5)]).unwrap();
    let json = serde_json::to_string(&configuration).unwrap();
    let restored: Configuration = serde_json::from_str(&json).unwrap();
    assert_eq!(configuration, restored);

    let corrupt = serde_json::to_string(&Vec::<Mark>::from(
        Configuration::from_marks_unvalidated(vec![sphere(1, 0.0, 1.0), sphere(1, 2.0, 1.0)]),
    ))
    .unwrap();
    assert!(serde_json::from_str::<Configuration>(&corrupt).is_err());
}
