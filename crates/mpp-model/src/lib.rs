#![deny(missing_docs)]

//! Entity model for the MPP sampler: immutable marks, configurations with
//! unique identifiers, and the directional bound geometry constraining
//! proposals.

pub mod bounds;
pub mod configuration;
pub mod mark;

pub use bounds::{
    admissible_extent, directional_bound, shape_fits, BidirectionalBound, Orientation, SceneExtent,
};
pub use configuration::Configuration;
pub use mark::{Mark, MarkStamp, Shape};
