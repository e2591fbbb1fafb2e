#![deny(missing_docs)]

//! Raster context for the MPP sampler: immutable multi-channel voxel stacks
//! with identity tokens used by the feature cache.

pub mod stack;

pub use stack::{ChannelStack, StackDimensions, StackId};
