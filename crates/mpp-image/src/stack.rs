//! Multi-channel voxel stacks and their identity tokens.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mpp_core::errors::ErrorInfo;
use mpp_core::MppError;
use serde::{Deserialize, Serialize};

static NEXT_STACK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a [`ChannelStack`].
///
/// Feature-cache keys embed this token so that entries computed against one
/// stack are never confused with entries computed against another, without
/// ever comparing pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StackId(u64);

impl StackId {
    fn mint() -> Self {
        Self(NEXT_STACK_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw integer representation of the identity.
    pub fn as_raw(&self) -> u64 {
        self.0
    }
}

/// Spatial dimensions and channel count of a stack.
///
/// Immutable for the lifetime of a sampling run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackDimensions {
    /// Extent along the first spatial axis, in voxels.
    pub width: usize,
    /// Extent along the second spatial axis, in voxels.
    pub height: usize,
    /// Extent along the third spatial axis, in voxels (1 for 2D images).
    pub depth: usize,
    /// Number of channels.
    pub channels: usize,
}

impl StackDimensions {
    /// Creates a dimension descriptor.
    pub fn new(width: usize, height: usize, depth: usize, channels: usize) -> Self {
        Self {
            width,
            height,
            depth,
            channels,
        }
    }

    /// Number of voxels in one channel.
    pub fn volume(&self) -> usize {
        self.width * self.height * self.depth
    }

    /// Number of spatial dimensions (2 when the depth is a single slice).
    pub fn spatial_dims(&self) -> usize {
        if self.depth > 1 {
            3
        } else {
            2
        }
    }

    /// Whether the voxel coordinate lies inside the stack.
    pub fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.width && y < self.height && z < self.depth
    }

    fn offset(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }
}

/// Read-only multi-channel voxel buffer set plus global scalar parameters.
///
/// The stack is the raster context energy features read from. Buffers and
/// dimensions are immutable after construction, so the stack is safe to
/// share across concurrently running chains without locking.
#[derive(Debug, Clone)]
pub struct ChannelStack {
    id: StackId,
    dims: StackDimensions,
    buffers: Vec<Arc<[f32]>>,
    globals: BTreeMap<String, f64>,
}

impl ChannelStack {
    /// Builds a stack from per-channel buffers.
    ///
    /// Fails when the number of buffers disagrees with the declared channel
    /// count or when any buffer length differs from the voxel volume.
    pub fn new(
        dims: StackDimensions,
        buffers: Vec<Vec<f32>>,
        globals: BTreeMap<String, f64>,
    ) -> Result<Self, MppError> {
        if buffers.len() != dims.channels {
            return Err(MppError::Raster(
                ErrorInfo::new("channel-count-mismatch", "buffer count differs from channel count")
                    .with_context("expected", dims.channels.to_string())
                    .with_context("actual", buffers.len().to_string()),
            ));
        }
        let volume = dims.volume();
        for (index, buffer) in buffers.iter().enumerate() {
            if buffer.len() != volume {
                return Err(MppError::Raster(
                    ErrorInfo::new("buffer-length-mismatch", "channel buffer does not match volume")
                        .with_context("channel", index.to_string())
                        .with_context("expected", volume.to_string())
                        .with_context("actual", buffer.len().to_string()),
                ));
            }
        }
        Ok(Self {
            id: StackId::mint(),
            dims,
            buffers: buffers.into_iter().map(Arc::from).collect(),
            globals,
        })
    }

    /// Builds a uniform stack filled with a constant value, for tests and
    /// synthetic scenes.
    pub fn uniform(dims: StackDimensions, value: f32) -> Result<Self, MppError> {
        let buffers = vec![vec![value; dims.volume()]; dims.channels];
        Self::new(dims, buffers, BTreeMap::new())
    }

    /// Returns the process-unique identity of this stack.
    pub fn id(&self) -> StackId {
        self.id
    }

    /// Returns the stack dimensions.
    pub fn dimensions(&self) -> &StackDimensions {
        &self.dims
    }

    /// Returns the buffer for the given channel.
    pub fn channel(&self, index: usize) -> Result<&[f32], MppError> {
        self.buffers.get(index).map(|buffer| &buffer[..]).ok_or_else(|| {
            MppError::Raster(
                ErrorInfo::new("missing-channel", "channel index out of range")
                    .with_context("channel", index.to_string())
                    .with_context("available", self.dims.channels.to_string()),
            )
        })
    }

    /// Reads one voxel from the given channel.
    pub fn voxel(&self, x: usize, y: usize, z: usize, channel: usize) -> Result<f32, MppError> {
        if !self.dims.contains(x, y, z) {
            return Err(MppError::Raster(
                ErrorInfo::new("voxel-out-of-range", "voxel coordinate outside the stack")
                    .with_context("coordinate", format!("({x}, {y}, {z})")),
            ));
        }
        let buffer = self.channel(channel)?;
        Ok(buffer[self.dims.offset(x, y, z)])
    }

    /// Looks up a global scalar parameter by name.
    pub fn global(&self, name: &str) -> Option<f64> {
        self.globals.get(name).copied()
    }
}
