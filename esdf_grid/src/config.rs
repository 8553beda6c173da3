//! Grid and relaxation configuration.

use esdf_core::{validate_dimension, validate_step, Axis};

use crate::error::{GridError, Result};

const AXES_3D: [Axis; 3] = Axis::ALL;
const AXES_PLANAR: [Axis; 2] = [Axis::X, Axis::Y];

/// Grid configuration parameters (immutable after construction).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EsdfConfig {
    /// Voxels per block edge (`S`).
    pub voxels_per_side: u32,
    /// World units per voxel; also the relaxation step.
    pub voxel_size: f32,
    /// Maximum number of blocks the grid can hold.
    pub capacity: usize,
    /// Only sweep and propagate along x and y.
    pub planar: bool,
    /// Upper bound on full cycles before the driver gives up.
    pub max_cycles: u32,
}

impl EsdfConfig {
    /// Largest `capacity` accepted; block indices are stored as `u32`.
    pub const MAX_CAPACITY: usize = u32::MAX as usize;

    /// Create a new configuration with default `planar` and `max_cycles`.
    ///
    /// # Arguments
    /// * `voxels_per_side` - Voxels per block edge (2 to 64)
    /// * `voxel_size` - World units per voxel
    /// * `capacity` - Maximum number of blocks
    #[inline]
    pub const fn new(voxels_per_side: u32, voxel_size: f32, capacity: usize) -> Self {
        Self {
            voxels_per_side,
            voxel_size,
            capacity,
            planar: false,
            max_cycles: 256,
        }
    }

    /// Set planar mode.
    #[inline]
    pub const fn with_planar(mut self, planar: bool) -> Self {
        self.planar = planar;
        self
    }

    /// Set the cycle cap.
    #[inline]
    pub const fn with_max_cycles(mut self, max_cycles: u32) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Total number of voxels per block (S³).
    #[inline]
    pub const fn voxels_per_block(&self) -> usize {
        esdf_core::voxels_per_block(self.voxels_per_side)
    }

    /// Size of each block in world units.
    #[inline]
    pub fn block_size(&self) -> f32 {
        self.voxels_per_side as f32 * self.voxel_size
    }

    /// Axes visited per cycle, in order. Each axis runs its "+" then "-"
    /// direction, so planar grids never sweep or propagate along z.
    #[inline]
    pub fn axes(&self) -> &'static [Axis] {
        if self.planar {
            &AXES_PLANAR
        } else {
            &AXES_3D
        }
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        validate_dimension(self.voxels_per_side)?;
        validate_step(self.voxel_size)?;
        if self.capacity == 0 {
            return Err(GridError::ZeroCapacity);
        }
        if self.capacity > Self::MAX_CAPACITY {
            return Err(GridError::InvalidConfig {
                message: "capacity exceeds the largest block index",
            });
        }
        if self.max_cycles == 0 {
            return Err(GridError::InvalidConfig {
                message: "max_cycles must be at least 1",
            });
        }
        Ok(())
    }
}

impl Default for EsdfConfig {
    fn default() -> Self {
        Self::new(16, 1.0, 1024)
    }
}
