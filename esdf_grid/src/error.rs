//! Error types for esdf_grid operations.

use esdf_core::{BlockCoord, EsdfCoreError, GlobalVoxelCoord};
use thiserror::Error;

/// Errors that can occur while building or mutating a grid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Attempted to create a grid with zero capacity.
    #[error("grid capacity cannot be zero")]
    ZeroCapacity,

    /// Block count exceeds the configured capacity.
    #[error("block count {blocks} exceeds capacity {capacity}")]
    CapacityExceeded {
        /// Number of blocks attempted to store.
        blocks: usize,
        /// Maximum capacity of the grid.
        capacity: usize,
    },

    /// Block data has the wrong number of voxels.
    #[error("invalid block size: expected {expected} voxels, got {got}")]
    InvalidBlockSize {
        /// Expected number of voxels (S³).
        expected: usize,
        /// Actual number of voxels provided.
        got: usize,
    },

    /// Attempted to insert a duplicate block coordinate.
    #[error("duplicate block coordinate: ({x}, {y}, {z})")]
    DuplicateBlock {
        /// X coordinate.
        x: i32,
        /// Y coordinate.
        y: i32,
        /// Z coordinate.
        z: i32,
    },

    /// The block is not allocated.
    #[error("block not found: ({x}, {y}, {z})")]
    BlockNotFound {
        /// X coordinate.
        x: i32,
        /// Y coordinate.
        y: i32,
        /// Z coordinate.
        z: i32,
    },

    /// No block has this arena index.
    #[error("block index {index} out of range ({num_blocks} blocks)")]
    BlockIndexOutOfRange {
        /// The rejected index.
        index: usize,
        /// Number of allocated blocks.
        num_blocks: usize,
    },

    /// The block coordinate cannot be keyed by the block map.
    ///
    /// Wide enough to report blocks of global voxels that overflow `i32`.
    #[error("block coordinate ({x}, {y}, {z}) is outside the addressable range")]
    CoordinateOutOfRange {
        /// X coordinate.
        x: i64,
        /// Y coordinate.
        y: i64,
        /// Z coordinate.
        z: i64,
    },

    /// Hash table is full (should not happen with proper capacity planning).
    #[error("hash table is full")]
    HashTableFull,

    /// The configuration cannot be used.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong.
        message: &'static str,
    },

    /// Error from the core types.
    #[error(transparent)]
    Core(#[from] EsdfCoreError),
}

impl GridError {
    pub(crate) fn duplicate(coord: BlockCoord) -> Self {
        GridError::DuplicateBlock {
            x: coord.x,
            y: coord.y,
            z: coord.z,
        }
    }

    pub(crate) fn not_found(coord: BlockCoord) -> Self {
        GridError::BlockNotFound {
            x: coord.x,
            y: coord.y,
            z: coord.z,
        }
    }

    pub(crate) fn out_of_range(coord: BlockCoord) -> Self {
        GridError::CoordinateOutOfRange {
            x: coord.x.into(),
            y: coord.y.into(),
            z: coord.z.into(),
        }
    }

    pub(crate) fn global_out_of_range(global: GlobalVoxelCoord, dim: u32) -> Self {
        let d = i64::from(dim);
        GridError::CoordinateOutOfRange {
            x: global.x.div_euclid(d),
            y: global.y.div_euclid(d),
            z: global.z.div_euclid(d),
        }
    }
}

/// Result type alias for esdf_grid operations.
pub type Result<T> = core::result::Result<T, GridError>;
