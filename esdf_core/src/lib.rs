//! # esdf_core
//!
//! Pure types and the relaxation rule for block-sparse Euclidean signed
//! distance fields.
//!
//! This crate holds the vocabulary shared by the storage layer
//! (`esdf_grid`) and the relaxation engine (`esdf_rs`): voxels and their
//! flags, block/voxel coordinates, axes and directions, per-block pass
//! summaries, and the single-pair update every pass is built from.
//!
//! ## Features
//!
//! - **no_std compatible**: nothing here allocates
//! - **Pure**: no storage, no threads; atomics only for [`AtomicBlockInfo`]
//!
//! ## Feature Flags
//!
//! - `std` (default): `std::error::Error` for [`EsdfCoreError`]
//! - `serde`: `Serialize`/`Deserialize` for the coordinate and voxel types
//!
//! ## Modules
//!
//! - [`types`]: `BlockCoord`, `VoxelCoord`, `GlobalVoxelCoord`, `Axis`, `Direction`
//! - [`voxel`]: `EsdfVoxel` and `EsdfFlags`
//! - [`relax`]: `try_relax` and its site-marking variant
//! - [`block_info`]: `BlockInfo` snapshots and the `AtomicBlockInfo` accumulator
//! - [`coords`]: face and line index iteration
//! - [`hash`]: Morton keys for block coordinates
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```
//! use esdf_core::prelude::*;
//!
//! let seed = EsdfVoxel::observed(0.0, BlockCoord::new(0, 0, 0));
//! let mut next = EsdfVoxel::default();
//! assert!(try_relax(&mut next, &seed, 0.1));
//! assert_eq!(next.distance, 0.1);
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]

#[cfg(feature = "std")]
extern crate std;

pub mod block_info;
pub mod coords;
pub mod error;
pub mod hash;
pub mod relax;
pub mod types;
pub mod voxel;

/// Smallest supported block side.
pub const MIN_VOXELS_PER_SIDE: u32 = 2;
/// Largest supported block side.
pub const MAX_VOXELS_PER_SIDE: u32 = 64;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::block_info::{AtomicBlockInfo, BlockInfo};
    pub use crate::coords::{face_indices, line_indices, line_starts, neighbor_blocks6};
    pub use crate::error::EsdfCoreError;
    pub use crate::relax::{try_relax, try_relax_marking_site};
    pub use crate::types::{Axis, BlockCoord, Direction, GlobalVoxelCoord, VoxelCoord};
    pub use crate::voxel::{EsdfFlags, EsdfVoxel};
}

pub use block_info::{AtomicBlockInfo, BlockInfo};
pub use coords::{face_indices, line_indices, line_starts, neighbor_blocks6, voxels_per_block};
pub use error::{validate_dimension, validate_step, EsdfCoreError};
pub use hash::{in_morton_range, morton_decode_signed, morton_encode_signed};
pub use relax::{try_relax, try_relax_marking_site};
pub use types::{Axis, BlockCoord, Direction, GlobalVoxelCoord, VoxelCoord};
pub use voxel::{EsdfFlags, EsdfVoxel};
