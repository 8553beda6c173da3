//! esdf_grid - block-sparse voxel storage for ESDF relaxation.
//!
//! This crate owns the voxels the relaxation engine mutates: an arena of
//! fixed-size cubic blocks keyed by block coordinate, the configuration the
//! engine runs with, and the face-adjacency tables it propagates along.
//!
//! # Core Types
//!
//! - [`EsdfGrid`]: The grid container
//! - [`EsdfGridBuilder`]: Builder pattern for constructing grids
//! - [`EsdfConfig`]: Block size, voxel size, capacity and pass order
//! - [`BlockStorage`]: Contiguous per-block voxel arena
//! - [`BlockMap`]: Open-addressing table for O(1) block lookups
//! - [`AdjacencyTable`] / [`BlockAdjacency`]: Face neighbors by arena index
//!
//! # Example
//!
//! ```
//! use esdf_grid::{AdjacencyTable, BlockCoord, Direction, EsdfGridBuilder, GlobalVoxelCoord};
//!
//! let grid = EsdfGridBuilder::new(8, 0.1)
//!     .with_capacity(16)
//!     .add_block_range(BlockCoord::new(0, 0, 0), BlockCoord::new(1, 0, 0))
//!     .seed(GlobalVoxelCoord::new(7, 4, 4), 0.0)
//!     .build()
//!     .unwrap();
//!
//! let table = AdjacencyTable::build_all(&grid);
//! assert_eq!(table.entries()[0].neighbor(Direction::X_PLUS), Some(1));
//! ```
//!
//! # Crate Features
//!
//! - `rayon` (default): Parallel block iterators
//! - `serde`: Serialization for the configuration and voxel types

pub mod adjacency;
pub mod config;
pub mod error;
pub mod memory;

// Re-export core types from esdf_core
pub use esdf_core::{
    Axis, BlockCoord, BlockInfo, Direction, EsdfFlags, EsdfVoxel, GlobalVoxelCoord, VoxelCoord,
};

// Re-export main types
pub use adjacency::{AdjacencyTable, BlockAdjacency};
pub use config::EsdfConfig;
pub use error::{GridError, Result};
pub use memory::{BlockMap, BlockStorage, EsdfGrid, EsdfGridBuilder};
