//! In-memory grid types.
//!
//! This module provides the core grid types:
//! - `EsdfGrid`: The block-sparse voxel container
//! - `EsdfGridBuilder`: Builder pattern for constructing grids
//! - `BlockStorage`: Contiguous per-block voxel arena
//! - `BlockMap`: Coordinate to arena index table

pub mod block_map;
pub mod builder;
pub mod grid;
pub mod storage;

pub use block_map::BlockMap;
pub use builder::EsdfGridBuilder;
pub use grid::EsdfGrid;
pub use storage::BlockStorage;
