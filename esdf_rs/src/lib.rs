//! # esdf_rs
//!
//! Parallel distance relaxation over a block-sparse voxel grid.
//!
//! Observed voxels carry known distances. Everything else starts unknown and
//! is filled in by repeated relaxation: a voxel takes its neighbor's distance
//! plus one voxel step whenever that is shorter than what it holds, and
//! remembers which block the distance came from. The result is a
//! Manhattan-style distance field over every block reachable from a seed.
//!
//! Work is split into two kinds of pass:
//!
//! - **Sweep** ([`sweep`]): every 1D voxel line of a block is relaxed from
//!   one end to the other, so distances cross a whole block in one pass.
//!   Blocks are swept in parallel.
//! - **Propagate** ([`propagate`]): a block's boundary face is relaxed into
//!   the facing boundary of its neighbor. Each direction runs as a
//!   gather phase followed by an apply phase with one writer per block.
//!
//! [`ConvergenceDriver`] alternates the two per axis and narrows the working
//! set to blocks that changed, until a cycle changes nothing.
//!
//! ## Quick Start
//!
//! ```
//! use esdf_rs::{BlockCoord, ConvergenceDriver, EsdfGridBuilder, GlobalVoxelCoord};
//!
//! let mut grid = EsdfGridBuilder::new(4, 1.0)
//!     .add_block_range(BlockCoord::new(0, 0, 0), BlockCoord::new(1, 0, 0))
//!     .seed(GlobalVoxelCoord::new(0, 0, 0), 0.0)
//!     .build()
//!     .unwrap();
//!
//! let report = ConvergenceDriver::new(&grid).run(&mut grid);
//! assert!(report.converged());
//!
//! let far = grid.voxel_at_global(GlobalVoxelCoord::new(7, 3, 3)).unwrap();
//! assert_eq!(far.distance, 13.0);
//! ```
//!
//! ## Logging
//!
//! Progress is reported through the `log` facade: one `debug` record per
//! pass, `info` on convergence and `warn` when the cycle cap stops a run.
//! No logger is installed here.
//!
//! ## Feature Flags
//!
//! - `serde`: Serialization for configuration and voxel types

pub mod driver;
pub mod error;
pub mod propagate;
pub mod sweep;

pub use driver::{ConvergenceDriver, ConvergenceReport, DriverState, Outcome, PassKind, PassReport};
pub use error::{EsdfError, Result};
pub use propagate::{propagate_axis, propagate_direction, PropagationStats};
pub use sweep::{sweep_axis, sweep_block, sweep_blocks, PassStats};

// Re-export the types callers need to build and read a grid
pub use esdf_core::{
    try_relax, try_relax_marking_site, AtomicBlockInfo, Axis, BlockCoord, BlockInfo, Direction,
    EsdfFlags, EsdfVoxel, GlobalVoxelCoord, VoxelCoord,
};
pub use esdf_grid::{
    AdjacencyTable, BlockAdjacency, EsdfConfig, EsdfGrid, EsdfGridBuilder, GridError,
};

/// Relax `grid` to its fixed point, starting from every block.
///
/// Shorthand for [`ConvergenceDriver::new`] followed by
/// [`ConvergenceDriver::run`].
pub fn compute_esdf(grid: &mut EsdfGrid) -> ConvergenceReport {
    ConvergenceDriver::new(grid).run(grid)
}
