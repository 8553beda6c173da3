//! EsdfGridBuilder pattern for constructing an EsdfGrid.
//!
//! Provides a fluent API for building grids with validation.

use esdf_core::{BlockCoord, EsdfVoxel, GlobalVoxelCoord, VoxelCoord};

use super::grid::EsdfGrid;
use crate::config::EsdfConfig;
use crate::error::{GridError, Result};

/// Builder for constructing [`EsdfGrid`] instances.
///
/// # Example
///
/// ```
/// use esdf_grid::{EsdfGridBuilder, BlockCoord, GlobalVoxelCoord};
///
/// let grid = EsdfGridBuilder::new(8, 0.1)
///     .with_capacity(64)
///     .add_empty_block(BlockCoord::new(1, 0, 0))
///     .seed(GlobalVoxelCoord::new(0, 0, 0), 0.0)
///     .build()
///     .unwrap();
///
/// assert_eq!(grid.num_blocks(), 2);
/// ```
pub struct EsdfGridBuilder {
    config: EsdfConfig,
    blocks: Vec<(BlockCoord, Vec<EsdfVoxel>)>,
    seeds: Vec<(GlobalVoxelCoord, f32)>,
}

impl EsdfGridBuilder {
    /// Create a new builder with the specified grid parameters.
    ///
    /// # Arguments
    /// * `voxels_per_side` - Number of voxels per axis per block
    /// * `voxel_size` - Size of each voxel in world units
    pub fn new(voxels_per_side: u32, voxel_size: f32) -> Self {
        Self {
            config: EsdfConfig::new(voxels_per_side, voxel_size, 1024),
            blocks: Vec::new(),
            seeds: Vec::new(),
        }
    }

    /// Start from a full configuration.
    pub fn from_config(config: EsdfConfig) -> Self {
        Self {
            config,
            blocks: Vec::new(),
            seeds: Vec::new(),
        }
    }

    /// Set the maximum number of blocks the grid can hold.
    ///
    /// The default capacity is 1024 blocks.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Restrict relaxation to the x/y plane.
    pub fn planar(mut self, planar: bool) -> Self {
        self.config.planar = planar;
        self
    }

    /// Cap the number of relaxation cycles.
    pub fn max_cycles(mut self, max_cycles: u32) -> Self {
        self.config.max_cycles = max_cycles;
        self
    }

    /// Add a block with explicit voxels.
    ///
    /// The voxel vector must have exactly `voxels_per_side³` elements.
    ///
    /// # Errors
    /// Returns `InvalidBlockSize` if voxels has the wrong number of elements.
    pub fn add_block(mut self, coord: BlockCoord, voxels: Vec<EsdfVoxel>) -> Result<Self> {
        let expected = self.voxels_per_block();
        if voxels.len() != expected {
            return Err(GridError::InvalidBlockSize {
                expected,
                got: voxels.len(),
            });
        }
        self.blocks.push((coord, voxels));
        Ok(self)
    }

    /// Add a block of unknown voxels.
    pub fn add_empty_block(mut self, coord: BlockCoord) -> Self {
        let voxels = vec![EsdfVoxel::default(); self.voxels_per_block()];
        self.blocks.push((coord, voxels));
        self
    }

    /// Add a block with voxels computed from their global coordinates.
    pub fn add_block_fn<F>(mut self, coord: BlockCoord, voxel_fn: F) -> Self
    where
        F: Fn(GlobalVoxelCoord) -> EsdfVoxel,
    {
        let dim = self.config.voxels_per_side;
        let voxels = (0..self.voxels_per_block())
            .map(|i| {
                let local = VoxelCoord::from_flat_index(i, dim);
                voxel_fn(GlobalVoxelCoord::from_block_and_voxel(coord, local, dim))
            })
            .collect();
        self.blocks.push((coord, voxels));
        self
    }

    /// Add unknown blocks for every coordinate in the inclusive box `min..=max`.
    pub fn add_block_range(mut self, min: BlockCoord, max: BlockCoord) -> Self {
        for z in min.z..=max.z {
            for y in min.y..=max.y {
                for x in min.x..=max.x {
                    self = self.add_empty_block(BlockCoord::new(x, y, z));
                }
            }
        }
        self
    }

    /// Record an observed surface voxel, applied after all blocks are placed.
    ///
    /// The containing block is allocated on build if no `add_*` call named it.
    pub fn seed(mut self, global: GlobalVoxelCoord, distance: f32) -> Self {
        self.seeds.push((global, distance));
        self
    }

    /// Get the number of blocks added so far.
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Get the expected voxels per block.
    pub fn voxels_per_block(&self) -> usize {
        self.config.voxels_per_block()
    }

    /// Build the final grid.
    ///
    /// Consumes the builder and returns the constructed grid.
    ///
    /// # Errors
    /// - anything [`EsdfConfig::validate`] rejects
    /// - `CapacityExceeded` if more blocks were added than capacity allows
    /// - `DuplicateBlock` if the same coordinate was added twice
    pub fn build(self) -> Result<EsdfGrid> {
        let mut grid = EsdfGrid::new(self.config)?;

        let num_blocks = self.blocks.len();
        if num_blocks > self.config.capacity {
            return Err(GridError::CapacityExceeded {
                blocks: num_blocks,
                capacity: self.config.capacity,
            });
        }

        for (coord, voxels) in self.blocks {
            if grid.has_block(coord) {
                return Err(GridError::duplicate(coord));
            }
            let block_idx = grid.allocate_block(coord)?;
            grid.storage.set_block(block_idx, &voxels);
        }

        for (global, distance) in self.seeds {
            grid.seed_observed(global, distance)?;
        }

        Ok(grid)
    }

    /// Build the grid, reserving extra capacity for future blocks.
    pub fn build_with_extra(mut self, extra: usize) -> Result<EsdfGrid> {
        let needed = self.blocks.len().saturating_add(extra);
        if needed > self.config.capacity {
            self.config.capacity = needed;
        }
        self.build()
    }
}

impl Default for EsdfGridBuilder {
    fn default() -> Self {
        Self::from_config(EsdfConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_basic() {
        let grid = EsdfGridBuilder::new(4, 0.5)
            .with_capacity(10)
            .add_empty_block(BlockCoord::new(0, 0, 0))
            .build()
            .unwrap();

        assert_eq!(grid.num_blocks(), 1);
        assert_eq!(grid.voxel_size(), 0.5);
        assert!(grid.has_block(BlockCoord::new(0, 0, 0)));
    }

    #[test]
    fn test_builder_wrong_size() {
        let result = EsdfGridBuilder::new(4, 1.0)
            .add_block(BlockCoord::new(0, 0, 0), vec![EsdfVoxel::default(); 10]);

        assert!(matches!(
            result,
            Err(GridError::InvalidBlockSize {
                expected: 64,
                got: 10
            })
        ));
    }

    #[test]
    fn test_builder_duplicate() {
        let result = EsdfGridBuilder::new(2, 1.0)
            .add_empty_block(BlockCoord::new(0, 0, 0))
            .add_empty_block(BlockCoord::new(0, 0, 0))
            .build();

        assert!(matches!(
            result,
            Err(GridError::DuplicateBlock { x: 0, y: 0, z: 0 })
        ));
    }

    #[test]
    fn test_builder_capacity_exceeded() {
        let result = EsdfGridBuilder::new(2, 1.0)
            .with_capacity(2)
            .add_block_range(BlockCoord::new(0, 0, 0), BlockCoord::new(2, 0, 0))
            .build();

        assert!(matches!(
            result,
            Err(GridError::CapacityExceeded {
                blocks: 3,
                capacity: 2
            })
        ));
    }

    #[test]
    fn test_builder_zero_capacity() {
        let result = EsdfGridBuilder::new(4, 1.0).with_capacity(0).build();
        assert!(matches!(result, Err(GridError::ZeroCapacity)));
    }

    #[test]
    fn test_builder_block_fn_sees_global_coords() {
        let grid = EsdfGridBuilder::new(4, 1.0)
            .add_block_fn(BlockCoord::new(-1, 0, 0), |g| {
                if g.x == -1 && g.y == 0 && g.z == 0 {
                    EsdfVoxel::observed(0.0, BlockCoord::new(-1, 0, 0))
                } else {
                    EsdfVoxel::default()
                }
            })
            .build()
            .unwrap();

        let v = grid
            .voxel(BlockCoord::new(-1, 0, 0), VoxelCoord::new(3, 0, 0))
            .unwrap();
        assert!(v.is_observed());
        assert_eq!(grid.iter_fixed().count(), 1);
    }

    #[test]
    fn test_builder_seeds_allocate_blocks() {
        let grid = EsdfGridBuilder::new(4, 1.0)
            .planar(true)
            .max_cycles(7)
            .add_empty_block(BlockCoord::new(0, 0, 0))
            .seed(GlobalVoxelCoord::new(1, 1, 0), 0.0)
            .seed(GlobalVoxelCoord::new(9, 0, 0), 0.0)
            .build()
            .unwrap();

        assert_eq!(grid.num_blocks(), 2);
        assert!(grid.has_block(BlockCoord::new(2, 0, 0)));
        assert!(grid.config().planar);
        assert_eq!(grid.config().max_cycles, 7);
    }

    #[test]
    fn test_build_with_extra() {
        let mut grid = EsdfGridBuilder::new(2, 1.0)
            .with_capacity(1)
            .add_empty_block(BlockCoord::new(0, 0, 0))
            .build_with_extra(3)
            .unwrap();

        assert_eq!(grid.capacity(), 4);
        for x in 1..4 {
            grid.allocate_block(BlockCoord::new(x, 0, 0)).unwrap();
        }
        assert!(grid.allocate_block(BlockCoord::new(9, 0, 0)).is_err());
    }
}
