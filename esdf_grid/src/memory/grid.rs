//! EsdfGrid - the block-sparse voxel store the relaxation engine mutates.

use esdf_core::{
    face_indices, Axis, BlockCoord, EsdfVoxel, GlobalVoxelCoord, VoxelCoord,
};

use super::block_map::BlockMap;
use super::storage::BlockStorage;
use crate::config::EsdfConfig;
use crate::error::{GridError, Result};

/// Blocks the map is sized for up front; larger grids grow it on demand.
const INITIAL_MAP_BLOCKS: usize = 512;

/// Block-sparse ESDF grid.
///
/// The grid uses a two-level hierarchy:
/// 1. **Sparse level**: Hash map from block coordinates to block indices
/// 2. **Dense level**: contiguous `S³` voxel runs, one per block
///
/// Block indices are stable: a block keeps its index from allocation on.
pub struct EsdfGrid {
    /// Block coordinate → index lookup.
    pub(crate) block_map: BlockMap,

    /// Voxel arena.
    pub(crate) storage: BlockStorage,

    /// Grid configuration (immutable after construction).
    pub(crate) config: EsdfConfig,
}

impl EsdfGrid {
    /// Create an empty grid.
    ///
    /// # Errors
    /// Whatever [`EsdfConfig::validate`] rejects.
    pub fn new(config: EsdfConfig) -> Result<Self> {
        config.validate()?;

        // The map grows with the block count; start at ~50% load for small grids
        let map_capacity = config.capacity.min(INITIAL_MAP_BLOCKS) * 2;

        Ok(Self {
            block_map: BlockMap::with_capacity(map_capacity),
            storage: BlockStorage::new(&config),
            config,
        })
    }

    /// Get the grid configuration.
    #[inline]
    pub fn config(&self) -> &EsdfConfig {
        &self.config
    }

    /// Voxels per block edge.
    #[inline]
    pub fn voxels_per_side(&self) -> u32 {
        self.config.voxels_per_side
    }

    /// World units per voxel.
    #[inline]
    pub fn voxel_size(&self) -> f32 {
        self.config.voxel_size
    }

    /// Number of allocated blocks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.storage.num_blocks()
    }

    /// No blocks allocated yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.num_blocks() == 0
    }

    /// Maximum number of blocks.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Allocate a block of unknown voxels, or return the existing index.
    ///
    /// # Errors
    /// - `CoordinateOutOfRange` if the coordinate cannot be keyed
    /// - `CapacityExceeded` if the grid is full
    pub fn allocate_block(&mut self, coord: BlockCoord) -> Result<usize> {
        if let Some(idx) = self.block_map.get(coord) {
            return Ok(idx);
        }
        let idx = self.storage.num_blocks();
        let full = GridError::CapacityExceeded {
            blocks: idx + 1,
            capacity: self.config.capacity,
        };
        if idx >= self.config.capacity {
            return Err(full);
        }
        // Key first: a rejected coordinate must not leave an unmapped block behind
        self.block_map.insert(coord, idx)?;
        self.storage.allocate_block(coord).ok_or(full)
    }

    /// Index of an allocated block.
    #[inline]
    pub fn block_index(&self, coord: BlockCoord) -> Option<usize> {
        self.block_map.get(coord)
    }

    /// Check if a block is allocated.
    #[inline]
    pub fn has_block(&self, coord: BlockCoord) -> bool {
        self.block_map.contains(coord)
    }

    /// Coordinate of the block at `idx`.
    #[inline]
    pub fn block_coord(&self, idx: usize) -> Option<BlockCoord> {
        (idx < self.num_blocks()).then(|| self.storage.get_coord(idx))
    }

    /// Voxels of the block at `idx`.
    #[inline]
    pub fn block(&self, idx: usize) -> Option<&[EsdfVoxel]> {
        (idx < self.num_blocks()).then(|| self.storage.block(idx))
    }

    /// Mutable voxels of the block at `idx`.
    #[inline]
    pub fn block_mut(&mut self, idx: usize) -> Option<&mut [EsdfVoxel]> {
        if idx < self.num_blocks() {
            Some(self.storage.block_mut(idx))
        } else {
            None
        }
    }

    /// One voxel, addressed by block and block-local coordinate.
    #[inline]
    pub fn voxel(&self, block: BlockCoord, voxel: VoxelCoord) -> Option<&EsdfVoxel> {
        let dim = self.voxels_per_side();
        let voxel = voxel.validate(dim).ok()?;
        let idx = self.block_index(block)?;
        Some(self.storage.voxel(idx, voxel.flat_index(dim)))
    }

    /// Mutable voxel, addressed by block and block-local coordinate.
    #[inline]
    pub fn voxel_mut(&mut self, block: BlockCoord, voxel: VoxelCoord) -> Option<&mut EsdfVoxel> {
        let dim = self.voxels_per_side();
        let voxel = voxel.validate(dim).ok()?;
        let idx = self.block_index(block)?;
        Some(self.storage.voxel_mut(idx, voxel.flat_index(dim)))
    }

    /// Split a global coordinate into a keyable block and its local voxel.
    fn locate(&self, global: GlobalVoxelCoord) -> Result<(BlockCoord, VoxelCoord)> {
        let dim = self.voxels_per_side();
        global
            .decompose(dim)
            .filter(|(block, _)| esdf_core::in_morton_range(*block))
            .ok_or_else(|| GridError::global_out_of_range(global, dim))
    }

    /// One voxel, addressed on the global voxel lattice.
    #[inline]
    pub fn voxel_at_global(&self, global: GlobalVoxelCoord) -> Option<&EsdfVoxel> {
        let (block, voxel) = self.locate(global).ok()?;
        self.voxel(block, voxel)
    }

    /// Overwrite a voxel in an allocated block.
    ///
    /// # Errors
    /// - `CoordinateOutOfRange` if the containing block cannot be addressed
    /// - `BlockNotFound` if the containing block is not allocated
    pub fn set_voxel(&mut self, global: GlobalVoxelCoord, value: EsdfVoxel) -> Result<()> {
        let (block, voxel) = self.locate(global)?;
        let slot = self
            .voxel_mut(block, voxel)
            .ok_or_else(|| GridError::not_found(block))?;
        *slot = value;
        Ok(())
    }

    /// Mark a voxel as an observed surface sample.
    ///
    /// Allocates the containing block when needed. The voxel becomes
    /// `OBSERVED | FIXED | HAS_SITE_INDEX` with its own block as site.
    /// Returns the block index.
    ///
    /// # Errors
    /// `CoordinateOutOfRange` for unaddressable voxels, plus whatever
    /// [`allocate_block`](Self::allocate_block) rejects.
    pub fn seed_observed(&mut self, global: GlobalVoxelCoord, distance: f32) -> Result<usize> {
        let dim = self.voxels_per_side();
        let (block, voxel) = self.locate(global)?;
        let idx = self.allocate_block(block)?;
        *self.storage.voxel_mut(idx, voxel.flat_index(dim)) = EsdfVoxel::observed(distance, block);
        Ok(idx)
    }

    /// Put every voxel of a block back to the unknown state.
    pub fn reset_block(&mut self, idx: usize) -> Result<()> {
        let num_blocks = self.num_blocks();
        let block = self.block_mut(idx).ok_or(GridError::BlockIndexOutOfRange {
            index: idx,
            num_blocks,
        })?;
        block.iter_mut().for_each(EsdfVoxel::reset);
        Ok(())
    }

    /// Clear per-pass voxel flags on the given blocks.
    ///
    /// Out-of-range indices are ignored.
    pub fn clear_transient_flags(&mut self, blocks: &[usize]) {
        for &idx in blocks {
            if let Some(block) = self.block_mut(idx) {
                block.iter_mut().for_each(EsdfVoxel::clear_transient);
            }
        }
    }

    /// Copy of the `dim * dim` voxels of block `idx` whose `axis` component
    /// equals `index`, in [`face_indices`] order.
    pub fn layer(&self, idx: usize, axis: Axis, index: u32) -> Option<Vec<EsdfVoxel>> {
        let dim = self.voxels_per_side();
        if index >= dim {
            return None;
        }
        let block = self.block(idx)?;
        Some(face_indices(dim, axis, index).map(|i| block[i]).collect())
    }

    /// `(index, voxels)` for every block, mutable and disjoint.
    #[inline]
    pub fn blocks_mut(&mut self) -> impl Iterator<Item = (usize, &mut [EsdfVoxel])> + '_ {
        self.storage.chunks_mut().enumerate()
    }

    /// Parallel `(index, voxels)` for every block, mutable and disjoint.
    #[cfg(feature = "rayon")]
    #[inline]
    pub fn par_blocks_mut(
        &mut self,
    ) -> impl rayon::prelude::IndexedParallelIterator<Item = (usize, &mut [EsdfVoxel])> + '_ {
        use rayon::prelude::*;
        self.storage.par_chunks_mut().enumerate()
    }

    /// Iterator over all blocks.
    ///
    /// # Returns
    /// Iterator yielding `(BlockCoord, block_index)` pairs.
    #[inline]
    pub fn iter_blocks(&self) -> impl Iterator<Item = (BlockCoord, usize)> + '_ {
        (0..self.storage.num_blocks()).map(move |idx| (self.storage.get_coord(idx), idx))
    }

    /// Parallel iterator over all blocks.
    #[cfg(feature = "rayon")]
    pub fn par_iter_blocks(
        &self,
    ) -> impl rayon::prelude::ParallelIterator<Item = (BlockCoord, usize)> + '_ {
        use rayon::prelude::*;
        (0..self.storage.num_blocks())
            .into_par_iter()
            .map(move |idx| (self.storage.get_coord(idx), idx))
    }

    /// Iterator over every fixed voxel with its global coordinate.
    pub fn iter_fixed(&self) -> impl Iterator<Item = (GlobalVoxelCoord, &EsdfVoxel)> + '_ {
        let dim = self.voxels_per_side();
        self.storage
            .chunks()
            .zip(self.storage.coords.iter())
            .flat_map(move |(voxels, &coord)| {
                voxels.iter().enumerate().filter_map(move |(i, v)| {
                    v.is_fixed().then(|| {
                        let local = VoxelCoord::from_flat_index(i, dim);
                        (GlobalVoxelCoord::from_block_and_voxel(coord, local, dim), v)
                    })
                })
            })
    }

    /// Smallest and largest distance over fixed voxels, if any.
    pub fn distance_range(&self) -> Option<(f32, f32)> {
        self.storage
            .voxels
            .iter()
            .filter(|v| v.is_fixed())
            .fold(None, |acc, v| match acc {
                None => Some((v.distance, v.distance)),
                Some((lo, hi)) => Some((lo.min(v.distance), hi.max(v.distance))),
            })
    }
}
