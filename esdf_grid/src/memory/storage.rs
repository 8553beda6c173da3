//! Block arena for ESDF voxels.
//!
//! Memory layout: `voxels[block_idx * voxels_per_block + voxel_idx]`.
//! A block is a contiguous `S³` run, so splitting the arena into
//! `voxels_per_block` chunks hands out disjoint per-block `&mut` slices.

use core::slice::{ChunksExact, ChunksExactMut};

use esdf_core::{BlockCoord, EsdfVoxel};

use crate::config::EsdfConfig;

/// Array-of-structs storage for block data.
///
/// Blocks are appended in allocation order and never move or disappear, so a
/// block index stays valid for the life of the storage.
pub struct BlockStorage {
    /// All voxels, block after block.
    pub(crate) voxels: Vec<EsdfVoxel>,

    /// Block coordinates for reverse lookup.
    pub(crate) coords: Vec<BlockCoord>,

    /// Number of voxels per block (S³).
    pub(crate) voxels_per_block: usize,

    /// Maximum number of blocks.
    pub(crate) capacity: usize,
}

impl BlockStorage {
    /// Create empty storage for the given configuration.
    ///
    /// Memory grows with the number of allocated blocks; `capacity` is a
    /// limit, not a reservation.
    pub fn new(config: &EsdfConfig) -> Self {
        Self {
            voxels: Vec::new(),
            coords: Vec::new(),
            voxels_per_block: config.voxels_per_block(),
            capacity: config.capacity,
        }
    }

    #[inline]
    fn range(&self, block_idx: usize) -> core::ops::Range<usize> {
        let start = block_idx * self.voxels_per_block;
        start..start + self.voxels_per_block
    }

    /// All voxels of one block.
    ///
    /// # Panics
    /// If `block_idx` is not allocated.
    #[inline]
    pub fn block(&self, block_idx: usize) -> &[EsdfVoxel] {
        &self.voxels[self.range(block_idx)]
    }

    /// Mutable voxels of one block.
    ///
    /// # Panics
    /// If `block_idx` is not allocated.
    #[inline]
    pub fn block_mut(&mut self, block_idx: usize) -> &mut [EsdfVoxel] {
        let range = self.range(block_idx);
        &mut self.voxels[range]
    }

    /// One voxel by block and flat voxel index.
    #[inline]
    pub fn voxel(&self, block_idx: usize, voxel_idx: usize) -> &EsdfVoxel {
        &self.voxels[block_idx * self.voxels_per_block + voxel_idx]
    }

    /// Mutable voxel by block and flat voxel index.
    #[inline]
    pub fn voxel_mut(&mut self, block_idx: usize, voxel_idx: usize) -> &mut EsdfVoxel {
        &mut self.voxels[block_idx * self.voxels_per_block + voxel_idx]
    }

    /// Replace a whole block.
    pub fn set_block(&mut self, block_idx: usize, voxels: &[EsdfVoxel]) {
        debug_assert_eq!(voxels.len(), self.voxels_per_block);
        self.block_mut(block_idx).copy_from_slice(voxels);
    }

    /// Iterate block slices in index order.
    #[inline]
    pub fn chunks(&self) -> ChunksExact<'_, EsdfVoxel> {
        self.voxels.chunks_exact(self.voxels_per_block)
    }

    /// Iterate disjoint mutable block slices in index order.
    #[inline]
    pub fn chunks_mut(&mut self) -> ChunksExactMut<'_, EsdfVoxel> {
        self.voxels.chunks_exact_mut(self.voxels_per_block)
    }

    /// Parallel disjoint mutable block slices in index order.
    #[cfg(feature = "rayon")]
    #[inline]
    pub fn par_chunks_mut(&mut self) -> rayon::slice::ChunksExactMut<'_, EsdfVoxel> {
        use rayon::prelude::*;
        self.voxels.par_chunks_exact_mut(self.voxels_per_block)
    }

    /// Get the coordinate of a block by its index.
    #[inline]
    pub fn get_coord(&self, block_idx: usize) -> BlockCoord {
        self.coords[block_idx]
    }

    /// Number of allocated blocks.
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.coords.len()
    }

    /// Number of voxels per block.
    #[inline]
    pub fn voxels_per_block(&self) -> usize {
        self.voxels_per_block
    }

    /// Allocate a new unknown block and return its index.
    /// Returns None if capacity is exceeded.
    pub fn allocate_block(&mut self, coord: BlockCoord) -> Option<usize> {
        if self.coords.len() >= self.capacity {
            return None;
        }
        let idx = self.coords.len();
        self.coords.push(coord);
        self.voxels
            .resize(self.voxels.len() + self.voxels_per_block, EsdfVoxel::default());
        Some(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esdf_core::EsdfFlags;

    #[test]
    fn test_storage_allocate() {
        let config = EsdfConfig::new(4, 0.1, 2);
        let mut storage = BlockStorage::new(&config);

        let coord = BlockCoord::new(1, 2, 3);
        let idx = storage.allocate_block(coord).unwrap();
        assert_eq!(idx, 0);
        assert_eq!(storage.num_blocks(), 1);
        assert_eq!(storage.get_coord(idx), coord);
        assert!(storage.block(idx).iter().all(|v| *v == EsdfVoxel::default()));

        assert_eq!(storage.allocate_block(BlockCoord::new(0, 0, 0)), Some(1));
        assert_eq!(storage.allocate_block(BlockCoord::new(5, 0, 0)), None);
        assert_eq!(storage.voxels.len(), 2 * 64);
    }

    #[test]
    fn test_blocks_are_disjoint() {
        let config = EsdfConfig::new(4, 0.1, 2);
        let mut storage = BlockStorage::new(&config);
        storage.allocate_block(BlockCoord::new(0, 0, 0)).unwrap();
        storage.allocate_block(BlockCoord::new(1, 0, 0)).unwrap();

        storage.voxel_mut(1, 10).distance = 3.0;
        storage.voxel_mut(1, 10).flags = EsdfFlags::FIXED;

        assert_eq!(storage.voxels[64 + 10].distance, 3.0);
        assert_eq!(storage.voxel(0, 10).distance, 0.0);

        for (idx, chunk) in storage.chunks_mut().enumerate() {
            chunk[0].distance = idx as f32 + 1.0;
        }
        assert_eq!(storage.block(0)[0].distance, 1.0);
        assert_eq!(storage.block(1)[0].distance, 2.0);
    }

    #[test]
    fn test_set_block() {
        let config = EsdfConfig::new(2, 1.0, 1);
        let mut storage = BlockStorage::new(&config);
        let idx = storage.allocate_block(BlockCoord::new(0, 0, 0)).unwrap();

        let data: Vec<EsdfVoxel> = (0..8)
            .map(|i| EsdfVoxel::fixed(i as f32, BlockCoord::new(0, 0, 0)))
            .collect();
        storage.set_block(idx, &data);
        assert_eq!(storage.block(idx), data.as_slice());
        assert_eq!(storage.chunks().count(), 1);
    }
}
