//! Index arithmetic over the flat voxel layout of a block.
//!
//! Voxel `(x, y, z)` of a block with side `dim` lives at
//! `x + dim * (y + dim * z)`. Everything here is allocation free so the
//! sweep and propagation passes can iterate faces and lines directly.

use crate::types::{Axis, BlockCoord, Direction, VoxelCoord};

/// The six face-adjacent blocks in [`Direction::ALL`] order.
#[inline]
pub fn neighbor_blocks6(block: BlockCoord) -> [BlockCoord; 6] {
    let mut neighbors = [block; 6];
    for (slot, dir) in neighbors.iter_mut().zip(Direction::ALL) {
        *slot = block.neighbor(dir);
    }
    neighbors
}

/// Flat indices of the `dim * dim` voxels whose `axis` component is `layer`.
///
/// The two in-plane axes are visited in ascending order (the lower-numbered
/// one fastest), so the k-th index of two faces of the same axis always
/// refers to voxels that share their in-plane coordinates.
///
/// # Panics
/// Debug builds assert `layer < dim`.
#[inline]
pub fn face_indices(dim: u32, axis: Axis, layer: u32) -> impl Iterator<Item = usize> {
    debug_assert!(layer < dim, "layer {} outside block of side {}", layer, dim);
    let (a, b) = axis.others();
    (0..dim).flat_map(move |j| {
        (0..dim).map(move |i| {
            VoxelCoord::ZERO
                .with(axis, layer)
                .with(a, i)
                .with(b, j)
                .flat_index(dim)
        })
    })
}

/// Flat index of the first voxel of every 1D line running along `axis`.
#[inline]
pub fn line_starts(dim: u32, axis: Axis) -> impl Iterator<Item = usize> {
    face_indices(dim, axis, 0)
}

/// Flat indices of one line, ordered in the direction of travel.
///
/// `start` is the index returned by [`line_starts`] for the line's axis.
#[inline]
pub fn line_indices(dim: u32, start: usize, dir: Direction) -> impl Iterator<Item = usize> {
    let stride = dir.axis.stride(dim);
    let positive = dir.positive;
    (0..dim as usize).map(move |k| {
        let step = if positive { k } else { dim as usize - 1 - k };
        start + step * stride
    })
}

/// Number of voxels in a block of side `dim`.
#[inline]
pub const fn voxels_per_block(dim: u32) -> usize {
    let d = dim as usize;
    d * d * d
}
