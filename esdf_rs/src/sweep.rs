//! Intra-block sweeps.
//!
//! A sweep relaxes every 1D voxel line of a block along one direction, from
//! the line's start to its end, so a distance can travel the whole block in
//! a single pass. Blocks are independent: each one is swept by one rayon task
//! over its own disjoint slice of the arena.

use esdf_core::{
    line_indices, line_starts, try_relax, AtomicBlockInfo, BlockInfo, Direction, EsdfVoxel,
};
use esdf_grid::EsdfGrid;
use rayon::prelude::*;

/// Totals of one sweep or propagation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Blocks the pass ran on (sweep) or wrote into (propagation).
    pub blocks: usize,
    /// Voxel changes.
    pub updated_voxels: u64,
}

impl PassStats {
    /// Add another pass's totals.
    #[inline]
    pub fn merge(&mut self, other: PassStats) {
        self.blocks += other.blocks;
        self.updated_voxels += other.updated_voxels;
    }
}

/// Sweep one block along each of `directions`, in order.
///
/// Works on a scratch copy of `voxels` and writes it back at the end. Every
/// line of one direction finishes before the next direction starts. A voxel
/// improved while travelling along `dir` gets `dir`'s spill flag, and the
/// flag plus the change count are recorded in `info`.
///
/// Returns `info`'s snapshot after the sweep.
///
/// # Panics
/// If `voxels.len()` is not `dim³`.
pub fn sweep_block(
    voxels: &mut [EsdfVoxel],
    dim: u32,
    step: f32,
    directions: &[Direction],
    info: &AtomicBlockInfo,
) -> BlockInfo {
    assert_eq!(
        voxels.len(),
        esdf_core::voxels_per_block(dim),
        "block slice does not hold {}³ voxels",
        dim
    );

    let mut scratch = voxels.to_vec();

    for &dir in directions {
        let spill = dir.spill_flag();
        let mut changed = 0u32;

        for start in line_starts(dim, dir.axis) {
            let mut parent: Option<usize> = None;
            for idx in line_indices(dim, start, dir) {
                if let Some(p) = parent {
                    let upstream = scratch[p];
                    if try_relax(&mut scratch[idx], &upstream, step) {
                        scratch[idx].flags.insert(spill);
                        changed = changed.saturating_add(1);
                    }
                }
                parent = Some(idx);
            }
        }

        if changed > 0 {
            info.record(spill, changed);
        }
    }

    voxels.copy_from_slice(&scratch);
    info.snapshot()
}

/// Sweep every block in `active` in parallel.
///
/// `infos` is indexed by block index and must cover the whole grid.
/// Indices in `active` may repeat; each block is swept once.
///
/// # Panics
/// If an index in `active` is not an allocated block, or `infos` is shorter
/// than the grid.
pub fn sweep_blocks(
    grid: &mut EsdfGrid,
    active: &[usize],
    directions: &[Direction],
    infos: &[AtomicBlockInfo],
) -> PassStats {
    let num_blocks = grid.num_blocks();
    assert!(
        infos.len() >= num_blocks,
        "{} block infos for {} blocks",
        infos.len(),
        num_blocks
    );

    let mut selected = vec![false; num_blocks];
    for &idx in active {
        assert!(
            idx < num_blocks,
            "active block {} out of range ({} blocks)",
            idx,
            num_blocks
        );
        selected[idx] = true;
    }

    let dim = grid.voxels_per_side();
    let step = grid.voxel_size();

    grid.par_blocks_mut()
        .filter(|(idx, _)| selected[*idx])
        .map(|(idx, voxels)| {
            let before = infos[idx].snapshot().updated_voxels;
            let after = sweep_block(voxels, dim, step, directions, &infos[idx]).updated_voxels;
            PassStats {
                blocks: 1,
                updated_voxels: u64::from(after.saturating_sub(before)),
            }
        })
        .reduce(PassStats::default, |mut a, b| {
            a.merge(b);
            a
        })
}

/// Sweep `active` blocks along both signs of `axis`, "+" first.
pub fn sweep_axis(
    grid: &mut EsdfGrid,
    active: &[usize],
    axis: esdf_core::Axis,
    infos: &[AtomicBlockInfo],
) -> PassStats {
    sweep_blocks(grid, active, &axis.directions(), infos)
}
