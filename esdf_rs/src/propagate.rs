//! Inter-block propagation.
//!
//! Sweeps stop at block borders. Propagation carries distances across them:
//! for every adjacency entry, the face of the block nearest its neighbor is
//! relaxed voxel-for-voxel into the neighbor's opposite face.
//!
//! Each direction runs as two parallel phases. The gather phase reads parent
//! faces out of the grid; the apply phase hands every receiving block to
//! exactly one task together with the face it receives. A block that receives
//! twice in one direction would mean two writers, so that is rejected.

use esdf_core::{
    face_indices, try_relax, AtomicBlockInfo, Axis, Direction, EsdfFlags, EsdfVoxel,
};
use esdf_grid::{BlockAdjacency, EsdfGrid};
use rayon::prelude::*;

use crate::sweep::PassStats;

/// Totals of a propagation pass.
pub type PropagationStats = PassStats;

/// Propagate along both signs of `axis`: every `+axis` pair, then every
/// `-axis` pair.
///
/// Receiving blocks get `UPDATED` (and their change count) in `infos`;
/// sending blocks are never written. Entries whose neighbor slot is
/// [`BlockAdjacency::INVALID`] are skipped.
///
/// # Panics
/// - An entry names a block index that is not allocated
/// - An entry lists itself as its own neighbor
/// - Two entries name the same neighbor in the same direction
/// - `infos` is shorter than the grid
pub fn propagate_axis(
    grid: &mut EsdfGrid,
    axis: Axis,
    entries: &[BlockAdjacency],
    infos: &[AtomicBlockInfo],
) -> PropagationStats {
    let mut stats = PropagationStats::default();
    for dir in axis.directions() {
        stats.merge(propagate_direction(grid, dir, entries, infos));
    }
    stats
}

/// Propagate across the `dir` face of every entry.
pub fn propagate_direction(
    grid: &mut EsdfGrid,
    dir: Direction,
    entries: &[BlockAdjacency],
    infos: &[AtomicBlockInfo],
) -> PassStats {
    let num_blocks = grid.num_blocks();
    assert!(
        infos.len() >= num_blocks,
        "{} block infos for {} blocks",
        infos.len(),
        num_blocks
    );
    let dim = grid.voxels_per_side();
    let step = grid.voxel_size();
    let parent_layer = dir.face_layer(dim);
    let target_layer = dir.opposite().face_layer(dim);

    // Gather: parent faces keyed by receiving block
    let grid_ref: &EsdfGrid = grid;
    let gathered: Vec<(usize, Vec<EsdfVoxel>)> = entries
        .par_iter()
        .filter_map(|entry| {
            let target = entry.neighbor(dir)?;
            let source = entry.self_index() as usize;
            assert!(
                source < num_blocks && target < num_blocks,
                "adjacency entry {:?} out of range ({} blocks)",
                entry.indices,
                num_blocks
            );
            assert_ne!(source, target, "block {} is its own {:?} neighbor", source, dir);
            let face = grid_ref.layer(source, dir.axis, parent_layer)?;
            Some((target, face))
        })
        .collect();

    let mut incoming: Vec<Option<Vec<EsdfVoxel>>> = (0..num_blocks).map(|_| None).collect();
    for (target, face) in gathered {
        assert!(
            incoming[target].is_none(),
            "block {} receives more than one {:?} face",
            target,
            dir
        );
        incoming[target] = Some(face);
    }

    // Apply: one task per receiving block
    grid.par_blocks_mut()
        .filter_map(|(idx, voxels)| incoming[idx].as_deref().map(|face| (idx, voxels, face)))
        .map(|(idx, voxels, face)| {
            let mut changed = 0u32;
            for (parent, t) in face.iter().zip(face_indices(dim, dir.axis, target_layer)) {
                let target = &mut voxels[t];
                if try_relax(target, parent, step) {
                    target.flags.insert(EsdfFlags::UPDATED);
                    changed = changed.saturating_add(1);
                }
            }
            if changed > 0 {
                infos[idx].record(EsdfFlags::UPDATED, changed);
                PassStats {
                    blocks: 1,
                    updated_voxels: u64::from(changed),
                }
            } else {
                PassStats::default()
            }
        })
        .reduce(PassStats::default, |mut a, b| {
            a.merge(b);
            a
        })
}
