//! Concurrent safety tests for esdf_rs.
//!
//! The engine runs blocks on rayon tasks with no ordering guarantees. These
//! tests check that the result does not depend on task order or thread count.

use esdf_rs::{
    compute_esdf, propagate_direction, sweep_block, sweep_blocks, AdjacencyTable,
    AtomicBlockInfo, BlockAdjacency, BlockCoord, BlockInfo, Direction, EsdfGrid,
    EsdfGridBuilder, EsdfVoxel, GlobalVoxelCoord,
};

// =============================================================================
// Test Grid Factories
// =============================================================================

/// Two separate x-adjacent pairs; the left block of each is fully seeded.
///
/// Block indices: 0 = (0,0,0), 1 = (1,0,0), 2 = (0,5,0), 3 = (1,5,0).
fn two_pairs() -> EsdfGrid {
    let wall = |g: GlobalVoxelCoord| {
        if g.x < 4 {
            EsdfVoxel::observed((g.y % 4) as f32, g.block_coord(4).unwrap())
        } else {
            EsdfVoxel::default()
        }
    };
    EsdfGridBuilder::new(4, 1.0)
        .add_block_fn(BlockCoord::new(0, 0, 0), wall)
        .add_block_fn(BlockCoord::new(1, 0, 0), wall)
        .add_block_fn(BlockCoord::new(0, 5, 0), wall)
        .add_block_fn(BlockCoord::new(1, 5, 0), wall)
        .build()
        .unwrap()
}

/// A 3×3×2 box of 8³ blocks with a handful of seeds.
fn scattered_seeds() -> EsdfGrid {
    EsdfGridBuilder::new(8, 0.5)
        .add_block_range(BlockCoord::new(-1, -1, 0), BlockCoord::new(1, 1, 1))
        .seed(GlobalVoxelCoord::new(-8, -8, 0), 0.0)
        .seed(GlobalVoxelCoord::new(5, 2, 9), 0.0)
        .seed(GlobalVoxelCoord::new(15, -3, 15), 0.0)
        .seed(GlobalVoxelCoord::new(0, 7, 4), 0.0)
        .build()
        .unwrap()
}

fn voxels(grid: &EsdfGrid) -> Vec<EsdfVoxel> {
    (0..grid.num_blocks())
        .flat_map(|idx| grid.block(idx).unwrap().to_vec())
        .collect()
}

fn infos(n: usize) -> Vec<AtomicBlockInfo> {
    (0..n).map(|_| AtomicBlockInfo::new()).collect()
}

fn snapshots(infos: &[AtomicBlockInfo]) -> Vec<BlockInfo> {
    infos.iter().map(AtomicBlockInfo::snapshot).collect()
}

// =============================================================================
// Propagation Independence
// =============================================================================

#[test]
fn test_disjoint_propagations_commute() {
    let first = BlockAdjacency::isolated(0).with_neighbor(Direction::X_PLUS, 1);
    let second = BlockAdjacency::isolated(2).with_neighbor(Direction::X_PLUS, 3);

    let mut forward = two_pairs();
    let forward_infos = infos(4);
    propagate_direction(&mut forward, Direction::X_PLUS, &[first], &forward_infos);
    propagate_direction(&mut forward, Direction::X_PLUS, &[second], &forward_infos);

    let mut backward = two_pairs();
    let backward_infos = infos(4);
    propagate_direction(&mut backward, Direction::X_PLUS, &[second], &backward_infos);
    propagate_direction(&mut backward, Direction::X_PLUS, &[first], &backward_infos);

    let mut together = two_pairs();
    let together_infos = infos(4);
    let stats = propagate_direction(
        &mut together,
        Direction::X_PLUS,
        &[second, first],
        &together_infos,
    );
    assert_eq!(stats.blocks, 2);
    assert_eq!(stats.updated_voxels, 32);

    assert_eq!(voxels(&forward), voxels(&backward));
    assert_eq!(voxels(&forward), voxels(&together));
    assert_eq!(snapshots(&forward_infos), snapshots(&backward_infos));
    assert_eq!(snapshots(&forward_infos), snapshots(&together_infos));
}

#[test]
fn test_entry_order_does_not_matter() {
    let mut grid = scattered_seeds();
    let mut reversed = scattered_seeds();
    let n = grid.num_blocks();
    let all: Vec<usize> = (0..n).collect();

    // Sweep first so every seeded block has full faces to hand over
    sweep_blocks(&mut grid, &all, &Direction::ALL, &infos(n));
    sweep_blocks(&mut reversed, &all, &Direction::ALL, &infos(n));

    let mut entries = AdjacencyTable::build_all(&grid).entries().to_vec();
    let forward_infos = infos(n);
    for dir in Direction::ALL {
        propagate_direction(&mut grid, dir, &entries, &forward_infos);
    }

    entries.reverse();
    let reversed_infos = infos(n);
    for dir in Direction::ALL {
        propagate_direction(&mut reversed, dir, &entries, &reversed_infos);
    }

    assert!(snapshots(&forward_infos).iter().any(BlockInfo::is_dirty));
    assert_eq!(voxels(&grid), voxels(&reversed));
    assert_eq!(snapshots(&forward_infos), snapshots(&reversed_infos));
}

// =============================================================================
// Parallel vs Sequential
// =============================================================================

#[test]
fn test_parallel_sweep_matches_sequential() {
    let mut parallel = scattered_seeds();
    let mut sequential = scattered_seeds();
    let n = parallel.num_blocks();
    let all: Vec<usize> = (0..n).collect();

    let par_infos = infos(n);
    sweep_blocks(&mut parallel, &all, &Direction::ALL, &par_infos);

    let seq_infos = infos(n);
    let dim = sequential.voxels_per_side();
    let step = sequential.voxel_size();
    for (idx, block) in sequential.blocks_mut() {
        sweep_block(block, dim, step, &Direction::ALL, &seq_infos[idx]);
    }

    assert_eq!(voxels(&parallel), voxels(&sequential));
    assert_eq!(snapshots(&par_infos), snapshots(&seq_infos));
}

#[test]
fn test_thread_count_does_not_change_result() {
    let run_with = |threads: usize| {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();
        let mut grid = scattered_seeds();
        let report = pool.install(|| compute_esdf(&mut grid));
        (voxels(&grid), report.cycles, report.passes, report.updated_voxels)
    };

    let single = run_with(1);
    assert_eq!(single, run_with(4));
    assert_eq!(single, run_with(8));
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let reference = {
        let mut grid = scattered_seeds();
        compute_esdf(&mut grid);
        voxels(&grid)
    };

    for _ in 0..5 {
        let mut grid = scattered_seeds();
        compute_esdf(&mut grid);
        assert_eq!(voxels(&grid), reference);
    }
}
