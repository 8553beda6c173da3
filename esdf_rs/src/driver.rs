//! Convergence driver.
//!
//! One cycle visits every configured axis (x, y, z; or x, y when planar).
//! For each axis the active blocks are swept along both signs, then their
//! faces are propagated along both signs. When a cycle ends, the blocks that
//! changed during it become the next cycle's active set. A cycle in which no
//! block changed is the fixed point.

use std::time::{Duration, Instant};

use esdf_core::{AtomicBlockInfo, Axis, BlockInfo};
use esdf_grid::{AdjacencyTable, EsdfGrid, GridError};

use crate::error::{EsdfError, Result};
use crate::propagate::propagate_axis;
use crate::sweep::{sweep_axis, PassStats};

/// Where the driver is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Next pass sweeps the active blocks along this axis.
    Sweeping(Axis),
    /// Next pass propagates the active blocks' faces along this axis.
    Propagating(Axis),
    /// A full cycle changed nothing.
    Converged,
}

/// The two kinds of pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    /// Intra-block sweep.
    Sweep,
    /// Inter-block propagation.
    Propagate,
}

/// What one pass did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PassReport {
    /// Zero-based cycle the pass belongs to.
    pub cycle: u32,
    /// Sweep or propagation.
    pub kind: PassKind,
    /// Axis of the pass.
    pub axis: Axis,
    /// Active blocks at the time of the pass.
    pub active_blocks: usize,
    /// Blocks swept, or blocks that received a change.
    pub blocks_touched: usize,
    /// Blocks whose info is dirty after the pass.
    pub dirty_blocks: usize,
    /// Voxel changes.
    pub updated_voxels: u64,
    /// Wall time.
    pub elapsed: Duration,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Fixed point reached.
    Converged,
    /// Stopped at `max_cycles`; the grid holds a valid partial result.
    IterationCapReached,
}

/// Totals of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvergenceReport {
    /// Completed cycles, including the final quiet one.
    pub cycles: u32,
    /// Passes executed.
    pub passes: u32,
    /// Voxel changes over all passes.
    pub updated_voxels: u64,
    /// How the run ended.
    pub outcome: Outcome,
    /// Wall time of the run.
    pub elapsed: Duration,
}

impl ConvergenceReport {
    /// Whether the fixed point was reached.
    pub fn converged(&self) -> bool {
        self.outcome == Outcome::Converged
    }
}

/// Steps a grid through sweep and propagation passes until nothing changes.
///
/// The driver holds no reference to the grid; pass the same grid to every
/// call. Blocks allocated between calls only become active once a neighbor
/// pushes into them.
pub struct ConvergenceDriver {
    state: DriverState,
    axes: &'static [Axis],
    max_cycles: u32,
    active: Vec<usize>,
    adjacency: AdjacencyTable,
    pass_infos: Vec<AtomicBlockInfo>,
    cycle_infos: Vec<BlockInfo>,
    cycle: u32,
    cycle_open: bool,
    passes: u32,
    updated_voxels: u64,
}

impl ConvergenceDriver {
    /// A driver whose first cycle runs on every block of `grid`.
    pub fn new(grid: &EsdfGrid) -> Self {
        let config = grid.config();
        Self {
            state: DriverState::Sweeping(config.axes()[0]),
            axes: config.axes(),
            max_cycles: config.max_cycles,
            active: (0..grid.num_blocks()).collect(),
            adjacency: AdjacencyTable::default(),
            pass_infos: Vec::new(),
            cycle_infos: Vec::new(),
            cycle: 0,
            cycle_open: false,
            passes: 0,
            updated_voxels: 0,
        }
    }

    /// A driver whose first cycle runs only on `active`.
    ///
    /// Use this after changing a few blocks of an already converged grid.
    ///
    /// # Errors
    /// `BlockIndexOutOfRange` if an index is not an allocated block.
    pub fn with_active_blocks<I>(grid: &EsdfGrid, active: I) -> Result<Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let num_blocks = grid.num_blocks();
        let mut active: Vec<usize> = active.into_iter().collect();
        if let Some(&index) = active.iter().find(|&&idx| idx >= num_blocks) {
            return Err(GridError::BlockIndexOutOfRange { index, num_blocks }.into());
        }
        active.sort_unstable();
        active.dedup();

        let mut driver = Self::new(grid);
        driver.active = active;
        Ok(driver)
    }

    /// Override the grid's cycle cap.
    ///
    /// # Errors
    /// `InvalidConfig` for a cap of zero.
    pub fn with_max_cycles(mut self, max_cycles: u32) -> Result<Self> {
        if max_cycles == 0 {
            return Err(EsdfError::InvalidConfig {
                message: "max_cycles must be at least 1".to_string(),
            });
        }
        self.max_cycles = max_cycles;
        Ok(self)
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Whether the fixed point has been reached.
    #[inline]
    pub fn is_converged(&self) -> bool {
        self.state == DriverState::Converged
    }

    /// Zero-based index of the current cycle.
    #[inline]
    pub fn cycle(&self) -> u32 {
        self.cycle
    }

    /// Blocks the current cycle runs on.
    #[inline]
    pub fn active_blocks(&self) -> &[usize] {
        &self.active
    }

    /// Per-block summaries accumulated over the current cycle, indexed by
    /// block index.
    #[inline]
    pub fn block_infos(&self) -> &[BlockInfo] {
        &self.cycle_infos
    }

    /// Per-block summaries of the most recent pass.
    pub fn pass_infos(&self) -> Vec<BlockInfo> {
        self.pass_infos.iter().map(AtomicBlockInfo::snapshot).collect()
    }

    /// Run exactly one pass and advance the state.
    ///
    /// Returns `None` once converged.
    pub fn step(&mut self, grid: &mut EsdfGrid) -> Option<PassReport> {
        let (kind, axis) = match self.state {
            DriverState::Converged => return None,
            DriverState::Sweeping(axis) => (PassKind::Sweep, axis),
            DriverState::Propagating(axis) => (PassKind::Propagate, axis),
        };

        if !self.cycle_open {
            self.begin_cycle(grid);
        }
        self.fit_infos(grid.num_blocks());

        self.pass_infos.iter().for_each(AtomicBlockInfo::reset);
        let start = Instant::now();
        let stats: PassStats = match kind {
            PassKind::Sweep => sweep_axis(grid, &self.active, axis, &self.pass_infos),
            PassKind::Propagate => {
                propagate_axis(grid, axis, self.adjacency.entries(), &self.pass_infos)
            }
        };
        let elapsed = start.elapsed();

        let mut dirty_blocks = 0;
        for (cycle_info, pass_info) in self.cycle_infos.iter_mut().zip(&self.pass_infos) {
            let snap = pass_info.snapshot();
            if snap.is_dirty() {
                dirty_blocks += 1;
                cycle_info.merge(snap);
            }
        }

        self.passes += 1;
        self.updated_voxels += stats.updated_voxels;

        let report = PassReport {
            cycle: self.cycle,
            kind,
            axis,
            active_blocks: self.active.len(),
            blocks_touched: stats.blocks,
            dirty_blocks,
            updated_voxels: stats.updated_voxels,
            elapsed,
        };
        log::debug!(
            "cycle {} {:?} {:?}: {} blocks touched, {} voxels updated in {:?}",
            report.cycle,
            kind,
            axis,
            report.blocks_touched,
            report.updated_voxels,
            elapsed
        );

        self.state = match kind {
            PassKind::Sweep => DriverState::Propagating(axis),
            PassKind::Propagate => match self.next_axis(axis) {
                Some(next) => DriverState::Sweeping(next),
                None => self.end_cycle(),
            },
        };

        Some(report)
    }

    /// Step until converged or until the cycle cap.
    pub fn run(&mut self, grid: &mut EsdfGrid) -> ConvergenceReport {
        self.run_with_observer(grid, |_| {})
    }

    /// Like [`run`](Self::run), calling `observer` after every pass.
    pub fn run_with_observer<F>(
        &mut self,
        grid: &mut EsdfGrid,
        mut observer: F,
    ) -> ConvergenceReport
    where
        F: FnMut(&PassReport),
    {
        let start = Instant::now();
        let passes_before = self.passes;
        let updated_before = self.updated_voxels;

        let outcome = loop {
            if self.is_converged() {
                break Outcome::Converged;
            }
            if self.cycle >= self.max_cycles {
                break Outcome::IterationCapReached;
            }
            if let Some(report) = self.step(grid) {
                observer(&report);
            }
        };

        let report = ConvergenceReport {
            cycles: self.completed_cycles(),
            passes: self.passes - passes_before,
            updated_voxels: self.updated_voxels - updated_before,
            outcome,
            elapsed: start.elapsed(),
        };

        match outcome {
            Outcome::Converged => log::info!(
                "ESDF converged after {} cycles ({} passes, {} voxel updates) in {:?}",
                report.cycles,
                report.passes,
                report.updated_voxels,
                report.elapsed
            ),
            Outcome::IterationCapReached => log::warn!(
                "ESDF stopped at the cycle cap of {} with {} blocks still active",
                self.max_cycles,
                self.active.len()
            ),
        }

        report
    }

    fn completed_cycles(&self) -> u32 {
        if self.is_converged() {
            self.cycle + 1
        } else {
            self.cycle
        }
    }

    fn next_axis(&self, axis: Axis) -> Option<Axis> {
        let pos = self.axes.iter().position(|&a| a == axis)?;
        self.axes.get(pos + 1).copied()
    }

    fn fit_infos(&mut self, num_blocks: usize) {
        if self.pass_infos.len() < num_blocks {
            self.pass_infos.resize_with(num_blocks, AtomicBlockInfo::new);
        }
        if self.cycle_infos.len() < num_blocks {
            self.cycle_infos.resize(num_blocks, BlockInfo::default());
        }
    }

    fn begin_cycle(&mut self, grid: &mut EsdfGrid) {
        self.cycle_infos.clear();

        grid.clear_transient_flags(&self.active);
        self.adjacency = AdjacencyTable::build(grid, &self.active);

        if self.active.is_empty() {
            log::warn!("cycle {} has no active blocks", self.cycle);
        }
        self.cycle_open = true;
    }

    fn end_cycle(&mut self) -> DriverState {
        self.cycle_open = false;
        let dirty: Vec<usize> = self
            .cycle_infos
            .iter()
            .enumerate()
            .filter(|(_, info)| info.is_dirty())
            .map(|(idx, _)| idx)
            .collect();

        if dirty.is_empty() {
            return DriverState::Converged;
        }

        self.cycle += 1;
        self.active = dirty;
        DriverState::Sweeping(self.axes[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esdf_core::{BlockCoord, GlobalVoxelCoord};
    use esdf_grid::EsdfGridBuilder;

    fn seeded_pair() -> EsdfGrid {
        EsdfGridBuilder::new(4, 1.0)
            .add_empty_block(BlockCoord::new(1, 0, 0))
            .seed(GlobalVoxelCoord::new(3, 1, 1), 0.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_state_machine_order() {
        let mut grid = seeded_pair();
        let mut driver = ConvergenceDriver::new(&grid);
        assert_eq!(driver.state(), DriverState::Sweeping(Axis::X));

        let expected = [
            (PassKind::Sweep, Axis::X),
            (PassKind::Propagate, Axis::X),
            (PassKind::Sweep, Axis::Y),
            (PassKind::Propagate, Axis::Y),
            (PassKind::Sweep, Axis::Z),
            (PassKind::Propagate, Axis::Z),
        ];
        for (kind, axis) in expected {
            let report = driver.step(&mut grid).unwrap();
            assert_eq!((report.kind, report.axis), (kind, axis));
            assert_eq!(report.cycle, 0);
        }
        // Both blocks changed, so a second cycle runs on both
        assert_eq!(driver.state(), DriverState::Sweeping(Axis::X));
        assert_eq!(driver.cycle(), 1);
        assert_eq!(driver.active_blocks(), &[0, 1]);
    }

    #[test]
    fn test_planar_skips_z() {
        let mut grid = EsdfGridBuilder::new(4, 1.0)
            .planar(true)
            .seed(GlobalVoxelCoord::new(0, 0, 0), 0.0)
            .build()
            .unwrap();
        let mut driver = ConvergenceDriver::new(&grid);

        let mut axes = Vec::new();
        let report = driver.run_with_observer(&mut grid, |pass| axes.push(pass.axis));
        assert!(report.converged());
        assert!(axes.iter().all(|&a| a != Axis::Z));

        // Only the z = 0 plane is reachable
        let reached = grid.iter_fixed().count();
        assert_eq!(reached, 16);
    }

    #[test]
    fn test_step_after_convergence_is_none() {
        let mut grid = seeded_pair();
        let mut driver = ConvergenceDriver::new(&grid);
        let report = driver.run(&mut grid);
        assert_eq!(report.outcome, Outcome::Converged);
        assert!(driver.step(&mut grid).is_none());
        assert_eq!(driver.run(&mut grid).passes, 0);
    }

    #[test]
    fn test_cycle_cap() {
        let mut grid = seeded_pair();
        let mut driver = ConvergenceDriver::new(&grid).with_max_cycles(1).unwrap();
        let report = driver.run(&mut grid);
        assert_eq!(report.outcome, Outcome::IterationCapReached);
        assert_eq!(report.cycles, 1);
        assert_eq!(report.passes, 6);
        assert!(!driver.is_converged());

        // Resuming finishes the job
        let mut driver = driver.with_max_cycles(64).unwrap();
        assert!(driver.run(&mut grid).converged());
    }

    #[test]
    fn test_zero_cap_rejected() {
        let grid = seeded_pair();
        assert!(matches!(
            ConvergenceDriver::new(&grid).with_max_cycles(0),
            Err(EsdfError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_with_active_blocks_validates() {
        let grid = seeded_pair();
        assert!(matches!(
            ConvergenceDriver::with_active_blocks(&grid, [0, 5]),
            Err(EsdfError::Grid(GridError::BlockIndexOutOfRange { index: 5, .. }))
        ));
        let driver = ConvergenceDriver::with_active_blocks(&grid, [1, 1, 0]).unwrap();
        assert_eq!(driver.active_blocks(), &[0, 1]);
    }

    #[test]
    fn test_empty_active_set_converges_immediately() {
        let mut grid = seeded_pair();
        let mut driver = ConvergenceDriver::with_active_blocks(&grid, []).unwrap();
        let report = driver.run(&mut grid);
        assert!(report.converged());
        assert_eq!(report.updated_voxels, 0);
        assert_eq!(report.cycles, 1);
    }
}
