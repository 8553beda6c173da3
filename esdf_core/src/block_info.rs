//! Per-block pass summaries.
//!
//! Many workers report into the same block during a pass, in no particular
//! order, so the accumulator only supports commutative updates: bitwise OR
//! for flags and saturating add for the counter.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::voxel::EsdfFlags;

/// Snapshot of what happened to one block during a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockInfo {
    /// OR of every spill/updated bit raised in the block.
    pub flags: EsdfFlags,
    /// Number of voxel changes.
    pub updated_voxels: u32,
}

impl BlockInfo {
    /// Whether anything was raised for this block.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        !self.flags.is_empty()
    }

    /// Fold another summary into this one.
    #[inline]
    pub fn merge(&mut self, other: BlockInfo) {
        self.flags |= other.flags;
        self.updated_voxels = self.updated_voxels.saturating_add(other.updated_voxels);
    }
}

/// Lock-free [`BlockInfo`] accumulator shared by concurrent writers.
#[derive(Debug, Default)]
pub struct AtomicBlockInfo {
    flags: AtomicU32,
    updated_voxels: AtomicU32,
}

impl AtomicBlockInfo {
    /// An empty accumulator.
    pub const fn new() -> Self {
        Self {
            flags: AtomicU32::new(0),
            updated_voxels: AtomicU32::new(0),
        }
    }

    /// Record `count` voxel changes that raised `flags`.
    #[inline]
    pub fn record(&self, flags: EsdfFlags, count: u32) {
        if !flags.is_empty() {
            self.flags.fetch_or(flags.bits(), Ordering::Relaxed);
        }
        if count > 0 {
            // The closure never declines, so this cannot fail.
            let _ = self
                .updated_voxels
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                    Some(n.saturating_add(count))
                });
        }
    }

    /// Read the current totals.
    #[inline]
    pub fn snapshot(&self) -> BlockInfo {
        BlockInfo {
            flags: EsdfFlags::from_bits_truncate(self.flags.load(Ordering::Relaxed)),
            updated_voxels: self.updated_voxels.load(Ordering::Relaxed),
        }
    }

    /// Zero both fields. Must not race with `record`; the driver resets
    /// between passes.
    #[inline]
    pub fn reset(&self) {
        self.flags.store(0, Ordering::Relaxed);
        self.updated_voxels.store(0, Ordering::Relaxed);
    }
}
