//! ESDF voxel and its flag set.

use bitflags::bitflags;

use crate::types::BlockCoord;

bitflags! {
    /// Per-voxel (and per-block summary) state bits.
    ///
    /// Bit positions are stable; bit 0 is `OBSERVED`, bit 9 is `SPILLED_Z_MINUS`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[repr(transparent)]
    pub struct EsdfFlags: u32 {
        /// Seed data. The distance is authoritative and relaxation never touches it.
        const OBSERVED = 1 << 0;
        /// The distance holds a relaxed value (possibly still improvable).
        const FIXED = 1 << 1;
        /// `site_block` is meaningful.
        const HAS_SITE_INDEX = 1 << 2;
        /// Changed by the last propagation pass.
        const UPDATED = 1 << 3;
        const SPILLED_X_PLUS = 1 << 4;
        const SPILLED_X_MINUS = 1 << 5;
        const SPILLED_Y_PLUS = 1 << 6;
        const SPILLED_Y_MINUS = 1 << 7;
        const SPILLED_Z_PLUS = 1 << 8;
        const SPILLED_Z_MINUS = 1 << 9;

        /// Any of the six spill bits.
        const SPILLED = Self::SPILLED_X_PLUS.bits()
            | Self::SPILLED_X_MINUS.bits()
            | Self::SPILLED_Y_PLUS.bits()
            | Self::SPILLED_Y_MINUS.bits()
            | Self::SPILLED_Z_PLUS.bits()
            | Self::SPILLED_Z_MINUS.bits();

        /// Bits that only describe the most recent pass.
        const TRANSIENT = Self::SPILLED.bits() | Self::UPDATED.bits();
    }
}

/// A single ESDF voxel.
///
/// The default voxel is unknown: distance 0, no flags, no site.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct EsdfVoxel {
    /// Best known distance to the nearest surface, in world units.
    pub distance: f32,
    /// State bits.
    pub flags: EsdfFlags,
    /// Block believed to contain the surface this distance comes from.
    /// Only meaningful when `HAS_SITE_INDEX` is set.
    pub site_block: BlockCoord,
}

impl EsdfVoxel {
    /// An observed seed voxel: `OBSERVED | FIXED | HAS_SITE_INDEX`.
    #[inline]
    pub const fn observed(distance: f32, site_block: BlockCoord) -> Self {
        Self {
            distance,
            flags: EsdfFlags::OBSERVED
                .union(EsdfFlags::FIXED)
                .union(EsdfFlags::HAS_SITE_INDEX),
            site_block,
        }
    }

    /// A relaxed (non-observed) voxel with a known distance and site.
    #[inline]
    pub const fn fixed(distance: f32, site_block: BlockCoord) -> Self {
        Self {
            distance,
            flags: EsdfFlags::FIXED.union(EsdfFlags::HAS_SITE_INDEX),
            site_block,
        }
    }

    /// Seed voxel?
    #[inline]
    pub const fn is_observed(&self) -> bool {
        self.flags.contains(EsdfFlags::OBSERVED)
    }

    /// Holds a distance?
    #[inline]
    pub const fn is_fixed(&self) -> bool {
        self.flags.contains(EsdfFlags::FIXED)
    }

    /// The site block, if one has been recorded.
    #[inline]
    pub const fn site(&self) -> Option<BlockCoord> {
        if self.flags.contains(EsdfFlags::HAS_SITE_INDEX) {
            Some(self.site_block)
        } else {
            None
        }
    }

    /// Back to the unknown state.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Drop the per-pass bits, keeping distance, site and persistent flags.
    #[inline]
    pub fn clear_transient(&mut self) {
        self.flags.remove(EsdfFlags::TRANSIENT);
    }
}
