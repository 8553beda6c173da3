//! The single-pair relaxation rule.
//!
//! Every distance change in the engine goes through [`try_relax`]: one
//! unit-weight edge relaxation, the building block of fast sweeping. Sweeps
//! call it along 1D voxel lines inside a block; propagation calls it across
//! the shared face of two neighboring blocks.

use crate::voxel::{EsdfFlags, EsdfVoxel};

/// Try to improve `target` using `parent` as the upstream neighbor.
///
/// 1. An unfixed `parent` carries no information, and an observed `target`
///    is ground truth: no change.
/// 2. An unfixed `target` takes `parent.distance + step`, becomes
///    `FIXED | HAS_SITE_INDEX` and inherits the parent's site.
/// 3. A fixed `target` farther than `parent.distance + step` takes the
///    shorter distance and the parent's site.
/// 4. Otherwise nothing changes.
///
/// Returns `true` when `target` was modified. `parent` is never written.
#[inline]
pub fn try_relax(target: &mut EsdfVoxel, parent: &EsdfVoxel, step: f32) -> bool {
    if !parent.is_fixed() || target.is_observed() {
        return false;
    }

    let candidate = parent.distance + step;

    if !target.is_fixed() {
        target.distance = candidate;
        target
            .flags
            .insert(EsdfFlags::FIXED | EsdfFlags::HAS_SITE_INDEX);
        target.site_block = parent.site_block;
        true
    } else if target.distance > candidate {
        target.distance = candidate;
        target.site_block = parent.site_block;
        true
    } else {
        false
    }
}

/// Variant of [`try_relax`] that also (re)sets `HAS_SITE_INDEX` when a fixed
/// voxel is improved.
///
/// The two rules only differ for a voxel that is `FIXED` without
/// `HAS_SITE_INDEX`, which the engine itself never produces. It exists so
/// callers seeding fixed-but-siteless voxels can opt into the stricter
/// bookkeeping.
#[inline]
pub fn try_relax_marking_site(target: &mut EsdfVoxel, parent: &EsdfVoxel, step: f32) -> bool {
    let changed = try_relax(target, parent, step);
    if changed {
        target.flags.insert(EsdfFlags::HAS_SITE_INDEX);
    }
    changed
}
