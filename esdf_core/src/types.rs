//! Core types for esdf_core.
//!
//! Provides block/voxel coordinate types and the axis and direction vocabulary
//! shared by the sweep and propagation passes.

use core::hash::{Hash, Hasher};
use core::ops::{Add, Sub};

use crate::error::EsdfCoreError;
use crate::voxel::EsdfFlags;

/// Sparse block coordinates (signed for negative world regions).
///
/// Represents the position of a block on the block lattice.
/// Each block contains a dense cube of voxels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct BlockCoord {
    /// X coordinate in block space.
    pub x: i32,
    /// Y coordinate in block space.
    pub y: i32,
    /// Z coordinate in block space.
    pub z: i32,
}

impl BlockCoord {
    /// Create a new BlockCoord.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Convert to an array.
    #[inline]
    pub const fn as_array(&self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// The adjacent block one step along `dir`.
    #[inline]
    pub const fn neighbor(&self, dir: Direction) -> Self {
        let delta = dir.sign();
        match dir.axis {
            Axis::X => Self::new(self.x + delta, self.y, self.z),
            Axis::Y => Self::new(self.x, self.y + delta, self.z),
            Axis::Z => Self::new(self.x, self.y, self.z + delta),
        }
    }
}

impl From<[i32; 3]> for BlockCoord {
    #[inline]
    fn from(arr: [i32; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }
}

impl From<BlockCoord> for [i32; 3] {
    #[inline]
    fn from(b: BlockCoord) -> Self {
        b.as_array()
    }
}

impl Hash for BlockCoord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
        self.z.hash(state);
    }
}

impl Add for BlockCoord {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for BlockCoord {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Dense voxel coordinates within a block (unsigned, 0 to dim-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoxelCoord {
    /// X coordinate within the block (0 to dim-1).
    pub x: u32,
    /// Y coordinate within the block (0 to dim-1).
    pub y: u32,
    /// Z coordinate within the block (0 to dim-1).
    pub z: u32,
}

impl VoxelCoord {
    /// The block-local origin voxel.
    pub const ZERO: Self = Self::new(0, 0, 0);

    /// Create a new VoxelCoord.
    #[inline]
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Convert to an array.
    #[inline]
    pub const fn as_array(&self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }

    /// Component along `axis`.
    #[inline]
    pub const fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Copy of `self` with the component along `axis` replaced.
    #[inline]
    pub const fn with(mut self, axis: Axis, value: u32) -> Self {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
        self
    }

    /// Compute the flat index inside a block of side `dim`.
    /// Uses row-major ordering: index = x + y * dim + z * dim * dim
    #[inline]
    pub const fn flat_index(&self, dim: u32) -> usize {
        let dim = dim as usize;
        self.x as usize + dim * (self.y as usize + dim * self.z as usize)
    }

    /// Create a VoxelCoord from a flat index and block side.
    #[inline]
    pub const fn from_flat_index(index: usize, dim: u32) -> Self {
        let dim = dim as usize;
        Self {
            x: (index % dim) as u32,
            y: ((index / dim) % dim) as u32,
            z: (index / (dim * dim)) as u32,
        }
    }

    /// Check that every component is below `dim`.
    pub fn validate(&self, dim: u32) -> Result<Self, EsdfCoreError> {
        for c in self.as_array() {
            if c >= dim {
                return Err(EsdfCoreError::VoxelOutOfBounds {
                    coord: c,
                    max: dim.saturating_sub(1),
                });
            }
        }
        Ok(*self)
    }
}

impl From<[u32; 3]> for VoxelCoord {
    #[inline]
    fn from(arr: [u32; 3]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
            z: arr[2],
        }
    }
}

/// Voxel coordinates on the global (unbounded) voxel lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GlobalVoxelCoord {
    /// X coordinate in voxel units.
    pub x: i64,
    /// Y coordinate in voxel units.
    pub y: i64,
    /// Z coordinate in voxel units.
    pub z: i64,
}

impl GlobalVoxelCoord {
    /// Create a new GlobalVoxelCoord.
    #[inline]
    pub const fn new(x: i64, y: i64, z: i64) -> Self {
        Self { x, y, z }
    }

    /// Compose a global coordinate from a block and a voxel inside it.
    #[inline]
    pub const fn from_block_and_voxel(block: BlockCoord, voxel: VoxelCoord, dim: u32) -> Self {
        let d = dim as i64;
        Self {
            x: block.x as i64 * d + voxel.x as i64,
            y: block.y as i64 * d + voxel.y as i64,
            z: block.z as i64 * d + voxel.z as i64,
        }
    }

    /// The block containing this voxel (floor division, so -1 maps to block -1).
    ///
    /// `None` when the block index does not fit a [`BlockCoord`] component.
    #[inline]
    pub fn block_coord(&self, dim: u32) -> Option<BlockCoord> {
        let d = i64::from(dim);
        Some(BlockCoord::new(
            i32::try_from(self.x.div_euclid(d)).ok()?,
            i32::try_from(self.y.div_euclid(d)).ok()?,
            i32::try_from(self.z.div_euclid(d)).ok()?,
        ))
    }

    /// Position of this voxel inside its block.
    #[inline]
    pub const fn local_coord(&self, dim: u32) -> VoxelCoord {
        let d = dim as i64;
        VoxelCoord::new(
            self.x.rem_euclid(d) as u32,
            self.y.rem_euclid(d) as u32,
            self.z.rem_euclid(d) as u32,
        )
    }

    /// Split into `(block, voxel)`, or `None` if the block is unrepresentable.
    #[inline]
    pub fn decompose(&self, dim: u32) -> Option<(BlockCoord, VoxelCoord)> {
        Some((self.block_coord(dim)?, self.local_coord(dim)))
    }

    /// Manhattan (L1) distance in voxels.
    #[inline]
    pub fn manhattan(&self, other: &Self) -> u64 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y) + self.z.abs_diff(other.z)
    }
}

/// A lattice axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    /// The x axis.
    X,
    /// The y axis.
    Y,
    /// The z axis.
    Z,
}

impl Axis {
    /// All axes in pass order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Axis index (0, 1, 2).
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// The two axes spanning the plane perpendicular to `self`.
    #[inline]
    pub const fn others(self) -> (Axis, Axis) {
        match self {
            Axis::X => (Axis::Y, Axis::Z),
            Axis::Y => (Axis::X, Axis::Z),
            Axis::Z => (Axis::X, Axis::Y),
        }
    }

    /// Distance between consecutive voxels along this axis in the flat layout.
    #[inline]
    pub const fn stride(self, dim: u32) -> usize {
        let dim = dim as usize;
        match self {
            Axis::X => 1,
            Axis::Y => dim,
            Axis::Z => dim * dim,
        }
    }

    /// The two directions of this axis, "+" first.
    #[inline]
    pub const fn directions(self) -> [Direction; 2] {
        [Direction::new(self, true), Direction::new(self, false)]
    }
}

/// A signed axis direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Direction {
    /// Axis of travel.
    pub axis: Axis,
    /// `true` for increasing coordinates.
    pub positive: bool,
}

impl Direction {
    /// +x
    pub const X_PLUS: Self = Self::new(Axis::X, true);
    /// -x
    pub const X_MINUS: Self = Self::new(Axis::X, false);
    /// +y
    pub const Y_PLUS: Self = Self::new(Axis::Y, true);
    /// -y
    pub const Y_MINUS: Self = Self::new(Axis::Y, false);
    /// +z
    pub const Z_PLUS: Self = Self::new(Axis::Z, true);
    /// -z
    pub const Z_MINUS: Self = Self::new(Axis::Z, false);

    /// All six directions in sweep order: +x, -x, +y, -y, +z, -z.
    pub const ALL: [Direction; 6] = [
        Self::X_PLUS,
        Self::X_MINUS,
        Self::Y_PLUS,
        Self::Y_MINUS,
        Self::Z_PLUS,
        Self::Z_MINUS,
    ];

    /// Create a new Direction.
    #[inline]
    pub const fn new(axis: Axis, positive: bool) -> Self {
        Self { axis, positive }
    }

    /// +1 or -1.
    #[inline]
    pub const fn sign(self) -> i32 {
        if self.positive {
            1
        } else {
            -1
        }
    }

    /// The direction pointing the other way.
    #[inline]
    pub const fn opposite(self) -> Self {
        Self::new(self.axis, !self.positive)
    }

    /// Position of this direction in [`Direction::ALL`] (0..6).
    #[inline]
    pub const fn index(self) -> usize {
        self.axis.index() * 2 + if self.positive { 0 } else { 1 }
    }

    /// The spill flag raised when a sweep in this direction changes a voxel.
    #[inline]
    pub const fn spill_flag(self) -> EsdfFlags {
        match (self.axis, self.positive) {
            (Axis::X, true) => EsdfFlags::SPILLED_X_PLUS,
            (Axis::X, false) => EsdfFlags::SPILLED_X_MINUS,
            (Axis::Y, true) => EsdfFlags::SPILLED_Y_PLUS,
            (Axis::Y, false) => EsdfFlags::SPILLED_Y_MINUS,
            (Axis::Z, true) => EsdfFlags::SPILLED_Z_PLUS,
            (Axis::Z, false) => EsdfFlags::SPILLED_Z_MINUS,
        }
    }

    /// Layer index (along `axis`) of the block face this direction points at.
    #[inline]
    pub const fn face_layer(self, dim: u32) -> u32 {
        if self.positive {
            dim - 1
        } else {
            0
        }
    }
}
