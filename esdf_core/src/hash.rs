//! Morton keys for block coordinates.
//!
//! The block map keys every allocated block by the Z-order code of its
//! coordinate. Codes are exact (63 bits), so a key identifies a block
//! uniquely as long as the coordinate is inside [`MORTON_MIN`, `MORTON_MAX`].

use crate::types::BlockCoord;

const OFFSET: i32 = 1 << 20;

/// Smallest coordinate component that can be encoded.
pub const MORTON_MIN: i32 = -OFFSET;
/// Largest coordinate component that can be encoded.
pub const MORTON_MAX: i32 = OFFSET - 1;

/// Spread the lower 21 bits of `x` so two zero bits sit between each.
#[inline]
pub fn spread_bits_3d(x: u32) -> u64 {
    let mut x = (x & 0x1FFFFF) as u64;
    x = (x | (x << 32)) & 0x1F00000000FFFF;
    x = (x | (x << 16)) & 0x1F0000FF0000FF;
    x = (x | (x << 8)) & 0x100F00F00F00F00F;
    x = (x | (x << 4)) & 0x10C30C30C30C30C3;
    x = (x | (x << 2)) & 0x1249249249249249;
    x
}

/// Inverse of [`spread_bits_3d`].
#[inline]
pub fn compact_bits_3d(mut x: u64) -> u32 {
    x &= 0x1249249249249249;
    x = (x | (x >> 2)) & 0x10C30C30C30C30C3;
    x = (x | (x >> 4)) & 0x100F00F00F00F00F;
    x = (x | (x >> 8)) & 0x1F0000FF0000FF;
    x = (x | (x >> 16)) & 0x1F00000000FFFF;
    x = (x | (x >> 32)) & 0x1FFFFF;
    x as u32
}

/// Whether every component of `coord` fits the signed Morton range.
#[inline]
pub const fn in_morton_range(coord: BlockCoord) -> bool {
    coord.x >= MORTON_MIN
        && coord.x <= MORTON_MAX
        && coord.y >= MORTON_MIN
        && coord.y <= MORTON_MAX
        && coord.z >= MORTON_MIN
        && coord.z <= MORTON_MAX
}

/// Morton encode a signed block coordinate (offset by 2^20 per component).
///
/// Components outside [`MORTON_MIN`, `MORTON_MAX`] alias other blocks;
/// check with [`in_morton_range`] first.
#[inline]
pub fn morton_encode_signed(coord: BlockCoord) -> u64 {
    let x = coord.x.wrapping_add(OFFSET) as u32;
    let y = coord.y.wrapping_add(OFFSET) as u32;
    let z = coord.z.wrapping_add(OFFSET) as u32;

    spread_bits_3d(x) | (spread_bits_3d(y) << 1) | (spread_bits_3d(z) << 2)
}

/// Inverse of [`morton_encode_signed`].
#[inline]
pub fn morton_decode_signed(code: u64) -> BlockCoord {
    BlockCoord::new(
        (compact_bits_3d(code) as i32).wrapping_sub(OFFSET),
        (compact_bits_3d(code >> 1) as i32).wrapping_sub(OFFSET),
        (compact_bits_3d(code >> 2) as i32).wrapping_sub(OFFSET),
    )
}
