//! Block coordinate → arena index table.
//!
//! Open addressing with linear probing over a power-of-two slot array. Keys
//! are full 63-bit Morton codes, so two blocks never share a slot. The table
//! doubles before it passes half full. Writers need `&mut self`; any number
//! of readers may probe through `&self`.

use esdf_core::{in_morton_range, morton_encode_signed, BlockCoord};

use crate::error::{GridError, Result};

/// One probe slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    key: u64,
    index: u32,
}

impl Slot {
    /// Morton keys use 63 bits; this one is never produced.
    const VACANT_KEY: u64 = u64::MAX;

    const VACANT: Self = Self {
        key: Self::VACANT_KEY,
        index: 0,
    };

    #[inline]
    fn is_vacant(&self) -> bool {
        self.key == Self::VACANT_KEY
    }
}

/// Map from block coordinate to arena index.
#[derive(Debug, Clone)]
pub struct BlockMap {
    slots: Box<[Slot]>,
    mask: usize,
    len: usize,
}

impl BlockMap {
    /// Largest arena index the map stores.
    pub const MAX_INDEX: usize = u32::MAX as usize;

    /// Slot count ceiling, the largest power of two a `usize` holds.
    const MAX_SLOTS: usize = 1 << (usize::BITS - 1);

    /// Create a map with at least `min_slots` slots.
    pub fn with_capacity(min_slots: usize) -> Self {
        let slots = min_slots
            .max(1)
            .checked_next_power_of_two()
            .unwrap_or(Self::MAX_SLOTS);
        Self {
            slots: vec![Slot::VACANT; slots].into_boxed_slice(),
            mask: slots - 1,
            len: 0,
        }
    }

    /// Double the slot array and re-home every key.
    fn grow(&mut self) -> Result<()> {
        let slots = self
            .slots
            .len()
            .checked_mul(2)
            .ok_or(GridError::HashTableFull)?;
        let old = core::mem::replace(
            &mut self.slots,
            vec![Slot::VACANT; slots].into_boxed_slice(),
        );
        self.mask = slots - 1;
        for slot in old.iter().filter(|slot| !slot.is_vacant()) {
            let pos = self.probe(slot.key).ok_or(GridError::HashTableFull)?;
            self.slots[pos] = *slot;
        }
        log::trace!("block map grew to {} slots for {} blocks", slots, self.len);
        Ok(())
    }

    /// First slot to probe for `key`.
    ///
    /// Neighboring blocks differ only in low Morton bits, so the key is mixed
    /// before masking to keep them from clustering.
    #[inline]
    fn home(&self, key: u64) -> usize {
        (key.wrapping_mul(0x9E37_79B9_7F4A_7C15) >> 17) as usize & self.mask
    }

    /// Walk the probe sequence for `key`, returning the slot holding it or the
    /// first vacant slot. `None` when every slot is taken by other keys.
    #[inline]
    fn probe(&self, key: u64) -> Option<usize> {
        let mut pos = self.home(key);
        for _ in 0..self.slots.len() {
            let slot = &self.slots[pos];
            if slot.is_vacant() || slot.key == key {
                return Some(pos);
            }
            pos = (pos + 1) & self.mask;
        }
        None
    }

    /// Arena index of `coord`, if present.
    #[inline]
    pub fn get(&self, coord: BlockCoord) -> Option<usize> {
        if !in_morton_range(coord) {
            return None;
        }
        let slot = self.slots[self.probe(morton_encode_signed(coord))?];
        (!slot.is_vacant()).then_some(slot.index as usize)
    }

    /// Record `coord` at arena index `index`.
    ///
    /// # Errors
    /// - `DuplicateBlock` if the coordinate is already present
    /// - `CoordinateOutOfRange` if the coordinate has no Morton key
    /// - `HashTableFull` if the table cannot grow or `index` does not fit
    pub fn insert(&mut self, coord: BlockCoord, index: usize) -> Result<()> {
        if !in_morton_range(coord) {
            return Err(GridError::out_of_range(coord));
        }
        let index = u32::try_from(index).map_err(|_| GridError::HashTableFull)?;
        let key = morton_encode_signed(coord);
        if self.contains(coord) {
            return Err(GridError::duplicate(coord));
        }
        if (self.len + 1) * 2 > self.slots.len() {
            self.grow()?;
        }

        let pos = self.probe(key).ok_or(GridError::HashTableFull)?;
        self.slots[pos] = Slot { key, index };
        self.len += 1;
        Ok(())
    }

    /// Check if the map contains a coordinate.
    #[inline]
    pub fn contains(&self, coord: BlockCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Number of stored coordinates.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Nothing stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esdf_core::hash::MORTON_MAX;

    #[test]
    fn test_insert_and_get() {
        let mut map = BlockMap::with_capacity(100);
        assert_eq!(map.capacity(), 128);

        let coord = BlockCoord::new(1, 2, 3);
        map.insert(coord, 0).unwrap();
        assert_eq!(map.get(coord), Some(0));
        assert!(map.contains(coord));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_duplicate() {
        let mut map = BlockMap::with_capacity(16);
        let coord = BlockCoord::new(1, 2, 3);
        map.insert(coord, 0).unwrap();
        assert!(matches!(
            map.insert(coord, 1),
            Err(GridError::DuplicateBlock { x: 1, y: 2, z: 3 })
        ));
        assert_eq!(map.get(coord), Some(0));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_not_found() {
        let map = BlockMap::with_capacity(16);
        assert_eq!(map.get(BlockCoord::new(1, 2, 3)), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_dense_neighborhood() {
        let mut map = BlockMap::with_capacity(1024);
        let mut next = 0;
        for z in -4..4 {
            for y in -4..4 {
                for x in -4..4 {
                    map.insert(BlockCoord::new(x, y, z), next).unwrap();
                    next += 1;
                }
            }
        }

        let mut expected = 0;
        for z in -4..4 {
            for y in -4..4 {
                for x in -4..4 {
                    assert_eq!(map.get(BlockCoord::new(x, y, z)), Some(expected));
                    expected += 1;
                }
            }
        }
        assert_eq!(map.get(BlockCoord::new(4, 0, 0)), None);
    }

    #[test]
    fn test_keys_sharing_low_bits() {
        let mut map = BlockMap::with_capacity(64);
        let a = BlockCoord::new(0, 0, 0);
        let b = BlockCoord::new(2048, 0, 0);
        assert_eq!(
            morton_encode_signed(a) as u32,
            morton_encode_signed(b) as u32
        );

        map.insert(a, 0).unwrap();
        map.insert(b, 1).unwrap();
        assert_eq!(map.get(a), Some(0));
        assert_eq!(map.get(b), Some(1));
        assert_eq!(map.get(BlockCoord::new(4096, 0, 0)), None);
    }

    #[test]
    fn test_grows_past_initial_slots() {
        let mut map = BlockMap::with_capacity(2);
        for x in 0..100 {
            map.insert(BlockCoord::new(x, -x, 1), x as usize).unwrap();
            assert!(map.len() * 2 <= map.capacity());
        }
        assert_eq!(map.capacity(), 256);
        for x in 0..100 {
            assert_eq!(map.get(BlockCoord::new(x, -x, 1)), Some(x as usize));
        }
        assert_eq!(map.get(BlockCoord::new(100, -100, 1)), None);
        assert!(matches!(
            map.insert(BlockCoord::new(7, -7, 1), 0),
            Err(GridError::DuplicateBlock { .. })
        ));
    }

    #[test]
    fn test_out_of_range() {
        let far = BlockCoord::new(MORTON_MAX + 1, 0, 0);
        let mut roomy = BlockMap::with_capacity(8);
        assert!(matches!(
            roomy.insert(far, 0),
            Err(GridError::CoordinateOutOfRange { .. })
        ));
        assert_eq!(roomy.get(far), None);
    }

    #[test]
    fn test_index_must_fit() {
        let mut map = BlockMap::with_capacity(8);
        assert_eq!(
            map.insert(BlockCoord::new(0, 0, 0), BlockMap::MAX_INDEX + 1),
            Err(GridError::HashTableFull)
        );
    }
}
