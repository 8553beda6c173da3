//! Face-neighbor tables for the propagation pass.
//!
//! An entry lists a block and its six face neighbors by arena index, in the
//! order `[self, +x, -x, +y, -y, +z, -z]`. Missing neighbors hold
//! [`BlockAdjacency::INVALID`].

use esdf_core::Direction;

use crate::memory::EsdfGrid;

/// One block and the arena indices of its face neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockAdjacency {
    /// `[self, +x, -x, +y, -y, +z, -z]`
    pub indices: [u32; 7],
}

impl BlockAdjacency {
    /// Marker for "no block here".
    pub const INVALID: u32 = u32::MAX;

    /// An entry for `self_index` with no neighbors.
    #[inline]
    pub const fn isolated(self_index: u32) -> Self {
        let mut indices = [Self::INVALID; 7];
        indices[0] = self_index;
        Self { indices }
    }

    /// Builder-style neighbor assignment.
    #[inline]
    pub const fn with_neighbor(mut self, dir: Direction, index: u32) -> Self {
        self.indices[1 + dir.index()] = index;
        self
    }

    /// Arena index of the block this entry describes.
    #[inline]
    pub const fn self_index(&self) -> u32 {
        self.indices[0]
    }

    /// Raw neighbor slot, possibly [`Self::INVALID`].
    #[inline]
    pub const fn neighbor_raw(&self, dir: Direction) -> u32 {
        self.indices[1 + dir.index()]
    }

    /// Neighbor index along `dir`, if present.
    #[inline]
    pub fn neighbor(&self, dir: Direction) -> Option<usize> {
        match self.neighbor_raw(dir) {
            Self::INVALID => None,
            idx => Some(idx as usize),
        }
    }

    /// Number of present neighbors.
    #[inline]
    pub fn degree(&self) -> usize {
        self.indices[1..]
            .iter()
            .filter(|&&idx| idx != Self::INVALID)
            .count()
    }
}

/// Adjacency entries for a set of blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdjacencyTable {
    entries: Vec<BlockAdjacency>,
}

impl AdjacencyTable {
    /// Look up the face neighbors of every block in `active`.
    ///
    /// Neighbors are resolved against the whole grid, not just `active`, so
    /// a dirty block still pushes into clean neighbors. Indices that do not
    /// name an allocated block are skipped.
    pub fn build(grid: &EsdfGrid, active: &[usize]) -> Self {
        let entries = active
            .iter()
            .filter_map(|&idx| {
                let coord = grid.block_coord(idx)?;
                let entry = Direction::ALL.iter().fold(
                    BlockAdjacency::isolated(idx as u32),
                    |entry, &dir| match grid.block_index(coord.neighbor(dir)) {
                        Some(n) => entry.with_neighbor(dir, n as u32),
                        None => entry,
                    },
                );
                Some(entry)
            })
            .collect();
        Self { entries }
    }

    /// Entries for every allocated block.
    pub fn build_all(grid: &EsdfGrid) -> Self {
        let all: Vec<usize> = (0..grid.num_blocks()).collect();
        Self::build(grid, &all)
    }

    /// Wrap caller-made entries.
    pub fn from_entries(entries: Vec<BlockAdjacency>) -> Self {
        Self { entries }
    }

    /// The entries.
    #[inline]
    pub fn entries(&self) -> &[BlockAdjacency] {
        &self.entries
    }

    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate the entries.
    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, BlockAdjacency> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a AdjacencyTable {
    type Item = &'a BlockAdjacency;
    type IntoIter = core::slice::Iter<'a, BlockAdjacency>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EsdfConfig;
    use esdf_core::BlockCoord;

    fn line_grid(n: i32) -> EsdfGrid {
        let mut grid = EsdfGrid::new(EsdfConfig::new(2, 1.0, 16)).unwrap();
        for x in 0..n {
            grid.allocate_block(BlockCoord::new(x, 0, 0)).unwrap();
        }
        grid
    }

    #[test]
    fn test_isolated_entry() {
        let e = BlockAdjacency::isolated(4);
        assert_eq!(e.self_index(), 4);
        assert_eq!(e.degree(), 0);
        for dir in Direction::ALL {
            assert_eq!(e.neighbor(dir), None);
            assert_eq!(e.neighbor_raw(dir), BlockAdjacency::INVALID);
        }
    }

    #[test]
    fn test_slot_order() {
        let e = BlockAdjacency::isolated(0)
            .with_neighbor(Direction::X_PLUS, 1)
            .with_neighbor(Direction::Z_MINUS, 6);
        assert_eq!(e.indices, [0, 1, u32::MAX, u32::MAX, u32::MAX, u32::MAX, 6]);
        assert_eq!(e.degree(), 2);
    }

    #[test]
    fn test_build_line() {
        let grid = line_grid(3);
        let table = AdjacencyTable::build_all(&grid);
        assert_eq!(table.len(), 3);

        let middle = table.entries()[1];
        assert_eq!(middle.self_index(), 1);
        assert_eq!(middle.neighbor(Direction::X_PLUS), Some(2));
        assert_eq!(middle.neighbor(Direction::X_MINUS), Some(0));
        assert_eq!(middle.neighbor(Direction::Y_PLUS), None);

        let first = table.entries()[0];
        assert_eq!(first.neighbor(Direction::X_MINUS), None);
        assert_eq!(first.degree(), 1);
    }

    #[test]
    fn test_build_subset_sees_inactive_neighbors() {
        let grid = line_grid(3);
        let table = AdjacencyTable::build(&grid, &[2, 17]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.entries()[0].neighbor(Direction::X_MINUS), Some(1));
    }
}
