//! Block-grid arithmetic: positions, the six axis-aligned directions, axes,
//! and compact connection sets.
//!
//! Everything that iterates directions does so in the canonical order of
//! [`Direction::ALL`]. Network merges and refloods depend on that order for
//! reproducible ids.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

/// One of the three grid axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All three axes in canonical order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// The (negative, positive) directions along this axis.
    pub fn directions(self) -> [Direction; 2] {
        match self {
            Axis::X => [Direction::West, Direction::East],
            Axis::Y => [Direction::Down, Direction::Up],
            Axis::Z => [Direction::North, Direction::South],
        }
    }

    /// The positive direction along this axis.
    pub fn positive(self) -> Direction {
        self.directions()[1]
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// The six axis-aligned unit directions.
///
/// North is -z, south is +z, west is -x, east is +x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All six directions in canonical scan order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Position of this direction in [`Direction::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit offset `(dx, dy, dz)` for this direction.
    pub fn offset(self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Y,
            Direction::North | Direction::South => Axis::Z,
            Direction::West | Direction::East => Axis::X,
        }
    }

    /// Whether this direction points along the positive end of its axis.
    pub fn is_positive(self) -> bool {
        matches!(self, Direction::Up | Direction::South | Direction::East)
    }

    /// Lowercase name, as used in data files and diagnostic dumps.
    pub fn name(self) -> &'static str {
        match self {
            Direction::Down => "down",
            Direction::Up => "up",
            Direction::North => "north",
            Direction::South => "south",
            Direction::West => "west",
            Direction::East => "east",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// DirectionSet
// ---------------------------------------------------------------------------

/// A subset of the six directions, stored as a bit mask.
///
/// Used as a node's connection set: the faces that can mechanically link to
/// a neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DirectionSet(u8);

impl DirectionSet {
    const MASK: u8 = 0b0011_1111;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn all() -> Self {
        Self(Self::MASK)
    }

    /// Both directions of an axis.
    pub fn axis(axis: Axis) -> Self {
        axis.directions().into_iter().collect()
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    pub fn contains(self, dir: Direction) -> bool {
        self.0 & (1 << dir.index()) != 0
    }

    pub fn insert(&mut self, dir: Direction) {
        self.0 |= 1 << dir.index();
    }

    pub fn remove(&mut self, dir: Direction) {
        self.0 &= !(1 << dir.index());
    }

    /// Builder-style insert.
    pub fn with(mut self, dir: Direction) -> Self {
        self.insert(dir);
        self
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Directions in `self` that are not in `other`.
    pub fn difference(self, other: DirectionSet) -> DirectionSet {
        Self(self.0 & !other.0)
    }

    /// Iterate contained directions in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |d| self.contains(*d))
    }

    /// Distinct axes touched by the contained directions, in canonical order.
    pub fn axes(self) -> Vec<Axis> {
        Axis::ALL
            .into_iter()
            .filter(|axis| axis.directions().iter().any(|d| self.contains(*d)))
            .collect()
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = DirectionSet::empty();
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}

impl From<&[Direction]> for DirectionSet {
    fn from(dirs: &[Direction]) -> Self {
        dirs.iter().copied().collect()
    }
}

impl fmt::Display for DirectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, dir) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str(dir.name())?;
        }
        f.write_str("}")
    }
}

// ---------------------------------------------------------------------------
// BlockPos
// ---------------------------------------------------------------------------

/// An integer position on the block grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

const PACKED_XZ_BITS: u32 = 26;
const PACKED_Y_BITS: u32 = 12;
const PACKED_X_SHIFT: u32 = PACKED_Y_BITS + PACKED_XZ_BITS;
const PACKED_Z_SHIFT: u32 = PACKED_Y_BITS;

impl BlockPos {
    pub const ORIGIN: BlockPos = BlockPos { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The adjacent position one step in `dir`. Wraps at the `i32` limits.
    pub fn offset(self, dir: Direction) -> BlockPos {
        let (dx, dy, dz) = dir.offset();
        BlockPos::new(
            self.x.wrapping_add(dx),
            self.y.wrapping_add(dy),
            self.z.wrapping_add(dz),
        )
    }

    /// The six face-adjacent positions, paired with the direction that
    /// reaches them, in canonical order.
    pub fn neighbors(self) -> impl Iterator<Item = (Direction, BlockPos)> {
        Direction::ALL.into_iter().map(move |d| (d, self.offset(d)))
    }

    /// Pack into a single `u64`: 26 bits of x, 26 bits of z, 12 bits of y.
    ///
    /// Coordinates outside those signed ranges wrap; callers that need a
    /// lossless key for such positions should use `BlockPos` itself.
    pub fn pack(self) -> u64 {
        let x = (self.x as i64 as u64) & ((1 << PACKED_XZ_BITS) - 1);
        let y = (self.y as i64 as u64) & ((1 << PACKED_Y_BITS) - 1);
        let z = (self.z as i64 as u64) & ((1 << PACKED_XZ_BITS) - 1);
        (x << PACKED_X_SHIFT) | (z << PACKED_Z_SHIFT) | y
    }

    /// Inverse of [`BlockPos::pack`].
    pub fn unpack(packed: u64) -> BlockPos {
        let raw = packed as i64;
        let x = raw >> PACKED_X_SHIFT;
        let y = (raw << (64 - PACKED_Y_BITS)) >> (64 - PACKED_Y_BITS);
        let z = (raw << (64 - PACKED_X_SHIFT)) >> (64 - PACKED_XZ_BITS);
        BlockPos::new(x as i32, y as i32, z as i32)
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Direction
    // -----------------------------------------------------------------------

    #[test]
    fn opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
            assert_eq!(dir.opposite().axis(), dir.axis());
        }
    }

    #[test]
    fn offsets_cancel_with_opposite() {
        for dir in Direction::ALL {
            let (ax, ay, az) = dir.offset();
            let (bx, by, bz) = dir.opposite().offset();
            assert_eq!((ax + bx, ay + by, az + bz), (0, 0, 0));
        }
    }

    #[test]
    fn canonical_index_matches_all() {
        for (i, dir) in Direction::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }

    #[test]
    fn south_is_positive_z() {
        assert_eq!(Direction::South.offset(), (0, 0, 1));
        assert!(Direction::South.is_positive());
        assert_eq!(Axis::Z.positive(), Direction::South);
    }

    // -----------------------------------------------------------------------
    // DirectionSet
    // -----------------------------------------------------------------------

    #[test]
    fn direction_set_insert_remove() {
        let mut set = DirectionSet::empty();
        assert!(set.is_empty());
        set.insert(Direction::East);
        set.insert(Direction::North);
        assert!(set.contains(Direction::East));
        assert!(!set.contains(Direction::West));
        assert_eq!(set.len(), 2);
        set.remove(Direction::East);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Direction::North]);
    }

    #[test]
    fn direction_set_iterates_in_canonical_order() {
        let set: DirectionSet = [Direction::East, Direction::Down, Direction::South]
            .into_iter()
            .collect();
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![Direction::Down, Direction::South, Direction::East]
        );
    }

    #[test]
    fn direction_set_axes_and_difference() {
        let set = DirectionSet::axis(Axis::Z).with(Direction::Up);
        assert_eq!(set.axes(), vec![Axis::Y, Axis::Z]);
        let diff = set.difference(DirectionSet::axis(Axis::Z));
        assert_eq!(diff, DirectionSet::empty().with(Direction::Up));
        assert_eq!(DirectionSet::from_bits(0xFF), DirectionSet::all());
    }

    #[test]
    fn direction_set_display() {
        let set = DirectionSet::axis(Axis::Z);
        assert_eq!(set.to_string(), "{north,south}");
        assert_eq!(DirectionSet::empty().to_string(), "{}");
    }

    // -----------------------------------------------------------------------
    // BlockPos
    // -----------------------------------------------------------------------

    #[test]
    fn neighbors_are_adjacent() {
        let origin = BlockPos::new(4, -2, 9);
        let neighbors: Vec<_> = origin.neighbors().collect();
        assert_eq!(neighbors.len(), 6);
        for (dir, pos) in neighbors {
            let (dx, dy, dz) = dir.offset();
            assert_eq!((pos.x - origin.x, pos.y - origin.y, pos.z - origin.z), (dx, dy, dz));
            assert_eq!(pos.offset(dir.opposite()), origin);
        }
    }

    #[test]
    fn pack_unpack_round_trips_negative_coordinates() {
        let samples = [
            BlockPos::ORIGIN,
            BlockPos::new(-1, -1, -1),
            BlockPos::new(33_554_431, 2047, -33_554_432),
            BlockPos::new(-30_000_000, -64, 29_999_999),
        ];
        for pos in samples {
            assert_eq!(BlockPos::unpack(pos.pack()), pos);
        }
    }

    #[test]
    fn packed_keys_are_distinct_for_neighbors() {
        let origin = BlockPos::new(10, 64, -10);
        let mut keys: Vec<u64> = origin.neighbors().map(|(_, p)| p.pack()).collect();
        keys.push(origin.pack());
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn block_pos_display() {
        assert_eq!(BlockPos::new(0, -1, 5).to_string(), "(0, -1, 5)");
    }
}
