use std::ops::{BitAnd, BitOr, BitXor, Not};

/// Axis-aligned cube face. Vertical faces first; z is up.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Face {
    Top = 0,
    Bottom = 1,
    East = 2,
    West = 3,
    North = 4,
    South = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::Top,
        Face::Bottom,
        Face::East,
        Face::West,
        Face::North,
        Face::South,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a face index `[0..6)` back into a `Face` value.
    /// Falls back to `Top` for out-of-range indices.
    #[inline]
    pub fn from_index(i: usize) -> Face {
        match i {
            0 => Face::Top,
            1 => Face::Bottom,
            2 => Face::East,
            3 => Face::West,
            4 => Face::North,
            5 => Face::South,
            _ => Face::Top,
        }
    }

    /// Returns the integer grid delta `(dx,dy,dz)` when stepping out of this face.
    #[inline]
    pub fn delta(self) -> (i32, i32, i32) {
        match self {
            Face::Top => (0, 0, 1),
            Face::Bottom => (0, 0, -1),
            Face::East => (1, 0, 0),
            Face::West => (-1, 0, 0),
            Face::North => (0, 1, 0),
            Face::South => (0, -1, 0),
        }
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::Top => Face::Bottom,
            Face::Bottom => Face::Top,
            Face::East => Face::West,
            Face::West => Face::East,
            Face::North => Face::South,
            Face::South => Face::North,
        }
    }
}

/// Six face flags packed into the low bits of a byte. Used both as the
/// per-layer hidden-face cache and as a "skip these faces" mesh argument.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct FaceSet(u8);

const MASK: u8 = 0b11_1111;

impl FaceSet {
    pub const NONE: FaceSet = FaceSet(0);
    pub const ALL: FaceSet = FaceSet(MASK);

    #[inline]
    pub fn from_bits(bits: u8) -> FaceSet {
        FaceSet(bits & MASK)
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, face: Face) -> bool {
        self.0 & (1 << face.index()) != 0
    }

    #[inline]
    pub fn insert(&mut self, face: Face) {
        self.0 |= 1 << face.index();
    }

    #[inline]
    pub fn remove(&mut self, face: Face) {
        self.0 &= !(1 << face.index());
    }

    #[inline]
    pub fn set(&mut self, face: Face, on: bool) {
        if on {
            self.insert(face);
        } else {
            self.remove(face);
        }
    }

    #[inline]
    pub fn is_all(self) -> bool {
        self.0 == MASK
    }

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }
}

impl BitAnd for FaceSet {
    type Output = FaceSet;
    #[inline]
    fn bitand(self, rhs: FaceSet) -> FaceSet {
        FaceSet(self.0 & rhs.0)
    }
}

impl BitOr for FaceSet {
    type Output = FaceSet;
    #[inline]
    fn bitor(self, rhs: FaceSet) -> FaceSet {
        FaceSet(self.0 | rhs.0)
    }
}

impl BitXor for FaceSet {
    type Output = FaceSet;
    #[inline]
    fn bitxor(self, rhs: FaceSet) -> FaceSet {
        FaceSet(self.0 ^ rhs.0)
    }
}

impl Not for FaceSet {
    type Output = FaceSet;
    #[inline]
    fn not(self) -> FaceSet {
        FaceSet(!self.0 & MASK)
    }
}
