//! Map coordinates, directions and goods.

use lockstep_snapshot::{ReadSession, Result, WriteSession};
use lockstep_stream::WireEnum;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MapPoint
// ---------------------------------------------------------------------------

/// A node of the hex grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: u16,
    pub y: u16,
}

impl MapPoint {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    pub fn write(self, session: &mut WriteSession<'_>) {
        session.push_u16(self.x);
        session.push_u16(self.y);
    }

    pub fn read(session: &mut ReadSession<'_>) -> Result<Self> {
        Ok(Self {
            x: session.pop_u16()?,
            y: session.pop_u16()?,
        })
    }

    /// The neighbouring node in `dir` on a wrapping map of the given size.
    pub fn neighbour(self, dir: Direction, width: u16, height: u16) -> Self {
        let (dx, dy): (i32, i32) = match dir {
            Direction::West => (-1, 0),
            Direction::NorthWest => (-((self.y % 2 == 0) as i32), -1),
            Direction::NorthEast => ((self.y % 2 == 1) as i32, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => ((self.y % 2 == 1) as i32, 1),
            Direction::SouthWest => (-((self.y % 2 == 0) as i32), 1),
        };
        let x = (i32::from(self.x) + dx).rem_euclid(i32::from(width));
        let y = (i32::from(self.y) + dy).rem_euclid(i32::from(height));
        Self::new(x as u16, y as u16)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the six hex directions, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    West = 0,
    NorthWest = 1,
    NorthEast = 2,
    East = 3,
    SouthEast = 4,
    SouthWest = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::West,
        Direction::NorthWest,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
    ];

    pub fn opposite(self) -> Self {
        Self::ALL[(self as usize + 3) % 6]
    }
}

impl WireEnum for Direction {
    const MAX_RAW: u16 = Direction::SouthWest as u16;

    fn to_raw(self) -> u16 {
        self as u16
    }

    fn from_raw(raw: u16) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }
}

// ---------------------------------------------------------------------------
// Good
// ---------------------------------------------------------------------------

/// A transportable good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Good {
    Wood = 0,
    Boards = 1,
    Stones = 2,
    Fish = 3,
    Grain = 4,
    Flour = 5,
    Bread = 6,
    Meat = 7,
    Water = 8,
    Beer = 9,
    Coal = 10,
    IronOre = 11,
    Iron = 12,
    Gold = 13,
    Tools = 14,
    Sword = 15,
    Shield = 16,
    Boat = 17,
}

impl Good {
    pub const ALL: [Good; 18] = [
        Good::Wood,
        Good::Boards,
        Good::Stones,
        Good::Fish,
        Good::Grain,
        Good::Flour,
        Good::Bread,
        Good::Meat,
        Good::Water,
        Good::Beer,
        Good::Coal,
        Good::IronOre,
        Good::Iron,
        Good::Gold,
        Good::Tools,
        Good::Sword,
        Good::Shield,
        Good::Boat,
    ];

    pub const COUNT: usize = Self::ALL.len();
}

impl WireEnum for Good {
    const MAX_RAW: u16 = Good::Boat as u16;

    fn to_raw(self) -> u16 {
        self as u16
    }

    fn from_raw(raw: u16) -> Option<Self> {
        Self::ALL.get(usize::from(raw)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_wrap_around_the_map() {
        let corner = MapPoint::new(0, 0);
        assert_eq!(corner.neighbour(Direction::West, 8, 8), MapPoint::new(7, 0));
        assert_eq!(corner.neighbour(Direction::NorthWest, 8, 8), MapPoint::new(7, 7));
        assert_eq!(corner.neighbour(Direction::East, 8, 8), MapPoint::new(1, 0));
    }

    #[test]
    fn walking_there_and_back_returns_home() {
        let start = MapPoint::new(3, 5);
        for dir in Direction::ALL {
            let there = start.neighbour(dir, 10, 10);
            assert_eq!(there.neighbour(dir.opposite(), 10, 10), start, "{dir:?}");
        }
    }

    #[test]
    fn wire_tags_are_dense() {
        for (raw, good) in Good::ALL.iter().enumerate() {
            assert_eq!(good.to_raw() as usize, raw);
        }
        assert_eq!(Good::from_raw(Good::MAX_RAW + 1), None);
        assert_eq!(Direction::from_raw(6), None);
    }
}
