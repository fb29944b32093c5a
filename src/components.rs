use serde::{Deserialize, Serialize};

/// Kind of a single maze cell, as authored in the layout text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Empty,
    Wall,
    Pellet,
    PowerPellet,
    GhostDoor,
}

impl Cell {
    pub fn from_layout_char(ch: char) -> Option<Cell> {
        match ch {
            '0' => Some(Cell::Empty),
            '1' => Some(Cell::Wall),
            '2' => Some(Cell::Pellet),
            '3' => Some(Cell::PowerPellet),
            '4' => Some(Cell::GhostDoor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Unwrapped neighbour; callers that need tunnel wrap go through `Grid::neighbor`.
    pub fn offset(self, dir: Direction) -> TilePos {
        let (dx, dy) = dir.delta();
        TilePos {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Pixel coordinate. Signed because tunnel transitions run past the maze edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pixel {
    pub x: i32,
    pub y: i32,
}

impl Pixel {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(self, other: Pixel) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Enumeration order used everywhere a choice is made; ties go to the earliest.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::None => (0, 0),
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::None => Direction::None,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn is_none(self) -> bool {
        self == Direction::None
    }
}
