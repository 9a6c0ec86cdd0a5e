//! Vocabulary shared by the dungeon server and its clients: grid coordinates,
//! movement directions, tile symbols and the text protocol.

use std::fmt;
use std::str::FromStr;

pub mod protocol;

/// Side length of the square window returned by `LOOK`.
pub const LOOK_RADIUS: usize = 5;
/// Default cap on concurrently connected players.
pub const MAX_PLAYERS: usize = 10;
/// Random tiles tried before a spawn gives up.
pub const MAX_SPAWN_ATTEMPTS: u32 = 100_000;
/// Map loaded when no custom map is named or the named one is missing.
pub const DEFAULT_MAP: &str = "example_map.txt";

/// A cell on the map grid. Rows grow downwards, columns grow to the right.
///
/// Coordinates are signed so that neighbours of edge cells can be expressed;
/// anything outside the grid reads as a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns the neighbouring cell one step in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dr, dc) = direction.offset();
        Self {
            row: self.row + dr,
            col: self.col + dc,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit `(row, col)` offset for this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (-1, 0),
            Direction::East => (0, 1),
            Direction::South => (1, 0),
            Direction::West => (0, -1),
        }
    }

    pub fn letter(self) -> char {
        match self {
            Direction::North => 'N',
            Direction::East => 'E',
            Direction::South => 'S',
            Direction::West => 'W',
        }
    }
}

/// Error returned when a direction token is not one of N, E, S or W.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDirectionError(pub String);

impl fmt::Display for ParseDirectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid direction '{}'", self.0)
    }
}

impl std::error::Error for ParseDirectionError {}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "N" => Ok(Direction::North),
            "E" => Ok(Direction::East),
            "S" => Ok(Direction::South),
            "W" => Ok(Direction::West),
            _ => Err(ParseDirectionError(s.to_string())),
        }
    }
}

/// What occupies a single map cell.
///
/// `PlayerOverlay` and `OutOfBounds` never appear in a loaded map; they only
/// show up in computed look windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tile {
    Wall,
    Floor,
    Gold,
    Exit,
    PlayerOverlay,
    OutOfBounds,
}

impl Tile {
    pub fn symbol(self) -> char {
        match self {
            Tile::Wall => '#',
            Tile::Floor => '.',
            Tile::Gold => 'G',
            Tile::Exit => 'E',
            Tile::PlayerOverlay => 'P',
            Tile::OutOfBounds => 'X',
        }
    }

    /// Parses a symbol as it may appear in a map file.
    pub fn from_map_symbol(symbol: char) -> Option<Tile> {
        match symbol {
            '#' => Some(Tile::Wall),
            '.' => Some(Tile::Floor),
            'G' => Some(Tile::Gold),
            'E' => Some(Tile::Exit),
            _ => None,
        }
    }

    /// Parses any symbol that can appear in a look window.
    pub fn from_symbol(symbol: char) -> Option<Tile> {
        match symbol {
            'P' => Some(Tile::PlayerOverlay),
            'X' => Some(Tile::OutOfBounds),
            other => Tile::from_map_symbol(other),
        }
    }

    pub fn is_walkable(self) -> bool {
        !matches!(self, Tile::Wall | Tile::OutOfBounds)
    }
}
