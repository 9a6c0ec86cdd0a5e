//! Map loading, validation and the bounded look window.
//!
//! A map file looks like:
//!
//! ```text
//! name Small Dungeon
//! win 2
//! #######
//! #..G..#
//! #.E...#
//! #######
//! ```
//!
//! The grid is fixed once loaded. The only mutation is a Gold tile turning
//! into Floor when it is picked up.

use log::{info, warn};
use shared::{Position, Tile, DEFAULT_MAP};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum MapError {
    /// Neither the named map nor the default map could be found.
    NotFound(PathBuf),
    Io(PathBuf, io::Error),
    InvalidFormat { line: usize, reason: String },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::NotFound(path) => write!(f, "map file {} not found", path.display()),
            MapError::Io(path, e) => write!(f, "failed to read map {}: {}", path.display(), e),
            MapError::InvalidFormat { line, reason } => {
                write!(f, "invalid map format at line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Io(_, e) => Some(e),
            _ => None,
        }
    }
}

fn invalid(line: usize, reason: impl Into<String>) -> MapError {
    MapError::InvalidFormat {
        line,
        reason: reason.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapGrid {
    name: String,
    win_threshold: u32,
    tiles: Vec<Vec<Tile>>,
}

impl MapGrid {
    /// Parses a map definition. Any malformed line fails the whole load.
    pub fn load(text: &str) -> Result<MapGrid, MapError> {
        let mut lines = text.lines();

        let name_line = lines.next().ok_or_else(|| invalid(1, "missing name line"))?;
        let name = name_line
            .strip_prefix("name")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| invalid(1, "expected 'name <map name>'"))?
            .to_string();

        let win_line = lines.next().ok_or_else(|| invalid(2, "missing win line"))?;
        let win_threshold = win_line
            .strip_prefix("win ")
            .and_then(|value| value.trim().parse::<u32>().ok())
            .ok_or_else(|| invalid(2, "expected 'win <non-negative integer>'"))?;

        let mut tiles: Vec<Vec<Tile>> = Vec::new();
        let mut width = 0;

        for (index, raw) in lines.enumerate() {
            let line_no = index + 3;
            let row_text = raw.trim_end_matches('\r');

            if tiles.is_empty() {
                if !row_text.starts_with('#') {
                    return Err(invalid(line_no, "first grid row must start with a wall"));
                }
                width = row_text.chars().count();
            } else if row_text.chars().count() != width {
                return Err(invalid(
                    line_no,
                    format!("row length {} differs from width {}", row_text.chars().count(), width),
                ));
            }

            let row = row_text
                .chars()
                .map(|symbol| {
                    Tile::from_map_symbol(symbol)
                        .ok_or_else(|| invalid(line_no, format!("unknown tile symbol '{}'", symbol)))
                })
                .collect::<Result<Vec<Tile>, MapError>>()?;
            tiles.push(row);
        }

        if tiles.is_empty() {
            return Err(invalid(3, "map has no rows"));
        }

        Ok(MapGrid {
            name,
            win_threshold,
            tiles,
        })
    }

    /// Loads `name` from `maps_dir`, falling back to the default map when the
    /// name is empty or the file does not exist.
    pub fn load_named(maps_dir: &Path, name: Option<&str>) -> Result<MapGrid, MapError> {
        let requested = name.map(str::trim).filter(|name| !name.is_empty());

        if let Some(requested) = requested {
            let path = maps_dir.join(requested);
            if path.is_file() {
                return Self::load_file(&path);
            }
            warn!(
                "Map {} not found, the default map will be used",
                path.display()
            );
        }

        let default_path = maps_dir.join(DEFAULT_MAP);
        if !default_path.is_file() {
            return Err(MapError::NotFound(default_path));
        }
        Self::load_file(&default_path)
    }

    fn load_file(path: &Path) -> Result<MapGrid, MapError> {
        let text =
            std::fs::read_to_string(path).map_err(|e| MapError::Io(path.to_path_buf(), e))?;
        let map = Self::load(&text)?;
        info!(
            "Loaded map '{}' ({}x{}, {} gold to win) from {}",
            map.name,
            map.width(),
            map.height(),
            map.win_threshold,
            path.display()
        );
        Ok(map)
    }

    /// Display name from the `name` header line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gold a player must hold before an exit counts as a win.
    pub fn win_threshold(&self) -> u32 {
        self.win_threshold
    }

    /// Number of columns. Every row has this many tiles; `load` rejects
    /// ragged grids, so indexing the first row is always valid.
    pub fn width(&self) -> usize {
        self.tiles[0].len()
    }

    /// Number of grid rows, not counting the two header lines.
    pub fn height(&self) -> usize {
        self.tiles.len()
    }

    fn index(&self, row: i32, col: i32) -> Option<(usize, usize)> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        (row < self.height() && col < self.width()).then_some((row, col))
    }

    /// Tile at the given cell; the outside of the map is solid wall.
    pub fn tile_at(&self, row: i32, col: i32) -> Tile {
        match self.index(row, col) {
            Some((r, c)) => self.tiles[r][c],
            None => Tile::Wall,
        }
    }

    /// Replaces an in-bounds tile and returns the previous one.
    /// Out-of-bounds cells are left alone and `None` is returned.
    pub fn replace_tile(&mut self, row: i32, col: i32, tile: Tile) -> Option<Tile> {
        let (r, c) = self.index(row, col)?;
        Some(std::mem::replace(&mut self.tiles[r][c], tile))
    }

    /// Builds the `radius`x`radius` window centred on `center`.
    ///
    /// Cells holding any of `occupied` show as `PlayerOverlay`, and the four
    /// corners are always `OutOfBounds` whatever the terrain underneath.
    pub fn compute_view(
        &self,
        center: Position,
        radius: usize,
        occupied: &[Position],
    ) -> Vec<Vec<Tile>> {
        if radius == 0 {
            return Vec::new();
        }

        let half = (radius / 2) as i32;
        let mut view = Vec::with_capacity(radius);

        for i in 0..radius as i32 {
            let mut row = Vec::with_capacity(radius);
            for j in 0..radius as i32 {
                let cell = Position::new(center.row + i - half, center.col + j - half);
                let tile = if occupied.contains(&cell) {
                    Tile::PlayerOverlay
                } else {
                    self.tile_at(cell.row, cell.col)
                };
                row.push(tile);
            }
            view.push(row);
        }

        let last = radius - 1;
        view[0][0] = Tile::OutOfBounds;
        view[0][last] = Tile::OutOfBounds;
        view[last][0] = Tile::OutOfBounds;
        view[last][last] = Tile::OutOfBounds;
        view
    }

    /// All in-bounds cells in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (Position, Tile)> + '_ {
        self.tiles.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .map(move |(c, tile)| (Position::new(r as i32, c as i32), *tile))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "name Small\nwin 2\n#####\n#.G.#\n#.E.#\n#####\n";

    fn small() -> MapGrid {
        MapGrid::load(SMALL).unwrap()
    }

    #[test]
    fn test_load_valid_map() {
        let map = small();
        assert_eq!(map.name(), "Small");
        assert_eq!(map.win_threshold(), 2);
        assert_eq!(map.width(), 5);
        assert_eq!(map.height(), 4);
        assert_eq!(map.tile_at(1, 2), Tile::Gold);
        assert_eq!(map.tile_at(2, 2), Tile::Exit);
        assert_eq!(map.tile_at(1, 1), Tile::Floor);
    }

    #[test]
    fn test_name_is_trimmed() {
        let map = MapGrid::load("name    Deep Halls   \nwin 0\n###\n").unwrap();
        assert_eq!(map.name(), "Deep Halls");
    }

    #[test]
    fn test_load_accepts_crlf() {
        let map = MapGrid::load("name Crlf\r\nwin 1\r\n###\r\n#.#\r\n###\r\n").unwrap();
        assert_eq!(map.width(), 3);
        assert_eq!(map.win_threshold(), 1);
    }

    #[test]
    fn test_load_rejects_empty_name() {
        let err = MapGrid::load("name   \nwin 1\n###\n").unwrap_err();
        assert!(matches!(err, MapError::InvalidFormat { line: 1, .. }));
    }

    #[test]
    fn test_load_rejects_missing_name_line() {
        let err = MapGrid::load("win 1\n###\n").unwrap_err();
        assert!(matches!(err, MapError::InvalidFormat { line: 1, .. }));
    }

    #[test]
    fn test_load_rejects_bad_win() {
        for text in [
            "name A\nwin -1\n###\n",
            "name A\nwin lots\n###\n",
            "name A\nwinner 3\n###\n",
            "name A\n###\n",
        ] {
            let err = MapGrid::load(text).unwrap_err();
            assert!(
                matches!(err, MapError::InvalidFormat { line: 2, .. }),
                "expected win line failure for {:?}",
                text
            );
        }
    }

    #[test]
    fn test_load_rejects_ragged_rows() {
        let err = MapGrid::load("name A\nwin 0\n####\n#..#\n###\n").unwrap_err();
        assert!(matches!(err, MapError::InvalidFormat { line: 5, .. }));
    }

    #[test]
    fn test_load_rejects_unknown_symbols() {
        let err = MapGrid::load("name A\nwin 0\n###\n#P#\n###\n").unwrap_err();
        assert!(matches!(err, MapError::InvalidFormat { line: 4, .. }));
    }

    #[test]
    fn test_load_rejects_missing_grid() {
        assert!(MapGrid::load("name A\nwin 0\n").is_err());
        assert!(MapGrid::load("name A\nwin 0\n.##\n").is_err());
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let map = small();
        assert_eq!(map.tile_at(-1, 0), Tile::Wall);
        assert_eq!(map.tile_at(0, -1), Tile::Wall);
        assert_eq!(map.tile_at(4, 0), Tile::Wall);
        assert_eq!(map.tile_at(0, 5), Tile::Wall);
        assert_eq!(map.tile_at(100, 100), Tile::Wall);
    }

    #[test]
    fn test_replace_tile() {
        let mut map = small();
        assert_eq!(map.replace_tile(1, 2, Tile::Floor), Some(Tile::Gold));
        assert_eq!(map.tile_at(1, 2), Tile::Floor);
        assert_eq!(map.replace_tile(-1, 2, Tile::Floor), None);
    }

    #[test]
    fn test_view_corners_are_sentinels() {
        let map = small();
        let view = map.compute_view(Position::new(1, 1), 5, &[]);
        assert_eq!(view.len(), 5);
        assert!(view.iter().all(|row| row.len() == 5));
        assert_eq!(view[0][0], Tile::OutOfBounds);
        assert_eq!(view[0][4], Tile::OutOfBounds);
        assert_eq!(view[4][0], Tile::OutOfBounds);
        assert_eq!(view[4][4], Tile::OutOfBounds);
    }

    #[test]
    fn test_view_contents() {
        let map = small();
        let view = map.compute_view(Position::new(1, 2), 5, &[Position::new(1, 2)]);
        let rows: Vec<String> = view
            .iter()
            .map(|row| row.iter().map(|t| t.symbol()).collect())
            .collect();
        assert_eq!(rows, vec!["X###X", "#####", "#.P.#", "#.E.#", "X###X"]);
    }

    #[test]
    fn test_view_overlays_other_players() {
        let map = small();
        let view = map.compute_view(
            Position::new(1, 1),
            5,
            &[Position::new(1, 1), Position::new(2, 3)],
        );
        assert_eq!(view[2][2], Tile::PlayerOverlay);
        assert_eq!(view[3][4], Tile::PlayerOverlay);
    }

    #[test]
    fn test_view_corner_wins_over_player() {
        let map = small();
        let view = map.compute_view(Position::new(1, 1), 3, &[Position::new(0, 0)]);
        assert_eq!(view[0][0], Tile::OutOfBounds);
    }

    #[test]
    fn test_view_degenerate_radii() {
        let map = small();
        assert!(map.compute_view(Position::new(1, 1), 0, &[]).is_empty());
        assert_eq!(
            map.compute_view(Position::new(1, 1), 1, &[]),
            vec![vec![Tile::OutOfBounds]]
        );
    }

    #[test]
    fn test_positions_cover_grid() {
        let map = small();
        assert_eq!(map.positions().count(), map.width() * map.height());
        let gold: Vec<Position> = map
            .positions()
            .filter(|(_, tile)| *tile == Tile::Gold)
            .map(|(pos, _)| pos)
            .collect();
        assert_eq!(gold, vec![Position::new(1, 2)]);
    }

    #[test]
    fn test_load_named_falls_back_to_default() {
        let dir = std::env::temp_dir().join(format!("dungeon-maps-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(DEFAULT_MAP), SMALL).unwrap();
        std::fs::write(dir.join("broken.txt"), "name Broken\nwin 0\n###\n##\n").unwrap();

        let map = MapGrid::load_named(&dir, Some("missing.txt")).unwrap();
        assert_eq!(map.name(), "Small");

        let map = MapGrid::load_named(&dir, None).unwrap();
        assert_eq!(map.name(), "Small");

        let err = MapGrid::load_named(&dir, Some("broken.txt")).unwrap_err();
        assert!(matches!(err, MapError::InvalidFormat { .. }));

        std::fs::remove_file(dir.join(DEFAULT_MAP)).unwrap();
        let err = MapGrid::load_named(&dir, Some("missing.txt")).unwrap_err();
        assert!(matches!(err, MapError::NotFound(_)));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
