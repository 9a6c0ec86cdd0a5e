//! Text rendering of the whole world, driven purely by game events.

use crate::events::{EventKind, GameEvent};
use crate::map::MapGrid;
use shared::{Position, Tile};
use std::collections::{BTreeMap, HashMap};

/// Observer-side copy of the world.
///
/// Events may arrive out of order because they are emitted after the game
/// lock is released; anything ahead of the next expected sequence number is
/// held back until the gap is filled.
#[derive(Debug)]
pub struct WorldView {
    tiles: Vec<Vec<Tile>>,
    players: HashMap<u32, Position>,
    gold_needed: HashMap<u32, u32>,
    next_seq: u64,
    held: BTreeMap<u64, EventKind>,
}

impl WorldView {
    pub fn new(map: &MapGrid) -> Self {
        let mut tiles = vec![vec![Tile::Wall; map.width()]; map.height()];
        for (pos, tile) in map.positions() {
            tiles[pos.row as usize][pos.col as usize] = tile;
        }
        Self {
            tiles,
            players: HashMap::new(),
            gold_needed: HashMap::new(),
            next_seq: 0,
            held: BTreeMap::new(),
        }
    }

    /// Applies `event` and any held events that now follow it.
    /// Returns how many events were applied.
    pub fn apply(&mut self, event: GameEvent) -> usize {
        if event.seq < self.next_seq {
            return 0;
        }
        self.held.insert(event.seq, event.kind);

        let mut applied = 0;
        while let Some(kind) = self.held.remove(&self.next_seq) {
            self.apply_kind(kind);
            self.next_seq += 1;
            applied += 1;
        }
        applied
    }

    fn apply_kind(&mut self, kind: EventKind) {
        match kind {
            EventKind::Spawned { slot, pos } => {
                self.players.insert(slot, pos);
            }
            EventKind::Moved { slot, to, .. } => {
                self.players.insert(slot, to);
            }
            EventKind::Erased { slot, .. } => {
                self.players.remove(&slot);
                self.gold_needed.remove(&slot);
            }
            EventKind::GoldCollected {
                slot,
                pos,
                remaining,
                ..
            } => {
                if let Some(tile) = self
                    .tiles
                    .get_mut(pos.row as usize)
                    .and_then(|row| row.get_mut(pos.col as usize))
                {
                    *tile = Tile::Floor;
                }
                self.gold_needed.insert(slot, remaining);
            }
            EventKind::GoldNeeded { slot, remaining } => {
                self.gold_needed.insert(slot, remaining);
            }
        }
    }

    /// Where the slot's player stands as far as the applied events say.
    /// `None` before the spawn has been seen and after the erase.
    pub fn player_position(&self, slot: u32) -> Option<Position> {
        self.players.get(&slot).copied()
    }

    /// Last reported gold still needed by the slot, if any was reported.
    pub fn gold_needed(&self, slot: u32) -> Option<u32> {
        self.gold_needed.get(&slot).copied()
    }

    /// Number of events waiting for an earlier one.
    pub fn held_back(&self) -> usize {
        self.held.len()
    }

    /// The full map with players drawn on top.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (r, row) in self.tiles.iter().enumerate() {
            for (c, tile) in row.iter().enumerate() {
                let here = Position::new(r as i32, c as i32);
                if self.players.values().any(|pos| *pos == here) {
                    out.push(Tile::PlayerOverlay.symbol());
                } else {
                    out.push(tile.symbol());
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> MapGrid {
        MapGrid::load("name View\nwin 1\n#####\n#.G.#\n#####\n").unwrap()
    }

    fn event(seq: u64, kind: EventKind) -> GameEvent {
        GameEvent { seq, kind }
    }

    #[test]
    fn test_render_base_map() {
        let view = WorldView::new(&map());
        assert_eq!(view.render(), "#####\n#.G.#\n#####\n");
    }

    #[test]
    fn test_players_drawn_and_moved() {
        let mut view = WorldView::new(&map());
        view.apply(event(
            0,
            EventKind::Spawned {
                slot: 0,
                pos: Position::new(1, 1),
            },
        ));
        assert_eq!(view.render(), "#####\n#PG.#\n#####\n");

        view.apply(event(
            1,
            EventKind::Moved {
                slot: 0,
                from: Position::new(1, 1),
                to: Position::new(1, 2),
            },
        ));
        assert_eq!(view.render(), "#####\n#.P.#\n#####\n");
    }

    #[test]
    fn test_collected_gold_becomes_floor() {
        let mut view = WorldView::new(&map());
        view.apply(event(
            0,
            EventKind::Spawned {
                slot: 0,
                pos: Position::new(1, 2),
            },
        ));
        view.apply(event(
            1,
            EventKind::GoldCollected {
                slot: 0,
                pos: Position::new(1, 2),
                total: 1,
                remaining: 0,
            },
        ));
        view.apply(event(
            2,
            EventKind::Erased {
                slot: 0,
                pos: Position::new(1, 2),
            },
        ));
        assert_eq!(view.render(), "#####\n#...#\n#####\n");
        assert_eq!(view.player_position(0), None);
    }

    #[test]
    fn test_out_of_order_events_are_held() {
        let mut view = WorldView::new(&map());
        let moved = event(
            1,
            EventKind::Moved {
                slot: 0,
                from: Position::new(1, 1),
                to: Position::new(1, 3),
            },
        );
        assert_eq!(view.apply(moved), 0);
        assert_eq!(view.held_back(), 1);
        assert_eq!(view.player_position(0), None);

        let spawned = event(
            0,
            EventKind::Spawned {
                slot: 0,
                pos: Position::new(1, 1),
            },
        );
        assert_eq!(view.apply(spawned), 2);
        assert_eq!(view.held_back(), 0);
        assert_eq!(view.player_position(0), Some(Position::new(1, 3)));
    }

    #[test]
    fn test_stale_events_ignored() {
        let mut view = WorldView::new(&map());
        let spawned = event(
            0,
            EventKind::Spawned {
                slot: 0,
                pos: Position::new(1, 1),
            },
        );
        assert_eq!(view.apply(spawned), 1);
        assert_eq!(view.apply(spawned), 0);
    }

    #[test]
    fn test_gold_needed_tracked() {
        let mut view = WorldView::new(&map());
        view.apply(event(0, EventKind::GoldNeeded { slot: 3, remaining: 1 }));
        assert_eq!(view.gold_needed(3), Some(1));
    }
}
