//! Authoritative game state: player positions, gold and the live map.
//!
//! [`GameState`] holds the data and the rules and is driven through
//! `&mut self`. [`SharedGame`] is the handle sessions use: it puts the whole
//! state behind one mutex so a read-then-write (occupancy check then move,
//! gold check then tile replacement) can never interleave with another
//! session, and it hands the resulting events to the sink once the lock is
//! released.

use crate::events::{EventKind, EventSink, GameEvent};
use crate::map::MapGrid;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared::protocol::{Command, Response};
use shared::{Direction, Position, Tile, LOOK_RADIUS, MAX_SPAWN_ATTEMPTS};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// No free non-wall tile was found within the attempt bound.
    NoSpawnAvailable { attempts: u32 },
    /// The slot already has a player on the map.
    SlotInUse(u32),
    /// The slot has no player on the map (never spawned, or erased).
    NotSpawned(u32),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::NoSpawnAvailable { attempts } => {
                write!(f, "no free spawn tile found after {} attempts", attempts)
            }
            GameError::SlotInUse(slot) => write!(f, "slot {} is already playing", slot),
            GameError::NotSpawned(slot) => write!(f, "slot {} has no player on the map", slot),
        }
    }
}

impl std::error::Error for GameError {}

/// A player currently on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSlot {
    pub position: Position,
    pub gold: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved { from: Position, to: Position },
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickupOutcome {
    Collected { total: u32 },
    Nothing,
}

pub struct GameState {
    map: MapGrid,
    /// Present players only; an erased slot is dropped, so the map never
    /// holds more entries than there are live sessions.
    players: BTreeMap<u32, PlayerSlot>,
    rng: StdRng,
    spawn_attempts: u32,
    next_seq: u64,
    pending_events: Vec<GameEvent>,
}

impl GameState {
    /// Creates a state with an entropy-seeded spawn generator.
    pub fn new(map: MapGrid) -> Self {
        Self::with_rng(map, StdRng::from_entropy())
    }

    /// Creates a state whose spawn positions are reproducible.
    pub fn with_seed(map: MapGrid, seed: u64) -> Self {
        Self::with_rng(map, StdRng::seed_from_u64(seed))
    }

    fn with_rng(map: MapGrid, rng: StdRng) -> Self {
        Self {
            map,
            players: BTreeMap::new(),
            rng,
            spawn_attempts: MAX_SPAWN_ATTEMPTS,
            next_seq: 0,
            pending_events: Vec::new(),
        }
    }

    /// Caps how many random tiles `spawn` tries before giving up.
    pub fn set_spawn_attempts(&mut self, attempts: u32) {
        self.spawn_attempts = attempts;
    }

    /// The live map, with collected gold already turned into floor.
    pub fn map(&self) -> &MapGrid {
        &self.map
    }

    /// The slot's player, or `None` if it is not on the map.
    pub fn player(&self, slot: u32) -> Option<&PlayerSlot> {
        self.players.get(&slot)
    }

    fn position_of(&self, slot: u32) -> Result<Position, GameError> {
        self.players
            .get(&slot)
            .map(|player| player.position)
            .ok_or(GameError::NotSpawned(slot))
    }

    fn record(&mut self, kind: EventKind) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending_events.push(GameEvent { seq, kind });
    }

    /// Puts a player straight onto `pos`, bypassing the random spawn.
    #[cfg(test)]
    pub(crate) fn place(&mut self, slot: u32, pos: Position) {
        self.players.insert(
            slot,
            PlayerSlot {
                position: pos,
                gold: 0,
            },
        );
    }

    /// Drains the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Positions of every player currently on the map.
    pub fn occupancy(&self) -> Vec<Position> {
        self.players.values().map(|player| player.position).collect()
    }

    fn is_occupied(&self, pos: Position) -> bool {
        self.players.values().any(|player| player.position == pos)
    }

    /// Places the slot's player on a random free, non-wall tile.
    pub fn spawn(&mut self, slot: u32) -> Result<Position, GameError> {
        if self.players.contains_key(&slot) {
            return Err(GameError::SlotInUse(slot));
        }

        let height = self.map.height() as i32;
        let width = self.map.width() as i32;
        let occupied = self.occupancy();

        for _ in 0..self.spawn_attempts {
            let candidate = Position::new(
                self.rng.gen_range(0..height),
                self.rng.gen_range(0..width),
            );
            if !self.map.tile_at(candidate.row, candidate.col).is_walkable()
                || occupied.contains(&candidate)
            {
                continue;
            }

            self.players.insert(
                slot,
                PlayerSlot {
                    position: candidate,
                    gold: 0,
                },
            );
            self.record(EventKind::Spawned {
                slot,
                pos: candidate,
            });
            info!("Player {} spawned at {}", slot, candidate);
            return Ok(candidate);
        }

        Err(GameError::NoSpawnAvailable {
            attempts: self.spawn_attempts,
        })
    }

    /// Moves one step; walls and other players block the move.
    pub fn move_player(&mut self, slot: u32, direction: Direction) -> Result<MoveOutcome, GameError> {
        let from = self.position_of(slot)?;
        let to = from.step(direction);

        if !self.map.tile_at(to.row, to.col).is_walkable() || self.is_occupied(to) {
            debug!("Player {} blocked moving {:?} from {}", slot, direction, from);
            return Ok(MoveOutcome::Blocked);
        }

        if let Some(player) = self.players.get_mut(&slot) {
            player.position = to;
        }
        self.record(EventKind::Moved { slot, from, to });
        Ok(MoveOutcome::Moved { from, to })
    }

    /// Collects the gold under the player, turning the tile into floor.
    pub fn pickup(&mut self, slot: u32) -> Result<PickupOutcome, GameError> {
        let pos = self.position_of(slot)?;
        if self.map.tile_at(pos.row, pos.col) != Tile::Gold {
            return Ok(PickupOutcome::Nothing);
        }

        self.map.replace_tile(pos.row, pos.col, Tile::Floor);
        let total = match self.players.get_mut(&slot) {
            Some(player) => {
                player.gold += 1;
                player.gold
            }
            None => return Err(GameError::NotSpawned(slot)),
        };
        let remaining = self.remaining_gold(slot);
        self.record(EventKind::GoldCollected {
            slot,
            pos,
            total,
            remaining,
        });
        Ok(PickupOutcome::Collected { total })
    }

    /// Gold still needed to win, never below zero.
    pub fn remaining_gold(&self, slot: u32) -> u32 {
        let gold = self.players.get(&slot).map_or(0, |player| player.gold);
        self.map.win_threshold().saturating_sub(gold)
    }

    /// Answers `HELLO`: the remaining gold, also reported to observers.
    pub fn hello(&mut self, slot: u32) -> u32 {
        let remaining = self.remaining_gold(slot);
        self.record(EventKind::GoldNeeded { slot, remaining });
        remaining
    }

    /// True when the player has enough gold and stands on an exit.
    pub fn has_won(&self, slot: u32) -> bool {
        match self.players.get(&slot) {
            Some(player) => {
                player.gold >= self.map.win_threshold()
                    && self.map.tile_at(player.position.row, player.position.col) == Tile::Exit
            }
            None => false,
        }
    }

    /// The look window around the player.
    pub fn look(&self, slot: u32) -> Result<Vec<Vec<Tile>>, GameError> {
        let center = self.position_of(slot)?;
        Ok(self.map.compute_view(center, LOOK_RADIUS, &self.occupancy()))
    }

    /// Takes the player off the map; their gold goes with them. Repeated
    /// calls do nothing.
    pub fn erase(&mut self, slot: u32) {
        if let Some(player) = self.players.remove(&slot) {
            self.record(EventKind::Erased {
                slot,
                pos: player.position,
            });
            info!("Player {} removed from {}", slot, player.position);
        }
    }

    /// Applies one request and builds the reply the client will see.
    pub fn respond(&mut self, slot: u32, command: Command) -> Response {
        match command {
            Command::Hello => Response::GoldNeeded(self.hello(slot)),
            Command::Move(direction) => match self.move_player(slot, direction) {
                Ok(MoveOutcome::Moved { .. }) => Response::Success,
                Ok(MoveOutcome::Blocked) => Response::Fail,
                Err(e) => {
                    warn!("Player {} move failed: {}", slot, e);
                    Response::Fail
                }
            },
            Command::Pickup => match self.pickup(slot) {
                Ok(PickupOutcome::Collected { total }) => Response::PickedUp(total),
                Ok(PickupOutcome::Nothing) => Response::NothingToPickUp,
                Err(e) => {
                    warn!("Player {} pickup failed: {}", slot, e);
                    Response::Fail
                }
            },
            Command::Look => match self.look(slot) {
                Ok(view) => Response::View(view),
                Err(e) => {
                    warn!("Player {} look failed: {}", slot, e);
                    Response::Fail
                }
            },
        }
    }
}

/// Cloneable, task-safe handle to the single [`GameState`].
#[derive(Clone)]
pub struct SharedGame {
    state: Arc<Mutex<GameState>>,
    sink: Arc<dyn EventSink>,
}

impl SharedGame {
    /// Wraps `state` for sharing between sessions. Every event the state
    /// records is passed to `sink` after the lock that produced it is gone.
    pub fn new(state: GameState, sink: Arc<dyn EventSink>) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            sink,
        }
    }

    /// Runs `op` inside the critical section, then emits its events outside it.
    ///
    /// Anything `op` reads and writes is seen by other sessions as one step,
    /// so compound checks such as "apply the command, then test the win
    /// condition" belong in a single call.
    async fn with_state<T>(&self, op: impl FnOnce(&mut GameState) -> T) -> T {
        let (result, events) = {
            let mut state = self.state.lock().await;
            let result = op(&mut state);
            (result, state.take_events())
        };
        for event in events {
            self.sink.emit(event);
        }
        result
    }

    /// Places the slot's player on the map. See [`GameState::spawn`].
    pub async fn spawn(&self, slot: u32) -> Result<Position, GameError> {
        self.with_state(|state| state.spawn(slot)).await
    }

    /// Applies `command` for `slot` and reports whether the player now
    /// meets the win condition, both under the same lock.
    pub async fn execute(&self, slot: u32, command: Command) -> (Response, bool) {
        self.with_state(|state| {
            let response = state.respond(slot, command);
            (response, state.has_won(slot))
        })
        .await
    }

    /// Takes the slot's player off the map. See [`GameState::erase`].
    pub async fn erase(&self, slot: u32) {
        self.with_state(|state| state.erase(slot)).await
    }

    #[cfg(test)]
    pub(crate) async fn occupancy(&self) -> Vec<Position> {
        self.with_state(|state| state.occupancy()).await
    }

    #[cfg(test)]
    pub(crate) async fn player(&self, slot: u32) -> Option<PlayerSlot> {
        self.with_state(|state| state.player(slot).copied()).await
    }

    #[cfg(test)]
    pub(crate) async fn map(&self) -> MapGrid {
        self.with_state(|state| state.map().clone()).await
    }
}
