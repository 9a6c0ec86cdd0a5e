//! Notifications from the game core to passive observers such as a world renderer.
//!
//! Events are produced inside the game's critical section, stamped with a
//! sequence number there, and handed to an [`EventSink`] only after the lock
//! is released. Sinks must not block.

use shared::Position;
use std::sync::Mutex;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Spawned {
        slot: u32,
        pos: Position,
    },
    Moved {
        slot: u32,
        from: Position,
        to: Position,
    },
    Erased {
        slot: u32,
        pos: Position,
    },
    /// A Gold tile at `pos` was collected and is now Floor.
    GoldCollected {
        slot: u32,
        pos: Position,
        total: u32,
        remaining: u32,
    },
    GoldNeeded {
        slot: u32,
        remaining: u32,
    },
}

impl EventKind {
    /// The player the event is about.
    pub fn slot(&self) -> u32 {
        match *self {
            EventKind::Spawned { slot, .. }
            | EventKind::Moved { slot, .. }
            | EventKind::Erased { slot, .. }
            | EventKind::GoldCollected { slot, .. }
            | EventKind::GoldNeeded { slot, .. } => slot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameEvent {
    /// Order in which the reported mutations happened, starting at 0.
    pub seq: u64,
    pub kind: EventKind,
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: GameEvent);
}

/// Discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: GameEvent) {}
}

impl EventSink for mpsc::UnboundedSender<GameEvent> {
    fn emit(&self, event: GameEvent) {
        // A closed receiver just means nobody is watching any more.
        let _ = self.send(event);
    }
}

/// Keeps every event in memory. Handy for tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<GameEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events sorted by sequence number.
    pub fn events(&self) -> Vec<GameEvent> {
        let mut events = match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        events.sort_by_key(|event| event.seq);
        events
    }

    /// Like [`RecordingSink::events`] without the sequence numbers.
    pub fn kinds(&self) -> Vec<EventKind> {
        self.events().into_iter().map(|event| event.kind).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: GameEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }
}
