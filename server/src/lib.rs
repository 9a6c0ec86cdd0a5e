//! # Dungeon Server Library
//!
//! Authoritative server for a multiplayer text dungeon. Players connect over
//! TCP, walk a shared grid map, pick up gold and try to reach an exit with
//! enough gold to win. Clients are untrusted: every move, pickup and win is
//! decided here.
//!
//! ## Module Organization
//!
//! ### Map Module (`map`)
//! Parses and validates map files, answers bounds-checked tile queries and
//! builds the bounded look window sent in reply to `LOOK`.
//!
//! ### Game Module (`game`)
//! The single shared game state. All mutation goes through one mutex so that
//! spawns, moves and pickups from different connections never interleave.
//!
//! ### Events and Render Modules (`events`, `render`)
//! Spawn, move, erase and gold notifications for passive observers, and a
//! text renderer of the whole world built only from those notifications.
//!
//! ### Session Module (`session`)
//! One task per connection running the line protocol.
//!
//! ### Network and Client Manager Modules (`network`, `client_manager`)
//! Accepts TCP connections, assigns slot numbers and enforces the player cap.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::events::NullSink;
//! use server::game::{GameState, SharedGame};
//! use server::map::MapGrid;
//! use server::network::Server;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let map = MapGrid::load_named(Path::new("maps"), None)?;
//!     let game = SharedGame::new(GameState::new(map), Arc::new(NullSink));
//!     let server = Server::bind("127.0.0.1:8080", game, 10).await?;
//!     server.run().await
//! }
//! ```

pub mod client_manager;
pub mod events;
pub mod game;
pub mod map;
pub mod network;
pub mod render;
pub mod session;
