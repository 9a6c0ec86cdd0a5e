//! # Dungeon Client Library
//!
//! Client side of the dungeon text protocol.
//!
//! ## Module Organization
//!
//! ### Network Module (`network`)
//! A typed connection: one method per protocol command, each reading exactly
//! the reply lines that command produces.
//!
//! ### Display Module (`display`)
//! Classifies unsolicited server lines for the interactive terminal client,
//! which relays whatever the user types and cannot know in advance how many
//! lines a reply has.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::network::Connection;
//! use shared::Direction;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = Connection::connect("127.0.0.1:8080").await?;
//!     println!("gold needed: {}", conn.hello().await?);
//!     conn.move_player(Direction::North).await?;
//!     for row in conn.look().await? {
//!         println!("{}", row);
//!     }
//!     Ok(())
//! }
//! ```

pub mod display;
pub mod network;
