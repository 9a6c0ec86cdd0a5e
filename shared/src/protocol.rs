//! Line-oriented text protocol spoken between clients and the server.
//!
//! Requests are single lines with a case-insensitive keyword:
//! `HELLO`, `MOVE <N|E|S|W>`, `PICKUP`, `LOOK`. Responses are one or more
//! newline-terminated lines, see [`Response`].

use crate::{Direction, Tile};
use std::fmt;

pub const SUCCESS: &str = "SUCCESS";
pub const FAIL: &str = "FAIL";
pub const WINNER: &str = "WINNER";
pub const NOTHING_TO_PICK_UP: &str = "There is nothing to pick up...";
const GOLD_PREFIX: &str = "GOLD: ";
const PICKUP_PREFIX: &str = "SUCCESS, GOLD COINS: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Hello,
    Move(Direction),
    Pickup,
    Look,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    Empty,
    UnknownCommand(String),
    /// `MOVE` with a missing, extra or unrecognised argument.
    BadArguments(String),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Empty => write!(f, "empty command"),
            ProtocolError::UnknownCommand(word) => write!(f, "unknown command '{}'", word),
            ProtocolError::BadArguments(line) => write!(f, "bad arguments in '{}'", line),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl Command {
    /// Parses one request line. Tokens are separated by any whitespace;
    /// trailing tokens after `HELLO`, `PICKUP` and `LOOK` are ignored.
    pub fn parse(line: &str) -> Result<Command, ProtocolError> {
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().ok_or(ProtocolError::Empty)?;

        match keyword.to_ascii_uppercase().as_str() {
            "HELLO" => Ok(Command::Hello),
            "PICKUP" => Ok(Command::Pickup),
            "LOOK" => Ok(Command::Look),
            "MOVE" => {
                let direction = tokens
                    .next()
                    .and_then(|token| token.parse::<Direction>().ok())
                    .ok_or_else(|| ProtocolError::BadArguments(line.trim().to_string()))?;
                if tokens.next().is_some() {
                    return Err(ProtocolError::BadArguments(line.trim().to_string()));
                }
                Ok(Command::Move(direction))
            }
            _ => Err(ProtocolError::UnknownCommand(keyword.to_string())),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Hello => write!(f, "HELLO"),
            Command::Move(direction) => write!(f, "MOVE {}", direction.letter()),
            Command::Pickup => write!(f, "PICKUP"),
            Command::Look => write!(f, "LOOK"),
        }
    }
}

/// A server reply, rendered to wire lines by [`Response::lines`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    GoldNeeded(u32),
    Success,
    Fail,
    PickedUp(u32),
    NothingToPickUp,
    View(Vec<Vec<Tile>>),
    Winner,
}

impl Response {
    pub fn lines(&self) -> Vec<String> {
        match self {
            Response::GoldNeeded(remaining) => vec![format!("{}{}", GOLD_PREFIX, remaining)],
            Response::Success => vec![SUCCESS.to_string()],
            Response::Fail => vec![FAIL.to_string()],
            Response::PickedUp(total) => vec![format!("{}{}", PICKUP_PREFIX, total)],
            Response::NothingToPickUp => vec![FAIL.to_string(), NOTHING_TO_PICK_UP.to_string()],
            Response::View(rows) => rows
                .iter()
                .map(|row| row.iter().map(|tile| tile.symbol()).collect())
                .collect(),
            Response::Winner => vec![WINNER.to_string()],
        }
    }

    /// The full wire text, every line newline-terminated.
    pub fn to_wire(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }
}

/// Extracts the remaining gold from a `GOLD: <n>` line.
pub fn parse_gold_needed(line: &str) -> Option<u32> {
    line.trim().strip_prefix(GOLD_PREFIX)?.trim().parse().ok()
}

/// Extracts the gold total from a `SUCCESS, GOLD COINS: <n>` line.
pub fn parse_picked_up(line: &str) -> Option<u32> {
    line.trim().strip_prefix(PICKUP_PREFIX)?.trim().parse().ok()
}
