//! Typed TCP client for the dungeon protocol.

use log::debug;
use shared::protocol::{parse_gold_needed, parse_picked_up, Command, FAIL, SUCCESS};
use shared::{Direction, LOOK_RADIUS};
use std::fmt;
use std::io;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

#[derive(Debug)]
pub enum ClientError {
    Io(io::Error),
    /// The server closed the connection.
    Closed,
    /// A reply that does not fit the command that was sent.
    Unexpected(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Io(e) => write!(f, "connection error: {}", e),
            ClientError::Closed => write!(f, "server closed the connection"),
            ClientError::Unexpected(line) => write!(f, "unexpected reply '{}'", line),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ClientError {
    fn from(e: io::Error) -> Self {
        ClientError::Io(e)
    }
}

pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    /// Part of a line read before a cancelled `read_line`.
    pending: String,
}

impl Connection {
    pub async fn connect(addr: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        debug!("Connected to {}", addr);
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            pending: String::new(),
        })
    }

    /// Sends one raw line; the newline is added here.
    pub async fn send_line(&mut self, line: &str) -> io::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await
    }

    pub async fn send(&mut self, command: Command) -> io::Result<()> {
        self.send_line(&command.to_string()).await
    }

    /// Next line from the server without its terminator, `None` at end of stream.
    ///
    /// Safe to use as a `tokio::select!` branch: a partially received line is
    /// kept and completed by the next call.
    pub async fn read_line(&mut self) -> io::Result<Option<String>> {
        let read = self.reader.read_line(&mut self.pending).await?;
        if read == 0 && self.pending.is_empty() {
            return Ok(None);
        }
        let line = std::mem::take(&mut self.pending);
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    async fn expect_line(&mut self) -> Result<String, ClientError> {
        self.read_line().await?.ok_or(ClientError::Closed)
    }

    /// Gold still needed to win.
    pub async fn hello(&mut self) -> Result<u32, ClientError> {
        self.send(Command::Hello).await?;
        let line = self.expect_line().await?;
        parse_gold_needed(&line).ok_or(ClientError::Unexpected(line))
    }

    /// Returns whether the move was allowed.
    pub async fn move_player(&mut self, direction: Direction) -> Result<bool, ClientError> {
        self.send(Command::Move(direction)).await?;
        let line = self.expect_line().await?;
        match line.as_str() {
            SUCCESS => Ok(true),
            FAIL => Ok(false),
            _ => Err(ClientError::Unexpected(line)),
        }
    }

    /// Returns the new gold total, or `None` if there was nothing to pick up.
    pub async fn pickup(&mut self) -> Result<Option<u32>, ClientError> {
        self.send(Command::Pickup).await?;
        let line = self.expect_line().await?;
        if let Some(total) = parse_picked_up(&line) {
            return Ok(Some(total));
        }
        if line != FAIL {
            return Err(ClientError::Unexpected(line));
        }
        // Explanation line that follows a failed pickup.
        self.expect_line().await?;
        Ok(None)
    }

    /// The look window as text rows.
    pub async fn look(&mut self) -> Result<Vec<String>, ClientError> {
        self.send(Command::Look).await?;
        let mut rows = Vec::with_capacity(LOOK_RADIUS);
        for _ in 0..LOOK_RADIUS {
            let row = self.expect_line().await?;
            if row.chars().count() != LOOK_RADIUS {
                return Err(ClientError::Unexpected(row));
            }
            rows.push(row);
        }
        Ok(rows)
    }

    pub async fn close(mut self) -> io::Result<()> {
        self.writer.shutdown().await
    }
}
