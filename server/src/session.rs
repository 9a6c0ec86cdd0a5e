//! One player's connection: read a command line, apply it, write the reply.
//!
//! The only place a session waits is the line read. A win is noticed after
//! any command but is only announced after the next `LOOK`, at which point
//! the player is removed, `WINNER` is sent and the connection closes.

use crate::game::{GameError, SharedGame};
use log::{debug, info, warn};
use shared::protocol::{Command, Response};
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

/// Why a session finished.
#[derive(Debug)]
pub enum SessionEnd {
    /// The client closed its side of the stream.
    Disconnected,
    Won,
    /// The join was refused because no free tile was found.
    SpawnFailed(GameError),
    /// Reading from or writing to the client failed.
    Io(io::Error),
}

pub struct Session<R, W> {
    slot: u32,
    game: SharedGame,
    reader: R,
    writer: W,
    won: bool,
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(slot: u32, game: SharedGame, reader: R, writer: W) -> Self {
        Self {
            slot,
            game,
            reader,
            writer,
            won: false,
        }
    }

    /// Spawns the player, serves commands until the session ends, then
    /// takes the player off the map.
    pub async fn run(mut self) -> SessionEnd {
        if let Err(e) = self.game.spawn(self.slot).await {
            warn!("Player {} could not join: {}", self.slot, e);
            return SessionEnd::SpawnFailed(e);
        }

        let end = self.serve().await;
        self.game.erase(self.slot).await;
        end
    }

    async fn serve(&mut self) -> SessionEnd {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match self.reader.read_until(b'\n', &mut buf).await {
                Ok(0) => return SessionEnd::Disconnected,
                Ok(_) => {}
                Err(e) => return SessionEnd::Io(e),
            }

            // Undecodable bytes become U+FFFD and fail to parse like any other junk.
            let line = String::from_utf8_lossy(&buf);
            debug!("Player {} sent {:?}", self.slot, line.trim_end());

            let command = Command::parse(&line);
            let response = match &command {
                Ok(command) => {
                    let (response, won) = self.game.execute(self.slot, *command).await;
                    self.won |= won;
                    response
                }
                Err(e) => {
                    debug!("Player {} protocol error: {}", self.slot, e);
                    Response::Fail
                }
            };

            if let Err(e) = self.send(&response).await {
                return SessionEnd::Io(e);
            }

            if self.won && command == Ok(Command::Look) {
                self.game.erase(self.slot).await;
                info!("Player {} has won", self.slot);
                if let Err(e) = self.send(&Response::Winner).await {
                    return SessionEnd::Io(e);
                }
                if let Err(e) = self.writer.shutdown().await {
                    debug!("Player {} shutdown failed: {}", self.slot, e);
                }
                return SessionEnd::Won;
            }
        }
    }

    async fn send(&mut self, response: &Response) -> io::Result<()> {
        self.writer.write_all(response.to_wire().as_bytes()).await?;
        self.writer.flush().await
    }
}

/// Serves one TCP client in `slot` until it disconnects or wins.
pub async fn handle_connection(stream: TcpStream, slot: u32, game: SharedGame) -> SessionEnd {
    let (read_half, write_half) = stream.into_split();
    Session::new(slot, game, BufReader::new(read_half), write_half)
        .run()
        .await
}
