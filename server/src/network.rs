//! TCP acceptor: hands each connection a slot and a session task.

use crate::client_manager::ClientManager;
use crate::game::SharedGame;
use crate::session::{handle_connection, SessionEnd};
use log::{debug, error, info, warn};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Listening endpoint for the dungeon.
pub struct Server {
    listener: TcpListener,
    game: SharedGame,
    clients: Arc<Mutex<ClientManager>>,
}

impl Server {
    pub async fn bind(
        addr: &str,
        game: SharedGame,
        max_players: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            game,
            clients: Arc::new(Mutex::new(ClientManager::new(max_players))),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Number of sessions currently running.
    pub fn connected(&self) -> usize {
        lock(&self.clients).len()
    }

    /// Accepts connections forever, one session task per player.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        info!("Server started successfully");

        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    continue;
                }
            };

            let slot = lock(&self.clients).add_client(addr);
            let Some(slot) = slot else {
                warn!("Server full, rejecting connection from {}", addr);
                drop(stream);
                continue;
            };

            let game = self.game.clone();
            let clients = Arc::clone(&self.clients);
            tokio::spawn(async move {
                match handle_connection(stream, slot, game).await {
                    SessionEnd::Disconnected => debug!("Player {} closed the connection", slot),
                    SessionEnd::Won => debug!("Player {} left victorious", slot),
                    SessionEnd::SpawnFailed(e) => warn!("Player {} was not spawned: {}", slot, e),
                    SessionEnd::Io(e) => warn!("Player {} connection error: {}", slot, e),
                }
                lock(&clients).remove_client(slot);
            });
        }
    }
}

fn lock(clients: &Mutex<ClientManager>) -> std::sync::MutexGuard<'_, ClientManager> {
    match clients.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use crate::game::GameState;
    use crate::map::MapGrid;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpStream;

    async fn start(max_players: usize) -> (SocketAddr, Arc<Server>) {
        let map = MapGrid::load("name Net\nwin 5\n######\n#....#\n#....#\n######\n").unwrap();
        let game = SharedGame::new(GameState::with_seed(map, 1), Arc::new(NullSink));
        let server = Arc::new(Server::bind("127.0.0.1:0", game, max_players).await.unwrap());
        let addr = server.local_addr().unwrap();
        let runner = Arc::clone(&server);
        tokio::spawn(async move { runner.run().await.map_err(|e| e.to_string()) });
        (addr, server)
    }

    async fn hello(stream: &mut BufReader<TcpStream>) -> String {
        stream.get_mut().write_all(b"HELLO\n").await.unwrap();
        let mut line = String::new();
        stream.read_line(&mut line).await.unwrap();
        line
    }

    #[tokio::test]
    async fn test_accepts_and_serves() {
        let (addr, server) = start(2).await;
        let mut stream = BufReader::new(TcpStream::connect(addr).await.unwrap());
        assert_eq!(hello(&mut stream).await, "GOLD: 5\n");
        assert_eq!(server.connected(), 1);
    }

    #[tokio::test]
    async fn test_full_server_drops_connection() {
        let (addr, _server) = start(1).await;
        let mut first = BufReader::new(TcpStream::connect(addr).await.unwrap());
        assert_eq!(hello(&mut first).await, "GOLD: 5\n");

        let mut second = TcpStream::connect(addr).await.unwrap();
        let mut buf = Vec::new();
        let read = second.read_to_end(&mut buf).await.unwrap_or(0);
        assert_eq!(read, 0);
    }

    #[tokio::test]
    async fn test_capacity_freed_after_disconnect() {
        let (addr, server) = start(1).await;
        let mut first = BufReader::new(TcpStream::connect(addr).await.unwrap());
        assert_eq!(hello(&mut first).await, "GOLD: 5\n");
        drop(first);

        for _ in 0..100 {
            if server.connected() == 0 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(server.connected(), 0);

        let mut again = BufReader::new(TcpStream::connect(addr).await.unwrap());
        assert_eq!(hello(&mut again).await, "GOLD: 5\n");
    }
}
