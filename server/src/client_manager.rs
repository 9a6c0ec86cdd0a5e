//! Slot allocation for connected players.
//!
//! Every accepted connection is given the next slot number; numbers are never
//! handed out twice while the server runs. The manager also enforces the cap
//! on players connected at the same time.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Instant;

/// Bookkeeping for one connected player.
#[derive(Debug, Clone)]
pub struct Client {
    /// Slot number assigned by the server
    pub id: u32,
    /// Peer address, used only for logging
    pub addr: SocketAddr,
    pub connected_at: Instant,
}

impl Client {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
        }
    }
}

/// Tracks active connections and hands out slot numbers.
#[derive(Debug)]
pub struct ClientManager {
    clients: HashMap<u32, Client>,
    next_client_id: u32,
    max_clients: usize,
}

impl ClientManager {
    /// Creates an empty manager. Slot numbers start at 0.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 0,
            max_clients,
        }
    }

    /// Registers a new connection.
    ///
    /// Returns `None` when `max_clients` players are already connected; no
    /// slot number is consumed in that case.
    pub fn add_client(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Player {} connected from {}", client_id, addr);
        self.clients.insert(client_id, Client::new(client_id, addr));

        Some(client_id)
    }

    /// Frees the slot's capacity. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: u32) -> bool {
        match self.clients.remove(&client_id) {
            Some(client) => {
                info!(
                    "Player {} ({}) disconnected after {:.1}s",
                    client.id,
                    client.addr,
                    client.connected_at.elapsed().as_secs_f32()
                );
                true
            }
            None => false,
        }
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
