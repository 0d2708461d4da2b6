//! Connection registry and reload broadcaster.
//!
//! The registry is owned by one server instance and shared with its handlers
//! through an `Arc`. Entries may go stale between a socket closing and the
//! entry being pruned; every consumer skips closed entries silently.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;

/// Message pushed to clients after a rebuild.
pub const RELOAD_MESSAGE: &str = "reload";

/// Pending messages per client. A client that is this far behind is
/// considered gone.
const CLIENT_BUFFER: usize = 16;

/// Identifier of a registered client.
pub type ClientId = usize;

/// One open WebSocket, as seen by the broadcaster.
#[derive(Debug, Clone)]
pub struct ClientConnection {
    tx: mpsc::Sender<String>,
    open: Arc<AtomicBool>,
}

impl ClientConnection {
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire) && !self.tx.is_closed()
    }
}

/// Handle kept by the connection task for its own entry.
#[derive(Debug)]
pub struct ClientHandle {
    pub id: ClientId,
    open: Arc<AtomicBool>,
}

impl ClientHandle {
    /// Mark the connection closed. The entry is pruned lazily.
    pub fn close(&self) {
        self.open.store(false, Ordering::Release);
    }
}

/// All live-reload connections of one server.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    clients: RwLock<HashMap<ClientId, ClientConnection>>,
    next_id: AtomicUsize,
    connected_total: AtomicUsize,
}

/// Shared registry handle.
pub type SharedRegistry = Arc<ConnectionRegistry>;

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection. Messages for it arrive on the receiver.
    pub fn register(&self) -> (ClientHandle, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(CLIENT_BUFFER);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let open = Arc::new(AtomicBool::new(true));

        self.clients.write().insert(
            id,
            ClientConnection {
                tx,
                open: Arc::clone(&open),
            },
        );
        self.connected_total.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(client = id, "live-reload client connected");
        (ClientHandle { id, open }, rx)
    }

    /// Remove a connection.
    pub fn unregister(&self, id: ClientId) {
        if self.clients.write().remove(&id).is_some() {
            tracing::debug!(client = id, "live-reload client removed");
        }
    }

    /// Number of entries, including stale ones not yet pruned.
    pub fn len(&self) -> usize {
        self.clients.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.read().is_empty()
    }

    /// Number of entries currently open.
    pub fn open_count(&self) -> usize {
        self.clients.read().values().filter(|c| c.is_open()).count()
    }

    /// Connections ever registered, including closed ones.
    pub fn connected_total(&self) -> usize {
        self.connected_total.load(Ordering::Relaxed)
    }

    /// Send [`RELOAD_MESSAGE`] to every open connection.
    ///
    /// Fire-and-forget: closed connections and failed sends are pruned, never
    /// reported. Returns the number of connections the message was queued for.
    pub fn broadcast(&self) -> usize {
        let clients: Vec<(ClientId, ClientConnection)> = self
            .clients
            .read()
            .iter()
            .map(|(id, c)| (*id, c.clone()))
            .collect();

        let mut delivered = 0;
        let mut stale = Vec::new();

        for (id, client) in clients {
            if !client.is_open() {
                stale.push(id);
                continue;
            }
            match client.tx.try_send(RELOAD_MESSAGE.to_string()) {
                Ok(()) => delivered += 1,
                Err(_) => stale.push(id),
            }
        }

        if !stale.is_empty() {
            let mut clients = self.clients.write();
            for id in stale {
                clients.remove(&id);
            }
        }

        tracing::info!(
            "[{}] Sending changes to clients ({})",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            delivered
        );

        delivered
    }
}
