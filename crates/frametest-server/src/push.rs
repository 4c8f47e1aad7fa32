//! Push channel: a WebSocket listener that fans compile notifications out to
//! every connected driver.
//!
//! Delivery is fire-and-forget and at-most-once. A client whose queue is full
//! misses the message; a client whose socket is gone is dropped from the
//! registry.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::any,
    Router,
};
use frametest_core::PushMessage;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const CLIENT_QUEUE: usize = 32;

/// Registry of connected push clients.
#[derive(Debug, Default)]
pub struct PushHub {
    clients: RwLock<HashMap<usize, mpsc::Sender<String>>>,
    next_client_id: AtomicUsize,
}

impl PushHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a client and returns its id and message queue.
    pub fn register_client(&self) -> (usize, mpsc::Receiver<String>) {
        let id = self.next_client_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE);
        self.clients.write().insert(id, tx);
        (id, rx)
    }

    pub fn unregister_client(&self, id: usize) {
        self.clients.write().remove(&id);
    }

    pub fn client_count(&self) -> usize {
        self.clients.read().len()
    }

    /// Serializes `message` once and queues it for every client.
    pub fn broadcast(&self, message: &PushMessage) {
        let json = match serde_json::to_string(message) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize push message: {}", e);
                return;
            }
        };

        let mut closed = Vec::new();
        for (id, tx) in self.clients.read().iter() {
            match tx.try_send(json.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!("Push client {} is behind; dropping message", id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => closed.push(*id),
            }
        }

        if !closed.is_empty() {
            let mut clients = self.clients.write();
            for id in closed {
                clients.remove(&id);
            }
        }
    }

    /// Disconnects every client. Their socket tasks end once their queues drain.
    pub fn close_all(&self) {
        self.clients.write().clear();
    }
}

/// Router for the push listener. Any path upgrades to a WebSocket.
pub fn router(hub: Arc<PushHub>) -> Router {
    Router::new()
        .route("/", any(handle_upgrade))
        .fallback(handle_upgrade)
        .with_state(hub)
}

async fn handle_upgrade(State(hub): State<Arc<PushHub>>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_client(socket, hub))
}

async fn serve_client(mut socket: WebSocket, hub: Arc<PushHub>) {
    let (id, mut rx) = hub.register_client();
    debug!("Push client {} connected", id);

    loop {
        tokio::select! {
            outgoing = rx.recv() => match outgoing {
                Some(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                None => {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            },
            incoming = socket.recv() => match incoming {
                // Drivers only listen; anything they send is ignored
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    hub.unregister_client(id);
    debug!("Push client {} disconnected", id);
}
