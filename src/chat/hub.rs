use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use crate::config::ChatConfig;
use crate::error::{AppError, AppResult};

pub type ClientId = u64;

enum Command {
    Join {
        id: ClientId,
        outbound: mpsc::Sender<String>,
    },
    Leave {
        id: ClientId,
    },
    Broadcast {
        from: ClientId,
        text: String,
    },
}

/// A joined client: its id and the messages broadcast to it.
///
/// `messages` yields `None` once the hub drops the client or shuts down.
pub struct ChatSession {
    pub id: ClientId,
    pub messages: mpsc::Receiver<String>,
}

/// Handle to the chat actor. Cloning is cheap.
///
/// The actor task alone owns the connection set, so no lock is held while
/// fanning a message out.
#[derive(Clone)]
pub struct ChatHub {
    commands: mpsc::Sender<Command>,
    next_id: Arc<AtomicU64>,
    outbound_buffer: usize,
}

impl ChatHub {
    /// Spawn the hub actor; it runs until `shutdown` fires or every handle
    /// is dropped.
    pub fn start(config: &ChatConfig, shutdown: CancellationToken) -> Self {
        let (commands, receiver) = mpsc::channel(config.command_buffer.max(1));
        tokio::spawn(run_hub(receiver, shutdown));

        Self {
            commands,
            next_id: Arc::new(AtomicU64::new(1)),
            outbound_buffer: config.outbound_buffer.max(1),
        }
    }

    /// Register a new client and announce it to everyone, itself included
    pub async fn join(&self) -> AppResult<ChatSession> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (outbound, messages) = mpsc::channel(self.outbound_buffer);
        self.send(Command::Join { id, outbound }).await?;
        Ok(ChatSession { id, messages })
    }

    /// Broadcast `text` from `from` with a wall-clock prefix
    pub async fn broadcast(&self, from: ClientId, text: impl Into<String>) -> AppResult<()> {
        self.send(Command::Broadcast {
            from,
            text: text.into(),
        })
        .await
    }

    pub async fn leave(&self, id: ClientId) -> AppResult<()> {
        self.send(Command::Leave { id }).await
    }

    async fn send(&self, command: Command) -> AppResult<()> {
        self.commands.send(command).await.map_err(|_| AppError::Internal {
            source: anyhow::anyhow!("chat hub is not running"),
        })
    }
}

async fn run_hub(mut commands: mpsc::Receiver<Command>, shutdown: CancellationToken) {
    let mut clients: HashMap<ClientId, mpsc::Sender<String>> = HashMap::new();

    loop {
        let command = tokio::select! {
            _ = shutdown.cancelled() => break,
            command = commands.recv() => command,
        };
        let Some(command) = command else {
            break;
        };

        match command {
            Command::Join { id, outbound } => {
                clients.insert(id, outbound);
                tracing::info!(client_id = id, clients = clients.len(), "Chat client joined");
                fan_out(&mut clients, format!("Client #{id} joined the chat"));
            }
            Command::Leave { id } => {
                if clients.remove(&id).is_some() {
                    tracing::info!(client_id = id, clients = clients.len(), "Chat client left");
                    fan_out(&mut clients, format!("Client #{id} left the chat"));
                }
            }
            Command::Broadcast { from, text } => {
                let at = jiff::Zoned::now().strftime("%H:%M:%S").to_string();
                fan_out(&mut clients, format!("[{at}] Client #{from}: {text}"));
            }
        }
    }

    tracing::debug!(clients = clients.len(), "Chat hub stopped");
}

/// Deliver `message` to every client without waiting. Clients whose buffer
/// is full or whose socket is gone are removed.
fn fan_out(clients: &mut HashMap<ClientId, mpsc::Sender<String>>, message: String) {
    clients.retain(|id, outbound| match outbound.try_send(message.clone()) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::warn!(client_id = *id, "Dropping chat client with full buffer");
            false
        }
        Err(TrySendError::Closed(_)) => false,
    });
}
