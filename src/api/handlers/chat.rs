//! WebSocket broadcast chat.
//!
//! Each connection joins the [`ChatHub`](crate::chat::ChatHub); text frames
//! it sends are broadcast to every member, and everything the hub fans out
//! is written back to the socket.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use tokio::select;
use tracing::{debug, info, warn};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::CHAT_TAG;
use crate::chat::ChatHub;
use crate::state::AppState;

pub fn chat_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(chat_socket))
}

/// GET /ws/chat - Upgrade to a chat WebSocket
#[utoipa::path(
    get,
    path = "/chat",
    tag = CHAT_TAG,
    responses(
        (status = 101, description = "Switched to the WebSocket chat protocol")
    )
)]
async fn chat_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let hub = state.chat.clone();
    ws.on_upgrade(move |socket| handle_chat_socket(socket, hub))
}

async fn handle_chat_socket(socket: WebSocket, hub: ChatHub) {
    let (mut sender, mut receiver) = socket.split();

    let mut session = match hub.join().await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, "Chat hub unavailable, closing socket");
            let _ = sender.send(Message::Close(None)).await;
            return;
        }
    };
    let client_id = session.id;
    info!(client_id, "Chat client connected");

    loop {
        select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if hub.broadcast(client_id, text.as_str()).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        debug!(client_id, error = %e, "Chat socket error");
                        break;
                    }
                    // axum answers pings itself
                    Some(Ok(_)) => {}
                }
            }

            outgoing = session.messages.recv() => {
                match outgoing {
                    Some(line) => {
                        if sender.send(Message::Text(line.into())).await.is_err() {
                            break;
                        }
                    }
                    // Dropped by the hub as too slow, or the hub shut down
                    None => {
                        let _ = sender.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
    }

    if let Err(e) = hub.leave(client_id).await {
        debug!(client_id, error = %e, "Chat hub gone before leave");
    }
    info!(client_id, "Chat client disconnected");
}
