use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use common::games::connect4::Player;
use common::id_generator::generate_connection_id;
use common::{ClientEvent, ConnectionId, InitRequest, JoinToken, ProtocolError, ServerEvent, WatchToken, log};

use crate::game_session::{ClientSender, OUTBOX_CAPACITY, SessionMembership};
use crate::session_registry::SessionRegistry;
use crate::web_server::WebServerState;

/// How long queued notifications may take to flush once a connection's
/// flow has ended.
const SEND_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn handle_websocket(socket: WebSocket, state: WebServerState) {
    let connection_id = generate_connection_id();
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (tx, mut rx) = mpsc::channel::<ServerEvent>(OUTBOX_CAPACITY);

    let writer_id = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let text = match event.encode() {
                Ok(text) => text,
                Err(e) => {
                    log!("[ws:{}] Failed to encode {:?}: {}", writer_id, event, e);
                    continue;
                }
            };
            if ws_sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    log!("[ws:{}] Connected", connection_id);

    match next_text(&mut ws_receiver, &connection_id).await {
        None => log!("[ws:{}] Closed before handshake", connection_id),
        Some(first) => match first.and_then(|text| InitRequest::decode(&text)) {
            Ok(InitRequest::Start) => {
                start_game(&state.registry, &connection_id, &tx, &mut ws_receiver).await
            }
            Ok(InitRequest::Join(token)) => {
                join_game(&state.registry, &connection_id, &tx, &mut ws_receiver, &token).await
            }
            Ok(InitRequest::Watch(token)) => {
                watch_game(&state.registry, &connection_id, &tx, &mut ws_receiver, &token).await
            }
            Err(e) => {
                log!("[ws:{}] Rejected handshake: {}", connection_id, e);
                send_to_client(&tx, ServerEvent::error(e.to_string()), &connection_id).await;
            }
        },
    }

    drop(tx);
    if tokio::time::timeout(SEND_DRAIN_TIMEOUT, &mut send_task).await.is_err() {
        send_task.abort();
    }
    log!("[ws:{}] Connection ended", connection_id);
}

async fn start_game(
    registry: &SessionRegistry,
    connection_id: &ConnectionId,
    tx: &ClientSender,
    receiver: &mut SplitStream<WebSocket>,
) {
    let (hosted, membership) = registry.create_session(connection_id.clone(), tx.clone());
    send_to_client(
        tx,
        ServerEvent::Init {
            join: hosted.join_token().clone(),
            watch: hosted.watch_token().clone(),
        },
        connection_id,
    )
    .await;

    play_loop(&membership, Player::Red, connection_id, tx, receiver).await;

    drop(membership);
    drop(hosted);
}

async fn join_game(
    registry: &SessionRegistry,
    connection_id: &ConnectionId,
    tx: &ClientSender,
    receiver: &mut SplitStream<WebSocket>,
    token: &JoinToken,
) {
    let session = match registry.lookup_by_join(token) {
        Ok(session) => session,
        Err(e) => {
            log!("[ws:{}] Join failed: {}", connection_id, e);
            send_to_client(tx, ServerEvent::error(e.to_string()), connection_id).await;
            return;
        }
    };

    let membership = session.attach(connection_id.clone(), tx.clone());
    play_loop(&membership, Player::Yellow, connection_id, tx, receiver).await;
}

async fn watch_game(
    registry: &SessionRegistry,
    connection_id: &ConnectionId,
    tx: &ClientSender,
    receiver: &mut SplitStream<WebSocket>,
    token: &WatchToken,
) {
    let session = match registry.lookup_by_watch(token) {
        Ok(session) => session,
        Err(e) => {
            log!("[ws:{}] Watch failed: {}", connection_id, e);
            send_to_client(tx, ServerEvent::error(e.to_string()), connection_id).await;
            return;
        }
    };

    let membership = session.attach(connection_id.clone(), tx.clone());
    while let Some(message) = next_message(&membership, receiver, connection_id).await {
        if let Ok(text) = message {
            log!("[ws:{}] Ignoring message from spectator: {}", connection_id, text);
        }
    }
}

async fn play_loop(
    membership: &SessionMembership,
    player: Player,
    connection_id: &ConnectionId,
    tx: &ClientSender,
    receiver: &mut SplitStream<WebSocket>,
) {
    while let Some(message) = next_message(membership, receiver, connection_id).await {
        let event = match message.and_then(|text| ClientEvent::decode(&text)) {
            Ok(event) => event,
            Err(e) => {
                send_to_client(tx, ServerEvent::error(e.to_string()), connection_id).await;
                continue;
            }
        };

        match event {
            ClientEvent::Play { column } => {
                if let Err(e) = membership.session().play(player, column) {
                    send_to_client(tx, ServerEvent::illegal_move(&e), connection_id).await;
                }
            }
            ClientEvent::Init { .. } => {
                send_to_client(
                    tx,
                    ServerEvent::error("Client should only send 'play' events"),
                    connection_id,
                )
                .await;
            }
        }
    }
}

/// Like `next_text`, but ends the flow once the session has evicted this
/// connection for not keeping up with its outbox.
async fn next_message(
    membership: &SessionMembership,
    receiver: &mut SplitStream<WebSocket>,
    connection_id: &ConnectionId,
) -> Option<Result<String, ProtocolError>> {
    tokio::select! {
        message = next_text(receiver, connection_id) => message,
        _ = membership.evicted() => {
            log!("[ws:{}] Evicted from {}", connection_id, membership.session().session_id());
            None
        }
    }
}

/// Next text frame. Binary frames are a protocol error; ping/pong are
/// skipped. `None` once the peer has closed or the transport failed.
async fn next_text(
    receiver: &mut SplitStream<WebSocket>,
    connection_id: &ConnectionId,
) -> Option<Result<String, ProtocolError>> {
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
            Ok(Message::Binary(_)) => {
                return Some(Err(ProtocolError::Malformed(
                    "binary frames are not supported".to_string(),
                )));
            }
            Ok(Message::Close(_)) => return None,
            Ok(_) => continue,
            Err(e) => {
                log!("[ws:{}] WebSocket error: {}", connection_id, e);
                return None;
            }
        }
    }
    None
}

/// Queues a reply for this connection only. Waits for room in the outbox,
/// so a client that stops reading stops being read.
async fn send_to_client(tx: &ClientSender, event: ServerEvent, connection_id: &ConnectionId) {
    if let Err(e) = tx.send(event).await {
        log!("[ws:{}] Failed to send message: {}", connection_id, e);
    }
}
