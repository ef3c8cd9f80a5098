use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tokio::sync::mpsc::{self, error::TrySendError};

use common::games::connect4::{BOARD_HEIGHT, BOARD_WIDTH, Connect4Game, GameRuleError, Move, Player};
use common::{ConnectionId, ServerEvent, SessionId, log};

/// Events a connection may have queued before its writer catches up.
pub const OUTBOX_CAPACITY: usize = 128;

// A full replay (every cell plus the win) must fit in a fresh outbox.
const _: () = assert!(OUTBOX_CAPACITY > BOARD_WIDTH * BOARD_HEIGHT + 1);

/// Outbox of one connection.
pub type ClientSender = mpsc::Sender<ServerEvent>;

/// One game and the connections watching it.
///
/// The engine and the connected-set share a single lock: a move, its
/// broadcast, and any attach/detach are serialized, so every connection
/// sees events in application order and a replay always precedes the
/// live events that follow it. Nothing awaits under the lock; a connection
/// whose outbox is full is evicted instead.
#[derive(Debug)]
pub struct GameSession {
    session_id: SessionId,
    enforce_turn_order: bool,
    state: Mutex<SessionState>,
}

#[derive(Debug)]
struct Peer {
    sender: ClientSender,
    evicted: Arc<Notify>,
}

#[derive(Debug, Default)]
struct SessionState {
    game: Connect4Game,
    connections: HashMap<ConnectionId, Peer>,
}

impl GameSession {
    pub fn new(session_id: SessionId, enforce_turn_order: bool) -> Self {
        Self {
            session_id,
            enforce_turn_order,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    // Every critical section leaves the state consistent, so a poisoned
    // lock is still safe to use.
    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replays the history to `sender`, then adds the connection to the
    /// connected-set. The returned guard removes it again on drop.
    pub fn attach(self: &Arc<Self>, connection_id: ConnectionId, sender: ClientSender) -> SessionMembership {
        let mut state = self.lock_state();

        for applied in state.game.moves() {
            self.send_replay(&connection_id, &sender, ServerEvent::move_applied(applied));
        }
        if let Some(player) = state.game.winner() {
            self.send_replay(&connection_id, &sender, ServerEvent::Win { player });
        }

        let evicted = Arc::new(Notify::new());
        state.connections.insert(
            connection_id.clone(),
            Peer {
                sender,
                evicted: Arc::clone(&evicted),
            },
        );
        log!(
            "[{}] {} attached ({} connections)",
            self.session_id,
            connection_id,
            state.connections.len()
        );

        SessionMembership {
            session: Arc::clone(self),
            connection_id,
            evicted,
        }
    }

    fn send_replay(&self, connection_id: &ConnectionId, sender: &ClientSender, event: ServerEvent) {
        if let Err(e) = sender.try_send(event) {
            log!("[{}] Failed to replay to {}: {}", self.session_id, connection_id, e);
        }
    }

    pub fn detach(&self, connection_id: &ConnectionId) -> bool {
        let mut state = self.lock_state();
        let removed = state.connections.remove(connection_id).is_some();
        if removed {
            log!(
                "[{}] {} detached ({} connections)",
                self.session_id,
                connection_id,
                state.connections.len()
            );
        }
        removed
    }

    /// Applies a move and broadcasts it (and a win, if it was one) to every
    /// attached connection. Rejected moves are not broadcast.
    pub fn play(&self, player: Player, column: i64) -> Result<Move, GameRuleError> {
        let mut state = self.lock_state();

        if self.enforce_turn_order && state.game.winner().is_none() {
            let expected = state.game.last_player().map_or(Player::Red, |p| p.opponent());
            if player != expected {
                return Err(GameRuleError::NotYourTurn);
            }
        }

        let row = state.game.play(player, column)?;
        let applied = Move::new(player, column as usize, row);

        self.broadcast(&mut state, ServerEvent::move_applied(&applied));

        if let Some(winner) = state.game.winner() {
            log!("[{}] {} wins after {} moves", self.session_id, winner, state.game.moves().len());
            self.broadcast(&mut state, ServerEvent::Win { player: winner });
        }

        Ok(applied)
    }

    fn broadcast(&self, state: &mut SessionState, event: ServerEvent) {
        let session_id = &self.session_id;
        state.connections.retain(|connection_id, peer| match peer.sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                log!("[{}] Outbox of {} is full, evicting", session_id, connection_id);
                peer.evicted.notify_one();
                false
            }
            Err(TrySendError::Closed(_)) => {
                log!("[{}] Failed to send to {}: connection closed", session_id, connection_id);
                true
            }
        });
    }

    pub fn connection_count(&self) -> usize {
        self.lock_state().connections.len()
    }

    pub fn moves(&self) -> Vec<Move> {
        self.lock_state().game.moves().to_vec()
    }

    pub fn winner(&self) -> Option<Player> {
        self.lock_state().game.winner()
    }
}

/// Membership of one connection in a session's connected-set, released on drop.
#[derive(Debug)]
pub struct SessionMembership {
    session: Arc<GameSession>,
    connection_id: ConnectionId,
    evicted: Arc<Notify>,
}

impl SessionMembership {
    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.connection_id
    }

    /// Resolves once the session has dropped this connection because its
    /// outbox overflowed. Stays pending otherwise.
    pub async fn evicted(&self) {
        self.evicted.notified().await
    }
}

impl Drop for SessionMembership {
    fn drop(&mut self) {
        self.session.detach(&self.connection_id);
    }
}
