use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use common::id_generator::{generate_join_token, generate_session_id, generate_watch_token};
use common::{ConnectionId, JoinToken, WatchToken, log};

use crate::game_session::{ClientSender, GameSession, SessionMembership};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Game not found.")]
    NotFound,
}

#[derive(Debug, Default)]
struct TokenMaps {
    by_join: HashMap<JoinToken, Arc<GameSession>>,
    by_watch: HashMap<WatchToken, Arc<GameSession>>,
}

/// Process-wide map from capability tokens to live games. Both tokens of a
/// game are inserted and removed under one lock acquisition.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    maps: Arc<Mutex<TokenMaps>>,
    enforce_turn_order: bool,
}

impl SessionRegistry {
    pub fn new(enforce_turn_order: bool) -> Self {
        Self {
            maps: Arc::new(Mutex::new(TokenMaps::default())),
            enforce_turn_order,
        }
    }

    fn lock_maps(&self) -> MutexGuard<'_, TokenMaps> {
        self.maps.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates a game hosted by `host`, which joins its connected-set
    /// immediately. Dropping the returned `HostedSession` deregisters the
    /// game's tokens.
    pub fn create_session(
        &self,
        host: ConnectionId,
        sender: ClientSender,
    ) -> (HostedSession, SessionMembership) {
        let session = Arc::new(GameSession::new(generate_session_id(), self.enforce_turn_order));

        let (join_token, watch_token) = {
            let mut maps = self.lock_maps();
            let mut join_token = generate_join_token();
            while maps.by_join.contains_key(&join_token) {
                join_token = generate_join_token();
            }
            let mut watch_token = generate_watch_token();
            while maps.by_watch.contains_key(&watch_token) {
                watch_token = generate_watch_token();
            }
            maps.by_join.insert(join_token.clone(), Arc::clone(&session));
            maps.by_watch.insert(watch_token.clone(), Arc::clone(&session));
            (join_token, watch_token)
        };

        log!("[{}] Game created by {}", session.session_id(), host);
        let membership = session.attach(host, sender);

        let hosted = HostedSession {
            registry: self.clone(),
            session,
            join_token,
            watch_token,
        };
        (hosted, membership)
    }

    pub fn lookup_by_join(&self, token: &JoinToken) -> Result<Arc<GameSession>, LookupError> {
        self.lock_maps()
            .by_join
            .get(token)
            .cloned()
            .ok_or(LookupError::NotFound)
    }

    pub fn lookup_by_watch(&self, token: &WatchToken) -> Result<Arc<GameSession>, LookupError> {
        self.lock_maps()
            .by_watch
            .get(token)
            .cloned()
            .ok_or(LookupError::NotFound)
    }

    /// Returns whether anything was removed.
    pub fn remove_session(&self, join_token: &JoinToken, watch_token: &WatchToken) -> bool {
        let mut maps = self.lock_maps();
        let by_join = maps.by_join.remove(join_token);
        let by_watch = maps.by_watch.remove(watch_token);
        by_join.is_some() || by_watch.is_some()
    }

    pub fn session_count(&self) -> usize {
        self.lock_maps().by_join.len()
    }
}

/// The host's claim on a registered game. Dropping it removes both tokens
/// from the registry; connections already attached keep their session.
#[derive(Debug)]
pub struct HostedSession {
    registry: SessionRegistry,
    session: Arc<GameSession>,
    join_token: JoinToken,
    watch_token: WatchToken,
}

impl HostedSession {
    pub fn session(&self) -> &Arc<GameSession> {
        &self.session
    }

    pub fn join_token(&self) -> &JoinToken {
        &self.join_token
    }

    pub fn watch_token(&self) -> &WatchToken {
        &self.watch_token
    }
}

impl Drop for HostedSession {
    fn drop(&mut self) {
        if self.registry.remove_session(&self.join_token, &self.watch_token) {
            log!("[{}] Game closed by host", self.session.session_id());
        }
    }
}
