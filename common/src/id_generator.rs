use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use rand::distr::Alphanumeric;

use crate::{ConnectionId, JoinToken, SessionId, WatchToken};

/// 22 alphanumeric characters carry roughly 130 bits of entropy.
pub const TOKEN_LENGTH: usize = 22;

static NEXT_CONNECTION: AtomicU64 = AtomicU64::new(1);
static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

fn random_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

pub fn generate_join_token() -> JoinToken {
    JoinToken::new(random_token())
}

pub fn generate_watch_token() -> WatchToken {
    WatchToken::new(random_token())
}

pub fn generate_connection_id() -> ConnectionId {
    let n = NEXT_CONNECTION.fetch_add(1, Ordering::Relaxed);
    ConnectionId::new(format!("conn-{}", n))
}

/// Log label for a game. Never derived from its tokens, so logs don't leak them.
pub fn generate_session_id() -> SessionId {
    let n = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
    SessionId::new(format!("game-{}", n))
}
