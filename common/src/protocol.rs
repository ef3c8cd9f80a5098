use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::games::connect4::{GameRuleError, Move, Player};
use crate::{JoinToken, WatchToken};

/// Messages a browser sends. Encoded as JSON objects tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientEvent {
    Init {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        join: Option<JoinToken>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        watch: Option<WatchToken>,
    },
    Play {
        column: i64,
    },
}

/// Messages the server sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    /// Sent to the host only.
    Init { join: JoinToken, watch: WatchToken },
    Play { player: Player, column: usize, row: usize },
    Win { player: Player },
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitRequest {
    Start,
    Join(JoinToken),
    Watch(WatchToken),
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(String),
    #[error("Invalid handshake: {0}")]
    InvalidHandshake(String),
}

// Both directions encode and decode so Rust clients and test harnesses can
// speak the protocol with the same types the server uses.
impl ClientEvent {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ServerEvent {
    pub fn move_applied(applied: &Move) -> Self {
        ServerEvent::Play {
            player: applied.player,
            column: applied.column,
            row: applied.row,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            message: message.into(),
        }
    }

    /// Reply to a move the rules rejected.
    pub fn illegal_move(error: &GameRuleError) -> Self {
        Self::error(format!("Move is illegal: {}", error))
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl InitRequest {
    /// Parses the first message of a connection.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let event = ClientEvent::decode(text)
            .map_err(|e| ProtocolError::InvalidHandshake(e.to_string()))?;
        Self::try_from(event)
    }
}

impl TryFrom<ClientEvent> for InitRequest {
    type Error = ProtocolError;

    fn try_from(event: ClientEvent) -> Result<Self, Self::Error> {
        match event {
            ClientEvent::Init { join: None, watch: None } => Ok(InitRequest::Start),
            ClientEvent::Init { join: Some(join), watch: None } => Ok(InitRequest::Join(join)),
            ClientEvent::Init { join: None, watch: Some(watch) } => Ok(InitRequest::Watch(watch)),
            ClientEvent::Init { .. } => Err(ProtocolError::InvalidHandshake(
                "init carries both a join and a watch token".to_string(),
            )),
            other => Err(ProtocolError::InvalidHandshake(format!(
                "expected init, got {:?}",
                other
            ))),
        }
    }
}
