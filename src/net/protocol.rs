//! JSON text frames exchanged with the game server

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProtocolError;

// =============================================================================
// CLIENT -> SERVER
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    Auth {
        jwt: String,
    },
    CreateLobby {
        lobby_name: String,
        player_id: String,
    },
    JoinLobby {
        lobby_name: String,
        player_id: String,
    },
    LeaveLobby {
        lobby_name: String,
        player_id: String,
    },
    GameState {
        position_x: f32,
        position_y: f32,
        player_id: String,
        timestamp: f64,
    },
    Heartbeat {
        timestamp: f64,
    },
}

impl ClientMessage {
    /// Lobby owned by `player_id`
    pub fn create_lobby(player_id: &str) -> Self {
        Self::CreateLobby {
            lobby_name: own_lobby_name(player_id),
            player_id: player_id.to_string(),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Name the server gives a lobby created by `player_id`
pub fn own_lobby_name(player_id: &str) -> String {
    format!("{}'s lobby", player_id)
}

// =============================================================================
// SERVER -> CLIENT
// =============================================================================

/// Server-authoritative session state, exactly one variant per push
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserState {
    Unauthenticated,
    Authenticated { player_id: String },
    InLobby { player_id: String, lobby_id: String },
    InGame { player_id: String, game_id: String },
}

const USER_STATE_VARIANTS: [&str; 4] = ["Unauthenticated", "Authenticated", "InLobby", "InGame"];

impl UserState {
    /// Decode the wire form: an object keyed by variant name where exactly
    /// one known key carries a non-null value. The bare string
    /// `"Unauthenticated"` is accepted as well.
    pub fn decode(value: Value) -> Result<Self, ProtocolError> {
        let map = match value {
            Value::String(s) if s == "Unauthenticated" => return Ok(UserState::Unauthenticated),
            Value::Object(map) => map,
            _ => return Err(ProtocolError::EmptyUserState),
        };

        let mut set: Vec<(String, Value)> = map
            .into_iter()
            .filter(|(key, value)| USER_STATE_VARIANTS.contains(&key.as_str()) && !value.is_null())
            .collect();

        match set.len() {
            0 => Err(ProtocolError::EmptyUserState),
            1 => {
                let (key, value) = set.remove(0);
                if key == "Unauthenticated" {
                    return Ok(UserState::Unauthenticated);
                }
                let mut single = serde_json::Map::new();
                single.insert(key, value);
                Ok(serde_json::from_value(Value::Object(single))?)
            }
            n => Err(ProtocolError::AmbiguousUserState(n)),
        }
    }

    pub fn player_id(&self) -> Option<&str> {
        match self {
            UserState::Unauthenticated => None,
            UserState::Authenticated { player_id }
            | UserState::InLobby { player_id, .. }
            | UserState::InGame { player_id, .. } => Some(player_id),
        }
    }
}

/// Position report of another player
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemotePlayerState {
    pub position_x: f32,
    pub position_y: f32,
    pub player_id: String,
    #[serde(default)]
    pub timestamp: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    SynchronizeState(UserState),
    GameState(RemotePlayerState),
}

/// Frame shape before the user state union is checked
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum RawServerMessage {
    SynchronizeState { state: Value },
    GameState(RemotePlayerState),
}

impl ServerMessage {
    /// Decode one inbound text frame
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        match serde_json::from_str::<RawServerMessage>(text)? {
            RawServerMessage::SynchronizeState { state } => {
                Ok(ServerMessage::SynchronizeState(UserState::decode(state)?))
            }
            RawServerMessage::GameState(remote) => Ok(ServerMessage::GameState(remote)),
        }
    }
}
