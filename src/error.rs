//! Error types

use thiserror::Error;

/// Entity registry failures
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Identity pool is empty. Fatal for the running game.
    #[error("entity limit of {capacity} has been exceeded")]
    Exhausted { capacity: usize },
}

/// Inbound socket payloads that cannot be applied
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("user state has no variant set")]
    EmptyUserState,
    #[error("user state has {0} variants set")]
    AmbiguousUserState(usize),
}

/// Outbound socket failures
#[derive(Debug, Error)]
pub enum SocketError {
    #[error("websocket is not connected")]
    NotConnected,
    #[error("could not open websocket: {0}")]
    Connect(String),
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("send failed: {0}")]
    Send(String),
}

/// Developer console input that cannot be run
#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command: {0}")]
    Unknown(String),
    #[error("missing argument <{0}>")]
    MissingArgument(&'static str),
    #[error("not a number: {0}")]
    InvalidNumber(String),
}

/// Errors that stop the game loop
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
