//! Networking
//!
//! JSON frames over a websocket, and the mapping of server session pushes
//! onto local menu and game state.

pub mod protocol;
pub mod session;
pub mod socket;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use protocol::{ClientMessage, RemotePlayerState, ServerMessage, UserState};
pub use session::{Session, Transition};
pub use socket::{ConnectionState, MemoryTransport, Socket, Transport};
#[cfg(target_arch = "wasm32")]
pub use web::{SocketHandlers, WebTransport};
