//! Socket connection lifecycle
//!
//! [`Socket`] wraps whatever carries the frames (a browser WebSocket, or an
//! in-memory pipe in tests) and owns the fixed-delay reconnect timer. Sends
//! are fire-and-forget; nothing here blocks.

use std::cell::RefCell;
use std::rc::Rc;

use super::protocol::ClientMessage;
use crate::error::SocketError;

/// Frame carrier
pub trait Transport {
    fn is_open(&self) -> bool;
    fn send_text(&mut self, text: &str) -> Result<(), SocketError>;
    fn close(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionState {
    Connecting,
    Open,
    /// Closed at the given timestamp, waiting to reconnect
    Closed { since: f64 },
}

pub struct Socket<T: Transport> {
    transport: Option<T>,
    state: ConnectionState,
    reconnect_delay: f64,
}

impl<T: Transport> Socket<T> {
    pub fn new(reconnect_delay_ms: f64) -> Self {
        Self {
            transport: None,
            state: ConnectionState::Closed { since: f64::NEG_INFINITY },
            reconnect_delay: reconnect_delay_ms,
        }
    }

    /// Start using a freshly created transport
    pub fn connect_with(&mut self, transport: T) {
        if let Some(mut old) = self.transport.replace(transport) {
            old.close();
        }
        self.state = ConnectionState::Connecting;
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open && self.transport.as_ref().is_some_and(|t| t.is_open())
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    pub fn on_open(&mut self) {
        log::info!("WebSocket connection established");
        self.state = ConnectionState::Open;
    }

    /// Connection dropped; a reconnect becomes due after the fixed delay
    pub fn on_close(&mut self, timestamp: f64) {
        if matches!(self.state, ConnectionState::Closed { .. }) {
            return;
        }
        log::warn!(
            "WebSocket closed, reconnecting in {} ms",
            self.reconnect_delay
        );
        self.state = ConnectionState::Closed { since: timestamp };
    }

    /// True once per closed period when the reconnect delay has elapsed
    pub fn should_reconnect(&mut self, timestamp: f64) -> bool {
        match self.state {
            ConnectionState::Closed { since } if timestamp - since >= self.reconnect_delay => {
                self.state = ConnectionState::Connecting;
                true
            }
            _ => false,
        }
    }

    pub fn send(&mut self, message: &ClientMessage) -> Result<(), SocketError> {
        if !self.is_open() {
            return Err(SocketError::NotConnected);
        }
        let text = message.encode()?;
        match self.transport.as_mut() {
            Some(transport) => transport.send_text(&text),
            None => Err(SocketError::NotConnected),
        }
    }
}

/// Transport that records outbound frames in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Rc<RefCell<Vec<String>>>,
    closed: Rc<RefCell<bool>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames sent so far
    pub fn sent(&self) -> Vec<String> {
        self.sent.borrow().clone()
    }

    pub fn take_sent(&self) -> Vec<String> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }
}

impl Transport for MemoryTransport {
    fn is_open(&self) -> bool {
        !*self.closed.borrow()
    }

    fn send_text(&mut self, text: &str) -> Result<(), SocketError> {
        if !self.is_open() {
            return Err(SocketError::Send("transport closed".into()));
        }
        self.sent.borrow_mut().push(text.to_string());
        Ok(())
    }

    fn close(&mut self) {
        *self.closed.borrow_mut() = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_socket() -> (Socket<MemoryTransport>, MemoryTransport) {
        let transport = MemoryTransport::new();
        let mut socket = Socket::new(5000.0);
        socket.connect_with(transport.clone());
        socket.on_open();
        (socket, transport)
    }

    #[test]
    fn test_send_requires_open_connection() {
        let mut socket: Socket<MemoryTransport> = Socket::new(5000.0);
        let msg = ClientMessage::Heartbeat { timestamp: 1.0 };
        assert!(matches!(socket.send(&msg), Err(SocketError::NotConnected)));

        socket.connect_with(MemoryTransport::new());
        // Still connecting
        assert!(matches!(socket.send(&msg), Err(SocketError::NotConnected)));
    }

    #[test]
    fn test_send_encodes_json() {
        let (mut socket, transport) = open_socket();
        socket
            .send(&ClientMessage::Heartbeat { timestamp: 42.0 })
            .unwrap();
        assert_eq!(transport.sent(), vec![r#"{"type":"Heartbeat","timestamp":42.0}"#]);
    }

    #[test]
    fn test_reconnect_after_fixed_delay() {
        let (mut socket, _) = open_socket();
        socket.on_close(1000.0);
        assert!(!socket.is_open());

        assert!(!socket.should_reconnect(5999.0));
        assert!(socket.should_reconnect(6000.0));
        // Only once per close
        assert!(!socket.should_reconnect(20_000.0));
        assert_eq!(socket.state(), ConnectionState::Connecting);
    }

    #[test]
    fn test_new_socket_connects_immediately() {
        let mut socket: Socket<MemoryTransport> = Socket::new(5000.0);
        assert!(socket.should_reconnect(0.0));
    }

    #[test]
    fn test_replacing_transport_closes_old() {
        let (mut socket, old) = open_socket();
        socket.connect_with(MemoryTransport::new());
        assert!(!old.is_open());
    }
}
