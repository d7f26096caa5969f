//! Browser WebSocket transport

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use super::socket::Transport;
use crate::error::SocketError;

/// Callbacks the browser invokes between animation frames
pub struct SocketHandlers {
    pub on_open: Box<dyn FnMut()>,
    pub on_message: Box<dyn FnMut(String)>,
    pub on_close: Box<dyn FnMut()>,
}

pub struct WebTransport {
    ws: WebSocket,
    // Kept alive for as long as the socket may call them
    _on_open: Closure<dyn FnMut(web_sys::Event)>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
    _on_error: Closure<dyn FnMut(ErrorEvent)>,
}

impl WebTransport {
    pub fn connect(url: &str, handlers: SocketHandlers) -> Result<Self, SocketError> {
        let ws = WebSocket::new(url).map_err(|e| SocketError::Connect(format!("{:?}", e)))?;
        let SocketHandlers {
            mut on_open,
            mut on_message,
            mut on_close,
        } = handlers;

        let open = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| on_open());
        ws.set_onopen(Some(open.as_ref().unchecked_ref()));

        let message = Closure::<dyn FnMut(_)>::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => on_message(text),
                None => log::warn!("Ignoring non-text websocket frame"),
            }
        });
        ws.set_onmessage(Some(message.as_ref().unchecked_ref()));

        let close = Closure::<dyn FnMut(_)>::new(move |event: CloseEvent| {
            log::info!(
                "WebSocket connection closed ({}: {})",
                event.code(),
                event.reason()
            );
            on_close();
        });
        ws.set_onclose(Some(close.as_ref().unchecked_ref()));

        let error = Closure::<dyn FnMut(_)>::new(move |event: ErrorEvent| {
            log::error!("WebSocket error: {}", event.message());
        });
        ws.set_onerror(Some(error.as_ref().unchecked_ref()));

        log::info!("Connecting to {}", url);
        Ok(Self {
            ws,
            _on_open: open,
            _on_message: message,
            _on_close: close,
            _on_error: error,
        })
    }
}

impl Transport for WebTransport {
    fn is_open(&self) -> bool {
        self.ws.ready_state() == WebSocket::OPEN
    }

    fn send_text(&mut self, text: &str) -> Result<(), SocketError> {
        self.ws
            .send_with_str(text)
            .map_err(|e| SocketError::Send(format!("{:?}", e)))
    }

    fn close(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onclose(None);
        self.ws.set_onerror(None);
        let _ = self.ws.close();
    }
}
