//! Client settings
//!
//! Persisted in LocalStorage on the web; natively the defaults are used.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::entity::Bounds;

/// Client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Network ===
    /// Game server websocket endpoint
    pub server_url: String,
    /// HTTP API serving lobby and player listings
    pub api_url: String,
    /// Token sent in the `Auth` frame once the socket opens
    pub jwt: Option<String>,
    /// Delay before reconnecting a closed socket (ms)
    pub reconnect_delay_ms: f64,
    /// Keepalive cadence (ms)
    pub heartbeat_interval_ms: f64,
    /// Listing refetch cadence while a lobby menu is shown (ms)
    pub listing_poll_interval_ms: f64,
    /// Silence after which a mirrored player is dropped (ms)
    pub remote_player_timeout_ms: f64,

    // === Simulation ===
    pub canvas_width: f32,
    pub canvas_height: f32,
    /// Fixed simulation tick (ms)
    pub sim_interval_ms: f64,
    /// Menu polling cadence (ms)
    pub menu_input_interval_ms: f64,
    /// Size of the entity identity pool
    pub entity_capacity: usize,
    /// Player bullets allowed in flight
    pub max_bullets: usize,
    /// RNG seed; `None` picks one at startup
    pub seed: Option<u64>,

    // === HUD / debugging ===
    pub show_fps: bool,
    /// Start with collision outlines on
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "ws://localhost:3030/ws".to_string(),
            api_url: "http://localhost:3030".to_string(),
            jwt: None,
            reconnect_delay_ms: RECONNECT_DELAY_MS,
            heartbeat_interval_ms: HEARTBEAT_INTERVAL_MS,
            listing_poll_interval_ms: LISTING_POLL_INTERVAL_MS,
            remote_player_timeout_ms: REMOTE_PLAYER_TIMEOUT_MS,

            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            sim_interval_ms: SIM_INTERVAL_MS,
            menu_input_interval_ms: MENU_INPUT_INTERVAL_MS,
            entity_capacity: ENTITY_CAPACITY,
            max_bullets: MAX_BULLETS,
            seed: None,

            show_fps: true,
            debug: false,
        }
    }
}

impl Settings {
    pub fn bounds(&self) -> Bounds {
        Bounds {
            width: self.canvas_width,
            height: self.canvas_height,
        }
    }

    /// Replace values the game cannot run with by their defaults
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        let intervals = [
            ("reconnect_delay_ms", &mut self.reconnect_delay_ms, defaults.reconnect_delay_ms),
            ("heartbeat_interval_ms", &mut self.heartbeat_interval_ms, defaults.heartbeat_interval_ms),
            (
                "listing_poll_interval_ms",
                &mut self.listing_poll_interval_ms,
                defaults.listing_poll_interval_ms,
            ),
            (
                "remote_player_timeout_ms",
                &mut self.remote_player_timeout_ms,
                defaults.remote_player_timeout_ms,
            ),
            ("sim_interval_ms", &mut self.sim_interval_ms, defaults.sim_interval_ms),
            (
                "menu_input_interval_ms",
                &mut self.menu_input_interval_ms,
                defaults.menu_input_interval_ms,
            ),
        ];
        for (name, value, default) in intervals {
            if !(value.is_finite() && *value > 0.0) {
                log::warn!("Invalid {} ({}), using {}", name, value, default);
                *value = default;
            }
        }

        if !(1..=MAX_ENTITY_CAPACITY).contains(&self.entity_capacity) {
            let capacity = self.entity_capacity.clamp(1, MAX_ENTITY_CAPACITY);
            log::warn!(
                "Entity capacity {} out of range, using {}",
                self.entity_capacity,
                capacity
            );
            self.entity_capacity = capacity;
        }

        for (name, value, default) in [
            ("canvas_width", &mut self.canvas_width, defaults.canvas_width),
            ("canvas_height", &mut self.canvas_height, defaults.canvas_height),
        ] {
            if !(value.is_finite() && *value > 0.0) {
                log::warn!("Invalid {} ({}), using {}", name, value, default);
                *value = default;
            }
        }
        self
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "starblazers_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY)
        {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from LocalStorage");
                    return Self::validated(settings);
                }
                Err(e) => log::warn!("Ignoring stored settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage
            && let Ok(json) = serde_json::to_string(self)
        {
            let _ = storage.set_item(Self::STORAGE_KEY, &json);
            log::info!("Settings saved");
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
