//! Star Blazers - a 2D arcade shooter client
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (entities, registry, collisions, cadence)
//! - `net`: Socket protocol and server session reconciliation
//! - `menu`: Menu screens and navigation
//! - `game`: Orchestrator that wires everything together each frame
//! - `renderer`: Vertex draw list and WebGPU pipeline
//! - `settings`: Persisted client configuration

pub mod dev_console;
pub mod error;
pub mod game;
pub mod input;
pub mod menu;
pub mod net;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{GameError, ProtocolError, RegistryError, SocketError};
pub use game::{Game, GameState};
pub use renderer::DebugContext;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Logical canvas size in pixels
    pub const CANVAS_WIDTH: f32 = 1280.0;
    pub const CANVAS_HEIGHT: f32 = 800.0;

    /// Simulation tick interval (60 Hz)
    pub const SIM_INTERVAL_MS: f64 = 1000.0 / 60.0;
    /// Menus are polled much slower than the simulation
    pub const MENU_INPUT_INTERVAL_MS: f64 = 100.0;
    /// Keepalive cadence for the socket
    pub const HEARTBEAT_INTERVAL_MS: f64 = 5000.0;
    /// Fixed delay before reconnecting a closed socket
    pub const RECONNECT_DELAY_MS: f64 = 5000.0;
    /// Minimum time between two developer shortcut commands
    pub const DEV_COMMAND_COOLDOWN_MS: f64 = 2000.0;
    /// Lobby and player listings are refetched this often while shown
    pub const LISTING_POLL_INTERVAL_MS: f64 = 3000.0;
    /// A remote player silent for this long is dropped
    pub const REMOTE_PLAYER_TIMEOUT_MS: f64 = 10_000.0;

    /// Size of the entity identity pool
    pub const ENTITY_CAPACITY: usize = 1000;
    /// Largest pool a settings file may ask for
    pub const MAX_ENTITY_CAPACITY: usize = 65_536;
    /// Player bullets allowed in flight at once
    pub const MAX_BULLETS: usize = 10;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const PLAYER_FIRE_RATE: u32 = 5;
    pub const PLAYER_HIT_POINTS: u8 = 3;
    pub const PLAYER_HALF_WIDTH: f32 = 10.0;
    pub const PLAYER_HEIGHT: f32 = 20.0;
    /// Spawn height above the bottom edge
    pub const PLAYER_SPAWN_OFFSET: f32 = 30.0;

    /// Alien defaults
    pub const ALIEN_RADIUS: f32 = 10.0;
    pub const ALIEN_X_VELOCITY: f32 = 30.0;
    pub const ALIEN_DROP: f32 = 30.0;

    /// Slow shooting alien defaults (sprite is 136 px wide)
    pub const SHOOTER_RADIUS: f32 = 68.0;
    pub const SHOOTER_X_VELOCITY: f32 = 10.0;
    pub const SHOOTER_FIRE_RATE: u32 = 30;
    pub const SHOOTER_MAX_BULLETS: usize = 10;
    pub const SHOOTER_HIT_POINTS: u8 = 10;
    pub const SHOOTER_BULLET_SPEED: f32 = 3.0;
    /// Chance a due shot is taken; the default always fires
    pub const SHOOTER_FIRE_CHANCE: f64 = 1.0;
    /// Cycles the damaged sprite stays visible
    pub const DAMAGE_FLASH_CYCLES: u32 = 20;

    /// Bullet defaults
    pub const BULLET_WIDTH: f32 = 5.0;
    pub const BULLET_HEIGHT: f32 = 10.0;
    pub const PLAYER_BULLET_SPEED: f32 = 10.0;
}
