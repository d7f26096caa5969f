//! Keyboard state
//!
//! The platform layer feeds raw `KeyboardEvent.key` strings in; the game
//! reads them back as movement, menu presses and developer shortcuts.

use std::collections::HashMap;

use glam::Vec2;

use crate::consts::DEV_COMMAND_COOLDOWN_MS;

/// Shortcut keys and the console command each one runs
const DEV_SHORTCUTS: [(&[&str], &str); 3] = [
    (&["1"], "debug"),
    (&["2"], "spawn 0 600 100 0"),
    (&["p", "P"], "spawn 1 540 100 0"),
];

/// Input commands for a single simulation tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Movement direction for the local player (`w/a/s/d`)
    pub steering: Option<Vec2>,
    /// Escape was pressed since the last tick
    pub escape: bool,
    /// Developer shortcut that passed the cooldown
    pub dev_command: Option<&'static str>,
}

#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down
    pressed: HashMap<String, bool>,
    /// Presses waiting for the next menu tick
    cached: HashMap<String, bool>,
    escape_pending: bool,
    last_dev_command: f64,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Menus poll at a slower rate than keys arrive, so
    /// presses made while a menu is open are also cached until consumed.
    pub fn key_down(&mut self, key: &str, cache_for_menu: bool) {
        self.pressed.insert(key.to_string(), true);
        if cache_for_menu {
            self.cached.insert(key.to_string(), true);
        }
        if key == "Escape" {
            self.escape_pending = true;
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.pressed.insert(key.to_string(), false);
    }

    pub fn is_pressed(&self, key: &str) -> bool {
        self.pressed.get(key).copied().unwrap_or(false)
    }

    /// Consume a cached menu press of any of `keys`
    pub fn take_cached(&mut self, keys: &[&str]) -> bool {
        let mut hit = false;
        for key in keys {
            if let Some(flag) = self.cached.get_mut(*key) {
                hit |= *flag;
                *flag = false;
            }
        }
        hit
    }

    pub fn clear_cached(&mut self) {
        self.cached.clear();
    }

    /// Consume a pending Escape press
    pub fn take_escape(&mut self) -> bool {
        std::mem::take(&mut self.escape_pending)
    }

    /// Unnormalized `w/a/s/d` direction, `None` when no movement key is held
    pub fn movement(&self) -> Option<Vec2> {
        let mut dir = Vec2::ZERO;
        if self.is_pressed("w") {
            dir.y -= 1.0;
        }
        if self.is_pressed("s") {
            dir.y += 1.0;
        }
        if self.is_pressed("a") {
            dir.x -= 1.0;
        }
        if self.is_pressed("d") {
            dir.x += 1.0;
        }
        (dir != Vec2::ZERO).then_some(dir)
    }

    /// Developer shortcut held this frame, at most one per cooldown window
    pub fn dev_command(&mut self, timestamp: f64) -> Option<&'static str> {
        if timestamp - self.last_dev_command <= DEV_COMMAND_COOLDOWN_MS {
            return None;
        }
        let (keys, command) = DEV_SHORTCUTS
            .iter()
            .find(|(keys, _)| keys.iter().any(|k| self.is_pressed(k)))?;
        self.last_dev_command = timestamp;
        // Toggles fire once per press
        if *command == "debug" {
            for key in *keys {
                self.key_up(key);
            }
        }
        Some(command)
    }

    /// Collect this tick's commands
    pub fn sample(&mut self, timestamp: f64) -> TickInput {
        TickInput {
            steering: self.movement(),
            escape: self.take_escape(),
            dev_command: self.dev_command(timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movement_from_wasd() {
        let mut input = InputState::new();
        assert_eq!(input.movement(), None);

        input.key_down("w", false);
        input.key_down("d", false);
        assert_eq!(input.movement(), Some(Vec2::new(1.0, -1.0)));

        input.key_up("w");
        input.key_up("d");
        assert_eq!(input.movement(), None);
    }

    #[test]
    fn test_menu_presses_are_cached_until_taken() {
        let mut input = InputState::new();
        input.key_down("j", true);
        input.key_up("j");

        assert!(input.take_cached(&["s", "j"]));
        assert!(!input.take_cached(&["s", "j"]));
    }

    #[test]
    fn test_presses_outside_menu_are_not_cached() {
        let mut input = InputState::new();
        input.key_down("Enter", false);
        assert!(!input.take_cached(&["Enter"]));
    }

    #[test]
    fn test_escape_is_edge_triggered() {
        let mut input = InputState::new();
        input.key_down("Escape", false);
        assert!(input.sample(0.0).escape);
        assert!(!input.sample(16.0).escape);
    }

    #[test]
    fn test_dev_shortcut_cooldown() {
        let mut input = InputState::new();
        input.key_down("2", false);

        // Nothing within the first cooldown window
        assert_eq!(input.dev_command(1500.0), None);
        assert_eq!(input.dev_command(2001.0), Some("spawn 0 600 100 0"));
        assert_eq!(input.dev_command(3000.0), None);
        assert_eq!(input.dev_command(4002.0), Some("spawn 0 600 100 0"));
    }

    #[test]
    fn test_debug_shortcut_fires_once_per_press() {
        let mut input = InputState::new();
        input.key_down("1", false);
        assert_eq!(input.dev_command(2500.0), Some("debug"));
        assert_eq!(input.dev_command(5000.0), None);
    }
}
