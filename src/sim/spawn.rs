//! Entity factory
//!
//! Builds concrete entities and hands them straight to the registry. The
//! handler keeps no entities of its own; it only counts spawns so debug
//! commands have a human-readable sequence number.

use glam::Vec2;

use super::entity::{Entity, EntityId, EntityKind};
use super::registry::EntityRegistry;
use crate::error::RegistryError;

/// Alien grid laid out at the start of a run
pub const WAVE_ROWS: usize = 5;
pub const WAVE_COLUMNS: usize = 10;
pub const WAVE_ALIEN_SPEED: f32 = 0.1;

/// Arguments of a console `spawn` request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub kind: u32,
    pub x: f32,
    pub y: f32,
    pub speed: f32,
}

impl SpawnRequest {
    /// Parse `kind [x] [y] [speed]`, defaulting to (100, 100) and speed 1
    pub fn from_args(args: &[f32]) -> Option<Self> {
        let kind = *args.first()?;
        if kind < 0.0 || kind.fract() != 0.0 {
            return None;
        }
        Some(Self {
            kind: kind as u32,
            x: args.get(1).copied().unwrap_or(100.0),
            y: args.get(2).copied().unwrap_or(100.0),
            speed: args.get(3).copied().unwrap_or(1.0),
        })
    }
}

#[derive(Debug, Default)]
pub struct SpawnHandler {
    spawn_counter: u64,
}

impl SpawnHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of spawns requested so far
    pub fn spawn_counter(&self) -> u64 {
        self.spawn_counter
    }

    /// Next debug sequence number
    pub fn next_sequence(&mut self) -> u64 {
        self.spawn_counter += 1;
        self.spawn_counter
    }

    /// Spawn the locally controlled player
    pub fn spawn_player(
        &mut self,
        registry: &mut EntityRegistry,
        position: Vec2,
        player_id: &str,
        max_bullets: usize,
    ) -> Result<EntityId, RegistryError> {
        let seq = self.next_sequence();
        let id = registry.register(Entity::player(position, player_id, max_bullets))?;
        log::info!("Spawned player {} as entity {} (#{})", player_id, id, seq);
        Ok(id)
    }

    /// Spawn a player mirrored from the server
    pub fn spawn_remote_player(
        &mut self,
        registry: &mut EntityRegistry,
        position: Vec2,
        player_id: &str,
    ) -> Result<EntityId, RegistryError> {
        let seq = self.next_sequence();
        let id = registry.register(Entity::remote_player(position, player_id))?;
        log::info!("Spawned remote player {} as entity {} (#{})", player_id, id, seq);
        Ok(id)
    }

    /// Spawn by numeric kind id.
    ///
    /// Bullets cannot be spawned directly; they only come from a shooter's
    /// `Fire` notification. Returns `None` when nothing was spawned.
    pub fn spawn(
        &mut self,
        registry: &mut EntityRegistry,
        request: SpawnRequest,
    ) -> Result<Option<EntityId>, RegistryError> {
        let seq = self.next_sequence();
        let position = Vec2::new(request.x, request.y);

        let entity = match EntityKind::from_index(request.kind) {
            Some(EntityKind::Alien) => Entity::alien(position, request.speed),
            Some(EntityKind::SlowShootingAlien) => {
                Entity::slow_shooting_alien(position, request.speed)
            }
            Some(EntityKind::Bullet) => {
                log::warn!("Bullets are spawned by their shooter, ignoring spawn #{}", seq);
                return Ok(None);
            }
            Some(EntityKind::Player) | None => {
                log::warn!("Cannot spawn kind {} (#{})", request.kind, seq);
                return Ok(None);
            }
        };

        let id = registry.register(entity)?;
        log::info!(
            "Spawned {} as entity {} at ({}, {}) (#{})",
            EntityKind::from_index(request.kind).map_or("?", |k| k.as_str()),
            id,
            request.x,
            request.y,
            seq
        );
        Ok(Some(id))
    }

    /// Lay out the opening alien grid
    pub fn spawn_alien_wave(
        &mut self,
        registry: &mut EntityRegistry,
    ) -> Result<Vec<EntityId>, RegistryError> {
        let mut ids = Vec::with_capacity(WAVE_ROWS * WAVE_COLUMNS);
        for row in 0..WAVE_ROWS {
            for col in 0..WAVE_COLUMNS {
                let x = 50.0 + col as f32 * 100.0;
                let y = 30.0 + row as f32 * 60.0;
                self.next_sequence();
                ids.push(registry.register(Entity::alien(Vec2::new(x, y), WAVE_ALIEN_SPEED))?);
            }
        }
        log::info!("Spawned alien wave ({} aliens)", ids.len());
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Bounds;

    #[test]
    fn test_spawn_registers_immediately() {
        let mut reg = EntityRegistry::new(10, Bounds::default());
        let mut spawner = SpawnHandler::new();

        let req = SpawnRequest::from_args(&[0.0, 600.0, 100.0, 0.0]).unwrap();
        let id = spawner.spawn(&mut reg, req).unwrap().expect("alien");

        let alien = reg.get(id).unwrap();
        assert_eq!(alien.kind(), EntityKind::Alien);
        assert_eq!(alien.position, Vec2::new(600.0, 100.0));
        assert_eq!(spawner.spawn_counter(), 1);
    }

    #[test]
    fn test_spawn_bullet_kind_is_ignored() {
        let mut reg = EntityRegistry::new(10, Bounds::default());
        let mut spawner = SpawnHandler::new();
        let req = SpawnRequest::from_args(&[2.0]).unwrap();
        assert_eq!(spawner.spawn(&mut reg, req).unwrap(), None);
        assert!(reg.is_empty());
        // Still counted
        assert_eq!(spawner.spawn_counter(), 1);
    }

    #[test]
    fn test_spawn_request_defaults() {
        let req = SpawnRequest::from_args(&[1.0]).unwrap();
        assert_eq!(
            req,
            SpawnRequest {
                kind: 1,
                x: 100.0,
                y: 100.0,
                speed: 1.0
            }
        );
        assert!(SpawnRequest::from_args(&[]).is_none());
        assert!(SpawnRequest::from_args(&[-1.0]).is_none());
    }

    #[test]
    fn test_alien_wave_layout() {
        let mut reg = EntityRegistry::new(100, Bounds::default());
        let mut spawner = SpawnHandler::new();
        let ids = spawner.spawn_alien_wave(&mut reg).unwrap();

        assert_eq!(ids.len(), 50);
        assert_eq!(reg.query_by_kind(EntityKind::Alien).len(), 50);
        let last = reg.get(*ids.last().unwrap()).unwrap();
        assert_eq!(last.position, Vec2::new(950.0, 270.0));
    }

    #[test]
    fn test_wave_propagates_exhaustion() {
        let mut reg = EntityRegistry::new(20, Bounds::default());
        let mut spawner = SpawnHandler::new();
        assert!(spawner.spawn_alien_wave(&mut reg).is_err());
    }
}
