//! Entity registry
//!
//! Sole owner of live entities, keyed by an identity drawn from a bounded
//! free list. Everything else refers to entities by [`EntityId`] and must
//! tolerate a lookup coming back empty.

use std::collections::BTreeMap;

use super::entity::{Bounds, Entity, EntityEvent, EntityId, EntityKind};
use crate::error::RegistryError;

pub struct EntityRegistry {
    /// Ordered by id so iteration is stable between runs
    entities: BTreeMap<EntityId, Entity>,
    /// Free identities, next one on top
    free_ids: Vec<EntityId>,
    capacity: usize,
    bounds: Bounds,
}

impl EntityRegistry {
    /// Pool of `capacity` identities, capped at `u32::MAX` ids
    pub fn new(capacity: usize, bounds: Bounds) -> Self {
        let capacity = capacity.min(u32::MAX as usize);
        Self {
            entities: BTreeMap::new(),
            free_ids: (0..capacity as u32).rev().map(EntityId).collect(),
            capacity,
            bounds,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Identities still available
    pub fn free_count(&self) -> usize {
        self.free_ids.len()
    }

    /// Assign an identity and take ownership of the entity
    pub fn register(&mut self, mut entity: Entity) -> Result<EntityId, RegistryError> {
        let id = self.free_ids.pop().ok_or(RegistryError::Exhausted {
            capacity: self.capacity,
        })?;
        entity.assign_id(id);
        log::debug!("Registered entity {} ({})", id, entity.kind().as_str());
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Handle a request raised by an entity.
    ///
    /// For [`EntityEvent::Fire`] the shooter builds a bullet which is registered
    /// here, unless the shooter already has its cap of bullets in flight.
    /// Returns the new bullet's id, if one was spawned.
    pub fn notify(
        &mut self,
        source: EntityId,
        event: EntityEvent,
    ) -> Result<Option<EntityId>, RegistryError> {
        match event {
            EntityEvent::Fire => {
                let Some(shooter) = self.entities.get(&source) else {
                    log::warn!("Fire requested by unknown entity {}", source);
                    return Ok(None);
                };
                if !shooter.is_active() {
                    return Ok(None);
                }
                let Some(cap) = shooter.bullet_cap() else {
                    return Ok(None);
                };
                if self.count_bullets_by_shooter(source) >= cap {
                    return Ok(None);
                }
                match shooter.new_bullet(self.bounds) {
                    Some(bullet) => self.register(bullet).map(Some),
                    None => Ok(None),
                }
            }
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Snapshot of every live id, for passes that mutate while iterating
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// All live entities of one kind
    pub fn query_by_kind(&self, kind: EntityKind) -> Vec<&Entity> {
        self.entities.values().filter(|e| e.kind() == kind).collect()
    }

    pub fn ids_by_kind(&self, kind: EntityKind) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.kind() == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn players(&self) -> Vec<&Entity> {
        self.query_by_kind(EntityKind::Player)
    }

    /// Regular and slow shooting aliens
    pub fn enemies(&self) -> Vec<&Entity> {
        self.entities.values().filter(|e| e.kind().is_enemy()).collect()
    }

    pub fn bullets(&self) -> Vec<&Entity> {
        self.query_by_kind(EntityKind::Bullet)
    }

    /// Bullets fired by `shooter` that are still registered
    pub fn bullets_by_shooter(&self, shooter: EntityId) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| e.shooter_id() == Some(shooter))
            .collect()
    }

    pub fn count_bullets_by_shooter(&self, shooter: EntityId) -> usize {
        self.entities
            .values()
            .filter(|e| e.shooter_id() == Some(shooter))
            .count()
    }

    /// Player entity carrying a given server player id
    pub fn find_player(&self, player_id: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, e)| e.as_player().is_some_and(|p| p.player_id == player_id))
            .map(|(id, _)| *id)
    }

    /// Remove inactive entities and return their ids to the pool
    pub fn cleanup(&mut self) -> Vec<EntityId> {
        let dead: Vec<EntityId> = self
            .entities
            .iter()
            .filter(|(_, e)| !e.is_active())
            .map(|(id, _)| *id)
            .collect();

        for id in &dead {
            if let Some(entity) = self.entities.remove(id) {
                log::debug!("Removed entity {} ({})", id, entity.kind().as_str());
            }
            self.free_ids.push(*id);
        }
        dead
    }

    /// Drop everything and refill the pool
    pub fn clear(&mut self) {
        self.entities.clear();
        self.free_ids = (0..self.capacity as u32).rev().map(EntityId).collect();
    }
}
