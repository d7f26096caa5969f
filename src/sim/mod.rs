//! Simulation module
//!
//! Gameplay state that advances once per fixed tick:
//! - Entities owned by the registry, referenced elsewhere only by id
//! - Stable iteration order (by entity id)
//! - Seeded RNG only
//! - No rendering backend or platform dependencies

pub mod collision;
pub mod entity;
pub mod registry;
pub mod scheduler;
pub mod shape;
pub mod spawn;

pub use collision::{check_collision, circle_rect_collision, rect_rect_collision};
pub use entity::{
    Bounds, Direction, Entity, EntityBody, EntityEvent, EntityId, EntityKind, UpdateContext,
};
pub use registry::EntityRegistry;
pub use scheduler::{Throttle, TickScheduler};
pub use shape::{Circle, Rect, Shape};
pub use spawn::{SpawnHandler, SpawnRequest};
