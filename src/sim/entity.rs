//! Entity variants and their per-tick behaviour
//!
//! Every simulated object is an [`Entity`]: a few shared fields plus a closed
//! [`EntityBody`] holding the variant-specific state. Dispatch happens on the
//! [`EntityKind`] tag, so adding a variant forces every `match` to be revisited.

use std::fmt;

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::shape::{Circle, Rect, Shape};
use crate::consts::*;
use crate::renderer::vertex::colors;
use crate::renderer::{Canvas, DebugContext};

/// Registry-assigned identity, unique among live entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discriminator for the concrete entity variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Alien,
    SlowShootingAlien,
    Bullet,
    Player,
}

impl EntityKind {
    /// Numeric kind ids used by the developer console
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(EntityKind::Alien),
            1 => Some(EntityKind::SlowShootingAlien),
            2 => Some(EntityKind::Bullet),
            3 => Some(EntityKind::Player),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Alien => "Alien",
            EntityKind::SlowShootingAlien => "SlowShootingAlien",
            EntityKind::Bullet => "Bullet",
            EntityKind::Player => "Player",
        }
    }

    /// Aliens of any flavour
    pub fn is_enemy(&self) -> bool {
        matches!(self, EntityKind::Alien | EntityKind::SlowShootingAlien)
    }
}

/// Requests an entity can raise towards the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityEvent {
    Fire,
}

/// Vertical travel direction of a bullet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Up => -1.0,
            Direction::Down => 1.0,
        }
    }
}

/// Play area dimensions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        }
    }
}

/// Everything an entity may read while updating
pub struct UpdateContext<'a> {
    pub bounds: Bounds,
    /// Bullets this entity currently has in flight
    pub bullets_in_flight: usize,
    /// Movement input, only set for the locally controlled player
    pub steering: Option<Vec2>,
    pub rng: &'a mut Pcg32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlienState {
    pub x_velocity: f32,
    pub move_down: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShooterState {
    pub x_velocity: f32,
    pub move_down: bool,
    pub cycle: u32,
    pub radius: f32,
    pub hit_points: u8,
    /// Cycle at which the damage flash started
    pub damage_frame: Option<u32>,
    /// Probability of actually firing when the fire window opens
    pub fire_chance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulletState {
    /// Entity that fired this bullet (not owned)
    pub shooter_id: EntityId,
    pub direction: Direction,
    pub color: [f32; 4],
    pub min_y: f32,
    pub max_y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    /// Server-side player identifier
    pub player_id: String,
    pub fire_rate: u32,
    pub cycles: u32,
    pub hit_points: u8,
    pub max_bullets: usize,
    /// Mirrored from the server, never driven by local input
    pub remote: bool,
}

/// Variant-specific entity state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EntityBody {
    Alien(AlienState),
    SlowShootingAlien(ShooterState),
    Bullet(BulletState),
    Player(PlayerState),
}

/// A simulated game object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    id: Option<EntityId>,
    pub position: Vec2,
    pub speed: f32,
    active: bool,
    /// Outline this entity even when global debug drawing is off
    debug: bool,
    body: EntityBody,
}

impl Entity {
    fn with_body(position: Vec2, speed: f32, body: EntityBody) -> Self {
        Self {
            id: None,
            position,
            speed,
            active: true,
            debug: false,
            body,
        }
    }

    pub fn alien(position: Vec2, speed: f32) -> Self {
        Self::with_body(
            position,
            speed,
            EntityBody::Alien(AlienState {
                x_velocity: ALIEN_X_VELOCITY,
                move_down: false,
            }),
        )
    }

    /// `position` is the top-left corner of the sprite box
    pub fn slow_shooting_alien(position: Vec2, speed: f32) -> Self {
        Self::with_body(
            position,
            speed,
            EntityBody::SlowShootingAlien(ShooterState {
                x_velocity: SHOOTER_X_VELOCITY,
                move_down: false,
                cycle: 0,
                radius: SHOOTER_RADIUS,
                hit_points: SHOOTER_HIT_POINTS,
                damage_frame: None,
                fire_chance: SHOOTER_FIRE_CHANCE,
            }),
        )
    }

    pub fn player(position: Vec2, player_id: impl Into<String>, max_bullets: usize) -> Self {
        Self::with_body(
            position,
            PLAYER_SPEED,
            EntityBody::Player(PlayerState {
                player_id: player_id.into(),
                fire_rate: PLAYER_FIRE_RATE,
                cycles: 0,
                hit_points: PLAYER_HIT_POINTS,
                max_bullets,
                remote: false,
            }),
        )
    }

    /// Player mirrored from another client
    pub fn remote_player(position: Vec2, player_id: impl Into<String>) -> Self {
        let mut entity = Self::player(position, player_id, 0);
        if let EntityBody::Player(player) = &mut entity.body {
            player.remote = true;
        }
        entity
    }

    pub fn bullet(
        position: Vec2,
        speed: f32,
        direction: Direction,
        color: [f32; 4],
        shooter_id: EntityId,
        bounds: Bounds,
    ) -> Self {
        Self::with_body(
            position,
            speed,
            EntityBody::Bullet(BulletState {
                shooter_id,
                direction,
                color,
                min_y: 0.0,
                max_y: bounds.height,
            }),
        )
    }

    /// Identity assigned at registration.
    ///
    /// Panics when called on an entity that was never registered.
    pub fn id(&self) -> EntityId {
        match self.id {
            Some(id) => id,
            None => panic!("entity id read before registration ({:?})", self.kind()),
        }
    }

    pub fn try_id(&self) -> Option<EntityId> {
        self.id
    }

    pub(crate) fn assign_id(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    pub fn kind(&self) -> EntityKind {
        match &self.body {
            EntityBody::Alien(_) => EntityKind::Alien,
            EntityBody::SlowShootingAlien(_) => EntityKind::SlowShootingAlien,
            EntityBody::Bullet(_) => EntityKind::Bullet,
            EntityBody::Player(_) => EntityKind::Player,
        }
    }

    pub fn body(&self) -> &EntityBody {
        &self.body
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn enable_debug(&mut self) {
        self.debug = true;
    }

    /// Mark for removal on the next cleanup pass
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn as_bullet(&self) -> Option<&BulletState> {
        match &self.body {
            EntityBody::Bullet(bullet) => Some(bullet),
            _ => None,
        }
    }

    pub fn as_player(&self) -> Option<&PlayerState> {
        match &self.body {
            EntityBody::Player(player) => Some(player),
            _ => None,
        }
    }

    /// Shooter of this bullet, if it is one
    pub fn shooter_id(&self) -> Option<EntityId> {
        self.as_bullet().map(|b| b.shooter_id)
    }

    /// Collision shape derived from the current position
    pub fn shape(&self) -> Shape {
        match &self.body {
            EntityBody::Alien(_) => Shape::Circle(Circle::new(self.position, ALIEN_RADIUS)),
            EntityBody::SlowShootingAlien(shooter) => Shape::Circle(Circle::new(
                self.position + Vec2::splat(shooter.radius),
                shooter.radius,
            )),
            EntityBody::Bullet(_) => Shape::Rect(Rect::new(
                self.position.x,
                self.position.y,
                BULLET_WIDTH,
                BULLET_HEIGHT,
            )),
            EntityBody::Player(_) => Shape::Rect(Rect::new(
                self.position.x - PLAYER_HALF_WIDTH,
                self.position.y,
                PLAYER_HALF_WIDTH * 2.0,
                PLAYER_HEIGHT,
            )),
        }
    }

    /// Maximum bullets this entity may have in flight, if it shoots at all
    pub fn bullet_cap(&self) -> Option<usize> {
        match &self.body {
            EntityBody::SlowShootingAlien(_) => Some(SHOOTER_MAX_BULLETS),
            EntityBody::Player(player) if !player.remote => Some(player.max_bullets),
            _ => None,
        }
    }

    /// Advance one tick. Returns an event for the registry to act upon.
    pub fn update(&mut self, ctx: &mut UpdateContext<'_>) -> Option<EntityEvent> {
        if !self.active {
            return None;
        }

        let speed = self.speed;
        let position = &mut self.position;
        match &mut self.body {
            EntityBody::Alien(alien) => {
                march(position, speed, &mut alien.x_velocity, &mut alien.move_down, 0.0, ctx.bounds);
                None
            }
            EntityBody::SlowShootingAlien(shooter) => {
                let width = shooter.radius * 2.0;
                march(
                    position,
                    speed,
                    &mut shooter.x_velocity,
                    &mut shooter.move_down,
                    width,
                    ctx.bounds,
                );

                if let Some(frame) = shooter.damage_frame
                    && shooter.cycle.saturating_sub(frame) >= DAMAGE_FLASH_CYCLES
                {
                    shooter.damage_frame = None;
                }

                let fire = ctx.bullets_in_flight < SHOOTER_MAX_BULLETS
                    && shooter.cycle % SHOOTER_FIRE_RATE == 0
                    && ctx.rng.random::<f64>() < shooter.fire_chance;
                shooter.cycle += 1;
                fire.then_some(EntityEvent::Fire)
            }
            EntityBody::Bullet(bullet) => {
                position.y += bullet.direction.sign() * speed;
                if position.y < bullet.min_y || position.y > bullet.max_y {
                    self.active = false;
                }
                None
            }
            EntityBody::Player(player) => {
                if player.remote {
                    return None;
                }

                let fire = ctx.bullets_in_flight < player.max_bullets
                    && player.cycles % player.fire_rate == 0;

                if let Some(steering) = ctx.steering {
                    *position += steering * speed;
                }
                position.x = position.x.clamp(0.0, ctx.bounds.width);
                position.y = position.y.clamp(0.0, ctx.bounds.height);

                player.cycles += 1;
                fire.then_some(EntityEvent::Fire)
            }
        }
    }

    /// Build the bullet this entity fires, unregistered.
    ///
    /// Only available once the shooter itself has been registered.
    pub fn new_bullet(&self, bounds: Bounds) -> Option<Entity> {
        let shooter_id = self.try_id()?;
        match &self.body {
            EntityBody::Player(player) if !player.remote => Some(Entity::bullet(
                Vec2::new(self.position.x - BULLET_WIDTH / 2.0, self.position.y),
                PLAYER_BULLET_SPEED,
                Direction::Up,
                colors::EFFECT,
                shooter_id,
                bounds,
            )),
            EntityBody::SlowShootingAlien(shooter) => {
                let center = self.position + Vec2::splat(shooter.radius);
                Some(Entity::bullet(
                    Vec2::new(center.x - BULLET_WIDTH / 2.0, center.y),
                    SHOOTER_BULLET_SPEED,
                    Direction::Down,
                    colors::ENEMY_BULLET,
                    shooter_id,
                    bounds,
                ))
            }
            _ => None,
        }
    }

    /// Apply one hit from a bullet
    pub fn take_hit(&mut self) {
        match &mut self.body {
            EntityBody::Alien(_) | EntityBody::Bullet(_) => self.active = false,
            EntityBody::SlowShootingAlien(shooter) => {
                shooter.hit_points = shooter.hit_points.saturating_sub(1);
                shooter.damage_frame = Some(shooter.cycle);
                if shooter.hit_points == 0 {
                    self.active = false;
                }
            }
            EntityBody::Player(player) => {
                player.hit_points = player.hit_points.saturating_sub(1);
                if player.hit_points == 0 {
                    self.active = false;
                }
            }
        }
    }

    /// Set a tunable property by name (developer console)
    pub fn set_property(&mut self, property: &str, value: f32) -> bool {
        match property {
            "speed" => {
                self.speed = value;
                true
            }
            "x" => {
                self.position.x = value;
                true
            }
            "y" => {
                self.position.y = value;
                true
            }
            "fire_chance" => match &mut self.body {
                EntityBody::SlowShootingAlien(shooter) => {
                    shooter.fire_chance = f64::from(value.clamp(0.0, 1.0));
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Overwrite a mirrored player's position from a server frame
    pub(crate) fn sync_remote_position(&mut self, position: Vec2) {
        if matches!(&self.body, EntityBody::Player(p) if p.remote) {
            self.position = position;
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, debug: DebugContext) {
        match &self.body {
            EntityBody::Alien(_) => {
                canvas.circle(self.position, ALIEN_RADIUS, colors::SECONDARY);
            }
            EntityBody::SlowShootingAlien(shooter) => {
                let color = if shooter.damage_frame.is_some() {
                    colors::SHOOTER_DAMAGED
                } else {
                    colors::SHOOTER
                };
                canvas.circle(self.position + Vec2::splat(shooter.radius), shooter.radius, color);
            }
            EntityBody::Bullet(bullet) => {
                canvas.rect(
                    Rect::new(self.position.x, self.position.y, BULLET_WIDTH, BULLET_HEIGHT),
                    bullet.color,
                );
            }
            EntityBody::Player(player) => {
                let color = if player.remote {
                    colors::REMOTE_PLAYER
                } else {
                    colors::PRIMARY
                };
                let p = self.position;
                canvas.triangle(
                    p,
                    Vec2::new(p.x - PLAYER_HALF_WIDTH, p.y + PLAYER_HEIGHT),
                    Vec2::new(p.x + PLAYER_HALF_WIDTH, p.y + PLAYER_HEIGHT),
                    color,
                );
            }
        }

        if debug.enabled || self.debug {
            self.draw_debug(canvas);
        }
    }

    /// Outline the collision shape
    pub fn draw_debug(&self, canvas: &mut Canvas) {
        match self.shape() {
            Shape::Circle(circle) => canvas.ring(circle.center, circle.radius, 1.0, colors::DEBUG),
            Shape::Rect(rect) => canvas.rect_outline(rect, 1.0, colors::DEBUG),
        }
    }
}

/// Shared alien march: sideways until an edge, then drop and turn around
fn march(
    position: &mut Vec2,
    speed: f32,
    x_velocity: &mut f32,
    move_down: &mut bool,
    width: f32,
    bounds: Bounds,
) {
    if *move_down {
        position.y += ALIEN_DROP;
        *x_velocity = -*x_velocity;
        *move_down = false;
    } else {
        position.x += speed * *x_velocity;
    }

    if (position.x <= 0.0 && *x_velocity < 0.0)
        || (position.x + width >= bounds.width && *x_velocity > 0.0)
    {
        *move_down = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn ctx(rng: &mut Pcg32) -> UpdateContext<'_> {
        UpdateContext {
            bounds: Bounds::default(),
            bullets_in_flight: 0,
            steering: None,
            rng,
        }
    }

    #[test]
    #[should_panic(expected = "before registration")]
    fn test_unregistered_id_panics() {
        let alien = Entity::alien(Vec2::ZERO, 1.0);
        let _ = alien.id();
    }

    #[test]
    fn test_kind_is_fixed_by_constructor() {
        assert_eq!(Entity::alien(Vec2::ZERO, 1.0).kind(), EntityKind::Alien);
        assert_eq!(
            Entity::slow_shooting_alien(Vec2::ZERO, 1.0).kind(),
            EntityKind::SlowShootingAlien
        );
        assert_eq!(Entity::player(Vec2::ZERO, "p", 10).kind(), EntityKind::Player);
    }

    #[test]
    fn test_alien_drops_and_turns_at_edge() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut alien = Entity::alien(Vec2::new(CANVAS_WIDTH - 1.0, 30.0), 0.1);

        // 0.1 * 30 = 3px step crosses the right edge
        alien.update(&mut ctx(&mut rng));
        assert!((alien.position.x - (CANVAS_WIDTH + 2.0)).abs() < 1e-3);

        // Next tick drops instead of moving sideways
        alien.update(&mut ctx(&mut rng));
        assert_eq!(alien.position.y, 60.0);
        match alien.body() {
            EntityBody::Alien(state) => assert!(state.x_velocity < 0.0),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_bullet_leaves_bounds() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut bullet = Entity::bullet(
            Vec2::new(10.0, 5.0),
            10.0,
            Direction::Up,
            colors::EFFECT,
            EntityId(0),
            Bounds::default(),
        );
        bullet.update(&mut ctx(&mut rng));
        assert!(!bullet.is_active());
    }

    #[test]
    fn test_player_fires_on_cadence_under_cap() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut player = Entity::player(Vec2::new(100.0, 700.0), "p", 2);

        let mut fired = 0;
        for _ in 0..PLAYER_FIRE_RATE * 2 {
            if player.update(&mut ctx(&mut rng)).is_some() {
                fired += 1;
            }
        }
        assert_eq!(fired, 2);

        let mut full = UpdateContext {
            bullets_in_flight: 2,
            ..ctx(&mut rng)
        };
        // cycle 10 is a fire cycle, but the cap is reached
        assert_eq!(player.update(&mut full), None);
    }

    #[test]
    fn test_player_steering_is_clamped() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut player = Entity::player(Vec2::new(2.0, 2.0), "p", 10);
        let mut c = UpdateContext {
            steering: Some(Vec2::new(-1.0, -1.0)),
            ..ctx(&mut rng)
        };
        player.update(&mut c);
        assert_eq!(player.position, Vec2::ZERO);
    }

    #[test]
    fn test_remote_player_ignores_input() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut remote = Entity::remote_player(Vec2::new(50.0, 50.0), "other");
        let mut c = UpdateContext {
            steering: Some(Vec2::new(1.0, 0.0)),
            ..ctx(&mut rng)
        };
        assert_eq!(remote.update(&mut c), None);
        assert_eq!(remote.position, Vec2::new(50.0, 50.0));
        assert_eq!(remote.bullet_cap(), None);
    }

    #[test]
    fn test_shooter_damage_flash_and_death() {
        let mut shooter = Entity::slow_shooting_alien(Vec2::new(100.0, 100.0), 0.0);
        shooter.take_hit();
        match shooter.body() {
            EntityBody::SlowShootingAlien(s) => {
                assert_eq!(s.hit_points, SHOOTER_HIT_POINTS - 1);
                assert!(s.damage_frame.is_some());
            }
            other => panic!("unexpected body {:?}", other),
        }

        for _ in 1..SHOOTER_HIT_POINTS {
            shooter.take_hit();
        }
        assert!(!shooter.is_active());
    }

    #[test]
    fn test_shooter_flash_expires() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut shooter = Entity::slow_shooting_alien(Vec2::new(300.0, 100.0), 0.0);
        shooter.take_hit();
        for _ in 0..=DAMAGE_FLASH_CYCLES {
            shooter.update(&mut ctx(&mut rng));
        }
        match shooter.body() {
            EntityBody::SlowShootingAlien(s) => assert_eq!(s.damage_frame, None),
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_shooter_fire_chance_is_tunable() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut shooter = Entity::slow_shooting_alien(Vec2::new(300.0, 100.0), 0.0);
        assert!(shooter.set_property("fire_chance", 0.0));
        for _ in 0..SHOOTER_FIRE_RATE * 4 {
            assert_eq!(shooter.update(&mut ctx(&mut rng)), None);
        }

        assert!(shooter.set_property("fire_chance", 1.0));
        let fired = (0..SHOOTER_FIRE_RATE)
            .filter(|_| shooter.update(&mut ctx(&mut rng)).is_some())
            .count();
        assert_eq!(fired, 1);

        let mut alien = Entity::alien(Vec2::ZERO, 1.0);
        assert!(!alien.set_property("fire_chance", 0.5));
    }

    #[test]
    fn test_new_bullet_requires_registration() {
        let player = Entity::player(Vec2::new(100.0, 100.0), "p", 10);
        assert!(player.new_bullet(Bounds::default()).is_none());

        let mut player = player;
        player.assign_id(EntityId(4));
        let bullet = player.new_bullet(Bounds::default()).expect("player shoots");
        assert_eq!(bullet.shooter_id(), Some(EntityId(4)));
        assert_eq!(bullet.as_bullet().map(|b| b.direction), Some(Direction::Up));
    }

    #[test]
    fn test_player_rect_shape() {
        let player = Entity::player(Vec2::new(100.0, 200.0), "p", 10);
        assert_eq!(
            player.shape(),
            Shape::Rect(Rect::new(90.0, 200.0, 20.0, 20.0))
        );
    }
}
