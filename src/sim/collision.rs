//! Collision detection between defenders and bullets
//!
//! Stateless: the result depends only on the two shapes. Dispatch is on the
//! defender's kind tag; bullets are always rectangles.

use glam::Vec2;

use super::entity::{Entity, EntityKind};
use super::shape::{Circle, Rect, Shape};

/// Does `bullet` hit `entity` this tick?
///
/// Aliens are circles, players are rectangles. A defender kind with no hit
/// test (a bullet) is logged and treated as a miss.
pub fn check_collision(entity: &Entity, bullet: &Entity) -> bool {
    let Shape::Rect(bullet_rect) = bullet.shape() else {
        log::error!("Collision checked against non-rectangular bullet {:?}", bullet.kind());
        return false;
    };

    match (entity.kind(), entity.shape()) {
        (EntityKind::Alien | EntityKind::SlowShootingAlien, Shape::Circle(circle)) => {
            circle_rect_collision(&circle, &bullet_rect)
        }
        (EntityKind::Player, Shape::Rect(rect)) => rect_rect_collision(&rect, &bullet_rect),
        (kind, _) => {
            log::error!("No collision test for entity kind {}", kind.as_str());
            false
        }
    }
}

/// Circle vs axis-aligned rectangle.
///
/// Clamp the circle center onto the rectangle to find the closest point,
/// then compare squared distance against the squared radius.
pub fn circle_rect_collision(circle: &Circle, rect: &Rect) -> bool {
    let closest = rect.clamp_point(circle.center);
    let delta: Vec2 = circle.center - closest;
    delta.length_squared() < circle.radius * circle.radius
}

/// Axis-aligned rectangle overlap. Touching edges count as a hit.
pub fn rect_rect_collision(a: &Rect, b: &Rect) -> bool {
    let x_overlap = a.right() >= b.left() && b.right() >= a.left();
    let y_overlap = a.bottom() >= b.top() && b.bottom() >= a.top();
    x_overlap && y_overlap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::colors;
    use crate::sim::entity::{Bounds, Direction, EntityId};
    use proptest::prelude::*;

    fn bullet_at(x: f32, y: f32) -> Entity {
        Entity::bullet(
            Vec2::new(x, y),
            1.0,
            Direction::Up,
            colors::EFFECT,
            EntityId(0),
            Bounds::default(),
        )
    }

    #[test]
    fn test_circle_rect_hit() {
        let circle = Circle::new(Vec2::ZERO, 10.0);
        let rect = Rect::new(5.0, 5.0, 5.0, 10.0);
        assert!(circle_rect_collision(&circle, &rect));
    }

    #[test]
    fn test_circle_rect_miss() {
        let circle = Circle::new(Vec2::ZERO, 10.0);
        let rect = Rect::new(100.0, 100.0, 5.0, 10.0);
        assert!(!circle_rect_collision(&circle, &rect));
    }

    #[test]
    fn test_circle_rect_center_inside() {
        let circle = Circle::new(Vec2::new(12.0, 12.0), 1.0);
        let rect = Rect::new(10.0, 10.0, 5.0, 10.0);
        assert!(circle_rect_collision(&circle, &rect));
    }

    #[test]
    fn test_rect_rect_touching_edges_collide() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(rect_rect_collision(&a, &b));
        assert!(rect_rect_collision(&b, &a));
    }

    #[test]
    fn test_rect_rect_gap_misses() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.5, 0.0, 10.0, 10.0);
        assert!(!rect_rect_collision(&a, &b));
    }

    #[test]
    fn test_alien_dispatch() {
        let alien = Entity::alien(Vec2::new(50.0, 50.0), 1.0);
        assert!(check_collision(&alien, &bullet_at(48.0, 45.0)));
        assert!(!check_collision(&alien, &bullet_at(300.0, 300.0)));
    }

    #[test]
    fn test_player_dispatch() {
        // Player rect spans x 90..110, y 200..220
        let player = Entity::player(Vec2::new(100.0, 200.0), "p", 10);
        assert!(check_collision(&player, &bullet_at(110.0, 190.0)));
        assert!(!check_collision(&player, &bullet_at(120.0, 190.0)));
    }

    #[test]
    fn test_slow_shooter_uses_sprite_center() {
        // Sprite box at (0,0), center at (68,68)
        let shooter = Entity::slow_shooting_alien(Vec2::ZERO, 1.0);
        assert!(check_collision(&shooter, &bullet_at(66.0, 66.0)));
        assert!(!check_collision(&shooter, &bullet_at(200.0, 200.0)));
    }

    #[test]
    fn test_bullet_defender_is_a_miss() {
        let a = bullet_at(0.0, 0.0);
        let b = bullet_at(0.0, 0.0);
        assert!(!check_collision(&a, &b));
    }

    proptest! {
        #[test]
        fn prop_rect_rect_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            aw in 0.0f32..100.0, ah in 0.0f32..100.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            bw in 0.0f32..100.0, bh in 0.0f32..100.0,
        ) {
            let a = Rect::new(ax, ay, aw, ah);
            let b = Rect::new(bx, by, bw, bh);
            prop_assert_eq!(rect_rect_collision(&a, &b), rect_rect_collision(&b, &a));
        }

        #[test]
        fn prop_rect_contains_itself(
            x in -500.0f32..500.0, y in -500.0f32..500.0,
            w in 0.0f32..100.0, h in 0.0f32..100.0,
        ) {
            let r = Rect::new(x, y, w, h);
            prop_assert!(rect_rect_collision(&r, &r));
        }

        #[test]
        fn prop_circle_center_in_rect_hits(
            x in -500.0f32..500.0, y in -500.0f32..500.0,
            w in 1.0f32..100.0, h in 1.0f32..100.0,
            tx in 0.0f32..1.0, ty in 0.0f32..1.0,
            r in 0.5f32..50.0,
        ) {
            let rect = Rect::new(x, y, w, h);
            let center = Vec2::new(x + w * tx, y + h * ty);
            prop_assert!(circle_rect_collision(&Circle::new(center, r), &rect));
        }

        #[test]
        fn prop_circle_far_away_misses(
            x in -500.0f32..500.0, y in -500.0f32..500.0,
            r in 0.5f32..50.0,
        ) {
            let rect = Rect::new(x, y, 5.0, 10.0);
            let center = Vec2::new(x + 5.0 + r + 1.0, y);
            prop_assert!(!circle_rect_collision(&Circle::new(center, r), &rect));
        }

        #[test]
        fn prop_circle_rect_translation_invariant(
            cx in -200i32..200, cy in -200i32..200, r in 1i32..50,
            x in -200i32..200, y in -200i32..200,
            w in 1i32..40, h in 1i32..40,
            dx in -200i32..200, dy in -200i32..200,
        ) {
            // Integer coordinates keep the shifted arithmetic exact
            let circle = Circle::new(Vec2::new(cx as f32, cy as f32), r as f32);
            let rect = Rect::new(x as f32, y as f32, w as f32, h as f32);
            let shift = Vec2::new(dx as f32, dy as f32);
            let moved_circle = Circle::new(circle.center + shift, circle.radius);
            let moved_rect = Rect {
                pos: rect.pos + shift,
                size: rect.size,
            };
            prop_assert_eq!(
                circle_rect_collision(&circle, &rect),
                circle_rect_collision(&moved_circle, &moved_rect)
            );
        }
    }
}
