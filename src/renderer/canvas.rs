//! Draw target handed to entities and menus
//!
//! Drawing only appends coloured triangles in canvas pixel coordinates. The
//! GPU upload happens once per frame in [`super::RenderState`], so everything
//! that draws stays testable without a device.

use glam::Vec2;

use super::shapes;
use super::vertex::Vertex;
use crate::sim::shape::Rect;

const CIRCLE_SEGMENTS: u32 = 32;

/// Render-time debug switches, passed explicitly into every draw call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugContext {
    /// Outline collision shapes
    pub enabled: bool,
}

impl DebugContext {
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        self.enabled
    }
}

#[derive(Debug, Default)]
pub struct Canvas {
    vertices: Vec<Vertex>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.vertices
            .extend(shapes::circle(center, radius, color, CIRCLE_SEGMENTS));
    }

    pub fn ring(&mut self, center: Vec2, radius: f32, thickness: f32, color: [f32; 4]) {
        self.vertices
            .extend(shapes::ring(center, radius, thickness, color, CIRCLE_SEGMENTS));
    }

    pub fn rect(&mut self, rect: Rect, color: [f32; 4]) {
        self.vertices.extend(shapes::rect(rect.pos, rect.size, color));
    }

    pub fn rect_outline(&mut self, rect: Rect, thickness: f32, color: [f32; 4]) {
        self.vertices
            .extend(shapes::rect_outline(rect.pos, rect.size, thickness, color));
    }

    pub fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
        self.vertices.extend(shapes::triangle(a, b, c, color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::vertex::colors;

    #[test]
    fn test_draw_calls_accumulate_until_clear() {
        let mut canvas = Canvas::new();
        canvas.rect(Rect::new(0.0, 0.0, 5.0, 10.0), colors::EFFECT);
        canvas.triangle(Vec2::ZERO, Vec2::X, Vec2::Y, colors::PRIMARY);
        assert_eq!(canvas.vertices().len(), 9);

        canvas.clear();
        assert!(canvas.is_empty());
    }

    #[test]
    fn test_debug_toggle() {
        let mut debug = DebugContext::default();
        assert!(debug.toggle());
        assert!(!debug.toggle());
    }
}
