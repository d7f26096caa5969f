//! Triangle-list generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::Vertex;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for a hollow circle of the given stroke width
pub fn ring(center: Vec2, radius: f32, thickness: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let inner = (radius - thickness / 2.0).max(0.0);
    let outer = radius + thickness / 2.0;
    let mut vertices = Vec::with_capacity((segments * 6) as usize);

    let point = |r: f32, theta: f32| center + Vec2::new(r * theta.cos(), r * theta.sin());

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let inner1 = point(inner, theta1);
        let outer1 = point(outer, theta1);
        let inner2 = point(inner, theta2);
        let outer2 = point(outer, theta2);

        vertices.extend(quad(inner1, outer1, inner2, outer2, color));
    }

    vertices
}

/// Axis-aligned filled rectangle from its top-left corner
pub fn rect(pos: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let top_right = Vec2::new(pos.x + size.x, pos.y);
    let bottom_left = Vec2::new(pos.x, pos.y + size.y);
    quad(pos, top_right, bottom_left, pos + size, color).to_vec()
}

/// Rectangle border drawn as four thin bars
pub fn rect_outline(pos: Vec2, size: Vec2, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let t = thickness;
    let mut vertices = Vec::with_capacity(24);
    vertices.extend(rect(pos, Vec2::new(size.x, t), color));
    vertices.extend(rect(Vec2::new(pos.x, pos.y + size.y - t), Vec2::new(size.x, t), color));
    vertices.extend(rect(pos, Vec2::new(t, size.y), color));
    vertices.extend(rect(Vec2::new(pos.x + size.x - t, pos.y), Vec2::new(t, size.y), color));
    vertices
}

pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) -> [Vertex; 3] {
    [
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

/// Two triangles covering the quad `a b / c d`
fn quad(a: Vec2, b: Vec2, c: Vec2, d: Vec2, color: [f32; 4]) -> [Vertex; 6] {
    [
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(c.x, c.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(d.x, d.y, color),
    ]
}
