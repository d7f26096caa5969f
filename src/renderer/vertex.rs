//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// 2D vertex in canvas pixels with a color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Palette
pub mod colors {
    pub const PRIMARY: [f32; 4] = [0.25, 0.85, 1.0, 1.0];
    pub const SECONDARY: [f32; 4] = [0.55, 1.0, 0.35, 1.0];
    pub const EFFECT: [f32; 4] = [1.0, 0.95, 0.4, 1.0];
    pub const REMOTE_PLAYER: [f32; 4] = [0.85, 0.45, 1.0, 1.0];
    pub const SHOOTER: [f32; 4] = [0.9, 0.3, 0.35, 1.0];
    pub const SHOOTER_DAMAGED: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const ENEMY_BULLET: [f32; 4] = [1.0, 0.55, 0.0, 1.0]; // Orange
    pub const DEBUG: [f32; 4] = [1.0, 0.0, 0.0, 0.8];
    pub const MENU_RAIL: [f32; 4] = [0.25, 0.85, 1.0, 0.6];
    pub const MENU_ITEM: [f32; 4] = [0.15, 0.2, 0.3, 0.9];
    pub const MENU_SELECTED: [f32; 4] = [0.25, 0.45, 0.65, 0.95];
    pub const BACKGROUND: [f32; 4] = [0.02, 0.02, 0.05, 1.0];
}
