//! Vertex types and theme palettes for 2D rendering

use bytemuck::{Pod, Zeroable};

use crate::settings::Theme;

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
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

/// Scene colors, swapped wholesale when the theme toggles
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    /// Grass on either side of the road
    pub backdrop: [f32; 4],
    pub road: [f32; 4],
    pub lane_line: [f32; 4],
    pub center_dash: [f32; 4],
    pub coin: [f32; 4],
    pub finish_light: [f32; 4],
    pub finish_dark: [f32; 4],
}

pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            backdrop: [0.44, 0.71, 0.44, 1.0],
            road: [0.18, 0.18, 0.18, 1.0],
            lane_line: [1.0, 1.0, 1.0, 0.35],
            center_dash: [1.0, 1.0, 1.0, 1.0],
            coin: [1.0, 0.84, 0.31, 1.0],
            finish_light: [1.0, 1.0, 1.0, 1.0],
            finish_dark: [0.0, 0.0, 0.0, 1.0],
        },
        Theme::Dark => Palette {
            backdrop: [0.1, 0.18, 0.12, 1.0],
            road: [0.1, 0.1, 0.12, 1.0],
            lane_line: [0.8, 0.8, 0.9, 0.3],
            center_dash: [0.85, 0.85, 0.9, 1.0],
            coin: [0.95, 0.76, 0.2, 1.0],
            finish_light: [0.85, 0.85, 0.85, 1.0],
            finish_dark: [0.05, 0.05, 0.05, 1.0],
        },
    }
}
