//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
///
/// Positions are in field coordinates (800×600, y down); the host maps them
/// to clip space.
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
}

/// Raw bytes for a vertex buffer upload
pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Scale a color's alpha
pub fn fade(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
}

/// Colors for game elements
pub mod colors {
    pub const GROUND: [f32; 4] = [0.35, 0.25, 0.1, 1.0];
    pub const CITY: [f32; 4] = [0.3, 0.7, 1.0, 1.0];
    pub const RUBBLE: [f32; 4] = [0.25, 0.2, 0.2, 1.0];
    pub const BASE: [f32; 4] = [0.9, 0.8, 0.3, 1.0];
    pub const SATELLITE: [f32; 4] = [0.7, 0.7, 0.85, 1.0];
    pub const SHIELD: [f32; 4] = [0.3, 0.9, 1.0, 0.5];
    pub const SHIELD_FLASH: [f32; 4] = [1.0, 1.0, 1.0, 0.9];
    pub const MISSILE: [f32; 4] = [1.0, 0.25, 0.2, 1.0];
    pub const MIRV: [f32; 4] = [1.0, 0.5, 0.1, 1.0];
    pub const SMART_BOMB: [f32; 4] = [0.9, 0.2, 0.9, 1.0];
    pub const PLANE: [f32; 4] = [0.6, 0.6, 0.6, 1.0];
    pub const PLANE_BOMB: [f32; 4] = [0.9, 0.9, 0.3, 1.0];
    pub const SHIELD_BOMB: [f32; 4] = [0.2, 1.0, 0.6, 1.0];
    pub const INTERCEPTOR: [f32; 4] = [0.4, 1.0, 0.4, 1.0];
    pub const PLAYER_BLAST: [f32; 4] = [1.0, 1.0, 0.6, 0.8];
    pub const ENEMY_BLAST: [f32; 4] = [1.0, 0.4, 0.2, 0.8];
    pub const AREA_DENIAL: [f32; 4] = [0.5, 0.3, 1.0, 0.35];
}
