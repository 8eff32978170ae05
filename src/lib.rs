//! Brick Tower - procedural geometry for a cylindrical tower that grows over time
//!
//! Core modules:
//! - `tower`: Deterministic geometry (parameters, seeded generation, caching, batching)
//! - `renderer`: Instanced draw seam and GPU instance layout
//! - `settings`: Data-driven tower shape configuration
//! - `error`: Error taxonomy for construction and config loading

pub mod error;
pub mod renderer;
pub mod settings;
pub mod tower;

pub use error::TowerError;
pub use settings::{TowerPreset, TowerSettings};
pub use tower::{
    BatchAssembler, BrickTransform, GeometryCache, RenderBatch, SharedParameters, Tower,
    TowerParameters, TowerShape,
};

use glam::Vec3;

/// Tower configuration constants
pub mod consts {
    /// Maximum instances a single instanced draw call accepts
    pub const MAX_INSTANCES_PER_BATCH: usize = 1023;

    /// Widths at or below this are not placed
    pub const MIN_BRICK_WIDTH: f32 = 1e-4;
    /// Smallest legal radius, depth and brick height
    pub const MIN_DIMENSION: f32 = 1e-3;
    /// Largest legal radius, depth and brick height
    pub const MAX_DIMENSION: f32 = 1e6;
    /// Upper bound for brick width variation
    pub const MAX_WIDTH_VARIATION: f32 = 0.9;

    /// Two heights closer than this are treated as equal
    pub const HEIGHT_EPSILON: f32 = 1e-5;
    /// Relative tolerance for the width-sum normalization
    pub const WIDTH_SUM_TOLERANCE: f32 = 1e-6;

    /// Shape defaults
    pub const DEFAULT_RADIUS: f32 = 5.0;
    pub const DEFAULT_BRICK_DEPTH: f32 = 0.5;
    pub const DEFAULT_MIN_BRICK_HEIGHT: f32 = 0.25;
    pub const DEFAULT_MAX_BRICK_HEIGHT: f32 = 0.35;
    pub const DEFAULT_BRICKS_PER_LEVEL: usize = 8;
    pub const DEFAULT_WIDTH_VARIATION: f32 = 0.3;
}

/// Wrap an angle to [0, 2π)
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::TAU;
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Point on a horizontal ring of radius `r` at angle `theta` and height `y`
///
/// Angles are measured in the XZ plane from +X toward +Z.
#[inline]
pub fn ring_point(r: f32, theta: f32, y: f32) -> Vec3 {
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Horizontal angle of a point around the vertical axis
#[inline]
pub fn ring_angle(pos: Vec3) -> f32 {
    wrap_angle(pos.z.atan2(pos.x))
}
