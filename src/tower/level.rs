//! Per-level brick geometry
//!
//! A level is one horizontal ring of bricks. Its geometry is a pure function
//! of the tower shape, the level index and the level's start height:
//! - brick height: seeded in `[min, max]`
//! - rotation offset: seeded start angle of the ring
//! - widths: seeded around the average, normalized to sum to the circumference
//! - placement: bricks laid edge to edge around the ring by half-arcs

use glam::Vec3;

use super::brick::BrickTransform;
use super::params::TowerShape;
use super::sequence::{SeedPurpose, SeededStream, derive_seed, full_circle_angle, ranged_float};
use crate::consts::*;
use crate::wrap_angle;

/// Brick height and full-capacity transforms for one level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelGeometry {
    pub brick_height: f32,
    pub transforms: Vec<BrickTransform>,
}

/// Seeded brick height for a level
pub fn level_brick_height(shape: &TowerShape, level: usize) -> f32 {
    let (min, max) = (shape.min_brick_height, shape.max_brick_height);
    if (max - min).abs() <= HEIGHT_EPSILON {
        return min;
    }
    ranged_float(derive_seed(shape.seed, level, SeedPurpose::BrickHeight), min, max)
}

/// Seeded angle where the level's first brick starts
pub fn level_rotation_offset(shape: &TowerShape, level: usize) -> f32 {
    full_circle_angle(derive_seed(shape.seed, level, SeedPurpose::RotationOffset))
}

/// Seeded brick widths for a level, summing to the circumference
pub fn level_brick_widths(shape: &TowerShape, level: usize) -> Vec<f32> {
    let count = shape.bricks_per_level;
    if count == 0 {
        return Vec::new();
    }

    let avg = (shape.circumference / count as f32).max(0.0);
    let variation = shape.brick_width_variation.clamp(0.0, MAX_WIDTH_VARIATION);
    let (lo, hi) = (avg * (1.0 - variation), avg * (1.0 + variation));

    let mut stream = SeededStream::new(derive_seed(shape.seed, level, SeedPurpose::BrickWidths));
    let mut widths: Vec<f32> = (0..count).map(|_| stream.ranged_float(lo, hi)).collect();

    if width_sum(&widths) <= f64::from(MIN_BRICK_WIDTH) {
        widths = vec![shape.circumference.max(0.0) / count as f32; count];
    }

    normalize_widths(&mut widths, shape.circumference);
    widths
}

/// Scale widths so they sum to `target`
///
/// Skipped when the sum is already within tolerance or `target` is not positive.
pub fn normalize_widths(widths: &mut [f32], target: f32) {
    if target <= 0.0 {
        return;
    }
    let sum = width_sum(widths);
    if sum <= 0.0 {
        return;
    }
    let target = f64::from(target);
    if (sum - target).abs() <= target * f64::from(WIDTH_SUM_TOLERANCE) {
        return;
    }
    let factor = target / sum;
    for w in widths.iter_mut() {
        *w = (f64::from(*w) * factor) as f32;
    }
}

fn width_sum(widths: &[f32]) -> f64 {
    widths.iter().map(|&w| f64::from(w)).sum()
}

/// Transforms for every brick of a level, in generation order
///
/// Degenerate shapes (no bricks, or a radius, circumference or brick height
/// that is not positive and finite) produce an empty list.
pub fn generate_level(
    shape: &TowerShape,
    level: usize,
    start_y: f32,
    brick_height: f32,
) -> Vec<BrickTransform> {
    let degenerate = shape.bricks_per_level == 0
        || !is_positive_finite(shape.radius)
        || !is_positive_finite(shape.circumference)
        || !is_positive_finite(brick_height);
    if degenerate {
        log::warn!(
            "Level {} has degenerate shape (bricks_per_level={}, radius={}, circumference={}, brick_height={}); skipping",
            level,
            shape.bricks_per_level,
            shape.radius,
            shape.circumference,
            brick_height
        );
        return Vec::new();
    }

    let widths = level_brick_widths(shape, level);
    let center_y = start_y + brick_height / 2.0;
    let mut theta = level_rotation_offset(shape, level);
    let mut transforms = Vec::with_capacity(widths.len());

    for &width in &widths {
        if width <= MIN_BRICK_WIDTH {
            continue;
        }
        let half_arc = (width / 2.0) / shape.radius;
        theta += half_arc;
        transforms.push(BrickTransform::on_ring(
            shape.radius,
            wrap_angle(theta),
            center_y,
            Vec3::new(width, brick_height, shape.brick_depth),
        ));
        theta += half_arc;
    }

    transforms
}

fn is_positive_finite(value: f32) -> bool {
    value > 0.0 && value.is_finite()
}

/// Brick height plus transforms for a level
pub fn generate_level_geometry(shape: &TowerShape, level: usize, start_y: f32) -> LevelGeometry {
    let brick_height = level_brick_height(shape, level);
    LevelGeometry {
        brick_height,
        transforms: generate_level(shape, level, start_y, brick_height),
    }
}
