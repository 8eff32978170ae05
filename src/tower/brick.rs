//! Brick placement transform
//!
//! A brick is an oriented box described only by its transform:
//! - position: center of the brick
//! - rotation: about +Y, local +Z facing radially outward
//! - scale: x = tangential width, y = height, z = radial depth

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::ring_point;

/// Position, orientation and scale of one brick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrickTransform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl BrickTransform {
    /// Brick centered on a ring at angle `theta`, facing away from the axis
    pub fn on_ring(radius: f32, theta: f32, center_y: f32, scale: Vec3) -> Self {
        Self {
            position: ring_point(radius, theta, center_y),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2 - theta),
            scale,
        }
    }

    /// Tangential width
    #[inline]
    pub fn width(&self) -> f32 {
        self.scale.x
    }

    /// Vertical extent
    #[inline]
    pub fn height(&self) -> f32 {
        self.scale.y
    }

    /// Unit vector the brick's front face points along
    pub fn outward(&self) -> Vec3 {
        self.rotation * Vec3::Z
    }

    /// Model matrix (scale, then rotate, then translate)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Exact bit pattern of every component, usable as a hash key
    pub fn bit_key(&self) -> [u32; 10] {
        let [px, py, pz] = self.position.to_array().map(f32::to_bits);
        let [rx, ry, rz, rw] = self.rotation.to_array().map(f32::to_bits);
        let [sx, sy, sz] = self.scale.to_array().map(f32::to_bits);
        [px, py, pz, rx, ry, rz, rw, sx, sy, sz]
    }
}
