//! Instance record layout for brick batches

use bytemuck::{Pod, Zeroable};

use crate::tower::BrickTransform;

/// Per-brick instance data: column-major model matrix
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct BrickInstance {
    pub model: [[f32; 4]; 4],
}

impl BrickInstance {
    /// Bytes between consecutive instances in a buffer
    pub const STRIDE: usize = std::mem::size_of::<BrickInstance>();

    pub fn new(transform: &BrickTransform) -> Self {
        Self {
            model: transform.to_matrix().to_cols_array_2d(),
        }
    }
}

impl From<&BrickTransform> for BrickInstance {
    fn from(transform: &BrickTransform) -> Self {
        Self::new(transform)
    }
}

/// View a slice of instances as raw bytes for upload
pub fn instance_bytes(instances: &[BrickInstance]) -> &[u8] {
    bytemuck::cast_slice(instances)
}
