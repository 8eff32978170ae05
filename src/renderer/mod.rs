//! Rendering seam
//!
//! Draw submission lives in the host. This module only defines what the host
//! must accept: a mesh, a material and up to 1023 instance matrices per call.

pub mod instance;

pub use instance::{BrickInstance, instance_bytes};

use glam::Mat4;

use crate::tower::RenderBatch;

/// Host-side instanced draw call
pub trait InstancedRenderer {
    type Mesh;
    type Material;

    /// Draw `count` instances of `mesh`; `transforms.len() <= 1023`
    fn draw_mesh_instanced(
        &mut self,
        mesh: &Self::Mesh,
        material: &Self::Material,
        transforms: &[Mat4],
        count: usize,
    );
}

/// Hand every batch to the renderer, one draw call each
///
/// Returns the number of draw calls issued.
pub fn submit_batches<R: InstancedRenderer>(
    renderer: &mut R,
    mesh: &R::Mesh,
    material: &R::Material,
    batches: &[RenderBatch],
) -> usize {
    let mut calls = 0;
    for batch in batches.iter().filter(|b| !b.is_empty()) {
        let matrices = batch.matrices();
        renderer.draw_mesh_instanced(mesh, material, &matrices, matrices.len());
        calls += 1;
    }
    calls
}
