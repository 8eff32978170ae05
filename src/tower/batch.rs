//! Render batch assembly
//!
//! Walks levels bottom-up and packs exactly `total_bricks` transforms into
//! batches no larger than one instanced draw call accepts. A partially built
//! top level is either taken in generation order or as a seeded subset.

use glam::Mat4;

use super::brick::BrickTransform;
use super::cache::GeometryCache;
use super::params::TowerShape;
use super::sequence::{SeedPurpose, derive_seed, shuffle_in_place};
use crate::consts::MAX_INSTANCES_PER_BATCH;
use crate::renderer::BrickInstance;

/// Transforms for a single instanced draw call
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RenderBatch {
    transforms: Vec<BrickTransform>,
}

impl RenderBatch {
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn transforms(&self) -> &[BrickTransform] {
        &self.transforms
    }

    /// Model matrices, one per brick
    pub fn matrices(&self) -> Vec<Mat4> {
        self.transforms.iter().map(BrickTransform::to_matrix).collect()
    }

    /// GPU instance records, one per brick
    pub fn instances(&self) -> Vec<BrickInstance> {
        self.transforms.iter().map(BrickInstance::from).collect()
    }
}

/// Total instances across all batches
pub fn total_instances(batches: &[RenderBatch]) -> usize {
    batches.iter().map(RenderBatch::len).sum()
}

/// Packs cached level geometry into bounded batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchAssembler {
    capacity: usize,
}

impl Default for BatchAssembler {
    fn default() -> Self {
        Self {
            capacity: MAX_INSTANCES_PER_BATCH,
        }
    }
}

impl BatchAssembler {
    /// Assembler with a smaller per-batch limit (clamped to `1..=1023`)
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.clamp(1, MAX_INSTANCES_PER_BATCH),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True when one level needs more than one draw call
    pub fn level_exceeds_batch(&self, shape: &TowerShape) -> bool {
        shape.bricks_per_level > self.capacity
    }

    /// Build the ordered batch list for the tower's current brick count
    pub fn assemble(&self, cache: &mut GeometryCache) -> Vec<RenderBatch> {
        let Some(shape) = cache.shape() else {
            return Vec::new();
        };
        if self.level_exceeds_batch(&shape) {
            log::warn!(
                "bricks_per_level {} exceeds batch capacity {}; levels will span several draw calls",
                shape.bricks_per_level,
                self.capacity
            );
        }

        let mut batches = Vec::new();
        let mut buffer = Vec::with_capacity(self.capacity.min(shape.total_bricks));
        let mut built = 0;
        let mut level = 0;

        while built < shape.total_bricks && level < shape.height {
            let level_transforms = cache.get_or_generate_level_matrices(level);
            if level_transforms.is_empty() {
                level += 1;
                continue;
            }

            let want = level_transforms.len().min(shape.total_bricks - built);
            if want < level_transforms.len() && !shape.is_last_level_ordered {
                // Shuffle a copy; the cached order must survive for later growth
                let mut subset = level_transforms.to_vec();
                shuffle_in_place(
                    derive_seed(shape.seed, level, SeedPurpose::PartialShuffle),
                    &mut subset,
                );
                self.pack(&mut batches, &mut buffer, &subset[..want]);
            } else {
                self.pack(&mut batches, &mut buffer, &level_transforms[..want]);
            }

            built += want;
            level += 1;
        }

        if !buffer.is_empty() {
            batches.push(RenderBatch { transforms: buffer });
        }

        log::debug!(
            "Assembled {} bricks into {} batches ({} levels)",
            built,
            batches.len(),
            level
        );
        batches
    }

    fn pack(
        &self,
        batches: &mut Vec<RenderBatch>,
        buffer: &mut Vec<BrickTransform>,
        mut bricks: &[BrickTransform],
    ) {
        while !bricks.is_empty() {
            let room = self.capacity - buffer.len();
            let (head, rest) = bricks.split_at(room.min(bricks.len()));
            buffer.extend_from_slice(head);
            bricks = rest;

            if buffer.len() == self.capacity {
                let full = std::mem::replace(buffer, Vec::with_capacity(self.capacity));
                batches.push(RenderBatch { transforms: full });
            }
        }
    }
}
