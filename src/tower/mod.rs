//! Deterministic tower geometry
//!
//! Everything here is pure and reproducible for a fixed seed:
//! - Seeded streams only, reseeded per generation step
//! - Stable level and brick order
//! - No rendering or platform dependencies

pub mod batch;
pub mod brick;
pub mod cache;
pub mod level;
pub mod params;
pub mod sequence;

pub use batch::{BatchAssembler, RenderBatch, total_instances};
pub use brick::BrickTransform;
pub use cache::GeometryCache;
pub use level::{LevelGeometry, generate_level, generate_level_geometry, level_brick_height};
pub use params::{ListenerId, SharedParameters, TowerParameters, TowerShape};
pub use sequence::{SeedPurpose, SeededStream, derive_seed};

use std::cell::{Ref, RefMut};
use std::collections::HashSet;

use crate::error::TowerError;
use crate::settings::TowerSettings;

/// A tower with its cache and assembled batches, ready for a host frame loop
#[derive(Debug)]
pub struct Tower {
    params: SharedParameters,
    cache: GeometryCache,
    assembler: BatchAssembler,
    batches: Vec<RenderBatch>,
    /// Parameter revision `batches` were assembled at
    batches_revision: Option<u64>,
    /// Bricks already reported by `take_placed_bricks`, in batch order
    visible: Vec<BrickTransform>,
}

impl Tower {
    /// Build a tower from settings
    pub fn new(settings: &TowerSettings) -> Result<Self, TowerError> {
        let mut params = TowerParameters::new(settings.seed);
        settings.apply_to(&mut params);
        Self::from_parameters(params.into_shared())
    }

    /// Build a tower around existing shared parameters
    pub fn from_parameters(params: SharedParameters) -> Result<Self, TowerError> {
        let cache = GeometryCache::new(params.clone())?;
        Ok(Self {
            params,
            cache,
            assembler: BatchAssembler::default(),
            batches: Vec::new(),
            batches_revision: None,
            visible: Vec::new(),
        })
    }

    /// Use a smaller per-draw instance limit
    pub fn with_assembler(mut self, assembler: BatchAssembler) -> Self {
        self.assembler = assembler;
        self.batches_revision = None;
        self
    }

    pub fn parameters(&self) -> Ref<'_, TowerParameters> {
        self.params.borrow()
    }

    /// Mutable access; any change invalidates cached geometry and batches
    pub fn parameters_mut(&self) -> RefMut<'_, TowerParameters> {
        self.params.borrow_mut()
    }

    pub fn shared_parameters(&self) -> &SharedParameters {
        &self.params
    }

    pub fn add_bricks(&mut self, count: usize) {
        self.params.borrow_mut().add_bricks(count);
    }

    pub fn cache_mut(&mut self) -> &mut GeometryCache {
        &mut self.cache
    }

    /// Height of the finished structure
    pub fn top_height(&mut self) -> f32 {
        self.cache.top_level_height()
    }

    /// Batches for the current brick count, reassembled after any change
    pub fn batches(&mut self) -> &[RenderBatch] {
        let revision = self.params.borrow().revision();
        if self.cache.is_dirty() || self.batches_revision != Some(revision) {
            self.batches = self.assembler.assemble(&mut self.cache);
            self.batches_revision = Some(revision);
        }
        &self.batches
    }

    /// Bricks that became visible since the previous call
    ///
    /// Bricks that were already shown are never reported again, even when
    /// completing a partial top level moves them within the batch order.
    pub fn take_placed_bricks(&mut self) -> Vec<BrickTransform> {
        let current: Vec<BrickTransform> = self
            .batches()
            .iter()
            .flat_map(|b| b.transforms().iter().copied())
            .collect();

        let common = self
            .visible
            .iter()
            .zip(&current)
            .take_while(|(a, b)| a == b)
            .count();
        let leftover: HashSet<[u32; 10]> = self.visible[common..]
            .iter()
            .map(BrickTransform::bit_key)
            .collect();
        let placed = current[common..]
            .iter()
            .filter(|t| !leftover.contains(&t.bit_key()))
            .copied()
            .collect();

        self.visible = current;
        placed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(seed: u64, total: usize, ordered: bool) -> TowerSettings {
        TowerSettings {
            seed,
            total_bricks: total,
            last_level_ordered: ordered,
            ..Default::default()
        }
    }

    #[test]
    fn test_batches_memoized_until_change() {
        let mut tower = Tower::new(&settings(42, 20, false)).unwrap();
        let first = tower.batches().to_vec();
        assert_eq!(total_instances(&first), 20);
        assert_eq!(tower.batches(), first.as_slice());

        tower.add_bricks(5);
        assert_eq!(total_instances(tower.batches()), 25);
    }

    #[test]
    fn test_take_placed_bricks_reports_only_new() {
        let mut tower = Tower::new(&settings(42, 10, false)).unwrap();
        assert_eq!(tower.take_placed_bricks().len(), 10);
        assert!(tower.take_placed_bricks().is_empty());

        tower.add_bricks(3);
        assert_eq!(tower.take_placed_bricks().len(), 3);

        // Completing level 1 switches it to generation order
        tower.add_bricks(3);
        let placed = tower.take_placed_bricks();
        assert_eq!(placed.len(), 3);
        assert_eq!(total_instances(tower.batches()), 16);
    }

    #[test]
    fn test_reshaping_large_tower_reports_quickly() {
        let mut tower = Tower::new(&TowerSettings {
            seed: 17,
            bricks_per_level: 200,
            total_bricks: 40_000,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(tower.take_placed_bricks().len(), 40_000);
        assert!(tower.take_placed_bricks().is_empty());

        // Every brick moves, so the whole tower is reported again
        tower.parameters_mut().set_radius(6.0);
        let start = std::time::Instant::now();
        let placed = tower.take_placed_bricks();
        let elapsed = start.elapsed();
        assert_eq!(placed.len(), 40_000);
        assert!(elapsed.as_secs_f32() < 3.0, "took {:?}", elapsed);
    }

    #[test]
    fn test_top_height_grows() {
        let mut tower = Tower::new(&settings(9, 8, true)).unwrap();
        let one_level = tower.top_height();
        tower.add_bricks(8);
        assert!(tower.top_height() > one_level);
    }

    #[test]
    fn test_external_edit_invalidates() {
        let mut tower = Tower::new(&settings(9, 16, true)).unwrap();
        let before = tower.batches().to_vec();
        tower.parameters_mut().set_radius(12.0);
        assert_ne!(tower.batches(), before.as_slice());
    }
}
