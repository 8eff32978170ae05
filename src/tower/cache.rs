//! Per-tower geometry memoization
//!
//! Level start heights and brick heights are recomputed for the whole tower
//! whenever the parameters change. Level transforms are generated lazily, on
//! first request, against those freshly computed heights.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::brick::BrickTransform;
use super::level::{generate_level, level_brick_height};
use super::params::{ListenerId, SharedParameters, TowerParameters, TowerShape};
use crate::error::TowerError;

/// Memoized geometry for one tower
///
/// Not thread-safe; owned by whoever drives the host's update.
#[derive(Debug)]
pub struct GeometryCache {
    params: SharedParameters,
    listener: ListenerId,
    dirty: Rc<Cell<bool>>,
    /// Shape the records below were built from
    shape: Option<TowerShape>,
    /// `height + 1` entries; the last one is the top of the tower
    start_heights: Vec<f32>,
    /// `height` entries
    brick_heights: Vec<f32>,
    /// `height` entries, filled on demand
    transforms: Vec<Option<Vec<BrickTransform>>>,
}

impl GeometryCache {
    /// Create a cache that invalidates itself whenever `params` change
    pub fn new(params: SharedParameters) -> Result<Self, TowerError> {
        let dirty = Rc::new(Cell::new(true));
        let flag = dirty.clone();
        let listener = params
            .try_borrow_mut()
            .map_err(|_| TowerError::ParametersUnavailable)?
            .on_change(move |_| flag.set(true));

        Ok(Self {
            params,
            listener,
            dirty,
            shape: None,
            start_heights: Vec::new(),
            brick_heights: Vec::new(),
            transforms: Vec::new(),
        })
    }

    /// Create a cache from a weak handle, failing if the parameters are gone
    pub fn from_weak(params: &Weak<RefCell<TowerParameters>>) -> Result<Self, TowerError> {
        let params = params.upgrade().ok_or(TowerError::MissingParameters)?;
        Self::new(params)
    }

    /// Parameters this cache follows
    pub fn parameters(&self) -> &SharedParameters {
        &self.params
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    /// Force a full rebuild on the next read
    pub fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    /// Shape snapshot the current records were built from
    ///
    /// `None` until a first rebuild has succeeded.
    pub fn shape(&mut self) -> Option<TowerShape> {
        self.rebuild_caches_if_needed();
        self.shape
    }

    /// Recompute start and brick heights for every level if anything changed
    ///
    /// While the parameters are mutably borrowed elsewhere the cache stays
    /// dirty and keeps serving the records of the last rebuild.
    pub fn rebuild_caches_if_needed(&mut self) {
        if !self.dirty.get() {
            return;
        }
        let Ok(params) = self.params.try_borrow() else {
            log::debug!("Tower parameters busy; serving stale cache");
            return;
        };
        let shape = params.shape();
        drop(params);

        self.start_heights.clear();
        self.brick_heights.clear();
        self.transforms.clear();

        let mut y = 0.0_f32;
        for level in 0..shape.height {
            let h = level_brick_height(&shape, level);
            self.start_heights.push(y);
            self.brick_heights.push(h);
            y += h;
        }
        self.start_heights.push(y);
        self.transforms.resize_with(shape.height, || None);

        log::debug!(
            "Rebuilt tower cache: {} levels, top at {:.3}, {} bricks",
            shape.height,
            y,
            shape.total_bricks
        );

        self.shape = Some(shape);
        self.dirty.set(false);
    }

    /// Number of levels currently cached
    pub fn level_count(&mut self) -> usize {
        self.rebuild_caches_if_needed();
        self.brick_heights.len()
    }

    /// Where a level starts; valid for `0..=height`
    pub fn level_start_height(&mut self, level: usize) -> Option<f32> {
        self.rebuild_caches_if_needed();
        self.start_heights.get(level).copied()
    }

    /// Brick height of a level; valid for `0..height`
    pub fn level_height(&mut self, level: usize) -> Option<f32> {
        self.rebuild_caches_if_needed();
        self.brick_heights.get(level).copied()
    }

    /// Height of the whole structure
    pub fn top_level_height(&mut self) -> f32 {
        self.rebuild_caches_if_needed();
        self.start_heights.last().copied().unwrap_or(0.0)
    }

    /// Transforms for every brick slot of a level, generating them on first use
    ///
    /// Out-of-range levels yield an empty slice.
    pub fn get_or_generate_level_matrices(&mut self, level: usize) -> &[BrickTransform] {
        self.rebuild_caches_if_needed();
        let Some(shape) = self.shape else {
            return &[];
        };
        let (Some(&start_y), Some(&brick_height)) =
            (self.start_heights.get(level), self.brick_heights.get(level))
        else {
            return &[];
        };
        let Some(slot) = self.transforms.get_mut(level) else {
            return &[];
        };
        slot.get_or_insert_with(|| generate_level(&shape, level, start_y, brick_height))
    }

    /// Levels whose transforms have been generated since the last rebuild
    pub fn cached_level_count(&self) -> usize {
        self.transforms.iter().filter(|t| t.is_some()).count()
    }

    #[cfg(test)]
    pub(crate) fn replace_level(&mut self, level: usize, transforms: Vec<BrickTransform>) {
        self.rebuild_caches_if_needed();
        if let Some(slot) = self.transforms.get_mut(level) {
            *slot = Some(transforms);
        }
    }
}

impl Drop for GeometryCache {
    fn drop(&mut self) {
        if let Ok(mut params) = self.params.try_borrow_mut() {
            params.unsubscribe(self.listener);
        }
    }
}
