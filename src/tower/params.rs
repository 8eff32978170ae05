//! Tower shape parameters and change notification
//!
//! `TowerParameters` is the single source of truth for the tower's shape.
//! Every setter clamps its input to the legal domain, compares against the
//! stored value, and notifies listeners only on an actual change.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ListenerError;

/// Parameters shared between the host and its geometry cache
pub type SharedParameters = Rc<RefCell<TowerParameters>>;

/// Handle returned by [`TowerParameters::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&TowerParameters) -> Result<(), ListenerError>>;

/// Plain snapshot of every stored and derived scalar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerShape {
    pub total_bricks: usize,
    /// Level count, `max(1, ceil(total_bricks / bricks_per_level))`
    pub height: usize,
    pub radius: f32,
    /// `2π · radius`
    pub circumference: f32,
    pub brick_depth: f32,
    pub min_brick_height: f32,
    pub max_brick_height: f32,
    pub bricks_per_level: usize,
    pub seed: u64,
    pub brick_width_variation: f32,
    pub is_last_level_ordered: bool,
}

/// Mutable tower shape, owned by the host for the tower's whole life
pub struct TowerParameters {
    total_bricks: usize,
    height: usize,
    radius: f32,
    brick_depth: f32,
    min_brick_height: f32,
    max_brick_height: f32,
    bricks_per_level: usize,
    seed: u64,
    brick_width_variation: f32,
    is_last_level_ordered: bool,

    /// Bumped once per delivered notification
    revision: u64,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
    /// Nesting depth of `batch_edit`
    batch_depth: u32,
    pending_change: bool,
    listener_errors: Vec<ListenerError>,
}

impl fmt::Debug for TowerParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TowerParameters")
            .field("shape", &self.shape())
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for TowerParameters {
    fn default() -> Self {
        Self::new(0)
    }
}

impl TowerParameters {
    /// Create parameters with default shape and the given seed
    ///
    /// A seed of 0 is replaced by a random non-zero seed so that the tower
    /// is reproducible from then on.
    pub fn new(seed: u64) -> Self {
        let mut params = Self {
            total_bricks: 0,
            height: 1,
            radius: DEFAULT_RADIUS,
            brick_depth: DEFAULT_BRICK_DEPTH,
            min_brick_height: DEFAULT_MIN_BRICK_HEIGHT,
            max_brick_height: DEFAULT_MAX_BRICK_HEIGHT,
            bricks_per_level: DEFAULT_BRICKS_PER_LEVEL,
            seed: resolve_seed(seed),
            brick_width_variation: DEFAULT_WIDTH_VARIATION,
            is_last_level_ordered: false,
            revision: 0,
            listeners: Vec::new(),
            next_listener_id: 1,
            batch_depth: 0,
            pending_change: false,
            listener_errors: Vec::new(),
        };
        params.height = params.compute_height();
        params
    }

    /// Wrap into the shared handle used by [`GeometryCache`](super::GeometryCache)
    pub fn into_shared(self) -> SharedParameters {
        Rc::new(RefCell::new(self))
    }

    /// Snapshot of all scalar values
    pub fn shape(&self) -> TowerShape {
        TowerShape {
            total_bricks: self.total_bricks,
            height: self.height,
            radius: self.radius,
            circumference: self.circumference(),
            brick_depth: self.brick_depth,
            min_brick_height: self.min_brick_height,
            max_brick_height: self.max_brick_height,
            bricks_per_level: self.bricks_per_level,
            seed: self.seed,
            brick_width_variation: self.brick_width_variation,
            is_last_level_ordered: self.is_last_level_ordered,
        }
    }

    // === Getters ===

    pub fn total_bricks(&self) -> usize {
        self.total_bricks
    }

    /// Number of levels, never less than 1
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn circumference(&self) -> f32 {
        std::f32::consts::TAU * self.radius
    }

    pub fn brick_depth(&self) -> f32 {
        self.brick_depth
    }

    pub fn min_brick_height(&self) -> f32 {
        self.min_brick_height
    }

    pub fn max_brick_height(&self) -> f32 {
        self.max_brick_height
    }

    pub fn bricks_per_level(&self) -> usize {
        self.bricks_per_level
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn brick_width_variation(&self) -> f32 {
        self.brick_width_variation
    }

    pub fn is_last_level_ordered(&self) -> bool {
        self.is_last_level_ordered
    }

    /// Number of notifications delivered so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Bricks on the topmost level (full level counts as `bricks_per_level`)
    pub fn bricks_on_last_level(&self) -> usize {
        if self.total_bricks == 0 {
            return 0;
        }
        match self.total_bricks % self.bricks_per_level {
            0 => self.bricks_per_level,
            rem => rem,
        }
    }

    // === Setters ===

    pub fn set_total_bricks(&mut self, total: usize) {
        if total == self.total_bricks {
            return;
        }
        self.total_bricks = total;
        self.height = self.compute_height();
        self.changed();
    }

    /// Add `count` bricks to the tower (no-op for 0)
    pub fn add_bricks(&mut self, count: usize) {
        if count == 0 {
            return;
        }
        self.set_total_bricks(self.total_bricks.saturating_add(count));
    }

    pub fn set_radius(&mut self, radius: f32) {
        let radius = sanitize_dimension(radius);
        if radius == self.radius {
            return;
        }
        self.radius = radius;
        self.changed();
    }

    pub fn set_brick_depth(&mut self, depth: f32) {
        let depth = sanitize_dimension(depth);
        if depth == self.brick_depth {
            return;
        }
        self.brick_depth = depth;
        self.changed();
    }

    /// Set the minimum brick height, raising the maximum if it would fall below
    pub fn set_min_brick_height(&mut self, min: f32) {
        let min = sanitize_dimension(min);
        let max = self.max_brick_height.max(min);
        self.set_height_bounds(min, max);
    }

    /// Set the maximum brick height, lowering the minimum if it would rise above
    pub fn set_max_brick_height(&mut self, max: f32) {
        let max = sanitize_dimension(max);
        let min = self.min_brick_height.min(max);
        self.set_height_bounds(min, max);
    }

    fn set_height_bounds(&mut self, min: f32, max: f32) {
        if min == self.min_brick_height && max == self.max_brick_height {
            return;
        }
        self.min_brick_height = min;
        self.max_brick_height = max;
        self.changed();
    }

    pub fn set_bricks_per_level(&mut self, count: usize) {
        let count = count.max(1);
        if count == self.bricks_per_level {
            return;
        }
        self.bricks_per_level = count;
        self.height = self.compute_height();
        self.changed();
    }

    /// Set the seed (0 picks a fresh random non-zero seed)
    pub fn set_seed(&mut self, seed: u64) {
        let seed = resolve_seed(seed);
        if seed == self.seed {
            return;
        }
        self.seed = seed;
        self.changed();
    }

    pub fn set_brick_width_variation(&mut self, variation: f32) {
        let variation = if variation.is_nan() {
            0.0
        } else {
            variation.clamp(0.0, MAX_WIDTH_VARIATION)
        };
        if variation == self.brick_width_variation {
            return;
        }
        self.brick_width_variation = variation;
        self.changed();
    }

    pub fn set_last_level_ordered(&mut self, ordered: bool) {
        if ordered == self.is_last_level_ordered {
            return;
        }
        self.is_last_level_ordered = ordered;
        self.changed();
    }

    // === Notification ===

    /// Apply several edits and deliver at most one notification
    ///
    /// Nested calls notify once, when the outermost batch ends.
    pub fn batch_edit<R>(&mut self, edit: impl FnOnce(&mut Self) -> R) -> R {
        self.batch_depth += 1;
        let result = edit(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 && std::mem::take(&mut self.pending_change) {
            self.notify();
        }
        result
    }

    /// Register a listener called after every change
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&TowerParameters) -> Result<(), ListenerError> + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Register a listener that cannot fail
    pub fn on_change<F>(&mut self, mut listener: F) -> ListenerId
    where
        F: FnMut(&TowerParameters) + 'static,
    {
        self.subscribe(move |params| {
            listener(params);
            Ok(())
        })
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drain the errors reported by listeners since the last call
    pub fn take_listener_errors(&mut self) -> Vec<ListenerError> {
        std::mem::take(&mut self.listener_errors)
    }

    fn changed(&mut self) {
        if self.batch_depth > 0 {
            self.pending_change = true;
        } else {
            self.notify();
        }
    }

    fn notify(&mut self) {
        self.revision += 1;
        // Listeners only see `&self`, so they cannot touch the list while it is detached
        let mut listeners = std::mem::take(&mut self.listeners);
        for (id, listener) in listeners.iter_mut() {
            if let Err(err) = listener(&*self) {
                log::error!("Tower parameter listener {:?} failed: {}", id, err);
                self.listener_errors.push(err);
            }
        }
        self.listeners = listeners;
    }

    fn compute_height(&self) -> usize {
        self.total_bricks.div_ceil(self.bricks_per_level).max(1)
    }
}

fn sanitize_dimension(value: f32) -> f32 {
    if value.is_nan() {
        MIN_DIMENSION
    } else {
        value.clamp(MIN_DIMENSION, MAX_DIMENSION)
    }
}

fn resolve_seed(seed: u64) -> u64 {
    if seed != 0 {
        return seed;
    }
    let seed = rand::rng().random_range(1..=u64::MAX);
    log::debug!("Seed 0 replaced with random seed {}", seed);
    seed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counting(params: &mut TowerParameters) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        params.on_change(move |_| c.set(c.get() + 1));
        count
    }

    #[test]
    fn test_zero_seed_replaced() {
        let params = TowerParameters::new(0);
        assert_ne!(params.seed(), 0);
        assert_eq!(TowerParameters::new(42).seed(), 42);
    }

    #[test]
    fn test_height_derivation() {
        let mut params = TowerParameters::new(1);
        assert_eq!(params.height(), 1);
        params.set_total_bricks(10);
        assert_eq!(params.height(), 2);
        params.set_total_bricks(16);
        assert_eq!(params.height(), 2);
        params.set_total_bricks(17);
        assert_eq!(params.height(), 3);
        params.set_bricks_per_level(17);
        assert_eq!(params.height(), 1);
    }

    #[test]
    fn test_bricks_on_last_level() {
        let mut params = TowerParameters::new(1);
        assert_eq!(params.bricks_on_last_level(), 0);
        params.set_total_bricks(10);
        assert_eq!(params.bricks_on_last_level(), 2);
        params.set_total_bricks(16);
        assert_eq!(params.bricks_on_last_level(), 8);
    }

    #[test]
    fn test_min_above_max_drags_max() {
        let mut params = TowerParameters::new(1);
        params.set_max_brick_height(0.4);
        params.set_min_brick_height(0.6);
        assert_eq!(params.min_brick_height(), 0.6);
        assert_eq!(params.max_brick_height(), 0.6);
    }

    #[test]
    fn test_max_below_min_drags_min() {
        let mut params = TowerParameters::new(1);
        params.set_min_brick_height(0.3);
        params.set_max_brick_height(0.1);
        assert_eq!(params.min_brick_height(), 0.1);
        assert_eq!(params.max_brick_height(), 0.1);
    }

    #[test]
    fn test_clamping() {
        let mut params = TowerParameters::new(1);
        params.set_radius(-3.0);
        assert_eq!(params.radius(), MIN_DIMENSION);
        params.set_bricks_per_level(0);
        assert_eq!(params.bricks_per_level(), 1);
        params.set_brick_width_variation(2.0);
        assert_eq!(params.brick_width_variation(), MAX_WIDTH_VARIATION);
        params.set_brick_width_variation(f32::NAN);
        assert_eq!(params.brick_width_variation(), 0.0);
    }

    #[test]
    fn test_huge_dimensions_stay_finite() {
        let mut params = TowerParameters::new(1);
        params.set_radius(1e38);
        assert_eq!(params.radius(), MAX_DIMENSION);
        assert!(params.circumference().is_finite());
        params.set_radius(f32::INFINITY);
        assert_eq!(params.radius(), MAX_DIMENSION);
        params.set_max_brick_height(f32::MAX);
        params.set_brick_depth(f32::INFINITY);
        assert_eq!(params.max_brick_height(), MAX_DIMENSION);
        assert_eq!(params.brick_depth(), MAX_DIMENSION);
    }

    #[test]
    fn test_notify_only_on_change() {
        let mut params = TowerParameters::new(1);
        let count = counting(&mut params);

        params.set_radius(DEFAULT_RADIUS);
        params.set_bricks_per_level(DEFAULT_BRICKS_PER_LEVEL);
        params.add_bricks(0);
        assert_eq!(count.get(), 0);

        // Already clamped to the same value
        params.set_brick_width_variation(5.0);
        params.set_brick_width_variation(6.0);
        assert_eq!(count.get(), 1);

        params.add_bricks(3);
        assert_eq!(count.get(), 2);
        assert_eq!(params.total_bricks(), 3);
    }

    #[test]
    fn test_min_max_single_notification() {
        let mut params = TowerParameters::new(1);
        let count = counting(&mut params);
        params.set_min_brick_height(10.0);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_batch_edit_fires_once() {
        let mut params = TowerParameters::new(1);
        let count = counting(&mut params);
        params.batch_edit(|p| {
            p.set_radius(9.0);
            p.batch_edit(|p| p.set_brick_depth(1.0));
            p.add_bricks(40);
        });
        assert_eq!(count.get(), 1);
        assert_eq!(params.revision(), 1);

        params.batch_edit(|p| p.set_radius(9.0));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let mut params = TowerParameters::new(1);
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let id = params.on_change(move |_| c.set(c.get() + 1));
        params.add_bricks(1);
        assert!(params.unsubscribe(id));
        assert!(!params.unsubscribe(id));
        params.add_bricks(1);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_failing_listener_does_not_block_others() {
        let mut params = TowerParameters::new(1);
        params.subscribe(|_| Err("listener exploded".into()));
        let count = counting(&mut params);

        params.add_bricks(5);
        assert_eq!(count.get(), 1);

        let errors = params.take_listener_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "listener exploded");
        assert!(params.take_listener_errors().is_empty());
    }

    #[test]
    fn test_listener_sees_new_values() {
        let mut params = TowerParameters::new(1);
        let seen = Rc::new(Cell::new(0usize));
        let s = seen.clone();
        params.on_change(move |p| s.set(p.height()));
        params.set_total_bricks(25);
        assert_eq!(seen.get(), 4);
    }
}
