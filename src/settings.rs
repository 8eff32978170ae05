//! Tower shape settings
//!
//! Plain numeric configuration supplied by the host, typically loaded from a
//! level-design JSON file. Applied to `TowerParameters` as one batched edit.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::TowerError;
use crate::tower::TowerParameters;

/// Tower size presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TowerPreset {
    Small,
    #[default]
    Medium,
    Large,
}

impl TowerPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            TowerPreset::Small => "Small",
            TowerPreset::Medium => "Medium",
            TowerPreset::Large => "Large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" => Some(TowerPreset::Small),
            "medium" | "med" => Some(TowerPreset::Medium),
            "large" => Some(TowerPreset::Large),
            _ => None,
        }
    }

    /// Ring radius for this preset
    pub fn radius(&self) -> f32 {
        match self {
            TowerPreset::Small => 2.5,
            TowerPreset::Medium => DEFAULT_RADIUS,
            TowerPreset::Large => 12.0,
        }
    }

    /// Bricks per ring for this preset
    pub fn bricks_per_level(&self) -> usize {
        match self {
            TowerPreset::Small => 6,
            TowerPreset::Medium => DEFAULT_BRICKS_PER_LEVEL,
            TowerPreset::Large => 24,
        }
    }
}

/// Tower shape configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TowerSettings {
    /// Ring radius
    pub radius: f32,
    /// Radial depth of every brick
    pub brick_depth: f32,
    /// Brick height bounds (re-ordered on apply if reversed)
    pub min_brick_height: f32,
    pub max_brick_height: f32,
    /// Bricks in one full ring
    pub bricks_per_level: usize,
    /// Bricks built so far
    pub total_bricks: usize,
    /// 0 picks a random seed
    pub seed: u64,
    /// Width spread around the average (0.0 - 0.9)
    pub brick_width_variation: f32,
    /// Keep a partial top level in generation order instead of a seeded subset
    pub last_level_ordered: bool,
}

impl Default for TowerSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            brick_depth: DEFAULT_BRICK_DEPTH,
            min_brick_height: DEFAULT_MIN_BRICK_HEIGHT,
            max_brick_height: DEFAULT_MAX_BRICK_HEIGHT,
            bricks_per_level: DEFAULT_BRICKS_PER_LEVEL,
            total_bricks: 0,
            seed: 0,
            brick_width_variation: DEFAULT_WIDTH_VARIATION,
            last_level_ordered: false,
        }
    }
}

impl TowerSettings {
    /// Settings with a preset's radius and ring size
    pub fn from_preset(preset: TowerPreset) -> Self {
        Self {
            radius: preset.radius(),
            bricks_per_level: preset.bricks_per_level(),
            ..Self::default()
        }
    }

    /// Parse settings from JSON; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, TowerError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, TowerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, TowerError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded tower settings from {}", path.display());
        Ok(settings)
    }

    /// Write these settings into `params` as a single change
    pub fn apply_to(&self, params: &mut TowerParameters) {
        let (min, max) = if self.min_brick_height <= self.max_brick_height {
            (self.min_brick_height, self.max_brick_height)
        } else {
            (self.max_brick_height, self.min_brick_height)
        };

        params.batch_edit(|p| {
            p.set_radius(self.radius);
            p.set_brick_depth(self.brick_depth);
            // Widen first so the two bounds never drag each other
            p.set_max_brick_height(max.max(p.max_brick_height()));
            p.set_min_brick_height(min);
            p.set_max_brick_height(max);
            p.set_bricks_per_level(self.bricks_per_level);
            p.set_total_bricks(self.total_bricks);
            if self.seed != 0 {
                p.set_seed(self.seed);
            }
            p.set_brick_width_variation(self.brick_width_variation);
            p.set_last_level_ordered(self.last_level_ordered);
        });
    }
}
