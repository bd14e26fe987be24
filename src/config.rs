//! Editor configuration.
//!
//! Every field has a default, so a partial JSON document (or `{}`) is a
//! valid configuration.

use std::time::Duration;
use serde::{Deserialize, Serialize};

use crate::boundary::debounce::DEFAULT_DEBOUNCE;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::model::{Calibration, DEFAULT_UM_PER_PIXEL};
use crate::score::ScoreWeights;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub weights: ScoreWeights,
    pub um_per_pixel: f64,
    pub debounce_ms: u64,
    /// Radius for a manual point when the set is empty.
    pub default_radius_px: f64,
    pub min_radius_px: f64,
    /// Chain mode selects an existing point within `factor × radius`.
    pub chain_hit_factor: f64,
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            um_per_pixel: DEFAULT_UM_PER_PIXEL,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            default_radius_px: 10.0,
            min_radius_px: 2.0,
            chain_hit_factor: 1.5,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn calibration(&self) -> Calibration {
        Calibration::new(self.um_per_pixel)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
