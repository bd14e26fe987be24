//! Pixel → micron calibration.

use serde::{Deserialize, Serialize};

/// Fallback scale when the calibration module has not provided one.
pub const DEFAULT_UM_PER_PIXEL: f64 = 0.14;

/// Linear scale factor from image pixels to physical microns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub um_per_pixel: f64,
}

impl Calibration {
    pub fn new(um_per_pixel: f64) -> Self {
        Self { um_per_pixel }
    }

    pub fn to_um(&self, px: f64) -> f64 {
        px * self.um_per_pixel
    }

    pub fn diameter_um(&self, radius_px: f64) -> f64 {
        self.to_um(radius_px * 2.0)
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new(DEFAULT_UM_PER_PIXEL)
    }
}
