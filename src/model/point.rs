//! Point (tubercle) in the pattern graph.

use serde::{Deserialize, Serialize};
use super::Calibration;

/// Opaque point identifier. Assigned monotonically, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PointId(pub u64);

impl std::fmt::Display for PointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a point came from. Only affects rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    #[default]
    Extracted,
    Manual,
    DebugSeed,
}

/// A tubercle: a detected or manually placed circular feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: PointId,
    pub x: f64,
    pub y: f64,
    pub radius_px: f64,
    /// Derived: `radius_px * 2 * um_per_pixel`.
    pub diameter_um: f64,
    pub circularity: f64,
    pub source: Source,
    /// `None` means not yet classified; scoring treats it as boundary.
    pub is_boundary: Option<bool>,
}

impl Point {
    pub fn new(id: PointId, x: f64, y: f64, radius_px: f64, calibration: Calibration) -> Self {
        Self {
            id,
            x,
            y,
            radius_px,
            diameter_um: calibration.diameter_um(radius_px),
            circularity: 1.0,
            source: Source::Extracted,
            is_boundary: None,
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    pub fn with_circularity(mut self, circularity: f64) -> Self {
        self.circularity = circularity;
        self
    }

    pub fn with_boundary(mut self, is_boundary: bool) -> Self {
        self.is_boundary = Some(is_boundary);
        self
    }

    /// Interior only when classification has explicitly said so.
    pub fn is_interior(&self) -> bool {
        self.is_boundary == Some(false)
    }

    pub fn distance_px(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }

    /// Recompute `diameter_um` after a radius or calibration change.
    pub fn refresh_diameter(&mut self, calibration: Calibration) {
        self.diameter_um = calibration.diameter_um(self.radius_px);
    }
}
