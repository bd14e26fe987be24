//! Edge (ITC, inter-tubercle connection) in the pattern graph.

use serde::{Deserialize, Serialize};
use super::{Calibration, Point, PointId};

/// Unordered endpoint pair. `lo <= hi` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    lo: PointId,
    hi: PointId,
}

impl EdgeKey {
    pub fn new(a: PointId, b: PointId) -> Self {
        if a <= b { Self { lo: a, hi: b } } else { Self { lo: b, hi: a } }
    }

    pub fn lo(&self) -> PointId { self.lo }
    pub fn hi(&self) -> PointId { self.hi }

    pub fn contains(&self, id: PointId) -> bool {
        self.lo == id || self.hi == id
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.lo, self.hi)
    }
}

/// An undirected connection between two distinct points.
///
/// Endpoint coordinates and distances are a denormalized snapshot of the
/// two points; the owning state refreshes them on every point mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id1: PointId,
    pub id2: PointId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub center_distance_um: f64,
    /// Gap between the two circles, clamped to zero on overlap.
    pub edge_distance_um: f64,
}

impl Edge {
    /// Build an edge between `a` and `b`, keeping `a` as `id1`.
    pub fn between(a: &Point, b: &Point, calibration: Calibration) -> Self {
        let mut edge = Self {
            id1: a.id,
            id2: b.id,
            x1: 0.0,
            y1: 0.0,
            x2: 0.0,
            y2: 0.0,
            center_distance_um: 0.0,
            edge_distance_um: 0.0,
        };
        edge.refresh(a, b, calibration);
        edge
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.id1, self.id2)
    }

    /// The "other" end of the edge from the given point.
    pub fn other_point(&self, from: PointId) -> Option<PointId> {
        if from == self.id1 { Some(self.id2) }
        else if from == self.id2 { Some(self.id1) }
        else { None }
    }

    /// Re-snapshot endpoints and distances. `a` must be `id1`, `b` must be `id2`.
    pub fn refresh(&mut self, a: &Point, b: &Point, calibration: Calibration) {
        debug_assert_eq!(a.id, self.id1);
        debug_assert_eq!(b.id, self.id2);
        self.x1 = a.x;
        self.y1 = a.y;
        self.x2 = b.x;
        self.y2 = b.y;

        let center_px = (b.x - a.x).hypot(b.y - a.y);
        let gap_px = (center_px - a.radius_px - b.radius_px).max(0.0);
        self.center_distance_um = calibration.to_um(center_px);
        self.edge_distance_um = calibration.to_um(gap_px);
    }
}
