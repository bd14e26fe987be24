//! # Boundary Classification
//!
//! Decides which points sit on the outer perimeter of the pattern. Boundary
//! points are excluded from the degree and edge-ratio terms of the score.
//!
//! The geometric rule is injected through [`BoundaryClassifier`]; the
//! crate only fixes the contract around it:
//!
//! | Piece | Module | Role |
//! |-------|--------|------|
//! | `classify_with_fallback` | here | fewer than 3 points → all boundary |
//! | `ConvexHullClassifier` | here | default in-process classifier |
//! | `Debouncer` | `debounce` | collapse edit bursts into one run |
//! | `BoundaryService` | `service` | async driver, drops stale results |

pub mod debounce;
pub mod service;

use async_trait::async_trait;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::PointId;
use crate::Result;

pub use debounce::Debouncer;
pub use service::BoundaryService;

/// A set of fewer points than this cannot enclose an interior.
pub const MIN_ENCLOSING_POINTS: usize = 3;

/// Per-point classifier input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryInput {
    pub id: PointId,
    pub x: f64,
    pub y: f64,
}

/// Classifier input tagged with the state generation it was taken from.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRequest {
    pub generation: u64,
    pub points: Vec<BoundaryInput>,
}

/// Classifies points as boundary (`true`) or interior (`false`).
///
/// Implementations may be remote; IDs missing from the result keep their
/// previous classification.
#[async_trait]
pub trait BoundaryClassifier: Send + Sync {
    async fn classify(&self, points: &[BoundaryInput]) -> Result<HashMap<PointId, bool>>;
}

/// Run `classifier`, except when the set is too small to have an interior.
pub async fn classify_with_fallback<C>(
    classifier: &C,
    points: &[BoundaryInput],
) -> Result<HashMap<PointId, bool>>
where
    C: BoundaryClassifier + ?Sized,
{
    if points.len() < MIN_ENCLOSING_POINTS {
        return Ok(points.iter().map(|p| (p.id, true)).collect());
    }
    classifier.classify(points).await
}

// ============================================================================
// ConvexHullClassifier
// ============================================================================

/// Marks every point lying on the convex hull (vertices and points on hull
/// edges) as boundary.
#[derive(Debug, Clone, Copy)]
pub struct ConvexHullClassifier {
    /// Max distance in pixels from a hull edge to still count as on it.
    pub tolerance_px: f64,
}

impl Default for ConvexHullClassifier {
    fn default() -> Self {
        Self { tolerance_px: 1e-6 }
    }
}

impl ConvexHullClassifier {
    pub fn classify_sync(&self, points: &[BoundaryInput]) -> HashMap<PointId, bool> {
        let hull = convex_hull(points);
        if hull.len() < MIN_ENCLOSING_POINTS {
            return points.iter().map(|p| (p.id, true)).collect();
        }
        let tol2 = self.tolerance_px * self.tolerance_px;
        points
            .iter()
            .map(|p| {
                let on_hull = (0..hull.len()).any(|i| {
                    let a = hull[i];
                    let b = hull[(i + 1) % hull.len()];
                    segment_distance_sq(p.x, p.y, a, b) <= tol2
                });
                (p.id, on_hull)
            })
            .collect()
    }
}

#[async_trait]
impl BoundaryClassifier for ConvexHullClassifier {
    async fn classify(&self, points: &[BoundaryInput]) -> Result<HashMap<PointId, bool>> {
        Ok(self.classify_sync(points))
    }
}

#[inline]
fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Strict hull vertices (collinear points dropped), counter-clockwise.
fn convex_hull(points: &[BoundaryInput]) -> Vec<(f64, f64)> {
    let mut pts: Vec<(f64, f64)> = points.iter().map(|p| (p.x, p.y)).collect();
    pts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<(f64, f64)> = Vec::with_capacity(pts.len());
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<(f64, f64)> = Vec::with_capacity(pts.len());
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Squared distance from `(px, py)` to segment `ab`.
fn segment_distance_sq(px: f64, py: f64, a: (f64, f64), b: (f64, f64)) -> f64 {
    let (abx, aby) = (b.0 - a.0, b.1 - a.1);
    let ab2 = abx * abx + aby * aby;
    let t = if ab2 == 0.0 {
        0.0
    } else {
        (((px - a.0) * abx + (py - a.1) * aby) / ab2).clamp(0.0, 1.0)
    };
    let (qx, qy) = (a.0 + t * abx, a.1 + t * aby);
    (px - qx).powi(2) + (py - qy).powi(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(id: u64, x: f64, y: f64) -> BoundaryInput {
        BoundaryInput { id: PointId(id), x, y }
    }

    #[test]
    fn test_square_with_center() {
        let points = vec![
            input(1, 0.0, 0.0),
            input(2, 10.0, 0.0),
            input(3, 10.0, 10.0),
            input(4, 0.0, 10.0),
            input(5, 5.0, 5.0),
            input(6, 5.0, 0.0),
        ];
        let flags = ConvexHullClassifier::default().classify_sync(&points);
        for id in [1, 2, 3, 4, 6] {
            assert!(flags[&PointId(id)], "point {id} should be boundary");
        }
        assert!(!flags[&PointId(5)]);
    }

    #[test]
    fn test_collinear_all_boundary() {
        let points: Vec<BoundaryInput> = (0..5).map(|i| input(i, i as f64, 2.0 * i as f64)).collect();
        let flags = ConvexHullClassifier::default().classify_sync(&points);
        assert!(flags.values().all(|b| *b));
    }

    #[tokio::test]
    async fn test_fallback_below_three_points() {
        struct Never;
        #[async_trait]
        impl BoundaryClassifier for Never {
            async fn classify(&self, _: &[BoundaryInput]) -> Result<HashMap<PointId, bool>> {
                Err(crate::Error::Classification("should not be called".into()))
            }
        }

        let points = vec![input(1, 0.0, 0.0), input(2, 5.0, 5.0)];
        let flags = classify_with_fallback(&Never, &points).await.unwrap();
        assert_eq!(flags.len(), 2);
        assert!(flags.values().all(|b| *b));
    }
}
