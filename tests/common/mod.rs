//! Shared fixtures for the end-to-end tests.

#![allow(dead_code)]

use tubercle_rs::{Calibration, Point, PointId};

pub const SQRT3: f64 = 1.732_050_807_568_877_2;

/// A 19-point hexagonal patch: center, ring of 6, ring of 12.
///
/// Returns points (outer ring marked boundary, the rest interior) and the
/// pairs at lattice spacing that touch at least one interior point.
pub fn hex_patch(spacing: f64, radius: f64, cal: Calibration) -> (Vec<Point>, Vec<(PointId, PointId)>) {
    let mut points = Vec::new();
    let mut next = 1u64;
    for q in -2i32..=2 {
        for r in -2i32..=2 {
            let ring = q.abs().max(r.abs()).max((q + r).abs());
            if ring > 2 {
                continue;
            }
            let x = spacing * (q as f64 + r as f64 / 2.0);
            let y = spacing * (r as f64 * SQRT3 / 2.0);
            points.push(Point::new(PointId(next), x, y, radius, cal).with_boundary(ring == 2));
            next += 1;
        }
    }

    let mut pairs = Vec::new();
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            let d = (a.x - b.x).hypot(a.y - b.y);
            let adjacent = (d - spacing).abs() < 1e-6 * spacing;
            if adjacent && (a.is_interior() || b.is_interior()) {
                pairs.push((a.id, b.id));
            }
        }
    }
    (points, pairs)
}
