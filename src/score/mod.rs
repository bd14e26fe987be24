//! # Hexagonalness Scoring
//!
//! Estimates how closely a tubercle graph approximates a regular hexagonal
//! lattice. Pure and total: any finite input yields metrics, degrading to
//! defaults when there is too little data.
//!
//! ```text
//! score = w_spacing · spacing_uniformity     (edge gap CV, all edges)
//!       + w_degree  · degree_score           (interior degrees near 6)
//!       + w_ratio   · edge_ratio_score       (|edges| / n_interior near 3)
//! ```
//!
//! Boundary points are excluded from the degree and ratio terms: a lattice
//! patch's perimeter is structurally under-connected. A point with unknown
//! classification counts as boundary.

pub mod stats;

use std::collections::BTreeMap;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::model::{Edge, Point, PointId};

pub use stats::{summarize, PatternStats};

/// Below this many points no shape statistic is computed.
pub const MIN_POINTS: usize = 4;

/// Interior count at which reliability becomes `High`.
pub const HIGH_RELIABILITY_INTERIOR: usize = 15;

/// Ideal edges per interior node in a hexagonal lattice.
pub const IDEAL_EDGE_RATIO: f64 = 3.0;

// ============================================================================
// Weights
// ============================================================================

/// Composite weights. Not required to sum to 1 and never normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub spacing: f64,
    pub degree: f64,
    pub edge_ratio: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { spacing: 0.40, degree: 0.45, edge_ratio: 0.15 }
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// How much interior data backs the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    #[default]
    None,
    Low,
    High,
}

impl Reliability {
    pub fn from_interior_count(n_interior: usize) -> Self {
        if n_interior >= HIGH_RELIABILITY_INTERIOR {
            Reliability::High
        } else if n_interior >= MIN_POINTS {
            Reliability::Low
        } else {
            Reliability::None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HexMetrics {
    pub hexagonalness_score: f64,
    pub spacing_uniformity: f64,
    pub degree_score: f64,
    pub edge_ratio_score: f64,
    pub mean_degree: f64,
    /// Interior points by connection degree.
    pub degree_histogram: BTreeMap<usize, usize>,
    pub spacing_cv: f64,
    pub reliability: Reliability,
    pub n_nodes: usize,
    pub n_interior_nodes: usize,
}

impl HexMetrics {
    /// Metrics for an input too small to score.
    pub fn insufficient(n_nodes: usize) -> Self {
        Self {
            hexagonalness_score: 0.0,
            spacing_uniformity: 0.0,
            degree_score: 0.0,
            edge_ratio_score: 0.0,
            mean_degree: 0.0,
            degree_histogram: BTreeMap::new(),
            spacing_cv: 1.0,
            reliability: Reliability::None,
            n_nodes,
            n_interior_nodes: 0,
        }
    }
}

impl Default for HexMetrics {
    fn default() -> Self {
        Self::insufficient(0)
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Score a point/edge set against an ideal hexagonal lattice.
pub fn compute_hexagonalness(points: &[Point], edges: &[Edge], weights: ScoreWeights) -> HexMetrics {
    let mut metrics = HexMetrics::insufficient(points.len());
    if points.len() < MIN_POINTS {
        return metrics;
    }

    let interior: Vec<PointId> = points.iter().filter(|p| p.is_interior()).map(|p| p.id).collect();
    let n_interior = interior.len();
    metrics.n_interior_nodes = n_interior;
    metrics.reliability = Reliability::from_interior_count(n_interior);

    if let Some(cv) = spacing_cv(edges) {
        metrics.spacing_cv = cv;
        metrics.spacing_uniformity = (1.0 - 2.0 * cv).max(0.0);
    }

    if n_interior > 0 {
        let degrees = degree_counts(edges);
        let interior_degrees: Vec<usize> = interior
            .iter()
            .map(|id| degrees.get(id).copied().unwrap_or(0))
            .collect();

        let total: usize = interior_degrees.iter().sum();
        metrics.mean_degree = total as f64 / n_interior as f64;

        let mut weight_sum = 0.0;
        for &d in &interior_degrees {
            *metrics.degree_histogram.entry(d).or_insert(0) += 1;
            weight_sum += degree_weight(d);
        }
        metrics.degree_score = weight_sum / n_interior as f64;

        let ratio = edges.len() as f64 / n_interior as f64;
        metrics.edge_ratio_score = (1.0 - (ratio - IDEAL_EDGE_RATIO).abs() / 2.0).max(0.0);
    }

    metrics.hexagonalness_score = weights.spacing * metrics.spacing_uniformity
        + weights.degree * metrics.degree_score
        + weights.edge_ratio * metrics.edge_ratio_score;

    metrics
}

/// Per-point weight for how hexagonal a connection degree is.
pub fn degree_weight(degree: usize) -> f64 {
    match degree {
        5..=7 => 1.0,
        4 | 8 => 0.7,
        3 | 9 => 0.3,
        _ => 0.0,
    }
}

/// Coefficient of variation of positive edge gaps (population variance).
/// `None` when no edge has a positive gap.
fn spacing_cv(edges: &[Edge]) -> Option<f64> {
    let spacings: Vec<f64> = edges
        .iter()
        .map(|e| e.edge_distance_um)
        .filter(|&d| d > 0.0)
        .collect();
    if spacings.is_empty() {
        return None;
    }

    let n = spacings.len() as f64;
    let mean = spacings.iter().sum::<f64>() / n;
    let variance = spacings.iter().map(|d| (d - mean).powi(2)).sum::<f64>() / n;
    Some(if mean == 0.0 { 1.0 } else { variance.sqrt() / mean })
}

/// Degree of every point touched by the edge set.
fn degree_counts(edges: &[Edge]) -> HashMap<PointId, usize> {
    let mut degrees = HashMap::new();
    for edge in edges {
        *degrees.entry(edge.id1).or_insert(0) += 1;
        *degrees.entry(edge.id2).or_insert(0) += 1;
    }
    degrees
}

// ============================================================================
// Tests
// ============================================================================
