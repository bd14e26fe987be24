//! Summary statistics shown alongside the hexagonalness score.

use serde::{Deserialize, Serialize};
use crate::model::{Edge, Point};

/// Mean and population standard deviation. Zero for an empty sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MeanStd {
    pub mean: f64,
    pub std: f64,
}

impl MeanStd {
    pub fn of(values: impl IntoIterator<Item = f64>) -> Self {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return Self::default();
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Self { mean, std: variance.sqrt() }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternStats {
    pub n_tubercles: usize,
    pub diameter_um: MeanStd,
    pub n_itcs: usize,
    pub center_distance_um: MeanStd,
    pub edge_distance_um: MeanStd,
}

pub fn summarize(points: &[Point], edges: &[Edge]) -> PatternStats {
    PatternStats {
        n_tubercles: points.len(),
        diameter_um: MeanStd::of(points.iter().map(|p| p.diameter_um)),
        n_itcs: edges.len(),
        center_distance_um: MeanStd::of(edges.iter().map(|e| e.center_distance_um)),
        edge_distance_um: MeanStd::of(edges.iter().map(|e| e.edge_distance_um)),
    }
}
