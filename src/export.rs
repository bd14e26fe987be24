//! JSON snapshot export for the rendering / statistics layer.
//!
//! ```text
//! PatternGraphState → export_json() → { generation, points, edges, metrics, stats }
//! ```
//!
//! This is a read-only view of one moment; it is not a save format.

use std::io::Write;
use serde::Serialize;

use crate::model::{Edge, Point};
use crate::score::{HexMetrics, PatternStats};
use crate::state::PatternGraphState;
use crate::Result;

#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub generation: u64,
    pub um_per_pixel: f64,
    pub points: &'a [Point],
    pub edges: &'a [Edge],
    pub metrics: &'a HexMetrics,
    pub stats: PatternStats,
}

impl<'a> Snapshot<'a> {
    pub fn of(state: &'a PatternGraphState) -> Self {
        Self {
            generation: state.generation(),
            um_per_pixel: state.calibration().um_per_pixel,
            points: state.points(),
            edges: state.edges(),
            metrics: state.metrics(),
            stats: state.stats(),
        }
    }
}

/// Write a pretty-printed JSON snapshot of `state`.
pub fn export_json(state: &PatternGraphState, writer: &mut dyn Write) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &Snapshot::of(state))?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_shape() {
        let mut state = PatternGraphState::default();
        state.add_point(0.0, 0.0, Some(3.0));
        state.add_point(20.0, 0.0, Some(3.0));
        let (a, b) = (state.points()[0].id, state.points()[1].id);
        state.connect(a, b).unwrap();

        let mut buf = Vec::new();
        export_json(&state, &mut buf).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(json["points"].as_array().unwrap().len(), 2);
        assert_eq!(json["edges"].as_array().unwrap().len(), 1);
        assert_eq!(json["points"][0]["source"], "manual");
        assert_eq!(json["metrics"]["reliability"], "none");
        assert_eq!(json["stats"]["n_itcs"], 1);
    }
}
