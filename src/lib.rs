//! # tubercle-rs — Tubercle Pattern Graphs and Hexagonalness
//!
//! Editable tubercle/ITC graphs over fish-scale microscope images, scored
//! against an ideal hexagonal lattice.
//!
//! ## Design Principles
//!
//! 1. **Scoring is a pure function**: `compute_hexagonalness(points, edges, weights)`
//! 2. **Clean DTOs**: `Point`, `Edge`, `HexMetrics` cross all boundaries
//! 3. **One state per set**: no globals; duplicate a set by cloning its `Editor`
//! 4. **Every edit is a record**: undo/redo replays tagged `EditRecord`s
//!
//! ## Quick Start
//!
//! ```rust
//! use tubercle_rs::{Editor, EditorConfig};
//!
//! let mut editor = Editor::new(EditorConfig::default());
//! let a = editor.add_point(0.0, 0.0, Some(5.0));
//! let b = editor.add_point(30.0, 0.0, Some(5.0));
//! editor.connect(a, b).unwrap();
//!
//! assert_eq!(editor.state().edges().len(), 1);
//! editor.undo();
//! assert!(editor.state().edges().is_empty());
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `model` | Points, edges, calibration |
//! | `score` | Hexagonalness engine and summary statistics |
//! | `state` | Pattern graph with invariant maintenance |
//! | `history` | Undo/redo records |
//! | `chain` | Chain-placement navigation |
//! | `boundary` | Boundary classification, debounce, async service |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod score;
pub mod state;
pub mod history;
pub mod chain;
pub mod boundary;
pub mod config;
pub mod export;

// ============================================================================
// Re-exports
// ============================================================================

pub use model::{Calibration, Edge, EdgeKey, Point, PointId, Source};
pub use score::{compute_hexagonalness, HexMetrics, PatternStats, Reliability, ScoreWeights};
pub use state::PatternGraphState;
pub use history::{EditKind, EditRecord, History, HistoryEntry, OpId};
pub use chain::ChainNavigator;
pub use boundary::{BoundaryClassifier, BoundaryInput, BoundaryService, ConvexHullClassifier};
pub use config::EditorConfig;

// ============================================================================
// Editor
// ============================================================================

/// Result of a chain-mode click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPlacement {
    /// Click landed on an existing point, which is now current.
    Selected(PointId),
    /// A new point was created, connected to the previous current point if any.
    Created { id: PointId, edge: Option<EdgeKey> },
}

/// One annotation set: its state, undo history, and chain cursor.
#[derive(Debug, Clone)]
pub struct Editor {
    state: PatternGraphState,
    history: History,
    chain: ChainNavigator,
    config: EditorConfig,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            state: PatternGraphState::new(&config),
            history: History::new(config.history_limit),
            chain: ChainNavigator::new(),
            config,
        }
    }

    pub fn state(&self) -> &PatternGraphState { &self.state }
    pub fn history(&self) -> &History { &self.history }
    pub fn chain(&self) -> &ChainNavigator { &self.chain }
    pub fn config(&self) -> &EditorConfig { &self.config }

    /// Current hexagonalness, recomputed lazily after edits.
    pub fn metrics(&self) -> &HexMetrics {
        self.state.metrics()
    }

    // ========================================================================
    // Edits
    // ========================================================================

    pub fn add_point(&mut self, x: f64, y: f64, radius_px: Option<f64>) -> PointId {
        let record = self.state.add_point(x, y, radius_px);
        let id = record.created_points()[0];
        self.history.push(record);
        id
    }

    /// Chain-mode click at `(x, y)`.
    pub fn add_chain_point(&mut self, x: f64, y: f64) -> ChainPlacement {
        if let Some(hit) = self.state.hit_test(x, y, self.config.chain_hit_factor) {
            self.chain.select(hit);
            return ChainPlacement::Selected(hit);
        }

        let previous = self.chain.current().filter(|id| self.state.contains_point(*id));
        let point = self.state.new_manual_point(x, y, None);
        self.state.insert_point(point.clone());

        let edge = match previous {
            Some(prev) => match self.state.connect(prev, point.id) {
                Ok(Some(EditRecord::Connect { edge })) => Some(edge),
                _ => None,
            },
            None => None,
        };
        let edge_key = edge.as_ref().map(|e| e.key());

        self.chain.placed(point.id, previous);
        tracing::debug!(id = %point.id, parent = ?previous, "chain point placed");

        let id = point.id;
        self.history.push(EditRecord::AddChainPoint { point, edge, previous_current: previous });
        ChainPlacement::Created { id, edge: edge_key }
    }

    /// Connect two points. `Ok(None)` if either does not exist.
    pub fn connect(&mut self, a: PointId, b: PointId) -> Result<Option<EdgeKey>> {
        let Some(record) = self.state.connect(a, b)? else {
            return Ok(None);
        };
        self.history.push(record);
        Ok(Some(EdgeKey::new(a, b)))
    }

    pub fn move_point(&mut self, id: PointId, x: f64, y: f64) -> bool {
        self.record(|s| s.move_point(id, x, y))
    }

    pub fn resize_point(&mut self, id: PointId, radius_px: f64) -> bool {
        self.record(|s| s.resize_point(id, radius_px))
    }

    pub fn delete_point(&mut self, id: PointId) -> bool {
        self.record(|s| s.delete_point(id))
    }

    pub fn delete_edge(&mut self, a: PointId, b: PointId) -> bool {
        self.record(|s| s.delete_edge(a, b))
    }

    pub fn batch_delete(&mut self, points: &[PointId], edges: &[(PointId, PointId)]) -> bool {
        self.record(|s| s.batch_delete(points, edges))
    }

    fn record(&mut self, op: impl FnOnce(&mut PatternGraphState) -> Option<EditRecord>) -> bool {
        let Some(record) = op(&mut self.state) else {
            return false;
        };
        self.chain.forget(&record.removed_points());
        self.history.push(record);
        true
    }

    // ========================================================================
    // Undo / redo
    // ========================================================================

    pub fn undo(&mut self) -> Option<EditKind> {
        let record = self.history.undo(&mut self.state)?;
        match record {
            EditRecord::AddChainPoint { point, previous_current, .. } => {
                self.chain.unplace(point.id, *previous_current);
            }
            EditRecord::AddPoint { point } => self.chain.forget(&[point.id]),
            _ => {}
        }
        Some(record.kind())
    }

    pub fn redo(&mut self) -> Option<EditKind> {
        let record = self.history.redo(&mut self.state)?;
        match record {
            EditRecord::AddChainPoint { point, previous_current, .. } => {
                self.chain.placed(point.id, *previous_current);
            }
            other => self.chain.forget(&other.removed_points()),
        }
        Some(record.kind())
    }

    // ========================================================================
    // Chain navigation
    // ========================================================================

    pub fn chain_to_parent(&mut self) -> Result<PointId> {
        self.chain.go_to_parent(&self.state)
    }

    pub fn chain_cycle_neighbors(&mut self) -> Result<PointId> {
        self.chain.cycle_neighbors(&self.state)
    }

    pub fn chain_to_cycled(&mut self) -> Result<PointId> {
        self.chain.go_to_cycled(&self.state)
    }

    // ========================================================================
    // Wholesale / settings
    // ========================================================================

    /// Replace the whole set. History and chain state start over.
    pub fn load(&mut self, points: Vec<Point>, edges: &[(PointId, PointId)]) {
        self.state.load(points, edges);
        self.history.clear();
        self.chain.clear();
    }

    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.config.um_per_pixel = calibration.um_per_pixel;
        self.state.set_calibration(calibration);
    }

    pub fn set_weights(&mut self, weights: ScoreWeights) {
        self.config.weights = weights;
        self.state.set_weights(weights);
    }

    /// Apply boundary flags computed for `generation`; see
    /// [`PatternGraphState::apply_boundary`].
    pub fn apply_boundary(&mut self, generation: u64, flags: &hashbrown::HashMap<PointId, bool>) -> bool {
        self.state.apply_boundary(generation, flags)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid edge: cannot connect point {0} to itself")]
    SelfLoop(PointId),

    #[error("Edge already exists: {0}")]
    DuplicateEdge(EdgeKey),

    #[error("At root: point {0} has no parent")]
    AtRoot(PointId),

    #[error("No current point")]
    NoCurrent,

    #[error("Point {0} has no neighbors")]
    NoNeighbors(PointId),

    #[error("Boundary classification error: {0}")]
    Classification(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
