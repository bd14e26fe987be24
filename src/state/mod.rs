//! In-memory pattern graph state.
//!
//! Owns the points and edges of one annotation set and keeps them
//! consistent: unique IDs, no self-loops, no duplicate edges, no dangling
//! endpoints, and edge snapshots that always match current point geometry.
//!
//! Every mutation bumps the generation counter and drops the cached score.
//! The generation is what boundary reclassification is keyed on: a
//! classification computed for an older generation is discarded. The time
//! of the last bump (`edited_at`) is where the reclassification debounce
//! window starts.
//!
//! ## Layout
//!
//! - `points`: sorted by ID (IDs are monotonic, so this is creation order)
//! - `edges`: insertion order, which is also render order
//! - `edge_keys`: unordered pair index for duplicate checks
//! - `adjacency`: point → neighbor IDs

use std::cell::OnceCell;
use std::time::Instant;
use hashbrown::{HashMap, HashSet};
use smallvec::SmallVec;

use crate::boundary::{BoundaryInput, BoundaryRequest};
use crate::config::EditorConfig;
use crate::history::EditRecord;
use crate::model::*;
use crate::score::{compute_hexagonalness, summarize, HexMetrics, PatternStats, ScoreWeights};
use crate::{Error, Result};

type Neighbors = SmallVec<[PointId; 8]>;

// ============================================================================
// PatternGraphState
// ============================================================================

#[derive(Debug, Clone)]
pub struct PatternGraphState {
    points: Vec<Point>,
    edges: Vec<Edge>,
    edge_keys: HashSet<EdgeKey>,
    adjacency: HashMap<PointId, Neighbors>,
    next_id: u64,
    calibration: Calibration,
    weights: ScoreWeights,
    default_radius_px: f64,
    min_radius_px: f64,
    generation: u64,
    /// When the generation last moved, on the tokio clock.
    edited_at: Option<Instant>,
    score_cache: OnceCell<HexMetrics>,
}

impl PatternGraphState {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            points: Vec::new(),
            edges: Vec::new(),
            edge_keys: HashSet::new(),
            adjacency: HashMap::new(),
            next_id: 1,
            calibration: config.calibration(),
            weights: config.weights,
            default_radius_px: config.default_radius_px,
            min_radius_px: config.min_radius_px,
            generation: 0,
            edited_at: None,
            score_cache: OnceCell::new(),
        }
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn points(&self) -> &[Point] { &self.points }
    pub fn edges(&self) -> &[Edge] { &self.edges }
    pub fn calibration(&self) -> Calibration { self.calibration }
    pub fn weights(&self) -> ScoreWeights { self.weights }
    pub fn generation(&self) -> u64 { self.generation }
    pub fn edited_at(&self) -> Option<Instant> { self.edited_at }

    pub fn get_point(&self, id: PointId) -> Option<&Point> {
        self.index_of(id).map(|i| &self.points[i])
    }

    pub fn contains_point(&self, id: PointId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn has_edge(&self, a: PointId, b: PointId) -> bool {
        self.edge_keys.contains(&EdgeKey::new(a, b))
    }

    pub fn get_edge(&self, a: PointId, b: PointId) -> Option<&Edge> {
        let key = EdgeKey::new(a, b);
        self.edges.iter().find(|e| e.key() == key)
    }

    /// Neighbor IDs of a point, in edge creation order.
    pub fn neighbors(&self, id: PointId) -> &[PointId] {
        self.adjacency.get(&id).map(|n| n.as_slice()).unwrap_or(&[])
    }

    pub fn incident_edges(&self, id: PointId) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.id1 == id || e.id2 == id).collect()
    }

    /// Hexagonalness of the current state, computed at most once per generation.
    pub fn metrics(&self) -> &HexMetrics {
        self.score_cache
            .get_or_init(|| compute_hexagonalness(&self.points, &self.edges, self.weights))
    }

    pub fn stats(&self) -> PatternStats {
        summarize(&self.points, &self.edges)
    }

    /// Radius for a new point: mean of existing radii, else the configured default.
    pub fn default_radius(&self) -> f64 {
        if self.points.is_empty() {
            self.default_radius_px
        } else {
            self.points.iter().map(|p| p.radius_px).sum::<f64>() / self.points.len() as f64
        }
    }

    /// Nearest point whose hit circle (`factor × radius`) contains `(x, y)`.
    pub fn hit_test(&self, x: f64, y: f64, factor: f64) -> Option<PointId> {
        self.points
            .iter()
            .map(|p| (p, p.distance_px(x, y)))
            .filter(|(p, d)| *d <= factor * p.radius_px)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(p, _)| p.id)
    }

    // ========================================================================
    // Edit operations
    // ========================================================================

    /// Insert a manual point. Never creates edges.
    pub fn add_point(&mut self, x: f64, y: f64, radius_px: Option<f64>) -> EditRecord {
        let point = self.new_manual_point(x, y, radius_px);
        self.insert_point(point.clone());
        tracing::debug!(id = %point.id, x, y, "added point");
        EditRecord::AddPoint { point }
    }

    /// Build (but do not insert) a manual point with the next free ID.
    pub(crate) fn new_manual_point(&mut self, x: f64, y: f64, radius_px: Option<f64>) -> Point {
        let radius = radius_px.unwrap_or_else(|| self.default_radius()).max(self.min_radius_px);
        let id = PointId(self.next_id);
        self.next_id += 1;
        Point::new(id, x, y, radius, self.calibration)
            .with_source(Source::Manual)
            .with_circularity(1.0)
    }

    /// Connect two existing points. Missing points are ignored (`Ok(None)`).
    pub fn connect(&mut self, a: PointId, b: PointId) -> Result<Option<EditRecord>> {
        if a == b {
            return Err(Error::SelfLoop(a));
        }
        if self.has_edge(a, b) {
            return Err(Error::DuplicateEdge(EdgeKey::new(a, b)));
        }
        let Some(edge) = self.build_edge(a, b) else {
            return Ok(None);
        };
        self.insert_edge(edge.clone());
        tracing::debug!(edge = %edge.key(), "connected");
        Ok(Some(EditRecord::Connect { edge }))
    }

    pub fn move_point(&mut self, id: PointId, x: f64, y: f64) -> Option<EditRecord> {
        let from = self.get_point(id).map(|p| (p.x, p.y))?;
        self.set_position(id, x, y);
        tracing::debug!(%id, x, y, "moved point");
        Some(EditRecord::MovePoint { id, from, to: (x, y) })
    }

    /// Resize a point, clamped to the minimum radius.
    pub fn resize_point(&mut self, id: PointId, radius_px: f64) -> Option<EditRecord> {
        let from = self.get_point(id).map(|p| p.radius_px)?;
        let to = radius_px.max(self.min_radius_px);
        self.set_radius(id, to);
        tracing::debug!(%id, radius_px = to, "resized point");
        Some(EditRecord::ResizePoint { id, from, to })
    }

    /// Remove a point and every edge touching it.
    pub fn delete_point(&mut self, id: PointId) -> Option<EditRecord> {
        let (point, edges) = self.remove_point(id)?;
        tracing::debug!(%id, cascaded = edges.len(), "deleted point");
        Some(EditRecord::DeletePoint { point, edges })
    }

    pub fn delete_edge(&mut self, a: PointId, b: PointId) -> Option<EditRecord> {
        let edge = self.remove_edge(EdgeKey::new(a, b))?;
        tracing::debug!(edge = %edge.key(), "deleted edge");
        Some(EditRecord::DeleteEdge { edge })
    }

    /// Remove a selection of points and edges as one undoable step.
    ///
    /// The removed edge set is the union of the selected edges and every edge
    /// orphaned by a removed point, deduplicated by unordered pair. Returns
    /// `None` when nothing in the selection exists.
    pub fn batch_delete(
        &mut self,
        point_ids: &[PointId],
        edge_pairs: &[(PointId, PointId)],
    ) -> Option<EditRecord> {
        let doomed_points: HashSet<PointId> =
            point_ids.iter().copied().filter(|id| self.contains_point(*id)).collect();
        let mut doomed_keys: HashSet<EdgeKey> = edge_pairs
            .iter()
            .map(|(a, b)| EdgeKey::new(*a, *b))
            .filter(|k| self.edge_keys.contains(k))
            .collect();
        for edge in &self.edges {
            if doomed_points.contains(&edge.id1) || doomed_points.contains(&edge.id2) {
                doomed_keys.insert(edge.key());
            }
        }
        if doomed_points.is_empty() && doomed_keys.is_empty() {
            return None;
        }

        let edges: Vec<Edge> = self.edges.iter().filter(|e| doomed_keys.contains(&e.key())).cloned().collect();
        let points: Vec<Point> = self.points.iter().filter(|p| doomed_points.contains(&p.id)).cloned().collect();

        for edge in &edges {
            self.remove_edge(edge.key());
        }
        for point in &points {
            self.remove_point(point.id);
        }

        tracing::debug!(points = points.len(), edges = edges.len(), "batch delete");
        Some(EditRecord::BatchDelete { points, edges })
    }

    // ========================================================================
    // Replay
    // ========================================================================

    /// Apply a record forward (redo).
    pub fn apply(&mut self, record: &EditRecord) {
        match record {
            EditRecord::AddPoint { point } => {
                self.insert_point(point.clone());
            }
            EditRecord::AddChainPoint { point, edge, .. } => {
                self.insert_point(point.clone());
                if let Some(edge) = edge {
                    self.restore_edge(edge);
                }
            }
            EditRecord::Connect { edge } => {
                self.restore_edge(edge);
            }
            EditRecord::MovePoint { id, to, .. } => {
                self.set_position(*id, to.0, to.1);
            }
            EditRecord::ResizePoint { id, to, .. } => {
                self.set_radius(*id, *to);
            }
            EditRecord::DeletePoint { point, .. } => {
                self.remove_point(point.id);
            }
            EditRecord::DeleteEdge { edge } => {
                self.remove_edge(edge.key());
            }
            EditRecord::BatchDelete { points, edges } => {
                for edge in edges {
                    self.remove_edge(edge.key());
                }
                for point in points {
                    self.remove_point(point.id);
                }
            }
        }
    }

    /// Apply the inverse of a record (undo).
    pub fn revert(&mut self, record: &EditRecord) {
        match record {
            EditRecord::AddPoint { point } => {
                self.remove_point(point.id);
            }
            EditRecord::AddChainPoint { point, .. } => {
                self.remove_point(point.id);
            }
            EditRecord::Connect { edge } => {
                self.remove_edge(edge.key());
            }
            EditRecord::MovePoint { id, from, .. } => {
                self.set_position(*id, from.0, from.1);
            }
            EditRecord::ResizePoint { id, from, .. } => {
                self.set_radius(*id, *from);
            }
            EditRecord::DeletePoint { point, edges } => {
                self.insert_point(point.clone());
                for edge in edges {
                    self.restore_edge(edge);
                }
            }
            EditRecord::DeleteEdge { edge } => {
                self.restore_edge(edge);
            }
            EditRecord::BatchDelete { points, edges } => {
                for point in points {
                    self.insert_point(point.clone());
                }
                for edge in edges {
                    self.restore_edge(edge);
                }
            }
        }
    }

    // ========================================================================
    // Bulk / settings
    // ========================================================================

    /// Replace the whole state, e.g. with an extraction result.
    ///
    /// Edges that are self-loops, duplicates, or reference unknown points are
    /// dropped. Edge geometry is recomputed from the points.
    pub fn load(&mut self, points: Vec<Point>, edge_pairs: &[(PointId, PointId)]) {
        self.points.clear();
        self.edges.clear();
        self.edge_keys.clear();
        self.adjacency.clear();

        for mut point in points {
            if self.contains_point(point.id) {
                tracing::warn!(id = %point.id, "dropping point with duplicate id");
                continue;
            }
            point.refresh_diameter(self.calibration);
            self.insert_point(point);
        }
        self.next_id = self.points.last().map_or(1, |p| p.id.0 + 1);

        let mut dropped = 0usize;
        for &(a, b) in edge_pairs {
            if a == b || self.has_edge(a, b) {
                dropped += 1;
                continue;
            }
            match self.build_edge(a, b) {
                Some(edge) => self.insert_edge(edge),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::warn!(dropped, "dropped invalid edges on load");
        }
        self.touch();
        tracing::info!(points = self.points.len(), edges = self.edges.len(), "loaded pattern");
    }

    /// Change calibration and recompute every derived micron value.
    pub fn set_calibration(&mut self, calibration: Calibration) {
        self.calibration = calibration;
        for point in &mut self.points {
            point.refresh_diameter(calibration);
        }
        let ids: Vec<PointId> = self.points.iter().map(|p| p.id).collect();
        for id in ids {
            self.refresh_incident(id);
        }
        self.score_cache = OnceCell::new();
    }

    pub fn set_weights(&mut self, weights: ScoreWeights) {
        self.weights = weights;
        self.score_cache = OnceCell::new();
    }

    // ========================================================================
    // Boundary classification
    // ========================================================================

    /// Snapshot of what a boundary classifier needs, tagged with the generation.
    pub fn boundary_request(&self) -> BoundaryRequest {
        BoundaryRequest {
            generation: self.generation,
            points: self.points.iter().map(|p| BoundaryInput { id: p.id, x: p.x, y: p.y }).collect(),
        }
    }

    /// Apply a classification result. Discarded (returns false) when the
    /// state has changed since the request was taken. Unknown IDs are ignored.
    pub fn apply_boundary(&mut self, generation: u64, flags: &HashMap<PointId, bool>) -> bool {
        if generation != self.generation {
            tracing::debug!(stale = generation, current = self.generation, "discarding stale boundary flags");
            return false;
        }
        for point in &mut self.points {
            if let Some(&b) = flags.get(&point.id) {
                point.is_boundary = Some(b);
            }
        }
        self.score_cache = OnceCell::new();
        true
    }

    // ========================================================================
    // Primitives
    // ========================================================================

    fn index_of(&self, id: PointId) -> Option<usize> {
        self.points.binary_search_by_key(&id, |p| p.id).ok()
    }

    fn touch(&mut self) {
        self.generation += 1;
        self.edited_at = Some(tokio::time::Instant::now().into_std());
        self.score_cache = OnceCell::new();
        tracing::trace!(generation = self.generation, "state invalidated");
    }

    pub(crate) fn insert_point(&mut self, point: Point) {
        let id = point.id;
        match self.points.binary_search_by_key(&id, |p| p.id) {
            Ok(i) => self.points[i] = point,
            Err(i) => self.points.insert(i, point),
        }
        self.adjacency.entry(id).or_default();
        self.next_id = self.next_id.max(id.0 + 1);
        self.touch();
    }

    fn remove_point(&mut self, id: PointId) -> Option<(Point, Vec<Edge>)> {
        let idx = self.index_of(id)?;
        let keys: Vec<EdgeKey> = self.edges.iter().filter(|e| e.key().contains(id)).map(|e| e.key()).collect();
        let edges: Vec<Edge> = keys.into_iter().filter_map(|k| self.remove_edge(k)).collect();
        let point = self.points.remove(idx);
        self.adjacency.remove(&id);
        self.touch();
        Some((point, edges))
    }

    fn build_edge(&self, a: PointId, b: PointId) -> Option<Edge> {
        let pa = self.get_point(a)?;
        let pb = self.get_point(b)?;
        Some(Edge::between(pa, pb, self.calibration))
    }

    fn insert_edge(&mut self, edge: Edge) {
        let key = edge.key();
        if !self.edge_keys.insert(key) {
            return;
        }
        self.adjacency.entry(edge.id1).or_default().push(edge.id2);
        self.adjacency.entry(edge.id2).or_default().push(edge.id1);
        self.edges.push(edge);
        self.touch();
    }

    /// Re-insert a recorded edge with fresh geometry, keeping its orientation.
    fn restore_edge(&mut self, edge: &Edge) {
        if let Some(fresh) = self.build_edge(edge.id1, edge.id2) {
            self.insert_edge(fresh);
        }
    }

    fn remove_edge(&mut self, key: EdgeKey) -> Option<Edge> {
        if !self.edge_keys.remove(&key) {
            return None;
        }
        let idx = self.edges.iter().position(|e| e.key() == key)?;
        let edge = self.edges.remove(idx);
        if let Some(n) = self.adjacency.get_mut(&edge.id1) {
            n.retain(|other| *other != edge.id2);
        }
        if let Some(n) = self.adjacency.get_mut(&edge.id2) {
            n.retain(|other| *other != edge.id1);
        }
        self.touch();
        Some(edge)
    }

    fn set_position(&mut self, id: PointId, x: f64, y: f64) {
        let Some(idx) = self.index_of(id) else { return };
        self.points[idx].x = x;
        self.points[idx].y = y;
        self.refresh_incident(id);
        self.touch();
    }

    fn set_radius(&mut self, id: PointId, radius_px: f64) {
        let Some(idx) = self.index_of(id) else { return };
        let calibration = self.calibration;
        let point = &mut self.points[idx];
        point.radius_px = radius_px;
        point.refresh_diameter(calibration);
        self.refresh_incident(id);
        self.touch();
    }

    /// Re-snapshot every edge touching `id` from current point geometry.
    fn refresh_incident(&mut self, id: PointId) {
        let calibration = self.calibration;
        let points = &self.points;
        let lookup = |pid: PointId| {
            points.binary_search_by_key(&pid, |p| p.id).ok().map(|i| &points[i])
        };
        for edge in self.edges.iter_mut().filter(|e| e.id1 == id || e.id2 == id) {
            if let (Some(a), Some(b)) = (lookup(edge.id1), lookup(edge.id2)) {
                edge.refresh(a, b, calibration);
            }
        }
    }
}

impl Default for PatternGraphState {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

// ============================================================================
// Tests
// ============================================================================
