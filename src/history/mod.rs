//! Undo/redo history.
//!
//! Every mutating edit yields exactly one [`EditRecord`] carrying enough
//! before/after data to replay it in either direction. Batch operations
//! produce one combined record. Replay lives in
//! [`PatternGraphState::apply`] / [`PatternGraphState::revert`], a single
//! exhaustive match per direction.

use std::collections::VecDeque;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Edge, Point, PointId};
use crate::state::PatternGraphState;

/// Default number of undo steps kept.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Opaque operation identifier, unique within one `History`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpId(pub u64);

/// Type tag of an edit, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    AddPoint,
    AddChainPoint,
    Connect,
    MovePoint,
    ResizePoint,
    DeletePoint,
    DeleteEdge,
    BatchDelete,
}

/// One reversible edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditRecord {
    AddPoint {
        point: Point,
    },
    /// Chain placement: the new point, the edge from the previous current
    /// point (if any), and that previous current point.
    AddChainPoint {
        point: Point,
        edge: Option<Edge>,
        previous_current: Option<PointId>,
    },
    Connect {
        edge: Edge,
    },
    MovePoint {
        id: PointId,
        from: (f64, f64),
        to: (f64, f64),
    },
    ResizePoint {
        id: PointId,
        from: f64,
        to: f64,
    },
    DeletePoint {
        point: Point,
        edges: Vec<Edge>,
    },
    DeleteEdge {
        edge: Edge,
    },
    BatchDelete {
        points: Vec<Point>,
        edges: Vec<Edge>,
    },
}

impl EditRecord {
    pub fn kind(&self) -> EditKind {
        match self {
            EditRecord::AddPoint { .. } => EditKind::AddPoint,
            EditRecord::AddChainPoint { .. } => EditKind::AddChainPoint,
            EditRecord::Connect { .. } => EditKind::Connect,
            EditRecord::MovePoint { .. } => EditKind::MovePoint,
            EditRecord::ResizePoint { .. } => EditKind::ResizePoint,
            EditRecord::DeletePoint { .. } => EditKind::DeletePoint,
            EditRecord::DeleteEdge { .. } => EditKind::DeleteEdge,
            EditRecord::BatchDelete { .. } => EditKind::BatchDelete,
        }
    }

    /// Points this record removes when applied forward.
    pub fn removed_points(&self) -> Vec<PointId> {
        match self {
            EditRecord::DeletePoint { point, .. } => vec![point.id],
            EditRecord::BatchDelete { points, .. } => points.iter().map(|p| p.id).collect(),
            _ => Vec::new(),
        }
    }

    /// Points this record creates when applied forward.
    pub fn created_points(&self) -> Vec<PointId> {
        match self {
            EditRecord::AddPoint { point } | EditRecord::AddChainPoint { point, .. } => vec![point.id],
            _ => Vec::new(),
        }
    }
}

/// A recorded edit with its bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: OpId,
    pub record: EditRecord,
    pub recorded_at: DateTime<Utc>,
}

/// Bounded undo stack plus redo stack.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    limit: usize,
    next_op_id: u64,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit: limit.max(1),
            next_op_id: 1,
        }
    }

    /// Record a freshly applied edit. Drops the redo branch.
    pub fn push(&mut self, record: EditRecord) -> OpId {
        let id = OpId(self.next_op_id);
        self.next_op_id += 1;
        self.redo.clear();
        self.undo.push_back(HistoryEntry { id, record, recorded_at: Utc::now() });
        while self.undo.len() > self.limit {
            self.undo.pop_front();
        }
        id
    }

    /// Revert the most recent edit. Returns the reverted record.
    pub fn undo(&mut self, state: &mut PatternGraphState) -> Option<&EditRecord> {
        let entry = self.undo.pop_back()?;
        state.revert(&entry.record);
        self.redo.push(entry);
        self.redo.last().map(|e| &e.record)
    }

    /// Re-apply the most recently undone edit. Returns the re-applied record.
    pub fn redo(&mut self, state: &mut PatternGraphState) -> Option<&EditRecord> {
        let entry = self.redo.pop()?;
        state.apply(&entry.record);
        self.undo.push_back(entry);
        self.undo.back().map(|e| &e.record)
    }

    pub fn can_undo(&self) -> bool { !self.undo.is_empty() }
    pub fn can_redo(&self) -> bool { !self.redo.is_empty() }
    pub fn undo_len(&self) -> usize { self.undo.len() }
    pub fn redo_len(&self) -> usize { self.redo.len() }

    /// Applied edits, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.undo.iter()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
