//! Chain placement navigation.
//!
//! In chain mode each new point is connected to the "current" point and
//! remembers it as its parent, so placement order forms a forest. Roots
//! have no parent entry. Navigation only moves the current pointer; it
//! never touches points or edges.

use hashbrown::HashMap;

use crate::model::PointId;
use crate::state::PatternGraphState;
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct ChainNavigator {
    current: Option<PointId>,
    parent: HashMap<PointId, PointId>,
    /// Neighbor order of the last cycle, parent first.
    cycle: Vec<PointId>,
    cycle_pos: Option<usize>,
}

impl ChainNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<PointId> { self.current }

    pub fn parent_of(&self, id: PointId) -> Option<PointId> {
        self.parent.get(&id).copied()
    }

    pub fn parents(&self) -> &HashMap<PointId, PointId> { &self.parent }

    /// Neighbor currently highlighted by `cycle_neighbors`.
    pub fn cycled(&self) -> Option<PointId> {
        self.cycle_pos.map(|i| self.cycle[i])
    }

    /// Make an existing point current. Its parent entry is left alone.
    pub fn select(&mut self, id: PointId) {
        self.current = Some(id);
        self.reset_cycle();
    }

    /// A point was created in chain mode while `previous` was current.
    pub fn placed(&mut self, id: PointId, previous: Option<PointId>) {
        if let Some(parent) = previous {
            self.parent.insert(id, parent);
        }
        self.current = Some(id);
        self.reset_cycle();
    }

    /// Undo of `placed`.
    pub fn unplace(&mut self, id: PointId, previous: Option<PointId>) {
        self.parent.remove(&id);
        self.current = previous;
        self.reset_cycle();
    }

    /// Drop every reference to removed points: the current pointer and
    /// their own parent entries. Undoing the removal restores the point as
    /// a root.
    pub fn forget(&mut self, removed: &[PointId]) {
        if self.current.is_some_and(|c| removed.contains(&c)) {
            self.current = None;
        }
        for id in removed {
            self.parent.remove(id);
        }
        self.reset_cycle();
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn go_to_parent(&mut self, state: &PatternGraphState) -> Result<PointId> {
        let current = self.current.ok_or(Error::NoCurrent)?;
        let parent = self
            .parent_of(current)
            .filter(|p| state.contains_point(*p))
            .ok_or(Error::AtRoot(current))?;
        self.current = Some(parent);
        self.reset_cycle();
        Ok(parent)
    }

    /// Highlight the next neighbor of the current point.
    ///
    /// Order: parent first (if it is a neighbor), then ascending ID. The
    /// cycle restarts whenever the neighbor set changes.
    pub fn cycle_neighbors(&mut self, state: &PatternGraphState) -> Result<PointId> {
        let current = self.current.ok_or(Error::NoCurrent)?;
        let mut order: Vec<PointId> = state.neighbors(current).to_vec();
        if order.is_empty() {
            self.reset_cycle();
            return Err(Error::NoNeighbors(current));
        }
        let parent = self.parent_of(current);
        order.sort_by_key(|id| (Some(*id) != parent, *id));

        let pos = match self.cycle_pos {
            Some(i) if order == self.cycle => (i + 1) % order.len(),
            _ => 0,
        };
        self.cycle = order;
        self.cycle_pos = Some(pos);
        Ok(self.cycle[pos])
    }

    /// Move to the highlighted neighbor.
    pub fn go_to_cycled(&mut self, state: &PatternGraphState) -> Result<PointId> {
        let current = self.current.ok_or(Error::NoCurrent)?;
        let target = self
            .cycled()
            .filter(|id| state.contains_point(*id))
            .ok_or(Error::NoNeighbors(current))?;
        self.current = Some(target);
        self.reset_cycle();
        Ok(target)
    }

    fn reset_cycle(&mut self) {
        self.cycle.clear();
        self.cycle_pos = None;
    }
}
