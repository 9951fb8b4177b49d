//! Authoritative visitor state.

use std::{collections::BTreeMap, time::Duration};

use faemaze_core::{CellCoord, VisitorId, VisitorSnapshot, VisitorState};

#[derive(Clone, Debug)]
pub(crate) struct Visitor {
    pub(crate) id: VisitorId,
    pub(crate) cell: CellCoord,
    pub(crate) state: VisitorState,
    pub(crate) state_remaining: Duration,
    pub(crate) accumulator: Duration,
}

impl Visitor {
    fn new(id: VisitorId, cell: CellCoord) -> Self {
        Self {
            id,
            cell,
            state: VisitorState::Walking,
            state_remaining: Duration::ZERO,
            accumulator: Duration::ZERO,
        }
    }

    /// Counts down a temporary state, returning `true` when it expired.
    pub(crate) fn elapse_state(&mut self, dt: Duration) -> bool {
        if self.state == VisitorState::Walking {
            return false;
        }
        self.state_remaining = self.state_remaining.saturating_sub(dt);
        if self.state_remaining.is_zero() {
            self.state = VisitorState::Walking;
            return true;
        }
        false
    }

    /// Applies a state, returning `true` when the state actually changed.
    ///
    /// Re-applying the current state only extends its remaining duration.
    pub(crate) fn apply_state(&mut self, state: VisitorState, duration: Duration) -> bool {
        if state == VisitorState::Walking {
            self.state_remaining = Duration::ZERO;
            let changed = self.state != VisitorState::Walking;
            self.state = VisitorState::Walking;
            return changed;
        }

        if self.state == state {
            self.state_remaining = self.state_remaining.max(duration);
            return false;
        }

        self.state = state;
        self.state_remaining = duration;
        true
    }

    pub(crate) fn snapshot(&self, step_interval: Duration) -> VisitorSnapshot {
        VisitorSnapshot {
            id: self.id,
            cell: self.cell,
            state: self.state,
            state_remaining: self.state_remaining,
            ready_for_step: self.accumulator >= step_interval,
            accumulated: self.accumulator,
        }
    }
}

/// Registry that stores visitors and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct VisitorRegistry {
    entries: BTreeMap<VisitorId, Visitor>,
    next_visitor_id: VisitorId,
}

impl VisitorRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_visitor_id: VisitorId::new(0),
        }
    }

    pub(crate) fn spawn(&mut self, cell: CellCoord) -> VisitorId {
        let id = self.next_visitor_id;
        self.next_visitor_id = VisitorId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(id, Visitor::new(id, cell));
        id
    }

    pub(crate) fn get_mut(&mut self, id: VisitorId) -> Option<&mut Visitor> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: VisitorId) -> Option<Visitor> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Visitor> {
        self.entries.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Visitor> {
        self.entries.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
