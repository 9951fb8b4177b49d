//! Authoritative prop state and tuning.

use std::collections::{BTreeMap, BTreeSet};

use faemaze_core::{CellCoord, PropId, PropKind, PropSnapshot};

/// Tuning applied to a single kind of prop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropTuning {
    /// Walking distance covered by the prop's influence or detection area.
    pub radius: u32,
    /// Maximum number of cells the area may contain.
    pub max_steps: u32,
    /// Attraction added at the prop's own cell; falls off linearly with distance.
    pub strength: f32,
    /// Essence spent to place the prop.
    pub cost: u32,
}

impl PropTuning {
    /// Creates a tuning entry.
    #[must_use]
    pub const fn new(radius: u32, max_steps: u32, strength: f32, cost: u32) -> Self {
        Self {
            radius,
            max_steps,
            strength,
            cost,
        }
    }

    /// Attraction added to a cell `distance` cells (Manhattan) from the prop.
    #[must_use]
    pub fn falloff(&self, distance: u32) -> f32 {
        if distance > self.radius {
            return 0.0;
        }
        let span = f64::from(self.radius) + 1.0;
        let scale = 1.0 - f64::from(distance) / span;
        (f64::from(self.strength) * scale) as f32
    }
}

/// Tuning for every prop kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropCatalog {
    /// Fae lantern tuning.
    pub lantern: PropTuning,
    /// Fairy ring tuning.
    pub fairy_ring: PropTuning,
    /// Wisp tuning; radius and steps bound its detection area.
    pub wisp: PropTuning,
    /// Puka tuning.
    pub puka: PropTuning,
}

impl PropCatalog {
    /// Tuning that applies to `kind`.
    #[must_use]
    pub const fn tuning(&self, kind: PropKind) -> PropTuning {
        match kind {
            PropKind::Lantern => self.lantern,
            PropKind::FairyRing => self.fairy_ring,
            PropKind::Wisp => self.wisp,
            PropKind::Puka => self.puka,
        }
    }

    /// Mutable tuning entry for `kind`.
    pub fn tuning_mut(&mut self, kind: PropKind) -> &mut PropTuning {
        match kind {
            PropKind::Lantern => &mut self.lantern,
            PropKind::FairyRing => &mut self.fairy_ring,
            PropKind::Wisp => &mut self.wisp,
            PropKind::Puka => &mut self.puka,
        }
    }
}

impl Default for PropCatalog {
    fn default() -> Self {
        Self {
            lantern: PropTuning::new(4, 40, 5.0, 20),
            fairy_ring: PropTuning::new(2, 12, 8.0, 35),
            wisp: PropTuning::new(5, 60, 0.0, 25),
            puka: PropTuning::new(1, 0, 0.0, 30),
        }
    }
}

/// Prop stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct PropState {
    pub(crate) id: PropId,
    pub(crate) kind: PropKind,
    pub(crate) cell: CellCoord,
    /// Cells whose attraction the prop raised when it was placed.
    pub(crate) influence: BTreeSet<CellCoord>,
}

impl PropState {
    pub(crate) fn snapshot(&self) -> PropSnapshot {
        PropSnapshot {
            id: self.id,
            kind: self.kind,
            cell: self.cell,
        }
    }
}

/// Registry that stores props and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct PropRegistry {
    entries: BTreeMap<PropId, PropState>,
    next_prop_id: PropId,
}

impl PropRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_prop_id: PropId::new(0),
        }
    }

    pub(crate) fn insert(
        &mut self,
        kind: PropKind,
        cell: CellCoord,
        influence: BTreeSet<CellCoord>,
    ) -> PropId {
        let id = self.next_prop_id;
        self.next_prop_id = PropId::new(id.get().wrapping_add(1));
        let _ = self.entries.insert(
            id,
            PropState {
                id,
                kind,
                cell,
                influence,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: PropId) -> Option<&PropState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: PropId) -> Option<&mut PropState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &PropState> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn occupied(&self, cell: CellCoord) -> bool {
        self.entries.values().any(|prop| prop.cell == cell)
    }

    pub(crate) fn in_influence(&self, cell: CellCoord) -> bool {
        self.entries
            .values()
            .any(|prop| prop.influence.contains(&cell))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_allocates_sequential_identifiers() {
        let mut registry = PropRegistry::new();
        let first = registry.insert(PropKind::Lantern, CellCoord::new(1, 1), BTreeSet::new());
        let second = registry.insert(PropKind::Puka, CellCoord::new(2, 1), BTreeSet::new());

        assert_eq!(first, PropId::new(0));
        assert_eq!(second, PropId::new(1));
        assert_eq!(registry.len(), 2);
        assert!(registry.occupied(CellCoord::new(2, 1)));
        assert!(!registry.occupied(CellCoord::new(3, 1)));
    }

    #[test]
    fn influence_lookup_spans_all_props() {
        let mut registry = PropRegistry::new();
        let influence = [CellCoord::new(0, 0), CellCoord::new(0, 1)]
            .into_iter()
            .collect();
        let _ = registry.insert(PropKind::Lantern, CellCoord::new(0, 0), influence);

        assert!(registry.in_influence(CellCoord::new(0, 1)));
        assert!(!registry.in_influence(CellCoord::new(1, 1)));
    }

    #[test]
    fn falloff_is_linear_and_bounded() {
        let tuning = PropTuning::new(3, 20, 8.0, 10);
        assert_eq!(tuning.falloff(0), 8.0);
        assert_eq!(tuning.falloff(2), 4.0);
        assert_eq!(tuning.falloff(4), 0.0);
    }

    #[test]
    fn catalog_routes_kinds_to_entries() {
        let mut catalog = PropCatalog::default();
        catalog.tuning_mut(PropKind::Wisp).radius = 9;
        assert_eq!(catalog.tuning(PropKind::Wisp).radius, 9);
        assert_eq!(catalog.tuning(PropKind::Lantern), catalog.lantern);
    }
}
