//! Authoritative chit state and identifier allocation.

use std::collections::BTreeMap;

use realm_core::{ChitCategory, ChitFace, ChitId, ChitLocation, ChitSnapshot, TileName};

/// Chit stored inside the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ChitState {
    pub(crate) category: ChitCategory,
    pub(crate) location: ChitLocation,
    pub(crate) face: ChitFace,
    pub(crate) summoned: bool,
}

impl ChitState {
    fn fresh(category: ChitCategory) -> Self {
        Self {
            category,
            location: ChitLocation::Unplaced,
            face: ChitFace::Hidden,
            summoned: false,
        }
    }
}

/// Registry that stores chits and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct ChitRegistry {
    entries: BTreeMap<ChitId, ChitState>,
    next_chit_id: ChitId,
}

impl ChitRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_chit_id: ChitId::new(0),
        }
    }

    /// Allocates an identifier and stores an unplaced, hidden chit.
    pub(crate) fn create(&mut self, category: ChitCategory) -> ChitId {
        let id = self.next_chit_id;
        self.next_chit_id = ChitId::new(id.get().saturating_add(1));
        let _ = self.entries.insert(id, ChitState::fresh(category));
        id
    }

    /// Re-inserts a chit under a previously allocated identifier.
    ///
    /// Returns `false` if the identifier is already taken.
    pub(crate) fn restore(&mut self, id: ChitId, state: ChitState) -> bool {
        if self.entries.contains_key(&id) {
            return false;
        }
        let _ = self.entries.insert(id, state);
        if id.get() >= self.next_chit_id.get() {
            self.next_chit_id = ChitId::new(id.get().saturating_add(1));
        }
        true
    }

    pub(crate) fn get(&self, id: ChitId) -> Option<&ChitState> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ChitId) -> Option<&mut ChitState> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.next_chit_id = ChitId::new(0);
    }

    pub(crate) fn snapshot(&self, id: ChitId) -> Option<ChitSnapshot> {
        self.get(id).map(|state| snapshot_of(id, state))
    }

    /// Snapshots of every chit in identifier order.
    pub(crate) fn snapshots(&self) -> Vec<ChitSnapshot> {
        self.entries
            .iter()
            .map(|(&id, state)| snapshot_of(id, state))
            .collect()
    }

    /// Chits placed on a tile, either at tile level or in one of its clearings.
    pub(crate) fn on_tile(&self, tile: TileName) -> Vec<ChitId> {
        self.entries
            .iter()
            .filter(|(_, state)| state.location.tile() == Some(tile))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Chits stored inside a container.
    pub(crate) fn contents(&self, container: ChitId) -> Vec<ChitId> {
        self.entries
            .iter()
            .filter(|(_, state)| state.location == ChitLocation::Container(container))
            .map(|(&id, _)| id)
            .collect()
    }

    /// Clears every summoned flag, returning how many were set.
    pub(crate) fn reset_summoned(&mut self) -> usize {
        let mut cleared = 0;
        for state in self.entries.values_mut() {
            if state.summoned {
                state.summoned = false;
                cleared += 1;
            }
        }
        cleared
    }
}

fn snapshot_of(id: ChitId, state: &ChitState) -> ChitSnapshot {
    ChitSnapshot {
        id,
        category: state.category,
        location: state.location,
        face: state.face,
        summoned: state.summoned,
    }
}
