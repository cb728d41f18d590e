//! Ship handles and the master ship list.
//!
//! Ships refer to each other (target, parent, escorts, the ship being
//! assisted) by [`ShipId`], never by reference. A handle names a registry
//! slot plus the number of times that slot had been vacated when the ship
//! moved in, so once a ship leaves the world every handle to it goes dead,
//! even after another ship takes over the slot.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::ship::Ship;

// ---------------------------------------------------------------------------
// ShipId
// ---------------------------------------------------------------------------

/// Handle to a ship in a [`ShipRegistry`]. Prints as `#slot.generation`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShipId {
    slot: u32,
    generation: u32,
}

impl ShipId {
    /// Handle for the occupant of `slot` after `generation` recycles.
    pub fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Registry slot.
    pub fn slot(self) -> u32 {
        self.slot
    }

    pub fn generation(self) -> u32 {
        self.generation
    }

    fn position(self) -> usize {
        self.slot as usize
    }
}

impl fmt::Debug for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShipId({self})")
    }
}

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.slot, self.generation)
    }
}

// ---------------------------------------------------------------------------
// ShipRegistry
// ---------------------------------------------------------------------------

/// Owns every ship in the open world.
///
/// Docked craft are not in the registry; they are owned by their carrier's
/// bays. Iteration order is slot order, which is stable for a given history
/// of inserts and removals and therefore deterministic across replays.
///
/// Free slots are kept in a FIFO queue so that generations are spread out
/// over time rather than concentrated on a hot slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShipRegistry {
    /// Current generation for each slot.
    generations: Vec<u32>,
    /// Ship occupying each slot, if any.
    slots: Vec<Option<Ship>>,
    /// Recyclable slot indices (FIFO queue).
    free_indices: VecDeque<u32>,
}

impl ShipRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `ship` and hand back its handle.
    ///
    /// A recycled slot is reused with its already-bumped generation;
    /// otherwise a brand-new slot is created.
    pub fn insert(&mut self, ship: Ship) -> ShipId {
        if let Some(index) = self.free_indices.pop_front() {
            self.slots[index as usize] = Some(ship);
            ShipId::new(index, self.generations[index as usize])
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.slots.push(Some(ship));
            ShipId::new(index, 0)
        }
    }

    /// Remove a ship and return it, invalidating every outstanding handle to
    /// it. Returns `None` for stale or unknown handles.
    pub fn remove(&mut self, id: ShipId) -> Option<Ship> {
        if !self.contains(id) {
            return None;
        }
        let idx = id.position();
        let ship = self.slots[idx].take();
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_indices.push_back(id.slot());
        ship
    }

    /// Whether `id` names a ship that is still present.
    pub fn contains(&self, id: ShipId) -> bool {
        let idx = id.position();
        idx < self.generations.len()
            && self.generations[idx] == id.generation()
            && self.slots[idx].is_some()
    }

    /// Resolve a handle.
    pub fn get(&self, id: ShipId) -> Option<&Ship> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.position()].as_ref()
    }

    /// Resolve a handle mutably.
    pub fn get_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.position()].as_mut()
    }

    /// Resolve an optional handle, treating `None` and stale handles alike.
    pub fn resolve(&self, id: Option<ShipId>) -> Option<&Ship> {
        id.and_then(|id| self.get(id))
    }

    /// Borrow two distinct ships mutably at once.
    ///
    /// Returns `None` if either handle is stale or both name the same ship.
    pub fn pair_mut(&mut self, a: ShipId, b: ShipId) -> Option<(&mut Ship, &mut Ship)> {
        if a.slot() == b.slot() || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (ia, ib) = (a.position(), b.position());
        let (first, second) = if ia < ib {
            let (low, high) = self.slots.split_at_mut(ib);
            (low[ia].as_mut()?, high[0].as_mut()?)
        } else {
            let (low, high) = self.slots.split_at_mut(ia);
            (high[0].as_mut()?, low[ib].as_mut()?)
        };
        Some((first, second))
    }

    /// Handles of every present ship, in slot order.
    pub fn ids(&self) -> Vec<ShipId> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(idx, _)| ShipId::new(idx as u32, self.generations[idx]))
            .collect()
    }

    /// Iterate over present ships with their handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ShipId, &Ship)> {
        self.slots.iter().enumerate().filter_map(|(idx, slot)| {
            slot.as_ref()
                .map(|ship| (ShipId::new(idx as u32, self.generations[idx]), ship))
        })
    }

    /// Number of present ships.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Whether no ships are present.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn hull(name: &str) -> Ship {
        let mut ship = Ship::default();
        ship.set_name(name);
        ship
    }

    #[test]
    fn insert_gives_unique_ids() {
        let mut registry = ShipRegistry::new();
        let ids: Vec<ShipId> = (0..50).map(|i| registry.insert(hull(&i.to_string()))).collect();
        let mut slots: Vec<u32> = ids.iter().map(|id| id.slot()).collect();
        slots.sort();
        slots.dedup();
        assert_eq!(slots.len(), 50);
        assert_eq!(registry.len(), 50);
    }

    #[test]
    fn generation_increments_on_recycle() {
        let mut registry = ShipRegistry::new();
        let first = registry.insert(hull("a"));
        assert!(registry.remove(first).is_some());
        let second = registry.insert(hull("b"));
        assert_eq!(second.slot(), first.slot());
        assert_eq!(second.generation(), 1);
    }

    #[test]
    fn stale_handle_never_resolves_to_new_occupant() {
        let mut registry = ShipRegistry::new();
        let first = registry.insert(hull("a"));
        registry.remove(first);
        let _second = registry.insert(hull("b"));
        assert!(registry.get(first).is_none());
        assert!(registry.resolve(Some(first)).is_none());
    }

    #[test]
    fn double_remove_returns_none() {
        let mut registry = ShipRegistry::new();
        let id = registry.insert(hull("a"));
        assert!(registry.remove(id).is_some());
        assert!(registry.remove(id).is_none());
    }

    #[test]
    fn pair_mut_borrows_both_in_either_order() {
        let mut registry = ShipRegistry::new();
        let a = registry.insert(hull("a"));
        let b = registry.insert(hull("b"));

        let (first, second) = registry.pair_mut(b, a).unwrap();
        assert_eq!(first.name(), "b");
        assert_eq!(second.name(), "a");

        assert!(registry.pair_mut(a, a).is_none());
        registry.remove(b);
        assert!(registry.pair_mut(a, b).is_none());
    }

    #[test]
    fn ids_follow_slot_order() {
        let mut registry = ShipRegistry::new();
        let a = registry.insert(hull("a"));
        let b = registry.insert(hull("b"));
        let c = registry.insert(hull("c"));
        registry.remove(b);
        let d = registry.insert(hull("d"));

        assert_eq!(registry.ids(), vec![a, d, c]);
        let names: Vec<&str> = registry.iter().map(|(_, ship)| ship.name()).collect();
        assert_eq!(names, vec!["a", "d", "c"]);
    }

    #[test]
    fn handles_print_slot_and_generation() {
        let mut registry = ShipRegistry::new();
        let first = registry.insert(hull("a"));
        registry.remove(first);
        let second = registry.insert(hull("b"));
        assert_eq!(first.to_string(), "#0.0");
        assert_eq!(second.to_string(), "#0.1");
        assert_eq!(format!("{second:?}"), "ShipId(#0.1)");
    }
}
