//! Hardpoints, weapon bindings and reload state.

use serde::{Deserialize, Serialize};
use tracing::trace;

use flotilla_catalog::prelude::*;

// ---------------------------------------------------------------------------
// Hardpoint
// ---------------------------------------------------------------------------

/// A gun port or turret mount, possibly with a weapon bound to it.
///
/// The bound weapon's definition is kept next to its name so that firing
/// never needs a catalog lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hardpoint {
    kind: MountKind,
    offset: Point,
    outfit: Option<String>,
    weapon: Option<WeaponSpec>,
    /// Ticks until the weapon can fire again.
    reload: f64,
    /// Shots fired in the current burst.
    burst: u32,
}

impl Hardpoint {
    /// An empty hardpoint.
    pub fn new(kind: MountKind, offset: Point) -> Self {
        Self {
            kind,
            offset,
            outfit: None,
            weapon: None,
            reload: 0.0,
            burst: 0,
        }
    }

    /// Gun port or turret mount.
    pub fn kind(&self) -> MountKind {
        self.kind
    }

    /// Offset from the ship's center, unrotated.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// Name of the bound weapon.
    pub fn outfit(&self) -> Option<&str> {
        self.outfit.as_deref()
    }

    /// Definition of the bound weapon.
    pub fn weapon(&self) -> Option<&WeaponSpec> {
        self.weapon.as_ref()
    }

    /// Whether the bound weapon has finished reloading.
    pub fn is_ready(&self) -> bool {
        self.weapon.is_some() && self.reload <= 0.0
    }

    /// Ticks of reload remaining.
    pub fn reload(&self) -> f64 {
        self.reload
    }

    /// Describe this hardpoint as a layout entry.
    pub fn spec(&self) -> HardpointSpec {
        HardpointSpec {
            kind: self.kind,
            offset: self.offset,
            outfit: self.outfit.clone(),
        }
    }

    fn bind(&mut self, name: &str, weapon: &WeaponSpec) {
        self.outfit = Some(name.to_owned());
        self.weapon = Some(weapon.clone());
        self.reload = 0.0;
        self.burst = 0;
    }

    fn unbind(&mut self) {
        self.outfit = None;
        self.weapon = None;
        self.reload = 0.0;
        self.burst = 0;
    }
}

// ---------------------------------------------------------------------------
// Armament
// ---------------------------------------------------------------------------

/// Every hardpoint of a ship, in firing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Armament {
    hardpoints: Vec<Hardpoint>,
}

impl Armament {
    /// An armament with no hardpoints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an empty hardpoint at the end of the firing order.
    pub fn add_hardpoint(&mut self, kind: MountKind, offset: Point) {
        self.hardpoints.push(Hardpoint::new(kind, offset));
    }

    /// Number of hardpoints.
    pub fn len(&self) -> usize {
        self.hardpoints.len()
    }

    /// Whether there are no hardpoints.
    pub fn is_empty(&self) -> bool {
        self.hardpoints.is_empty()
    }

    /// Hardpoint `index`.
    pub fn get(&self, index: usize) -> Option<&Hardpoint> {
        self.hardpoints.get(index)
    }

    /// All hardpoints in firing order.
    pub fn hardpoints(&self) -> &[Hardpoint] {
        &self.hardpoints
    }

    /// Bind `weapon` to hardpoint `index` regardless of what was there.
    /// Returns `false` if the index is out of range or the mount kind does
    /// not match.
    pub fn bind(&mut self, index: usize, name: &str, weapon: &WeaponSpec) -> bool {
        match self.hardpoints.get_mut(index) {
            Some(hardpoint) if hardpoint.kind == weapon.mount => {
                hardpoint.bind(name, weapon);
                true
            }
            _ => false,
        }
    }

    /// Bind up to `count` copies of a weapon to free hardpoints of the
    /// matching kind. Returns how many were bound.
    pub fn install(&mut self, name: &str, weapon: &WeaponSpec, count: u32) -> u32 {
        let mut bound = 0;
        for hardpoint in &mut self.hardpoints {
            if bound == count {
                break;
            }
            if hardpoint.outfit.is_none() && hardpoint.kind == weapon.mount {
                hardpoint.bind(name, weapon);
                bound += 1;
            }
        }
        if bound < count {
            trace!(weapon = name, wanted = count, bound, "not enough free hardpoints");
        }
        bound
    }

    /// Unbind up to `count` copies of a weapon, last hardpoint first.
    /// Returns how many were unbound.
    pub fn uninstall(&mut self, name: &str, count: u32) -> u32 {
        let mut removed = 0;
        for hardpoint in self.hardpoints.iter_mut().rev() {
            if removed == count {
                break;
            }
            if hardpoint.outfit.as_deref() == Some(name) {
                hardpoint.unbind();
                removed += 1;
            }
        }
        removed
    }

    /// Number of hardpoints holding `name`.
    pub fn count(&self, name: &str) -> u32 {
        self.hardpoints
            .iter()
            .filter(|hardpoint| hardpoint.outfit.as_deref() == Some(name))
            .count() as u32
    }

    /// Start the reload cycle of hardpoint `index` as if it just fired.
    /// Returns `false` if it was not ready.
    pub fn fire(&mut self, index: usize) -> bool {
        let Some(hardpoint) = self.hardpoints.get_mut(index) else {
            return false;
        };
        if !hardpoint.is_ready() {
            return false;
        }
        let Some(weapon) = hardpoint.weapon.as_ref() else {
            return false;
        };
        hardpoint.reload += weapon.reload;
        if weapon.burst_count > 1 {
            hardpoint.burst += 1;
            if hardpoint.burst >= weapon.burst_count {
                hardpoint.burst = 0;
                hardpoint.reload += weapon.burst_reload;
            }
        }
        true
    }

    /// Advance every reload timer by one tick.
    pub fn step(&mut self) {
        for hardpoint in &mut self.hardpoints {
            if hardpoint.reload > 0.0 {
                hardpoint.reload = (hardpoint.reload - 1.0).max(0.0);
            }
        }
    }

    /// Forget reload progress, as after time spent landed.
    pub fn reset_reloads(&mut self) {
        for hardpoint in &mut self.hardpoints {
            hardpoint.reload = 0.0;
            hardpoint.burst = 0;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
