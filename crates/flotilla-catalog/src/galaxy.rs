//! Star systems, stellar objects, planets and governments.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

// ---------------------------------------------------------------------------
// Government
// ---------------------------------------------------------------------------

/// A faction. Hostility is declared one-way per government and read as
/// symmetric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Government {
    /// Unique name.
    pub name: String,
    /// Governments this one is at war with.
    #[serde(default)]
    pub enemies: BTreeSet<String>,
}

impl Government {
    /// A government with no enemies.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enemies: BTreeSet::new(),
        }
    }

    /// Builder-style enemy declaration.
    pub fn hostile_to(mut self, other: impl Into<String>) -> Self {
        self.enemies.insert(other.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Planet
// ---------------------------------------------------------------------------

/// A landable body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    /// Unique name.
    pub name: String,
    /// Whether the planet can refuel and re-crew ships.
    #[serde(default)]
    pub spaceport: bool,
    /// Owning government, if any. Its enemies are refused landing.
    #[serde(default)]
    pub government: Option<String>,
    /// For wormholes: origin system name → destination system name.
    #[serde(default)]
    pub wormhole: BTreeMap<String, String>,
}

impl Planet {
    /// A plain planet without a spaceport.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Whether this "planet" is a wormhole.
    pub fn is_wormhole(&self) -> bool {
        !self.wormhole.is_empty()
    }

    /// Where the wormhole leads from `from`. Non-wormholes, and wormholes
    /// without an exit from `from`, lead back to `from`.
    pub fn wormhole_destination<'a>(&'a self, from: &'a str) -> &'a str {
        self.wormhole.get(from).map(String::as_str).unwrap_or(from)
    }
}

// ---------------------------------------------------------------------------
// StarSystem
// ---------------------------------------------------------------------------

/// Something in a system's sky. Only objects with a planet can be landed on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StellarObject {
    /// Planet name, if this object is landable.
    #[serde(default)]
    pub planet: Option<String>,
    /// Position within the system.
    pub position: Point,
    /// Landing radius.
    #[serde(default)]
    pub radius: f64,
}

/// A star system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StarSystem {
    /// Unique name.
    pub name: String,
    /// Position on the galaxy map. Jump alignment is computed from these.
    pub position: Point,
    /// Stellar objects, in a fixed order.
    #[serde(default)]
    pub objects: Vec<StellarObject>,
    /// Names of systems reachable by hyperdrive.
    #[serde(default)]
    pub links: BTreeSet<String>,
}

impl StarSystem {
    /// An empty system at `position`.
    pub fn new(name: impl Into<String>, position: Point) -> Self {
        Self {
            name: name.into(),
            position,
            ..Self::default()
        }
    }

    /// The first object whose planet is `planet`.
    pub fn object_for_planet(&self, planet: &str) -> Option<&StellarObject> {
        self.objects
            .iter()
            .find(|object| object.planet.as_deref() == Some(planet))
    }
}
