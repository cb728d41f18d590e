//! Equipment stats as a dense, fixed table.
//!
//! Every stat the simulation reads is a variant of [`StatKey`]. An
//! [`Attributes`] value stores one `f64` per key, so lookups in the tick path
//! are array indexing rather than string hashing. Content files still use the
//! human-readable names (`"heat dissipation"`, `"jump fuel"`, ...); the
//! conversion happens once, at load time.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! stat_keys {
    ($($variant:ident => $name:literal,)*) => {
        /// A known equipment stat.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum StatKey {
            $(
                #[doc = concat!("`", $name, "`")]
                $variant,
            )*
        }

        impl StatKey {
            /// Every key, in declaration order.
            pub const ALL: &'static [StatKey] = &[$(StatKey::$variant,)*];

            /// Number of keys (the width of an [`Attributes`] table).
            pub const COUNT: usize = Self::ALL.len();

            /// The name used for this stat in content files.
            pub fn name(self) -> &'static str {
                match self {
                    $(StatKey::$variant => $name,)*
                }
            }

            /// Parse a content-file stat name.
            pub fn from_name(name: &str) -> Option<StatKey> {
                match name {
                    $($name => Some(StatKey::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

stat_keys! {
    Cost => "cost",
    Mass => "mass",
    Drag => "drag",
    Thrust => "thrust",
    ReverseThrust => "reverse thrust",
    Turn => "turn",
    ThrustingEnergy => "thrusting energy",
    ThrustingHeat => "thrusting heat",
    ReverseThrustingEnergy => "reverse thrusting energy",
    ReverseThrustingHeat => "reverse thrusting heat",
    TurningEnergy => "turning energy",
    TurningHeat => "turning heat",
    AfterburnerThrust => "afterburner thrust",
    AfterburnerFuel => "afterburner fuel",
    AfterburnerEnergy => "afterburner energy",
    AfterburnerHeat => "afterburner heat",
    EnergyCapacity => "energy capacity",
    EnergyGeneration => "energy generation",
    HeatGeneration => "heat generation",
    Cooling => "cooling",
    HeatDissipation => "heat dissipation",
    Shields => "shields",
    ShieldGeneration => "shield generation",
    Hull => "hull",
    HullRepairRate => "hull repair rate",
    FuelCapacity => "fuel capacity",
    Ramscoop => "ramscoop",
    Hyperdrive => "hyperdrive",
    JumpDrive => "jump drive",
    ScramDrive => "scram drive",
    JumpSpeed => "jump speed",
    JumpFuel => "jump fuel",
    Cloak => "cloak",
    CloakingFuel => "cloaking fuel",
    CloakingEnergy => "cloaking energy",
    RequiredCrew => "required crew",
    Bunks => "bunks",
    CargoSpace => "cargo space",
    OutfitSpace => "outfit space",
    GunPorts => "gun ports",
    TurretMounts => "turret mounts",
    CargoScan => "cargo scan",
    OutfitScan => "outfit scan",
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// A dense table of stat values, one slot per [`StatKey`].
///
/// Serialized as a map from stat name to value, omitting zeros. Unknown names
/// encountered while deserializing are skipped with a warning so that content
/// written for a newer build still loads.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct Attributes {
    values: [f64; StatKey::COUNT],
}

impl Attributes {
    /// An all-zero table.
    pub fn new() -> Self {
        Self {
            values: [0.0; StatKey::COUNT],
        }
    }

    /// Read a stat. Absent stats are zero.
    #[inline]
    pub fn get(&self, key: StatKey) -> f64 {
        self.values[key as usize]
    }

    /// Overwrite a stat.
    #[inline]
    pub fn set(&mut self, key: StatKey, value: f64) {
        self.values[key as usize] = value;
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: StatKey, value: f64) -> Self {
        self.set(key, value);
        self
    }

    /// Add `other * count` to every slot. A negative count subtracts.
    pub fn add_scaled(&mut self, other: &Attributes, count: i32) {
        let scale = f64::from(count);
        for (mine, theirs) in self.values.iter_mut().zip(other.values.iter()) {
            *mine += theirs * scale;
        }
    }

    /// Iterate the non-zero stats in key order.
    pub fn iter(&self) -> impl Iterator<Item = (StatKey, f64)> + '_ {
        StatKey::ALL
            .iter()
            .map(|&key| (key, self.get(key)))
            .filter(|&(_, value)| value != 0.0)
    }

    /// Whether every stat is zero.
    pub fn is_empty(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

impl Default for Attributes {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(key, value)| (key.name(), value)))
            .finish()
    }
}

impl From<BTreeMap<String, f64>> for Attributes {
    fn from(map: BTreeMap<String, f64>) -> Self {
        let mut attributes = Attributes::new();
        for (name, value) in map {
            match StatKey::from_name(&name) {
                Some(key) => attributes.set(key, value),
                None => tracing::warn!(stat = %name, "unknown stat name -- skipping"),
            }
        }
        attributes
    }
}

impl From<Attributes> for BTreeMap<String, f64> {
    fn from(attributes: Attributes) -> Self {
        attributes
            .iter()
            .map(|(key, value)| (key.name().to_owned(), value))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
