//! Hull templates ("ship models").

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::outfit::{MountKind, WeaponSpec};
use crate::stat::Attributes;

/// Category that marks a carried small craft of the fighter kind.
pub const FIGHTER_CATEGORY: &str = "Fighter";
/// Category that marks a carried small craft of the drone kind.
pub const DRONE_CATEGORY: &str = "Drone";

// ---------------------------------------------------------------------------
// Layout pieces
// ---------------------------------------------------------------------------

/// A hardpoint in a hull template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardpointSpec {
    /// Gun port or turret mount.
    pub kind: MountKind,
    /// Offset from the ship's center, in unrotated ship coordinates.
    pub offset: Point,
    /// Weapon pre-installed on this hardpoint.
    #[serde(default)]
    pub outfit: Option<String>,
}

/// A carried-craft bay category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BayKind {
    /// Holds one ship of category [`FIGHTER_CATEGORY`].
    Fighter,
    /// Holds one ship of category [`DRONE_CATEGORY`].
    Drone,
}

impl BayKind {
    /// The bay kind able to carry a ship of the given category, if any.
    pub fn for_category(category: &str) -> Option<BayKind> {
        match category {
            FIGHTER_CATEGORY => Some(BayKind::Fighter),
            DRONE_CATEGORY => Some(BayKind::Drone),
            _ => None,
        }
    }
}

/// Size of the ship's sprite, used to scatter explosion and jump effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// Width in world units.
    pub width: f64,
    /// Height in world units.
    pub height: f64,
}

impl Default for Extent {
    fn default() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// ShipModel
// ---------------------------------------------------------------------------

/// A named hull template from which ships are built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipModel {
    /// Model name (`"Sparrow"`, `"Bulk Freighter"`, ...).
    pub model_name: String,
    /// Default display name for new ships of this model.
    #[serde(default)]
    pub name: String,
    /// Category; [`FIGHTER_CATEGORY`] and [`DRONE_CATEGORY`] are carried craft.
    #[serde(default)]
    pub category: String,
    /// Bare-hull stats.
    #[serde(default)]
    pub attributes: Attributes,
    /// Installed outfits with counts, including weapons bound to hardpoints.
    #[serde(default)]
    pub outfits: BTreeMap<String, i32>,
    /// Gun ports and turret mounts, in firing order.
    #[serde(default)]
    pub hardpoints: Vec<HardpointSpec>,
    /// Engine flare points.
    #[serde(default)]
    pub engines: Vec<Point>,
    /// Fighter bay offsets.
    #[serde(default)]
    pub fighter_bays: Vec<Point>,
    /// Drone bay offsets.
    #[serde(default)]
    pub drone_bays: Vec<Point>,
    /// Explosion effect names with relative weights.
    #[serde(default)]
    pub explode: BTreeMap<String, u32>,
    /// The blast the hull produces when it finally blows up.
    #[serde(default)]
    pub explosion: Option<WeaponSpec>,
    /// Sprite size.
    #[serde(default)]
    pub extent: Extent,
    /// Flavor text.
    #[serde(default)]
    pub description: String,
    /// Licenses required to buy or operate the hull, keyed by government
    /// name. The empty key holds licenses required everywhere.
    #[serde(default)]
    pub licenses: BTreeMap<String, Vec<String>>,
}

impl ShipModel {
    /// A bare template with the given name, category, and stats.
    pub fn new(model_name: impl Into<String>, category: impl Into<String>, attributes: Attributes) -> Self {
        let model_name = model_name.into();
        Self {
            name: model_name.clone(),
            model_name,
            category: category.into(),
            attributes,
            outfits: BTreeMap::new(),
            hardpoints: Vec::new(),
            engines: Vec::new(),
            fighter_bays: Vec::new(),
            drone_bays: Vec::new(),
            explode: BTreeMap::new(),
            explosion: None,
            extent: Extent::default(),
            description: String::new(),
            licenses: BTreeMap::new(),
        }
    }

    /// Total explosion weight (the number of small explosions before the
    /// final blast).
    pub fn explosion_total(&self) -> u32 {
        self.explode.values().sum()
    }

    /// Licenses needed under `government`, falling back to the universal list.
    pub fn licenses_for(&self, government: Option<&str>) -> &[String] {
        government
            .and_then(|gov| self.licenses.get(gov))
            .or_else(|| self.licenses.get(""))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
