//! Installable equipment ("outfits") and weapon definitions.

use serde::{Deserialize, Serialize};

use crate::stat::{Attributes, StatKey};

// ---------------------------------------------------------------------------
// MountKind
// ---------------------------------------------------------------------------

/// Which kind of hardpoint a weapon occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MountKind {
    /// Fixed forward-firing gun port.
    Gun,
    /// Rotating turret mount.
    Turret,
}

// ---------------------------------------------------------------------------
// WeaponSpec
// ---------------------------------------------------------------------------

/// Weapon behavior of an outfit. All fields default to zero / absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponSpec {
    /// Mount the weapon needs.
    pub mount: MountKind,
    /// Damage dealt to shields.
    pub shield_damage: f64,
    /// Damage dealt to hull once shields are down.
    pub hull_damage: f64,
    /// Heat added to the target.
    pub heat_damage: f64,
    /// Knockback impulse applied at the point of impact.
    pub hit_force: f64,
    /// Energy drawn per shot.
    pub firing_energy: f64,
    /// Fuel drawn per shot.
    pub firing_fuel: f64,
    /// Heat generated per shot.
    pub firing_heat: f64,
    /// Ticks between shots.
    pub reload: f64,
    /// Shots per burst. Zero or one means no burst behavior.
    pub burst_count: u32,
    /// Extra delay after a burst is exhausted.
    pub burst_reload: f64,
    /// Projectile speed.
    pub velocity: f64,
    /// Projectile lifetime in ticks.
    pub lifetime: f64,
    /// Anti-missile strength. Non-zero marks the weapon as a point-defense
    /// system that only fires at incoming missiles.
    pub anti_missile: f64,
    /// How hard a projectile from this weapon is to shoot down. Zero means it
    /// cannot be intercepted.
    pub missile_strength: f64,
    /// Outfit consumed as ammunition, one per shot.
    pub ammo: Option<String>,
}

impl Default for WeaponSpec {
    fn default() -> Self {
        Self {
            mount: MountKind::Gun,
            shield_damage: 0.0,
            hull_damage: 0.0,
            heat_damage: 0.0,
            hit_force: 0.0,
            firing_energy: 0.0,
            firing_fuel: 0.0,
            firing_heat: 0.0,
            reload: 1.0,
            burst_count: 0,
            burst_reload: 0.0,
            velocity: 0.0,
            lifetime: 0.0,
            anti_missile: 0.0,
            missile_strength: 0.0,
            ammo: None,
        }
    }
}

impl WeaponSpec {
    /// Whether this weapon is reserved for intercepting missiles.
    pub fn is_anti_missile(&self) -> bool {
        self.anti_missile > 0.0
    }

    /// Maximum distance a projectile travels.
    pub fn range(&self) -> f64 {
        self.velocity * self.lifetime
    }
}

// ---------------------------------------------------------------------------
// Outfit
// ---------------------------------------------------------------------------

/// A piece of equipment that can be installed on a ship.
///
/// Its [`Attributes`] are summed into the ship's aggregate, scaled by the
/// installed count. Weapons additionally carry a [`WeaponSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outfit {
    /// Unique name.
    pub name: String,
    /// Display category (`"Engines"`, `"Guns"`, `"Ammunition"`, ...).
    #[serde(default)]
    pub category: String,
    /// Stat contributions per installed unit.
    #[serde(default)]
    pub attributes: Attributes,
    /// Weapon behavior, if this outfit is a weapon.
    #[serde(default)]
    pub weapon: Option<WeaponSpec>,
    /// Effect spawned at engine points while this outfit's afterburner fires.
    #[serde(default)]
    pub flare_effect: Option<String>,
}

impl Outfit {
    /// A stat-only outfit with no weapon behavior.
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        Self {
            name: name.into(),
            category: String::new(),
            attributes,
            weapon: None,
            flare_effect: None,
        }
    }

    /// A weapon outfit.
    pub fn weapon(name: impl Into<String>, attributes: Attributes, weapon: WeaponSpec) -> Self {
        Self {
            weapon: Some(weapon),
            ..Self::new(name, attributes)
        }
    }

    /// Whether this outfit is a weapon.
    pub fn is_weapon(&self) -> bool {
        self.weapon.is_some()
    }

    /// Shorthand for `self.attributes.get(key)`.
    pub fn get(&self, key: StatKey) -> f64 {
        self.attributes.get(key)
    }

    /// Cargo tonnage one unit of this outfit occupies when carried as cargo.
    pub fn cargo_mass(&self) -> f64 {
        self.attributes.get(StatKey::Mass).max(0.0)
    }
}
