//! Visual effects and projectiles handed to the outer simulation.

use serde::{Deserialize, Serialize};

use flotilla_catalog::prelude::*;

/// A named visual effect spawned into the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    /// Effect name (`"afterburner"`, an explosion name, ...).
    pub name: String,
    /// World position.
    pub position: Point,
    /// World velocity.
    pub velocity: Point,
    /// Facing.
    pub angle: Angle,
}

impl Effect {
    /// An effect at `position`.
    pub fn new(name: impl Into<String>, position: Point, velocity: Point, angle: Angle) -> Self {
        Self {
            name: name.into(),
            position,
            velocity,
            angle,
        }
    }
}

/// A projectile emitted by a ship.
///
/// The weapon definition travels with the projectile so that a hit can be
/// resolved without a catalog lookup, and so that a hull's death blast (which
/// is not an outfit) is expressed the same way as a gunshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    /// Outfit name, or the hull model name for a death blast.
    pub source_name: String,
    /// Damage and flight parameters.
    pub weapon: WeaponSpec,
    /// Government of the firing ship.
    pub government: Option<String>,
    /// Launch position.
    pub position: Point,
    /// Launch velocity.
    pub velocity: Point,
    /// Launch facing.
    pub angle: Angle,
    /// Whether this is a death blast rather than a fired shot.
    pub is_blast: bool,
}
