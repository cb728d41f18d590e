//! Behavior flags consulted by the ship core.

use serde::{Deserialize, Serialize};

/// Behavior traits that change how the core treats a ship.
///
/// Only the traits the core itself reads are modeled; everything else about
/// decision making belongs to the controller that produces commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Personality {
    /// Spawned disabled with a damaged hull and no crew.
    pub derelict: bool,
    /// Leaves the world when it lands even if it is a special ship.
    pub fleeing: bool,
    /// Not provoked by friendly fire until shields or hull drop noticeably.
    pub forbearing: bool,
}
