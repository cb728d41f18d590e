//! Flotilla Catalog -- read-only content for the ship simulation.
//!
//! The catalog holds every named template the simulation consults: outfits
//! (equipment and weapons), hull templates, star systems with their stellar
//! objects, planets, and governments. It is built once at startup and then
//! handed to the simulation as an explicit, immutable dependency.
//!
//! Equipment stats are a fixed set of [`StatKey`](stat::StatKey)s stored in a
//! dense [`Attributes`](stat::Attributes) table, so summing a ship's loadout
//! and reading a stat in the tick path never touches a string.
//!
//! # Quick Start
//!
//! ```
//! use flotilla_catalog::prelude::*;
//!
//! let mut catalog = Catalog::new();
//! catalog.insert_outfit(Outfit::new(
//!     "Ion Engine",
//!     Attributes::new().with(StatKey::Thrust, 20.0),
//! ));
//! catalog.insert_system(StarSystem::new("Sol", Point::new(0.0, 0.0)));
//!
//! assert_eq!(catalog.outfit("Ion Engine").unwrap().get(StatKey::Thrust), 20.0);
//! assert!(catalog.outfit("Warp Core").is_none());
//! ```

#![deny(unsafe_code)]

pub mod catalog;
pub mod galaxy;
pub mod geometry;
pub mod model;
pub mod outfit;
pub mod stat;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced while loading or validating content.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The content could not be parsed.
    #[error("failed to parse content: {0}")]
    Parse(#[from] serde_json::Error),

    /// Content referenced an outfit that does not exist.
    #[error("'{referenced_by}' references unknown outfit '{name}'")]
    UnknownOutfit { name: String, referenced_by: String },

    /// Content referenced a system that does not exist.
    #[error("'{referenced_by}' references unknown system '{name}'")]
    UnknownSystem { name: String, referenced_by: String },

    /// Content referenced a planet that does not exist.
    #[error("'{referenced_by}' references unknown planet '{name}'")]
    UnknownPlanet { name: String, referenced_by: String },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::catalog::{Catalog, ObjectRef};
    pub use crate::galaxy::{Government, Planet, StarSystem, StellarObject};
    pub use crate::geometry::{Angle, Point};
    pub use crate::model::{
        BayKind, Extent, HardpointSpec, ShipModel, DRONE_CATEGORY, FIGHTER_CATEGORY,
    };
    pub use crate::outfit::{MountKind, Outfit, WeaponSpec};
    pub use crate::stat::{Attributes, StatKey};
    pub use crate::CatalogError;
}
