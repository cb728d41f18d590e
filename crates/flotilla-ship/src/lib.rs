//! Flotilla Ship -- the per-ship simulation core.
//!
//! A [`Ship`](ship::Ship) is advanced one fixed tick at a time by
//! [`Ship::step`](ship::Ship::step), an explicit state machine over four
//! phases (destroyed, hyperspace, landing, flight). Around the tick sit the
//! operations a driver calls between ticks: firing, damage, launching and
//! docking carried craft, boarding, and capture.
//!
//! Ships never hold pointers to each other. Targets, parents and escorts are
//! generational [`ShipId`](registry::ShipId)s resolved through a
//! [`ShipRegistry`](registry::ShipRegistry), so a reference to a removed ship
//! simply stops resolving. Docked craft are owned by their carrier's bays.
//!
//! Randomness always comes from a caller-supplied [`rand::Rng`], so a seeded
//! generator makes a whole simulation reproducible.
//!
//! # Quick Start
//!
//! ```
//! use flotilla_ship::prelude::*;
//! use rand::rngs::mock::StepRng;
//!
//! let mut catalog = Catalog::new();
//! catalog.insert_system(StarSystem::new("Sol", Point::new(0.0, 0.0)));
//! catalog.insert_ship(ShipModel::new(
//!     "Shuttle",
//!     "Transport",
//!     Attributes::new()
//!         .with(StatKey::Mass, 50.0)
//!         .with(StatKey::Drag, 1.0)
//!         .with(StatKey::Thrust, 10.0)
//!         .with(StatKey::Hull, 100.0),
//! ));
//!
//! let mut ship = Ship::from_catalog(&catalog, "Shuttle").unwrap();
//! ship.set_system(Some("Sol".into()));
//! ship.set_commands(Command::new().with_thrust(1.0));
//!
//! let mut rng = StepRng::new(0, 1);
//! let mut effects = Vec::new();
//! let outcome = ship.step(&TickContext::new(&catalog), &mut rng, &mut effects);
//!
//! assert_eq!(outcome, TickOutcome::Continue);
//! assert!(ship.velocity().length() > 0.0);
//! ```

#![deny(unsafe_code)]

pub mod armament;
pub mod boarding;
pub mod cargo;
pub mod carrier;
pub mod combat;
pub mod command;
pub mod constants;
pub mod effect;
pub mod events;
pub mod gates;
pub mod personality;
pub mod record;
pub mod registry;
pub mod ship;
pub mod tick;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by ship construction and loading.
#[derive(Debug, thiserror::Error)]
pub enum ShipError {
    /// The catalog has no hull template with this name.
    #[error("unknown ship model '{0}'")]
    UnknownModel(String),

    /// The hull has more hardpoints than a [`Command`](crate::command::Command)
    /// can address.
    #[error("ship model '{model}' has {count} hardpoints, more than {max}", max = crate::command::Command::MAX_HARDPOINTS)]
    TooManyHardpoints { model: String, count: usize },

    /// A saved record could not be parsed.
    #[error("failed to parse ship record: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use flotilla_catalog::prelude::*;

    pub use crate::armament::{Armament, Hardpoint};
    pub use crate::boarding::BoardOutcome;
    pub use crate::cargo::CargoHold;
    pub use crate::carrier::Bay;
    pub use crate::command::Command;
    pub use crate::effect::{Effect, Projectile};
    pub use crate::events::ShipEvents;
    pub use crate::personality::Personality;
    pub use crate::record::{BayRecord, ShipRecord};
    pub use crate::registry::{ShipId, ShipRegistry};
    pub use crate::ship::Ship;
    pub use crate::tick::{Phase, ShipView, TickContext, TickOutcome};
    pub use crate::ShipError;
}
