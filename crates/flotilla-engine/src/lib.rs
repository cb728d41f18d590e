//! Flotilla Engine -- the fixed-timestep driver around the ship core.
//!
//! A [`Simulation`](tick::Simulation) owns every ship in a
//! [`ShipRegistry`](flotilla_ship::registry::ShipRegistry), the static
//! [`Catalog`](flotilla_catalog::catalog::Catalog) and one seeded PRNG. Each
//! call to [`step`](tick::Simulation::step) runs the same stages in the same
//! order: apply commands, move, fire, launch, dock, scan. Between ticks the
//! caller resolves what needs two ships at once (boarding, capture, hits,
//! missile interception) through the transfer operations in [`transfer`].
//!
//! Because ship order is fixed (registry slot order), randomness comes from
//! one seeded generator, and commands are recorded per tick, a run is fully
//! reproducible: see [`snapshot`] and [`replay`].
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use flotilla_engine::prelude::*;
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
//! let mut sim = Simulation::new(Arc::new(catalog), SimConfig::default());
//! sim.set_active_system(Some("Sol".into()));
//! let id = sim
//!     .spawn("Shuttle", "Sol", Point::ZERO, Point::ZERO, Angle::default())
//!     .unwrap();
//!
//! for _ in 0..10 {
//!     sim.set_commands(id, Command::new().with_thrust(1.0));
//!     sim.step();
//! }
//! assert_eq!(sim.tick_count(), 10);
//! assert!(sim.ship(id).unwrap().velocity().length() > 0.0);
//! ```

#![deny(unsafe_code)]

pub mod replay;
pub mod report;
pub mod snapshot;
pub mod tick;
pub mod transfer;

use flotilla_ship::registry::ShipId;

/// Re-export the catalog crate for convenience.
pub use flotilla_catalog;

/// Re-export the ship crate for convenience.
pub use flotilla_ship;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by driver operations that can be refused.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No live ship has this handle.
    #[error("no ship with id {0}")]
    UnknownShip(ShipId),

    /// The carrier has no free bay of the kind the craft needs.
    #[error("ship {carrier} has no free bay for {craft}")]
    NoFreeBay { carrier: ShipId, craft: ShipId },

    /// A ship cannot be paired with itself.
    #[error("ship {0} cannot act on itself")]
    SameShip(ShipId),

    /// Ship construction failed.
    #[error(transparent)]
    Ship(#[from] flotilla_ship::ShipError),
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common engine usage.
pub mod prelude {
    pub use flotilla_ship::prelude::*;

    pub use crate::replay::{
        replay, ReplayDivergence, ReplayEntry, ReplayLog, ReplayRecorder, ReplayResult,
    };
    pub use crate::report::{ShipEventRecord, TickReport};
    pub use crate::snapshot::SimSnapshot;
    pub use crate::tick::{CommandFrame, SimConfig, Simulation, TickDiagnostics};
    pub use crate::EngineError;
}
