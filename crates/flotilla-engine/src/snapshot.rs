//! Simulation snapshot and restore with BLAKE3 hashing.
//!
//! A [`SimSnapshot`] holds everything that decides what the next tick does:
//! every ship, the tick counter, the time step, the PRNG state, the active
//! system and the pending command frame. Its `hash` is a BLAKE3 digest of
//! that state and identifies it across runs and processes.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use flotilla_engine::prelude::*;
//!
//! let mut catalog = Catalog::new();
//! catalog.insert_system(StarSystem::new("Sol", Point::ZERO));
//! catalog.insert_ship(ShipModel::new(
//!     "Shuttle",
//!     "Transport",
//!     Attributes::new().with(StatKey::Mass, 10.0).with(StatKey::Hull, 100.0),
//! ));
//! let mut sim = Simulation::new(Arc::new(catalog), SimConfig::default());
//! sim.set_active_system(Some("Sol".into()));
//! sim.spawn("Shuttle", "Sol", Point::ZERO, Point::new(1.0, 0.0), Angle::default())
//!     .unwrap();
//! sim.run_ticks(10);
//!
//! let snapshot = sim.capture_snapshot();
//! assert_eq!(snapshot.tick_counter, 10);
//! assert_eq!(snapshot.hash.len(), 64); // BLAKE3 hex digest
//!
//! sim.run_ticks(10);
//! sim.restore_from_snapshot(&snapshot).unwrap();
//! assert_eq!(sim.tick_count(), 10);
//! assert_eq!(sim.state_hash(), snapshot.hash);
//! ```
//!
//! # What Is NOT Serialized
//!
//! - **Catalog**: static content stays with the simulation it was given to.
//!   Restoring onto a simulation with a different catalog is allowed and
//!   will make ships read the new content.
//! - **Config**: `seed` only matters at construction (the PRNG state is
//!   snapshotted instead), and `headless` is a property of the host.
//! - **Diagnostics**: per-tick timing is transient.

use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use flotilla_ship::registry::ShipRegistry;

use crate::tick::{CommandFrame, Simulation};

// ---------------------------------------------------------------------------
// SimSnapshot
// ---------------------------------------------------------------------------

/// A serializable snapshot of the full simulation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimSnapshot {
    /// Every ship, with the registry's slot and generation bookkeeping so
    /// that handles keep resolving after a restore.
    pub ships: ShipRegistry,
    /// Number of ticks executed at the time of capture.
    pub tick_counter: u64,
    /// Fixed time step in seconds per tick.
    pub fixed_dt: f64,
    /// PRNG state.
    pub rng: Pcg64,
    /// The watched system.
    pub active_system: Option<String>,
    /// Commands queued for the next tick.
    pub current_input: CommandFrame,
    /// BLAKE3 hex digest (64 lowercase hex chars) of everything above.
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Hashing helpers
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct HashableState<'a> {
    ships: &'a ShipRegistry,
    tick_counter: u64,
    fixed_dt: f64,
    rng: &'a Pcg64,
    active_system: Option<&'a str>,
    current_input: &'a CommandFrame,
}

impl HashableState<'_> {
    fn digest(&self) -> String {
        let json_bytes = serde_json::to_vec(self)
            .expect("simulation state should always be JSON-serializable");
        blake3::hash(&json_bytes).to_hex().to_string()
    }
}

impl SimSnapshot {
    fn hashable(&self) -> HashableState<'_> {
        HashableState {
            ships: &self.ships,
            tick_counter: self.tick_counter,
            fixed_dt: self.fixed_dt,
            rng: &self.rng,
            active_system: self.active_system.as_deref(),
            current_input: &self.current_input,
        }
    }

    /// Recompute the digest and compare it with the recorded one.
    pub fn verify(&self) -> bool {
        self.hashable().digest() == self.hash
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, anyhow::Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse from JSON. The hash is not checked until restore.
    pub fn from_json_str(json: &str) -> Result<Self, anyhow::Error> {
        serde_json::from_str(json).map_err(|e| anyhow::anyhow!("failed to parse snapshot: {e}"))
    }
}

// ---------------------------------------------------------------------------
// Simulation snapshot/restore methods
// ---------------------------------------------------------------------------

impl Simulation {
    fn hashable(&self) -> HashableState<'_> {
        HashableState {
            ships: &self.registry,
            tick_counter: self.tick_counter,
            fixed_dt: self.fixed_dt,
            rng: &self.rng,
            active_system: self.active_system.as_deref(),
            current_input: &self.current_input,
        }
    }

    /// Capture a complete snapshot of the simulation state.
    pub fn capture_snapshot(&self) -> SimSnapshot {
        let hash = self.hashable().digest();
        SimSnapshot {
            ships: self.registry.clone(),
            tick_counter: self.tick_counter,
            fixed_dt: self.fixed_dt,
            rng: self.rng.clone(),
            active_system: self.active_system.clone(),
            current_input: self.current_input.clone(),
            hash,
        }
    }

    /// Restore the simulation state from a previously captured snapshot.
    ///
    /// The snapshot is validated before anything is touched; on error the
    /// simulation is left as it was.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot's `fixed_dt` is not positive and
    /// finite, or if its hash does not match its contents.
    pub fn restore_from_snapshot(&mut self, snapshot: &SimSnapshot) -> Result<(), anyhow::Error> {
        if !(snapshot.fixed_dt > 0.0 && snapshot.fixed_dt.is_finite()) {
            return Err(anyhow::anyhow!(
                "snapshot has invalid fixed_dt: {}. Must be positive and finite.",
                snapshot.fixed_dt
            ));
        }

        let expected_hash = snapshot.hashable().digest();
        if expected_hash != snapshot.hash {
            return Err(anyhow::anyhow!(
                "snapshot hash mismatch: recorded {} but recomputed {}. \
                 The snapshot may be corrupted or tampered with.",
                snapshot.hash,
                expected_hash
            ));
        }

        self.registry = snapshot.ships.clone();
        self.tick_counter = snapshot.tick_counter;
        self.fixed_dt = snapshot.fixed_dt;
        self.rng = snapshot.rng.clone();
        self.active_system = snapshot.active_system.clone();
        self.current_input = snapshot.current_input.clone();
        debug!(
            tick = snapshot.tick_counter,
            ships = self.registry.len(),
            "restored from snapshot"
        );
        Ok(())
    }

    /// The BLAKE3 state hash, without cloning the state into a snapshot.
    pub fn state_hash(&self) -> String {
        self.hashable().digest()
    }

    /// Capture a branch point. Same as
    /// [`capture_snapshot`](Self::capture_snapshot).
    pub fn fork_snapshot(&self) -> SimSnapshot {
        self.capture_snapshot()
    }
}
