//! What one tick produced.

use serde::{Deserialize, Serialize};

use flotilla_ship::prelude::*;

/// A ship transition the driver (or a UI) may want to react to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipEventRecord {
    /// Tick during which the transition happened.
    pub tick: u64,
    /// Ship that caused or underwent the transition.
    pub actor: ShipId,
    /// The other ship involved, if any.
    pub target: Option<ShipId>,
    pub events: ShipEvents,
}

/// Everything produced by one call to
/// [`Simulation::step`](crate::tick::Simulation::step).
///
/// Effects and projectiles are append-only outputs; the driver owns their
/// lifetime from here on. Ship handles in `removed` no longer resolve.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickReport {
    /// Tick number this report belongs to (before the counter advanced).
    pub tick: u64,
    /// Visual effects: explosions, flares, jump particles, point defense.
    pub effects: Vec<Effect>,
    /// Newly fired projectiles, including death blasts.
    pub projectiles: Vec<Projectile>,
    /// Ships removed from the world this tick.
    pub removed: Vec<ShipId>,
    /// Ships added this tick: launched craft and craft released by a lost
    /// carrier.
    pub launched: Vec<ShipId>,
    /// Carried craft that docked with their parent this tick.
    pub docked: Vec<ShipId>,
    /// Ships that finished boarding their target and wait for
    /// [`Simulation::board`](crate::tick::Simulation::board).
    pub boarded: Vec<ShipId>,
    /// Ships that have a ready anti-missile system this tick.
    pub anti_missile_ready: Vec<ShipId>,
    pub events: Vec<ShipEventRecord>,
}

impl TickReport {
    pub(crate) fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, actor: ShipId, target: Option<ShipId>, events: ShipEvents) {
        if events.is_empty() {
            return;
        }
        self.events.push(ShipEventRecord {
            tick: self.tick,
            actor,
            target,
            events,
        });
    }

    /// Event records whose bits include `kind`.
    pub fn events_of(&self, kind: ShipEvents) -> impl Iterator<Item = &ShipEventRecord> {
        self.events.iter().filter(move |record| record.events.contains(kind))
    }
}
