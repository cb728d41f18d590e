//! Operations that move state between two ships.
//!
//! A ship's tick only ever mutates that ship. Anything that needs two ships
//! at once (boarding, capture, docking, hits, missile interception) is
//! resolved here by the driver, between ticks or inside
//! [`Simulation::step`] after every ship has moved.

use tracing::{debug, warn};

use flotilla_ship::prelude::*;

use crate::tick::Simulation;
use crate::EngineError;

impl Simulation {
    /// Resolve a completed boarding by `id`.
    ///
    /// A carried craft boards its parent and is docked into a free bay;
    /// any other ship boards its target, which must share its system.
    /// Returns what the boarding turned into.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownShip`] if `id` does not resolve, and
    /// [`EngineError::NoFreeBay`] if a craft reached a parent with no room.
    pub fn board(&mut self, id: ShipId, auto_plunder: bool) -> Result<BoardOutcome, EngineError> {
        let ship = self.registry.get(id).ok_or(EngineError::UnknownShip(id))?;
        let victim_id = if ship.is_fighter() {
            ship.parent()
        } else {
            ship.target_ship()
        };
        let Some(victim_id) = victim_id else {
            return Ok(BoardOutcome::None);
        };
        let same_system = self
            .registry
            .get(victim_id)
            .is_some_and(|victim| victim.system().is_some() && victim.system() == ship.system());
        if !same_system {
            return Ok(BoardOutcome::None);
        }

        let Some((boarder, victim)) = self.registry.pair_mut(id, victim_id) else {
            return Ok(BoardOutcome::None);
        };
        let outcome = boarder.board(victim, auto_plunder, &self.catalog);
        if outcome == BoardOutcome::Dock {
            self.dock(id, victim_id)?;
        }
        Ok(outcome)
    }

    /// Dock a carried craft that finished boarding its parent. Used by the
    /// tick; refusals are logged rather than returned.
    pub(crate) fn dock_with_parent(&mut self, id: ShipId) -> bool {
        match self.board(id, false) {
            Ok(BoardOutcome::Dock) => true,
            Ok(_) => false,
            Err(err) => {
                warn!(%id, %err, "craft could not dock");
                false
            }
        }
    }

    /// Hand `victim` over to `capturer`. The victim joins the capturer's
    /// escorts and leaves those of its previous parent.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SameShip`] if both handles name one ship, and
    /// [`EngineError::UnknownShip`] if either does not resolve.
    pub fn capture(&mut self, victim_id: ShipId, capturer_id: ShipId) -> Result<(), EngineError> {
        if victim_id == capturer_id {
            return Err(EngineError::SameShip(victim_id));
        }
        let previous_parent = self
            .registry
            .get(victim_id)
            .ok_or(EngineError::UnknownShip(victim_id))?
            .parent();
        let (victim, capturer) = self
            .registry
            .pair_mut(victim_id, capturer_id)
            .ok_or(EngineError::UnknownShip(capturer_id))?;
        victim.was_captured(capturer, capturer_id);
        capturer.add_escort(victim_id);

        if let Some(parent) = previous_parent.filter(|&parent| parent != capturer_id) {
            if let Some(parent) = self.registry.get_mut(parent) {
                parent.remove_escort(victim_id);
            }
        }
        Ok(())
    }

    /// Apply a projectile hit to `target`. A stale handle takes no damage.
    pub fn apply_hit(&mut self, target: ShipId, projectile: &Projectile) -> ShipEvents {
        match self.registry.get_mut(target) {
            Some(ship) => ship.take_damage(projectile, &self.catalog),
            None => ShipEvents::NONE,
        }
    }

    /// Give every ship in the active system that is hostile to the
    /// projectile's government a chance to shoot it down, in slot order.
    /// Returns `true` once one succeeds.
    pub fn intercept(&mut self, projectile: &Projectile, effects: &mut Vec<Effect>) -> bool {
        let Some(active) = self.active_system.as_deref() else {
            return false;
        };
        let mut fired = Vec::new();
        let mut destroyed = false;
        for id in self.registry.ids() {
            let Some(ship) = self.registry.get_mut(id) else {
                continue;
            };
            let hostile = self
                .catalog
                .is_enemy(ship.government(), projectile.government.as_deref());
            if ship.system() != Some(active) || !hostile {
                continue;
            }
            if ship.fire_anti_missile(projectile, &self.catalog, &mut self.rng, &mut fired) {
                destroyed = true;
                break;
            }
        }
        if !self.config.headless {
            effects.append(&mut fired);
        }
        destroyed
    }

    /// Stow `fighter` in a bay of `carrier`. The craft leaves the world and
    /// the carrier's escorts.
    ///
    /// # Errors
    ///
    /// Fails if either handle does not resolve, both name one ship, or the
    /// carrier has no free bay of the craft's kind.
    pub fn dock(&mut self, fighter: ShipId, carrier: ShipId) -> Result<(), EngineError> {
        if fighter == carrier {
            return Err(EngineError::SameShip(fighter));
        }
        let craft = self
            .registry
            .get(fighter)
            .ok_or(EngineError::UnknownShip(fighter))?;
        let host = self
            .registry
            .get(carrier)
            .ok_or(EngineError::UnknownShip(carrier))?;
        if !host.can_carry(craft) {
            return Err(EngineError::NoFreeBay { carrier, craft: fighter });
        }

        let craft = self
            .registry
            .remove(fighter)
            .ok_or(EngineError::UnknownShip(fighter))?;
        let Some(host) = self.registry.get_mut(carrier) else {
            return Err(EngineError::UnknownShip(carrier));
        };
        host.remove_escort(fighter);
        if let Err(craft) = host.add_fighter(Box::new(craft)) {
            self.registry.insert(*craft);
            return Err(EngineError::NoFreeBay { carrier, craft: fighter });
        }
        debug!(%fighter, %carrier, "craft docked");
        Ok(())
    }

    /// Release every docked craft of `carrier` into the world as its
    /// escorts. A carrier in space sets them loose at its own position; a
    /// landed carrier leaves them landed with it.
    pub fn unload_fighters(&mut self, carrier: ShipId) -> Vec<ShipId> {
        let Some(host) = self.registry.get_mut(carrier) else {
            warn!(%carrier, "unload requested for a missing ship");
            return Vec::new();
        };
        let in_space = host.landing_planet().is_none();
        let (position, velocity, angle) = (host.position(), host.velocity(), host.facing());
        let released = host.unload_fighters();

        let mut ids = Vec::with_capacity(released.len());
        for mut craft in released {
            if in_space {
                craft.place(position, velocity, angle);
            }
            craft.set_parent(Some(carrier));
            ids.push(self.registry.insert(craft));
        }
        if let Some(host) = self.registry.get_mut(carrier) {
            for &id in &ids {
                host.add_escort(id);
            }
        }
        debug!(%carrier, count = ids.len(), "craft unloaded");
        ids
    }
}
