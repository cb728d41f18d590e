//! Fighter and drone bays.
//!
//! A carrier owns its docked craft outright. Docking moves the small ship out
//! of the registry and into a bay; launching hands it back to the caller,
//! who re-registers it.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use flotilla_catalog::prelude::*;

use crate::command::Command;
use crate::constants::*;
use crate::registry::ShipId;
use crate::ship::Ship;

/// One bay: a mount point and whatever is docked there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bay {
    offset: Point,
    ship: Option<Box<Ship>>,
}

impl Bay {
    /// An empty bay.
    pub fn new(offset: Point) -> Self {
        Self { offset, ship: None }
    }

    /// Mount point, unrotated.
    pub fn offset(&self) -> Point {
        self.offset
    }

    /// The docked craft.
    pub fn ship(&self) -> Option<&Ship> {
        self.ship.as_deref()
    }

    /// Whether nothing is docked here.
    pub fn is_free(&self) -> bool {
        self.ship.is_none()
    }

    pub(crate) fn dock(&mut self, ship: Box<Ship>) {
        self.ship = Some(ship);
    }
}

impl Ship {
    /// Fighter bays in order.
    pub fn fighter_bays(&self) -> &[Bay] {
        &self.fighter_bays
    }

    /// Drone bays in order.
    pub fn drone_bays(&self) -> &[Bay] {
        &self.drone_bays
    }

    /// Whether the hull has any bay at all.
    pub fn has_bays(&self) -> bool {
        !self.fighter_bays.is_empty() || !self.drone_bays.is_empty()
    }

    /// Empty fighter bays.
    pub fn fighter_bays_free(&self) -> usize {
        self.fighter_bays.iter().filter(|bay| bay.is_free()).count()
    }

    /// Empty drone bays.
    pub fn drone_bays_free(&self) -> usize {
        self.drone_bays.iter().filter(|bay| bay.is_free()).count()
    }

    /// Every docked craft, fighter bays first.
    pub fn carried_ships(&self) -> impl Iterator<Item = &Ship> {
        self.fighter_bays
            .iter()
            .chain(&self.drone_bays)
            .filter_map(Bay::ship)
    }

    /// Whether `ship` is a carried craft and a bay of its kind is free.
    pub fn can_carry(&self, ship: &Ship) -> bool {
        match BayKind::for_category(&ship.category) {
            Some(BayKind::Fighter) => self.fighter_bays_free() > 0,
            Some(BayKind::Drone) => self.drone_bays_free() > 0,
            None => false,
        }
    }

    /// Dock `ship` in the first free bay of its kind. The craft leaves every
    /// system and planet. If it is not a carried craft, or no bay is free,
    /// it is handed back untouched.
    pub fn add_fighter(&mut self, mut ship: Box<Ship>) -> Result<(), Box<Ship>> {
        let Some(kind) = BayKind::for_category(&ship.category) else {
            return Err(ship);
        };
        let bays = match kind {
            BayKind::Fighter => &mut self.fighter_bays,
            BayKind::Drone => &mut self.drone_bays,
        };
        let Some(bay) = bays.iter_mut().find(|bay| bay.is_free()) else {
            return Err(ship);
        };
        ship.set_system(None);
        ship.set_planet(None);
        ship.is_boarding = false;
        ship.has_boarded = false;
        debug!(carrier = %self.name, craft = %ship.name, ?kind, "craft docked");
        bay.dock(ship);
        Ok(())
    }

    /// Release docked craft under a deploy command. Each occupied bay rolls
    /// independently; fighter bays are checked before drone bays.
    ///
    /// Launched craft are placed at their bay, moving away from the carrier,
    /// in the carrier's system with `carrier` as their parent. The caller
    /// registers them and adds them as escorts.
    pub fn launch<R: Rng + ?Sized>(&mut self, carrier: ShipId, rng: &mut R) -> Vec<Ship> {
        let mut launched = Vec::new();
        if !self.commands.has(Command::DEPLOY) || self.cannot_act() {
            return launched;
        }

        let (position, velocity, angle) = (self.position, self.velocity, self.angle);
        let system = self.system.clone();
        for (bays, odds) in [
            (&mut self.fighter_bays, FIGHTER_LAUNCH_ODDS),
            (&mut self.drone_bays, DRONE_LAUNCH_ODDS),
        ] {
            for bay in bays.iter_mut() {
                if bay.ship.is_none() || rng.gen_range(0..odds) != 0 {
                    continue;
                }
                let Some(mut craft) = bay.ship.take() else {
                    continue;
                };
                let max_v = match craft.max_velocity() {
                    speed if speed.is_finite() => speed,
                    _ => 0.0,
                };
                let launch_velocity = velocity
                    + angle.unit() * (0.3 * max_v)
                    + Angle::random(rng).unit() * (0.2 * max_v);
                craft.place(position + angle.rotate(bay.offset), launch_velocity, angle);
                craft.set_system(system.clone());
                craft.set_parent(Some(carrier));
                launched.push(*craft);
            }
        }
        if !launched.is_empty() {
            debug!(carrier = %self.name, count = launched.len(), "craft launched");
        }
        launched
    }

    /// Empty every bay, as when the carrier lands or is lost. Released craft
    /// share the carrier's system and landing planet.
    pub fn unload_fighters(&mut self) -> Vec<Ship> {
        let system = self.system.clone();
        let planet = self.landing_planet.clone();
        self.fighter_bays
            .iter_mut()
            .chain(self.drone_bays.iter_mut())
            .filter_map(|bay| bay.ship.take())
            .map(|mut craft| {
                craft.set_system(system.clone());
                craft.set_planet(planet.clone());
                *craft
            })
            .collect()
    }

    /// Spill shield regeneration the carrier cannot hold into docked craft:
    /// each craft first regenerates with its own generator, then takes what it
    /// can of `excess`. Returns what is still left.
    pub(crate) fn share_shields(&mut self, mut excess: f64) -> f64 {
        for bay in self.fighter_bays.iter_mut().chain(self.drone_bays.iter_mut()) {
            let Some(craft) = bay.ship.as_deref_mut() else {
                continue;
            };
            let maximum = craft.attributes.get(StatKey::Shields);
            if maximum <= 0.0 {
                continue;
            }
            let own = craft.attributes.get(StatKey::ShieldGeneration);
            craft.shields = maximum.min(craft.shields + own);
            let taken = (maximum - craft.shields).min(excess).max(0.0);
            craft.shields += taken;
            excess -= taken;
        }
        excess
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
