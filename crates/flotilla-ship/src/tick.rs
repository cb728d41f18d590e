//! The per-tick state machine.
//!
//! Every tick a ship first keeps its bookkeeping (forget counter, resource
//! pools, heat) and then runs exactly one of four phases:
//!
//! | Phase        | While                                         |
//! |--------------|-----------------------------------------------|
//! | `Destroyed`  | the hull is breached                          |
//! | `Hyperspace` | a jump is charging, or its exit is unwinding  |
//! | `Landing`    | landing on, parked at, or taking off a planet |
//! | `Flight`     | otherwise                                     |
//!
//! Other ships are seen only through [`ShipView`] snapshots taken by the
//! driver before the tick, so a ship never holds a borrow of its neighbours
//! while it mutates itself.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use flotilla_catalog::prelude::*;

use crate::command::Command;
use crate::constants::*;
use crate::effect::Effect;
use crate::ship::Ship;

// ---------------------------------------------------------------------------
// Context types
// ---------------------------------------------------------------------------

/// What one ship may know about another during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipView {
    pub position: Point,
    pub velocity: Point,
    /// Facing unit vector scaled by half the zoom.
    pub unit: Point,
    pub system: Option<String>,
    pub government: Option<String>,
    pub is_disabled: bool,
    pub is_destroyed: bool,
}

/// Everything a ship reads from the outside world during its tick.
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    /// Static content.
    pub catalog: &'a Catalog,
    /// Whether the ship is in the system the simulation is watching.
    pub in_view: bool,
    /// The ship's parent, if it resolves.
    pub parent: Option<&'a ShipView>,
    /// The ship's target, if it resolves.
    pub target: Option<&'a ShipView>,
}

impl<'a> TickContext<'a> {
    /// A context with no neighbours, watched.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            in_view: true,
            parent: None,
            target: None,
        }
    }
}

/// Which branch of the tick a ship is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Destroyed,
    Hyperspace,
    Landing,
    Flight,
}

/// What the driver should do with the ship after its tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickOutcome {
    /// Keep the ship.
    Continue,
    /// Keep the ship; it arrived in a new system this tick.
    Jumped,
    /// Remove the ship from the world.
    Remove,
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

impl Ship {
    /// Snapshot of the fields other ships may read.
    pub fn view(&self) -> ShipView {
        ShipView {
            position: self.position,
            velocity: self.velocity,
            unit: self.unit(),
            system: self.system.clone(),
            government: self.government.clone(),
            is_disabled: self.is_disabled(),
            is_destroyed: self.is_destroyed(),
        }
    }

    /// The branch the next tick will run.
    pub fn phase(&self) -> Phase {
        if self.is_destroyed() {
            Phase::Destroyed
        } else if self.hyperspace_system.is_some() || self.hyperspace_count != 0 {
            Phase::Hyperspace
        } else if self.landing_planet.is_some() || self.zoom < 1.0 {
            Phase::Landing
        } else {
            Phase::Flight
        }
    }

    /// Advance the ship by one tick.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        ctx: &TickContext<'_>,
        rng: &mut R,
        effects: &mut Vec<Effect>,
    ) -> TickOutcome {
        if ctx.in_view {
            self.forget = 0;
        } else {
            self.forget += 1;
        }
        if (!self.is_special && self.forget >= FORGET_THRESHOLD) || self.system.is_none() {
            debug!(ship = %self.name, forget = self.forget, "ship forgotten");
            return TickOutcome::Remove;
        }

        let has_drive = self.attributes.get(StatKey::Hyperdrive) != 0.0
            || self.attributes.get(StatKey::JumpDrive) != 0.0;
        if self.fuel <= 0.0 || !has_drive {
            self.hyperspace_system = None;
        }

        self.update_pools();

        match self.phase() {
            Phase::Destroyed => self.step_destroyed(rng, effects),
            Phase::Hyperspace => self.step_hyperspace(ctx, rng, effects),
            Phase::Landing => self.step_landing(ctx),
            Phase::Flight => {
                self.step_flight(ctx, rng, effects);
                self.step_boarding(ctx);
                self.position += self.velocity;
                TickOutcome::Continue
            }
        }
    }

    /// Clamp pools to capacity, bleed heat, then regenerate.
    ///
    /// Pools are clamped before they gain anything, so within the rest of the
    /// tick energy may exceed capacity by one tick's generation. A ship with
    /// no batteries can still spend its generator output.
    fn update_pools(&mut self) {
        let mass = self.mass();
        self.energy = self.energy.min(self.attributes.get(StatKey::EnergyCapacity));
        self.fuel = self.fuel.min(self.attributes.get(StatKey::FuelCapacity)).max(0.0);
        let bunks = self.attributes.get(StatKey::Bunks);
        if bunks > 0.0 {
            self.crew = self.crew.min(bunks as i32);
        }
        self.crew = self.crew.max(0);

        self.heat *= self.heat_dissipation;
        if self.heat > mass * OVERHEAT_PER_MASS {
            self.is_overheated = true;
        } else if self.heat < mass * RECOVER_PER_MASS {
            self.is_overheated = false;
        }

        let max_shields = self.attributes.get(StatKey::Shields);
        self.shields = self.shields.min(max_shields).max(0.0);
        self.hull = self.hull.min(self.attributes.get(StatKey::Hull));
        self.disabled = self.is_overheated || self.is_disabled();

        // Repair can lift a ship back out of being disabled, but never out of
        // being destroyed.
        if !self.is_overheated && !self.is_destroyed() {
            self.hull += self.attributes.get(StatKey::HullRepairRate);
        }
        if self.disabled {
            return;
        }

        let ramscoop = self.attributes.get(StatKey::Ramscoop);
        if ramscoop > 0.0 {
            self.transfer_fuel(-RAMSCOOP_FACTOR * ramscoop.sqrt(), None);
        }

        self.energy += self.attributes.get(StatKey::EnergyGeneration);
        self.heat += self.attributes.get(StatKey::HeatGeneration);
        self.heat -= self.attributes.get(StatKey::Cooling);
        self.heat = self.heat.max(0.0);

        // Regeneration the batteries cannot pay for is taken back before any
        // overflow reaches docked craft.
        let shield_generation = self.attributes.get(StatKey::ShieldGeneration);
        self.shields += shield_generation;
        self.energy -= SHIELD_EXCHANGE_RATE * shield_generation;
        if self.energy < 0.0 {
            self.shields += self.energy / SHIELD_EXCHANGE_RATE;
            self.energy = 0.0;
        }

        let excess = (self.shields - max_shields).max(0.0);
        self.shields -= excess;
        let excess = self.share_shields(excess);
        self.energy += SHIELD_EXCHANGE_RATE * excess;
    }

    // -- destroyed ------------------------------------------------------------

    fn step_destroyed<R: Rng + ?Sized>(&mut self, rng: &mut R, effects: &mut Vec<Effect>) -> TickOutcome {
        if self.explosion_count >= self.explosion_total || self.forget != 0 {
            if self.forget == 0 {
                for _ in 0..self.explosion_total {
                    self.create_explosion(rng, effects);
                }
            }
            self.energy = 0.0;
            self.heat = 0.0;
            self.fuel = 0.0;
            debug!(ship = %self.name, "wreck removed");
            return TickOutcome::Remove;
        }

        self.explosion_rate += 1;
        if rng.gen_range(0..EXPLOSION_ROLL) < self.explosion_rate {
            self.create_explosion(rng, effects);
        }
        TickOutcome::Continue
    }

    /// Spawn one weighted-random explosion somewhere on the hull.
    fn create_explosion<R: Rng + ?Sized>(&mut self, rng: &mut R, effects: &mut Vec<Effect>) {
        if self.explode.is_empty() || self.explosion_total == 0 {
            return;
        }
        let point = self.random_hull_point(rng);
        let mut roll = rng.gen_range(0..self.explosion_total);
        let mut chosen = None;
        for (name, &weight) in &self.explode {
            chosen = Some(name);
            if roll < weight {
                break;
            }
            roll -= weight;
        }
        if let Some(name) = chosen {
            effects.push(Effect::new(
                name.clone(),
                self.angle.rotate(point) + self.position,
                self.velocity,
                self.angle,
            ));
            self.explosion_count += 1;
        }
    }

    /// A random point within the inner half of the sprite, unrotated.
    fn random_hull_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        Point::new(
            (rng.gen::<f64>() - 0.5) * 0.5 * self.extent.width,
            (rng.gen::<f64>() - 0.5) * 0.5 * self.extent.height,
        )
    }

    // -- hyperspace -------------------------------------------------------------

    fn step_hyperspace<R: Rng + ?Sized>(
        &mut self,
        ctx: &TickContext<'_>,
        rng: &mut R,
        effects: &mut Vec<Effect>,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::Continue;
        // Retargeting or clearing the destination before the commit unwinds
        // the charge.
        if self.hyperspace_system.is_some() && self.target_system != self.hyperspace_system {
            debug!(ship = %self.name, count = self.hyperspace_count, "jump cancelled");
            self.hyperspace_system = None;
        }
        let charging = self.hyperspace_system.is_some();
        if charging {
            self.fuel = (self.fuel - 1.0).max(0.0);
        }

        let mut direction = if charging { 1 } else { -1 };
        self.hyperspace_count += direction;
        let has_jump_drive = self.attributes.get(StatKey::JumpDrive) != 0.0;

        if has_jump_drive && ctx.in_view {
            self.emit_jump_particles(rng, effects);
        }

        if self.hyperspace_count == HYPERSPACE_THRESHOLD {
            self.system = self.hyperspace_system.take();
            let excess = self.attributes.get(StatKey::JumpFuel) - f64::from(HYPERSPACE_THRESHOLD);
            if excess > 0.0 {
                self.fuel = (self.fuel - excess).max(0.0);
            }
            self.target_system = None;
            self.target_planet = None;
            direction = -1;
            outcome = TickOutcome::Jumped;
            debug!(ship = %self.name, system = ?self.system, "jump complete");

            if has_jump_drive {
                return outcome;
            }

            let target = self.arrival_point(ctx.catalog);
            let hyper_c = f64::from(HYPERSPACE_THRESHOLD);
            let distance = hyper_c * hyper_c * 0.5 * HYPERSPACE_ACCELERATION + HYPERSPACE_EXIT_MARGIN;
            self.position = target - self.angle.unit() * distance + self.hyperspace_offset;
            self.velocity = self.angle.unit() * self.velocity.length();
        }

        if !has_jump_drive {
            self.velocity += self.angle.unit() * (HYPERSPACE_ACCELERATION * f64::from(direction));
            let max_velocity = self.max_velocity();
            let speed = self.velocity.length();
            if speed <= max_velocity && self.hyperspace_system.is_none() {
                // A dragless ship keeps whatever speed it dropped out at.
                let exit_speed = if max_velocity.is_finite() { max_velocity } else { speed };
                self.velocity = self.angle.unit() * exit_speed;
                self.hyperspace_count = 0;
            }
        }
        self.position += self.velocity;

        if let Some(parent) = ctx.parent {
            if parent.system.is_some() && parent.system == self.system {
                self.hyperspace_offset = self.position - parent.position;
                let length = self.hyperspace_offset.length();
                if length > MAX_FORMATION_OFFSET {
                    self.hyperspace_offset *= MAX_FORMATION_OFFSET / length;
                }
            }
        }
        outcome
    }

    /// Where a hyperdrive jump aims to stop: the destination planet if one
    /// is set, else the first spaceport, else the system center.
    fn arrival_point(&self, catalog: &Catalog) -> Point {
        let Some(system) = self.system.as_deref().and_then(|name| catalog.system(name)) else {
            return Point::ZERO;
        };
        if let Some(object) = self
            .destination
            .as_deref()
            .and_then(|planet| system.object_for_planet(planet))
        {
            return object.position;
        }
        system
            .objects
            .iter()
            .find(|object| {
                object
                    .planet
                    .as_deref()
                    .and_then(|name| catalog.planet(name))
                    .is_some_and(|planet| planet.spaceport)
            })
            .map_or(Point::ZERO, |object| object.position)
    }

    fn emit_jump_particles<R: Rng + ?Sized>(&self, rng: &mut R, effects: &mut Vec<Effect>) {
        let area = self.extent.width * self.extent.height;
        let count = (f64::from(self.hyperspace_count) * area / JUMP_PARTICLE_AREA) as i64;
        for _ in 0..count.max(0) {
            let point = self.random_hull_point(rng);
            let velocity = self.velocity + Angle::random(rng).unit() * 5.0;
            effects.push(Effect::new(
                JUMP_PARTICLE_EFFECT,
                self.angle.rotate(point) + self.position,
                velocity,
                self.angle,
            ));
        }
    }

    // -- landing ------------------------------------------------------------------

    fn step_landing(&mut self, ctx: &TickContext<'_>) -> TickOutcome {
        let catalog = ctx.catalog;
        let target_object = self.target_planet.as_ref().and_then(|target| catalog.object(target));
        let still_targeted = target_object.and_then(|object| object.planet.as_deref())
            == self.landing_planet.as_deref();
        if self.landing_planet.is_some() && self.zoom > 0.0 && !still_targeted {
            debug!(ship = %self.name, planet = ?self.landing_planet, "landing cancelled");
            self.landing_planet = None;
        }
        let planet = self.landing_planet.as_deref().and_then(|name| catalog.planet(name));

        if self.landing_planet.is_some() && self.zoom > 0.0 {
            if let Some(object) = target_object {
                self.position = self.position * (1.0 - LANDING_DRIFT) + object.position * LANDING_DRIFT;
            }
            self.zoom -= LANDING_ZOOM_STEP;
            if self.zoom < 0.0 {
                if let Some(wormhole) = planet.filter(|planet| planet.is_wormhole()) {
                    let from = self.system.clone().unwrap_or_default();
                    let to = wormhole.wormhole_destination(&from).to_owned();
                    if let Some(object) = catalog
                        .system(&to)
                        .and_then(|system| system.object_for_planet(&wormhole.name))
                    {
                        self.position = object.position;
                    }
                    debug!(ship = %self.name, from = %from, to = %to, "wormhole transit");
                    self.system = Some(to);
                    self.target_planet = None;
                    self.landing_planet = None;
                } else if !self.is_special || self.personality.fleeing {
                    debug!(ship = %self.name, planet = ?self.landing_planet, "ship landed");
                    return TickOutcome::Remove;
                }
                self.zoom = 0.0;
            }
        } else if self.fuel == self.attributes.get(StatKey::FuelCapacity)
            || !planet.is_some_and(|planet| planet.spaceport)
        {
            self.zoom = (self.zoom + LANDING_ZOOM_STEP).min(1.0);
            self.landing_planet = None;
        } else {
            self.fuel = (self.fuel + SPACEPORT_REFUEL_RATE)
                .min(self.attributes.get(StatKey::FuelCapacity));
        }

        self.position += self.velocity * self.zoom;
        TickOutcome::Continue
    }

    // -- flight -------------------------------------------------------------------

    fn step_flight<R: Rng + ?Sized>(
        &mut self,
        ctx: &TickContext<'_>,
        rng: &mut R,
        effects: &mut Vec<Effect>,
    ) {
        if self.commands.has(Command::LAND) && self.can_land(ctx.catalog) {
            self.landing_planet = self
                .target_planet
                .as_ref()
                .and_then(|target| ctx.catalog.object(target))
                .and_then(|object| object.planet.clone());
        } else if self.commands.has(Command::JUMP) && self.can_hyperspace(ctx.catalog) {
            self.hyperspace_system = self.target_system.clone();
        }

        self.step_cloak();
        self.step_pilot(rng);

        let mass = self.mass();
        if self.disabled {
            self.velocity *= drag_factor(self.attributes.get(StatKey::Drag), mass);
        } else if self.pilot_error == 0 {
            self.apply_steering(mass, ctx.in_view, ctx.catalog, effects);
        }
    }

    fn step_cloak(&mut self) {
        let speed = self.attributes.get(StatKey::Cloak);
        let fuel_cost = self.attributes.get(StatKey::CloakingFuel);
        let energy_cost = self.attributes.get(StatKey::CloakingEnergy);
        let can_cloak = self.zoom == 1.0
            && !self.disabled
            && self.hyperspace_count == 0
            && speed != 0.0
            && self.fuel >= fuel_cost
            && self.energy >= energy_cost;

        if self.commands.has(Command::CLOAK) && can_cloak {
            self.cloak = (self.cloak + speed).min(1.0);
            self.fuel -= fuel_cost;
            self.energy -= energy_cost;
        } else if speed != 0.0 {
            self.cloak = (self.cloak - speed).max(0.0);
        } else {
            self.cloak = 0.0;
        }
    }

    /// Roll for crew-shortage control loss once each lockout or grace window
    /// runs out. The chance of losing control is the fraction of required crew
    /// that is missing.
    fn step_pilot<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let required = self.required_crew();
        if self.pilot_error > 0 {
            self.pilot_error -= 1;
        } else if self.pilot_okay > 0 {
            self.pilot_okay -= 1;
        } else if required > 0 && rng.gen_range(0..required) >= self.crew {
            trace!(ship = %self.name, crew = self.crew, required, "pilot error");
            self.pilot_error = PILOT_ERROR_TICKS;
        } else {
            self.pilot_okay = PILOT_OKAY_TICKS;
        }
    }

    fn apply_steering(&mut self, mass: f64, in_view: bool, catalog: &Catalog, effects: &mut Vec<Effect>) {
        let attributes = &self.attributes;
        let mut thrust_command = self.commands.thrust();
        if thrust_command != 0.0 {
            let forward = thrust_command > 0.0;
            let (thrust_key, energy_key, heat_key) = if forward {
                (StatKey::Thrust, StatKey::ThrustingEnergy, StatKey::ThrustingHeat)
            } else {
                (
                    StatKey::ReverseThrust,
                    StatKey::ReverseThrustingEnergy,
                    StatKey::ReverseThrustingHeat,
                )
            };
            let magnitude = thrust_command.abs();
            let cost = attributes.get(energy_key) * magnitude;
            let thrust = attributes.get(thrust_key);
            // Missing reverse thrusters mean the command is ignored outright,
            // drag included.
            if self.energy < cost || thrust == 0.0 {
                thrust_command = 0.0;
            } else {
                self.energy -= cost;
                self.heat += attributes.get(heat_key) * magnitude;
                self.velocity += self.angle.unit() * (thrust_command * thrust / mass);
            }
        }

        let mut afterburner = self.commands.has(Command::AFTERBURNER) && !self.cannot_act();
        if afterburner {
            let thrust = self.attributes.get(StatKey::AfterburnerThrust);
            let fuel_cost = self.attributes.get(StatKey::AfterburnerFuel);
            let energy_cost = self.attributes.get(StatKey::AfterburnerEnergy);
            if thrust == 0.0 || self.fuel < fuel_cost || self.energy < energy_cost {
                afterburner = false;
            } else {
                self.heat += self.attributes.get(StatKey::AfterburnerHeat);
                self.fuel -= fuel_cost;
                self.energy -= energy_cost;
                self.velocity += self.angle.unit() * (thrust / mass);
                if in_view {
                    self.emit_afterburner_flares(catalog, effects);
                }
            }
        }

        if thrust_command != 0.0 || afterburner {
            self.velocity *= drag_factor(self.attributes.get(StatKey::Drag), mass);
        }

        let turn = self.commands.turn();
        let turn_capability = self.attributes.get(StatKey::Turn);
        if turn != 0.0 && turn_capability != 0.0 {
            let cost = self.attributes.get(StatKey::TurningEnergy) * turn.abs();
            if self.energy < cost {
                self.commands.set_turn(0.0);
            } else {
                self.energy -= cost;
                self.heat += self.attributes.get(StatKey::TurningHeat) * turn.abs();
                self.angle += turn * self.turn_rate();
            }
        }
    }

    fn emit_afterburner_flares(&self, catalog: &Catalog, effects: &mut Vec<Effect>) {
        let flare = self
            .outfits
            .keys()
            .filter_map(|name| catalog.outfit(name))
            .find(|outfit| outfit.get(StatKey::AfterburnerThrust) != 0.0 && outfit.flare_effect.is_some())
            .and_then(|outfit| outfit.flare_effect.as_deref())
            .unwrap_or(DEFAULT_AFTERBURNER_EFFECT);
        for &point in &self.engines {
            let position = self.angle.rotate(point) * (0.5 * self.zoom) + self.position;
            effects.push(Effect::new(
                flare,
                position + self.velocity,
                self.velocity - self.angle.unit() * 6.0,
                self.angle,
            ));
        }
    }

    // -- boarding approach ----------------------------------------------------------

    /// Close in on the boarding target (the parent, for carried craft) and
    /// mark boarding complete once docked alongside.
    fn step_boarding(&mut self, ctx: &TickContext<'_>) {
        if self.is_boarding && self.commands.is_steering() {
            self.is_boarding = false;
        }
        let is_fighter = self.is_fighter();
        let target = if is_fighter { ctx.parent } else { ctx.target };
        let Some(target) = target else {
            return;
        };
        if self.disabled {
            return;
        }

        let dp = target.position - self.position;
        let distance = dp.length();
        let dv = target.velocity - self.velocity;
        let speed = dv.length();
        self.is_boarding |= distance < BOARDING_RANGE
            && speed < BOARDING_SPEED_LIMIT
            && self.commands.has(Command::BOARD);

        if self.is_boarding && !is_fighter {
            let hostile = ctx
                .catalog
                .is_enemy(self.government.as_deref(), target.government.as_deref());
            if (!target.is_disabled && hostile) || target.is_destroyed {
                self.is_boarding = false;
            }
        }

        if self.is_boarding && self.pilot_error == 0 {
            let left = target.unit.cross(self.angle.unit()) < 0.0;
            let mut turn = if left { 1.0 } else { -1.0 };
            let facing = self.angle + self.turn_rate() * turn;
            let still_left = target.unit.cross(facing.unit()) < 0.0;
            if left != still_left {
                turn = 0.0;
            }
            self.angle += self.turn_rate() * turn;

            self.velocity += dv.unit() * 0.1;
            self.position += dp.unit() * 0.5;

            if distance < BOARDED_RANGE && speed < BOARDING_SPEED_LIMIT && (is_fighter || turn == 0.0) {
                self.is_boarding = false;
                self.has_boarded = true;
                debug!(ship = %self.name, "boarding complete");
            }
        }
    }
}

/// Fraction of velocity kept after one tick of drag.
fn drag_factor(drag: f64, mass: f64) -> f64 {
    if mass <= 0.0 {
        return 1.0;
    }
    (1.0 - drag / mass).max(0.0)
}
