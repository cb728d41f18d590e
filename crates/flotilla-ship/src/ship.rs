//! The ship aggregate: identity, loadout, kinematics, resource pools and
//! relationships to other ships.
//!
//! Behavior is split across sibling modules that each add an `impl Ship`
//! block: [`tick`](crate::tick) for the per-tick state machine,
//! [`gates`](crate::gates) for landing and jump eligibility,
//! [`combat`](crate::combat) for weapons and damage,
//! [`carrier`](crate::carrier) for bays, and [`boarding`](crate::boarding)
//! for boarding and capture.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use flotilla_catalog::prelude::*;

use crate::armament::Armament;
use crate::cargo::CargoHold;
use crate::carrier::Bay;
use crate::command::Command;
use crate::constants::*;
use crate::personality::Personality;
use crate::registry::ShipId;
use crate::ShipError;

// ---------------------------------------------------------------------------
// Ship
// ---------------------------------------------------------------------------

/// A single ship.
///
/// References to other ships (target, parent, escorts) are [`ShipId`]s
/// resolved through the registry, so they go silent when the other ship is
/// removed. Carried craft are owned outright by the bays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ship {
    // -- identity -----------------------------------------------------------
    pub(crate) model_name: String,
    pub(crate) name: String,
    pub(crate) category: String,
    pub(crate) description: String,
    pub(crate) government: Option<String>,
    pub(crate) personality: Personality,
    pub(crate) is_special: bool,

    // -- loadout ------------------------------------------------------------
    pub(crate) base_attributes: Attributes,
    pub(crate) attributes: Attributes,
    pub(crate) outfits: BTreeMap<String, i32>,
    pub(crate) armament: Armament,
    pub(crate) cargo: CargoHold,
    pub(crate) engines: Vec<Point>,
    pub(crate) fighter_bays: Vec<Bay>,
    pub(crate) drone_bays: Vec<Bay>,
    pub(crate) explode: BTreeMap<String, u32>,
    pub(crate) explosion_weapon: Option<WeaponSpec>,
    pub(crate) extent: Extent,
    pub(crate) heat_dissipation: f64,

    // -- kinematics ---------------------------------------------------------
    pub(crate) position: Point,
    pub(crate) velocity: Point,
    pub(crate) angle: Angle,
    pub(crate) zoom: f64,
    pub(crate) cloak: f64,
    pub(crate) system: Option<String>,
    pub(crate) landing_planet: Option<String>,
    pub(crate) hyperspace_system: Option<String>,
    pub(crate) hyperspace_count: i32,
    pub(crate) hyperspace_offset: Point,

    // -- pools --------------------------------------------------------------
    pub(crate) hull: f64,
    pub(crate) shields: f64,
    pub(crate) energy: f64,
    pub(crate) fuel: f64,
    pub(crate) heat: f64,
    pub(crate) crew: i32,

    // -- status -------------------------------------------------------------
    /// Disabled or overheated as of the last tick; gates all actions.
    pub(crate) disabled: bool,
    pub(crate) is_overheated: bool,
    pub(crate) is_boarding: bool,
    pub(crate) has_boarded: bool,
    pub(crate) forget: u32,
    pub(crate) pilot_error: u32,
    pub(crate) pilot_okay: u32,
    pub(crate) explosion_rate: u32,
    pub(crate) explosion_count: u32,
    pub(crate) explosion_total: u32,

    // -- control and relationships -------------------------------------------
    pub(crate) commands: Command,
    pub(crate) target_ship: Option<ShipId>,
    pub(crate) ship_to_assist: Option<ShipId>,
    pub(crate) target_planet: Option<ObjectRef>,
    pub(crate) target_system: Option<String>,
    pub(crate) destination: Option<String>,
    pub(crate) parent: Option<ShipId>,
    pub(crate) escorts: Vec<ShipId>,
}

impl Default for Ship {
    fn default() -> Self {
        Self {
            model_name: String::new(),
            name: String::new(),
            category: String::new(),
            description: String::new(),
            government: None,
            personality: Personality::default(),
            is_special: false,
            base_attributes: Attributes::new(),
            attributes: Attributes::new(),
            outfits: BTreeMap::new(),
            armament: Armament::new(),
            cargo: CargoHold::default(),
            engines: Vec::new(),
            fighter_bays: Vec::new(),
            drone_bays: Vec::new(),
            explode: BTreeMap::new(),
            explosion_weapon: None,
            extent: Extent::default(),
            heat_dissipation: DEFAULT_HEAT_RETENTION,
            position: Point::ZERO,
            velocity: Point::ZERO,
            angle: Angle::default(),
            zoom: 1.0,
            cloak: 0.0,
            system: None,
            landing_planet: None,
            hyperspace_system: None,
            hyperspace_count: 0,
            hyperspace_offset: Point::ZERO,
            hull: 0.0,
            shields: 0.0,
            energy: 0.0,
            fuel: 0.0,
            heat: 0.0,
            crew: 0,
            disabled: false,
            is_overheated: false,
            is_boarding: false,
            has_boarded: false,
            forget: 0,
            pilot_error: 0,
            pilot_okay: 0,
            explosion_rate: 0,
            explosion_count: 0,
            explosion_total: 0,
            commands: Command::default(),
            target_ship: None,
            ship_to_assist: None,
            target_planet: None,
            target_system: None,
            destination: None,
            parent: None,
            escorts: Vec::new(),
        }
    }
}

impl Ship {
    // -- construction ---------------------------------------------------------

    /// Build a fully repaired, fully crewed ship from a hull template.
    ///
    /// Outfits the template names but the catalog does not know are kept in
    /// the equipment list and contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns [`ShipError::TooManyHardpoints`] if the hull has more
    /// hardpoints than [`Command::MAX_HARDPOINTS`].
    pub fn from_model(model: &ShipModel, catalog: &Catalog) -> Result<Ship, ShipError> {
        check_hardpoints(&model.model_name, model.hardpoints.len())?;
        let mut ship = Ship {
            model_name: model.model_name.clone(),
            name: model.name.clone(),
            category: model.category.clone(),
            description: model.description.clone(),
            base_attributes: model.attributes.clone(),
            outfits: model.outfits.clone(),
            engines: model.engines.clone(),
            fighter_bays: model.fighter_bays.iter().map(|&offset| Bay::new(offset)).collect(),
            drone_bays: model.drone_bays.iter().map(|&offset| Bay::new(offset)).collect(),
            explode: model.explode.clone(),
            explosion_weapon: model.explosion.clone(),
            extent: model.extent,
            ..Ship::default()
        };
        for hardpoint in &model.hardpoints {
            ship.armament.add_hardpoint(hardpoint.kind, hardpoint.offset);
        }
        ship.bind_hardpoints(&model.hardpoints, catalog);
        ship.finish_loading(catalog);
        Ok(ship)
    }

    /// Look up `model_name` in the catalog and build a ship from it.
    ///
    /// # Errors
    ///
    /// Returns [`ShipError::UnknownModel`] if the catalog has no such model,
    /// or any error of [`from_model`](Self::from_model).
    pub fn from_catalog(catalog: &Catalog, model_name: &str) -> Result<Ship, ShipError> {
        let model = catalog
            .ship(model_name)
            .ok_or_else(|| ShipError::UnknownModel(model_name.to_owned()))?;
        Ship::from_model(model, catalog)
    }

    /// Bind the weapons a layout names to their specific hardpoints.
    pub(crate) fn bind_hardpoints(&mut self, layout: &[HardpointSpec], catalog: &Catalog) {
        for (index, hardpoint) in layout.iter().enumerate() {
            let Some(name) = hardpoint.outfit.as_deref() else {
                continue;
            };
            match catalog.weapon(name) {
                Some(weapon) => {
                    if !self.armament.bind(index, name, weapon) {
                        warn!(ship = %self.name, weapon = name, index, "weapon does not fit its hardpoint");
                    }
                }
                None => warn!(ship = %self.name, weapon = name, "hardpoint names an unknown weapon"),
            }
        }
    }

    /// Rebuild every derived value from the base stats and the equipment list,
    /// then top the ship up if it has never been repaired.
    pub fn finish_loading(&mut self, catalog: &Catalog) {
        self.attributes = self.base_attributes.clone();
        for (name, &count) in &self.outfits {
            match catalog.outfit(name) {
                Some(outfit) => {
                    self.attributes.add_scaled(&outfit.attributes, count);
                    if let Some(weapon) = &outfit.weapon {
                        let bound = self.armament.count(name) as i32;
                        if count > bound {
                            self.armament.install(name, weapon, (count - bound) as u32);
                        } else if count < bound {
                            self.armament.uninstall(name, (bound - count) as u32);
                        }
                    }
                }
                None => warn!(ship = %self.name, outfit = %name, "unknown outfit contributes nothing"),
            }
        }
        self.cargo.set_size(self.attributes.get(StatKey::CargoSpace));
        self.heat_dissipation = heat_retention(self.attributes.get(StatKey::HeatDissipation));
        self.explosion_total = self.explode.values().sum();

        if self.hull == 0.0 && !self.is_destroyed() {
            self.recharge(true);
        }
        if self.personality.derelict {
            self.make_derelict();
        }
    }

    fn make_derelict(&mut self) {
        self.shields = 0.0;
        self.energy = 0.0;
        self.fuel = 0.0;
        self.crew = 0;
        self.hull = self.minimum_hull() * DERELICT_HULL_FRACTION;
        self.disabled = true;
    }

    // -- loadout ------------------------------------------------------------

    /// Install (`count > 0`) or remove (`count < 0`) outfits, keeping the
    /// aggregate stats, weapon bindings and cargo size in step with the list.
    /// Counts never go below zero.
    pub fn add_outfit(&mut self, name: &str, count: i32, catalog: &Catalog) {
        let current = self.outfit_count(name);
        let updated = (current + count).max(0);
        let delta = updated - current;
        if delta == 0 {
            return;
        }
        if updated == 0 {
            self.outfits.remove(name);
        } else {
            self.outfits.insert(name.to_owned(), updated);
        }

        let Some(outfit) = catalog.outfit(name) else {
            warn!(ship = %self.name, outfit = name, "unknown outfit contributes nothing");
            return;
        };
        self.attributes.add_scaled(&outfit.attributes, delta);
        if let Some(weapon) = &outfit.weapon {
            if delta > 0 {
                self.armament.install(name, weapon, delta as u32);
            } else {
                self.armament.uninstall(name, (-delta) as u32);
            }
        }
        if outfit.get(StatKey::CargoSpace) != 0.0 {
            self.cargo.set_size(self.attributes.get(StatKey::CargoSpace));
        }
        if outfit.get(StatKey::HeatDissipation) != 0.0 {
            self.heat_dissipation = heat_retention(self.attributes.get(StatKey::HeatDissipation));
        }
        debug!(ship = %self.name, outfit = name, delta, "loadout changed");
    }

    /// Installed count of `name`.
    pub fn outfit_count(&self, name: &str) -> i32 {
        self.outfits.get(name).copied().unwrap_or(0)
    }

    /// Installed outfits with counts.
    pub fn outfits(&self) -> &BTreeMap<String, i32> {
        &self.outfits
    }

    /// Aggregate stats: base stats plus every installed outfit.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Bare-hull stats.
    pub fn base_attributes(&self) -> &Attributes {
        &self.base_attributes
    }

    /// Hardpoints and their weapons.
    pub fn armament(&self) -> &Armament {
        &self.armament
    }

    /// Bind a catalog weapon to a specific hardpoint, outside the normal
    /// first-free-slot order. The weapon must already be installed.
    pub fn bind_weapon(&mut self, index: usize, name: &str, catalog: &Catalog) -> bool {
        let Some(weapon) = catalog.weapon(name) else {
            return false;
        };
        if self.armament.count(name) as i32 >= self.outfit_count(name) {
            return false;
        }
        self.armament.bind(index, name, weapon)
    }

    /// Cargo hold.
    pub fn cargo(&self) -> &CargoHold {
        &self.cargo
    }

    /// Cargo hold, mutably.
    pub fn cargo_mut(&mut self) -> &mut CargoHold {
        &mut self.cargo
    }

    /// Engine flare points. Empty unless the ship is thrusting forward under
    /// its own control.
    pub fn engine_points(&self) -> &[Point] {
        if self.commands.thrust() <= 0.0 || self.disabled {
            return &[];
        }
        &self.engines
    }

    /// Licenses needed to operate this hull under `government`.
    pub fn licenses<'c>(&self, catalog: &'c Catalog) -> &'c [String] {
        catalog
            .ship(&self.model_name)
            .map(|model| model.licenses_for(self.government.as_deref()))
            .unwrap_or(&[])
    }

    // -- identity -------------------------------------------------------------

    /// Hull template name.
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// This ship's own name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the ship.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Hull category.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Flavor text.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Owning government.
    pub fn government(&self) -> Option<&str> {
        self.government.as_deref()
    }

    /// Change the owning government.
    pub fn set_government(&mut self, government: Option<String>) {
        self.government = government;
    }

    /// Behavior flags.
    pub fn personality(&self) -> Personality {
        self.personality
    }

    /// Change behavior flags. Turning a ship derelict strips it on the spot.
    pub fn set_personality(&mut self, personality: Personality) {
        self.personality = personality;
        if personality.derelict {
            self.make_derelict();
        }
    }

    /// Whether the ship persists through landing and long absences.
    pub fn is_special(&self) -> bool {
        self.is_special
    }

    /// Mark the ship as special (persistent) or ordinary.
    pub fn set_is_special(&mut self, is_special: bool) {
        self.is_special = is_special;
    }

    /// Whether this hull is a carried craft (fighter or drone).
    pub fn is_fighter(&self) -> bool {
        BayKind::for_category(&self.category).is_some()
    }

    // -- placement ------------------------------------------------------------

    /// Put the ship at a point in space. A landed ship is lifted off its
    /// planet instead and takes off over the following ticks.
    pub fn place(&mut self, position: Point, velocity: Point, angle: Angle) {
        self.position = position;
        self.velocity = velocity;
        self.angle = angle;
        if self.landing_planet.is_some() {
            self.landing_planet = None;
        } else {
            self.zoom = 1.0;
        }
        self.forget = 0;
    }

    /// Current system, `None` while docked.
    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// Move to a system without any transition.
    pub fn set_system(&mut self, system: Option<String>) {
        self.system = system;
    }

    /// Set the ship down on a planet (or lift it from one, with `None`).
    /// Either way the ship starts at zero zoom and has no destination.
    pub fn set_planet(&mut self, planet: Option<String>) {
        self.zoom = 0.0;
        self.landing_planet = planet;
        self.destination = None;
    }

    /// The planet the ship is landing on or has landed on.
    pub fn landing_planet(&self) -> Option<&str> {
        self.landing_planet.as_deref()
    }

    /// The planet the ship is sitting on, if fully landed.
    pub fn planet(&self) -> Option<&str> {
        if self.zoom == 0.0 {
            self.landing_planet.as_deref()
        } else {
            None
        }
    }

    /// Position.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Velocity.
    pub fn velocity(&self) -> Point {
        self.velocity
    }

    /// Facing.
    pub fn facing(&self) -> Angle {
        self.angle
    }

    /// Facing unit vector scaled by half the zoom.
    pub fn unit(&self) -> Point {
        self.angle.unit() * (self.zoom * 0.5)
    }

    /// Landing/takeoff scale: 1 in flight, 0 on the ground.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Cloak level in `[0, 1]`.
    pub fn cloaking(&self) -> f64 {
        self.cloak
    }

    /// Hyperspace progress counter.
    pub fn hyperspace_count(&self) -> i32 {
        self.hyperspace_count
    }

    /// System the ship is currently jumping to.
    pub fn hyperspace_system(&self) -> Option<&str> {
        self.hyperspace_system.as_deref()
    }

    /// Formation offset from the parent, preserved across jumps.
    pub fn hyperspace_offset(&self) -> Point {
        self.hyperspace_offset
    }

    /// Whether the ship is committed to a landing.
    pub fn is_landing(&self) -> bool {
        self.landing_planet.is_some()
    }

    /// Whether the ship is committed to a jump.
    pub fn is_hyperspacing(&self) -> bool {
        self.hyperspace_system.is_some()
    }

    /// Whether other ships may select this one as a target.
    pub fn is_targetable(&self) -> bool {
        self.zoom == 1.0 && self.explosion_rate == 0 && self.forget == 0 && self.cloak < 1.0
    }

    /// Ticks since the ship was last in the active system.
    pub fn forget_count(&self) -> u32 {
        self.forget
    }

    // -- pools ----------------------------------------------------------------

    /// Absolute hull points.
    pub fn hull_points(&self) -> f64 {
        self.hull
    }

    /// Absolute shield points.
    pub fn shield_points(&self) -> f64 {
        self.shields
    }

    /// Absolute energy.
    pub fn energy_level(&self) -> f64 {
        self.energy
    }

    /// Absolute fuel.
    pub fn fuel_level(&self) -> f64 {
        self.fuel
    }

    /// Absolute heat.
    pub fn heat_level(&self) -> f64 {
        self.heat
    }

    /// Shield fraction. A ship without shield capacity reads 0.
    pub fn shields(&self) -> f64 {
        fraction(self.shields, self.attributes.get(StatKey::Shields), 0.0)
    }

    /// Hull fraction. A ship without hull capacity reads 1.
    pub fn hull(&self) -> f64 {
        fraction(self.hull, self.attributes.get(StatKey::Hull), 1.0)
    }

    /// Fuel fraction. A ship without fuel capacity reads 0.
    pub fn fuel(&self) -> f64 {
        fraction(self.fuel, self.attributes.get(StatKey::FuelCapacity), 0.0)
    }

    /// Energy fraction. A ship without batteries reads 1 while intact.
    pub fn energy(&self) -> f64 {
        let empty = if self.hull > 0.0 { 1.0 } else { 0.0 };
        fraction(self.energy, self.attributes.get(StatKey::EnergyCapacity), empty)
    }

    /// Heat fraction of the overheating threshold.
    pub fn heat(&self) -> f64 {
        fraction(self.heat, self.mass() * OVERHEAT_PER_MASS, 1.0)
    }

    /// Crew aboard.
    pub fn crew(&self) -> i32 {
        self.crew
    }

    /// Add (or, with a negative count, remove) crew.
    pub fn add_crew(&mut self, count: i32) {
        self.crew += count;
    }

    /// Crew needed to fly without pilot errors. Drones need none; every other
    /// hull needs at least one.
    pub fn required_crew(&self) -> i32 {
        let floor = if self.category == DRONE_CATEGORY { 0 } else { 1 };
        floor.max(self.attributes.get(StatKey::RequiredCrew) as i32)
    }

    /// Whole jumps the current fuel allows.
    pub fn jumps_remaining(&self) -> i32 {
        let jump_fuel = self.attributes.get(StatKey::JumpFuel);
        if jump_fuel <= 0.0 {
            return 0;
        }
        (self.fuel / jump_fuel) as i32
    }

    /// Whether this ship can give `other` one jump's worth of fuel and still
    /// make one jump itself.
    pub fn can_refuel(&self, other: &Ship) -> bool {
        let needed = other.attributes.get(StatKey::JumpFuel);
        self.fuel - needed >= self.attributes.get(StatKey::JumpFuel)
    }

    /// Move fuel to `to` (or, with no recipient, dump or scoop it). A negative
    /// amount takes fuel in. Neither tank leaves `[0, capacity]`; the amount
    /// actually moved is returned.
    pub fn transfer_fuel(&mut self, amount: f64, to: Option<&mut Ship>) -> f64 {
        let capacity = self.attributes.get(StatKey::FuelCapacity);
        let mut amount = amount.max(self.fuel - capacity).min(self.fuel);
        if let Some(to) = to {
            let room = to.attributes.get(StatKey::FuelCapacity) - to.fuel;
            amount = amount.min(room);
            to.fuel += amount;
        }
        self.fuel -= amount;
        amount
    }

    /// Repair and refill, as after landing. At a spaceport fuel and crew are
    /// topped up as well. Derelicts stay damaged.
    pub fn recharge(&mut self, at_spaceport: bool) {
        if self.is_destroyed() {
            return;
        }
        if at_spaceport {
            self.crew = self.crew.max(self.required_crew());
            self.fuel = self.attributes.get(StatKey::FuelCapacity);
        }
        self.pilot_error = 0;
        self.pilot_okay = 0;

        if !self.personality.derelict {
            self.shields = self.attributes.get(StatKey::Shields);
            self.hull = self.attributes.get(StatKey::Hull);
            self.energy = self.attributes.get(StatKey::EnergyCapacity);
        }
        let net_heat = (self.attributes.get(StatKey::HeatGeneration)
            - self.attributes.get(StatKey::Cooling))
        .max(0.0);
        self.heat = net_heat / (1.0 - self.heat_dissipation);
    }

    /// Hull level below which the ship is disabled.
    pub fn minimum_hull(&self) -> f64 {
        let maximum = self.attributes.get(StatKey::Hull);
        (0.2 * maximum).max((0.5 * maximum).min(400.0))
    }

    /// Whether damage or lack of crew has disabled the ship right now.
    pub fn is_disabled(&self) -> bool {
        self.hull < self.minimum_hull() || (self.crew == 0 && self.required_crew() != 0)
    }

    /// Whether the ship was disabled or overheated as of the last tick.
    pub fn is_inoperable(&self) -> bool {
        self.disabled
    }

    /// Whether the ship is overheated.
    pub fn is_overheated(&self) -> bool {
        self.is_overheated
    }

    /// Whether the hull has been breached.
    pub fn is_destroyed(&self) -> bool {
        self.hull < 0.0
    }

    /// Breach the hull.
    pub fn destroy(&mut self) {
        self.hull = -1.0;
    }

    /// Whether the ship is unable to take any voluntary action.
    pub fn cannot_act(&self) -> bool {
        self.zoom != 1.0
            || self.disabled
            || self.hyperspace_count != 0
            || self.pilot_error != 0
            || self.cloak != 0.0
    }

    /// Total mass: hull and outfits, cargo, and every carried craft.
    pub fn mass(&self) -> f64 {
        let carried: f64 = self.carried_ships().map(Ship::mass).sum();
        carried + self.cargo.used() + self.attributes.get(StatKey::Mass)
    }

    /// Degrees per tick at full turn.
    pub fn turn_rate(&self) -> f64 {
        per_mass(self.attributes.get(StatKey::Turn), self.mass())
    }

    /// Speed gained per tick at full thrust.
    pub fn acceleration(&self) -> f64 {
        per_mass(self.attributes.get(StatKey::Thrust), self.mass())
    }

    /// Terminal speed under full thrust. Unbounded without drag.
    pub fn max_velocity(&self) -> f64 {
        let drag = self.attributes.get(StatKey::Drag);
        if drag <= 0.0 {
            return f64::INFINITY;
        }
        self.attributes.get(StatKey::Thrust) / drag
    }

    // -- control and relationships ------------------------------------------------

    /// Control input for the coming tick.
    pub fn commands(&self) -> Command {
        self.commands
    }

    /// Replace the control input.
    pub fn set_commands(&mut self, commands: Command) {
        self.commands = commands;
    }

    /// Whether the last tick ended with boarding complete, awaiting resolution.
    pub fn has_boarded(&self) -> bool {
        self.has_boarded
    }

    /// Whether the ship is closing in to board.
    pub fn is_boarding(&self) -> bool {
        self.is_boarding
    }

    /// Target ship handle.
    pub fn target_ship(&self) -> Option<ShipId> {
        self.target_ship
    }

    /// Select a target ship.
    pub fn set_target_ship(&mut self, target: Option<ShipId>) {
        self.target_ship = target;
    }

    /// Ship this one is trying to help.
    pub fn ship_to_assist(&self) -> Option<ShipId> {
        self.ship_to_assist
    }

    /// Choose a ship to help.
    pub fn set_ship_to_assist(&mut self, ship: Option<ShipId>) {
        self.ship_to_assist = ship;
    }

    /// Target stellar object.
    pub fn target_planet(&self) -> Option<&ObjectRef> {
        self.target_planet.as_ref()
    }

    /// Select a stellar object to land on.
    pub fn set_target_planet(&mut self, object: Option<ObjectRef>) {
        self.target_planet = object;
    }

    /// Target system for the next jump.
    pub fn target_system(&self) -> Option<&str> {
        self.target_system.as_deref()
    }

    /// Select a system to jump to.
    pub fn set_target_system(&mut self, system: Option<String>) {
        self.target_system = system;
    }

    /// Planet to arrive next to after the next jump.
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    /// Choose a planet to arrive next to after the next jump.
    pub fn set_destination(&mut self, planet: Option<String>) {
        self.destination = planet;
    }

    /// Ship this one follows.
    pub fn parent(&self) -> Option<ShipId> {
        self.parent
    }

    /// Follow `parent`, dropping any targets.
    pub fn set_parent(&mut self, parent: Option<ShipId>) {
        self.parent = parent;
        self.target_ship = None;
        self.target_planet = None;
        self.target_system = None;
    }

    /// Handles of ships following this one. Handles of removed ships stay
    /// until pruned; they simply stop resolving.
    pub fn escorts(&self) -> &[ShipId] {
        &self.escorts
    }

    /// Register a follower.
    pub fn add_escort(&mut self, escort: ShipId) {
        if !self.escorts.contains(&escort) {
            self.escorts.push(escort);
        }
    }

    /// Unregister a follower.
    pub fn remove_escort(&mut self, escort: ShipId) {
        self.escorts.retain(|&id| id != escort);
    }

    /// Drop escort handles that `is_present` rejects.
    pub fn prune_escorts(&mut self, is_present: impl Fn(ShipId) -> bool) {
        self.escorts.retain(|&id| is_present(id));
    }

    /// Whether the driver may discard this ship: landed for good, or finished
    /// exploding.
    pub fn should_delete(&self) -> bool {
        (self.zoom == 0.0 && !self.is_special)
            || (self.is_destroyed() && self.explosion_count >= self.explosion_total)
    }
}

/// Per-tick heat retention for a heat dissipation stat.
/// Every hardpoint needs its own fire bit in [`Command`].
pub(crate) fn check_hardpoints(model: &str, count: usize) -> Result<(), ShipError> {
    if count > Command::MAX_HARDPOINTS {
        return Err(ShipError::TooManyHardpoints {
            model: model.to_owned(),
            count,
        });
    }
    Ok(())
}

fn heat_retention(dissipation: f64) -> f64 {
    if dissipation == 0.0 {
        DEFAULT_HEAT_RETENTION
    } else {
        1.0 - HEAT_DISSIPATION_SCALE * dissipation
    }
}

fn fraction(value: f64, maximum: f64, when_unbounded: f64) -> f64 {
    if maximum == 0.0 {
        when_unbounded
    } else {
        (value / maximum).min(1.0)
    }
}

fn per_mass(value: f64, mass: f64) -> f64 {
    if mass <= 0.0 {
        0.0
    } else {
        value / mass
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
