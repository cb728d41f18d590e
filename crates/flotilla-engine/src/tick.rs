//! Fixed-timestep driver for the ship simulation.
//!
//! The [`Simulation`] advances every ship once per [`step`](Simulation::step):
//!
//! 1. **Commands.** Every ship's control input is cleared, then the pending
//!    [`CommandFrame`] is applied.
//! 2. **Move.** Each ship runs its tick against snapshots of its parent and
//!    target taken before anyone moved. Ships that ask to be removed are
//!    removed; a destroyed carrier releases the craft it was holding.
//! 3. **Fire.** Ships in the active system fire their weapons.
//! 4. **Launch.** Carriers under a deploy command release craft, which join
//!    the world as the carrier's escorts.
//! 5. **Dock.** Carried craft that finished boarding their parent are
//!    stowed; other ships that finished boarding are reported.
//! 6. **Scan.** Scans of each ship's target are reported.
//!
//! Ships are visited in registry slot order and all randomness comes from
//! one PRNG seeded by [`SimConfig::seed`], so a run is fully determined by
//! its starting state and its command frames.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_pcg::Pcg64;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use flotilla_ship::prelude::*;

use crate::report::TickReport;
use crate::EngineError;

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Configuration for the simulation driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Fixed time step in seconds per tick. Must be positive and finite.
    pub fixed_dt: f64,
    /// Seed for the simulation PRNG.
    pub seed: u64,
    /// Headless mode: visual effects are not collected.
    pub headless: bool,
}

impl Default for SimConfig {
    /// Defaults to 60 Hz (1/60 second per tick), seed 0, headless off.
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            seed: 0,
            headless: false,
        }
    }
}

// ---------------------------------------------------------------------------
// TickDiagnostics
// ---------------------------------------------------------------------------

/// Timing diagnostics for the last tick.
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Wall-clock time per stage, in order of execution.
    pub stage_times: Vec<(&'static str, Duration)>,
    /// Total time for the tick.
    pub total_time: Duration,
}

// ---------------------------------------------------------------------------
// CommandFrame
// ---------------------------------------------------------------------------

/// Control input for one tick, keyed by ship.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandFrame {
    /// Commands in the order they were set. A ship appears at most once.
    pub commands: Vec<(ShipId, Command)>,
}

impl CommandFrame {
    /// An empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the command for `id`, replacing any earlier one.
    pub fn set(&mut self, id: ShipId, command: Command) {
        match self.commands.iter_mut().find(|(ship, _)| *ship == id) {
            Some(entry) => entry.1 = command,
            None => self.commands.push((id, command)),
        }
    }

    /// The command set for `id`, if any.
    pub fn get(&self, id: ShipId) -> Option<Command> {
        self.commands
            .iter()
            .find(|(ship, _)| *ship == id)
            .map(|&(_, command)| command)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// The deterministic ship simulation.
///
/// # Determinism Guarantee
///
/// Given the same registry contents, catalog, seed and command frames, the
/// simulation produces identical results. This is guaranteed by:
///
/// - Fixed visiting order (registry slot order) in every stage.
/// - A single seeded PRNG, advanced only inside [`step`](Self::step) and the
///   transfer operations.
/// - `BTreeMap`-ordered content and equipment, so no hash-order iteration.
pub struct Simulation {
    pub(crate) registry: ShipRegistry,
    pub(crate) catalog: Arc<Catalog>,
    pub(crate) active_system: Option<String>,
    pub(crate) rng: Pcg64,
    pub(crate) tick_counter: u64,
    pub(crate) fixed_dt: f64,
    pub(crate) config: SimConfig,
    pub(crate) current_input: CommandFrame,
    last_diagnostics: TickDiagnostics,
}

impl Simulation {
    /// Create an empty simulation over `catalog`.
    ///
    /// # Panics
    ///
    /// Panics if `config.fixed_dt` is not positive and finite.
    pub fn new(catalog: Arc<Catalog>, config: SimConfig) -> Self {
        assert!(
            config.fixed_dt > 0.0 && config.fixed_dt.is_finite(),
            "fixed_dt must be positive and finite, got {}",
            config.fixed_dt
        );
        Self {
            registry: ShipRegistry::new(),
            catalog,
            active_system: None,
            rng: Pcg64::seed_from_u64(config.seed),
            tick_counter: 0,
            fixed_dt: config.fixed_dt,
            config,
            current_input: CommandFrame::new(),
            last_diagnostics: TickDiagnostics::default(),
        }
    }

    // -- world setup -----------------------------------------------------------

    /// Build a ship from a catalog model and put it in space.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Ship`] if the catalog has no such model.
    pub fn spawn(
        &mut self,
        model_name: &str,
        system: &str,
        position: Point,
        velocity: Point,
        angle: Angle,
    ) -> Result<ShipId, EngineError> {
        let mut ship = Ship::from_catalog(&self.catalog, model_name)?;
        ship.set_system(Some(system.to_owned()));
        ship.place(position, velocity, angle);
        Ok(self.insert(ship))
    }

    /// Add a ready-made ship.
    pub fn insert(&mut self, ship: Ship) -> ShipId {
        let id = self.registry.insert(ship);
        debug!(%id, "ship added");
        id
    }

    /// Take a ship out of the world.
    pub fn remove(&mut self, id: ShipId) -> Option<Ship> {
        let ship = self.registry.remove(id)?;
        debug!(%id, "ship removed");
        Some(ship)
    }

    /// The system whose ships are "in view": they fire, show effects and are
    /// never forgotten. `None` watches nothing.
    pub fn set_active_system(&mut self, system: Option<String>) {
        self.active_system = system;
    }

    pub fn active_system(&self) -> Option<&str> {
        self.active_system.as_deref()
    }

    // -- commands --------------------------------------------------------------

    /// Queue `command` for `id` on the next tick.
    pub fn set_commands(&mut self, id: ShipId, command: Command) {
        self.current_input.set(id, command);
    }

    /// Replace the whole pending command frame (used for replay).
    pub fn set_input(&mut self, input: CommandFrame) {
        self.current_input = input;
    }

    /// The command frame the next tick will apply.
    pub fn current_input(&self) -> &CommandFrame {
        &self.current_input
    }

    // -- tick ------------------------------------------------------------------

    /// Execute one tick. See the module documentation for the stages.
    pub fn step(&mut self) -> TickReport {
        let tick_start = Instant::now();
        let mut stage_times = Vec::with_capacity(6);
        let mut report = TickReport::new(self.tick_counter);

        let start = Instant::now();
        self.apply_commands();
        stage_times.push(("commands", start.elapsed()));

        let start = Instant::now();
        self.move_ships(&mut report);
        stage_times.push(("move", start.elapsed()));

        let start = Instant::now();
        self.fire_weapons(&mut report);
        stage_times.push(("fire", start.elapsed()));

        let start = Instant::now();
        self.launch_craft(&mut report);
        stage_times.push(("launch", start.elapsed()));

        let start = Instant::now();
        self.collect_boarders(&mut report);
        stage_times.push(("dock", start.elapsed()));

        let start = Instant::now();
        self.scan_targets(&mut report);
        stage_times.push(("scan", start.elapsed()));

        if self.config.headless {
            report.effects.clear();
        }
        self.tick_counter += 1;
        self.last_diagnostics = TickDiagnostics {
            stage_times,
            total_time: tick_start.elapsed(),
        };
        report
    }

    /// Run `count` ticks, discarding the reports.
    pub fn run_ticks(&mut self, count: u64) {
        for _ in 0..count {
            self.step();
        }
    }

    fn apply_commands(&mut self) {
        let frame = std::mem::take(&mut self.current_input);
        for id in self.registry.ids() {
            if let Some(ship) = self.registry.get_mut(id) {
                ship.set_commands(Command::default());
            }
        }
        for (id, command) in frame.commands {
            match self.registry.get_mut(id) {
                Some(ship) => ship.set_commands(command),
                None => trace!(%id, "command for a missing ship dropped"),
            }
        }
    }

    fn is_in_view(&self, ship: &Ship) -> bool {
        self.active_system.is_some() && ship.system() == self.active_system.as_deref()
    }

    fn move_ships(&mut self, report: &mut TickReport) {
        let views: BTreeMap<ShipId, ShipView> =
            self.registry.iter().map(|(id, ship)| (id, ship.view())).collect();
        let mut effects = Vec::new();
        let mut removed = Vec::new();

        for id in self.registry.ids() {
            let in_view = match self.registry.get(id) {
                Some(ship) => self.is_in_view(ship),
                None => continue,
            };
            let Some(ship) = self.registry.get_mut(id) else {
                continue;
            };
            let ctx = TickContext {
                catalog: &self.catalog,
                in_view,
                parent: ship.parent().and_then(|parent| views.get(&parent)),
                target: ship.target_ship().and_then(|target| views.get(&target)),
            };
            match ship.step(&ctx, &mut self.rng, &mut effects) {
                TickOutcome::Continue => {}
                TickOutcome::Jumped => report.record(id, None, ShipEvents::JUMP),
                TickOutcome::Remove => removed.push(id),
            }
        }
        report.effects.append(&mut effects);

        if removed.is_empty() {
            return;
        }
        for id in removed {
            self.remove_from_world(id, report);
        }
        let present: BTreeSet<ShipId> = self.registry.ids().into_iter().collect();
        for id in &present {
            if let Some(ship) = self.registry.get_mut(*id) {
                ship.prune_escorts(|escort| present.contains(&escort));
            }
        }
    }

    /// Remove a ship its own tick gave up on. A destroyed carrier's craft
    /// survive it and are set loose where it was; any other carrier takes
    /// its craft along.
    fn remove_from_world(&mut self, id: ShipId, report: &mut TickReport) {
        let Some(mut ship) = self.registry.remove(id) else {
            return;
        };
        report.removed.push(id);
        if !ship.is_destroyed() || !ship.has_bays() {
            debug!(%id, ship = ship.name(), "ship left the world");
            return;
        }
        let (position, velocity, angle) = (ship.position(), ship.velocity(), ship.facing());
        let released = ship.unload_fighters();
        debug!(%id, ship = ship.name(), released = released.len(), "carrier lost");
        for mut craft in released {
            craft.place(position, velocity, angle);
            craft.set_parent(None);
            let craft_id = self.registry.insert(craft);
            report.launched.push(craft_id);
        }
    }

    fn fire_weapons(&mut self, report: &mut TickReport) {
        for id in self.registry.ids() {
            let in_view = self.registry.get(id).is_some_and(|ship| self.is_in_view(ship));
            if !in_view {
                continue;
            }
            let Some(ship) = self.registry.get_mut(id) else {
                continue;
            };
            if ship.fire(&self.catalog, &mut report.projectiles) {
                report.anti_missile_ready.push(id);
            }
        }
    }

    fn launch_craft(&mut self, report: &mut TickReport) {
        for id in self.registry.ids() {
            let Some(carrier) = self.registry.get_mut(id) else {
                continue;
            };
            if !carrier.has_bays() {
                continue;
            }
            let launched = carrier.launch(id, &mut self.rng);
            for craft in launched {
                let craft_id = self.registry.insert(craft);
                if let Some(carrier) = self.registry.get_mut(id) {
                    carrier.add_escort(craft_id);
                }
                report.launched.push(craft_id);
            }
        }
    }

    /// Stow carried craft that reached their parent; report everyone else
    /// who finished boarding.
    fn collect_boarders(&mut self, report: &mut TickReport) {
        let boarders: Vec<ShipId> = self
            .registry
            .iter()
            .filter(|(_, ship)| ship.has_boarded())
            .map(|(id, _)| id)
            .collect();
        for id in boarders {
            let Some(ship) = self.registry.get(id) else {
                continue;
            };
            if !ship.is_fighter() {
                report.boarded.push(id);
                continue;
            }
            if self.dock_with_parent(id) {
                report.docked.push(id);
            }
        }
    }

    fn scan_targets(&mut self, report: &mut TickReport) {
        for (id, ship) in self.registry.iter() {
            if !ship.commands().has(Command::SCAN) {
                continue;
            }
            let target_id = ship.target_ship();
            let view = self.registry.resolve(target_id).map(Ship::view);
            report.record(id, target_id, ship.scan(view.as_ref()));
        }
    }

    // -- accessors -------------------------------------------------------------

    /// Number of ticks executed so far.
    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    /// Simulated time in seconds, computed as `tick_count * fixed_dt` to
    /// avoid drift from repeated addition.
    pub fn sim_time(&self) -> f64 {
        self.tick_counter as f64 * self.fixed_dt
    }

    /// The fixed time step in seconds per tick.
    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    /// Whether headless mode is enabled.
    pub fn is_headless(&self) -> bool {
        self.config.headless
    }

    /// The static content.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Every ship in the world.
    pub fn registry(&self) -> &ShipRegistry {
        &self.registry
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.registry.get(id)
    }

    /// Mutable access to one ship, for setup and tests. Prefer commands
    /// during a run.
    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.registry.get_mut(id)
    }

    /// Number of ships in the world.
    pub fn ship_count(&self) -> usize {
        self.registry.len()
    }

    /// Escorts of `id` that are still in the world.
    pub fn escorts_of(&self, id: ShipId) -> Vec<ShipId> {
        let Some(ship) = self.registry.get(id) else {
            warn!(%id, "escorts requested for a missing ship");
            return Vec::new();
        };
        ship.escorts()
            .iter()
            .copied()
            .filter(|&escort| self.registry.contains(escort))
            .collect()
    }

    /// Diagnostics from the last tick.
    pub fn last_diagnostics(&self) -> &TickDiagnostics {
        &self.last_diagnostics
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Arc<Catalog> {
        let mut catalog = Catalog::new();
        catalog.insert_system(StarSystem::new("Sol", Point::new(0.0, 0.0)));
        catalog.insert_ship(ShipModel::new(
            "Shuttle",
            "Transport",
            Attributes::new()
                .with(StatKey::Mass, 10.0)
                .with(StatKey::Drag, 1.0)
                .with(StatKey::Thrust, 10.0)
                .with(StatKey::Hull, 100.0),
        ));
        Arc::new(catalog)
    }

    // -- 1. Construction --------------------------------------------------------

    #[test]
    fn new_simulation_starts_at_zero() {
        let sim = Simulation::new(catalog(), SimConfig::default());
        assert_eq!(sim.tick_count(), 0);
        assert_eq!(sim.sim_time(), 0.0);
        assert_eq!(sim.ship_count(), 0);
    }

    #[test]
    fn default_config_is_60hz() {
        let config = SimConfig::default();
        assert!((config.fixed_dt - 1.0 / 60.0).abs() < f64::EPSILON);
        assert_eq!(config.seed, 0);
    }

    #[test]
    #[should_panic(expected = "fixed_dt must be positive")]
    fn zero_dt_panics() {
        let _sim = Simulation::new(
            catalog(),
            SimConfig {
                fixed_dt: 0.0,
                ..Default::default()
            },
        );
    }

    #[test]
    fn config_reads_from_partial_json() {
        let config: SimConfig = serde_json::from_str(r#"{"seed": 7}"#).unwrap();
        assert_eq!(config.seed, 7);
        assert!(!config.headless);
    }

    // -- 2. Command frames -----------------------------------------------------

    #[test]
    fn frame_keeps_one_command_per_ship() {
        let mut frame = CommandFrame::new();
        let id = ShipId::new(3, 0);
        frame.set(id, Command::new().with_thrust(1.0));
        frame.set(id, Command::new().with_turn(-1.0));
        assert_eq!(frame.commands.len(), 1);
        assert_eq!(frame.get(id), Some(Command::new().with_turn(-1.0)));
    }

    #[test]
    fn commands_last_one_tick() {
        let mut sim = Simulation::new(catalog(), SimConfig::default());
        sim.set_active_system(Some("Sol".into()));
        let id = sim
            .spawn("Shuttle", "Sol", Point::ZERO, Point::ZERO, Angle::default())
            .unwrap();

        sim.set_commands(id, Command::new().with_thrust(1.0));
        sim.step();
        assert_eq!(sim.ship(id).unwrap().commands().thrust(), 1.0);
        assert!(sim.current_input().is_empty());

        sim.step();
        assert_eq!(sim.ship(id).unwrap().commands(), Command::default());
    }

    // -- 3. Diagnostics --------------------------------------------------------

    #[test]
    fn diagnostics_cover_every_stage() {
        let mut sim = Simulation::new(catalog(), SimConfig::default());
        sim.step();
        let stages: Vec<&str> = sim
            .last_diagnostics()
            .stage_times
            .iter()
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(stages, ["commands", "move", "fire", "launch", "dock", "scan"]);
    }

    #[test]
    fn unwatched_ships_are_eventually_forgotten() {
        let mut sim = Simulation::new(catalog(), SimConfig::default());
        let id = sim
            .spawn("Shuttle", "Sol", Point::ZERO, Point::ZERO, Angle::default())
            .unwrap();
        sim.run_ticks(999);
        assert!(sim.ship(id).is_some());
        let report = sim.step();
        assert_eq!(report.removed, vec![id]);
        assert!(sim.ship(id).is_none());
    }
}
