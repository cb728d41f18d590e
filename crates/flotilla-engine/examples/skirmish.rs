//! Headless skirmish: a pirate pack runs down a merchant convoy.
//!
//! The convoy is a carrier with two fighters aboard plus a freighter. Each
//! tick the pirates fire everything they carry, the carrier deploys its
//! craft, and every fired projectile is resolved against the closest hostile
//! ship in reach. Missiles get a chance to be shot down first. A pirate
//! whose prey is disabled closes in to board and plunder it.
//!
//! Run with: `RUST_LOG=info cargo run -p flotilla-engine --example skirmish`

use std::sync::Arc;

use flotilla_engine::prelude::*;
use tracing::info;

const CONTENT: &str = r#"{
    "outfits": [
        {"name": "Blaster", "weapon": {"mount": "gun", "shield_damage": 12, "hull_damage": 8,
                                        "firing_energy": 1, "reload": 6, "velocity": 18, "lifetime": 40}},
        {"name": "Torpedo Tube", "weapon": {"mount": "gun", "shield_damage": 30, "hull_damage": 40,
                                             "reload": 90, "velocity": 8, "lifetime": 120,
                                             "missile_strength": 4}},
        {"name": "Flak Turret", "weapon": {"mount": "turret", "anti_missile": 6, "reload": 10,
                                            "velocity": 60, "lifetime": 1}}
    ],
    "ships": [
        {
            "model_name": "Corsair",
            "category": "Light Warship",
            "attributes": {"mass": 60, "drag": 1.2, "thrust": 18, "turn": 150,
                           "energy capacity": 300, "energy generation": 4,
                           "shields": 400, "shield generation": 0.5, "hull": 600,
                           "fuel capacity": 200, "required crew": 4, "bunks": 6,
                           "cargo space": 40},
            "outfits": {"Blaster": 2, "Torpedo Tube": 1},
            "hardpoints": [
                {"kind": "gun", "offset": {"x": -6, "y": -18}, "outfit": "Blaster"},
                {"kind": "gun", "offset": {"x": 6, "y": -18}, "outfit": "Blaster"},
                {"kind": "gun", "offset": {"x": 0, "y": -20}, "outfit": "Torpedo Tube"}
            ]
        },
        {
            "model_name": "Hauler",
            "category": "Heavy Freight",
            "attributes": {"mass": 300, "drag": 3, "thrust": 20, "turn": 40,
                           "shields": 300, "hull": 900, "fuel capacity": 400,
                           "required crew": 5, "bunks": 8, "cargo space": 120},
            "explode": {"Small Blast": 4}
        },
        {
            "model_name": "Shepherd",
            "category": "Carrier",
            "attributes": {"mass": 500, "drag": 4, "thrust": 25, "turn": 30,
                           "energy capacity": 200, "energy generation": 3,
                           "shields": 800, "hull": 1500, "fuel capacity": 500,
                           "required crew": 10, "bunks": 14},
            "outfits": {"Flak Turret": 1},
            "hardpoints": [{"kind": "turret", "offset": {"x": 0, "y": 0}, "outfit": "Flak Turret"}],
            "fighter_bays": [{"x": -20, "y": 10}, {"x": 20, "y": 10}]
        },
        {
            "model_name": "Needle",
            "category": "Fighter",
            "attributes": {"mass": 15, "drag": 0.8, "thrust": 10, "turn": 200,
                           "energy capacity": 50, "energy generation": 1,
                           "shields": 60, "hull": 120, "required crew": 1, "bunks": 1},
            "outfits": {"Blaster": 1},
            "hardpoints": [{"kind": "gun", "offset": {"x": 0, "y": -8}, "outfit": "Blaster"}]
        }
    ],
    "systems": [{"name": "Rigel", "position": {"x": 0, "y": 0}}],
    "governments": [
        {"name": "Merchant"},
        {"name": "Pirate", "enemies": ["Merchant"]}
    ]
}"#;

const TICKS: u64 = 3_600;

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let catalog = Arc::new(Catalog::from_json_str(CONTENT)?);
    let mut sim = Simulation::new(
        catalog.clone(),
        SimConfig {
            seed: 7,
            ..SimConfig::default()
        },
    );
    sim.set_active_system(Some("Rigel".into()));

    // Convoy.
    let mut shepherd = Ship::from_catalog(&catalog, "Shepherd")?;
    shepherd.set_government(Some("Merchant".into()));
    shepherd.set_system(Some("Rigel".into()));
    shepherd.place(Point::new(0.0, 0.0), Point::ZERO, Angle::default());
    for _ in 0..2 {
        let mut needle = Ship::from_catalog(&catalog, "Needle")?;
        needle.set_government(Some("Merchant".into()));
        if shepherd.add_fighter(Box::new(needle)).is_err() {
            anyhow::bail!("Shepherd has no free bay");
        }
    }
    let carrier = sim.insert(shepherd);
    let hauler = sim.spawn("Hauler", "Rigel", Point::new(120.0, 0.0), Point::ZERO, Angle::default())?;
    if let Some(ship) = sim.ship_mut(hauler) {
        ship.set_government(Some("Merchant".into()));
        ship.cargo_mut().add_commodity("Spice", 60);
    }
    let merchants = [carrier, hauler];

    // Raiders, in a line south of the convoy facing north.
    let mut pirates = Vec::new();
    for n in 0..3 {
        let position = Point::new(-100.0 + 100.0 * f64::from(n), 300.0);
        let id = sim.spawn("Corsair", "Rigel", position, Point::ZERO, Angle::default())?;
        if let Some(ship) = sim.ship_mut(id) {
            ship.set_government(Some("Pirate".into()));
            ship.set_target_ship(Some(merchants[n as usize % merchants.len()]));
        }
        pirates.push(id);
    }

    let mut hits = 0usize;
    let mut intercepted = 0usize;
    let mut plundered = 0usize;

    for _ in 0..TICKS {
        sim.set_commands(carrier, Command::new().with(Command::DEPLOY));
        for &pirate in &pirates {
            let Some(target) = sim.ship(pirate).and_then(Ship::target_ship) else {
                continue;
            };
            if let Some(command) = pilot(&sim, pirate, target) {
                sim.set_commands(pirate, command);
            }
        }

        let report = sim.step();

        let mut effects = Vec::new();
        for projectile in &report.projectiles {
            if projectile.weapon.missile_strength > 0.0 && sim.intercept(projectile, &mut effects) {
                intercepted += 1;
                continue;
            }
            let Some(victim) = closest_enemy(&sim, projectile) else {
                continue;
            };
            let events = sim.apply_hit(victim, projectile);
            hits += 1;
            if events.contains(ShipEvents::DISABLE) {
                info!(tick = report.tick, %victim, "ship disabled");
            }
            if events.contains(ShipEvents::DESTROY) {
                info!(tick = report.tick, %victim, "ship destroyed");
            }
        }

        for &id in &report.launched {
            info!(tick = report.tick, %id, "craft launched");
        }
        for &id in &report.boarded {
            match sim.board(id, true)? {
                BoardOutcome::Plundered => {
                    plundered += 1;
                    info!(tick = report.tick, boarder = %id, "prize plundered");
                }
                outcome => info!(tick = report.tick, boarder = %id, ?outcome, "boarding finished"),
            }
        }
        for &id in &report.removed {
            info!(tick = report.tick, %id, "ship left the field");
            for &pirate in &pirates {
                if let Some(ship) = sim.ship_mut(pirate) {
                    if ship.target_ship() == Some(id) {
                        ship.set_target_ship(None);
                    }
                }
            }
        }

        if merchants.iter().all(|&id| sim.ship(id).map_or(true, Ship::is_destroyed)) {
            info!(tick = report.tick, "convoy lost");
            break;
        }
    }

    info!(
        ticks = sim.tick_count(),
        seconds = sim.sim_time(),
        ships = sim.ship_count(),
        hits,
        intercepted,
        plundered,
        state_hash = %sim.state_hash(),
        "skirmish over"
    );
    Ok(())
}

/// Point at the target and open fire; once it is disabled, creep up on it
/// slowly enough to board.
fn pilot(sim: &Simulation, pirate: ShipId, target: ShipId) -> Option<Command> {
    let ship = sim.ship(pirate)?;
    let prey = sim.ship(target)?;
    let offset = prey.position() - ship.position();
    if offset.is_zero() {
        return None;
    }
    let heading = ship.facing().unit();
    let direction = offset.unit();
    let turn = (heading.cross(direction) * 4.0).clamp(-1.0, 1.0);
    let command = Command::new().with_turn(turn);
    if !prey.is_disabled() {
        return Some(command.with_fire(0).with_fire(1).with_fire(2));
    }
    let closing = (ship.velocity() - prey.velocity()).length();
    let thrust = if heading.dot(direction) > 0.95 && closing < 0.8 { 1.0 } else { 0.0 };
    Some(command.with(Command::BOARD).with_thrust(thrust))
}

/// The closest ship hostile to the projectile's government that is within
/// the weapon's range of its launch point.
fn closest_enemy(sim: &Simulation, projectile: &Projectile) -> Option<ShipId> {
    let range = projectile.weapon.range();
    sim.registry()
        .iter()
        .filter(|(_, ship)| ship.system() == sim.active_system() && !ship.is_destroyed())
        .filter(|(_, ship)| {
            sim.catalog()
                .is_enemy(projectile.government.as_deref(), ship.government())
        })
        .map(|(id, ship)| (id, (ship.position() - projectile.position).length()))
        .filter(|&(_, distance)| distance <= range)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}
