//! Simulation snapshot tests: capture, restore, hashing, branching.
//!
//! The fleet used here exercises every source of state a snapshot has to
//! carry: ships under thrust and turning, a carrier rolling the PRNG to
//! launch craft, and queued commands.

use std::sync::Arc;

use flotilla_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.insert_system(StarSystem::new("Sol", Point::new(0.0, 0.0)));
    catalog.insert_ship(ShipModel::new(
        "Cutter",
        "Light Warship",
        Attributes::new()
            .with(StatKey::Mass, 10.0)
            .with(StatKey::Drag, 1.0)
            .with(StatKey::Thrust, 10.0)
            .with(StatKey::Turn, 40.0)
            .with(StatKey::Hull, 1000.0)
            .with(StatKey::EnergyCapacity, 100.0)
            .with(StatKey::EnergyGeneration, 1.0)
            .with(StatKey::ThrustingEnergy, 1.5)
            .with(StatKey::ThrustingHeat, 2.0),
    ));
    let mut tender = ShipModel::new(
        "Tender",
        "Carrier",
        Attributes::new()
            .with(StatKey::Mass, 200.0)
            .with(StatKey::Hull, 2000.0),
    );
    tender.fighter_bays = vec![Point::new(-10.0, 0.0), Point::new(10.0, 0.0)];
    catalog.insert_ship(tender);
    catalog.insert_ship(ShipModel::new(
        "Wasp",
        FIGHTER_CATEGORY,
        Attributes::new()
            .with(StatKey::Mass, 15.0)
            .with(StatKey::Drag, 1.0)
            .with(StatKey::Thrust, 5.0)
            .with(StatKey::Hull, 100.0),
    ));
    catalog
}

/// A carrier with two docked craft plus three cutters. The carrier is the
/// first handle.
fn fleet() -> (Simulation, Vec<ShipId>) {
    let catalog = catalog();
    let mut tender = Ship::from_catalog(&catalog, "Tender").unwrap();
    tender.set_system(Some("Sol".into()));
    tender.place(Point::ZERO, Point::ZERO, Angle::default());
    for _ in 0..2 {
        let wasp = Ship::from_catalog(&catalog, "Wasp").unwrap();
        assert!(tender.add_fighter(Box::new(wasp)).is_ok());
    }

    let mut sim = Simulation::new(Arc::new(catalog), SimConfig::default());
    sim.set_active_system(Some("Sol".into()));
    let mut ships = vec![sim.insert(tender)];
    for n in 0..3 {
        let position = Point::new(100.0 * f64::from(n), 50.0);
        ships.push(
            sim.spawn("Cutter", "Sol", position, Point::ZERO, Angle::from_degrees(30.0 * f64::from(n)))
                .unwrap(),
        );
    }
    (sim, ships)
}

/// Scripted commands: the carrier deploys, cutters weave.
fn drive(sim: &mut Simulation, ships: &[ShipId], ticks: u64) {
    for _ in 0..ticks {
        let tick = sim.tick_count();
        sim.set_commands(ships[0], Command::new().with(Command::DEPLOY));
        for (n, &id) in ships.iter().enumerate().skip(1) {
            let turn = if (tick + n as u64) % 5 == 0 { 1.0 } else { -0.25 };
            sim.set_commands(id, Command::new().with_thrust(1.0).with_turn(turn));
        }
        sim.step();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

/// Capture at tick 50, run to 100, restore, run to 100 again: same hash.
#[test]
fn snapshot_restore_determinism() {
    let (mut sim, ships) = fleet();
    drive(&mut sim, &ships, 50);
    let snapshot = sim.capture_snapshot();
    assert_eq!(snapshot.tick_counter, 50);

    drive(&mut sim, &ships, 50);
    let hash_a = sim.state_hash();

    sim.restore_from_snapshot(&snapshot)
        .expect("restore should succeed");
    assert_eq!(sim.tick_count(), 50);
    drive(&mut sim, &ships, 50);
    let hash_b = sim.state_hash();

    assert_eq!(hash_a, hash_b, "restored simulation diverged from original run");
}

/// Identical builds agree tick for tick, and the PRNG state is covered by
/// the hash.
#[test]
fn rng_state_is_part_of_the_hash() {
    let (mut a, ships) = fleet();
    let (mut b, _) = fleet();
    drive(&mut a, &ships, 300);
    drive(&mut b, &ships, 300);
    assert_eq!(a.state_hash(), b.state_hash());

    let (base, _) = fleet();
    let mut reseeded = Simulation::new(
        Arc::new(catalog()),
        SimConfig {
            seed: 99,
            ..SimConfig::default()
        },
    );
    let mut snapshot = base.capture_snapshot();
    snapshot.rng = reseeded.capture_snapshot().rng;
    assert!(!snapshot.verify(), "edited snapshot must not verify");
    assert!(reseeded.restore_from_snapshot(&snapshot).is_err());
}

/// Fork, then run each branch with different commands.
#[test]
fn forks_diverge_under_different_commands() {
    let (mut sim, ships) = fleet();
    drive(&mut sim, &ships, 20);
    let fork = sim.fork_snapshot();

    drive(&mut sim, &ships, 20);
    let hash_a = sim.state_hash();

    sim.restore_from_snapshot(&fork).unwrap();
    for _ in 0..20 {
        sim.set_commands(ships[1], Command::new().with_thrust(-1.0));
        sim.step();
    }
    let hash_b = sim.state_hash();

    assert_ne!(hash_a, hash_b);
}

#[test]
fn hash_changes_with_state() {
    let (mut sim, ships) = fleet();
    let before = sim.state_hash();
    assert_eq!(before.len(), 64);
    assert!(before.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

    sim.set_commands(ships[1], Command::new().with_thrust(1.0));
    let queued = sim.state_hash();
    assert_ne!(before, queued, "queued commands are part of the state");

    sim.step();
    assert_ne!(queued, sim.state_hash());
}

#[test]
fn state_hash_matches_snapshot_hash() {
    let (mut sim, ships) = fleet();
    drive(&mut sim, &ships, 10);
    assert_eq!(sim.state_hash(), sim.capture_snapshot().hash);
}

#[test]
fn snapshot_survives_json() {
    let (mut sim, ships) = fleet();
    drive(&mut sim, &ships, 120);
    let snapshot = sim.capture_snapshot();

    let json = snapshot.to_json().unwrap();
    let parsed = SimSnapshot::from_json_str(&json).unwrap();
    assert!(parsed.verify());

    let (mut other, _) = fleet();
    other.restore_from_snapshot(&parsed).unwrap();
    assert_eq!(other.state_hash(), snapshot.hash);

    drive(&mut sim, &ships, 60);
    drive(&mut other, &ships, 60);
    assert_eq!(other.state_hash(), sim.state_hash());
}

#[test]
fn tampered_snapshot_is_rejected_without_side_effects() {
    let (mut sim, ships) = fleet();
    drive(&mut sim, &ships, 5);
    let mut snapshot = sim.capture_snapshot();
    snapshot.tick_counter = 1000;

    drive(&mut sim, &ships, 5);
    let before = sim.state_hash();
    let err = sim.restore_from_snapshot(&snapshot).unwrap_err();

    assert!(err.to_string().contains("hash mismatch"), "unexpected error: {err}");
    assert_eq!(sim.tick_count(), 10);
    assert_eq!(sim.state_hash(), before);
}

#[test]
fn snapshot_with_bad_time_step_is_rejected() {
    let (mut sim, _) = fleet();
    let mut snapshot = sim.capture_snapshot();
    snapshot.fixed_dt = 0.0;

    let err = sim.restore_from_snapshot(&snapshot).unwrap_err();
    assert!(err.to_string().contains("invalid fixed_dt"), "unexpected error: {err}");
}

/// Handles taken before a snapshot resolve again after restoring it, and a
/// ship removed in between comes back.
#[test]
fn restore_brings_back_removed_ships() {
    let (mut sim, ships) = fleet();
    let snapshot = sim.capture_snapshot();

    let removed = sim.remove(ships[2]).unwrap();
    let newcomer = sim.insert(removed);
    assert_ne!(newcomer, ships[2]);
    assert!(sim.ship(ships[2]).is_none());

    sim.restore_from_snapshot(&snapshot).unwrap();
    for &id in &ships {
        assert!(sim.ship(id).is_some(), "{id} should resolve after restore");
    }
    assert_eq!(sim.ship_count(), ships.len());
    assert_eq!(sim.sim_time(), 0.0);
}
