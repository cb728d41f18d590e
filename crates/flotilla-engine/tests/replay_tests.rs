//! Integration tests for deterministic replay.
//!
//! These tests cover recording, replaying, checkpoint verification,
//! divergence detection, log validation, and JSON serialization of
//! [`ReplayLog`].

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
            .with(StatKey::Turn, 20.0)
            .with(StatKey::Hull, 1000.0)
            .with(StatKey::RequiredCrew, 3.0),
    ));
    catalog
}

fn simulation_over(catalog: Catalog) -> (Simulation, Vec<ShipId>) {
    let mut sim = Simulation::new(Arc::new(catalog), SimConfig::default());
    sim.set_active_system(Some("Sol".into()));
    let ships = (0..3)
        .map(|n| {
            let position = Point::new(60.0 * f64::from(n), 0.0);
            sim.spawn("Cutter", "Sol", position, Point::ZERO, Angle::default())
                .unwrap()
        })
        .collect::<Vec<_>>();
    // Short-handed crews make pilot error draw from the PRNG. The first
    // ship stays fully crewed so it always obeys its commands.
    for &id in &ships[1..] {
        sim.ship_mut(id).unwrap().add_crew(-1);
    }
    (sim, ships)
}

/// Run `ticks` ticks under scripted commands, recording as we go.
fn record(sim: &mut Simulation, ships: &[ShipId], ticks: u64, interval: u64) -> ReplayLog {
    let mut recorder = ReplayRecorder::new(sim.capture_snapshot(), interval);
    for _ in 0..ticks {
        let tick = sim.tick_count();
        for (n, &id) in ships.iter().enumerate() {
            if (tick + n as u64) % 3 == 0 {
                sim.set_commands(id, Command::new().with_thrust(1.0).with_turn(0.5));
            }
        }
        recorder.capture(sim);
        sim.step();
    }
    recorder.finish()
}

fn fresh(catalog: Catalog) -> Simulation {
    Simulation::new(Arc::new(catalog), SimConfig::default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn record_and_replay_reproduces_the_run() {
    let (mut sim, ships) = simulation_over(catalog());
    let log = record(&mut sim, &ships, 100, 10);
    assert_eq!(log.total_ticks, 100);

    let mut other = fresh(catalog());
    let result = replay(&mut other, &log).unwrap();

    assert!(result.completed);
    assert_eq!(result.ticks_replayed, 100);
    assert!(result.first_divergence.is_none());
    assert_eq!(other.tick_count(), 100);
    assert_eq!(other.state_hash(), sim.state_hash());
}

#[test]
fn empty_run_replays_trivially() {
    let (mut sim, ships) = simulation_over(catalog());
    let log = record(&mut sim, &ships, 0, 10);

    let mut other = fresh(catalog());
    let result = replay(&mut other, &log).unwrap();
    assert!(result.completed);
    assert_eq!(result.ticks_replayed, 0);
    assert_eq!(other.tick_count(), 0, "nothing is restored for an empty log");
}

/// An altered command frame must be caught at the first checkpoint after
/// it takes effect.
#[test]
fn replay_detects_divergence_when_inputs_are_altered() {
    let (mut sim, ships) = simulation_over(catalog());
    let mut log = record(&mut sim, &ships, 100, 10);
    for entry in &mut log.entries {
        if let ReplayEntry::Input { tick: 3, input } = entry {
            input.set(ships[0], Command::new().with_turn(-1.0));
        }
    }

    let mut other = fresh(catalog());
    let result = replay(&mut other, &log).unwrap();

    assert!(!result.completed);
    let divergence = result.first_divergence.expect("altered input should diverge");
    assert_eq!(divergence.tick, 10);
    assert_eq!(result.ticks_replayed, 10);
    assert_ne!(divergence.expected_hash, divergence.actual_hash);
}

#[test]
fn checkpoint_interval_respected() {
    let (mut sim, ships) = simulation_over(catalog());
    let log = record(&mut sim, &ships, 35, 10);

    let checkpoints: Vec<u64> = log
        .entries
        .iter()
        .filter_map(|entry| match entry {
            ReplayEntry::Checkpoint { tick, .. } => Some(*tick),
            ReplayEntry::Input { .. } => None,
        })
        .collect();
    assert_eq!(checkpoints, vec![0, 10, 20, 30]);
}

#[test]
fn quiet_ticks_record_no_input() {
    let (mut sim, ships) = simulation_over(catalog());
    let log = record(&mut sim, &ships[..1], 9, 0);

    let inputs: Vec<u64> = log
        .entries
        .iter()
        .filter_map(|entry| match entry {
            ReplayEntry::Input { tick, .. } => Some(*tick),
            ReplayEntry::Checkpoint { .. } => None,
        })
        .collect();
    assert_eq!(inputs, vec![0, 3, 6]);

    let checkpoints = log
        .entries
        .iter()
        .filter(|entry| matches!(entry, ReplayEntry::Checkpoint { .. }))
        .count();
    assert_eq!(checkpoints, 9, "interval 0 keeps every hash");
}

#[test]
fn replay_log_serializable_to_json() {
    let (mut sim, ships) = simulation_over(catalog());
    let mut log = record(&mut sim, &ships, 40, 5);
    log.content_hash = Some(blake3::hash(b"content").to_hex().to_string());

    let json = serde_json::to_string(&log).unwrap();
    let parsed: ReplayLog = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.entries, log.entries);
    assert_eq!(parsed.content_hash, log.content_hash);

    let mut other = fresh(catalog());
    let result = replay(&mut other, &parsed).unwrap();
    assert!(result.completed);
    assert_eq!(other.state_hash(), sim.state_hash());
}

#[test]
fn replay_rejects_duplicate_input_entries() {
    let (mut sim, ships) = simulation_over(catalog());
    let mut log = record(&mut sim, &ships, 5, 10);
    log.entries.push(ReplayEntry::Input {
        tick: 0,
        input: CommandFrame::new(),
    });

    let mut other = fresh(catalog());
    let err = replay(&mut other, &log).unwrap_err();
    assert!(
        err.to_string().contains("duplicate Input entry at tick 0"),
        "unexpected error: {err}"
    );
    assert_eq!(other.ship_count(), 0, "simulation must be untouched");
}

#[test]
fn replay_rejects_duplicate_checkpoint_entries() {
    let (mut sim, ships) = simulation_over(catalog());
    let mut log = record(&mut sim, &ships, 5, 10);
    log.entries.push(ReplayEntry::Checkpoint {
        tick: 0,
        state_hash: "0".repeat(64),
    });

    let mut other = fresh(catalog());
    let err = replay(&mut other, &log).unwrap_err();
    assert!(
        err.to_string().contains("duplicate Checkpoint entry at tick 0"),
        "unexpected error: {err}"
    );
}

#[test]
fn replay_rejects_tick_range_overflow() {
    let (mut sim, _) = simulation_over(catalog());
    sim.run_ticks(10);
    let log = ReplayLog {
        initial_snapshot: sim.capture_snapshot(),
        content_hash: None,
        total_ticks: u64::MAX,
        entries: vec![],
    };

    let mut other = fresh(catalog());
    let err = replay(&mut other, &log).unwrap_err();
    assert!(err.to_string().contains("tick range overflow"), "unexpected error: {err}");
    assert_eq!(other.tick_count(), 0);
}

#[test]
#[should_panic(expected = "not strictly greater than previous tick")]
fn recorder_panics_on_non_monotonic_ticks() {
    let (sim, _) = simulation_over(catalog());
    let mut recorder = ReplayRecorder::new(sim.capture_snapshot(), 10);
    let input = CommandFrame::new();

    recorder.record_tick(5, &input, None);
    recorder.record_tick(3, &input, None);
}

#[test]
#[should_panic(expected = "not strictly greater than previous tick")]
fn recorder_panics_on_duplicate_tick() {
    let (sim, _) = simulation_over(catalog());
    let mut recorder = ReplayRecorder::new(sim.capture_snapshot(), 10);
    let input = CommandFrame::new();

    recorder.record_tick(5, &input, None);
    recorder.record_tick(5, &input, None);
}
