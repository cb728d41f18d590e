//! Tick throughput for fleets of armed ships.
//!
//! Every ship thrusts, turns and fires each tick, so the measurement covers
//! the full move and fire path plus report collection. Hashing and
//! snapshotting are measured separately since replay recording pays for
//! them once per checkpoint.
//!
//! Run with: `cargo bench --bench tick_benchmarks`

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use flotilla_engine::prelude::*;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.insert_system(StarSystem::new("Sol", Point::new(0.0, 0.0)));
    catalog.insert_outfit(Outfit::weapon(
        "Laser",
        Attributes::new().with(StatKey::Mass, 2.0),
        WeaponSpec {
            shield_damage: 10.0,
            hull_damage: 5.0,
            firing_energy: 2.0,
            firing_heat: 3.0,
            reload: 4.0,
            velocity: 20.0,
            lifetime: 30.0,
            ..WeaponSpec::default()
        },
    ));

    let mut cutter = ShipModel::new(
        "Cutter",
        "Light Warship",
        Attributes::new()
            .with(StatKey::Mass, 40.0)
            .with(StatKey::Drag, 0.9)
            .with(StatKey::Thrust, 12.0)
            .with(StatKey::Turn, 120.0)
            .with(StatKey::ThrustingEnergy, 1.0)
            .with(StatKey::ThrustingHeat, 2.0)
            .with(StatKey::TurningEnergy, 0.5)
            .with(StatKey::EnergyCapacity, 400.0)
            .with(StatKey::EnergyGeneration, 6.0)
            .with(StatKey::HeatGeneration, 1.0)
            .with(StatKey::Cooling, 4.0)
            .with(StatKey::Shields, 500.0)
            .with(StatKey::ShieldGeneration, 1.0)
            .with(StatKey::Hull, 800.0)
            .with(StatKey::HullRepairRate, 0.2)
            .with(StatKey::FuelCapacity, 300.0)
            .with(StatKey::RequiredCrew, 4.0),
    );
    cutter.hardpoints = vec![
        HardpointSpec {
            kind: MountKind::Gun,
            offset: Point::new(-6.0, -20.0),
            outfit: Some("Laser".into()),
        },
        HardpointSpec {
            kind: MountKind::Gun,
            offset: Point::new(6.0, -20.0),
            outfit: Some("Laser".into()),
        },
    ];
    cutter.outfits.insert("Laser".into(), 2);
    catalog.insert_ship(cutter);
    catalog
}

fn fleet(count: usize) -> (Simulation, Vec<ShipId>) {
    let mut sim = Simulation::new(
        Arc::new(catalog()),
        SimConfig {
            headless: true,
            ..SimConfig::default()
        },
    );
    sim.set_active_system(Some("Sol".into()));
    let ships = (0..count)
        .map(|i| {
            let position = Point::new((i % 50) as f64 * 80.0, (i / 50) as f64 * 80.0);
            let angle = Angle::from_degrees((i * 37 % 360) as f64);
            sim.spawn("Cutter", "Sol", position, Point::ZERO, angle)
                .expect("Cutter is in the catalog")
        })
        .collect();
    (sim, ships)
}

fn command_fleet(sim: &mut Simulation, ships: &[ShipId]) {
    let tick = sim.tick_count();
    for (i, &id) in ships.iter().enumerate() {
        let turn = if (tick + i as u64) % 40 < 20 { 1.0 } else { -1.0 };
        sim.set_commands(
            id,
            Command::new()
                .with_thrust(1.0)
                .with_turn(turn)
                .with_fire(0)
                .with_fire(1),
        );
    }
}

// ---------------------------------------------------------------------------
// Benchmark 1: one tick, scaling with fleet size
// ---------------------------------------------------------------------------

fn bench_tick_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_scaling");

    for &count in &[10usize, 100, 500, 1000] {
        let (mut sim, ships) = fleet(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &_count| {
            b.iter(|| {
                command_fleet(&mut sim, &ships);
                let report = sim.step();
                black_box(report.projectiles.len());
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark 2: a minute of simulated time for 100 ships
// ---------------------------------------------------------------------------

fn bench_one_minute(c: &mut Criterion) {
    c.bench_function("one_minute_100_ships", |b| {
        b.iter(|| {
            let (mut sim, ships) = fleet(100);
            for _ in 0..3600 {
                command_fleet(&mut sim, &ships);
                black_box(sim.step());
            }
            black_box(sim.tick_count());
        });
    });
}

// ---------------------------------------------------------------------------
// Benchmark 3: state hash and snapshot capture
// ---------------------------------------------------------------------------

fn bench_state_hash(c: &mut Criterion) {
    let mut group = c.benchmark_group("state_hash");

    for &count in &[10usize, 100, 1000] {
        let (mut sim, ships) = fleet(count);
        for _ in 0..60 {
            command_fleet(&mut sim, &ships);
            sim.step();
        }
        group.bench_with_input(BenchmarkId::new("hash", count), &count, |b, &_count| {
            b.iter(|| black_box(sim.state_hash()));
        });
        group.bench_with_input(BenchmarkId::new("snapshot", count), &count, |b, &_count| {
            b.iter(|| black_box(sim.capture_snapshot()));
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Criterion groups and main
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_tick_scaling, bench_one_minute, bench_state_hash);
criterion_main!(benches);
