//! Tuning constants of the ship core.

/// Ticks a ship may spend outside the active system before it is forgotten.
pub const FORGET_THRESHOLD: u32 = 1000;

/// Hyperspace counter value at which the jump commits.
pub const HYPERSPACE_THRESHOLD: i32 = 100;

/// Per-tick acceleration of a hyperdrive jump.
pub const HYPERSPACE_ACCELERATION: f64 = 2.0;

/// Padding added to the hyperspace exit distance.
pub const HYPERSPACE_EXIT_MARGIN: f64 = 1000.0;

/// Longest formation offset kept from a parent across a jump.
pub const MAX_FORMATION_OFFSET: f64 = 1000.0;

/// Jump-drive particle count divisor (sprite area per particle per tick of
/// progress).
pub const JUMP_PARTICLE_AREA: f64 = 20000.0;

/// Effect spawned by jump-drive particles.
pub const JUMP_PARTICLE_EFFECT: &str = "skylance impact";

/// Effect spawned at engine points when no afterburner outfit names one.
pub const DEFAULT_AFTERBURNER_EFFECT: &str = "afterburner";

/// Ticks of lost control after a crew-shortage roll fails.
pub const PILOT_ERROR_TICKS: u32 = 30;

/// Ticks of guaranteed control after a crew-shortage roll passes.
pub const PILOT_OKAY_TICKS: u32 = 30;

/// Ticks a ship pauses after plundering a victim.
pub const PLUNDER_PAUSE_TICKS: u32 = 120;

/// A ship must be slower than this to start landing.
pub const LANDING_SPEED_LIMIT: f64 = 1.0;

/// Zoom change per tick while landing or taking off.
pub const LANDING_ZOOM_STEP: f64 = 0.02;

/// Fraction of the distance to the planet covered per landing tick.
pub const LANDING_DRIFT: f64 = 0.03;

/// Fuel gained per tick while parked at a spaceport.
pub const SPACEPORT_REFUEL_RATE: f64 = 1.0;

/// Heat (per unit of mass) above which a ship overheats.
pub const OVERHEAT_PER_MASS: f64 = 100.0;

/// Heat (per unit of mass) below which an overheated ship recovers.
pub const RECOVER_PER_MASS: f64 = 90.0;

/// Heat retained per tick when the ship has no heat dissipation stat.
/// A zero stat means near-total retention, not total retention.
pub const DEFAULT_HEAT_RETENTION: f64 = 0.999;

/// Heat retention lost per point of heat dissipation.
pub const HEAT_DISSIPATION_SCALE: f64 = 0.001;

/// Energy cost of one point of shield regeneration.
pub const SHIELD_EXCHANGE_RATE: f64 = 1.0;

/// Ramscoop fuel gain is this times the square root of the ramscoop stat.
pub const RAMSCOOP_FACTOR: f64 = 0.03;

/// Roll range of the per-tick explosion trial while a ship dies.
pub const EXPLOSION_ROLL: u32 = 1024;

/// A docked fighter launches with probability `1 / FIGHTER_LAUNCH_ODDS` per tick.
pub const FIGHTER_LAUNCH_ODDS: u32 = 60;

/// A docked drone launches with probability `1 / DRONE_LAUNCH_ODDS` per tick.
pub const DRONE_LAUNCH_ODDS: u32 = 40;

/// Boarding may begin inside this distance.
pub const BOARDING_RANGE: f64 = 50.0;

/// Boarding completes inside this distance.
pub const BOARDED_RANGE: f64 = 10.0;

/// Boarding needs a relative speed below this.
pub const BOARDING_SPEED_LIMIT: f64 = 1.0;

/// Fraction of the minimum hull a derelict is left with.
pub const DERELICT_HULL_FRACTION: f64 = 0.5;

/// Provoke is suppressed for a forbearing target while both its shields and
/// hull fractions stay at or above this.
pub const PROVOKE_TOLERANCE: f64 = 0.9;
