//! Deterministic replay of recorded command frames.
//!
//! A [`ReplayRecorder`] collects the [`CommandFrame`] applied on every tick
//! plus periodic state-hash checkpoints into a [`ReplayLog`]. [`replay`]
//! restores the log's initial snapshot, feeds the frames back tick by tick
//! and compares hashes at each checkpoint. A run whose hashes all match
//! reproduced the original bit for bit.
//!
//! # Recording and replaying
//!
//! ```
//! use std::sync::Arc;
//! use flotilla_engine::prelude::*;
//!
//! let mut catalog = Catalog::new();
//! catalog.insert_system(StarSystem::new("Sol", Point::ZERO));
//! catalog.insert_ship(ShipModel::new(
//!     "Shuttle",
//!     "Transport",
//!     Attributes::new()
//!         .with(StatKey::Mass, 10.0)
//!         .with(StatKey::Drag, 1.0)
//!         .with(StatKey::Thrust, 5.0)
//!         .with(StatKey::Turn, 30.0)
//!         .with(StatKey::Hull, 100.0),
//! ));
//! let catalog = Arc::new(catalog);
//!
//! let mut sim = Simulation::new(catalog.clone(), SimConfig::default());
//! sim.set_active_system(Some("Sol".into()));
//! let id = sim
//!     .spawn("Shuttle", "Sol", Point::ZERO, Point::ZERO, Angle::default())
//!     .unwrap();
//!
//! let mut recorder = ReplayRecorder::new(sim.capture_snapshot(), 10);
//! for tick in 0..50u32 {
//!     let turn = if tick % 7 == 0 { 1.0 } else { 0.0 };
//!     sim.set_commands(id, Command::new().with_thrust(1.0).with_turn(turn));
//!     recorder.capture(&sim);
//!     sim.step();
//! }
//! let log = recorder.finish();
//!
//! let mut other = Simulation::new(catalog, SimConfig::default());
//! let result = replay(&mut other, &log).unwrap();
//! assert!(result.completed);
//! assert!(result.first_divergence.is_none());
//! assert_eq!(other.state_hash(), sim.state_hash());
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::snapshot::SimSnapshot;
use crate::tick::{CommandFrame, Simulation};

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// Initial snapshot plus the ordered command frames and checkpoints that
/// followed it. Serializable to JSON for storage or regression fixtures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Replay starts by restoring this snapshot.
    pub initial_snapshot: SimSnapshot,

    /// Optional BLAKE3 hex digest of the content catalog used while
    /// recording. Informational; [`replay`] does not check it.
    pub content_hash: Option<String>,

    /// Number of ticks recorded. Replay executes exactly this many ticks,
    /// however many entries there are.
    pub total_ticks: u64,

    pub entries: Vec<ReplayEntry>,
}

// ---------------------------------------------------------------------------
// ReplayEntry
// ---------------------------------------------------------------------------

/// One entry of a [`ReplayLog`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplayEntry {
    /// Commands applied on `tick`. Ticks with no commands have no entry.
    Input { tick: u64, input: CommandFrame },
    /// State hash taken on `tick`, after its commands were queued and before
    /// it ran.
    Checkpoint { tick: u64, state_hash: String },
}

// ---------------------------------------------------------------------------
// ReplayResult
// ---------------------------------------------------------------------------

/// The outcome of [`replay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    /// Whether every recorded tick was replayed.
    pub completed: bool,
    pub ticks_replayed: u64,
    /// The first checkpoint that did not match. `None` means the run was
    /// reproduced.
    pub first_divergence: Option<ReplayDivergence>,
}

/// A checkpoint whose replayed hash differs from the recorded one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayDivergence {
    pub tick: u64,
    pub expected_hash: String,
    pub actual_hash: String,
}

// ---------------------------------------------------------------------------
// ReplayRecorder
// ---------------------------------------------------------------------------

/// Builds a [`ReplayLog`] one tick at a time.
///
/// Record each tick *before* stepping it, once its commands are queued. Ticks
/// must be recorded in strictly increasing order.
pub struct ReplayRecorder {
    log: ReplayLog,
    checkpoint_interval: u64,
    ticks_recorded: u64,
    last_tick: Option<u64>,
}

impl ReplayRecorder {
    /// Start recording from `snapshot`.
    ///
    /// With a `checkpoint_interval` of 10 a checkpoint is kept at ticks 0,
    /// 10, 20 and so on. With 0, every tick that comes with a hash is kept.
    pub fn new(snapshot: SimSnapshot, checkpoint_interval: u64) -> Self {
        Self {
            log: ReplayLog {
                initial_snapshot: snapshot,
                content_hash: None,
                total_ticks: 0,
                entries: Vec::new(),
            },
            checkpoint_interval,
            ticks_recorded: 0,
            last_tick: None,
        }
    }

    /// Attach the digest of the content catalog the run used.
    pub fn set_content_hash(&mut self, hash: String) {
        self.log.content_hash = Some(hash);
    }

    fn is_checkpoint(&self, tick: u64) -> bool {
        self.checkpoint_interval == 0 || tick % self.checkpoint_interval == 0
    }

    /// Record one tick: its command frame when non-empty, and `state_hash`
    /// when the tick falls on the checkpoint interval.
    ///
    /// # Panics
    ///
    /// Panics if `tick` is not strictly greater than the previously
    /// recorded tick.
    pub fn record_tick(&mut self, tick: u64, input: &CommandFrame, state_hash: Option<String>) {
        if let Some(prev) = self.last_tick {
            assert!(
                tick > prev,
                "ReplayRecorder::record_tick: tick {tick} is not strictly greater than previous tick {prev}"
            );
        }
        self.last_tick = Some(tick);
        self.ticks_recorded += 1;

        if !input.is_empty() {
            self.log.entries.push(ReplayEntry::Input {
                tick,
                input: input.clone(),
            });
        }
        if let Some(state_hash) = state_hash.filter(|_| self.is_checkpoint(tick)) {
            self.log
                .entries
                .push(ReplayEntry::Checkpoint { tick, state_hash });
        }
    }

    /// Record the tick `sim` is about to run, hashing its state only when a
    /// checkpoint is due.
    pub fn capture(&mut self, sim: &Simulation) {
        let tick = sim.tick_count();
        let hash = self.is_checkpoint(tick).then(|| sim.state_hash());
        self.record_tick(tick, sim.current_input(), hash);
    }

    /// Finish recording.
    pub fn finish(mut self) -> ReplayLog {
        self.log.total_ticks = self.ticks_recorded;
        self.log
    }
}

// ---------------------------------------------------------------------------
// replay()
// ---------------------------------------------------------------------------

/// Replay `log` on `sim`, checking every checkpoint.
///
/// The log is validated first (no duplicate entries for one tick, no tick
/// overflow); on a validation error `sim` is untouched. Then the initial
/// snapshot is restored and ticks `[start, start + total_ticks)` are run,
/// each with its recorded command frame (or an empty one). Replay stops at
/// the first mismatched checkpoint.
///
/// `sim` must hold the same catalog the log was recorded with.
///
/// # Errors
///
/// Returns an error if the log is malformed or the initial snapshot fails
/// to restore.
pub fn replay(sim: &mut Simulation, log: &ReplayLog) -> Result<ReplayResult, anyhow::Error> {
    let mut inputs: BTreeMap<u64, &CommandFrame> = BTreeMap::new();
    let mut checkpoints: BTreeMap<u64, &str> = BTreeMap::new();
    for entry in &log.entries {
        match entry {
            ReplayEntry::Input { tick, input } => {
                if inputs.insert(*tick, input).is_some() {
                    return Err(anyhow::anyhow!(
                        "replay log contains duplicate Input entry at tick {tick}"
                    ));
                }
            }
            ReplayEntry::Checkpoint { tick, state_hash } => {
                if checkpoints.insert(*tick, state_hash).is_some() {
                    return Err(anyhow::anyhow!(
                        "replay log contains duplicate Checkpoint entry at tick {tick}"
                    ));
                }
            }
        }
    }

    let start_tick = log.initial_snapshot.tick_counter;
    let total_ticks = log.total_ticks;
    if total_ticks == 0 {
        return Ok(ReplayResult {
            completed: true,
            ticks_replayed: 0,
            first_divergence: None,
        });
    }
    let end_tick = start_tick.checked_add(total_ticks).ok_or_else(|| {
        anyhow::anyhow!(
            "tick range overflow: start_tick ({start_tick}) + total_ticks ({total_ticks}) exceeds u64::MAX"
        )
    })?;

    sim.restore_from_snapshot(&log.initial_snapshot)
        .map_err(|e| anyhow::anyhow!("failed to restore initial snapshot for replay: {e}"))?;

    let mut ticks_replayed = 0;
    for tick in start_tick..end_tick {
        // The recorded hash covers the queued frame, so queue it first.
        sim.set_input(inputs.get(&tick).map_or_else(CommandFrame::new, |&input| input.clone()));

        if let Some(&expected) = checkpoints.get(&tick) {
            let actual_hash = sim.state_hash();
            if actual_hash != expected {
                warn!(tick, expected, actual = %actual_hash, "replay diverged");
                return Ok(ReplayResult {
                    completed: false,
                    ticks_replayed,
                    first_divergence: Some(ReplayDivergence {
                        tick,
                        expected_hash: expected.to_owned(),
                        actual_hash,
                    }),
                });
            }
        }

        sim.step();
        ticks_replayed += 1;
    }

    debug!(ticks_replayed, "replay completed");
    Ok(ReplayResult {
        completed: true,
        ticks_replayed,
        first_divergence: None,
    })
}
