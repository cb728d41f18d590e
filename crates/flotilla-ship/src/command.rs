//! Per-tick control input for a single ship.

use serde::{Deserialize, Serialize};

/// Control input chosen for one ship for one tick.
///
/// Discrete requests are bits in `actions`; steering is continuous. Each
/// hardpoint has its own fire bit, indexed by its position in the ship's
/// armament.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    actions: u32,
    thrust: f64,
    turn: f64,
    fire: u64,
}

impl Command {
    /// Burn the afterburner.
    pub const AFTERBURNER: u32 = 1 << 0;
    /// Land on the target planet.
    pub const LAND: u32 = 1 << 1;
    /// Jump to the target system.
    pub const JUMP: u32 = 1 << 2;
    /// Board the target ship (or, for carried craft, dock with the parent).
    pub const BOARD: u32 = 1 << 3;
    /// Scan the target ship.
    pub const SCAN: u32 = 1 << 4;
    /// Engage the cloaking device.
    pub const CLOAK: u32 = 1 << 5;
    /// Launch carried craft.
    pub const DEPLOY: u32 = 1 << 6;

    /// Number of hardpoints with their own fire bit. Ships with more are
    /// refused when they are built or loaded.
    pub const MAX_HARDPOINTS: usize = 64;

    /// An empty command: coast, hold heading, hold fire.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style action request.
    pub fn with(mut self, action: u32) -> Self {
        self.actions |= action;
        self
    }

    /// Builder-style thrust; clamped to `[-1, 1]`, negative is reverse.
    pub fn with_thrust(mut self, thrust: f64) -> Self {
        self.set_thrust(thrust);
        self
    }

    /// Builder-style turn; clamped to `[-1, 1]`, positive is clockwise.
    pub fn with_turn(mut self, turn: f64) -> Self {
        self.set_turn(turn);
        self
    }

    /// Builder-style fire request for hardpoint `index`.
    pub fn with_fire(mut self, index: usize) -> Self {
        self.set_fire(index);
        self
    }

    /// Whether every bit of `action` is requested.
    pub fn has(&self, action: u32) -> bool {
        self.actions & action == action
    }

    /// Request an action.
    pub fn set(&mut self, action: u32) {
        self.actions |= action;
    }

    /// Withdraw an action.
    pub fn clear(&mut self, action: u32) {
        self.actions &= !action;
    }

    /// Forward (positive) or reverse (negative) thrust magnitude.
    pub fn thrust(&self) -> f64 {
        self.thrust
    }

    /// Turn magnitude.
    pub fn turn(&self) -> f64 {
        self.turn
    }

    /// Set thrust, clamped to `[-1, 1]`. NaN counts as no thrust.
    pub fn set_thrust(&mut self, thrust: f64) {
        self.thrust = if thrust.is_nan() { 0.0 } else { thrust.clamp(-1.0, 1.0) };
    }

    /// Set turn, clamped to `[-1, 1]`. NaN counts as no turn.
    pub fn set_turn(&mut self, turn: f64) {
        self.turn = if turn.is_nan() { 0.0 } else { turn.clamp(-1.0, 1.0) };
    }

    /// Ask hardpoint `index` to fire. Indices past
    /// [`MAX_HARDPOINTS`](Self::MAX_HARDPOINTS) are ignored.
    pub fn set_fire(&mut self, index: usize) {
        if index < Self::MAX_HARDPOINTS {
            self.fire |= 1 << index;
        }
    }

    /// Whether hardpoint `index` is asked to fire.
    pub fn has_fire(&self, index: usize) -> bool {
        index < Self::MAX_HARDPOINTS && self.fire & (1 << index) != 0
    }

    /// Whether any steering input is present.
    pub fn is_steering(&self) -> bool {
        self.thrust != 0.0 || self.turn != 0.0
    }
}
