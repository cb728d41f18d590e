//! Notable transitions reported by ship operations.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// A set of event kinds, combined with `|`.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipEvents(u32);

impl ShipEvents {
    /// No events.
    pub const NONE: ShipEvents = ShipEvents(0);
    /// The ship became disabled.
    pub const DISABLE: ShipEvents = ShipEvents(1 << 0);
    /// The ship was destroyed.
    pub const DESTROY: ShipEvents = ShipEvents(1 << 1);
    /// A non-hostile ship was hurt badly enough to turn on its attacker.
    pub const PROVOKE: ShipEvents = ShipEvents(1 << 2);
    /// A cargo scan completed.
    pub const SCAN_CARGO: ShipEvents = ShipEvents(1 << 3);
    /// An outfit scan completed.
    pub const SCAN_OUTFITS: ShipEvents = ShipEvents(1 << 4);
    /// The ship was boarded and plundered.
    pub const BOARD: ShipEvents = ShipEvents(1 << 5);
    /// The ship was boarded and assisted.
    pub const ASSIST: ShipEvents = ShipEvents(1 << 6);
    /// The ship changed hands.
    pub const CAPTURE: ShipEvents = ShipEvents(1 << 7);
    /// The ship completed a hyperspace jump.
    pub const JUMP: ShipEvents = ShipEvents(1 << 8);

    const NAMES: [(ShipEvents, &'static str); 9] = [
        (Self::DISABLE, "disable"),
        (Self::DESTROY, "destroy"),
        (Self::PROVOKE, "provoke"),
        (Self::SCAN_CARGO, "scan_cargo"),
        (Self::SCAN_OUTFITS, "scan_outfits"),
        (Self::BOARD, "board"),
        (Self::ASSIST, "assist"),
        (Self::CAPTURE, "capture"),
        (Self::JUMP, "jump"),
    ];

    /// Whether every event in `other` is present.
    pub fn contains(self, other: ShipEvents) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether no event is present.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bit representation.
    pub fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for ShipEvents {
    type Output = ShipEvents;
    fn bitor(self, rhs: ShipEvents) -> ShipEvents {
        ShipEvents(self.0 | rhs.0)
    }
}

impl BitOrAssign for ShipEvents {
    fn bitor_assign(&mut self, rhs: ShipEvents) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ShipEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(event, _)| !event.is_empty() && self.contains(*event))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "ShipEvents({})", names.join(" | "))
    }
}
