use serde::{Deserialize, Serialize};

use crate::slot::InputSlot;

/// Phase of a discrete input attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttemptKind {
    /// Key went down this tick.
    Pressed,
    /// Key went up this tick.
    Released,
}

/// One normalized input attempt against a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    pub slot: InputSlot,
    pub kind: AttemptKind,
    /// Timestamp in microseconds (game clock).
    pub time_us: i64,
}

impl Attempt {
    pub fn new(slot: InputSlot, kind: AttemptKind, time_us: i64) -> Self {
        Self {
            slot,
            kind,
            time_us,
        }
    }

    pub fn pressed(slot: InputSlot, time_us: i64) -> Self {
        Self::new(slot, AttemptKind::Pressed, time_us)
    }

    pub fn released(slot: InputSlot, time_us: i64) -> Self {
        Self::new(slot, AttemptKind::Released, time_us)
    }

    pub fn is_press(&self) -> bool {
        self.kind == AttemptKind::Pressed
    }

    pub fn is_release(&self) -> bool {
        self.kind == AttemptKind::Released
    }
}
