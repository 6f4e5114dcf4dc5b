use cadence_config::SessionParams;
use cadence_types::{InputSlot, SessionOutcome};
use serde::Serialize;

/// Coarse state of a session, for UI and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    /// Created but not started.
    Idle,
    /// A judgment window is open.
    AwaitingInput,
    /// Between a judgment and the next beat.
    BetweenBeats,
    /// Hold layout: charge key down inside a beat.
    Charging,
    /// Hold layout: retract animation after a judgment.
    Retract,
    /// Hold layout: re-charge time box after the retract.
    Grace,
    /// Hold layout: grace expired, waiting for a full-duration hold.
    Stalled,
    /// Withdrawn by the host; the beat re-opens on resume.
    Suspended,
    Finished,
}

impl SessionPhase {
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingInput => "awaiting",
            Self::BetweenBeats => "between-beats",
            Self::Charging => "charging",
            Self::Retract => "retract",
            Self::Grace => "grace",
            Self::Stalled => "stalled",
            Self::Suspended => "suspended",
            Self::Finished => "finished",
        }
    }
}

/// Read-only copy of a session's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub expected: InputSlot,
    pub beat_index: u64,
    pub success_count: u32,
    pub fail_count: u32,
    pub awaiting_input: bool,
    pub beat_start_us: i64,
    pub paused_for_failure: bool,
    pub consecutive_recovery_success: u32,
    pub outcome: Option<SessionOutcome>,
    /// Parameters after modifiers.
    pub params: SessionParams,
}
