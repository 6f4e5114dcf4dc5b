use serde::{Deserialize, Serialize};

use crate::slot::InputSlot;

/// Classification of a single judged input (or its absence).
///
/// None of these are errors: every variant is a normal outcome of the
/// judgment state machine and is consumed by the caller as a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Judgment {
    /// Correct slot inside the open window (or a full-duration hold).
    Success,
    /// The window elapsed without a correct input.
    TimingMiss,
    /// A recognized key for the wrong slot while the window was open.
    WrongKeyMiss,
    /// Hold layout: the charge key was released before the hold duration.
    EarlyRelease,
    /// A key of the session's layout pressed while no window was open. With
    /// no beat to compare against, either slot counts, not just the one the
    /// next beat will expect. Feedback only.
    StrayInput,
    /// Hold layout: the grace window expired; a full-duration hold is required.
    StalledHold,
}

impl Judgment {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }

    /// Whether this judgment counts as a miss against the session.
    pub fn is_miss(self) -> bool {
        matches!(
            self,
            Self::TimingMiss | Self::WrongKeyMiss | Self::EarlyRelease
        )
    }

    /// Whether this judgment mutates success/fail counters.
    pub fn is_scoring(self) -> bool {
        self != Self::StrayInput
    }
}

/// Terminal result of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionOutcome {
    /// Success target reached.
    Won,
    /// Fail limit reached.
    Lost,
}

/// Events emitted by a judgment session during a tick or an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionEvent {
    /// A judgment window opened.
    BeatOpened {
        beat_index: u64,
        slot: InputSlot,
        time_us: i64,
    },
    /// An input (or timeout) was judged.
    Judged {
        slot: InputSlot,
        judgment: Judgment,
        time_us: i64,
    },
    /// The session entered pause-for-failure.
    PausedForFailure { fail_count: u32 },
    /// Consecutive correct inputs while paused.
    RecoveryProgress { current: u32, required: u32 },
    /// The session left pause-for-failure.
    Resumed,
    /// Hold layout: the retract window ended and the grace window opened.
    GraceOpened { time_us: i64 },
    /// Hold layout: the session stalled and needs a full-duration hold.
    Stalled,
    /// Hold layout: a full-duration hold cleared the stall.
    StallCleared,
    /// The session reached a terminal state.
    Finished(SessionOutcome),
}
