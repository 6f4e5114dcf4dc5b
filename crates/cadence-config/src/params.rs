use serde::{Deserialize, Serialize};

/// What a hold-mode stall does to the session's fail count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum StallPolicy {
    /// A stall counts as one failure toward the fail limit.
    #[default]
    ChargeFailure,
    /// A stall only blocks progress; the fail count is untouched.
    Cosmetic,
}

/// Base parameters of a judgment session, captured once at creation.
///
/// All durations are microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct SessionParams {
    /// Width of the judgment window.
    pub success_window_us: i64,
    /// Time between consecutive beats.
    pub beat_interval_us: i64,
    /// Pause after a judgment before the next beat may be scheduled.
    pub feedback_delay_us: i64,
    /// Failures that end the session.
    pub fail_limit: u32,
    /// Successes that win the session.
    pub success_target: u32,
    /// Consecutive correct inputs needed to leave pause-for-failure.
    pub recovery_threshold: u32,
    /// Hold layout: how long the charge key must stay down.
    pub hold_duration_us: i64,
    /// Hold layout: retract animation window after each judgment.
    pub retract_duration_us: i64,
    /// Hold layout: time box for the follow-up hold.
    pub grace_window_us: i64,
    /// Hold layout: whether a stall is charged as a failure.
    pub stall_policy: StallPolicy,
}

impl Default for SessionParams {
    fn default() -> Self {
        Self {
            success_window_us: 400_000,
            beat_interval_us: 1_000_000,
            feedback_delay_us: 200_000,
            fail_limit: 3,
            success_target: 20,
            recovery_threshold: 3,
            hold_duration_us: 500_000,
            retract_duration_us: 150_000,
            grace_window_us: 1_000_000,
            stall_policy: StallPolicy::ChargeFailure,
        }
    }
}

impl SessionParams {
    /// Clamp every field into a usable range.
    pub fn validate(&mut self) {
        self.success_window_us = self.success_window_us.clamp(1_000, 10_000_000);
        self.beat_interval_us = self.beat_interval_us.clamp(10_000, 60_000_000);
        self.feedback_delay_us = self.feedback_delay_us.clamp(0, 10_000_000);
        self.fail_limit = self.fail_limit.clamp(1, 1000);
        self.success_target = self.success_target.clamp(1, 100_000);
        self.recovery_threshold = self.recovery_threshold.clamp(1, 100);
        self.hold_duration_us = self.hold_duration_us.clamp(1_000, 10_000_000);
        self.retract_duration_us = self.retract_duration_us.clamp(0, 10_000_000);
        self.grace_window_us = self.grace_window_us.clamp(1_000, 60_000_000);
    }

    /// Delay between a judgment and the next beat: the feedback delay, then
    /// whatever remains of the beat interval.
    pub fn next_beat_delay_us(&self) -> i64 {
        self.feedback_delay_us + (self.beat_interval_us - self.feedback_delay_us).max(0)
    }
}
