use cadence_config::SessionParams;
use cadence_types::{SessionEvent, SessionOutcome};

/// What the session should do after a scored judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScoreResult {
    /// Schedule the next beat.
    Continue,
    /// Pause-for-failure ended; schedule the next beat.
    Resumed,
    /// Terminal. Nothing more may be scheduled.
    Finished(SessionOutcome),
}

/// Success/fail counters and the pause-for-failure sub-state shared by every
/// session layout.
#[derive(Debug, Clone, Default)]
pub(crate) struct Scoreboard {
    pub success_count: u32,
    pub fail_count: u32,
    pub paused: bool,
    pub recovery_streak: u32,
    pub outcome: Option<SessionOutcome>,
}

impl Scoreboard {
    pub fn record_success(
        &mut self,
        params: &SessionParams,
        events: &mut Vec<SessionEvent>,
    ) -> ScoreResult {
        if let Some(outcome) = self.outcome {
            return ScoreResult::Finished(outcome);
        }
        self.success_count += 1;

        if self.success_count >= params.success_target {
            return self.finish(SessionOutcome::Won, events);
        }

        if self.paused {
            self.recovery_streak += 1;
            events.push(SessionEvent::RecoveryProgress {
                current: self.recovery_streak,
                required: params.recovery_threshold,
            });
            if self.recovery_streak >= params.recovery_threshold {
                self.paused = false;
                self.recovery_streak = 0;
                log::debug!("resumed from pause after {} successes", params.recovery_threshold);
                events.push(SessionEvent::Resumed);
                return ScoreResult::Resumed;
            }
        }
        ScoreResult::Continue
    }

    /// Count a failure. Only the first failure of a pause increments the
    /// fail count; further failures while paused only reset the streak.
    pub fn record_failure(
        &mut self,
        params: &SessionParams,
        events: &mut Vec<SessionEvent>,
    ) -> ScoreResult {
        if let Some(outcome) = self.outcome {
            return ScoreResult::Finished(outcome);
        }

        if self.paused {
            if self.recovery_streak > 0 {
                self.recovery_streak = 0;
                events.push(SessionEvent::RecoveryProgress {
                    current: 0,
                    required: params.recovery_threshold,
                });
            }
        } else {
            self.fail_count += 1;
            self.paused = true;
            self.recovery_streak = 0;
            log::debug!("paused for failure ({}/{})", self.fail_count, params.fail_limit);
            events.push(SessionEvent::PausedForFailure {
                fail_count: self.fail_count,
            });
        }

        if self.fail_count >= params.fail_limit {
            return self.finish(SessionOutcome::Lost, events);
        }
        ScoreResult::Continue
    }

    fn finish(&mut self, outcome: SessionOutcome, events: &mut Vec<SessionEvent>) -> ScoreResult {
        self.outcome = Some(outcome);
        log::info!(
            "session finished: {outcome:?} ({} successes, {} failures)",
            self.success_count,
            self.fail_count
        );
        events.push(SessionEvent::Finished(outcome));
        ScoreResult::Finished(outcome)
    }
}
