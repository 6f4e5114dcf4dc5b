//! Hold-mode session.
//!
//! Each beat opens the timed success window. A press inside it starts the
//! charge, and the release judges it: at or past the hold duration is a
//! success, earlier is an early release. After every judgment the session
//! runs the retract countdown, then the grace countdown in which a fresh
//! full-duration hold must rearm it. A grace window that runs out stalls the
//! session until such a hold arrives. The next beat opens once its timer is
//! due and the session is rearmed.

use cadence_config::{Modifiers, StallPolicy};
use cadence_input::AutoplayDriver;
use cadence_timing::{Countdown, TimerHandle, TimerQueue, TimingWindow, WindowVerdict};
use cadence_types::{
    Attempt, AttemptKind, Clock, FeedbackSink, InputSlot, Judgment, NullFeedback, SessionEvent,
    SessionOutcome,
};

use crate::scoreboard::{ScoreResult, Scoreboard};
use crate::session::JudgmentSession;
use crate::snapshot::{SessionPhase, SessionSnapshot};

const SLOTS: [InputSlot; 1] = [InputSlot::Hold];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldPhase {
    Idle,
    Awaiting,
    Charging { pressed_at: i64 },
    Retract(Countdown),
    Grace {
        countdown: Countdown,
        pressed_at: Option<i64>,
    },
    /// Rearmed, waiting for the beat timer.
    Rearmed,
    Stalled { pressed_at: Option<i64> },
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldTimer {
    NextBeat,
}

pub struct HoldSession<F: FeedbackSink = NullFeedback> {
    modifiers: Modifiers,
    phase: HoldPhase,
    beat_index: u64,
    beat_start_us: i64,
    board: Scoreboard,
    started: bool,
    suspended: bool,
    /// The open beat was withdrawn by a suspension.
    reopen_on_resume: bool,
    beat_due: bool,
    timers: TimerQueue<HoldTimer>,
    next_beat: Option<TimerHandle>,
    feedback: F,
    autoplay: Option<AutoplayDriver>,
    /// The driver has rolled for the current window.
    autoplay_armed: bool,
}

impl HoldSession<NullFeedback> {
    pub fn new(modifiers: Modifiers) -> Self {
        Self {
            modifiers,
            phase: HoldPhase::Idle,
            beat_index: 0,
            beat_start_us: 0,
            board: Scoreboard::default(),
            started: false,
            suspended: false,
            reopen_on_resume: false,
            beat_due: false,
            timers: TimerQueue::new(),
            next_beat: None,
            feedback: NullFeedback,
            autoplay: None,
            autoplay_armed: false,
        }
    }
}

impl<F: FeedbackSink> HoldSession<F> {
    pub fn with_feedback<G: FeedbackSink>(self, feedback: G) -> HoldSession<G> {
        HoldSession {
            modifiers: self.modifiers,
            phase: self.phase,
            beat_index: self.beat_index,
            beat_start_us: self.beat_start_us,
            board: self.board,
            started: self.started,
            suspended: self.suspended,
            reopen_on_resume: self.reopen_on_resume,
            beat_due: self.beat_due,
            timers: self.timers,
            next_beat: self.next_beat,
            feedback,
            autoplay: self.autoplay,
            autoplay_armed: self.autoplay_armed,
        }
    }

    pub fn with_autoplay(mut self, driver: AutoplayDriver) -> Self {
        self.autoplay = Some(driver);
        self
    }

    pub fn set_autoplay_driver(&mut self, driver: Option<AutoplayDriver>) {
        self.autoplay = driver;
    }

    pub fn feedback(&self) -> &F {
        &self.feedback
    }

    pub fn success_count(&self) -> u32 {
        self.board.success_count
    }

    pub fn fail_count(&self) -> u32 {
        self.board.fail_count
    }

    pub fn is_paused_for_failure(&self) -> bool {
        self.board.paused
    }

    pub fn is_stalled(&self) -> bool {
        matches!(self.phase, HoldPhase::Stalled { .. })
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.phase == HoldPhase::Awaiting && !self.suspended
    }

    /// Let autoplay answer whatever the phase is waiting for with a
    /// full-duration hold: the rest of the success window, the rest of the
    /// grace window, or a retry while stalled. Creates an entropy-seeded
    /// driver when the modifier is switched on without one attached.
    fn arm_autoplay(&mut self, now_us: i64) {
        if !self.modifiers.autoplay_enabled() {
            if self.autoplay_armed {
                self.cancel_autoplay();
            }
            return;
        }
        let idle = self
            .autoplay
            .as_ref()
            .is_none_or(|driver| !driver.has_pending());
        let window_us = match self.phase {
            HoldPhase::Awaiting if !self.autoplay_armed => self.window().remaining(now_us),
            HoldPhase::Grace {
                countdown,
                pressed_at: None,
            } if !self.autoplay_armed => countdown.remaining(),
            HoldPhase::Stalled { pressed_at: None } if idle => {
                self.modifiers.effective().grace_window_us
            }
            _ => return,
        };
        let accuracy = self.modifiers.autoplay_accuracy();
        let duration = self.modifiers.hold_duration_us();
        let driver = self
            .autoplay
            .get_or_insert_with(|| AutoplayDriver::from_entropy(accuracy));
        driver.set_accuracy(accuracy);
        driver.on_window_opened(now_us, window_us, InputSlot::Hold, Some(duration));
        self.autoplay_armed = true;
    }

    fn cancel_autoplay(&mut self) {
        self.autoplay_armed = false;
        if let Some(driver) = self.autoplay.as_mut() {
            driver.cancel();
        }
    }

    fn open_next_beat(&mut self, now_us: i64, events: &mut Vec<SessionEvent>) {
        let index = self.beat_index;
        self.beat_index += 1;
        self.open_window(now_us, index, events);
    }

    fn open_window(&mut self, now_us: i64, index: u64, events: &mut Vec<SessionEvent>) {
        self.beat_due = false;
        self.beat_start_us = now_us;
        self.phase = HoldPhase::Awaiting;
        log::debug!("hold beat {index} opened");
        events.push(SessionEvent::BeatOpened {
            beat_index: index,
            slot: InputSlot::Hold,
            time_us: now_us,
        });
        self.arm_autoplay(now_us);
    }

    fn window(&self) -> TimingWindow {
        TimingWindow::new(self.beat_start_us, self.modifiers.success_window_us())
    }

    fn stray(&mut self, time_us: i64, events: &mut Vec<SessionEvent>) {
        self.feedback.on_judgment(InputSlot::Hold, Judgment::StrayInput);
        events.push(SessionEvent::Judged {
            slot: InputSlot::Hold,
            judgment: Judgment::StrayInput,
            time_us,
        });
    }

    fn handle_attempt(&mut self, attempt: Attempt, events: &mut Vec<SessionEvent>) {
        if !self.started || self.suspended || self.board.outcome.is_some() {
            return;
        }
        if attempt.slot != InputSlot::Hold {
            return;
        }
        let t = attempt.time_us;
        let duration = self.modifiers.hold_duration_us();

        match (self.phase, attempt.kind) {
            (HoldPhase::Awaiting, AttemptKind::Pressed) => {
                if self.window().verdict(t) == WindowVerdict::Miss {
                    self.judge(Judgment::TimingMiss, t, events);
                    if self.board.outcome.is_none() {
                        self.stray(t, events);
                    }
                } else {
                    log::debug!("charging from {t}");
                    self.phase = HoldPhase::Charging { pressed_at: t };
                }
            }
            (HoldPhase::Charging { pressed_at }, AttemptKind::Released) => {
                if t - pressed_at >= duration {
                    self.judge(Judgment::Success, t, events);
                } else {
                    self.judge(Judgment::EarlyRelease, t, events);
                }
            }
            (HoldPhase::Grace { countdown, pressed_at }, kind) => match (kind, pressed_at) {
                (AttemptKind::Pressed, None) => {
                    self.phase = HoldPhase::Grace {
                        countdown,
                        pressed_at: Some(t),
                    };
                }
                (AttemptKind::Released, Some(p)) if t - p >= duration => {
                    log::debug!("rearmed by grace hold");
                    self.rearm(t, events);
                }
                (AttemptKind::Released, Some(_)) => {
                    if countdown.is_finished() {
                        self.stall(t, events);
                    } else {
                        self.phase = HoldPhase::Grace {
                            countdown,
                            pressed_at: None,
                        };
                    }
                }
                _ => {}
            },
            (HoldPhase::Stalled { pressed_at }, kind) => match (kind, pressed_at) {
                (AttemptKind::Pressed, None) => {
                    self.phase = HoldPhase::Stalled {
                        pressed_at: Some(t),
                    };
                }
                (AttemptKind::Released, Some(p)) if t - p >= duration => {
                    log::debug!("stall cleared");
                    events.push(SessionEvent::StallCleared);
                    self.rearm(t, events);
                }
                (AttemptKind::Released, Some(_)) => {
                    self.phase = HoldPhase::Stalled { pressed_at: None };
                }
                _ => {}
            },
            (HoldPhase::Retract(_) | HoldPhase::Rearmed, AttemptKind::Pressed) => {
                self.stray(t, events);
            }
            _ => {}
        }
    }

    fn judge(&mut self, judgment: Judgment, time_us: i64, events: &mut Vec<SessionEvent>) {
        self.cancel_autoplay();
        log::debug!(
            "hold beat {} judged {judgment:?} at {time_us}",
            self.beat_index.saturating_sub(1)
        );
        self.feedback.on_judgment(InputSlot::Hold, judgment);
        events.push(SessionEvent::Judged {
            slot: InputSlot::Hold,
            judgment,
            time_us,
        });

        let params = *self.modifiers.effective();
        let result = if judgment.is_success() {
            self.board.record_success(&params, events)
        } else {
            self.board.record_failure(&params, events)
        };
        match result {
            ScoreResult::Finished(_) => self.terminate(),
            ScoreResult::Continue | ScoreResult::Resumed => {
                if let Some(handle) = self.next_beat.take() {
                    self.timers.cancel(handle);
                }
                self.beat_due = false;
                let due = time_us + params.next_beat_delay_us();
                self.next_beat = Some(self.timers.schedule(due, HoldTimer::NextBeat));
                self.phase = HoldPhase::Retract(Countdown::new(params.retract_duration_us));
            }
        }
    }

    fn open_grace(&mut self, now_us: i64, events: &mut Vec<SessionEvent>) {
        let window = self.modifiers.effective().grace_window_us;
        self.phase = HoldPhase::Grace {
            countdown: Countdown::new(window),
            pressed_at: None,
        };
        events.push(SessionEvent::GraceOpened { time_us: now_us });
        self.arm_autoplay(now_us);
    }

    fn stall(&mut self, time_us: i64, events: &mut Vec<SessionEvent>) {
        self.cancel_autoplay();
        self.phase = HoldPhase::Stalled { pressed_at: None };
        log::debug!("hold session stalled at {time_us}");
        self.feedback.on_judgment(InputSlot::Hold, Judgment::StalledHold);
        events.push(SessionEvent::Judged {
            slot: InputSlot::Hold,
            judgment: Judgment::StalledHold,
            time_us,
        });
        events.push(SessionEvent::Stalled);

        let params = *self.modifiers.effective();
        if params.stall_policy == StallPolicy::ChargeFailure {
            if let ScoreResult::Finished(_) = self.board.record_failure(&params, events) {
                self.terminate();
            }
        }
    }

    fn rearm(&mut self, time_us: i64, events: &mut Vec<SessionEvent>) {
        self.cancel_autoplay();
        self.phase = HoldPhase::Rearmed;
        if self.beat_due {
            self.open_next_beat(time_us, events);
        }
    }

    fn terminate(&mut self) {
        self.phase = HoldPhase::Finished;
        self.timers.clear();
        self.next_beat = None;
        self.beat_due = false;
        self.reopen_on_resume = false;
        self.autoplay_armed = false;
        if let Some(driver) = self.autoplay.as_mut() {
            driver.stop();
        }
    }

    fn advance_phase(&mut self, now_us: i64, delta_us: i64, events: &mut Vec<SessionEvent>) {
        match self.phase {
            HoldPhase::Awaiting => {
                if self.window().verdict(now_us) == WindowVerdict::Miss {
                    self.judge(Judgment::TimingMiss, now_us, events);
                }
            }
            HoldPhase::Retract(mut countdown) => {
                if countdown.tick(delta_us) {
                    self.open_grace(now_us, events);
                } else {
                    self.phase = HoldPhase::Retract(countdown);
                }
            }
            HoldPhase::Grace {
                mut countdown,
                pressed_at,
            } => {
                let expired = countdown.tick(delta_us);
                self.phase = HoldPhase::Grace {
                    countdown,
                    pressed_at,
                };
                // a hold in progress may still complete after expiry
                if expired && pressed_at.is_none() {
                    self.stall(now_us, events);
                }
            }
            HoldPhase::Rearmed => {
                if self.beat_due {
                    self.open_next_beat(now_us, events);
                }
            }
            _ => {}
        }
    }
}

impl<F: FeedbackSink> JudgmentSession for HoldSession<F> {
    fn start(&mut self, now_us: i64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.started || self.board.outcome.is_some() {
            return events;
        }
        self.started = true;
        log::info!(
            "hold session started (window {}us, hold {}us, fail limit {})",
            self.modifiers.success_window_us(),
            self.modifiers.hold_duration_us(),
            self.modifiers.fail_limit()
        );
        if self.suspended {
            self.reopen_on_resume = true;
            self.beat_index += 1;
        } else {
            self.open_next_beat(now_us, &mut events);
        }
        events
    }

    fn update(&mut self, clock: &dyn Clock) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if !self.started || self.suspended || self.board.outcome.is_some() {
            return events;
        }
        let now = clock.now_us();

        for timer in self.timers.poll(now) {
            match timer {
                HoldTimer::NextBeat => {
                    self.next_beat = None;
                    self.beat_due = true;
                }
            }
        }

        self.arm_autoplay(now);
        let attempts = match self.autoplay.as_mut() {
            Some(driver) if self.autoplay_armed => driver.poll(now),
            _ => Vec::new(),
        };
        for attempt in attempts {
            self.handle_attempt(attempt, &mut events);
        }

        if self.board.outcome.is_none() {
            self.advance_phase(now, clock.unscaled_delta_us(), &mut events);
        }
        events
    }

    fn on_attempt(&mut self, attempt: Attempt) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.handle_attempt(attempt, &mut events);
        events
    }

    fn set_suspended(&mut self, suspended: bool, now_us: i64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.board.outcome.is_some() || suspended == self.suspended {
            return events;
        }

        if suspended {
            self.suspended = true;
            self.cancel_autoplay();
            match self.phase {
                HoldPhase::Awaiting | HoldPhase::Charging { .. } => {
                    self.reopen_on_resume = true;
                }
                HoldPhase::Grace { countdown, .. } => {
                    // an interrupted re-charge starts over
                    self.phase = HoldPhase::Grace {
                        countdown,
                        pressed_at: None,
                    };
                }
                HoldPhase::Stalled { .. } => {
                    self.phase = HoldPhase::Stalled { pressed_at: None };
                }
                _ => {}
            }
            if let Some(handle) = self.next_beat.take() {
                self.timers.cancel(handle);
                self.beat_due = true;
            }
            log::debug!("hold session suspended");
        } else {
            self.suspended = false;
            log::debug!("hold session resumed");
            if std::mem::take(&mut self.reopen_on_resume) {
                let index = self.beat_index.saturating_sub(1);
                self.open_window(now_us, index, &mut events);
            } else if self.phase == HoldPhase::Rearmed && self.beat_due {
                self.open_next_beat(now_us, &mut events);
            } else {
                self.arm_autoplay(now_us);
            }
        }
        events
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    fn modifiers_mut(&mut self) -> &mut Modifiers {
        &mut self.modifiers
    }

    fn snapshot(&self) -> SessionSnapshot {
        let phase = match self.phase {
            HoldPhase::Finished => SessionPhase::Finished,
            _ if self.suspended => SessionPhase::Suspended,
            HoldPhase::Idle => SessionPhase::Idle,
            HoldPhase::Awaiting => SessionPhase::AwaitingInput,
            HoldPhase::Charging { .. } => SessionPhase::Charging,
            HoldPhase::Retract(_) => SessionPhase::Retract,
            HoldPhase::Grace { .. } => SessionPhase::Grace,
            HoldPhase::Rearmed => SessionPhase::BetweenBeats,
            HoldPhase::Stalled { .. } => SessionPhase::Stalled,
        };
        SessionSnapshot {
            phase,
            expected: InputSlot::Hold,
            beat_index: self.beat_index,
            success_count: self.board.success_count,
            fail_count: self.board.fail_count,
            awaiting_input: self.is_awaiting_input(),
            beat_start_us: self.beat_start_us,
            paused_for_failure: self.board.paused,
            consecutive_recovery_success: self.board.recovery_streak,
            outcome: self.board.outcome,
            params: *self.modifiers.effective(),
        }
    }

    fn slots(&self) -> &[InputSlot] {
        &SLOTS
    }

    fn outcome(&self) -> Option<SessionOutcome> {
        self.board.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_config::SessionParams;
    use cadence_types::{ManualClock, RecordingFeedback};

    const HOLD: i64 = 500_000;
    const RETRACT: i64 = 150_000;

    fn session_with(params: SessionParams) -> HoldSession<RecordingFeedback> {
        HoldSession::new(Modifiers::new(params)).with_feedback(RecordingFeedback::new())
    }

    fn session() -> HoldSession<RecordingFeedback> {
        session_with(SessionParams::default())
    }

    /// Tick in 10ms frames up to `until`.
    fn run(
        s: &mut HoldSession<RecordingFeedback>,
        clock: &ManualClock,
        until: i64,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while clock.now_us() < until {
            clock.advance((until - clock.now_us()).min(10_000));
            events.extend(s.update(clock));
        }
        events
    }

    fn hold(s: &mut HoldSession<RecordingFeedback>, from: i64, to: i64) -> Vec<SessionEvent> {
        let mut events = s.on_attempt(Attempt::pressed(InputSlot::Hold, from));
        events.extend(s.on_attempt(Attempt::released(InputSlot::Hold, to)));
        events
    }

    #[test]
    fn full_hold_succeeds() {
        let mut s = session();
        s.start(0);
        let events = hold(&mut s, 100_000, 100_000 + HOLD);
        assert!(events.contains(&SessionEvent::Judged {
            slot: InputSlot::Hold,
            judgment: Judgment::Success,
            time_us: 600_000
        }));
        assert_eq!(s.success_count(), 1);
        assert_eq!(s.snapshot().phase, SessionPhase::Retract);
    }

    #[test]
    fn early_release_fails() {
        let mut s = session();
        s.start(0);
        let events = hold(&mut s, 100_000, 100_000 + HOLD - 1);
        assert!(events.contains(&SessionEvent::PausedForFailure { fail_count: 1 }));
        assert_eq!(s.feedback().count(Judgment::EarlyRelease), 1);
    }

    #[test]
    fn charging_outlives_the_window() {
        let mut s = session();
        let clock = ManualClock::new();
        s.start(0);
        s.on_attempt(Attempt::pressed(InputSlot::Hold, 300_000));
        let events = run(&mut s, &clock, 790_000);
        assert!(events.is_empty());
        assert_eq!(s.snapshot().phase, SessionPhase::Charging);
        assert!(!s.snapshot().awaiting_input);
        s.on_attempt(Attempt::released(InputSlot::Hold, 800_000));
        assert_eq!(s.success_count(), 1);
    }

    #[test]
    fn no_press_times_out() {
        let mut s = session();
        let clock = ManualClock::new();
        s.start(0);
        let events = run(&mut s, &clock, 410_000);
        assert!(events.iter().any(|e| matches!(
            e,
            SessionEvent::Judged {
                judgment: Judgment::TimingMiss,
                ..
            }
        )));
        assert_eq!(s.fail_count(), 1);
    }

    #[test]
    fn retract_then_grace_then_rearm_then_next_beat() {
        let mut s = session();
        let clock = ManualClock::new();
        s.start(0);
        hold(&mut s, 0, HOLD);
        clock.set_time(HOLD);

        let events = run(&mut s, &clock, HOLD + RETRACT);
        assert_eq!(events, vec![SessionEvent::GraceOpened { time_us: HOLD + RETRACT }]);
        assert_eq!(s.snapshot().phase, SessionPhase::Grace);

        // re-charge inside grace
        let t = HOLD + RETRACT + 10_000;
        assert!(hold(&mut s, t, t + HOLD).is_empty());
        assert_eq!(s.snapshot().phase, SessionPhase::BetweenBeats);

        // next beat is due at judgment + interval
        let events = run(&mut s, &clock, HOLD + 1_000_000);
        assert!(matches!(events[..], [SessionEvent::BeatOpened { beat_index: 1, .. }]));
    }

    #[test]
    fn late_rearm_opens_due_beat_immediately() {
        let params = SessionParams {
            grace_window_us: 5_000_000,
            ..Default::default()
        };
        let mut s = session_with(params);
        let clock = ManualClock::new();
        s.start(0);
        hold(&mut s, 0, HOLD);
        clock.set_time(HOLD);
        run(&mut s, &clock, 3_000_000);
        assert_eq!(s.snapshot().phase, SessionPhase::Grace);

        let events = hold(&mut s, 3_000_000, 3_000_000 + HOLD);
        assert!(matches!(
            events[..],
            [SessionEvent::BeatOpened {
                beat_index: 1,
                time_us: 3_500_000,
                ..
            }]
        ));
    }

    #[test]
    fn grace_expiry_stalls_and_charges_failure() {
        let mut s = session();
        let clock = ManualClock::new();
        s.start(0);
        hold(&mut s, 0, HOLD);
        clock.set_time(HOLD);

        let events = run(&mut s, &clock, HOLD + RETRACT + 1_000_000 + 10_000);
        assert!(events.contains(&SessionEvent::Stalled));
        assert!(events.contains(&SessionEvent::PausedForFailure { fail_count: 1 }));
        assert!(s.is_stalled());
        assert_eq!(s.feedback().count(Judgment::StalledHold), 1);

        // no beat opens while stalled
        let events = run(&mut s, &clock, 5_000_000);
        assert!(events.is_empty());
    }

    #[test]
    fn cosmetic_stall_keeps_fail_count() {
        let params = SessionParams {
            stall_policy: StallPolicy::Cosmetic,
            ..Default::default()
        };
        let mut s = session_with(params);
        let clock = ManualClock::new();
        s.start(0);
        hold(&mut s, 0, HOLD);
        clock.set_time(HOLD);
        let events = run(&mut s, &clock, 3_000_000);
        assert!(events.contains(&SessionEvent::Stalled));
        assert_eq!(s.fail_count(), 0);
        assert!(!s.is_paused_for_failure());
    }

    #[test]
    fn short_hold_does_not_clear_stall() {
        let mut s = session();
        let clock = ManualClock::new();
        s.start(0);
        hold(&mut s, 0, HOLD);
        clock.set_time(HOLD);
        run(&mut s, &clock, 3_000_000);
        assert!(s.is_stalled());

        assert!(hold(&mut s, 3_000_000, 3_100_000).is_empty());
        assert!(s.is_stalled());

        let events = hold(&mut s, 3_200_000, 3_200_000 + HOLD);
        assert_eq!(events[0], SessionEvent::StallCleared);
        assert!(matches!(events[1], SessionEvent::BeatOpened { .. }));
        assert!(!s.is_stalled());
    }

    #[test]
    fn grace_hold_in_progress_survives_expiry() {
        let mut s = session();
        let clock = ManualClock::new();
        s.start(0);
        hold(&mut s, 0, HOLD);
        clock.set_time(HOLD);
        run(&mut s, &clock, HOLD + RETRACT);

        let grace_end = HOLD + RETRACT + 1_000_000;
        s.on_attempt(Attempt::pressed(InputSlot::Hold, grace_end - 100_000));
        let events = run(&mut s, &clock, grace_end + 100_000);
        assert!(!events.contains(&SessionEvent::Stalled));

        s.on_attempt(Attempt::released(InputSlot::Hold, grace_end + HOLD));
        assert!(!s.is_stalled());
        assert_eq!(s.fail_count(), 0);
    }

    #[test]
    fn press_during_retract_is_stray() {
        let mut s = session();
        s.start(0);
        hold(&mut s, 0, HOLD);
        let events = s.on_attempt(Attempt::pressed(InputSlot::Hold, HOLD + 10_000));
        assert!(events.contains(&SessionEvent::Judged {
            slot: InputSlot::Hold,
            judgment: Judgment::StrayInput,
            time_us: HOLD + 10_000
        }));
        assert_eq!(s.success_count(), 1);
    }

    #[test]
    fn other_slots_are_ignored() {
        let mut s = session();
        s.start(0);
        assert!(s.on_attempt(Attempt::pressed(InputSlot::Primary, 10)).is_empty());
        assert!(s.is_awaiting_input());
    }

    #[test]
    fn fail_limit_loses() {
        let params = SessionParams {
            fail_limit: 1,
            ..Default::default()
        };
        let mut s = session_with(params);
        let clock = ManualClock::new();
        s.start(0);
        let events = hold(&mut s, 0, 10_000);
        assert!(events.contains(&SessionEvent::Finished(SessionOutcome::Lost)));
        assert!(run(&mut s, &clock, 5_000_000).is_empty());
        assert_eq!(s.snapshot().phase, SessionPhase::Finished);
    }

    #[test]
    fn hold_mode_duration_modifier_applies() {
        let mut s = session();
        s.modifiers_mut().set_hold_mode(true, Some(200_000));
        s.start(0);
        hold(&mut s, 0, 200_000);
        assert_eq!(s.success_count(), 1);
    }

    #[test]
    fn suspension_withdraws_charge() {
        let mut s = session();
        let clock = ManualClock::new();
        s.start(0);
        s.on_attempt(Attempt::pressed(InputSlot::Hold, 100_000));
        s.set_suspended(true, 200_000);
        assert_eq!(s.snapshot().phase, SessionPhase::Suspended);
        assert!(run(&mut s, &clock, 4_000_000).is_empty());

        let events = s.set_suspended(false, 4_000_000);
        assert!(matches!(
            events[..],
            [SessionEvent::BeatOpened {
                beat_index: 0,
                time_us: 4_000_000,
                ..
            }]
        ));
        assert_eq!(s.fail_count(), 0);
    }

    #[test]
    fn autoplay_plays_hold_mode() {
        let params = SessionParams {
            success_target: 4,
            ..Default::default()
        };
        let mut modifiers = Modifiers::new(params);
        modifiers.set_hold_mode(true, None);
        modifiers.set_autoplay(true, 1.0);
        let mut s = HoldSession::new(modifiers)
            .with_autoplay(AutoplayDriver::seeded(21, 1.0))
            .with_feedback(RecordingFeedback::new());
        let clock = ManualClock::new();
        s.start(0);
        let mut t = 0;
        while !s.is_finished() && t < 60_000_000 {
            t += 16_667;
            clock.set_time(t);
            s.update(&clock);
        }
        assert_eq!(s.outcome(), Some(SessionOutcome::Won));
        assert_eq!(s.fail_count(), 0);
        assert_eq!(s.feedback().count(Judgment::StalledHold), 0);
    }

    #[test]
    fn autoplay_switched_on_mid_beat_takes_over() {
        let mut s = session_with(SessionParams {
            success_target: 3,
            ..Default::default()
        });
        let clock = ManualClock::new();
        s.start(0);
        clock.set_time(50_000);
        s.update(&clock);
        s.modifiers_mut().set_autoplay(true, 1.0);

        let mut t = 50_000;
        while !s.is_finished() && t < 30_000_000 {
            t += 16_667;
            clock.set_time(t);
            s.update(&clock);
        }
        assert_eq!(s.outcome(), Some(SessionOutcome::Won));
        assert_eq!(s.fail_count(), 0);
    }
}
