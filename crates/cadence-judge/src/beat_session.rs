//! Two-key / single-key beat session.
//!
//! One beat at a time: a window opens, the expected slot is judged against
//! it, and the next beat is scheduled on the timer queue. A miss pauses the
//! session until `recovery_threshold` consecutive correct inputs arrive.

use cadence_config::Modifiers;
use cadence_input::AutoplayDriver;
use cadence_timing::{TimerHandle, TimerQueue, TimingWindow, WindowVerdict};
use cadence_types::{
    Attempt, Clock, FeedbackSink, InputSlot, Judgment, NullFeedback, SessionEvent, SessionOutcome,
};

use crate::scoreboard::{ScoreResult, Scoreboard};
use crate::session::JudgmentSession;
use crate::snapshot::{SessionPhase, SessionSnapshot};

/// Which slot each beat expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeatLayout {
    /// Primary on even beats, secondary on odd beats.
    Alternating,
    /// The single slot on every beat.
    Single,
}

impl BeatLayout {
    pub fn slots(self) -> &'static [InputSlot] {
        match self {
            Self::Alternating => &[InputSlot::Primary, InputSlot::Secondary],
            Self::Single => &[InputSlot::Single],
        }
    }

    pub fn expected(self, beat_index: u64) -> InputSlot {
        match self {
            Self::Alternating => InputSlot::alternating(beat_index),
            Self::Single => InputSlot::Single,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BeatTimer {
    NextBeat,
}

/// What a suspension took away, restored on resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Withdrawn {
    OpenWindow,
    ScheduledBeat,
}

pub struct BeatSession<F: FeedbackSink = NullFeedback> {
    layout: BeatLayout,
    modifiers: Modifiers,
    expected: InputSlot,
    /// Beats opened so far.
    beat_index: u64,
    board: Scoreboard,
    awaiting: bool,
    beat_start_us: i64,
    started: bool,
    suspended: bool,
    withdrawn: Option<Withdrawn>,
    timers: TimerQueue<BeatTimer>,
    next_beat: Option<TimerHandle>,
    feedback: F,
    autoplay: Option<AutoplayDriver>,
    /// The driver has rolled for the open window.
    autoplay_armed: bool,
}

impl BeatSession<NullFeedback> {
    pub fn new(layout: BeatLayout, modifiers: Modifiers) -> Self {
        Self {
            layout,
            modifiers,
            expected: layout.expected(0),
            beat_index: 0,
            board: Scoreboard::default(),
            awaiting: false,
            beat_start_us: 0,
            started: false,
            suspended: false,
            withdrawn: None,
            timers: TimerQueue::new(),
            next_beat: None,
            feedback: NullFeedback,
            autoplay: None,
            autoplay_armed: false,
        }
    }
}

impl<F: FeedbackSink> BeatSession<F> {
    /// Replace the feedback sink.
    pub fn with_feedback<G: FeedbackSink>(self, feedback: G) -> BeatSession<G> {
        BeatSession {
            layout: self.layout,
            modifiers: self.modifiers,
            expected: self.expected,
            beat_index: self.beat_index,
            board: self.board,
            awaiting: self.awaiting,
            beat_start_us: self.beat_start_us,
            started: self.started,
            suspended: self.suspended,
            withdrawn: self.withdrawn,
            timers: self.timers,
            next_beat: self.next_beat,
            feedback,
            autoplay: self.autoplay,
            autoplay_armed: self.autoplay_armed,
        }
    }

    /// Attach the driver used while the autoplay modifier is enabled.
    /// Without one, an entropy-seeded driver is created the first time the
    /// modifier is seen enabled.
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

    pub fn layout(&self) -> BeatLayout {
        self.layout
    }

    pub fn expected_input(&self) -> InputSlot {
        self.expected
    }

    pub fn beat_index(&self) -> u64 {
        self.beat_index
    }

    pub fn success_count(&self) -> u32 {
        self.board.success_count
    }

    pub fn fail_count(&self) -> u32 {
        self.board.fail_count
    }

    pub fn is_awaiting_input(&self) -> bool {
        self.awaiting
    }

    pub fn is_paused_for_failure(&self) -> bool {
        self.board.paused
    }

    pub fn consecutive_recovery_success(&self) -> u32 {
        self.board.recovery_streak
    }

    /// Open the next beat. No-op while suspended (the beat opens on resume)
    /// or once finished.
    pub fn start_next_beat(&mut self, now_us: i64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.open_next_beat(now_us, &mut events);
        events
    }

    fn window(&self) -> TimingWindow {
        TimingWindow::new(self.beat_start_us, self.modifiers.success_window_us())
    }

    /// Let autoplay answer the open window, once per window. Follows the
    /// modifier, so switching it on mid-beat covers the rest of the window.
    fn arm_autoplay(&mut self, now_us: i64) {
        if !self.modifiers.autoplay_enabled() {
            if self.autoplay_armed {
                self.cancel_autoplay();
            }
            return;
        }
        if !self.awaiting || self.autoplay_armed {
            return;
        }
        let accuracy = self.modifiers.autoplay_accuracy();
        let remaining = self.window().remaining(now_us);
        let expected = self.expected;
        let driver = self
            .autoplay
            .get_or_insert_with(|| AutoplayDriver::from_entropy(accuracy));
        driver.set_accuracy(accuracy);
        driver.on_window_opened(now_us, remaining, expected, None);
        self.autoplay_armed = true;
    }

    fn cancel_autoplay(&mut self) {
        self.autoplay_armed = false;
        if let Some(driver) = self.autoplay.as_mut() {
            driver.cancel();
        }
    }

    fn open_next_beat(&mut self, now_us: i64, events: &mut Vec<SessionEvent>) {
        if self.board.outcome.is_some() {
            return;
        }
        if self.suspended {
            self.withdrawn = Some(Withdrawn::ScheduledBeat);
            return;
        }
        let index = self.beat_index;
        self.expected = self.layout.expected(index);
        self.beat_index += 1;
        self.open_window(now_us, index, events);
    }

    fn open_window(&mut self, now_us: i64, index: u64, events: &mut Vec<SessionEvent>) {
        self.beat_start_us = now_us;
        self.awaiting = true;
        log::debug!("beat {index} opened, expecting {}", self.expected.name());
        events.push(SessionEvent::BeatOpened {
            beat_index: index,
            slot: self.expected,
            time_us: now_us,
        });
        self.arm_autoplay(now_us);
    }

    fn handle_attempt(&mut self, attempt: Attempt, events: &mut Vec<SessionEvent>) {
        if !self.started || self.suspended || self.board.outcome.is_some() {
            return;
        }
        if !attempt.is_press() || !self.layout.slots().contains(&attempt.slot) {
            return;
        }

        // a late attempt first closes the window it missed
        if self.awaiting && self.window().verdict(attempt.time_us) == WindowVerdict::Miss {
            self.judge_failure(Judgment::TimingMiss, attempt.time_us, events);
        }

        if !self.awaiting {
            if self.board.outcome.is_none() {
                self.feedback.on_judgment(attempt.slot, Judgment::StrayInput);
                events.push(SessionEvent::Judged {
                    slot: attempt.slot,
                    judgment: Judgment::StrayInput,
                    time_us: attempt.time_us,
                });
            }
            return;
        }

        if attempt.slot == self.expected {
            self.judge_success(attempt.time_us, events);
        } else {
            self.judge_failure(Judgment::WrongKeyMiss, attempt.time_us, events);
        }
    }

    fn close_window(&mut self, judgment: Judgment, time_us: i64, events: &mut Vec<SessionEvent>) {
        self.awaiting = false;
        self.cancel_autoplay();
        log::debug!(
            "beat {} judged {judgment:?} at {time_us}",
            self.beat_index.saturating_sub(1)
        );
        self.feedback.on_judgment(self.expected, judgment);
        events.push(SessionEvent::Judged {
            slot: self.expected,
            judgment,
            time_us,
        });
    }

    fn judge_success(&mut self, time_us: i64, events: &mut Vec<SessionEvent>) {
        self.close_window(Judgment::Success, time_us, events);
        let params = *self.modifiers.effective();
        let result = self.board.record_success(&params, events);
        self.after_judgment(result, time_us);
    }

    fn judge_failure(&mut self, judgment: Judgment, time_us: i64, events: &mut Vec<SessionEvent>) {
        self.close_window(judgment, time_us, events);
        let params = *self.modifiers.effective();
        let result = self.board.record_failure(&params, events);
        self.after_judgment(result, time_us);
    }

    fn after_judgment(&mut self, result: ScoreResult, time_us: i64) {
        match result {
            ScoreResult::Finished(_) => self.terminate(),
            ScoreResult::Continue | ScoreResult::Resumed => self.schedule_next_beat(time_us),
        }
    }

    fn schedule_next_beat(&mut self, from_us: i64) {
        if let Some(handle) = self.next_beat.take() {
            self.timers.cancel(handle);
        }
        let due = from_us + self.modifiers.effective().next_beat_delay_us();
        self.next_beat = Some(self.timers.schedule(due, BeatTimer::NextBeat));
    }

    fn terminate(&mut self) {
        self.awaiting = false;
        self.timers.clear();
        self.next_beat = None;
        self.withdrawn = None;
        self.autoplay_armed = false;
        if let Some(driver) = self.autoplay.as_mut() {
            driver.stop();
        }
    }
}

impl<F: FeedbackSink> JudgmentSession for BeatSession<F> {
    fn start(&mut self, now_us: i64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.started || self.board.outcome.is_some() {
            return events;
        }
        self.started = true;
        log::info!(
            "beat session started ({:?}, window {}us, interval {}us, fail limit {})",
            self.layout,
            self.modifiers.success_window_us(),
            self.modifiers.beat_interval_us(),
            self.modifiers.fail_limit()
        );
        self.open_next_beat(now_us, &mut events);
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
                BeatTimer::NextBeat => {
                    self.next_beat = None;
                    self.open_next_beat(now, &mut events);
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

        if self.awaiting && self.window().verdict(now) == WindowVerdict::Miss {
            self.judge_failure(Judgment::TimingMiss, now, &mut events);
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
            if self.awaiting {
                self.awaiting = false;
                self.withdrawn = Some(Withdrawn::OpenWindow);
            } else if let Some(handle) = self.next_beat.take() {
                self.timers.cancel(handle);
                self.withdrawn = Some(Withdrawn::ScheduledBeat);
            }
            log::debug!("beat session suspended ({:?} withdrawn)", self.withdrawn);
        } else {
            self.suspended = false;
            log::debug!("beat session resumed");
            match self.withdrawn.take() {
                Some(Withdrawn::OpenWindow) => {
                    let index = self.beat_index.saturating_sub(1);
                    self.open_window(now_us, index, &mut events);
                }
                Some(Withdrawn::ScheduledBeat) => self.open_next_beat(now_us, &mut events),
                None => {}
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
        let phase = if self.board.outcome.is_some() {
            SessionPhase::Finished
        } else if !self.started {
            SessionPhase::Idle
        } else if self.suspended {
            SessionPhase::Suspended
        } else if self.awaiting {
            SessionPhase::AwaitingInput
        } else {
            SessionPhase::BetweenBeats
        };
        SessionSnapshot {
            phase,
            expected: self.expected,
            beat_index: self.beat_index,
            success_count: self.board.success_count,
            fail_count: self.board.fail_count,
            awaiting_input: self.awaiting,
            beat_start_us: self.beat_start_us,
            paused_for_failure: self.board.paused,
            consecutive_recovery_success: self.board.recovery_streak,
            outcome: self.board.outcome,
            params: *self.modifiers.effective(),
        }
    }

    fn slots(&self) -> &[InputSlot] {
        self.layout.slots()
    }

    fn outcome(&self) -> Option<SessionOutcome> {
        self.board.outcome
    }
}
