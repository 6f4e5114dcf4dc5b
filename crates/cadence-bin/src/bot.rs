use cadence_input::VirtualInput;
use cadence_recovery::RecoveryCoordinator;
use cadence_types::{FeedbackSink, InputSlot, Judgment};

/// Answers scene-wide recovery challenges by tapping the target key at a
/// fixed human-ish pace.
pub struct RecoveryBot {
    interval_us: i64,
    since_us: i64,
    pressed: Option<i32>,
}

impl RecoveryBot {
    pub fn new(interval_us: i64) -> Self {
        Self {
            interval_us,
            since_us: 0,
            pressed: None,
        }
    }

    /// Update `input` for the coming frame.
    pub fn drive(&mut self, coordinator: &RecoveryCoordinator, input: &mut VirtualInput, frame_us: i64) {
        if let Some(key) = self.pressed.take() {
            input.release(key);
        }
        let Some(target) = coordinator.target_key() else {
            self.since_us = 0;
            return;
        };
        if coordinator.snapshot().completing {
            return;
        }
        self.since_us += frame_us;
        if self.since_us >= self.interval_us {
            self.since_us = 0;
            input.press(target);
            self.pressed = Some(target);
        }
    }
}

/// Feedback sink that logs every judgment.
#[derive(Debug, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn on_judgment(&mut self, slot: InputSlot, judgment: Judgment) {
        if judgment.is_miss() {
            log::debug!("feedback: {} missed ({judgment:?})", slot.name());
        } else {
            log::trace!("feedback: {} {judgment:?}", slot.name());
        }
    }
}
