use crate::judgment::Judgment;
use crate::slot::InputSlot;

/// Receiver for judgment transitions, implemented by cosmetic layers
/// (sprites, animations, sounds). The engine produces, never consumes, these.
pub trait FeedbackSink {
    fn on_judgment(&mut self, slot: InputSlot, judgment: Judgment);
}

/// Feedback sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl FeedbackSink for NullFeedback {
    fn on_judgment(&mut self, _slot: InputSlot, _judgment: Judgment) {}
}

/// Feedback sink that records every call, for tests and replays.
#[derive(Debug, Default, Clone)]
pub struct RecordingFeedback {
    pub received: Vec<(InputSlot, Judgment)>,
}

impl RecordingFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded judgments equal to `judgment`.
    pub fn count(&self, judgment: Judgment) -> usize {
        self.received.iter().filter(|(_, j)| *j == judgment).count()
    }
}

impl FeedbackSink for RecordingFeedback {
    fn on_judgment(&mut self, slot: InputSlot, judgment: Judgment) {
        self.received.push((slot, judgment));
    }
}
