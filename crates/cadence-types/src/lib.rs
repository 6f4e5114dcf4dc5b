// Shared vocabulary: input slots, attempts, judgments and host boundary traits

mod attempt;
mod judgment;
mod slot;
pub mod traits;

pub use attempt::{Attempt, AttemptKind};
pub use judgment::{Judgment, SessionEvent, SessionOutcome};
pub use slot::{InputSlot, KeyBindings, KeyCode};
pub use traits::clock::{Clock, ManualClock, SystemClock};
pub use traits::feedback::{FeedbackSink, NullFeedback, RecordingFeedback};
pub use traits::input::InputState;
pub use traits::suspension::{BehaviorId, SuspensionHost};

/// Microseconds per second. All engine times are signed microseconds.
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Convert seconds to microseconds, rounding to the nearest microsecond.
pub fn secs_to_us(secs: f64) -> i64 {
    (secs * MICROS_PER_SECOND as f64).round() as i64
}

/// Convert microseconds to seconds.
pub fn us_to_secs(us: i64) -> f64 {
    us as f64 / MICROS_PER_SECOND as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_conversion() {
        assert_eq!(secs_to_us(0.4), 400_000);
        assert_eq!(secs_to_us(1.0), MICROS_PER_SECOND);
        assert_eq!(secs_to_us(-0.25), -250_000);
        assert!((us_to_secs(1_500_000) - 1.5).abs() < f64::EPSILON);
    }
}
