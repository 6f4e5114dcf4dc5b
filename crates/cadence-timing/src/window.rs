//! Timing window evaluation.
//!
//! A window opens when a beat starts and stays open for `width_us`
//! microseconds, inclusive. Everything here is pure.

/// Verdict for an input (or a tick) against an open window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowVerdict {
    Hit,
    Miss,
}

/// Judge `elapsed_us` against a window of `window_us`.
///
/// Inclusive at the far edge: `elapsed_us == window_us` is still a hit.
/// Negative elapsed time means the window has not opened yet and is reported
/// as `Hit`; callers must not evaluate before the window opens.
pub fn evaluate(elapsed_us: i64, window_us: i64) -> WindowVerdict {
    if elapsed_us <= window_us {
        WindowVerdict::Hit
    } else {
        WindowVerdict::Miss
    }
}

/// Time left before the window closes, clamped at zero.
pub fn remaining(elapsed_us: i64, window_us: i64) -> i64 {
    (window_us - elapsed_us.max(0)).max(0)
}

/// An opened judgment window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingWindow {
    /// Time the window opened (microseconds).
    pub opened_us: i64,
    /// Window width (microseconds).
    pub width_us: i64,
}

impl TimingWindow {
    pub fn new(opened_us: i64, width_us: i64) -> Self {
        Self {
            opened_us,
            width_us,
        }
    }

    pub fn elapsed(&self, now_us: i64) -> i64 {
        now_us - self.opened_us
    }

    pub fn verdict(&self, now_us: i64) -> WindowVerdict {
        evaluate(self.elapsed(now_us), self.width_us)
    }

    pub fn remaining(&self, now_us: i64) -> i64 {
        remaining(self.elapsed(now_us), self.width_us)
    }
}
