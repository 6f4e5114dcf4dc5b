use std::cell::Cell;
use std::time::Instant;

/// Abstraction over time sources.
/// Implementations: SystemClock (production), ManualClock (testing).
pub trait Clock {
    /// Current time in microseconds from an arbitrary epoch.
    fn now_us(&self) -> i64;

    /// Real time elapsed during the last frame, unaffected by time scaling.
    fn unscaled_delta_us(&self) -> i64;
}

/// Wall-clock time source using std::time::Instant.
///
/// `tick` must be called once per frame to refresh the frame delta.
pub struct SystemClock {
    start: Instant,
    last_tick_us: i64,
    delta_us: i64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_tick_us: 0,
            delta_us: 0,
        }
    }

    /// Advance to the next frame and record its delta.
    pub fn tick(&mut self) {
        let now = self.now_us();
        self.delta_us = now - self.last_tick_us;
        self.last_tick_us = now;
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_us(&self) -> i64 {
        self.start.elapsed().as_micros() as i64
    }

    fn unscaled_delta_us(&self) -> i64 {
        self.delta_us
    }
}

/// Manually driven clock for deterministic testing.
pub struct ManualClock {
    current_us: Cell<i64>,
    delta_us: Cell<i64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            current_us: Cell::new(0),
            delta_us: Cell::new(0),
        }
    }

    /// Jump to an absolute time. The frame delta becomes the jump distance.
    pub fn set_time(&self, us: i64) {
        self.delta_us.set(us - self.current_us.get());
        self.current_us.set(us);
    }

    pub fn advance(&self, delta_us: i64) {
        self.delta_us.set(delta_us);
        self.current_us.set(self.current_us.get() + delta_us);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> i64 {
        self.current_us.get()
    }

    fn unscaled_delta_us(&self) -> i64 {
        self.delta_us.get()
    }
}
