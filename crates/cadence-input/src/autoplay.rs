//! Autoplay: synthesized correct-key attempts.
//!
//! When a window opens, the driver waits a random fraction of the window and
//! then, with probability `accuracy`, emits the expected key. Otherwise it
//! stays silent and the window times out. It never emits a wrong key.

use cadence_types::{Attempt, InputSlot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Fraction of the window the driver waits before pressing.
const MIN_DELAY_FRACTION: f64 = 0.2;
const MAX_DELAY_FRACTION: f64 = 0.8;

pub struct AutoplayDriver<R: Rng = StdRng> {
    rng: R,
    accuracy: f64,
    stopped: bool,
    pending: Vec<Attempt>,
}

impl AutoplayDriver<StdRng> {
    /// Deterministic driver for reproducible simulations.
    pub fn seeded(seed: u64, accuracy: f64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), accuracy)
    }

    pub fn from_entropy(accuracy: f64) -> Self {
        Self::new(StdRng::from_entropy(), accuracy)
    }
}

impl<R: Rng> AutoplayDriver<R> {
    pub fn new(rng: R, accuracy: f64) -> Self {
        let mut driver = Self {
            rng,
            accuracy: 1.0,
            stopped: false,
            pending: Vec::new(),
        };
        driver.set_accuracy(accuracy);
        driver
    }

    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }

    pub fn set_accuracy(&mut self, accuracy: f64) {
        self.accuracy = if accuracy.is_finite() {
            accuracy.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    /// React to a newly opened window.
    ///
    /// With `hold_duration_us` set, the press is followed by a release once
    /// the hold duration has passed. Returns whether an attempt was scheduled.
    pub fn on_window_opened(
        &mut self,
        now_us: i64,
        window_us: i64,
        slot: InputSlot,
        hold_duration_us: Option<i64>,
    ) -> bool {
        if self.stopped {
            return false;
        }
        self.pending.clear();

        let fraction = self.rng.gen_range(MIN_DELAY_FRACTION..=MAX_DELAY_FRACTION);
        let press_at = now_us + (window_us.max(0) as f64 * fraction).round() as i64;
        if !self.rng.gen_bool(self.accuracy) {
            log::debug!("autoplay skips {} window at {now_us}", slot.name());
            return false;
        }

        self.pending.push(Attempt::pressed(slot, press_at));
        if let Some(duration) = hold_duration_us {
            self.pending.push(Attempt::released(slot, press_at + duration.max(0)));
        }
        true
    }

    /// Attempts whose time has come, in time order.
    pub fn poll(&mut self, now_us: i64) -> Vec<Attempt> {
        if self.pending.iter().all(|a| a.time_us > now_us) {
            return Vec::new();
        }
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|a| a.time_us <= now_us);
        self.pending = pending;
        due
    }

    /// Drop every synthesized attempt that has not fired yet.
    pub fn cancel(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("autoplay cancels {} pending attempt(s)", self.pending.len());
        }
        self.pending.clear();
    }

    /// Cancel and refuse further windows (terminal state).
    pub fn stop(&mut self) {
        self.cancel();
        self.stopped = true;
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
