use cadence_types::Clock;

/// Scaled game clock.
///
/// Game time advances by the real frame delta multiplied by the current time
/// scale, so a slowed scene still moves forward. The unscaled delta of the
/// last frame is kept for feedback timing that must ignore slow-time.
#[derive(Debug, Clone)]
pub struct GameClock {
    now_us: i64,
    delta_us: i64,
    scale: f64,
}

impl Default for GameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl GameClock {
    pub fn new() -> Self {
        Self {
            now_us: 0,
            delta_us: 0,
            scale: 1.0,
        }
    }

    /// Advance by one frame of `real_delta_us` wall-clock microseconds.
    /// Returns the scaled amount game time moved.
    pub fn advance(&mut self, real_delta_us: i64) -> i64 {
        self.delta_us = real_delta_us.max(0);
        let scaled = (self.delta_us as f64 * self.scale).round() as i64;
        self.now_us += scaled;
        scaled
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the time scale. Negative or non-finite values are rejected.
    pub fn set_scale(&mut self, scale: f64) {
        if !scale.is_finite() || scale < 0.0 {
            log::warn!("ignoring invalid time scale {scale}");
            return;
        }
        self.scale = scale;
    }

}

impl Clock for GameClock {
    fn now_us(&self) -> i64 {
        self.now_us
    }

    fn unscaled_delta_us(&self) -> i64 {
        self.delta_us
    }
}
