/// A timed sub-state: a fixed duration consumed tick by tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining_us: i64,
}

impl Countdown {
    pub fn new(duration_us: i64) -> Self {
        Self {
            remaining_us: duration_us.max(0),
        }
    }

    /// Consume `delta_us`. Returns `true` once the countdown has run out.
    pub fn tick(&mut self, delta_us: i64) -> bool {
        self.remaining_us = (self.remaining_us - delta_us.max(0)).max(0);
        self.is_finished()
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_us == 0
    }

    pub fn remaining(&self) -> i64 {
        self.remaining_us
    }

}
