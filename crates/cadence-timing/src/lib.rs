// Timing primitives: judgment windows, scheduled callbacks and timed sub-states

mod countdown;
mod game_clock;
mod timer_queue;
pub mod window;

pub use countdown::Countdown;
pub use game_clock::GameClock;
pub use timer_queue::{TimerHandle, TimerQueue};
pub use window::{TimingWindow, WindowVerdict};
