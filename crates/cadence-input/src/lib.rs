// Input layer: virtual key state, per-layout attempt sources and autoplay

pub mod autoplay;
pub mod source;
pub mod virtual_input;

pub use autoplay::AutoplayDriver;
pub use source::{AttemptSource, HoldSource, SingleKeySource, TwoKeySource};
pub use virtual_input::VirtualInput;
