// Per-frame orchestration: sessions, attempt sources, autoplay and recovery

mod layout;
mod prepare;
mod stage;

pub use layout::{SessionLayout, build_session};
pub use prepare::prepare_modifiers;
pub use stage::{Stage, StageEvent};
