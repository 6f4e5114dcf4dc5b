// Judgment sessions: beat windows, pause-for-failure and the hold variant

mod beat_session;
mod hold_session;
mod scoreboard;
mod session;
mod snapshot;

pub use beat_session::{BeatLayout, BeatSession};
pub use hold_session::HoldSession;
pub use session::JudgmentSession;
pub use snapshot::{SessionPhase, SessionSnapshot};
