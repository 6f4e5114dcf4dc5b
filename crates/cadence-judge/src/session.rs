use cadence_config::Modifiers;
use cadence_types::{Attempt, Clock, InputSlot, SessionEvent, SessionOutcome};

use crate::snapshot::SessionSnapshot;

/// Common surface of every judgment session, so a stage can drive the
/// two-key, single-key and hold variants the same way.
pub trait JudgmentSession {
    /// Open the first beat. Calling `start` twice is a no-op.
    fn start(&mut self, now_us: i64) -> Vec<SessionEvent>;

    /// Per-frame tick: scheduled beats, autoplay, window timeouts and
    /// timed sub-states.
    fn update(&mut self, clock: &dyn Clock) -> Vec<SessionEvent>;

    /// Judge one attempt. Attempts for slots outside the layout are ignored.
    fn on_attempt(&mut self, attempt: Attempt) -> Vec<SessionEvent>;

    /// Withdraw (`true`) or re-open (`false`) the current beat.
    fn set_suspended(&mut self, suspended: bool, now_us: i64) -> Vec<SessionEvent>;

    fn is_suspended(&self) -> bool;

    fn modifiers(&self) -> &Modifiers;

    /// Modifier changes take effect from the next window check on.
    fn modifiers_mut(&mut self) -> &mut Modifiers;

    fn snapshot(&self) -> SessionSnapshot;

    /// Slots this session recognizes.
    fn slots(&self) -> &[InputSlot];

    fn outcome(&self) -> Option<SessionOutcome>;

    fn is_finished(&self) -> bool {
        self.outcome().is_some()
    }
}
