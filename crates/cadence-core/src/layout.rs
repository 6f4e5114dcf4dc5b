use cadence_config::Modifiers;
use cadence_input::{AttemptSource, AutoplayDriver, HoldSource, SingleKeySource, TwoKeySource};
use cadence_judge::{BeatLayout, BeatSession, HoldSession, JudgmentSession};
use cadence_types::{FeedbackSink, KeyBindings};

/// Input layout of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionLayout {
    #[default]
    TwoKey,
    SingleKey,
    Hold,
}

/// Build a session and its attempt source.
///
/// The hold-mode modifier overrides `layout`. Every session gets an autoplay
/// driver, seeded from `autoplay_seed` when one is given, so the autoplay
/// modifier can be switched on at any point of the session.
pub fn build_session<F: FeedbackSink + 'static>(
    layout: SessionLayout,
    modifiers: Modifiers,
    bindings: &KeyBindings,
    autoplay_seed: Option<u64>,
    feedback: F,
) -> (Box<dyn JudgmentSession>, Box<dyn AttemptSource>) {
    let layout = if modifiers.hold_mode_enabled() {
        SessionLayout::Hold
    } else {
        layout
    };
    let accuracy = modifiers.autoplay_accuracy();
    let autoplay = match autoplay_seed {
        Some(seed) => AutoplayDriver::seeded(seed, accuracy),
        None => AutoplayDriver::from_entropy(accuracy),
    };
    log::debug!(
        "building {layout:?} session (autoplay: {})",
        modifiers.autoplay_enabled()
    );

    match layout {
        SessionLayout::TwoKey | SessionLayout::SingleKey => {
            let (beat_layout, source): (BeatLayout, Box<dyn AttemptSource>) =
                if layout == SessionLayout::TwoKey {
                    (BeatLayout::Alternating, Box::new(TwoKeySource::new(bindings)))
                } else {
                    (BeatLayout::Single, Box::new(SingleKeySource::new(bindings)))
                };
            let mut session = BeatSession::new(beat_layout, modifiers).with_feedback(feedback);
            session.set_autoplay_driver(Some(autoplay));
            (Box::new(session), source)
        }
        SessionLayout::Hold => {
            let mut session = HoldSession::new(modifiers).with_feedback(feedback);
            session.set_autoplay_driver(Some(autoplay));
            (Box::new(session), Box::new(HoldSource::new(bindings)))
        }
    }
}
