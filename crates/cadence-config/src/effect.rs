use serde::{Deserialize, Serialize};

/// A modifier change recorded by an outside collaborator (a shop purchase,
/// an unlock) before the session that will consume it exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PendingEffect {
    /// Raise the fail limit by `count`.
    ExtraLives { count: i32 },
    /// Widen the judgment window by `bonus_us`.
    #[serde(rename_all = "camelCase")]
    WindowBonus { bonus_us: i64 },
    /// Set the speed multiplier.
    SpeedMultiplier { multiplier: f64 },
    /// Switch to hold judgment, optionally overriding the hold duration.
    #[serde(rename_all = "camelCase")]
    HoldMode { duration_us: Option<i64> },
    /// Enable autoplay with the given accuracy.
    Autoplay { accuracy: f64 },
}

/// Queue of effects waiting for the next session start.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingEffects {
    effects: Vec<PendingEffect>,
}

impl PendingEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, effect: PendingEffect) {
        self.effects.push(effect);
    }

    /// Take every recorded effect in recording order, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<PendingEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn effects(&self) -> &[PendingEffect] {
        &self.effects
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
