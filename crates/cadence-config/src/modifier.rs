//! Modifier set and effective-parameter computation.
//!
//! Modifiers never compound against each other: every setter stores the new
//! modifier value and recomputes the effective parameters from the base
//! values captured when the session was created.

use serde::{Deserialize, Serialize};

use crate::effect::{PendingEffect, PendingEffects};
use crate::params::SessionParams;

const MIN_SPEED_MULTIPLIER: f64 = 0.1;
const MAX_SPEED_MULTIPLIER: f64 = 10.0;

/// Active adjustments on top of a session's base parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ModifierSet {
    /// Extra lives: added to the base fail limit.
    pub fail_limit_delta: i32,
    /// Added to the base judgment window (microseconds).
    pub window_bonus_us: i64,
    /// Divides the base beat interval.
    pub speed_multiplier: f64,
    pub hold_mode_enabled: bool,
    /// Overrides the base hold duration when set.
    pub hold_duration_us: Option<i64>,
    pub autoplay_enabled: bool,
    /// Probability that an autoplay attempt is emitted for a beat.
    pub autoplay_accuracy: f64,
}

impl Default for ModifierSet {
    fn default() -> Self {
        Self {
            fail_limit_delta: 0,
            window_bonus_us: 0,
            speed_multiplier: 1.0,
            hold_mode_enabled: false,
            hold_duration_us: None,
            autoplay_enabled: false,
            autoplay_accuracy: 1.0,
        }
    }
}

impl ModifierSet {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Base parameters, the active modifier set, and the resulting effective
/// parameters of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct Modifiers {
    base: SessionParams,
    set: ModifierSet,
    effective: SessionParams,
}

impl Modifiers {
    pub fn new(base: SessionParams) -> Self {
        Self::with_set(base, ModifierSet::default())
    }

    pub fn with_set(base: SessionParams, set: ModifierSet) -> Self {
        let mut modifiers = Self {
            base,
            set: ModifierSet::default(),
            effective: base,
        };
        // route through the setters so out-of-range values are clamped
        modifiers.set_fail_limit_delta(set.fail_limit_delta);
        modifiers.set_window_bonus_us(set.window_bonus_us);
        modifiers.set_speed_multiplier(set.speed_multiplier);
        modifiers.set_hold_mode(set.hold_mode_enabled, set.hold_duration_us);
        modifiers.set_autoplay(set.autoplay_enabled, set.autoplay_accuracy);
        modifiers
    }

    pub fn base(&self) -> &SessionParams {
        &self.base
    }

    pub fn set(&self) -> &ModifierSet {
        &self.set
    }

    pub fn effective(&self) -> &SessionParams {
        &self.effective
    }

    // --- Setters ---

    /// Set the multiplier. `beat_interval = base_beat_interval / multiplier`.
    pub fn set_speed_multiplier(&mut self, multiplier: f64) {
        let clamped = if multiplier.is_finite() {
            multiplier.clamp(MIN_SPEED_MULTIPLIER, MAX_SPEED_MULTIPLIER)
        } else {
            1.0
        };
        if clamped != multiplier {
            log::warn!("speed multiplier {multiplier} clamped to {clamped}");
        }
        self.set.speed_multiplier = clamped;
        self.recompute();
    }

    pub fn set_fail_limit_delta(&mut self, delta: i32) {
        self.set.fail_limit_delta = delta;
        self.recompute();
    }

    /// Grant extra lives on top of any already granted.
    pub fn add_extra_lives(&mut self, count: i32) {
        self.set_fail_limit_delta(self.set.fail_limit_delta.saturating_add(count));
    }

    pub fn set_window_bonus_us(&mut self, bonus_us: i64) {
        self.set.window_bonus_us = bonus_us;
        self.recompute();
    }

    /// Widen the window on top of any bonus already granted.
    pub fn add_window_bonus_us(&mut self, bonus_us: i64) {
        self.set_window_bonus_us(self.set.window_bonus_us.saturating_add(bonus_us));
    }

    pub fn set_hold_mode(&mut self, enabled: bool, duration_us: Option<i64>) {
        self.set.hold_mode_enabled = enabled;
        self.set.hold_duration_us = duration_us.map(|d| d.max(1_000));
        self.recompute();
    }

    pub fn set_autoplay(&mut self, enabled: bool, accuracy: f64) {
        let clamped = if accuracy.is_finite() {
            accuracy.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if clamped != accuracy {
            log::warn!("autoplay accuracy {accuracy} clamped to {clamped}");
        }
        self.set.autoplay_enabled = enabled;
        self.set.autoplay_accuracy = clamped;
    }

    /// Apply one effect recorded before the session existed.
    pub fn apply_effect(&mut self, effect: &PendingEffect) {
        match *effect {
            PendingEffect::ExtraLives { count } => self.add_extra_lives(count),
            PendingEffect::WindowBonus { bonus_us } => self.add_window_bonus_us(bonus_us),
            PendingEffect::SpeedMultiplier { multiplier } => self.set_speed_multiplier(multiplier),
            PendingEffect::HoldMode { duration_us } => self.set_hold_mode(true, duration_us),
            PendingEffect::Autoplay { accuracy } => self.set_autoplay(true, accuracy),
        }
    }

    /// Drain `pending` and apply every effect in recording order.
    /// Returns the number of effects applied.
    pub fn apply_pending(&mut self, pending: &mut PendingEffects) -> usize {
        let effects = pending.drain();
        for effect in &effects {
            log::debug!("applying pending effect {effect:?}");
            self.apply_effect(effect);
        }
        effects.len()
    }

    /// Restore every parameter to its base value and clear all modifiers.
    pub fn reset(&mut self) {
        self.set = ModifierSet::default();
        self.effective = self.base;
    }

    // --- Effective values ---

    pub fn fail_limit(&self) -> u32 {
        self.effective.fail_limit
    }

    pub fn success_window_us(&self) -> i64 {
        self.effective.success_window_us
    }

    pub fn beat_interval_us(&self) -> i64 {
        self.effective.beat_interval_us
    }

    pub fn hold_mode_enabled(&self) -> bool {
        self.set.hold_mode_enabled
    }

    pub fn hold_duration_us(&self) -> i64 {
        self.effective.hold_duration_us
    }

    pub fn autoplay_enabled(&self) -> bool {
        self.set.autoplay_enabled
    }

    pub fn autoplay_accuracy(&self) -> f64 {
        self.set.autoplay_accuracy
    }

    fn recompute(&mut self) {
        let base = &self.base;
        let fail_limit = (base.fail_limit as i64 + self.set.fail_limit_delta as i64).max(1);
        self.effective.fail_limit = fail_limit.min(u32::MAX as i64) as u32;
        self.effective.success_window_us =
            (base.success_window_us.saturating_add(self.set.window_bonus_us)).max(0);
        self.effective.beat_interval_us =
            (base.beat_interval_us as f64 / self.set.speed_multiplier).round() as i64;
        self.effective.hold_duration_us =
            self.set.hold_duration_us.unwrap_or(base.hold_duration_us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn base() -> SessionParams {
        SessionParams::default()
    }

    #[test]
    fn new_has_base_values() {
        let m = Modifiers::new(base());
        assert_eq!(m.effective(), &base());
        assert!(m.set().is_default());
    }

    #[test]
    fn speed_multiplier_divides_base_interval() {
        let mut m = Modifiers::new(base());
        m.set_speed_multiplier(2.0);
        assert_eq!(m.beat_interval_us(), 500_000);
    }

    #[test]
    fn speed_multiplier_is_idempotent() {
        let mut once = Modifiers::new(base());
        once.set_speed_multiplier(2.0);
        let mut twice = Modifiers::new(base());
        twice.set_speed_multiplier(2.0);
        twice.set_speed_multiplier(2.0);
        assert_eq!(once.beat_interval_us(), twice.beat_interval_us());
    }

    #[test]
    fn speed_multiplier_rejects_non_positive() {
        let mut m = Modifiers::new(base());
        m.set_speed_multiplier(0.0);
        assert_eq!(m.set().speed_multiplier, MIN_SPEED_MULTIPLIER);
        m.set_speed_multiplier(f64::NAN);
        assert_eq!(m.set().speed_multiplier, 1.0);
        assert_eq!(m.beat_interval_us(), 1_000_000);
    }

    #[test]
    fn extra_lives_compose() {
        let mut m = Modifiers::new(base());
        m.add_extra_lives(1);
        m.add_extra_lives(2);
        assert_eq!(m.set().fail_limit_delta, 3);
        assert_eq!(m.fail_limit(), 6);
    }

    #[test]
    fn fail_limit_never_drops_below_one() {
        let mut m = Modifiers::new(base());
        m.set_fail_limit_delta(-10);
        assert_eq!(m.fail_limit(), 1);
    }

    #[test]
    fn window_bonus_is_additive() {
        let mut m = Modifiers::new(base());
        m.set_window_bonus_us(100_000);
        assert_eq!(m.success_window_us(), 500_000);
        m.set_window_bonus_us(100_000);
        assert_eq!(m.success_window_us(), 500_000);
        m.add_window_bonus_us(50_000);
        assert_eq!(m.success_window_us(), 550_000);
    }

    #[test]
    fn hold_mode_overrides_duration() {
        let mut m = Modifiers::new(base());
        m.set_hold_mode(true, Some(800_000));
        assert!(m.hold_mode_enabled());
        assert_eq!(m.hold_duration_us(), 800_000);
        m.set_hold_mode(true, None);
        assert_eq!(m.hold_duration_us(), base().hold_duration_us);
    }

    #[test]
    fn autoplay_accuracy_is_clamped() {
        let mut m = Modifiers::new(base());
        m.set_autoplay(true, 1.7);
        assert!(m.autoplay_enabled());
        assert_eq!(m.autoplay_accuracy(), 1.0);
        m.set_autoplay(true, -0.5);
        assert_eq!(m.autoplay_accuracy(), 0.0);
    }

    #[test]
    fn reset_restores_bases() {
        let mut m = Modifiers::new(base());
        m.set_speed_multiplier(3.0);
        m.add_extra_lives(2);
        m.set_window_bonus_us(40_000);
        m.set_hold_mode(true, Some(700_000));
        m.set_autoplay(true, 0.5);

        m.reset();
        assert_eq!(m.effective(), &base());
        assert!(!m.hold_mode_enabled());
        assert!(!m.autoplay_enabled());
        assert!(m.set().is_default());
    }

    #[test]
    fn apply_pending_drains_store() {
        let mut pending = PendingEffects::new();
        pending.record(PendingEffect::ExtraLives { count: 1 });
        pending.record(PendingEffect::WindowBonus { bonus_us: 100_000 });
        pending.record(PendingEffect::SpeedMultiplier { multiplier: 1.25 });
        pending.record(PendingEffect::Autoplay { accuracy: 0.9 });

        let mut m = Modifiers::new(base());
        assert_eq!(m.apply_pending(&mut pending), 4);
        assert!(pending.is_empty());
        assert_eq!(m.fail_limit(), 4);
        assert_eq!(m.success_window_us(), 500_000);
        assert_eq!(m.beat_interval_us(), 800_000);
        assert!(m.autoplay_enabled());

        // second call has nothing left to apply
        assert_eq!(m.apply_pending(&mut pending), 0);
        assert_eq!(m.fail_limit(), 4);
    }

    #[test]
    fn with_set_matches_setters() {
        let set = ModifierSet {
            fail_limit_delta: 2,
            window_bonus_us: 20_000,
            speed_multiplier: 2.0,
            ..Default::default()
        };
        let m = Modifiers::with_set(base(), set);
        assert_eq!(m.set(), &set);
        assert_eq!(m.fail_limit(), 5);
        assert_eq!(m.success_window_us(), 420_000);
        assert_eq!(m.beat_interval_us(), 500_000);
    }

    proptest! {
        #[test]
        fn any_stored_set_yields_playable_params(
            fail_limit_delta in any::<i32>(),
            window_bonus_us in -1_000_000i64..1_000_000,
            speed_multiplier in prop_oneof![any::<f64>(), Just(f64::NAN), Just(0.0)],
            autoplay_accuracy in any::<f64>(),
        ) {
            let set = ModifierSet {
                fail_limit_delta,
                window_bonus_us,
                speed_multiplier,
                autoplay_enabled: true,
                autoplay_accuracy,
                ..Default::default()
            };
            let m = Modifiers::with_set(base(), set);
            prop_assert!(m.fail_limit() >= 1);
            prop_assert!(m.success_window_us() >= 0);
            prop_assert!(m.beat_interval_us() > 0);
            prop_assert!((0.0..=1.0).contains(&m.autoplay_accuracy()));
        }
    }
}
