//! Per-layout attempt sources.
//!
//! A source turns raw key edges into [`Attempt`]s for the slots its layout
//! recognizes. Keys outside the layout never produce an attempt, which is
//! how a session tells "wrong key" apart from "unrecognized key".

use cadence_types::{Attempt, InputSlot, InputState, KeyBindings, KeyCode};

pub trait AttemptSource {
    /// Attempts produced by the current tick's key edges.
    fn poll(&mut self, input: &dyn InputState, now_us: i64) -> Vec<Attempt>;

    /// Slots this source can produce.
    fn slots(&self) -> &[InputSlot];

    /// Key bound to `slot`, if this source recognizes it.
    fn key_for(&self, slot: InputSlot) -> Option<KeyCode>;
}

/// Two-key alternating layout: primary and secondary presses.
#[derive(Debug, Clone)]
pub struct TwoKeySource {
    primary: KeyCode,
    secondary: KeyCode,
}

impl TwoKeySource {
    const SLOTS: [InputSlot; 2] = [InputSlot::Primary, InputSlot::Secondary];

    pub fn new(bindings: &KeyBindings) -> Self {
        if bindings.primary == bindings.secondary {
            log::warn!(
                "primary and secondary share key {}; every press judges as primary",
                bindings.primary
            );
        }
        Self {
            primary: bindings.primary,
            secondary: bindings.secondary,
        }
    }
}

impl AttemptSource for TwoKeySource {
    fn poll(&mut self, input: &dyn InputState, now_us: i64) -> Vec<Attempt> {
        if input.is_key_down_this_tick(self.primary) {
            return vec![Attempt::pressed(InputSlot::Primary, now_us)];
        }
        if input.is_key_down_this_tick(self.secondary) {
            return vec![Attempt::pressed(InputSlot::Secondary, now_us)];
        }
        Vec::new()
    }

    fn slots(&self) -> &[InputSlot] {
        &Self::SLOTS
    }

    fn key_for(&self, slot: InputSlot) -> Option<KeyCode> {
        match slot {
            InputSlot::Primary => Some(self.primary),
            InputSlot::Secondary => Some(self.secondary),
            _ => None,
        }
    }
}

/// Single-key layout: every beat wants the same key.
#[derive(Debug, Clone)]
pub struct SingleKeySource {
    key: KeyCode,
}

impl SingleKeySource {
    const SLOTS: [InputSlot; 1] = [InputSlot::Single];

    pub fn new(bindings: &KeyBindings) -> Self {
        Self {
            key: bindings.single,
        }
    }
}

impl AttemptSource for SingleKeySource {
    fn poll(&mut self, input: &dyn InputState, now_us: i64) -> Vec<Attempt> {
        if input.is_key_down_this_tick(self.key) {
            vec![Attempt::pressed(InputSlot::Single, now_us)]
        } else {
            Vec::new()
        }
    }

    fn slots(&self) -> &[InputSlot] {
        &Self::SLOTS
    }

    fn key_for(&self, slot: InputSlot) -> Option<KeyCode> {
        (slot == InputSlot::Single).then_some(self.key)
    }
}

/// Hold layout: press and release edges of the charge key.
#[derive(Debug, Clone)]
pub struct HoldSource {
    key: KeyCode,
}

impl HoldSource {
    const SLOTS: [InputSlot; 1] = [InputSlot::Hold];

    pub fn new(bindings: &KeyBindings) -> Self {
        Self { key: bindings.hold }
    }
}

impl AttemptSource for HoldSource {
    fn poll(&mut self, input: &dyn InputState, now_us: i64) -> Vec<Attempt> {
        let mut attempts = Vec::with_capacity(2);
        if input.is_key_down_this_tick(self.key) {
            attempts.push(Attempt::pressed(InputSlot::Hold, now_us));
        }
        if input.is_key_up_this_tick(self.key) {
            attempts.push(Attempt::released(InputSlot::Hold, now_us));
        }
        attempts
    }

    fn slots(&self) -> &[InputSlot] {
        &Self::SLOTS
    }

    fn key_for(&self, slot: InputSlot) -> Option<KeyCode> {
        (slot == InputSlot::Hold).then_some(self.key)
    }
}
