use serde::{Deserialize, Serialize};

/// Raw platform key code, as reported by the host input layer.
pub type KeyCode = i32;

/// Logical input slot a beat can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputSlot {
    /// First key of the two-key alternating layout (even beats).
    Primary,
    /// Second key of the two-key alternating layout (odd beats).
    Secondary,
    /// The only key of the single-key layout.
    Single,
    /// The charge key of the hold layout.
    Hold,
}

impl InputSlot {
    /// Slot expected on `beat_index` in the two-key layout.
    ///
    /// Even beats want `Primary`, odd beats want `Secondary`.
    pub fn alternating(beat_index: u64) -> Self {
        if beat_index % 2 == 0 {
            Self::Primary
        } else {
            Self::Secondary
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Single => "single",
            Self::Hold => "hold",
        }
    }
}

/// Key code bound to each slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct KeyBindings {
    pub primary: KeyCode,
    pub secondary: KeyCode,
    pub single: KeyCode,
    pub hold: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        // F, J, Space, Space
        Self {
            primary: 70,
            secondary: 74,
            single: 32,
            hold: 32,
        }
    }
}

impl KeyBindings {
    /// Key code bound to `slot`.
    pub fn key(&self, slot: InputSlot) -> KeyCode {
        match slot {
            InputSlot::Primary => self.primary,
            InputSlot::Secondary => self.secondary,
            InputSlot::Single => self.single,
            InputSlot::Hold => self.hold,
        }
    }

    /// Every distinct bound key code, in slot order.
    pub fn game_keys(&self) -> Vec<KeyCode> {
        let mut keys = Vec::with_capacity(4);
        for key in [self.primary, self.secondary, self.single, self.hold] {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}
