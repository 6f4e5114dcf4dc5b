use std::collections::HashSet;

use cadence_types::{InputState, KeyCode};

/// Scriptable key state for tests, bots and headless runs.
///
/// Edges (`down`/`up`) stay visible until `end_tick` is called, which the
/// host does after every engine tick.
#[derive(Debug, Default, Clone)]
pub struct VirtualInput {
    held: HashSet<KeyCode>,
    down: HashSet<KeyCode>,
    up: HashSet<KeyCode>,
}

impl VirtualInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Press a key. Pressing an already held key is ignored.
    pub fn press(&mut self, key: KeyCode) {
        if self.held.insert(key) {
            self.down.insert(key);
        }
    }

    /// Release a key. Releasing a key that is not held is ignored.
    pub fn release(&mut self, key: KeyCode) {
        if self.held.remove(&key) {
            self.up.insert(key);
        }
    }

    /// Press and release within the same tick.
    pub fn tap(&mut self, key: KeyCode) {
        self.press(key);
        self.release(key);
    }

    pub fn release_all(&mut self) {
        let held: Vec<KeyCode> = self.held.iter().copied().collect();
        for key in held {
            self.release(key);
        }
    }

    /// Clear this tick's edges. Held keys stay held.
    pub fn end_tick(&mut self) {
        self.down.clear();
        self.up.clear();
    }
}

impl InputState for VirtualInput {
    fn is_key_down_this_tick(&self, key: KeyCode) -> bool {
        self.down.contains(&key)
    }

    fn is_key_held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    fn is_key_up_this_tick(&self, key: KeyCode) -> bool {
        self.up.contains(&key)
    }
}
