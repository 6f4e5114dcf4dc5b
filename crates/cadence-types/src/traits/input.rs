use crate::slot::KeyCode;

/// Per-tick view of the platform input layer.
///
/// "This tick" edges are valid for exactly one frame; the host refreshes them
/// before the engine is ticked.
pub trait InputState {
    /// The key went down during the current tick.
    fn is_key_down_this_tick(&self, key: KeyCode) -> bool;

    /// The key is currently held (including the tick it went down).
    fn is_key_held(&self, key: KeyCode) -> bool;

    /// The key went up during the current tick.
    fn is_key_up_this_tick(&self, key: KeyCode) -> bool;
}
