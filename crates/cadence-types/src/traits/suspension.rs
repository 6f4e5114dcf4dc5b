use serde::{Deserialize, Serialize};

/// Opaque handle for a behavior owned by the host scene graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BehaviorId(pub u64);

/// Scene graph operations the recovery coordinator needs.
///
/// The host decides which behaviors exist and owns their enabled flags and
/// the global time scale; the coordinator only flips them.
pub trait SuspensionHost {
    /// Every behavior that could be suspended, in a stable order.
    fn suspendable_behaviors(&self) -> Vec<BehaviorId>;

    fn is_enabled(&self, id: BehaviorId) -> bool;

    fn set_enabled(&mut self, id: BehaviorId, enabled: bool);

    /// Current global time scale (1.0 = normal speed).
    fn time_scale(&self) -> f64;

    fn set_time_scale(&mut self, scale: f64);
}
