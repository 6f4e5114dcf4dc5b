use cadence_types::{BehaviorId, SuspensionHost};

#[derive(Debug, Clone)]
struct Behavior {
    id: BehaviorId,
    name: String,
    enabled: bool,
}

/// Minimal scene graph: named behaviors with enabled flags and a global
/// time scale. Used by the simulator and tests in place of an engine scene.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    behaviors: Vec<Behavior>,
    next_id: u64,
    time_scale: f64,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            behaviors: Vec::new(),
            next_id: 1,
            time_scale: 1.0,
        }
    }

    pub fn add_behavior(&mut self, name: impl Into<String>, enabled: bool) -> BehaviorId {
        let id = BehaviorId(self.next_id);
        self.next_id += 1;
        self.behaviors.push(Behavior {
            id,
            name: name.into(),
            enabled,
        });
        id
    }

    pub fn name(&self, id: BehaviorId) -> Option<&str> {
        self.find(id).map(|b| b.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    /// `(id, enabled)` for every behavior, in insertion order.
    pub fn enabled_states(&self) -> Vec<(BehaviorId, bool)> {
        self.behaviors.iter().map(|b| (b.id, b.enabled)).collect()
    }

    fn find(&self, id: BehaviorId) -> Option<&Behavior> {
        self.behaviors.iter().find(|b| b.id == id)
    }
}

impl SuspensionHost for SceneGraph {
    fn suspendable_behaviors(&self) -> Vec<BehaviorId> {
        self.behaviors.iter().map(|b| b.id).collect()
    }

    fn is_enabled(&self, id: BehaviorId) -> bool {
        self.find(id).is_some_and(|b| b.enabled)
    }

    fn set_enabled(&mut self, id: BehaviorId, enabled: bool) {
        match self.behaviors.iter_mut().find(|b| b.id == id) {
            Some(behavior) => behavior.enabled = enabled,
            None => log::warn!("set_enabled on unknown behavior {id:?}"),
        }
    }

    fn time_scale(&self) -> f64 {
        self.time_scale
    }

    fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_named() {
        let mut scene = SceneGraph::new();
        let a = scene.add_behavior("spinner", true);
        let b = scene.add_behavior("enemy", false);
        assert_ne!(a, b);
        assert_eq!(scene.name(a), Some("spinner"));
        assert_eq!(scene.enabled_states(), vec![(a, true), (b, false)]);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn set_enabled_flips_flag() {
        let mut scene = SceneGraph::new();
        let a = scene.add_behavior("spinner", true);
        scene.set_enabled(a, false);
        assert!(!scene.is_enabled(a));
        assert!(!scene.is_enabled(BehaviorId(999)));
    }
}
