// Scene-wide recovery challenge and an in-memory scene graph host

mod coordinator;
mod scene;

pub use coordinator::{RecoveryCoordinator, RecoveryEvent, RecoverySnapshot};
pub use scene::SceneGraph;
