// Session parameters, modifiers, pending effects, persistence and engine config

pub mod effect;
pub mod engine_config;
pub mod modifier;
pub mod params;
pub mod store;

pub use effect::{PendingEffect, PendingEffects};
pub use engine_config::{EngineConfig, RecoveryConfig};
pub use modifier::{ModifierSet, Modifiers};
pub use params::{SessionParams, StallPolicy};
pub use store::{
    JsonFileStore, KeyValueStore, MemoryStore, StoreError, load_modifiers, load_pending,
    save_modifiers, save_pending, take_pending,
};
