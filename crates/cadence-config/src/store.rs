//! Key-prefixed flat key/value persistence for modifiers and pending effects.
//!
//! Every value is stored as a string under `"{prefix}.{field}"`. The store is
//! opaque beyond read/write; malformed values load as defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

use crate::effect::PendingEffects;
use crate::modifier::ModifierSet;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access store file: {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Flat string key/value storage supplied by the host.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: String);

    /// Remove a key. Returns `true` if it existed.
    fn remove(&mut self, key: &str) -> bool;

    /// Every key starting with `prefix`, sorted.
    fn keys_with_prefix(&self, prefix: &str) -> Vec<String>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key).is_some()
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.values
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }
}

/// Store backed by a JSON object file. Writes stay in memory until `flush`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: MemoryStore,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file yields an empty store.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let values = match std::fs::read_to_string(path) {
            Ok(data) => MemoryStore {
                values: serde_json::from_str(&data)?,
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryStore::new(),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Write every value back to the file.
    pub fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.values.values)?;
        std::fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.set(key, value);
    }

    fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key)
    }

    fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.values.keys_with_prefix(prefix)
    }
}

const FAIL_LIMIT_DELTA: &str = "failLimitDelta";
const WINDOW_BONUS_US: &str = "windowBonusUs";
const SPEED_MULTIPLIER: &str = "speedMultiplier";
const HOLD_MODE_ENABLED: &str = "holdModeEnabled";
const HOLD_DURATION_US: &str = "holdDurationUs";
const AUTOPLAY_ENABLED: &str = "autoplayEnabled";
const AUTOPLAY_ACCURACY: &str = "autoplayAccuracy";
const PENDING_EFFECTS: &str = "pendingEffects";

fn key(prefix: &str, field: &str) -> String {
    format!("{prefix}.{field}")
}

fn parse_value<T: FromStr>(
    store: &dyn KeyValueStore,
    prefix: &str,
    field: &str,
) -> Result<Option<T>, StoreError> {
    let key = key(prefix, field);
    match store.get(&key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| StoreError::InvalidValue { key, value }),
    }
}

/// Read one field, falling back to `default` on a missing or malformed value.
fn load_field<T: FromStr>(store: &dyn KeyValueStore, prefix: &str, field: &str, default: T) -> T {
    match parse_value(store, prefix, field) {
        Ok(Some(v)) => v,
        Ok(None) => default,
        Err(e) => {
            log::warn!("{e}; using default");
            default
        }
    }
}

/// Persist every modifier field under `prefix`.
pub fn save_modifiers(store: &mut dyn KeyValueStore, prefix: &str, set: &ModifierSet) {
    store.set(&key(prefix, FAIL_LIMIT_DELTA), set.fail_limit_delta.to_string());
    store.set(&key(prefix, WINDOW_BONUS_US), set.window_bonus_us.to_string());
    store.set(&key(prefix, SPEED_MULTIPLIER), set.speed_multiplier.to_string());
    store.set(&key(prefix, HOLD_MODE_ENABLED), set.hold_mode_enabled.to_string());
    match set.hold_duration_us {
        Some(d) => store.set(&key(prefix, HOLD_DURATION_US), d.to_string()),
        None => {
            store.remove(&key(prefix, HOLD_DURATION_US));
        }
    }
    store.set(&key(prefix, AUTOPLAY_ENABLED), set.autoplay_enabled.to_string());
    store.set(&key(prefix, AUTOPLAY_ACCURACY), set.autoplay_accuracy.to_string());
}

/// Load the modifier set stored under `prefix`. Missing or malformed fields
/// take their default value.
pub fn load_modifiers(store: &dyn KeyValueStore, prefix: &str) -> ModifierSet {
    let d = ModifierSet::default();
    let hold_duration_us = match parse_value::<i64>(store, prefix, HOLD_DURATION_US) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("{e}; using default");
            None
        }
    };
    ModifierSet {
        fail_limit_delta: load_field(store, prefix, FAIL_LIMIT_DELTA, d.fail_limit_delta),
        window_bonus_us: load_field(store, prefix, WINDOW_BONUS_US, d.window_bonus_us),
        speed_multiplier: load_field(store, prefix, SPEED_MULTIPLIER, d.speed_multiplier),
        hold_mode_enabled: load_field(store, prefix, HOLD_MODE_ENABLED, d.hold_mode_enabled),
        hold_duration_us,
        autoplay_enabled: load_field(store, prefix, AUTOPLAY_ENABLED, d.autoplay_enabled),
        autoplay_accuracy: load_field(store, prefix, AUTOPLAY_ACCURACY, d.autoplay_accuracy),
    }
}

/// Persist pending effects under `prefix` as a JSON array.
pub fn save_pending(
    store: &mut dyn KeyValueStore,
    prefix: &str,
    pending: &PendingEffects,
) -> Result<(), StoreError> {
    let key = key(prefix, PENDING_EFFECTS);
    if pending.is_empty() {
        store.remove(&key);
    } else {
        store.set(&key, serde_json::to_string(pending)?);
    }
    Ok(())
}

/// Load pending effects stored under `prefix` without removing them.
pub fn load_pending(store: &dyn KeyValueStore, prefix: &str) -> PendingEffects {
    let key = key(prefix, PENDING_EFFECTS);
    match store.get(&key) {
        None => PendingEffects::new(),
        Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
            log::warn!("discarding malformed pending effects under {key}: {e}");
            PendingEffects::new()
        }),
    }
}

/// Load pending effects stored under `prefix` and clear them from the store.
pub fn take_pending(store: &mut dyn KeyValueStore, prefix: &str) -> PendingEffects {
    let pending = load_pending(store, prefix);
    store.remove(&key(prefix, PENDING_EFFECTS));
    pending
}
