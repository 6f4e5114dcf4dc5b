use cadence_config::{
    KeyValueStore, Modifiers, SessionParams, load_modifiers, save_modifiers, take_pending,
};

/// Build the modifiers for a new session from persisted state.
///
/// Loads the modifier set stored under `prefix`, drains and applies the
/// pending effects recorded since the last session, and saves the result
/// back so the drained effects are not applied twice.
pub fn prepare_modifiers(
    store: &mut dyn KeyValueStore,
    prefix: &str,
    base: SessionParams,
) -> Modifiers {
    let set = load_modifiers(store, prefix);
    let mut modifiers = Modifiers::with_set(base, set);

    let mut pending = take_pending(store, prefix);
    let applied = modifiers.apply_pending(&mut pending);
    save_modifiers(store, prefix, modifiers.set());

    log::info!(
        "prepared modifiers for '{prefix}': {applied} pending effect(s) applied, {:?}",
        modifiers.set()
    );
    modifiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_config::{
        JsonFileStore, MemoryStore, ModifierSet, PendingEffect, PendingEffects, load_pending,
        save_pending,
    };

    #[test]
    fn empty_store_gives_base() {
        let mut store = MemoryStore::new();
        let m = prepare_modifiers(&mut store, "p1", SessionParams::default());
        assert_eq!(m.effective(), &SessionParams::default());
    }

    #[test]
    fn pending_effects_apply_once() {
        let mut store = MemoryStore::new();
        let mut pending = PendingEffects::new();
        pending.record(PendingEffect::ExtraLives { count: 2 });
        pending.record(PendingEffect::WindowBonus { bonus_us: 50_000 });
        save_pending(&mut store, "p1", &pending).unwrap();

        let m = prepare_modifiers(&mut store, "p1", SessionParams::default());
        assert_eq!(m.fail_limit(), 5);
        assert_eq!(m.success_window_us(), 450_000);
        assert!(load_pending(&store, "p1").is_empty());

        // the next session sees the persisted set, not the effects again
        let m = prepare_modifiers(&mut store, "p1", SessionParams::default());
        assert_eq!(m.fail_limit(), 5);
        assert_eq!(m.success_window_us(), 450_000);
    }

    #[test]
    fn prefixes_are_isolated() {
        let mut store = MemoryStore::new();
        let mut pending = PendingEffects::new();
        pending.record(PendingEffect::SpeedMultiplier { multiplier: 2.0 });
        save_pending(&mut store, "p1", &pending).unwrap();

        let other = prepare_modifiers(&mut store, "p2", SessionParams::default());
        assert!(other.set().is_default());
        let mine = prepare_modifiers(&mut store, "p1", SessionParams::default());
        assert_eq!(mine.beat_interval_us(), 500_000);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            let set = ModifierSet {
                fail_limit_delta: 1,
                window_bonus_us: 25_000,
                speed_multiplier: 1.5,
                ..Default::default()
            };
            save_modifiers(&mut store, "p1", &set);
            store.flush().unwrap();
        }
        let mut store = JsonFileStore::open(&path).unwrap();
        let m = prepare_modifiers(&mut store, "p1", SessionParams::default());
        assert_eq!(m.fail_limit(), 4);
        assert_eq!(m.success_window_us(), 425_000);
        assert_eq!(m.beat_interval_us(), 666_667);
    }
}
