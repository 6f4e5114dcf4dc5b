// E2E: a missed key freezes the scene, the challenge is answered, and the
// scene comes back exactly as it was.

use cadence_config::{EngineConfig, Modifiers};
use cadence_core::{SessionLayout, StageEvent};
use cadence_e2e::{Harness, judgments};
use cadence_recovery::RecoveryEvent;
use cadence_types::{InputSlot, Judgment, SessionEvent, SuspensionHost};

fn scene_recovery_harness() -> Harness {
    let config = EngineConfig {
        scene_recovery_on_miss: true,
        ..Default::default()
    };
    Harness::new(&config, SessionLayout::TwoKey, Modifiers::new(config.session))
}

fn exited(event: &StageEvent) -> bool {
    *event == StageEvent::Recovery(RecoveryEvent::Exited)
}

#[test]
fn wrong_key_challenge_restores_scene() {
    let mut h = scene_recovery_harness();
    let session_behavior = h.scene.add_behavior("session", true);
    let spinner = h.scene.add_behavior("spinner", true);
    let door = h.scene.add_behavior("door", false);
    let light = h.scene.add_behavior("light", true);
    h.stage.protect(session_behavior);
    let before = h.scene.enabled_states();
    h.start();

    let events = h.tap_slot(InputSlot::Secondary);
    assert_eq!(judgments(&events), vec![Judgment::WrongKeyMiss]);
    assert!(events.contains(&StageEvent::Recovery(RecoveryEvent::Entered {
        target_key: h.bindings.primary,
        suspended: 2,
    })));
    assert!(h.scene.is_enabled(session_behavior));
    assert!(!h.scene.is_enabled(spinner));
    assert!(!h.scene.is_enabled(door));
    assert!(!h.scene.is_enabled(light));
    assert_eq!(h.scene.time_scale(), 0.2);

    // the other game key breaks the streak
    let primary = h.bindings.primary;
    h.tap_key(primary);
    h.frame();
    let events = h.tap_slot(InputSlot::Secondary);
    assert!(events.contains(&StageEvent::Recovery(RecoveryEvent::Reset)));

    for _ in 0..3 {
        h.tap_key(primary);
        h.frame();
    }
    assert!(h.stage.coordinator().snapshot().completing);
    // session input is not judged during the challenge
    assert!(judgments(&h.log()[1..]).iter().all(|j| *j == Judgment::WrongKeyMiss));

    assert!(h.run_until(100, exited).is_some());
    assert_eq!(h.scene.enabled_states(), before);
    assert_eq!(h.scene.time_scale(), 1.0);
    assert!(!h.stage.coordinator().is_active());
}

#[test]
fn timeout_challenges_missed_slot_and_session_continues() {
    let mut h = scene_recovery_harness();
    h.start();

    // beat 0 expects primary; let it time out
    let entered = h
        .run_until(60, |e| matches!(e, StageEvent::Recovery(RecoveryEvent::Entered { .. })))
        .unwrap();
    assert_eq!(
        entered,
        StageEvent::Recovery(RecoveryEvent::Entered {
            target_key: h.bindings.primary,
            suspended: 0,
        })
    );

    let primary = h.bindings.primary;
    for _ in 0..3 {
        h.tap_key(primary);
        h.frame();
    }
    assert!(h.run_until(100, exited).is_some());

    // the next beat still opens on the game clock
    let opened = h.run_until(200, |e| {
        matches!(
            e,
            StageEvent::Session {
                event: SessionEvent::BeatOpened { beat_index: 1, .. },
                ..
            }
        )
    });
    assert!(opened.is_some());
    assert_eq!(h.snapshot().fail_count, 1);
}

#[test]
fn game_clock_runs_slow_during_challenge() {
    let mut h = scene_recovery_harness();
    h.start();
    h.tap_slot(InputSlot::Secondary);
    assert!(h.stage.coordinator().is_active());

    let before = h.stage.now_us();
    h.frames(10);
    assert_eq!(h.stage.now_us() - before, 20_000);
}
