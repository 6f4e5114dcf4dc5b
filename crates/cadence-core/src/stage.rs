//! Per-frame orchestrator.
//!
//! One `tick` per frame: advance the scaled game clock, feed raw input to
//! the recovery coordinator while a challenge is active, route attempts
//! through each session's attempt source, tick every session, and turn
//! misses into scene-wide recovery requests when configured to.
//!
//! Sessions are never suspended by a challenge. Only the controller that
//! missed answers it: its attempts are withheld from its session until the
//! challenge ends, while every other session keeps playing.

use cadence_config::EngineConfig;
use cadence_input::AttemptSource;
use cadence_judge::{JudgmentSession, SessionSnapshot};
use cadence_recovery::{RecoveryCoordinator, RecoveryEvent};
use cadence_timing::GameClock;
use cadence_types::{
    BehaviorId, Clock, InputState, Judgment, KeyBindings, KeyCode, SessionEvent, SuspensionHost,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StageEvent {
    Session { index: usize, event: SessionEvent },
    Recovery(RecoveryEvent),
}

struct StageEntry {
    session: Box<dyn JudgmentSession>,
    source: Box<dyn AttemptSource>,
}

pub struct Stage {
    clock: GameClock,
    entries: Vec<StageEntry>,
    coordinator: RecoveryCoordinator,
    bindings: KeyBindings,
    scene_recovery_on_miss: bool,
    /// Session whose controller is answering the active challenge.
    challenged: Option<usize>,
    started: bool,
}

impl Stage {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            clock: GameClock::new(),
            entries: Vec::new(),
            coordinator: RecoveryCoordinator::new(config.recovery, config.bindings.game_keys()),
            bindings: config.bindings,
            scene_recovery_on_miss: config.scene_recovery_on_miss,
            challenged: None,
            started: false,
        }
    }

    /// Add a session with its attempt source. Returns the session index.
    /// A session added after `start` starts immediately.
    pub fn add_session(
        &mut self,
        mut session: Box<dyn JudgmentSession>,
        source: Box<dyn AttemptSource>,
    ) -> usize {
        if self.started {
            session.start(self.clock.now_us());
        }
        self.entries.push(StageEntry { session, source });
        self.entries.len() - 1
    }

    /// Keep `id` running through scene-wide recovery.
    pub fn protect(&mut self, id: BehaviorId) {
        self.coordinator.protect(id);
    }

    pub fn start(&mut self) -> Vec<StageEvent> {
        let mut events = Vec::new();
        if self.started {
            return events;
        }
        self.started = true;
        let now = self.clock.now_us();
        for (index, entry) in self.entries.iter_mut().enumerate() {
            for event in entry.session.start(now) {
                events.push(StageEvent::Session { index, event });
            }
        }
        events
    }

    pub fn tick(
        &mut self,
        real_delta_us: i64,
        input: &dyn InputState,
        host: &mut dyn SuspensionHost,
    ) -> Vec<StageEvent> {
        let mut events = Vec::new();
        self.clock.set_scale(host.time_scale());
        self.clock.advance(real_delta_us);
        if !self.started {
            return events;
        }
        let now = self.clock.now_us();

        let withheld = if self.coordinator.is_active() {
            let withheld = self.challenged;
            let recovery = self
                .coordinator
                .update(input, self.clock.unscaled_delta_us(), host);
            events.extend(recovery.into_iter().map(StageEvent::Recovery));
            if !self.coordinator.is_active() {
                self.challenged = None;
            }
            withheld
        } else {
            None
        };

        for (index, entry) in self.entries.iter_mut().enumerate() {
            if withheld == Some(index) {
                continue;
            }
            for attempt in entry.source.poll(input, now) {
                for event in entry.session.on_attempt(attempt) {
                    events.push(StageEvent::Session { index, event });
                }
            }
        }

        for (index, entry) in self.entries.iter_mut().enumerate() {
            for event in entry.session.update(&self.clock) {
                events.push(StageEvent::Session { index, event });
            }
        }

        if self.scene_recovery_on_miss && !self.coordinator.is_active() {
            if let Some((index, key)) = self.missed_key(&events) {
                let source = &self.entries[index].source;
                let keys: Vec<KeyCode> = source
                    .slots()
                    .iter()
                    .filter_map(|slot| source.key_for(*slot))
                    .collect();
                let entered = self.coordinator.enter_recovery_with_keys(key, keys, host);
                if !entered.is_empty() {
                    self.challenged = Some(index);
                }
                events.extend(entered.into_iter().map(StageEvent::Recovery));
            }
        }
        events
    }

    /// Session index and key of the first missed slot among `events`.
    fn missed_key(&self, events: &[StageEvent]) -> Option<(usize, KeyCode)> {
        events.iter().find_map(|event| match event {
            StageEvent::Session {
                index,
                event:
                    SessionEvent::Judged {
                        slot,
                        judgment: Judgment::WrongKeyMiss | Judgment::TimingMiss,
                        ..
                    },
            } => Some((
                *index,
                self.entries[*index]
                    .source
                    .key_for(*slot)
                    .unwrap_or_else(|| self.bindings.key(*slot)),
            )),
            _ => None,
        })
    }

    /// Withdraw or re-open one session's beat.
    pub fn set_session_suspended(&mut self, index: usize, suspended: bool) -> Vec<StageEvent> {
        let now = self.clock.now_us();
        match self.entries.get_mut(index) {
            Some(entry) => entry
                .session
                .set_suspended(suspended, now)
                .into_iter()
                .map(|event| StageEvent::Session { index, event })
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn session(&self, index: usize) -> Option<&dyn JudgmentSession> {
        self.entries.get(index).map(|entry| entry.session.as_ref())
    }

    pub fn session_mut(&mut self, index: usize) -> Option<&mut (dyn JudgmentSession + 'static)> {
        self.entries.get_mut(index).map(|entry| entry.session.as_mut())
    }

    pub fn snapshots(&self) -> Vec<SessionSnapshot> {
        self.entries.iter().map(|entry| entry.session.snapshot()).collect()
    }

    pub fn session_count(&self) -> usize {
        self.entries.len()
    }

    pub fn coordinator(&self) -> &RecoveryCoordinator {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut RecoveryCoordinator {
        &mut self.coordinator
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn now_us(&self) -> i64 {
        self.clock.now_us()
    }

    /// Every session reached a terminal state.
    pub fn is_finished(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|entry| entry.session.is_finished())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SessionLayout, build_session};
    use cadence_config::{Modifiers, SessionParams};
    use cadence_input::VirtualInput;
    use cadence_recovery::SceneGraph;
    use cadence_types::{InputSlot, NullFeedback, SessionOutcome};

    const FRAME: i64 = 10_000;

    fn stage(config: &EngineConfig) -> Stage {
        let mut stage = Stage::new(config);
        let (session, source) = build_session(
            SessionLayout::TwoKey,
            Modifiers::new(config.session),
            &config.bindings,
            None,
            NullFeedback,
        );
        stage.add_session(session, source);
        stage
    }

    fn frame(
        stage: &mut Stage,
        input: &mut VirtualInput,
        scene: &mut SceneGraph,
    ) -> Vec<StageEvent> {
        let events = stage.tick(FRAME, input, scene);
        input.end_tick();
        events
    }

    fn judgments(events: &[StageEvent]) -> Vec<Judgment> {
        events
            .iter()
            .filter_map(|e| match e {
                StageEvent::Session {
                    event: SessionEvent::Judged { judgment, .. },
                    ..
                } => Some(*judgment),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn key_press_is_routed_to_session() {
        let config = EngineConfig::default();
        let mut stage = stage(&config);
        let mut input = VirtualInput::new();
        let mut scene = SceneGraph::new();
        stage.start();

        frame(&mut stage, &mut input, &mut scene);
        input.press(config.bindings.primary);
        let events = frame(&mut stage, &mut input, &mut scene);
        assert_eq!(judgments(&events), vec![Judgment::Success]);
        assert_eq!(stage.snapshots()[0].success_count, 1);
    }

    #[test]
    fn miss_enters_scene_recovery_with_missed_key() {
        let config = EngineConfig {
            scene_recovery_on_miss: true,
            ..Default::default()
        };
        let mut stage = stage(&config);
        let mut input = VirtualInput::new();
        let mut scene = SceneGraph::new();
        let spinner = scene.add_behavior("spinner", true);
        stage.start();

        // wrong key on beat 0 (primary expected)
        input.press(config.bindings.secondary);
        let events = frame(&mut stage, &mut input, &mut scene);
        assert!(events.contains(&StageEvent::Recovery(RecoveryEvent::Entered {
            target_key: config.bindings.primary,
            suspended: 1
        })));
        assert!(!scene.is_enabled(spinner));
        assert_eq!(stage.clock().scale(), 1.0);

        // while recovering, the challenged controller answers the coordinator only
        input.release(config.bindings.secondary);
        for _ in 0..3 {
            input.press(config.bindings.primary);
            let events = frame(&mut stage, &mut input, &mut scene);
            assert!(judgments(&events).iter().all(|j| *j != Judgment::StrayInput));
            input.release(config.bindings.primary);
        }
        assert!(stage.coordinator().snapshot().completing);

        let mut exited = false;
        for _ in 0..100 {
            let events = frame(&mut stage, &mut input, &mut scene);
            if events.contains(&StageEvent::Recovery(RecoveryEvent::Exited)) {
                exited = true;
                break;
            }
        }
        assert!(exited);
        assert!(scene.is_enabled(spinner));
        assert_eq!(scene.time_scale(), 1.0);
    }

    #[test]
    fn recovery_slows_game_clock() {
        let config = EngineConfig {
            scene_recovery_on_miss: true,
            ..Default::default()
        };
        let mut stage = stage(&config);
        let mut input = VirtualInput::new();
        let mut scene = SceneGraph::new();
        stage.start();

        input.press(config.bindings.secondary);
        frame(&mut stage, &mut input, &mut scene);
        let before = stage.now_us();
        frame(&mut stage, &mut input, &mut scene);
        assert_eq!(stage.now_us() - before, 2_000);
    }

    #[test]
    fn other_sessions_play_through_a_challenge() {
        let config = EngineConfig {
            scene_recovery_on_miss: true,
            ..Default::default()
        };
        let mut stage = stage(&config);
        let (session, source) = build_session(
            SessionLayout::SingleKey,
            Modifiers::new(config.session),
            &config.bindings,
            None,
            NullFeedback,
        );
        stage.add_session(session, source);
        let mut input = VirtualInput::new();
        let mut scene = SceneGraph::new();
        stage.start();

        input.press(config.bindings.secondary);
        frame(&mut stage, &mut input, &mut scene);
        input.release(config.bindings.secondary);
        assert!(stage.coordinator().is_active());

        input.press(config.bindings.primary);
        frame(&mut stage, &mut input, &mut scene);
        input.release(config.bindings.primary);
        assert_eq!(stage.coordinator().snapshot().current_successes, 1);

        input.press(config.bindings.single);
        let events = frame(&mut stage, &mut input, &mut scene);
        input.release(config.bindings.single);
        assert!(events.iter().any(|e| matches!(
            e,
            StageEvent::Session {
                index: 1,
                event: SessionEvent::Judged {
                    judgment: Judgment::Success,
                    ..
                },
            }
        )));
        assert!(!events.contains(&StageEvent::Recovery(RecoveryEvent::Reset)));
        assert_eq!(stage.coordinator().snapshot().current_successes, 1);

        for _ in 0..300 {
            frame(&mut stage, &mut input, &mut scene);
        }
        let snapshots = stage.snapshots();
        assert_eq!(snapshots[1].success_count, 1);
        assert_eq!(snapshots[1].fail_count, 0);
        // the challenged controller's presses never reached its session
        assert_eq!(snapshots[0].success_count, 0);
    }

    #[test]
    fn without_scene_recovery_misses_stay_local() {
        let config = EngineConfig::default();
        let mut stage = stage(&config);
        let mut input = VirtualInput::new();
        let mut scene = SceneGraph::new();
        let spinner = scene.add_behavior("spinner", true);
        stage.start();

        input.press(config.bindings.secondary);
        let events = frame(&mut stage, &mut input, &mut scene);
        assert_eq!(judgments(&events), vec![Judgment::WrongKeyMiss]);
        assert!(!stage.coordinator().is_active());
        assert!(scene.is_enabled(spinner));
    }

    #[test]
    fn protected_behaviors_keep_running() {
        let config = EngineConfig {
            scene_recovery_on_miss: true,
            ..Default::default()
        };
        let mut stage = stage(&config);
        let mut scene = SceneGraph::new();
        let session_host = scene.add_behavior("session", true);
        let other = scene.add_behavior("other", true);
        stage.protect(session_host);
        stage.start();

        let mut input = VirtualInput::new();
        let mut ticks = 0;
        while !stage.coordinator().is_active() && ticks < 100 {
            frame(&mut stage, &mut input, &mut scene);
            ticks += 1;
        }
        // the first beat timed out
        assert!(stage.coordinator().is_active());
        assert!(scene.is_enabled(session_host));
        assert!(!scene.is_enabled(other));
    }

    #[test]
    fn autoplay_stage_finishes() {
        let config = EngineConfig {
            session: SessionParams {
                success_target: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        let mut modifiers = Modifiers::new(config.session);
        modifiers.set_autoplay(true, 1.0);
        let mut stage = Stage::new(&config);
        let (session, source) = build_session(
            SessionLayout::SingleKey,
            modifiers,
            &config.bindings,
            Some(5),
            NullFeedback,
        );
        stage.add_session(session, source);
        stage.start();

        let mut input = VirtualInput::new();
        let mut scene = SceneGraph::new();
        let mut frames = 0;
        while !stage.is_finished() && frames < 10_000 {
            frame(&mut stage, &mut input, &mut scene);
            frames += 1;
        }
        let session = stage.session(0).unwrap();
        assert_eq!(session.outcome(), Some(SessionOutcome::Won));
        assert_eq!(session.snapshot().expected, InputSlot::Single);
    }

    #[test]
    fn autoplay_switched_on_after_start() {
        let config = EngineConfig::default();
        let mut stage = Stage::new(&config);
        let (session, source) = build_session(
            SessionLayout::SingleKey,
            Modifiers::new(config.session),
            &config.bindings,
            Some(9),
            NullFeedback,
        );
        stage.add_session(session, source);
        let mut input = VirtualInput::new();
        let mut scene = SceneGraph::new();
        stage.start();
        frame(&mut stage, &mut input, &mut scene);

        if let Some(session) = stage.session_mut(0) {
            session.modifiers_mut().set_autoplay(true, 1.0);
        }
        for _ in 0..500 {
            frame(&mut stage, &mut input, &mut scene);
        }
        let snapshot = &stage.snapshots()[0];
        assert!(snapshot.success_count >= 4);
        assert_eq!(snapshot.fail_count, 0);
    }

    #[test]
    fn session_suspension_through_stage() {
        let config = EngineConfig::default();
        let mut stage = stage(&config);
        let mut input = VirtualInput::new();
        let mut scene = SceneGraph::new();
        stage.start();

        stage.set_session_suspended(0, true);
        for _ in 0..100 {
            frame(&mut stage, &mut input, &mut scene);
        }
        assert_eq!(stage.snapshots()[0].fail_count, 0);
        let events = stage.set_session_suspended(0, false);
        assert_eq!(events.len(), 1);
        assert!(stage.set_session_suspended(7, true).is_empty());
    }
}
