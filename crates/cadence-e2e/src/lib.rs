// E2E simulation helpers shared by the integration tests under tests/.
//
// Drives the full pipeline frame by frame:
// store -> modifiers -> session + attempt source -> Stage -> scene recovery

use cadence_config::{EngineConfig, Modifiers};
use cadence_core::{SessionLayout, Stage, StageEvent, build_session};
use cadence_input::VirtualInput;
use cadence_judge::SessionSnapshot;
use cadence_recovery::SceneGraph;
use cadence_types::{InputSlot, Judgment, KeyBindings, KeyCode, NullFeedback, SessionEvent};

/// Frame step for simulation (10ms).
pub const FRAME_STEP: i64 = 10_000;

pub struct Harness {
    pub stage: Stage,
    pub scene: SceneGraph,
    pub input: VirtualInput,
    pub bindings: KeyBindings,
    log: Vec<StageEvent>,
}

impl Harness {
    /// One session built from `config` and `modifiers`, on an empty scene.
    pub fn new(config: &EngineConfig, layout: SessionLayout, modifiers: Modifiers) -> Self {
        let mut stage = Stage::new(config);
        let (session, source) = build_session(
            layout,
            modifiers,
            &config.bindings,
            config.autoplay_seed,
            NullFeedback,
        );
        stage.add_session(session, source);
        Self {
            stage,
            scene: SceneGraph::new(),
            input: VirtualInput::new(),
            bindings: config.bindings,
            log: Vec::new(),
        }
    }

    /// Add another session sharing the stage and the scene. Returns its index.
    pub fn add_session(
        &mut self,
        config: &EngineConfig,
        layout: SessionLayout,
        modifiers: Modifiers,
    ) -> usize {
        let (session, source) = build_session(
            layout,
            modifiers,
            &config.bindings,
            config.autoplay_seed,
            NullFeedback,
        );
        self.stage.add_session(session, source);
        self.stage.session_count() - 1
    }

    pub fn start(&mut self) -> Vec<StageEvent> {
        let events = self.stage.start();
        self.log.extend(events.iter().cloned());
        events
    }

    /// Advance one frame with the current input.
    pub fn frame(&mut self) -> Vec<StageEvent> {
        let events = self.stage.tick(FRAME_STEP, &self.input, &mut self.scene);
        self.input.end_tick();
        self.log.extend(events.iter().cloned());
        events
    }

    pub fn frames(&mut self, n: usize) -> Vec<StageEvent> {
        let mut events = Vec::new();
        for _ in 0..n {
            events.extend(self.frame());
        }
        events
    }

    /// Press `key` for exactly one frame.
    pub fn tap_key(&mut self, key: KeyCode) -> Vec<StageEvent> {
        self.input.press(key);
        let events = self.frame();
        self.input.release(key);
        events
    }

    pub fn tap_slot(&mut self, slot: InputSlot) -> Vec<StageEvent> {
        self.tap_key(self.bindings.key(slot))
    }

    /// Run frames until `pred` matches an event. Returns the match.
    pub fn run_until(
        &mut self,
        max_frames: usize,
        pred: impl Fn(&StageEvent) -> bool,
    ) -> Option<StageEvent> {
        for _ in 0..max_frames {
            if let Some(event) = self.frame().into_iter().find(|e| pred(e)) {
                return Some(event);
            }
        }
        None
    }

    /// Play one beat per entry of `plan`: `true` taps the expected slot on
    /// the first frame after the window opens, `false` lets it time out.
    /// Stops once every planned beat is judged or the session finishes.
    pub fn play_script(&mut self, plan: &[bool], max_frames: usize) {
        let mut answered = 0u64;
        for _ in 0..max_frames {
            let snapshot = self.snapshot();
            if snapshot.outcome.is_some() {
                return;
            }
            if snapshot.awaiting_input && snapshot.beat_index > answered {
                answered = snapshot.beat_index;
                let hit = plan.get(answered as usize - 1).copied().unwrap_or(true);
                if hit {
                    self.tap_slot(snapshot.expected);
                    continue;
                }
            } else if answered as usize >= plan.len() && !snapshot.awaiting_input {
                return;
            }
            self.frame();
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_of(0)
    }

    pub fn snapshot_of(&self, index: usize) -> SessionSnapshot {
        self.stage.snapshots().remove(index)
    }

    /// Every event since construction.
    pub fn log(&self) -> &[StageEvent] {
        &self.log
    }
}

/// Judgments among `events`, in order.
pub fn judgments(events: &[StageEvent]) -> Vec<Judgment> {
    events
        .iter()
        .filter_map(|event| match event {
            StageEvent::Session {
                event: SessionEvent::Judged { judgment, .. },
                ..
            } => Some(*judgment),
            _ => None,
        })
        .collect()
}

/// Judgments of session `index` among `events`, in order.
pub fn judgments_of(events: &[StageEvent], index: usize) -> Vec<Judgment> {
    events
        .iter()
        .filter_map(|event| match event {
            StageEvent::Session {
                index: i,
                event: SessionEvent::Judged { judgment, .. },
            } if *i == index => Some(*judgment),
            _ => None,
        })
        .collect()
}

/// `(judgment, time_us)` pairs among `events`.
pub fn timed_judgments(events: &[StageEvent]) -> Vec<(Judgment, i64)> {
    events
        .iter()
        .filter_map(|event| match event {
            StageEvent::Session {
                event: SessionEvent::Judged {
                    judgment, time_us, ..
                },
                ..
            } => Some((*judgment, *time_us)),
            _ => None,
        })
        .collect()
}
