//! Scene-wide recovery challenge.
//!
//! On a missed key the coordinator freezes every enabled, unprotected
//! behavior, slows global time, and waits for the missed key to be pressed
//! `required_successes` times in a row. A short real-time reaction delay
//! later it restores exactly what it froze. There is no way to lose and no
//! timeout.

use std::collections::BTreeSet;

use cadence_config::RecoveryConfig;
use cadence_timing::Countdown;
use cadence_types::{BehaviorId, InputState, KeyCode, SuspensionHost};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RecoveryEvent {
    Entered { target_key: KeyCode, suspended: usize },
    Progress { current: u32, required: u32 },
    /// A recognized non-target key cleared the streak.
    Reset,
    /// Streak complete; the reaction delay is running.
    Completing,
    Exited,
}

/// Read-only view for UI counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySnapshot {
    pub active: bool,
    pub target_key: Option<KeyCode>,
    pub current_successes: u32,
    pub required_successes: u32,
    pub suspended: Vec<BehaviorId>,
    pub completing: bool,
}

#[derive(Debug, Clone)]
struct ActiveRecovery {
    target_key: KeyCode,
    /// Keys whose press breaks the streak during this challenge.
    recognized_keys: Vec<KeyCode>,
    current: u32,
    suspended: Vec<BehaviorId>,
    previous_time_scale: f64,
    completing: Option<Countdown>,
}

pub struct RecoveryCoordinator {
    config: RecoveryConfig,
    protected: BTreeSet<BehaviorId>,
    /// Streak-breaking keys for challenges entered without an explicit set.
    recognized_keys: Vec<KeyCode>,
    active: Option<ActiveRecovery>,
}

impl RecoveryCoordinator {
    pub fn new(config: RecoveryConfig, recognized_keys: Vec<KeyCode>) -> Self {
        Self {
            config,
            protected: BTreeSet::new(),
            recognized_keys,
            active: None,
        }
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Exclude `id` from suspension (sessions, the coordinator's own host
    /// behavior).
    pub fn protect(&mut self, id: BehaviorId) {
        self.protected.insert(id);
    }

    pub fn is_protected(&self, id: BehaviorId) -> bool {
        self.protected.contains(&id)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn target_key(&self) -> Option<KeyCode> {
        self.active.as_ref().map(|a| a.target_key)
    }

    /// Start a challenge for `missed_key`. No-op while one is active.
    pub fn enter_recovery(
        &mut self,
        missed_key: KeyCode,
        host: &mut dyn SuspensionHost,
    ) -> Vec<RecoveryEvent> {
        let keys = self.recognized_keys.clone();
        self.enter_recovery_with_keys(missed_key, keys, host)
    }

    /// Start a challenge where only `recognized_keys` (the missing
    /// controller's keys) can break the streak.
    pub fn enter_recovery_with_keys(
        &mut self,
        missed_key: KeyCode,
        recognized_keys: Vec<KeyCode>,
        host: &mut dyn SuspensionHost,
    ) -> Vec<RecoveryEvent> {
        if self.active.is_some() {
            log::debug!("recovery already active, ignoring request for key {missed_key}");
            return Vec::new();
        }

        let suspended: Vec<BehaviorId> = host
            .suspendable_behaviors()
            .into_iter()
            .filter(|id| !self.protected.contains(id) && host.is_enabled(*id))
            .collect();
        for id in &suspended {
            host.set_enabled(*id, false);
        }

        let previous_time_scale = host.time_scale();
        host.set_time_scale(self.config.slow_time_scale);

        log::info!(
            "recovery entered: press key {missed_key} x{} ({} behaviors suspended)",
            self.config.required_successes,
            suspended.len()
        );
        let count = suspended.len();
        self.active = Some(ActiveRecovery {
            target_key: missed_key,
            recognized_keys,
            current: 0,
            suspended,
            previous_time_scale,
            completing: None,
        });
        vec![RecoveryEvent::Entered {
            target_key: missed_key,
            suspended: count,
        }]
    }

    /// Per-frame tick with raw input and the real (unscaled) frame delta.
    pub fn update(
        &mut self,
        input: &dyn InputState,
        unscaled_delta_us: i64,
        host: &mut dyn SuspensionHost,
    ) -> Vec<RecoveryEvent> {
        let mut events = Vec::new();
        let required = self.config.required_successes;
        let reaction_delay = self.config.reaction_delay_us;
        let Some(active) = self.active.as_mut() else {
            return events;
        };

        if let Some(countdown) = active.completing.as_mut() {
            if countdown.tick(unscaled_delta_us) {
                events.extend(self.exit_recovery(host));
            }
            return events;
        }

        if input.is_key_down_this_tick(active.target_key) {
            active.current += 1;
            log::debug!("recovery progress {}/{required}", active.current);
            events.push(RecoveryEvent::Progress {
                current: active.current,
                required,
            });
            if active.current >= required {
                events.push(RecoveryEvent::Completing);
                let countdown = Countdown::new(reaction_delay);
                if countdown.is_finished() {
                    events.extend(self.exit_recovery(host));
                } else {
                    active.completing = Some(countdown);
                }
            }
        } else if active
            .recognized_keys
            .iter()
            .any(|&key| key != active.target_key && input.is_key_down_this_tick(key))
        {
            log::debug!("recovery streak reset");
            active.current = 0;
            events.push(RecoveryEvent::Reset);
        }
        events
    }

    /// Restore the suspended behaviors and the previous time scale.
    /// No-op when no challenge is active.
    pub fn exit_recovery(&mut self, host: &mut dyn SuspensionHost) -> Vec<RecoveryEvent> {
        let Some(active) = self.active.take() else {
            return Vec::new();
        };
        for id in &active.suspended {
            host.set_enabled(*id, true);
        }
        host.set_time_scale(active.previous_time_scale);
        log::info!(
            "recovery exited ({} behaviors restored)",
            active.suspended.len()
        );
        vec![RecoveryEvent::Exited]
    }

    pub fn snapshot(&self) -> RecoverySnapshot {
        match &self.active {
            Some(active) => RecoverySnapshot {
                active: true,
                target_key: Some(active.target_key),
                current_successes: active.current,
                required_successes: self.config.required_successes,
                suspended: active.suspended.clone(),
                completing: active.completing.is_some(),
            },
            None => RecoverySnapshot {
                active: false,
                target_key: None,
                current_successes: 0,
                required_successes: self.config.required_successes,
                suspended: Vec::new(),
                completing: false,
            },
        }
    }
}
