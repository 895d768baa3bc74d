//! Action engine: the hexagonal core.
//!
//! [`ActionEngine`] owns one room's cross-cycle state (cooldowns, emergency
//! override, clear timer, history) and runs the pure stages from
//! [`crate::control`] in a fixed order.  All I/O flows through port traits
//! injected at call sites.
//!
//! ```text
//!  SensorReadings ─┐
//!  Capabilities   ─┼─▶ ┌───────────────────────────────┐ ──▶ EventSink
//!  ControlFlags   ─┘   │         ActionEngine          │
//!                      │ stages · cooldowns · override │
//!            Clock ──▶ └──────────────┬────────────────┘
//!                                     │ DispatchBatch (owned)
//!                                     ▼
//!                              CapabilityPort (async)
//! ```
//!
//! Everything up to the returned [`DispatchBatch`] is synchronous, so the
//! engine's state is never held across a suspension point.  Cooldowns are
//! registered before delivery: a handler failure does not refund them.

use embassy_time::Duration;
use log::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::control::action::{Action, ActionKind, Capability, Priority};
use crate::control::deviation::{self, Deviation, StageWeights};
use crate::control::generator::{self, GeneratorFlags, VpdDirection};
use crate::control::{conflict, night_hold, stress};
use crate::cooldown::{self, CooldownStatus, CooldownStore};
use crate::diagnostics::{ActionHistory, ControllerKind, EngineMetrics};
use crate::error::{ConfigError, EngineError};
use crate::safety::{self, ConditionSet, EmergencyDetector, EmergencyState};
use crate::scheduler::ClearTimer;
use crate::sensors::{CapabilitySnapshot, ControlFlags, SensorReadings, SensorSnapshot};

use super::dispatch::{ActionExecutor, DispatchBatch, DispatchReport};
use super::events::EngineEvent;
use super::ports::{Clock, EventSink};

// ───────────────────────────────────────────────────────────────
// ActionEngine
// ───────────────────────────────────────────────────────────────

/// Per-room action engine.
pub struct ActionEngine<C: Clock> {
    room: String,
    config: EngineConfig,
    clock: C,
    cooldowns: CooldownStore,
    emergency: EmergencyState,
    detector: EmergencyDetector,
    clear_timer: ClearTimer,
    executor: ActionExecutor,
    metrics: EngineMetrics,
    /// Deviation from the last completed cycle, used to size manual
    /// adjustment cooldowns.
    last_deviation: Deviation,
}

impl<C: Clock> ActionEngine<C> {
    /// Build an engine for `room`.
    ///
    /// `clear_timer` comes from the host's
    /// [`TimerHost`](crate::scheduler::TimerHost); the host must keep driving
    /// it for the override to expire.
    pub fn new(
        room: &str,
        config: EngineConfig,
        clock: C,
        clear_timer: ClearTimer,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let emergency = clear_timer.state();
        info!("ActionEngine: room '{room}' ready");
        Ok(Self {
            room: room.to_string(),
            cooldowns: CooldownStore::new(config.cooldown.clone(), emergency.clone()),
            detector: EmergencyDetector::new(config.emergency),
            clear_timer,
            emergency,
            config,
            clock,
            executor: ActionExecutor::new(),
            metrics: EngineMetrics::default(),
            last_deviation: Deviation::default(),
        })
    }

    // ── Per-cycle orchestration ───────────────────────────────

    /// Run the synchronous stages for one sensor update.
    ///
    /// Returns the batch to deliver, or `None` when the cycle produced no
    /// actions (missing input, nothing to do, or everything cooling down).
    pub fn run_cycle(
        &mut self,
        readings: &SensorReadings,
        caps: &CapabilitySnapshot,
        flags: &ControlFlags,
        sink: &mut impl EventSink,
    ) -> Option<DispatchBatch> {
        self.metrics.cycles += 1;

        // 1. Validate input
        let snap = match readings.snapshot() {
            Ok(snap) => snap,
            Err(e) => {
                let reason = match e {
                    EngineError::MissingInput(field) => field,
                    _ => "invalid input",
                };
                warn!("ActionEngine: {} | cycle skipped, {e}", self.room);
                self.metrics.cycles_skipped += 1;
                sink.emit(&EngineEvent::CycleSkipped {
                    room: self.room.clone(),
                    reason,
                });
                return None;
            }
        };

        // 2. Deviations
        let dev = deviation::calculate(&snap, self.weights_for(flags));
        self.last_deviation = dev;

        // 3. Candidates, night fallback, buffer zones
        let candidates = self.candidates(&snap, caps, flags);
        let candidates = night_hold::apply(candidates, flags, &self.room);
        let mut candidates = self.config.buffers.filter(candidates, &snap);

        // 4. Stress context
        let assessment = stress::assess(dev, &snap, &self.config.stress);
        debug!(
            "ActionEngine: {} | dev=({:.2},{:.2}) stress={:.3} {:?}",
            self.room, dev.temp, dev.hum, assessment.stress, assessment.status
        );
        let context = stress::contextual_actions(assessment.status, dev, caps, &self.room);
        candidates.extend(night_hold::apply(context, flags, &self.room));

        if candidates.is_empty() {
            debug!("ActionEngine: {} | nothing to do", self.room);
            return None;
        }

        // 5. Dampening, with the emergency override when everything is held
        let now = self.clock.now();
        let (allowed, blocked) = self.cooldowns.filter(candidates, now);
        self.metrics.actions_blocked += blocked.len() as u64;

        let (actions, controller) = if allowed.is_empty() {
            let conditions = self.detector.evaluate(&snap);
            if conditions.is_empty() {
                debug!(
                    "ActionEngine: {} | all {} candidate(s) cooling down",
                    self.room,
                    blocked.len()
                );
                sink.emit(&EngineEvent::ActionsBlocked {
                    room: self.room.clone(),
                    count: blocked.len(),
                });
                return None;
            }
            let critical = self.raise_emergency(conditions, &blocked, &snap, sink)?;
            (vec![critical], ControllerKind::Emergency)
        } else if night_hold::is_active(flags) {
            (allowed, ControllerKind::NightHold)
        } else {
            (allowed, ControllerKind::Vpd)
        };

        // 6. Arbitration and commit
        let actions = conflict::resolve(actions);
        Some(self.commit(actions, controller, dev, sink))
    }

    /// Queue an operator request for one capability.
    ///
    /// Unknown keys are rejected without touching any state.  A request
    /// still inside its cooldown yields `Ok(None)`.
    pub fn request_adjustment(
        &mut self,
        key: &str,
        kind: ActionKind,
        priority: Priority,
        sink: &mut impl EventSink,
    ) -> Result<Option<DispatchBatch>, EngineError> {
        let capability: Capability = match key.parse() {
            Ok(cap) => cap,
            Err(e) => {
                error!("ActionEngine: {} | adjustment rejected, {e}", self.room);
                sink.emit(&EngineEvent::AdjustmentRejected {
                    room: self.room.clone(),
                    key: key.to_string(),
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        let now = self.clock.now();
        if !self.cooldowns.is_allowed(capability, kind, now) {
            info!(
                "ActionEngine: {} | manual {kind} {capability} held by cooldown",
                self.room
            );
            self.metrics.actions_blocked += 1;
            sink.emit(&EngineEvent::ActionsBlocked {
                room: self.room.clone(),
                count: 1,
            });
            return Ok(None);
        }

        let action = Action::new(
            capability,
            kind,
            priority,
            &self.room,
            format!("Manual adjustment: {kind} {}", capability.display_name()),
        );
        let dev = self.last_deviation;
        Ok(Some(self.commit(vec![action], ControllerKind::Manual, dev, sink)))
    }

    /// Fold a delivery outcome into the runtime counters.
    pub fn record_report(&mut self, report: &DispatchReport) {
        self.metrics.dispatch_failures += report.failed.len() as u32;
    }

    // ── Configuration ─────────────────────────────────────────

    /// Swap policy constants.  Cooldown records and the override survive.
    pub fn update_config(&mut self, config: EngineConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.cooldowns.set_config(config.cooldown.clone());
        self.detector = EmergencyDetector::new(config.emergency);
        self.config = config;
        info!("ActionEngine: {} | config updated", self.room);
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> EngineMetrics {
        self.metrics
    }

    pub fn history(&self) -> &ActionHistory {
        self.executor.history()
    }

    pub fn cooldown_status(&self) -> Vec<CooldownStatus> {
        self.cooldowns.status(self.clock.now())
    }

    pub fn emergency_active(&self) -> bool {
        self.emergency.is_active()
    }

    pub fn emergency_conditions(&self) -> ConditionSet {
        self.emergency.conditions()
    }

    pub fn emergency_clear_pending(&self) -> bool {
        self.clear_timer.is_pending()
    }

    // ── Internal helpers ──────────────────────────────────────

    fn weights_for(&self, flags: &ControlFlags) -> StageWeights {
        if flags.own_weights {
            self.config.own_weights
        } else {
            self.config.stage_weights.lookup(&flags.plant_stage)
        }
    }

    fn candidates(
        &self,
        snap: &SensorSnapshot,
        caps: &CapabilitySnapshot,
        flags: &ControlFlags,
    ) -> Vec<Action> {
        let Some(direction) =
            VpdDirection::from_gap(snap.vpd, snap.target_vpd, self.config.vpd_tolerance)
        else {
            return Vec::new();
        };
        let gen_flags = GeneratorFlags {
            vpd_light_control: flags.vpd_light_control,
            co2_control: flags.co2_control,
        };
        generator::generate(direction, caps, gen_flags, &self.room)
    }

    /// Clear cooldowns, (re-)arm the override and its timer, and pick the
    /// one action to force through.
    fn raise_emergency(
        &mut self,
        conditions: ConditionSet,
        blocked: &[Action],
        snap: &SensorSnapshot,
        sink: &mut impl EventSink,
    ) -> Option<Action> {
        let now = self.clock.now();
        warn!(
            "ActionEngine: {} | emergency ({conditions}) at T={:.1} RH={:.1}",
            self.room, snap.temperature, snap.humidity
        );
        self.cooldowns.clear_all_for_emergency(conditions, now);
        self.clear_timer
            .rearm(Duration::from_secs(u64::from(self.config.emergency.hold_secs)));
        self.metrics.emergencies += 1;
        sink.emit(&EngineEvent::EmergencyRaised {
            room: self.room.clone(),
            conditions,
        });

        let critical = safety::select_critical_action(blocked, conditions)?;
        Some(Action::new(
            critical.capability(),
            critical.kind(),
            Priority::Emergency,
            &self.room,
            format!("Emergency ({conditions}): {}", critical.message()),
        ))
    }

    /// Register cooldowns for the final list and hand it to the executor.
    fn commit(
        &mut self,
        actions: Vec<Action>,
        controller: ControllerKind,
        dev: Deviation,
        sink: &mut impl EventSink,
    ) -> DispatchBatch {
        let now = self.clock.now();
        for action in &actions {
            let relevant = cooldown::relevant_deviation(action.capability(), dev);
            self.cooldowns
                .register(action.capability(), action.kind(), relevant, now);
        }
        self.metrics.actions_issued += actions.len() as u64;
        self.executor
            .commit(&self.room, controller, actions, now.as_millis(), sink)
    }
}
