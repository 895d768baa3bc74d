//! Per-capability dampening.
//!
//! Each capability moves through three implicit states, encoded only in
//! its timestamps:
//!
//! ```text
//!   Idle ──register──▶ Active ──cooldown_until──▶ (idle-equivalent)
//!                        │
//!                        └─ same kind before repeat_cooldown_until ─▶ RepeatBlocked
//! ```
//!
//! The store never forgets a record; an emergency clear only pulls
//! `cooldown_until` back to "now".  While the room's
//! [`EmergencyState`] is armed every check passes.

use std::collections::BTreeMap;

use embassy_time::{Duration, Instant};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::control::action::{Action, ActionKind, Capability};
use crate::control::deviation::Deviation;
use crate::safety::{ConditionSet, EmergencyState};

// ═══════════════════════════════════════════════════════════════
//  Configuration
// ═══════════════════════════════════════════════════════════════

/// Base cooldown durations before deviation scaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// Base applied to capabilities without an override (seconds).
    pub default_base_secs: u32,
    /// Per-capability base overrides (seconds), keyed like `"canHeat"`.
    pub per_capability: BTreeMap<Capability, u32>,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            default_base_secs: 120,
            per_capability: BTreeMap::new(),
        }
    }
}

impl CooldownConfig {
    pub fn base(&self, capability: Capability) -> Duration {
        let secs = self
            .per_capability
            .get(&capability)
            .copied()
            .unwrap_or(self.default_base_secs);
        Duration::from_secs(u64::from(secs))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Records
// ═══════════════════════════════════════════════════════════════

/// Timing state for one capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownRecord {
    pub last_kind: ActionKind,
    pub cooldown_until: Instant,
    pub repeat_cooldown_until: Instant,
    pub last_deviation: f32,
}

/// Read-only view of one record for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CooldownStatus {
    pub capability: Capability,
    pub last_kind: ActionKind,
    pub last_deviation: f32,
    pub remaining_ms: u64,
    pub repeat_remaining_ms: u64,
}

/// The deviation a capability acts on.
pub fn relevant_deviation(capability: Capability, dev: Deviation) -> f32 {
    if capability.is_thermal() {
        dev.temp
    } else if capability.is_moisture() {
        dev.hum
    } else {
        dev.dominant()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Store
// ═══════════════════════════════════════════════════════════════

/// Owner of every capability's cooldown record for one room.
pub struct CooldownStore {
    records: BTreeMap<Capability, CooldownRecord>,
    config: CooldownConfig,
    emergency: EmergencyState,
}

impl CooldownStore {
    pub fn new(config: CooldownConfig, emergency: EmergencyState) -> Self {
        Self {
            records: BTreeMap::new(),
            config,
            emergency,
        }
    }

    /// Swap the base durations.  Existing records keep their timestamps.
    pub fn set_config(&mut self, config: CooldownConfig) {
        self.config = config;
    }

    pub fn record(&self, capability: Capability) -> Option<&CooldownRecord> {
        self.records.get(&capability)
    }

    /// Whether `capability` may perform `kind` at `now`.
    ///
    /// Unknown capabilities are idle and always allowed.
    pub fn is_allowed(&self, capability: Capability, kind: ActionKind, now: Instant) -> bool {
        if self.emergency.is_active() {
            return true;
        }
        let Some(rec) = self.records.get(&capability) else {
            return true;
        };
        let repeat_blocked = kind == rec.last_kind && now < rec.repeat_cooldown_until;
        now >= rec.cooldown_until && !repeat_blocked
    }

    /// Cooldown length scaled by how far off target the room is.
    pub fn adaptive_cooldown(&self, capability: Capability, deviation: f32) -> Duration {
        let base = self.config.base(capability);
        let d = deviation.abs();
        let factor = if d > 5.0 {
            1.5
        } else if d > 3.0 {
            1.2
        } else if d < 1.0 {
            0.8
        } else {
            1.0
        };
        scale(base, factor)
    }

    /// Record that `kind` was issued for `capability` at `now`.
    ///
    /// `cooldown_until` never moves backwards through a registration.
    pub fn register(&mut self, capability: Capability, kind: ActionKind, deviation: f32, now: Instant) {
        let cooldown = self.adaptive_cooldown(capability, deviation);
        let until = now + cooldown;
        let repeat_until = now + scale(cooldown, 0.5);

        let rec = self.records.entry(capability).or_insert(CooldownRecord {
            last_kind: kind,
            cooldown_until: until,
            repeat_cooldown_until: repeat_until,
            last_deviation: deviation,
        });
        rec.last_kind = kind;
        rec.cooldown_until = rec.cooldown_until.max(until);
        rec.repeat_cooldown_until = repeat_until;
        rec.last_deviation = deviation;

        debug!(
            "Cooldown: {capability} {kind} dev={deviation:.2} for {}ms",
            cooldown.as_millis()
        );
    }

    /// Split `actions` into (allowed, blocked) at `now`.
    pub fn filter(&self, actions: Vec<Action>, now: Instant) -> (Vec<Action>, Vec<Action>) {
        let (allowed, blocked): (Vec<_>, Vec<_>) = actions
            .into_iter()
            .partition(|a| self.is_allowed(a.capability(), a.kind(), now));
        for a in &blocked {
            debug!("Cooldown: blocked {} {}", a.kind(), a.capability());
        }
        (allowed, blocked)
    }

    /// Release every cooldown at `now` and arm the emergency override.
    ///
    /// Records are kept so the history of what ran last survives.
    pub fn clear_all_for_emergency(&mut self, conditions: ConditionSet, now: Instant) {
        for rec in self.records.values_mut() {
            rec.cooldown_until = now;
        }
        self.emergency.arm(conditions);
        info!(
            "Cooldown: cleared {} record(s) for emergency ({conditions})",
            self.records.len()
        );
    }

    /// Snapshot of every record relative to `now`.
    pub fn status(&self, now: Instant) -> Vec<CooldownStatus> {
        self.records
            .iter()
            .map(|(cap, rec)| CooldownStatus {
                capability: *cap,
                last_kind: rec.last_kind,
                last_deviation: rec.last_deviation,
                remaining_ms: rec.cooldown_until.saturating_duration_since(now).as_millis(),
                repeat_remaining_ms: rec
                    .repeat_cooldown_until
                    .saturating_duration_since(now)
                    .as_millis(),
            })
            .collect()
    }
}

fn scale(d: Duration, factor: f32) -> Duration {
    Duration::from_millis((d.as_millis() as f32 * factor).round() as u64)
}
