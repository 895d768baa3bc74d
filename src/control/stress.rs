//! Stress classifier.
//!
//! Folds both deviations and the VPD gap into a single stress score,
//! maps it onto a four-level status, and appends urgency-scaled actions
//! for the status.  Appended actions are gated on the capability actually
//! being available so nothing unexecutable is produced.

use serde::{Deserialize, Serialize};

use crate::sensors::{CapabilitySnapshot, SensorSnapshot};

use super::action::{Action, ActionKind, Capability, Priority};
use super::deviation::Deviation;

/// Severity of the current climate stress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VpdStatus {
    Low,
    Medium,
    High,
    Critical,
}

/// Score boundaries between statuses (exclusive lower bounds).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StressThresholds {
    pub medium: f32,
    pub high: f32,
    pub critical: f32,
}

impl Default for StressThresholds {
    fn default() -> Self {
        Self {
            medium: 0.15,
            high: 0.25,
            critical: 0.4,
        }
    }
}

/// Result of one classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StressAssessment {
    pub stress: f32,
    pub status: VpdStatus,
}

/// Minimum deviations before a status appends its actions, and the
/// priority those actions carry.
struct Gate {
    temp: f32,
    hum: f32,
    priority: Priority,
}

const CRITICAL_GATE: Gate = Gate { temp: 2.0, hum: 10.0, priority: Priority::Emergency };
const HIGH_GATE: Gate = Gate { temp: 1.5, hum: 7.0, priority: Priority::High };
const MEDIUM_GATE: Gate = Gate { temp: 1.0, hum: 3.0, priority: Priority::Medium };

/// Score the snapshot and map it onto a status.
pub fn assess(dev: Deviation, snap: &SensorSnapshot, thresholds: &StressThresholds) -> StressAssessment {
    let temp_span = (snap.max_temp - snap.min_temp).max(1.0);
    let hum_span = (snap.max_humidity - snap.min_humidity).max(1.0);

    let temp_factor = dev.temp.abs() / temp_span;
    let hum_factor = dev.hum.abs() / hum_span;
    let vpd_factor = ((snap.vpd - snap.target_vpd).abs() / 2.0).min(1.0);

    let stress = ((temp_factor + hum_factor) / 2.0 + vpd_factor) / 2.0;

    let status = if stress > thresholds.critical {
        VpdStatus::Critical
    } else if stress > thresholds.high {
        VpdStatus::High
    } else if stress > thresholds.medium {
        VpdStatus::Medium
    } else {
        VpdStatus::Low
    };

    StressAssessment { stress, status }
}

/// Extra actions warranted by `status`.
///
/// Critical and High only react to excess heat and moisture; Medium is
/// direction-sensitive and can also call for heating or humidifying.
pub fn contextual_actions(
    status: VpdStatus,
    dev: Deviation,
    caps: &CapabilitySnapshot,
    room: &str,
) -> Vec<Action> {
    let mut out = Vec::new();
    let mut push = |cap: Capability, priority: Priority, why: &str| {
        if caps.is_available(cap) {
            out.push(Action::new(
                cap,
                ActionKind::Increase,
                priority,
                room,
                format!("{status:?} stress: {why}"),
            ));
        }
    };

    match status {
        VpdStatus::Low => {}
        VpdStatus::Critical | VpdStatus::High => {
            let gate = if status == VpdStatus::Critical { &CRITICAL_GATE } else { &HIGH_GATE };
            if dev.temp > gate.temp {
                push(Capability::Cool, gate.priority, "temperature above band");
            }
            if dev.hum > gate.hum {
                push(Capability::Dehumidify, gate.priority, "humidity above band");
            }
        }
        VpdStatus::Medium => {
            let gate = &MEDIUM_GATE;
            if dev.temp.abs() > gate.temp {
                if dev.temp > 0.0 {
                    push(Capability::Cool, gate.priority, "temperature above band");
                } else {
                    push(Capability::Heat, gate.priority, "temperature below band");
                }
            }
            if dev.hum.abs() > gate.hum {
                if dev.hum > 0.0 {
                    push(Capability::Dehumidify, gate.priority, "humidity above band");
                } else {
                    push(Capability::Humidify, gate.priority, "humidity below band");
                }
            }
        }
    }
    out
}
