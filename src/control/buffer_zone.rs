//! Buffer-zone filter.
//!
//! Suppresses actions that would drive an actuator towards a hard limit
//! the measured value is already hovering next to.  Only removes actions;
//! `Reduce` and `Eval` actions always pass.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::sensors::SensorSnapshot;

use super::action::{Action, ActionKind, Capability};

/// Safety margins inside the configured band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BufferZones {
    /// °C below `max_temp` where heating stops being requested.
    pub heater: f32,
    /// °C above `min_temp` where cooling stops being requested.
    pub cooler: f32,
    /// % below `max_humidity` where humidifying stops being requested.
    pub humidifier: f32,
    /// % above `min_humidity` where dehumidifying stops being requested.
    pub dehumidifier: f32,
}

impl Default for BufferZones {
    fn default() -> Self {
        Self {
            heater: 2.0,
            cooler: 2.0,
            humidifier: 5.0,
            dehumidifier: 5.0,
        }
    }
}

impl BufferZones {
    /// True if `action` would push into an oscillation-prone zone.
    pub fn blocks(&self, action: &Action, snap: &SensorSnapshot) -> bool {
        if action.kind() != ActionKind::Increase {
            return false;
        }
        match action.capability() {
            Capability::Heat => snap.temperature >= snap.max_temp - self.heater,
            Capability::Cool => snap.temperature <= snap.min_temp + self.cooler,
            Capability::Humidify => snap.humidity >= snap.max_humidity - self.humidifier,
            Capability::Dehumidify => snap.humidity <= snap.min_humidity + self.dehumidifier,
            _ => false,
        }
    }

    /// Keep every action the zones do not block, in input order.
    pub fn filter(&self, actions: Vec<Action>, snap: &SensorSnapshot) -> Vec<Action> {
        actions
            .into_iter()
            .filter(|a| {
                let blocked = self.blocks(a, snap);
                if blocked {
                    debug!(
                        "BufferZone: dropping {} {} (T={:.1} RH={:.1})",
                        a.kind(),
                        a.capability(),
                        snap.temperature,
                        snap.humidity
                    );
                }
                !blocked
            })
            .collect()
    }
}
