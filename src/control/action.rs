//! Action vocabulary shared by every pipeline stage.
//!
//! The capability set is closed: every actuator function the engine can
//! address is a [`Capability`] variant, so dispatch tables are checked at
//! compile time instead of matching strings.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ═══════════════════════════════════════════════════════════════
//  Capability
// ═══════════════════════════════════════════════════════════════

/// A named actuator function that a room may or may not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Capability {
    #[serde(rename = "canExhaust")]
    Exhaust,
    #[serde(rename = "canIntake")]
    Intake,
    #[serde(rename = "canVentilate")]
    Ventilate,
    #[serde(rename = "canHumidify")]
    Humidify,
    #[serde(rename = "canDehumidify")]
    Dehumidify,
    #[serde(rename = "canHeat")]
    Heat,
    #[serde(rename = "canCool")]
    Cool,
    #[serde(rename = "canClimate")]
    Climate,
    #[serde(rename = "canCO2")]
    Co2,
    #[serde(rename = "canLight")]
    Light,
}

impl Capability {
    /// Number of capabilities in the closed set.
    pub const COUNT: usize = 10;

    pub const ALL: [Capability; Self::COUNT] = [
        Self::Exhaust,
        Self::Intake,
        Self::Ventilate,
        Self::Humidify,
        Self::Dehumidify,
        Self::Heat,
        Self::Cool,
        Self::Climate,
        Self::Co2,
        Self::Light,
    ];

    /// Wire key used by capability snapshots, e.g. `"canHeat"`.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Exhaust => "canExhaust",
            Self::Intake => "canIntake",
            Self::Ventilate => "canVentilate",
            Self::Humidify => "canHumidify",
            Self::Dehumidify => "canDehumidify",
            Self::Heat => "canHeat",
            Self::Cool => "canCool",
            Self::Climate => "canClimate",
            Self::Co2 => "canCO2",
            Self::Light => "canLight",
        }
    }

    /// Device-facing name used in dispatch keys and audit records.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Exhaust => "Exhaust",
            Self::Intake => "Intake",
            Self::Ventilate => "Ventilation",
            Self::Humidify => "Humidifier",
            Self::Dehumidify => "Dehumidifier",
            Self::Heat => "Heater",
            Self::Cool => "Cooler",
            Self::Climate => "Climate",
            Self::Co2 => "CO2",
            Self::Light => "Light",
        }
    }

    /// Capabilities that act on air temperature.
    pub const fn is_thermal(self) -> bool {
        matches!(self, Self::Heat | Self::Cool)
    }

    /// Capabilities that act on air moisture.
    pub const fn is_moisture(self) -> bool {
        matches!(self, Self::Humidify | Self::Dehumidify)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Capability {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| EngineError::UnknownCapability(s.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════
//  Kind & priority
// ═══════════════════════════════════════════════════════════════

/// What the engine asks a capability to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Increase,
    Reduce,
    /// Let the device evaluate on its own (climate units).
    Eval,
}

impl ActionKind {
    /// `Increase` and `Reduce` move an actuator; `Eval` does not.
    pub const fn is_directional(self) -> bool {
        matches!(self, Self::Increase | Self::Reduce)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "Increase",
            Self::Reduce => "Reduce",
            Self::Eval => "Eval",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arbitration rank.  Lower discriminant wins a conflict.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Priority {
    Emergency = 0,
    High = 1,
    Medium = 2,
    Low = 3,
    #[default]
    Unset = 4,
}

impl Priority {
    /// Fixed ordinal used by the conflict resolver.
    pub const fn rank(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "emergency",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Unset => "unset",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Action
// ═══════════════════════════════════════════════════════════════

/// One capability request produced during a cycle.
///
/// Built fresh every cycle and never mutated afterwards; stages that need a
/// different action build a new one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    capability: Capability,
    kind: ActionKind,
    priority: Priority,
    message: String,
    room: String,
}

impl Action {
    pub fn new(
        capability: Capability,
        kind: ActionKind,
        priority: Priority,
        room: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            capability,
            kind,
            priority,
            message: message.into(),
            room: room.to_string(),
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn room(&self) -> &str {
        &self.room
    }

    /// String key for event buses that still address devices by name,
    /// e.g. `"Increase Exhaust"`.
    pub fn event_key(&self) -> String {
        format!("{} {}", self.kind, self.capability.display_name())
    }
}
