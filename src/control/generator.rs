//! Directional action generation.
//!
//! Given which way VPD has to move, every available capability gets the
//! counter-action that pushes VPD in that direction.  The tables are fixed;
//! the reduce table mirrors the increase table.

use crate::sensors::CapabilitySnapshot;

use super::action::{Action, ActionKind, Capability, Priority};

/// Which way the target metric has to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VpdDirection {
    Increase,
    Reduce,
}

impl VpdDirection {
    /// Pick a direction from the gap between current and target VPD.
    /// Returns `None` while VPD sits within `tolerance` of the target.
    pub fn from_gap(vpd: f32, target: f32, tolerance: f32) -> Option<Self> {
        if vpd < target - tolerance {
            Some(Self::Increase)
        } else if vpd > target + tolerance {
            Some(Self::Reduce)
        } else {
            None
        }
    }

    fn table(self) -> &'static [(Capability, ActionKind)] {
        match self {
            Self::Increase => &RAISE_VPD,
            Self::Reduce => &LOWER_VPD,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Reduce => "reduce",
        }
    }
}

const RAISE_VPD: [(Capability, ActionKind); Capability::COUNT] = [
    (Capability::Exhaust, ActionKind::Increase),
    (Capability::Intake, ActionKind::Reduce),
    (Capability::Ventilate, ActionKind::Increase),
    (Capability::Humidify, ActionKind::Reduce),
    (Capability::Dehumidify, ActionKind::Increase),
    (Capability::Heat, ActionKind::Increase),
    (Capability::Cool, ActionKind::Reduce),
    (Capability::Climate, ActionKind::Eval),
    (Capability::Light, ActionKind::Increase),
    (Capability::Co2, ActionKind::Increase),
];

const LOWER_VPD: [(Capability, ActionKind); Capability::COUNT] = [
    (Capability::Exhaust, ActionKind::Reduce),
    (Capability::Intake, ActionKind::Increase),
    (Capability::Ventilate, ActionKind::Reduce),
    (Capability::Humidify, ActionKind::Increase),
    (Capability::Dehumidify, ActionKind::Reduce),
    (Capability::Heat, ActionKind::Reduce),
    (Capability::Cool, ActionKind::Increase),
    (Capability::Climate, ActionKind::Eval),
    (Capability::Light, ActionKind::Reduce),
    (Capability::Co2, ActionKind::Reduce),
];

/// Opt-in actuators that only join VPD control when enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorFlags {
    pub vpd_light_control: bool,
    pub co2_control: bool,
}

/// Produce the candidate list for `direction`.
///
/// Output order follows the fixed table; each capability appears at most
/// once and only if the snapshot reports it available.
pub fn generate(
    direction: VpdDirection,
    caps: &CapabilitySnapshot,
    flags: GeneratorFlags,
    room: &str,
) -> Vec<Action> {
    direction
        .table()
        .iter()
        .filter(|(cap, _)| caps.is_available(*cap))
        .filter(|(cap, _)| match cap {
            Capability::Light => flags.vpd_light_control,
            Capability::Co2 => flags.co2_control,
            _ => true,
        })
        .map(|(cap, kind)| {
            Action::new(
                *cap,
                *kind,
                Priority::Medium,
                room,
                format!("VPD {}: {} {}", direction.as_str(), kind, cap.display_name()),
            )
        })
        .collect()
}
