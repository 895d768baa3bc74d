//! Night-hold fallback.
//!
//! With the light off and night VPD hold disabled, the room relaxes towards
//! idle: climate actuators are asked to back off instead of chasing the VPD
//! target, and the light and CO2 are left alone.  Pure air-movement
//! actions are not affected.

use log::debug;

use crate::sensors::ControlFlags;

use super::action::{Action, ActionKind, Capability, Priority};

/// Capabilities excluded from normal processing at night.
const NIGHT_EXCLUDED: [Capability; 7] = [
    Capability::Heat,
    Capability::Cool,
    Capability::Humidify,
    Capability::Climate,
    Capability::Dehumidify,
    Capability::Light,
    Capability::Co2,
];

/// Subset of the excluded capabilities that get a synthesised `Reduce`.
const NIGHT_RELAXED: [Capability; 6] = [
    Capability::Heat,
    Capability::Cool,
    Capability::Humidify,
    Capability::Climate,
    Capability::Dehumidify,
    Capability::Co2,
];

/// True when the fallback replaces normal VPD control.
pub fn is_active(flags: &ControlFlags) -> bool {
    !flags.light_on && !flags.night_vpd_hold
}

/// Rewrite `candidates` for the night phase, preserving order.
///
/// Each relaxed capability yields one low-priority `Reduce` at the position
/// of its first candidate; duplicates collapse.  Light actions are dropped.
pub fn apply(candidates: Vec<Action>, flags: &ControlFlags, room: &str) -> Vec<Action> {
    if !is_active(flags) {
        return candidates;
    }

    let mut relaxed: heapless::Vec<Capability, { Capability::COUNT }> = heapless::Vec::new();
    let mut out = Vec::with_capacity(candidates.len());

    for action in candidates {
        let cap = action.capability();
        if !NIGHT_EXCLUDED.contains(&cap) {
            out.push(action);
            continue;
        }
        if NIGHT_RELAXED.contains(&cap) && !relaxed.contains(&cap) {
            // Capacity equals the capability count, so the push cannot fail.
            let _ = relaxed.push(cap);
            out.push(Action::new(
                cap,
                ActionKind::Reduce,
                Priority::Low,
                room,
                format!("Night hold: relaxing {}", cap.display_name()),
            ));
        } else {
            debug!("NightHold: dropping {} {}", action.kind(), cap);
        }
    }
    out
}
