//! Emergency detector and override state.
//!
//! The detector is stateless: each evaluation inspects the raw snapshot and
//! returns a bitmask of critical conditions, independent of any cooldown
//! bookkeeping.  A non-empty mask arms the room's [`EmergencyState`], which
//! makes every cooldown check pass until the auto-clear timer in
//! [`crate::scheduler`] disarms it.
//!
//! ## Override lifecycle
//!
//! 1. A cycle finds every candidate blocked by cooldowns.
//! 2. The detector evaluates the snapshot.  No conditions → the cycle is a
//!    silent no-op.
//! 3. Conditions present → cooldowns are cleared, the state is armed, and
//!    the single most critical candidate is forced through.
//! 4. The clear timer fires after the hold period and disarms the state,
//!    unless a newer emergency re-armed it first.

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::control::action::{Action, Capability};
use crate::sensors::SensorSnapshot;

// ═══════════════════════════════════════════════════════════════
//  Conditions
// ═══════════════════════════════════════════════════════════════

/// Critical environmental conditions, in descending priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConditionTag {
    CriticalOverheat = 0b0000_0001,
    CriticalCold = 0b0000_0010,
    ImmediateCondensationRisk = 0b0000_0100,
    CriticalHumidity = 0b0000_1000,
    CriticalO2Low = 0b0001_0000,
}

impl ConditionTag {
    /// Every condition, highest priority first.
    pub const PRIORITY_ORDER: [ConditionTag; 5] = [
        Self::CriticalOverheat,
        Self::CriticalCold,
        Self::ImmediateCondensationRisk,
        Self::CriticalHumidity,
        Self::CriticalO2Low,
    ];

    pub const fn mask(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CriticalOverheat => "critical_overheat",
            Self::CriticalCold => "critical_cold",
            Self::ImmediateCondensationRisk => "immediate_condensation_risk",
            Self::CriticalHumidity => "critical_humidity",
            Self::CriticalO2Low => "critical_o2_low",
        }
    }

    /// Capabilities able to counter this condition, best first.
    pub const fn remedies(self) -> &'static [Capability] {
        match self {
            Self::CriticalOverheat => &[Capability::Cool, Capability::Exhaust, Capability::Ventilate],
            Self::CriticalCold => &[Capability::Heat, Capability::Climate],
            Self::ImmediateCondensationRisk => &[
                Capability::Dehumidify,
                Capability::Exhaust,
                Capability::Ventilate,
                Capability::Heat,
            ],
            Self::CriticalHumidity => &[
                Capability::Dehumidify,
                Capability::Exhaust,
                Capability::Ventilate,
            ],
            Self::CriticalO2Low => &[Capability::Exhaust, Capability::Intake, Capability::Ventilate],
        }
    }
}

impl fmt::Display for ConditionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of active conditions, stored as a bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSet(u8);

impl ConditionSet {
    pub const EMPTY: Self = Self(0);

    pub fn insert(&mut self, tag: ConditionTag) {
        self.0 |= tag.mask();
    }

    pub fn contains(self, tag: ConditionTag) -> bool {
        self.0 & tag.mask() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Active conditions in priority order.
    pub fn iter(self) -> impl Iterator<Item = ConditionTag> {
        ConditionTag::PRIORITY_ORDER
            .into_iter()
            .filter(move |tag| self.contains(*tag))
    }
}

impl From<ConditionTag> for ConditionSet {
    fn from(tag: ConditionTag) -> Self {
        Self(tag.mask())
    }
}

impl FromIterator<ConditionTag> for ConditionSet {
    fn from_iter<I: IntoIterator<Item = ConditionTag>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl fmt::Display for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tag in self.iter() {
            if !first {
                f.write_str(",")?;
            }
            f.write_str(tag.as_str())?;
            first = false;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Detector
// ═══════════════════════════════════════════════════════════════

/// Hard limits for the emergency check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyLimits {
    /// Seconds the override stays armed after the last trigger.
    pub hold_secs: u32,
    /// Relative humidity (%) above which the air is critically wet.
    pub critical_humidity: f32,
    /// Dew point within this many °C of air temperature means condensation.
    pub condensation_margin: f32,
    /// Oxygen (%) below which the room needs fresh air.
    pub min_o2: f32,
}

impl Default for EmergencyLimits {
    fn default() -> Self {
        Self {
            hold_secs: 5,
            critical_humidity: 85.0,
            condensation_margin: 0.5,
            min_o2: 19.0,
        }
    }
}

/// Stateless critical-condition check.
#[derive(Debug, Clone, Copy)]
pub struct EmergencyDetector {
    limits: EmergencyLimits,
}

impl EmergencyDetector {
    pub fn new(limits: EmergencyLimits) -> Self {
        Self { limits }
    }

    /// Evaluate the snapshot against every hard limit.
    pub fn evaluate(&self, snap: &SensorSnapshot) -> ConditionSet {
        let mut set = ConditionSet::EMPTY;
        if snap.temperature >= snap.max_temp {
            set.insert(ConditionTag::CriticalOverheat);
        }
        if snap.temperature <= snap.min_temp {
            set.insert(ConditionTag::CriticalCold);
        }
        if snap.dewpoint >= snap.temperature - self.limits.condensation_margin {
            set.insert(ConditionTag::ImmediateCondensationRisk);
        }
        if snap.humidity > self.limits.critical_humidity {
            set.insert(ConditionTag::CriticalHumidity);
        }
        if snap.o2.is_some_and(|o2| o2 < self.limits.min_o2) {
            set.insert(ConditionTag::CriticalO2Low);
        }
        set
    }
}

/// Pick the one action that best counters the most critical condition.
///
/// Conditions are scanned in priority order and, for each, its remedy list
/// in order; the first candidate on a matching capability with a
/// directional kind wins.  With no match, the first candidate is returned.
pub fn select_critical_action(actions: &[Action], conditions: ConditionSet) -> Option<Action> {
    for tag in conditions.iter() {
        for remedy in tag.remedies() {
            if let Some(action) = actions
                .iter()
                .find(|a| a.capability() == *remedy && a.kind().is_directional())
            {
                return Some(action.clone());
            }
        }
    }
    actions.first().cloned()
}

// ═══════════════════════════════════════════════════════════════
//  Override state
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct EmergencyInner {
    active: bool,
    conditions: ConditionSet,
}

/// Shared handle to a room's emergency override flag.
///
/// Clones share the same state; the engine, its cooldown store and the
/// pending clear task each hold one.  Single-threaded by construction.
#[derive(Debug, Clone, Default)]
pub struct EmergencyState {
    inner: Rc<RefCell<EmergencyInner>>,
}

impl EmergencyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.inner.borrow().active
    }

    pub fn conditions(&self) -> ConditionSet {
        self.inner.borrow().conditions
    }

    /// Arm (or re-arm) the override.  Idempotent: re-arming replaces the
    /// condition set rather than accumulating.
    pub fn arm(&self, conditions: ConditionSet) {
        let mut inner = self.inner.borrow_mut();
        if !inner.active {
            warn!("EMERGENCY armed: {conditions}");
        }
        inner.active = true;
        inner.conditions = conditions;
    }

    pub fn clear(&self) {
        let mut inner = self.inner.borrow_mut();
        if inner.active {
            info!("EMERGENCY cleared ({})", inner.conditions);
        }
        inner.active = false;
        inner.conditions = ConditionSet::EMPTY;
    }
}
