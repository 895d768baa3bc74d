//! Capability availability for one room, rebuilt every cycle.

use std::collections::BTreeMap;

use log::warn;

use crate::control::action::Capability;

/// Mapping capability → available, as reported by the device layer.
///
/// A capability missing from the map and a capability reported as
/// unavailable are both treated as "cannot act", but only the former is
/// "absent" for the purposes of candidate generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySnapshot {
    entries: BTreeMap<Capability, bool>,
}

impl CapabilitySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from string-keyed device state, e.g. `("canHeat", true)`.
    ///
    /// Keys outside the fixed capability set are logged and skipped.
    pub fn from_keys<'a>(entries: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let mut snap = Self::new();
        for (key, available) in entries {
            match key.parse::<Capability>() {
                Ok(cap) => snap.set(cap, available),
                Err(e) => warn!("CapabilitySnapshot: skipping {e}"),
            }
        }
        snap
    }

    /// Builder-style helper for the common "these are available" case.
    pub fn with_available(caps: &[Capability]) -> Self {
        let mut snap = Self::new();
        for cap in caps {
            snap.set(*cap, true);
        }
        snap
    }

    pub fn set(&mut self, capability: Capability, available: bool) {
        self.entries.insert(capability, available);
    }

    pub fn is_available(&self, capability: Capability) -> bool {
        self.entries.get(&capability).copied().unwrap_or(false)
    }
}
