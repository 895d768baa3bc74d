//! Action history and runtime counters.
//!
//! Keeps the last [`HISTORY_SLOTS`] dispatched batches in a fixed-size ring
//! for downstream analytics.  Nothing here is persisted; consumers pull the
//! ring (or its JSON form) on demand.
//!
//! [`EngineMetrics`] counts what the engine did since start-up, for the
//! host's diagnostics surface.

use serde::{Deserialize, Serialize};

use crate::control::action::{Action, ActionKind, Capability, Priority};

/// Batches kept before the oldest is evicted.
pub const HISTORY_SLOTS: usize = 5;

/// Which path produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerKind {
    /// Regular VPD-driven cycle.
    Vpd,
    /// Night-hold fallback was active for the cycle.
    NightHold,
    /// Forced through by the emergency override.
    Emergency,
    /// Operator adjustment request.
    Manual,
}

/// One action as recorded in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub device: Capability,
    pub action: ActionKind,
    pub priority: Priority,
    pub reason: String,
}

impl From<&Action> for ActionRecord {
    fn from(a: &Action) -> Self {
        Self {
            device: a.capability(),
            action: a.kind(),
            priority: a.priority(),
            reason: a.message().to_string(),
        }
    }
}

/// One dispatched batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecord {
    /// Milliseconds on the engine clock.
    pub timestamp: u64,
    pub room: String,
    pub controller_type: ControllerKind,
    pub actions: Vec<ActionRecord>,
}

impl BatchRecord {
    pub fn new(timestamp: u64, room: &str, controller_type: ControllerKind, actions: &[Action]) -> Self {
        Self {
            timestamp,
            room: room.to_string(),
            controller_type,
            actions: actions.iter().map(ActionRecord::from).collect(),
        }
    }
}

/// Fixed-capacity ring of recent batches, oldest first.
#[derive(Debug, Default)]
pub struct ActionHistory {
    ring: heapless::Deque<BatchRecord, HISTORY_SLOTS>,
}

impl ActionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch, evicting the oldest when full.
    pub fn push(&mut self, record: BatchRecord) {
        if self.ring.is_full() {
            self.ring.pop_front();
        }
        // Room was made above, so this cannot fail.
        let _ = self.ring.push_back(record);
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn latest(&self) -> Option<&BatchRecord> {
        self.ring.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BatchRecord> {
        self.ring.iter()
    }

    /// JSON array of every retained batch, oldest first.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let records: Vec<&BatchRecord> = self.ring.iter().collect();
        serde_json::to_string(&records)
    }
}

/// Counters since engine start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineMetrics {
    pub cycles: u64,
    pub cycles_skipped: u64,
    pub actions_issued: u64,
    pub actions_blocked: u64,
    pub emergencies: u32,
    pub dispatch_failures: u32,
}
