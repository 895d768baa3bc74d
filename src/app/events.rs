//! Outbound engine events.
//!
//! The [`ActionEngine`](super::service::ActionEngine) emits these through
//! the [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them: log lines, a fan-out channel, an
//! analytics bus.

use crate::control::action::{Action, ActionKind, Capability, Priority};
use crate::diagnostics::BatchRecord;
use crate::error::DispatchError;
use crate::safety::ConditionSet;

/// Structured events emitted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// One audit line per action in a committed batch.
    ActionIssued(ActionAudit),

    /// The aggregated record appended to history.
    BatchRecorded(BatchRecord),

    /// The emergency override was armed (or re-armed) for a room.
    EmergencyRaised { room: String, conditions: ConditionSet },

    /// Every candidate was held back by cooldowns and no emergency applied.
    ActionsBlocked { room: String, count: usize },

    /// A capability handler failed; the rest of the batch still ran.
    DispatchFailed {
        room: String,
        capability: Capability,
        error: DispatchError,
    },

    /// The cycle was aborted before producing actions.
    CycleSkipped { room: String, reason: &'static str },

    /// An operator adjustment was refused.
    AdjustmentRejected { room: String, key: String, reason: String },
}

/// Per-action audit payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionAudit {
    pub room: String,
    pub message: String,
    pub capability: Capability,
    pub kind: ActionKind,
    pub priority: Priority,
}

impl From<&Action> for ActionAudit {
    fn from(a: &Action) -> Self {
        Self {
            room: a.room().to_string(),
            message: a.message().to_string(),
            capability: a.capability(),
            kind: a.kind(),
            priority: a.priority(),
        }
    }
}
