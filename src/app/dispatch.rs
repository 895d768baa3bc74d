//! Action executor.
//!
//! Split in two halves so the engine's state is never borrowed across an
//! `.await`:
//!
//! ```text
//!   ActionExecutor::commit (sync)          DispatchBatch::dispatch (async)
//!   ─────────────────────────────          ───────────────────────────────
//!   audit event per action                 CapabilityPort::dispatch per action
//!   BatchRecord → history ring             failures logged + DispatchFailed
//!   BatchRecorded event                    DispatchReport
//!          │                                        ▲
//!          └──────────── owned DispatchBatch ───────┘
//! ```

use log::{error, info};

use crate::control::action::{Action, Capability};
use crate::diagnostics::{ActionHistory, BatchRecord, ControllerKind};
use crate::error::DispatchError;

use super::events::{ActionAudit, EngineEvent};
use super::ports::{CapabilityPort, EventSink};

// ───────────────────────────────────────────────────────────────
// Commit side
// ───────────────────────────────────────────────────────────────

/// Records batches and hands them out for delivery.
#[derive(Debug, Default)]
pub struct ActionExecutor {
    history: ActionHistory,
}

impl ActionExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &ActionHistory {
        &self.history
    }

    /// Audit and record `actions`, returning the batch to deliver.
    pub fn commit(
        &mut self,
        room: &str,
        controller: ControllerKind,
        actions: Vec<Action>,
        timestamp_ms: u64,
        sink: &mut impl EventSink,
    ) -> DispatchBatch {
        for action in &actions {
            info!(
                "Executor: {} | {} {} ({})",
                room,
                action.kind(),
                action.capability(),
                action.priority()
            );
            sink.emit(&EngineEvent::ActionIssued(ActionAudit::from(action)));
        }

        let record = BatchRecord::new(timestamp_ms, room, controller, &actions);
        sink.emit(&EngineEvent::BatchRecorded(record.clone()));
        self.history.push(record);

        DispatchBatch {
            room: room.to_string(),
            controller,
            actions,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Delivery side
// ───────────────────────────────────────────────────────────────

/// A committed batch, detached from the engine.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a batch does nothing until dispatched"]
pub struct DispatchBatch {
    room: String,
    controller: ControllerKind,
    actions: Vec<Action>,
}

impl DispatchBatch {
    pub fn room(&self) -> &str {
        &self.room
    }

    pub fn controller(&self) -> ControllerKind {
        self.controller
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Deliver every action in order.  A failing handler is logged and
    /// reported; the remaining actions still go out.
    pub async fn dispatch(
        self,
        port: &mut impl CapabilityPort,
        sink: &mut impl EventSink,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        for action in &self.actions {
            match port.dispatch(action).await {
                Ok(()) => report.delivered.push(action.capability()),
                Err(e) => {
                    error!(
                        "Executor: {} | '{}' failed: {e}",
                        self.room,
                        action.event_key()
                    );
                    sink.emit(&EngineEvent::DispatchFailed {
                        room: self.room.clone(),
                        capability: action.capability(),
                        error: e.clone(),
                    });
                    report.failed.push((action.capability(), e));
                }
            }
        }
        report
    }
}

/// Outcome of one delivery pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    pub delivered: Vec<Capability>,
    pub failed: Vec<(Capability, DispatchError)>,
}

impl DispatchReport {
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }
}
