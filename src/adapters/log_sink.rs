//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing each engine event as one structured
//! line through the `log` facade.  The host decides where the lines end up
//! by installing a logger.

use log::{error, info, warn};

use crate::app::events::EngineEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`EngineEvent`].
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &EngineEvent) {
        match event {
            EngineEvent::ActionIssued(a) => {
                info!(
                    "ACTION | room={} | cap={} kind={} prio={} | {}",
                    a.room, a.capability, a.kind, a.priority, a.message
                );
            }
            EngineEvent::BatchRecorded(b) => {
                info!(
                    "BATCH | room={} | ctrl={:?} | n={} | t={}ms",
                    b.room,
                    b.controller_type,
                    b.actions.len(),
                    b.timestamp
                );
            }
            EngineEvent::EmergencyRaised { room, conditions } => {
                warn!("EMERG | room={room} | conditions={conditions}");
            }
            EngineEvent::ActionsBlocked { room, count } => {
                info!("BLOCK | room={room} | {count} action(s) cooling down");
            }
            EngineEvent::DispatchFailed { room, capability, error: e } => {
                error!("DISPATCH | room={room} | cap={capability} | {e}");
            }
            EngineEvent::CycleSkipped { room, reason } => {
                warn!("SKIP | room={room} | missing={reason}");
            }
            EngineEvent::AdjustmentRejected { room, key, reason } => {
                warn!("ADJUST | room={room} | key={key} | {reason}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use log::{Level, LevelFilter, Log, Metadata, Record};

    use super::*;
    use crate::app::events::ActionAudit;
    use crate::control::action::{Action, ActionKind, Capability, Priority};
    use crate::diagnostics::{BatchRecord, ControllerKind};
    use crate::error::DispatchError;
    use crate::safety::ConditionTag;

    const TARGET: &str = "growroom::adapters::log_sink";

    static LINES: Mutex<Vec<(Level, String)>> = Mutex::new(Vec::new());

    struct Capture;

    impl Log for Capture {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &Record<'_>) {
            if record.target() == TARGET {
                LINES
                    .lock()
                    .unwrap()
                    .push((record.level(), record.args().to_string()));
            }
        }

        fn flush(&self) {}
    }

    static CAPTURE: Capture = Capture;

    #[test]
    fn every_event_becomes_one_line() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(LevelFilter::Trace);

        let action = Action::new(
            Capability::Cool,
            ActionKind::Increase,
            Priority::High,
            "tent",
            "VPD reduce",
        );
        let events = [
            EngineEvent::ActionIssued(ActionAudit::from(&action)),
            EngineEvent::BatchRecorded(BatchRecord::new(
                7,
                "tent",
                ControllerKind::Vpd,
                std::slice::from_ref(&action),
            )),
            EngineEvent::EmergencyRaised {
                room: "tent".into(),
                conditions: ConditionTag::CriticalOverheat.into(),
            },
            EngineEvent::ActionsBlocked {
                room: "tent".into(),
                count: 3,
            },
            EngineEvent::DispatchFailed {
                room: "tent".into(),
                capability: Capability::Cool,
                error: DispatchError::Unavailable,
            },
            EngineEvent::CycleSkipped {
                room: "tent".into(),
                reason: "max_temp",
            },
            EngineEvent::AdjustmentRejected {
                room: "tent".into(),
                key: "canWarp".into(),
                reason: "unknown capability: canWarp".into(),
            },
        ];

        let mut sink = LogEventSink::new();
        for event in &events {
            sink.emit(event);
        }

        let lines = LINES.lock().unwrap().clone();
        assert_eq!(lines.len(), events.len());

        let expect = [
            (Level::Info, "ACTION | room=tent | cap=canCool"),
            (Level::Info, "BATCH | room=tent | ctrl=Vpd | n=1 | t=7ms"),
            (Level::Warn, "EMERG | room=tent | conditions=critical_overheat"),
            (Level::Info, "BLOCK | room=tent | 3 action(s)"),
            (Level::Error, "DISPATCH | room=tent | cap=canCool | capability unavailable"),
            (Level::Warn, "SKIP | room=tent | missing=max_temp"),
            (Level::Warn, "ADJUST | room=tent | key=canWarp"),
        ];
        for ((level, line), (want_level, prefix)) in lines.iter().zip(expect) {
            assert_eq!(*level, want_level, "{line}");
            assert!(line.starts_with(prefix), "{line}");
        }
    }
}
