//! Application core: the engine orchestration, zero I/O.
//!
//! The pure pipeline stages live in [`crate::control`]; this layer wires
//! them to cross-cycle state (cooldowns, emergency override, history) and
//! to the outside world through the **port traits** in [`ports`], keeping
//! every cycle testable with mock adapters.

pub mod dispatch;
pub mod events;
pub mod ports;
pub mod service;
