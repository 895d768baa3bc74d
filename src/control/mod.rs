//! Pure pipeline stages of the action engine.
//!
//! ```text
//!  SensorSnapshot
//!        │
//!        ▼
//!  deviation ──▶ generator ──▶ night_hold ──▶ buffer_zone ──▶ stress (+context)
//!                                                                  │
//!                         CooldownStore filter ◀───────────────────┘
//!                                 │  (all blocked → EmergencyDetector)
//!                                 ▼
//!                             conflict ──▶ ActionExecutor
//! ```
//!
//! Every stage here is a function over owned action lists with no state of
//! its own; cross-cycle state lives in [`crate::cooldown`] and
//! [`crate::safety`].

pub mod action;
pub mod buffer_zone;
pub mod conflict;
pub mod deviation;
pub mod generator;
pub mod night_hold;
pub mod stress;
