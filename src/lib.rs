//! Grow-room environmental action engine.
//!
//! Turns a sensor snapshot plus the room's capability map into a small,
//! dampened list of actuator requests.  Pure pipeline stages live in
//! [`control`]; [`app::service::ActionEngine`] owns the per-room state and
//! talks to the outside world only through the traits in [`app::ports`].

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod cooldown;
pub mod diagnostics;
pub mod error;
pub mod safety;
pub mod scheduler;
pub mod sensors;
