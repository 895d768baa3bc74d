//! Unified error types for the action engine.
//!
//! Every fallible boundary funnels into one of the enums below.  None of
//! them escape a control cycle: the engine converts them into events and
//! log lines, and the worst outcome of a cycle is "no actions".

use core::fmt;

// ---------------------------------------------------------------------------
// Engine errors
// ---------------------------------------------------------------------------

/// Errors raised at the edges of the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A required sensor bound was absent; the cycle is aborted.
    MissingInput(&'static str),
    /// A request named a capability outside the fixed capability set.
    UnknownCapability(String),
    /// A capability handler failed to deliver an action.
    Dispatch(DispatchError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingInput(field) => write!(f, "missing input: {field}"),
            Self::UnknownCapability(key) => write!(f, "unknown capability: {key}"),
            Self::Dispatch(e) => write!(f, "dispatch: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// Failure reported by a [`CapabilityPort`](crate::app::ports::CapabilityPort).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The device behind the capability is offline or not bound.
    Unavailable,
    /// The handler refused the action.
    Rejected(String),
    /// The transport towards the device failed.
    Transport(String),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "capability unavailable"),
            Self::Rejected(why) => write!(f, "rejected: {why}"),
            Self::Transport(why) => write!(f, "transport failed: {why}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<DispatchError> for EngineError {
    fn from(e: DispatchError) -> Self {
        Self::Dispatch(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from [`ConfigPort`](crate::app::ports::ConfigPort) operations and
/// config validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No stored config exists yet.
    NotFound,
    /// Stored config could not be parsed.
    Corrupted,
    /// A field failed range validation.  The message names the field.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

/// Errors from [`TimerHost`](crate::scheduler::TimerHost).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// Every executor slot already runs a room's clear task.
    Full { capacity: usize },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full { capacity } => write!(f, "all {capacity} timer slots in use"),
        }
    }
}

impl std::error::Error for SchedulerError {}
