//! Port traits: the hexagonal boundary between the engine and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ActionEngine (domain)
//! ```
//!
//! Driven adapters (clocks, capability handlers, event sinks, config
//! storage) implement these traits.  The
//! [`ActionEngine`](super::service::ActionEngine) consumes them via
//! generics, so the domain core never touches devices or files directly.
//!
//! ## Contract notes
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - **CapabilityPort** failures are per action; they never abort a batch.

use embassy_time::Instant;

use crate::config::EngineConfig;
use crate::control::action::Action;
use crate::error::{ConfigError, DispatchError};

// ───────────────────────────────────────────────────────────────
// Clock port (driven adapter: time source → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time source.  Every timestamp the engine records comes from
/// here, so a manual clock makes cycles fully deterministic.
pub trait Clock {
    fn now(&self) -> Instant;
}

// ───────────────────────────────────────────────────────────────
// Capability port (driven adapter: domain → device handlers)
// ───────────────────────────────────────────────────────────────

/// Delivers one action to whatever drives the capability (relay, smart
/// plug, climate unit, message bus).
///
/// Called from [`DispatchBatch::dispatch`](super::dispatch::DispatchBatch::dispatch)
/// after the engine has finished its bookkeeping, so a slow or failing
/// handler cannot affect cooldowns or history.
#[allow(async_fn_in_trait)]
pub trait CapabilityPort {
    async fn dispatch(&mut self, action: &Action) -> Result<(), DispatchError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The engine emits structured [`EngineEvent`](super::events::EngineEvent)s
/// through this port.  Adapters decide where they go (log, channel, bus).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::EngineEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists engine configuration.
///
/// Out-of-range values are rejected with
/// [`ConfigError::ValidationFailed`], never clamped.
pub trait ConfigPort {
    /// Load and validate the stored configuration.
    fn load(&self) -> Result<EngineConfig, ConfigError>;

    /// Validate and persist `config`.
    fn save(&self, config: &EngineConfig) -> Result<(), ConfigError>;
}
