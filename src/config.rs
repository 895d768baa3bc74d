//! Engine configuration.
//!
//! Every policy constant the pipeline consults.  Loaded through a
//! [`ConfigPort`](crate::app::ports::ConfigPort) and swapped at runtime via
//! [`ActionEngine::update_config`](crate::app::service::ActionEngine::update_config);
//! both paths run [`EngineConfig::validate`] first.

use serde::{Deserialize, Serialize};

use crate::control::buffer_zone::BufferZones;
use crate::control::deviation::{PlantStageWeights, StageWeights};
use crate::control::stress::StressThresholds;
use crate::cooldown::CooldownConfig;
use crate::error::ConfigError;
use crate::safety::EmergencyLimits;

/// Tunables for one room's action engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // --- Filtering ---
    pub buffers: BufferZones,
    pub cooldown: CooldownConfig,

    // --- Classification ---
    pub stress: StressThresholds,
    pub emergency: EmergencyLimits,
    /// Dead band around the VPD target (kPa) where no direction is chosen.
    pub vpd_tolerance: f32,

    // --- Weights ---
    /// Used instead of the stage table when the room opts in.
    pub own_weights: StageWeights,
    pub stage_weights: PlantStageWeights,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffers: BufferZones::default(),
            cooldown: CooldownConfig::default(),
            stress: StressThresholds::default(),
            emergency: EmergencyLimits::default(),
            vpd_tolerance: 0.05,
            own_weights: StageWeights::NEUTRAL,
            stage_weights: PlantStageWeights::default(),
        }
    }
}

impl EngineConfig {
    /// Reject values that would make the pipeline misbehave.
    ///
    /// Out-of-range values are refused, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.buffers;
        for margin in [b.heater, b.cooler, b.humidifier, b.dehumidifier] {
            if !(0.0..=20.0).contains(&margin) {
                return Err(ConfigError::ValidationFailed("buffer margins must be 0.0–20.0"));
            }
        }

        if !(1..=3600).contains(&self.cooldown.default_base_secs) {
            return Err(ConfigError::ValidationFailed(
                "cooldown.default_base_secs must be 1–3600",
            ));
        }
        if self.cooldown.per_capability.values().any(|s| !(1..=3600).contains(s)) {
            return Err(ConfigError::ValidationFailed(
                "cooldown.per_capability entries must be 1–3600",
            ));
        }

        let s = &self.stress;
        if !(s.medium > 0.0 && s.medium < s.high && s.high < s.critical && s.critical <= 1.0) {
            return Err(ConfigError::ValidationFailed(
                "stress thresholds must satisfy 0 < medium < high < critical <= 1",
            ));
        }

        let e = &self.emergency;
        if !(1..=600).contains(&e.hold_secs) {
            return Err(ConfigError::ValidationFailed("emergency.hold_secs must be 1–600"));
        }
        if !(50.0..=100.0).contains(&e.critical_humidity) {
            return Err(ConfigError::ValidationFailed(
                "emergency.critical_humidity must be 50.0–100.0",
            ));
        }
        if !(0.0..=5.0).contains(&e.condensation_margin) {
            return Err(ConfigError::ValidationFailed(
                "emergency.condensation_margin must be 0.0–5.0",
            ));
        }
        if !(10.0..=21.0).contains(&e.min_o2) {
            return Err(ConfigError::ValidationFailed("emergency.min_o2 must be 10.0–21.0"));
        }

        if !(0.0..=1.0).contains(&self.vpd_tolerance) {
            return Err(ConfigError::ValidationFailed("vpd_tolerance must be 0.0–1.0"));
        }

        let weights = core::iter::once(&self.own_weights).chain(self.stage_weights.iter().map(|(_, w)| w));
        for w in weights {
            if !(0.1..=5.0).contains(&w.temp) || !(0.1..=5.0).contains(&w.hum) {
                return Err(ConfigError::ValidationFailed("weights must be 0.1–5.0"));
            }
        }
        Ok(())
    }
}
