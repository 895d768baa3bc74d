//! Cycle inputs: what the engine is told about the room.
//!
//! Sensor acquisition and VPD / dew-point arithmetic happen upstream.  The
//! engine receives already-computed values as [`SensorReadings`] and turns
//! them into a validated [`SensorSnapshot`] before any deviation math runs.
//! Capability availability arrives separately as a
//! [`CapabilitySnapshot`](capabilities::CapabilitySnapshot).

pub mod capabilities;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

pub use capabilities::CapabilitySnapshot;

// ---------------------------------------------------------------------------
// Raw readings (as delivered by the sensor layer)
// ---------------------------------------------------------------------------

/// Raw sensor values for one room.  Bounds are optional because the
/// upstream configuration may not have delivered them yet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SensorReadings {
    /// Air temperature (°C).
    pub temperature: f32,
    /// Relative humidity (%).
    pub humidity: f32,
    pub max_temp: Option<f32>,
    pub min_temp: Option<f32>,
    pub max_humidity: Option<f32>,
    pub min_humidity: Option<f32>,
    /// Dew point (°C).
    pub dewpoint: f32,
    /// Current VPD (kPa).
    pub vpd: f32,
    /// Target VPD (kPa).
    pub target_vpd: f32,
    /// Oxygen concentration (%), when an O2 sensor is fitted.
    pub o2: Option<f32>,
}

impl SensorReadings {
    /// Validate that all four bounds are present.
    ///
    /// Partial bounds abort the cycle: no deviation is ever computed against
    /// a half-configured range.
    pub fn snapshot(&self) -> Result<SensorSnapshot, EngineError> {
        let max_temp = self.max_temp.ok_or(EngineError::MissingInput("max_temp"))?;
        let min_temp = self.min_temp.ok_or(EngineError::MissingInput("min_temp"))?;
        let max_humidity = self
            .max_humidity
            .ok_or(EngineError::MissingInput("max_humidity"))?;
        let min_humidity = self
            .min_humidity
            .ok_or(EngineError::MissingInput("min_humidity"))?;

        Ok(SensorSnapshot {
            temperature: self.temperature,
            humidity: self.humidity,
            max_temp,
            min_temp,
            max_humidity,
            min_humidity,
            dewpoint: self.dewpoint,
            vpd: self.vpd,
            target_vpd: self.target_vpd,
            o2: self.o2,
        })
    }
}

// ---------------------------------------------------------------------------
// Validated snapshot (read-only to every pipeline stage)
// ---------------------------------------------------------------------------

/// A point-in-time view of the room with every bound present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    pub temperature: f32,
    pub humidity: f32,
    pub max_temp: f32,
    pub min_temp: f32,
    pub max_humidity: f32,
    pub min_humidity: f32,
    pub dewpoint: f32,
    pub vpd: f32,
    pub target_vpd: f32,
    pub o2: Option<f32>,
}

// ---------------------------------------------------------------------------
// Control flags
// ---------------------------------------------------------------------------

/// Per-room switches owned by the user configuration layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlFlags {
    /// Whether the grow light is currently on (day phase).
    pub light_on: bool,
    /// Allow the light to be used as a VPD actuator.
    pub vpd_light_control: bool,
    /// Keep full VPD control during the night phase.
    pub night_vpd_hold: bool,
    /// Use the user-defined weights instead of the plant-stage table.
    pub own_weights: bool,
    /// Allow CO2 dosing as a VPD actuator.
    pub co2_control: bool,
    /// Current growth stage, looked up in the stage weight table.
    pub plant_stage: String,
}

impl Default for ControlFlags {
    fn default() -> Self {
        Self {
            light_on: true,
            vpd_light_control: false,
            night_vpd_hold: true,
            own_weights: false,
            co2_control: false,
            plant_stage: String::from("MidVeg"),
        }
    }
}
