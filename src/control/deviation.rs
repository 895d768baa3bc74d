//! Deviation calculator.
//!
//! Computes how far temperature and humidity sit outside their configured
//! band, scaled by a per-stage (or user-defined) weight.  Positive means too
//! high, negative too low, zero inside the band.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::sensors::SensorSnapshot;

/// Multipliers applied to raw deviations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageWeights {
    pub temp: f32,
    pub hum: f32,
}

impl StageWeights {
    pub const NEUTRAL: Self = Self { temp: 1.0, hum: 1.0 };
}

impl Default for StageWeights {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

/// Growth-stage name → weights.  Loaded once from config; the engine only
/// reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlantStageWeights {
    stages: BTreeMap<String, StageWeights>,
}

impl PlantStageWeights {
    pub fn new(stages: BTreeMap<String, StageWeights>) -> Self {
        Self { stages }
    }

    /// Weights for `stage` (case-insensitive).  Unknown stages are neutral.
    pub fn lookup(&self, stage: &str) -> StageWeights {
        self.stages
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(stage))
            .map(|(_, w)| *w)
            .unwrap_or_else(|| {
                debug!("Deviation: unknown plant stage '{stage}', using neutral weights");
                StageWeights::NEUTRAL
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &StageWeights)> {
        self.stages.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Default for PlantStageWeights {
    fn default() -> Self {
        // Seedlings and clones are humidity-sensitive; flowering plants
        // are temperature-sensitive.
        let table = [
            ("Germination", 1.0, 1.2),
            ("Clones", 1.0, 1.2),
            ("EarlyVeg", 1.0, 1.1),
            ("MidVeg", 1.0, 1.0),
            ("LateVeg", 1.0, 1.0),
            ("EarlyFlower", 1.1, 1.0),
            ("MidFlower", 1.2, 0.9),
            ("LateFlower", 1.2, 0.9),
        ];
        let stages = table
            .into_iter()
            .map(|(name, temp, hum)| (name.to_string(), StageWeights { temp, hum }))
            .collect();
        Self { stages }
    }
}

/// Signed, weighted deviations for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Deviation {
    pub temp: f32,
    pub hum: f32,
}

impl Deviation {
    /// The larger of the two deviations by magnitude, sign preserved.
    pub fn dominant(&self) -> f32 {
        if self.temp.abs() >= self.hum.abs() {
            self.temp
        } else {
            self.hum
        }
    }
}

/// Compute weighted deviations for a validated snapshot.
pub fn calculate(snap: &SensorSnapshot, weights: StageWeights) -> Deviation {
    Deviation {
        temp: band_deviation(snap.temperature, snap.min_temp, snap.max_temp, weights.temp),
        hum: band_deviation(snap.humidity, snap.min_humidity, snap.max_humidity, weights.hum),
    }
}

fn band_deviation(current: f32, min: f32, max: f32, weight: f32) -> f32 {
    if current > max {
        round2((current - max) * weight)
    } else if current < min {
        round2((current - min) * weight)
    } else {
        0.0
    }
}

fn round2(v: f32) -> f32 {
    (v * 100.0).round() / 100.0
}
