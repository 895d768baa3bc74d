//! Mock room adapters for integration tests.
//!
//! Records every capability dispatch and every engine event so tests can
//! assert on full cycles without any real devices behind them.

#![allow(dead_code)]

use std::rc::Rc;

use growroom::adapters::time::ManualClock;
use growroom::app::events::EngineEvent;
use growroom::app::ports::{CapabilityPort, EventSink};
use growroom::app::service::ActionEngine;
use growroom::config::EngineConfig;
use growroom::control::action::{Action, Capability};
use growroom::error::DispatchError;
use growroom::scheduler::TimerHost;
use growroom::sensors::SensorReadings;

pub const ROOM: &str = "tent-1";

// ── MockCapabilities ──────────────────────────────────────────

/// Capability port that logs dispatch keys and fails on request.
#[derive(Default)]
pub struct MockCapabilities {
    pub fired: Vec<String>,
    failing: Vec<Capability>,
}

impl MockCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every dispatch to `cap` reports the device as unavailable.
    pub fn fail_on(mut self, cap: Capability) -> Self {
        self.failing.push(cap);
        self
    }
}

impl CapabilityPort for MockCapabilities {
    async fn dispatch(&mut self, action: &Action) -> Result<(), DispatchError> {
        self.fired.push(action.event_key());
        if self.failing.contains(&action.capability()) {
            Err(DispatchError::Unavailable)
        } else {
            Ok(())
        }
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<EngineEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &EngineEvent) {
        self.events.push(event.clone());
    }
}

// ── Fixtures ──────────────────────────────────────────────────

/// Band 18–30 °C, 45–70 %RH, target VPD 1.2 kPa.
pub fn readings(temperature: f32, humidity: f32, vpd: f32) -> SensorReadings {
    SensorReadings {
        temperature,
        humidity,
        max_temp: Some(30.0),
        min_temp: Some(18.0),
        max_humidity: Some(70.0),
        min_humidity: Some(45.0),
        dewpoint: temperature - 10.0,
        vpd,
        target_vpd: 1.2,
        o2: None,
    }
}

pub struct Rig {
    pub engine: ActionEngine<ManualClock>,
    pub clock: ManualClock,
    pub timers: Rc<TimerHost>,
    pub sink: RecordingSink,
}

/// Engine for `room` whose clear timer runs on the shared `timers`.
pub fn room_on(room: &str, config: EngineConfig, timers: &Rc<TimerHost>) -> Rig {
    let clock = ManualClock::new();
    let timer = timers.clear_timer().expect("timer slot available");
    let engine =
        ActionEngine::new(room, config, clock.clone(), timer).expect("test config is valid");
    Rig {
        engine,
        clock,
        timers: timers.clone(),
        sink: RecordingSink::new(),
    }
}

pub fn rig_with(config: EngineConfig) -> Rig {
    room_on(ROOM, config, &Rc::new(TimerHost::new()))
}

pub fn rig() -> Rig {
    rig_with(EngineConfig::default())
}
