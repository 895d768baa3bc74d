//! Emergency override: detection, forced action, bypass and auto-clear.

use std::rc::Rc;

use embassy_time::{Duration, Timer};
use futures_lite::future::block_on;

use growroom::app::events::EngineEvent;
use growroom::config::EngineConfig;
use growroom::control::action::{ActionKind, Capability, Priority};
use growroom::diagnostics::ControllerKind;
use growroom::error::SchedulerError;
use growroom::safety::ConditionTag;
use growroom::scheduler::{EXECUTOR_TASKS, TimerHost};
use growroom::sensors::{CapabilitySnapshot, ControlFlags};

use crate::mock_hw::{readings, rig, rig_with, room_on};

fn short_hold() -> EngineConfig {
    let mut cfg = EngineConfig::default();
    cfg.emergency.hold_secs = 1;
    cfg
}

#[test]
fn overheat_forces_cooling_through_cooldown() {
    let mut r = rig_with(short_hold());
    let caps = CapabilitySnapshot::with_available(&[Capability::Cool, Capability::Exhaust]);
    let flags = ControlFlags::default();
    let hot = readings(32.0, 60.0, 1.8);

    // First cycle issues normally and starts every cooldown.
    let first = r.engine.run_cycle(&hot, &caps, &flags, &mut r.sink).unwrap();
    assert_eq!(first.controller(), ControllerKind::Vpd);
    assert!(!r.engine.emergency_active());

    // One second later everything is held, so the detector steps in.
    r.clock.advance(Duration::from_secs(1));
    let forced = r.engine.run_cycle(&hot, &caps, &flags, &mut r.sink).unwrap();
    assert_eq!(forced.controller(), ControllerKind::Emergency);
    assert_eq!(forced.len(), 1);
    let action = &forced.actions()[0];
    assert_eq!(action.capability(), Capability::Cool);
    assert_eq!(action.kind(), ActionKind::Increase);
    assert_eq!(action.priority(), Priority::Emergency);

    assert!(r.engine.emergency_active());
    assert!(r.engine.emergency_clear_pending());
    assert!(r.engine.emergency_conditions().contains(ConditionTag::CriticalOverheat));
    assert_eq!(r.engine.metrics().emergencies, 1);
    assert_eq!(
        r.sink.count(|e| matches!(e, EngineEvent::EmergencyRaised { .. })),
        1
    );

    // While armed, cooldowns are bypassed for cycles and manual requests.
    let bypassed = r.engine.run_cycle(&hot, &caps, &flags, &mut r.sink).unwrap();
    assert_eq!(bypassed.controller(), ControllerKind::Vpd);
    assert_eq!(bypassed.len(), 2);
    assert!(
        r.engine
            .request_adjustment("canCool", ActionKind::Increase, Priority::High, &mut r.sink)
            .unwrap()
            .is_some()
    );

    // Let the clear timer run out.
    block_on(r.timers.run(Timer::after(Duration::from_millis(1_500))));
    assert!(!r.engine.emergency_active());
    assert!(r.engine.emergency_conditions().is_empty());

    // Still hot and everything cooling down again: the override re-arms.
    let again = r.engine.run_cycle(&hot, &caps, &flags, &mut r.sink).unwrap();
    assert_eq!(again.controller(), ControllerKind::Emergency);
    assert!(r.engine.emergency_active());
    assert_eq!(r.engine.metrics().emergencies, 2);
}

#[test]
fn blocked_cycle_without_conditions_is_silent() {
    let mut r = rig();
    let caps = CapabilitySnapshot::with_available(&[Capability::Exhaust]);
    let flags = ControlFlags::default();
    let calm = readings(25.0, 60.0, 0.8);

    assert!(r.engine.run_cycle(&calm, &caps, &flags, &mut r.sink).is_some());
    r.clock.advance(Duration::from_secs(1));
    assert!(r.engine.run_cycle(&calm, &caps, &flags, &mut r.sink).is_none());

    assert!(!r.engine.emergency_active());
    assert_eq!(r.engine.metrics().emergencies, 0);
    assert_eq!(
        r.sink.count(|e| matches!(e, EngineEvent::EmergencyRaised { .. })),
        0
    );
}

#[test]
fn humidity_outranks_low_oxygen_when_picking_the_remedy() {
    let mut r = rig();
    let caps = CapabilitySnapshot::with_available(&[Capability::Exhaust, Capability::Dehumidify]);
    let flags = ControlFlags::default();
    let mut wet = readings(25.0, 90.0, 0.3);
    wet.o2 = Some(18.0);

    assert!(r.engine.run_cycle(&wet, &caps, &flags, &mut r.sink).is_some());
    r.clock.advance(Duration::from_secs(1));
    let forced = r.engine.run_cycle(&wet, &caps, &flags, &mut r.sink).unwrap();

    assert_eq!(forced.controller(), ControllerKind::Emergency);
    assert_eq!(forced.actions()[0].capability(), Capability::Dehumidify);

    let conditions = r.engine.emergency_conditions();
    assert!(conditions.contains(ConditionTag::CriticalHumidity));
    assert!(conditions.contains(ConditionTag::CriticalO2Low));
    assert!(!conditions.contains(ConditionTag::CriticalOverheat));
}

#[test]
fn rooms_sharing_one_timer_host_all_raise_and_clear() {
    let timers = Rc::new(TimerHost::new());
    let mut rooms: Vec<_> = (0..EXECUTOR_TASKS)
        .map(|i| room_on(&format!("room{i}"), short_hold(), &timers))
        .collect();
    let caps = CapabilitySnapshot::with_available(&[Capability::Cool, Capability::Exhaust]);
    let flags = ControlFlags::default();
    let hot = readings(32.0, 60.0, 1.8);

    for r in &mut rooms {
        assert!(r.engine.run_cycle(&hot, &caps, &flags, &mut r.sink).is_some());
        r.clock.advance(Duration::from_secs(1));
        let forced = r.engine.run_cycle(&hot, &caps, &flags, &mut r.sink).unwrap();
        assert_eq!(forced.controller(), ControllerKind::Emergency);
        // While armed, the next cycle goes through the bypass.
        r.clock.advance(Duration::from_secs(1));
        assert!(r.engine.run_cycle(&hot, &caps, &flags, &mut r.sink).is_some());
    }
    assert!(rooms.iter().all(|r| r.engine.emergency_active()));

    // One room too many is refused up front instead of failing a cycle.
    assert_eq!(
        timers.clear_timer().err(),
        Some(SchedulerError::Full {
            capacity: EXECUTOR_TASKS
        })
    );

    block_on(timers.run(Timer::after(Duration::from_millis(1_500))));
    assert!(rooms.iter().all(|r| !r.engine.emergency_active()));
}
