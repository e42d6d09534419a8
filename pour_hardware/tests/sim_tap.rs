use std::sync::Arc;
use std::time::{Duration, Instant};

use pour_core::{FlowMeter, MeterCfg, PulseBridge, UnitSystem};
use pour_hardware::SimulatedTap;
use pour_traits::TestClock;
use rstest::rstest;

fn meter() -> Arc<FlowMeter> {
    Arc::new(
        FlowMeter::new(MeterCfg {
            pulses_per_unit: 100.0,
            unit_system: UnitSystem::Metric,
        })
        .expect("valid calibration"),
    )
}

fn drain_until(meter: &FlowMeter, expected: u64) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while meter.lifetime_pulses() < expected {
        assert!(Instant::now() < deadline, "pulses did not arrive in time");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[rstest]
#[case(10, 50)]
#[case(100, 20)]
fn tap_emits_exactly_the_scripted_pulse_count(#[case] pulses: u32, #[case] gap_ms: i64) {
    let meter = meter();
    let bridge = PulseBridge::spawn(meter.clone(), 256);

    // TestClock: sleeps advance virtually, so the pour is emitted at once
    // with evenly spaced timestamps.
    let tap = SimulatedTap::pour(bridge.handle(), TestClock::new(), pulses, gap_ms);
    tap.wait();

    drain_until(&meter, pulses as u64);
    assert_eq!(meter.lifetime_pulses(), pulses as u64);
}

#[test]
fn tap_timestamps_produce_a_usable_flow_rate() {
    let meter = meter();
    let bridge = PulseBridge::spawn(meter.clone(), 256);

    let tap = SimulatedTap::pour(bridge.handle(), TestClock::new(), 25, 50);
    tap.wait();
    drain_until(&meter, 25);

    assert_eq!(meter.pour_volume(), 0.25);
    // 50 ms gap at 100 pulses/unit: 0.2 units per second.
    assert!((meter.flow_rate() - 0.2).abs() < 1e-9);
}

#[test]
fn dropping_the_tap_stops_the_pour() {
    let meter = meter();
    let bridge = PulseBridge::spawn(meter.clone(), 256);

    // A real-time pour slow enough that we drop it mid-stream.
    let tap = SimulatedTap::pour(
        bridge.handle(),
        pour_traits::MonotonicClock::new(),
        10_000,
        20,
    );
    std::thread::sleep(Duration::from_millis(100));
    drop(tap);

    let emitted = {
        // Give the bridge a moment to drain what was already queued.
        std::thread::sleep(Duration::from_millis(100));
        meter.lifetime_pulses()
    };
    assert!(emitted > 0, "some pulses should have been emitted");
    assert!(
        emitted < 10_000,
        "the pour must stop well short of the script"
    );
}
