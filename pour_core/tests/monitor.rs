use std::sync::{Arc, Mutex};

use pour_core::{
    FlowMeter, MeterCfg, PourCfg, PourMonitor, PourState, ReportCfg, TickEvent, UnitSystem,
};
use pour_traits::Presenter;

/// Presenter spy that records every callback with its arguments.
#[derive(Debug, Clone, PartialEq)]
enum Shown {
    Large(f64, f64, u64),
    Small(f64),
    Progress(f64, f64),
    Idle(f64, u64),
}

#[derive(Default, Clone)]
struct RecordingPresenter {
    shown: Arc<Mutex<Vec<Shown>>>,
}

impl RecordingPresenter {
    fn take(&self) -> Vec<Shown> {
        std::mem::take(&mut *self.shown.lock().unwrap())
    }
}

impl Presenter for RecordingPresenter {
    fn show_large_pour(&mut self, volume: f64, lifetime_total: f64, pours: u64) {
        self.shown
            .lock()
            .unwrap()
            .push(Shown::Large(volume, lifetime_total, pours));
    }
    fn show_small_pour(&mut self, volume: f64) {
        self.shown.lock().unwrap().push(Shown::Small(volume));
    }
    fn show_progress(&mut self, volume: f64, rate: f64) {
        self.shown.lock().unwrap().push(Shown::Progress(volume, rate));
    }
    fn show_idle(&mut self, lifetime_total: f64, pours: u64) {
        self.shown
            .lock()
            .unwrap()
            .push(Shown::Idle(lifetime_total, pours));
    }
}

fn meter(ppu: f64) -> Arc<FlowMeter> {
    Arc::new(
        FlowMeter::new(MeterCfg {
            pulses_per_unit: ppu,
            unit_system: UnitSystem::Metric,
        })
        .expect("valid calibration"),
    )
}

fn monitor(
    meter: &Arc<FlowMeter>,
    presenter: &RecordingPresenter,
    pour: PourCfg,
    report: ReportCfg,
) -> PourMonitor {
    PourMonitor::builder()
        .with_meter(meter.clone())
        .with_presenter(presenter.clone())
        .with_pour(pour)
        .with_report(report)
        .build()
        .expect("build monitor")
}

#[test]
fn state_is_derived_from_pour_volume() {
    let m = meter(100.0);
    let p = RecordingPresenter::default();
    let mon = monitor(&m, &p, PourCfg::default(), ReportCfg::default());

    assert_eq!(mon.state(), PourState::Idle);
    m.record_pulse(10);
    assert_eq!(mon.state(), PourState::Pouring);
    m.reset_pour(false);
    assert_eq!(mon.state(), PourState::Idle);
}

#[test]
fn presenter_sees_pre_reset_snapshot_on_large_pour() {
    let m = meter(100.0);
    let p = RecordingPresenter::default();
    let mut mon = monitor(
        &m,
        &p,
        PourCfg {
            minimum_pour_volume: 0.1,
            large_pour_inactivity_ms: 1_000,
            small_pour_inactivity_ms: 500,
        },
        ReportCfg::default(),
    );

    for i in 0..20 {
        m.record_pulse(i * 10);
    }
    let event = mon.tick(190 + 1_001);
    // Callback observed the pour before the reset: full volume, zero
    // previously completed pours.
    assert_eq!(p.take(), vec![Shown::Large(0.20, 0.20, 0)]);
    assert!(matches!(event, TickEvent::LargePour { .. }));
    // Reset happened after the callback returned.
    assert_eq!(m.pour_volume(), 0.0);
    assert_eq!(m.completed_pours(), 1);
    assert_eq!(m.lifetime_total(), 0.20);
}

#[test]
fn small_pour_is_discarded_not_counted() {
    let m = meter(100.0);
    let p = RecordingPresenter::default();
    let mut mon = monitor(
        &m,
        &p,
        PourCfg {
            minimum_pour_volume: 0.23,
            large_pour_inactivity_ms: 10_000,
            small_pour_inactivity_ms: 2_000,
        },
        ReportCfg::default(),
    );

    for i in 0..5 {
        m.record_pulse(i * 50);
    }
    let event = mon.tick(200 + 2_001);
    assert_eq!(event, TickEvent::SmallPour { volume: 0.05 });
    assert_eq!(p.take(), vec![Shown::Small(0.05)]);
    assert_eq!(m.completed_pours(), 0);
    // Discarded from the pour, kept in the lifetime total.
    assert_eq!(m.lifetime_total(), 0.05);
    assert_eq!(mon.state(), PourState::Idle);
}

#[test]
fn progress_is_rate_limited() {
    let m = meter(100.0);
    let p = RecordingPresenter::default();
    let mut mon = monitor(
        &m,
        &p,
        PourCfg::default(),
        ReportCfg {
            progress_interval_ms: 500,
            idle_interval_ms: 15_000,
        },
    );

    for i in 0..5 {
        m.record_pulse(i * 50);
    }
    assert!(matches!(mon.tick(501), TickEvent::Progress { .. }));
    // Within the cadence window nothing more fires.
    assert_eq!(mon.tick(502), TickEvent::Quiet);
    assert_eq!(mon.tick(900), TickEvent::Quiet);
    assert!(matches!(mon.tick(1_002), TickEvent::Progress { .. }));
    assert_eq!(p.take().len(), 2);
}

#[test]
fn idle_refresh_reports_running_totals() {
    let m = meter(100.0);
    let p = RecordingPresenter::default();
    let mut mon = monitor(
        &m,
        &p,
        PourCfg::default(),
        ReportCfg {
            progress_interval_ms: 500,
            idle_interval_ms: 1_000,
        },
    );
    m.restore_totals(250, 3);

    assert_eq!(mon.tick(999), TickEvent::Quiet);
    assert_eq!(
        mon.tick(1_001),
        TickEvent::Idle {
            lifetime_total: 2.5,
            pours: 3
        }
    );
    assert_eq!(p.take(), vec![Shown::Idle(2.5, 3)]);
    // Cadence restarts from the report just sent.
    assert_eq!(mon.tick(1_500), TickEvent::Quiet);
}

#[test]
fn misordered_inactivity_thresholds_cannot_misclassify() {
    // small_pour_inactivity < large_pour_inactivity while the pour is large:
    // the small branch's volume predicate cannot hold, so nothing closes
    // until the large threshold expires.
    let m = meter(100.0);
    let p = RecordingPresenter::default();
    let mut mon = monitor(
        &m,
        &p,
        PourCfg {
            minimum_pour_volume: 0.1,
            large_pour_inactivity_ms: 5_000,
            small_pour_inactivity_ms: 1_000,
        },
        ReportCfg {
            progress_interval_ms: 100_000,
            idle_interval_ms: 100_000,
        },
    );

    for i in 0..20 {
        m.record_pulse(i * 10);
    }
    assert_eq!(mon.tick(190 + 2_000), TickEvent::Quiet);
    assert!(matches!(mon.tick(190 + 5_001), TickEvent::LargePour { .. }));
}

#[test]
fn zero_minimum_makes_every_pour_large() {
    let m = meter(100.0);
    let p = RecordingPresenter::default();
    let mut mon = monitor(
        &m,
        &p,
        PourCfg {
            minimum_pour_volume: 0.0,
            large_pour_inactivity_ms: 1_000,
            small_pour_inactivity_ms: 500,
        },
        ReportCfg::default(),
    );

    m.record_pulse(0);
    assert!(matches!(mon.tick(1_001), TickEvent::LargePour { .. }));
    assert_eq!(m.completed_pours(), 1);
}

#[test]
fn disabled_capture_freezes_the_lifecycle() {
    let m = meter(100.0);
    let p = RecordingPresenter::default();
    let mut mon = monitor(&m, &p, PourCfg::default(), ReportCfg::default());

    m.set_enabled(false);
    m.record_pulse(100);
    assert_eq!(mon.state(), PourState::Idle);
    assert_eq!(mon.tick(200), TickEvent::Quiet);
    assert!(p.take().is_empty());
}
