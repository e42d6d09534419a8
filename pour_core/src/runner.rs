//! Tick loop orchestration.
//!
//! Drives `PourMonitor::tick` from a `Clock` at a fixed cadence until a
//! shutdown flag is raised. The cadence should come from
//! `util::tick_period_ms` so reports are never more than one tick late.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use pour_traits::Clock;

use crate::events::TickEvent;
use crate::monitor::PourMonitor;

/// Totals for one run of the tick loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct RunSummary {
    pub ticks: u64,
    pub large_pours: u64,
    pub small_pours: u64,
}

/// Run the monitor until `stop` is raised, returning per-run totals.
/// Timestamps are measured from an epoch taken at entry, so the monitor's
/// report cadence (initialized at 0) lines up with the first ticks.
pub fn run<C: Clock>(
    monitor: &mut PourMonitor,
    clock: &C,
    tick_ms: u64,
    stop: &AtomicBool,
) -> RunSummary {
    let epoch = clock.now();
    let period = Duration::from_millis(tick_ms.max(1));
    let mut summary = RunSummary::default();

    tracing::info!(tick_ms, "pour monitor loop start");
    while !stop.load(Ordering::Relaxed) {
        let now_ms = clock.ms_since(epoch);
        match monitor.tick(now_ms) {
            TickEvent::LargePour { .. } => summary.large_pours += 1,
            TickEvent::SmallPour { .. } => summary.small_pours += 1,
            TickEvent::Progress { .. } | TickEvent::Idle { .. } | TickEvent::Quiet => {}
        }
        summary.ticks += 1;

        if stop.load(Ordering::Relaxed) {
            break;
        }
        clock.sleep(period);
    }
    tracing::info!(
        ticks = summary.ticks,
        large_pours = summary.large_pours,
        small_pours = summary.small_pours,
        "pour monitor loop exit"
    );
    summary
}
