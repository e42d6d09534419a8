//! Pour lifecycle evaluation.
//!
//! `PourMonitor` runs one evaluation per `tick(now_ms)` call, driven by an
//! external scheduler. It inspects the shared `FlowMeter` and the elapsed
//! sensor inactivity to decide whether a pour just closed (large or small),
//! is still progressing, or whether the idle display is due a refresh.
//!
//! Guard order within a tick is fixed and load-bearing: large close, then
//! small close, then progress. The closing guards take precedence over
//! progress reporting because an expired inactivity window means the pour is
//! over regardless of reporting cadence. The two closing volume predicates
//! are complementary, so at most one callback fires per tick.

use std::sync::Arc;

use pour_traits::Presenter;

use crate::config::{PourCfg, ReportCfg};
use crate::events::TickEvent;
use crate::meter::FlowMeter;

/// Lifecycle state, derived from the meter rather than stored: the monitor
/// is pouring exactly when the current pour has any volume. Deriving it
/// removes any possibility of drift between state flag and volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PourState {
    Idle,
    Pouring,
}

pub struct PourMonitor {
    pub(crate) meter: Arc<FlowMeter>,
    pub(crate) presenter: Box<dyn Presenter>,
    pub(crate) pour: PourCfg,
    pub(crate) report: ReportCfg,
    pub(crate) last_progress_ms: i64,
    pub(crate) last_idle_ms: i64,
}

impl core::fmt::Debug for PourMonitor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PourMonitor")
            .field("state", &self.state())
            .field("pour_volume", &self.meter.pour_volume())
            .field("minimum_pour_volume", &self.pour.minimum_pour_volume)
            .finish()
    }
}

impl PourMonitor {
    /// Start building a monitor.
    pub fn builder() -> crate::builder::MonitorBuilder<
        crate::builder::Missing,
        crate::builder::Missing,
    > {
        crate::builder::MonitorBuilder::default()
    }

    pub fn state(&self) -> PourState {
        if self.meter.pour_volume() > 0.0 {
            PourState::Pouring
        } else {
            PourState::Idle
        }
    }

    /// Shared handle to the underlying meter.
    pub fn meter(&self) -> &Arc<FlowMeter> {
        &self.meter
    }

    /// One lifecycle evaluation. Pure function of meter state and `now_ms`;
    /// re-running with no new pulses and no threshold crossed is a no-op.
    pub fn tick(&mut self, now_ms: i64) -> TickEvent {
        let volume = self.meter.pour_volume();
        if volume > 0.0 {
            let quiet_ms = self.meter.ms_since_last_pulse(now_ms);
            if volume > self.pour.minimum_pour_volume
                && quiet_ms > self.pour.large_pour_inactivity_ms
            {
                return self.close_large(volume);
            }
            if volume <= self.pour.minimum_pour_volume
                && quiet_ms > self.pour.small_pour_inactivity_ms
            {
                return self.close_small(volume);
            }
            if now_ms - self.last_progress_ms > self.report.progress_interval_ms {
                self.last_progress_ms = now_ms;
                let rate = self.meter.flow_rate();
                tracing::trace!(volume, rate, "pour progress");
                self.presenter.show_progress(volume, rate);
                return TickEvent::Progress { volume, rate };
            }
            return TickEvent::Quiet;
        }

        if now_ms - self.last_idle_ms > self.report.idle_interval_ms {
            self.last_idle_ms = now_ms;
            let lifetime_total = self.meter.lifetime_total();
            let pours = self.meter.completed_pours();
            self.presenter.show_idle(lifetime_total, pours);
            return TickEvent::Idle {
                lifetime_total,
                pours,
            };
        }
        TickEvent::Quiet
    }

    /// Close a pour above the minimum: notify with pre-reset snapshots,
    /// then reset with `counts = true`.
    fn close_large(&mut self, volume: f64) -> TickEvent {
        let lifetime_total = self.meter.lifetime_total();
        let pours = self.meter.completed_pours();
        tracing::info!(volume, lifetime_total, "pour complete");
        self.presenter.show_large_pour(volume, lifetime_total, pours);
        self.meter.reset_pour(true);
        TickEvent::LargePour {
            volume,
            lifetime_total,
            pours,
        }
    }

    /// Close a pour at or below the minimum: notify, then discard without
    /// counting it.
    fn close_small(&mut self, volume: f64) -> TickEvent {
        tracing::debug!(volume, "pour below minimum, discarded");
        self.presenter.show_small_pour(volume);
        self.meter.reset_pour(false);
        TickEvent::SmallPour { volume }
    }
}
