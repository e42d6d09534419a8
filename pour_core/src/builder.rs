//! Type-state builder for `PourMonitor`.
//!
//! The builder enforces at compile time that a meter and a presenter are
//! provided before `build()` is available. `try_build()` is always available
//! for dynamic checks and returns typed `BuildError`s.

use std::marker::PhantomData;
use std::sync::Arc;

use pour_traits::Presenter;

use crate::config::{PourCfg, ReportCfg};
use crate::error::{BuildError, Result};
use crate::meter::FlowMeter;
use crate::monitor::PourMonitor;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `PourMonitor`. Config fields are validated on build.
pub struct MonitorBuilder<F, P> {
    meter: Option<Arc<FlowMeter>>,
    presenter: Option<Box<dyn Presenter>>,
    pour: Option<PourCfg>,
    report: Option<ReportCfg>,
    start_ms: i64,
    _f: PhantomData<F>,
    _p: PhantomData<P>,
}

impl Default for MonitorBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            meter: None,
            presenter: None,
            pour: None,
            report: None,
            start_ms: 0,
            _f: PhantomData,
            _p: PhantomData,
        }
    }
}

/// Chainable setters that do not affect type-state.
impl<F, P> MonitorBuilder<F, P> {
    pub fn with_pour(mut self, pour: PourCfg) -> Self {
        self.pour = Some(pour);
        self
    }

    pub fn with_report(mut self, report: ReportCfg) -> Self {
        self.report = Some(report);
        self
    }

    /// Epoch for the report cadence bookkeeping. Defaults to 0; pass the
    /// current tick clock value when the monitor is created mid-run.
    pub fn with_start_ms(mut self, start_ms: i64) -> Self {
        self.start_ms = start_ms;
        self
    }
}

impl<F, P> MonitorBuilder<F, P> {
    pub fn with_meter(self, meter: Arc<FlowMeter>) -> MonitorBuilder<Set, P> {
        MonitorBuilder {
            meter: Some(meter),
            presenter: self.presenter,
            pour: self.pour,
            report: self.report,
            start_ms: self.start_ms,
            _f: PhantomData,
            _p: PhantomData,
        }
    }

    pub fn with_presenter(
        self,
        presenter: impl Presenter + 'static,
    ) -> MonitorBuilder<F, Set> {
        MonitorBuilder {
            meter: self.meter,
            presenter: Some(Box::new(presenter)),
            pour: self.pour,
            report: self.report,
            start_ms: self.start_ms,
            _f: PhantomData,
            _p: PhantomData,
        }
    }

    /// Fallible build available in any type-state; returns detailed
    /// BuildErrors for missing pieces.
    pub fn try_build(self) -> Result<PourMonitor> {
        let MonitorBuilder {
            meter,
            presenter,
            pour,
            report,
            start_ms,
            _f: _,
            _p: _,
        } = self;

        let meter = meter.ok_or_else(|| eyre::Report::new(BuildError::MissingMeter))?;
        let presenter =
            presenter.ok_or_else(|| eyre::Report::new(BuildError::MissingPresenter))?;
        let pour = pour.unwrap_or_default();
        let report = report.unwrap_or_default();

        // A minimum of exactly 0 is degenerate (every non-empty pour is
        // large) but deliberately accepted; the stricter check lives in the
        // outer config layer.
        if !pour.minimum_pour_volume.is_finite() || pour.minimum_pour_volume < 0.0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "minimum_pour_volume must be finite and >= 0",
            )));
        }
        if pour.large_pour_inactivity_ms < 0 || pour.small_pour_inactivity_ms < 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "pour inactivity thresholds must be >= 0",
            )));
        }
        if report.progress_interval_ms < 0 || report.idle_interval_ms < 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "report intervals must be >= 0",
            )));
        }

        Ok(PourMonitor {
            meter,
            presenter,
            pour,
            report,
            last_progress_ms: start_ms,
            last_idle_ms: start_ms,
        })
    }
}

impl MonitorBuilder<Set, Set> {
    /// Build with compile-time certainty that meter and presenter are set.
    pub fn build(self) -> Result<PourMonitor> {
        self.try_build()
    }
}
