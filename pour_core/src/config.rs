//! Runtime configuration types for the pour metering engine.
//!
//! These are the structs `PourMonitor` and `FlowMeter` are built from.
//! They are separate from the TOML-deserialized config in `pour_config`.

/// Volume unit family. Selects the labels the presentation layer uses;
/// it never changes the numeric computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// Flow sensor configuration.
#[derive(Debug, Clone)]
pub struct MeterCfg {
    /// Sensor calibration constant: pulses per one volume unit.
    /// Must be finite and > 0 (validated at build).
    pub pulses_per_unit: f64,
    /// Unit family for presentation.
    pub unit_system: UnitSystem,
}

impl Default for MeterCfg {
    fn default() -> Self {
        Self {
            // SF800-class turbine sensor: 5600 pulses per litre.
            pulses_per_unit: 5600.0,
            unit_system: UnitSystem::Metric,
        }
    }
}

/// Pour classification thresholds.
#[derive(Debug, Clone)]
pub struct PourCfg {
    /// Volume separating small/negligible pours from real servings.
    /// 0.0 is degenerate but accepted: every non-empty pour counts as large.
    pub minimum_pour_volume: f64,
    /// Inactivity that closes a pour above the minimum.
    pub large_pour_inactivity_ms: i64,
    /// Inactivity that discards a pour at or below the minimum.
    pub small_pour_inactivity_ms: i64,
}

impl Default for PourCfg {
    fn default() -> Self {
        Self {
            minimum_pour_volume: 0.23,
            large_pour_inactivity_ms: 10_000,
            small_pour_inactivity_ms: 2_000,
        }
    }
}

/// Presenter report cadence. Rate-limits callbacks only; classification is
/// unaffected by these values.
#[derive(Debug, Clone)]
pub struct ReportCfg {
    /// Minimum gap between progress callbacks while pouring.
    pub progress_interval_ms: i64,
    /// Minimum gap between idle refresh callbacks.
    pub idle_interval_ms: i64,
}

impl Default for ReportCfg {
    fn default() -> Self {
        Self {
            progress_interval_ms: 500,
            idle_interval_ms: 15_000,
        }
    }
}
