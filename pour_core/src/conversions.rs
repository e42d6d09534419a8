//! `From` implementations bridging `pour_config` types to `pour_core` types.
//!
//! These keep the CLI free of field-by-field config mapping.

use crate::config::{MeterCfg, PourCfg, ReportCfg, UnitSystem};

// ── UnitSystem ───────────────────────────────────────────────────────────────

impl From<pour_config::Units> for UnitSystem {
    fn from(u: pour_config::Units) -> Self {
        match u {
            pour_config::Units::Metric => Self::Metric,
            pour_config::Units::Imperial => Self::Imperial,
        }
    }
}

// ── MeterCfg ─────────────────────────────────────────────────────────────────

impl From<&pour_config::Meter> for MeterCfg {
    fn from(c: &pour_config::Meter) -> Self {
        Self {
            pulses_per_unit: c.pulses_per_unit,
            unit_system: c.units.into(),
        }
    }
}

// ── PourCfg ──────────────────────────────────────────────────────────────────

impl From<&pour_config::Pour> for PourCfg {
    fn from(c: &pour_config::Pour) -> Self {
        Self {
            minimum_pour_volume: c.minimum_pour_volume,
            large_pour_inactivity_ms: c.large_pour_inactivity_ms,
            small_pour_inactivity_ms: c.small_pour_inactivity_ms,
        }
    }
}

// ── ReportCfg ────────────────────────────────────────────────────────────────

impl From<&pour_config::Report> for ReportCfg {
    fn from(c: &pour_config::Report) -> Self {
        Self {
            progress_interval_ms: c.progress_interval_ms,
            idle_interval_ms: c.idle_interval_ms,
        }
    }
}
