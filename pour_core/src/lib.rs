#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core pour metering logic (hardware-agnostic).
//!
//! This crate converts debounced flow-sensor pulses into volume and drives
//! the pour lifecycle: deciding when a pour started, is progressing, has
//! ended, and whether it counts as a real serving. All hardware and display
//! interactions go through `pour_traits` (`Presenter`, `Clock`,
//! `OptionStore`).
//!
//! ## Architecture
//!
//! - **Metering**: pulse/volume bookkeeping shared with the capture
//!   boundary (`meter` module)
//! - **Lifecycle**: tick-driven classification with inactivity hysteresis
//!   (`monitor` module)
//! - **Handoff**: bounded, non-blocking pulse delivery for boundaries that
//!   cannot touch shared state (`bridge` module)
//! - **Orchestration**: the tick loop as a library function (`runner`)
//!
//! ## Fixed-point bookkeeping
//!
//! Internals count **pulses** in `u64` for exact accumulation; conversion
//! to volume units happens only at the read boundary
//! (`FlowMeter::pour_volume` and friends).

pub mod bridge;
pub mod builder;
pub mod config;
pub mod conversions;
pub mod error;
pub mod events;
pub mod meter;
pub mod mocks;
pub mod monitor;
pub mod runner;
pub mod util;

pub use bridge::{PulseBridge, PulseHandle};
pub use config::{MeterCfg, PourCfg, ReportCfg, UnitSystem};
pub use error::{BuildError, PourError, Result};
pub use events::TickEvent;
pub use meter::FlowMeter;
pub use monitor::{PourMonitor, PourState};
pub use runner::RunSummary;
