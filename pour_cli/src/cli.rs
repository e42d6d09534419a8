//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "pour", version, about = "Pour metering CLI")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "etc/pour_config.toml")]
    pub config: PathBuf,

    /// Path to the counter store TOML (lifetime totals, pour count)
    #[arg(long, value_name = "FILE", default_value = "pour_state.toml")]
    pub state: PathBuf,

    /// Emit lifecycle events and logs as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Attach to the flow sensor (or the simulated tap without the
    /// `hardware` feature) and run the pour monitor until interrupted
    Run {
        /// Override the sensor GPIO pin from the config
        #[arg(long)]
        gpio_pin: Option<u8>,

        /// Start measurement paused; pulses are ignored until resumed
        #[arg(long, action = ArgAction::SetTrue)]
        paused: bool,
    },
    /// Play back one scripted pour through the full stack and exit once it
    /// has been classified
    Simulate {
        /// Number of pulses to emit (defaults to [simulation] in the config)
        #[arg(long)]
        pulses: Option<u32>,

        /// Gap between pulses in milliseconds
        #[arg(long)]
        gap_ms: Option<i64>,
    },
}
