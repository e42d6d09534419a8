#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the pour metering stack.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - `apply_env_overrides` layers `POUR_*` environment variables on top of
//!   the file, for deployments that configure through the environment.
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Meter {
    /// Sensor calibration: pulses per volume unit.
    pub pulses_per_unit: f64,
    pub units: Units,
}

impl Default for Meter {
    fn default() -> Self {
        Self {
            pulses_per_unit: 5600.0,
            units: Units::Metric,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Pour {
    /// Volume below which a closed pour is discarded rather than counted.
    pub minimum_pour_volume: f64,
    /// Sensor inactivity that closes a pour above the minimum.
    pub large_pour_inactivity_ms: i64,
    /// Sensor inactivity that discards a pour at or below the minimum.
    pub small_pour_inactivity_ms: i64,
}

impl Default for Pour {
    fn default() -> Self {
        Self {
            minimum_pour_volume: 0.23,
            large_pour_inactivity_ms: 10_000,
            small_pour_inactivity_ms: 2_000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Report {
    pub progress_interval_ms: i64,
    pub idle_interval_ms: i64,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            progress_interval_ms: 500,
            idle_interval_ms: 15_000,
        }
    }
}

/// Presentation-only options; the core never reads these.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Display {
    /// Label shown on progress and idle screens.
    pub beverage: String,
    /// Nominal serving used for the progress fraction.
    pub target_pour_size: f64,
}

impl Default for Display {
    fn default() -> Self {
        Self {
            beverage: "beer".to_string(),
            target_pour_size: 0.4,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Hardware {
    /// BCM pin the flow sensor's pulse line is wired to.
    pub gpio_pin: u8,
    /// Electrical debounce window applied at the GPIO boundary.
    pub bounce_ms: u64,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            gpio_pin: 26,
            bounce_ms: 20,
        }
    }
}

/// Defaults for the `simulate` subcommand's synthetic pour.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Simulation {
    pub pulse_count: u32,
    pub pulse_gap_ms: i64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            pulse_count: 2_000,
            pulse_gap_ms: 20,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub meter: Meter,
    pub pour: Pour,
    pub report: Report,
    pub display: Display,
    pub logging: Logging,
    pub hardware: Hardware,
    pub simulation: Simulation,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Meter
        if !self.meter.pulses_per_unit.is_finite() || self.meter.pulses_per_unit <= 0.0 {
            eyre::bail!("meter.pulses_per_unit must be finite and > 0");
        }

        // Pour
        if !self.pour.minimum_pour_volume.is_finite() || self.pour.minimum_pour_volume <= 0.0 {
            eyre::bail!("pour.minimum_pour_volume must be finite and > 0");
        }
        if self.pour.large_pour_inactivity_ms < 1 {
            eyre::bail!("pour.large_pour_inactivity_ms must be >= 1");
        }
        if self.pour.small_pour_inactivity_ms < 1 {
            eyre::bail!("pour.small_pour_inactivity_ms must be >= 1");
        }

        // Report
        if self.report.progress_interval_ms < 1 {
            eyre::bail!("report.progress_interval_ms must be >= 1");
        }
        if self.report.idle_interval_ms < 1 {
            eyre::bail!("report.idle_interval_ms must be >= 1");
        }
        if self.report.idle_interval_ms > 24 * 60 * 60 * 1000 {
            eyre::bail!("report.idle_interval_ms is unreasonably large (>24h)");
        }

        // Display
        if !self.display.target_pour_size.is_finite() || self.display.target_pour_size <= 0.0 {
            eyre::bail!("display.target_pour_size must be finite and > 0");
        }

        // Hardware
        if self.hardware.bounce_ms == 0 {
            eyre::bail!("hardware.bounce_ms must be >= 1");
        }

        // Simulation
        if self.simulation.pulse_count == 0 {
            eyre::bail!("simulation.pulse_count must be >= 1");
        }
        if self.simulation.pulse_gap_ms < 1 {
            eyre::bail!("simulation.pulse_gap_ms must be >= 1");
        }

        Ok(())
    }

    /// Layer `POUR_*` environment variables over the file config. Unset
    /// variables leave the file value untouched; malformed values are
    /// rejected rather than silently ignored.
    pub fn apply_env_overrides(&mut self) -> eyre::Result<()> {
        if let Some(v) = env_parse::<f64>("POUR_PULSES_PER_UNIT")? {
            self.meter.pulses_per_unit = v;
        }
        if let Some(v) = std::env::var_os("POUR_UNITS") {
            let v = v.to_string_lossy().to_ascii_lowercase();
            self.meter.units = match v.as_str() {
                "metric" => Units::Metric,
                "imperial" => Units::Imperial,
                other => eyre::bail!("POUR_UNITS must be 'metric' or 'imperial', got '{other}'"),
            };
        }
        if let Some(v) = env_parse::<f64>("POUR_MINIMUM_POUR_SIZE")? {
            self.pour.minimum_pour_volume = v;
        }
        if let Some(v) = env_parse::<i64>("POUR_LARGE_POUR_INACTIVITY_MS")? {
            self.pour.large_pour_inactivity_ms = v;
        }
        if let Some(v) = env_parse::<i64>("POUR_SMALL_POUR_INACTIVITY_MS")? {
            self.pour.small_pour_inactivity_ms = v;
        }
        if let Some(v) = env_parse::<i64>("POUR_PROGRESS_INTERVAL_MS")? {
            self.report.progress_interval_ms = v;
        }
        if let Some(v) = env_parse::<i64>("POUR_IDLE_INTERVAL_MS")? {
            self.report.idle_interval_ms = v;
        }
        if let Some(v) = env_parse::<f64>("POUR_TARGET_POUR_SIZE")? {
            self.display.target_pour_size = v;
        }
        if let Some(v) = std::env::var_os("POUR_BEVERAGE") {
            self.display.beverage = v.to_string_lossy().into_owned();
        }
        if let Some(v) = env_parse::<u8>("POUR_GPIO_PIN")? {
            self.hardware.gpio_pin = v;
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> eyre::Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => Ok(Some(v)),
            Err(e) => eyre::bail!("invalid {key}={raw}: {e}"),
        },
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => eyre::bail!("cannot read {key}: {e}"),
    }
}
