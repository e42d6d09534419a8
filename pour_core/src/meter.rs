//! Pulse/volume bookkeeping for one flow sensor.
//!
//! A `FlowMeter` is shared between an interrupt-context producer (pulse
//! arrivals) and the polling tick loop (reads and pour resets), so every
//! mutable field is an atomic and all methods take `&self`. Volume is kept
//! as an integral pulse count and converted to volume units only at the
//! read boundary; accumulation is exact and the hot path is O(1),
//! lock-free, and allocation-free.
//!
//! Readers may observe counters and timestamps from slightly different
//! pulse boundaries. That is by contract: the lifecycle evaluation only
//! needs monotonic, eventually-consistent values, never a transactional
//! snapshot of the whole struct.

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};

use crate::config::{MeterCfg, UnitSystem};
use crate::error::BuildError;
use crate::util::MILLIS_PER_SEC;

/// Sentinel for "no pulse recorded yet".
const NO_PULSE: i64 = i64::MIN;

#[derive(Debug)]
pub struct FlowMeter {
    /// Calibration constant; pulses per volume unit. Immutable.
    pulses_per_unit: f64,
    unit_system: UnitSystem,
    /// Capture gate. When false, pulses are ignored without detaching the
    /// interrupt source.
    enabled: AtomicBool,
    /// Pulses since the last pour reset.
    pour_pulses: AtomicU64,
    /// Pulses across the process lifetime (plus any restored baseline).
    lifetime_pulses: AtomicU64,
    /// Completed pours (only resets flagged `counts` increment this).
    pours: AtomicU64,
    /// Timestamp of the most recent accepted pulse; only ever advances.
    last_pulse_ms: AtomicI64,
    /// Interval between the two most recent pulses; 0 until two exist.
    pulse_gap_ms: AtomicI64,
}

impl FlowMeter {
    /// Build a meter from its calibration config. Refuses a calibration
    /// constant that would divide by zero (or worse) later.
    pub fn new(cfg: MeterCfg) -> Result<Self, BuildError> {
        if !cfg.pulses_per_unit.is_finite() || cfg.pulses_per_unit <= 0.0 {
            return Err(BuildError::InvalidConfig(
                "pulses_per_unit must be finite and > 0",
            ));
        }
        Ok(Self {
            pulses_per_unit: cfg.pulses_per_unit,
            unit_system: cfg.unit_system,
            enabled: AtomicBool::new(true),
            pour_pulses: AtomicU64::new(0),
            lifetime_pulses: AtomicU64::new(0),
            pours: AtomicU64::new(0),
            last_pulse_ms: AtomicI64::new(NO_PULSE),
            pulse_gap_ms: AtomicI64::new(0),
        })
    }

    /// Record one debounced sensor pulse.
    ///
    /// Single-producer: only the pulse boundary calls this, so the
    /// load-then-store on `last_pulse_ms` races with nothing but itself.
    /// A timestamp not later than the stored one is duplicate/out-of-order
    /// bounce from the boundary layer and is dropped without trace.
    pub fn record_pulse(&self, at_ms: i64) {
        if !self.enabled.load(Ordering::Relaxed) {
            return;
        }
        let last = self.last_pulse_ms.load(Ordering::Relaxed);
        if last != NO_PULSE && at_ms <= last {
            return;
        }
        if last != NO_PULSE {
            self.pulse_gap_ms.store(at_ms - last, Ordering::Relaxed);
        }
        self.last_pulse_ms.store(at_ms, Ordering::Relaxed);
        self.pour_pulses.fetch_add(1, Ordering::Relaxed);
        self.lifetime_pulses.fetch_add(1, Ordering::Relaxed);
    }

    /// Close out the current pour. `counts` decides whether it joins the
    /// completed-pour tally; the volume itself was already folded into the
    /// lifetime total pulse by pulse, so nothing is added here.
    pub fn reset_pour(&self, counts: bool) {
        self.pour_pulses.store(0, Ordering::Relaxed);
        if counts {
            self.pours.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Milliseconds of sensor inactivity as of `now_ms`. Effectively
    /// infinite before the first pulse. Deliberately unaffected by pour
    /// resets: inactivity is measured against the sensor, not against
    /// application bookkeeping.
    pub fn ms_since_last_pulse(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.last_pulse_ms.load(Ordering::Relaxed))
    }

    /// Has any pulse arrived strictly after `t_ms`?
    pub fn active_since(&self, t_ms: i64) -> bool {
        let last = self.last_pulse_ms.load(Ordering::Relaxed);
        last != NO_PULSE && last > t_ms
    }

    /// Instantaneous flow in volume units per second, derived from the gap
    /// between the last two pulses. 0.0 until two pulses exist. Diagnostic
    /// only; the lifecycle never reads this.
    pub fn flow_rate(&self) -> f64 {
        let gap = self.pulse_gap_ms.load(Ordering::Relaxed);
        if gap <= 0 {
            return 0.0;
        }
        MILLIS_PER_SEC as f64 / (self.pulses_per_unit * gap as f64)
    }

    /// Volume accumulated since the last pour reset.
    pub fn pour_volume(&self) -> f64 {
        self.pour_pulses.load(Ordering::Relaxed) as f64 / self.pulses_per_unit
    }

    /// Volume accumulated across the process lifetime.
    pub fn lifetime_total(&self) -> f64 {
        self.lifetime_pulses.load(Ordering::Relaxed) as f64 / self.pulses_per_unit
    }

    pub fn pour_pulses(&self) -> u64 {
        self.pour_pulses.load(Ordering::Relaxed)
    }

    pub fn lifetime_pulses(&self) -> u64 {
        self.lifetime_pulses.load(Ordering::Relaxed)
    }

    pub fn completed_pours(&self) -> u64 {
        self.pours.load(Ordering::Relaxed)
    }

    /// Restore persisted totals at startup. Counters are stored as pulse
    /// counts so restore-then-accumulate stays exact.
    pub fn restore_totals(&self, lifetime_pulses: u64, pours: u64) {
        self.lifetime_pulses.store(lifetime_pulses, Ordering::Relaxed);
        self.pours.store(pours, Ordering::Relaxed);
    }

    /// Pause/resume capture without detaching the pulse source.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.unit_system
    }

    pub fn pulses_per_unit(&self) -> f64 {
        self.pulses_per_unit
    }
}
