//! GPIO pulse capture via rppal async interrupts.
//!
//! The interrupt callback runs on rppal's own thread: it applies the
//! electrical debounce window and forwards the timestamp through the
//! bounded `PulseHandle`. Nothing else happens in interrupt context.

use std::time::{Duration, Instant};

use rppal::gpio::{Gpio, InputPin, Trigger};

use crate::error::HwError;
use pour_core::PulseHandle;

pub struct GpioPulseSource {
    // Held for the lifetime of the interrupt registration; dropping the pin
    // detaches the interrupt.
    _pin: InputPin,
    pin_number: u8,
}

impl GpioPulseSource {
    /// Attach to `bcm_pin` (pull-up, rising edge) and forward debounced
    /// pulses into `handle`. Edges closer together than `bounce_ms` are
    /// discarded as switch bounce before they ever reach the meter.
    pub fn open(bcm_pin: u8, bounce_ms: u64, handle: PulseHandle) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let mut pin = gpio
            .get(bcm_pin)
            .map_err(|e| HwError::Pin(bcm_pin, e.to_string()))?
            .into_input_pullup();

        let bounce = Duration::from_millis(bounce_ms);
        let epoch = Instant::now();
        let mut last_edge: Option<Instant> = None;
        pin.set_async_interrupt(Trigger::RisingEdge, move |_level| {
            let now = Instant::now();
            if let Some(prev) = last_edge
                && now.duration_since(prev) < bounce
            {
                return;
            }
            last_edge = Some(now);
            let at_ms = now.duration_since(epoch).as_millis().min(i64::MAX as u128) as i64;
            handle.pulse(at_ms);
        })
        .map_err(|e| HwError::Gpio(e.to_string()))?;

        tracing::info!(pin = bcm_pin, bounce_ms, "flow sensor interrupt attached");
        Ok(Self {
            _pin: pin,
            pin_number: bcm_pin,
        })
    }

    pub fn pin(&self) -> u8 {
        self.pin_number
    }
}

impl Drop for GpioPulseSource {
    fn drop(&mut self) {
        tracing::debug!(pin = self.pin_number, "flow sensor interrupt detached");
    }
}
