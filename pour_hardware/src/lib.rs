//! Pulse sources for the pour metering stack.
//!
//! The real sensor is a turbine flow meter wired to a GPIO pin; every
//! rising edge is one pulse. `GpioPulseSource` (feature `hardware`, Linux
//! only) registers an async interrupt and forwards debounced edges into a
//! `PulseHandle`. `SimulatedTap` is the development stand-in: a thread that
//! plays back a scripted pour at a fixed pulse rate.
//!
//! Neither source ever touches the meter directly; both go through the
//! bounded handoff in `pour_core::bridge`, keeping the capture path
//! non-blocking.

pub mod error;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod gpio;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use pour_core::PulseHandle;
use pour_traits::Clock;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use gpio::GpioPulseSource;

/// Simulated tap: emits a fixed number of pulses spaced `gap_ms` apart,
/// timestamped from its own spawn instant.
///
/// Safety: each `SimulatedTap` spawns exactly one thread that is shut down
/// when the tap is dropped or waited on, preventing thread leaks.
pub struct SimulatedTap {
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl SimulatedTap {
    pub fn pour<C: Clock + Send + Sync + 'static>(
        handle: PulseHandle,
        clock: C,
        pulses: u32,
        gap_ms: i64,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let gap = std::time::Duration::from_millis(gap_ms.max(1) as u64);

        let join_handle = std::thread::spawn(move || {
            let epoch = clock.now();
            for n in 0..pulses {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!(emitted = n, "simulated tap stopped early");
                    return;
                }
                clock.sleep(gap);
                handle.pulse(clock.ms_since(epoch));
            }
            tracing::debug!(pulses, "simulated tap finished pour");
        });

        Self {
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Block until the scripted pour has been fully emitted.
    pub fn wait(mut self) {
        if let Some(handle) = self.join_handle.take() {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "simulated tap thread panicked");
            }
        }
    }
}

impl Drop for SimulatedTap {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("simulated tap thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "simulated tap thread panicked during shutdown");
                }
            }
        }
    }
}
