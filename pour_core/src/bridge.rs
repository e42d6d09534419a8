//! Bounded pulse handoff between the capture boundary and the meter.
//!
//! Interrupt-style boundaries that cannot (or should not) touch shared
//! state directly push raw pulse timestamps through a bounded channel; a
//! pump thread owned by the `PulseBridge` applies them to the `FlowMeter`
//! in arrival order. The producer side never blocks: a full queue drops the
//! pulse and counts it, keeping the capture path O(1).
//!
//! Safety: each `PulseBridge` spawns exactly one thread that is shut down
//! when the bridge is dropped, preventing thread leaks.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use crate::meter::FlowMeter;

/// Poll granularity of the pump thread's shutdown check.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(20);

/// Cheap, cloneable producer handle. Safe to call from any thread,
/// including an interrupt callback context.
#[derive(Clone)]
pub struct PulseHandle {
    tx: xch::Sender<i64>,
    dropped: Arc<AtomicU64>,
}

impl PulseHandle {
    /// Submit one pulse timestamp. Never blocks; a full queue drops the
    /// pulse and bumps the drop counter.
    pub fn pulse(&self, at_ms: i64) {
        if self.tx.try_send(at_ms).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Pulses dropped due to a full queue since the bridge was spawned.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

pub struct PulseBridge {
    handle: PulseHandle,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl PulseBridge {
    pub fn spawn(meter: Arc<FlowMeter>, capacity: usize) -> Self {
        let (tx, rx) = xch::bounded(capacity.max(1));
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let dropped = Arc::new(AtomicU64::new(0));

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("pulse bridge received shutdown signal");
                    break;
                }
                match rx.recv_timeout(DRAIN_TIMEOUT) {
                    Ok(at_ms) => meter.record_pulse(at_ms),
                    Err(xch::RecvTimeoutError::Timeout) => {}
                    Err(xch::RecvTimeoutError::Disconnected) => {
                        tracing::debug!("pulse bridge producers disconnected");
                        break;
                    }
                }
            }
            tracing::trace!("pulse bridge thread exiting cleanly");
        });

        Self {
            handle: PulseHandle { tx, dropped },
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    pub fn handle(&self) -> PulseHandle {
        self.handle.clone()
    }
}

impl Drop for PulseBridge {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        // Thread exits within one DRAIN_TIMEOUT of the flag being set.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("pulse bridge thread joined successfully");
                }
                Err(e) => {
                    // Thread panicked; log but don't propagate (we're in Drop)
                    tracing::warn!(?e, "pulse bridge thread panicked during shutdown");
                }
            }
        }
    }
}
