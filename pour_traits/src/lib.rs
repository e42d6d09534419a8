pub mod clock;

pub use clock::{Clock, MonotonicClock, TestClock};

/// Display-layer sink for pour lifecycle notifications.
///
/// All values are snapshots taken before the pour state is reset; the
/// implementation must not assume it can re-read them later. Calls happen on
/// the tick-loop thread and should return promptly; pulse capture is
/// decoupled from this path, but a slow presenter still delays the next tick.
///
/// `pours` is the count of previously completed pours; a pour being closed by
/// `show_large_pour` is added to the count only after the call returns.
pub trait Presenter {
    fn show_large_pour(&mut self, volume: f64, lifetime_total: f64, pours: u64);
    fn show_small_pour(&mut self, volume: f64);
    fn show_progress(&mut self, volume: f64, rate: f64);
    fn show_idle(&mut self, lifetime_total: f64, pours: u64);
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn show_large_pour(&mut self, volume: f64, lifetime_total: f64, pours: u64) {
        (**self).show_large_pour(volume, lifetime_total, pours);
    }
    fn show_small_pour(&mut self, volume: f64) {
        (**self).show_small_pour(volume);
    }
    fn show_progress(&mut self, volume: f64, rate: f64) {
        (**self).show_progress(volume, rate);
    }
    fn show_idle(&mut self, lifetime_total: f64, pours: u64) {
        (**self).show_idle(lifetime_total, pours);
    }
}

/// Key-value store for persisting counters (lifetime pulses, pour count)
/// across process restarts. The core never touches files itself; it only
/// exposes getters/setters that a store-backed caller wires up.
pub trait OptionStore {
    fn get(
        &self,
        key: &str,
    ) -> Result<Option<String>, Box<dyn std::error::Error + Send + Sync>>;
    fn put(
        &mut self,
        key: &str,
        value: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
