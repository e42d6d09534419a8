//! Common time/period helpers for pour_core.

/// Number of milliseconds in one second.
pub const MILLIS_PER_SEC: i64 = 1_000;

/// Tick period that keeps the monitor at least as fine-grained as the
/// fastest configured report interval.
/// - Never slower than a quarter of the smallest interval, so a report is
///   at most one tick late.
/// - Clamped to [10, 100] ms to bound both busy-spin and staleness.
#[inline]
pub fn tick_period_ms(progress_interval_ms: i64, idle_interval_ms: i64) -> u64 {
    let smallest = progress_interval_ms.min(idle_interval_ms).max(1);
    (smallest / 4).clamp(10, 100) as u64
}
