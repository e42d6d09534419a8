//! Tick outcome reported from each evaluation of the pour lifecycle.

/// What a single `PourMonitor::tick` did. At most one callback fires per
/// tick; the variant mirrors it with the same snapshot values the presenter
/// received.
#[derive(Debug, Clone, PartialEq)]
pub enum TickEvent {
    /// No callback fired this tick.
    Quiet,
    /// Pour still in flight; presenter got a rate-limited progress update.
    Progress { volume: f64, rate: f64 },
    /// Pour closed below the minimum and was discarded (not counted).
    SmallPour { volume: f64 },
    /// Pour closed above the minimum and was counted.
    LargePour {
        volume: f64,
        lifetime_total: f64,
        pours: u64,
    },
    /// Idle refresh with running totals.
    Idle { lifetime_total: f64, pours: u64 },
}

impl TickEvent {
    /// True for the two pour-closing variants.
    pub fn closes_pour(&self) -> bool {
        matches!(self, Self::SmallPour { .. } | Self::LargePour { .. })
    }
}
