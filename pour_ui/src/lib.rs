#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Presentation layer: unit-aware formatting and the console presenter.
//!
//! The meter works in abstract volume units: litres under Metric, pints
//! under Imperial. The calibration constant decides the unit; the unit
//! system only labels it. Everything here is display glue; none of it
//! feeds back into the lifecycle.

use pour_core::UnitSystem;
use pour_traits::Presenter;

/// Per-pour amount in the customary small unit: centilitres or fluid
/// ounces (16 fl oz per pint).
pub fn format_pour(volume: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format!("{} cl", (volume * 100.0).round() as i64),
        UnitSystem::Imperial => format!("{:.1} oz", volume * 16.0),
    }
}

/// Running total in the large unit.
pub fn format_total(volume: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format!("{:.1} L", volume),
        UnitSystem::Imperial => format!("{:.1} pints", volume),
    }
}

/// Diagnostic flow rate, volume units per second.
pub fn format_rate(rate: f64, units: UnitSystem) -> String {
    match units {
        UnitSystem::Metric => format!("{:.2} L/s", rate),
        UnitSystem::Imperial => format!("{:.2} pints/s", rate),
    }
}

/// Fraction of a nominal serving poured so far, clamped to [0, 1].
/// A non-positive target yields 0 rather than a division blow-up.
pub fn progress_fraction(volume: f64, target: f64) -> f64 {
    if !(target > 0.0) {
        return 0.0;
    }
    (volume / target).clamp(0.0, 1.0)
}

/// Fixed-width text progress bar, the terminal stand-in for the original
/// backlight bar graph.
pub fn render_progress_bar(fraction: f64, width: usize) -> String {
    let width = width.max(1);
    let filled = (fraction.clamp(0.0, 1.0) * width as f64).round() as usize;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for i in 0..width {
        bar.push(if i < filled { '#' } else { '-' });
    }
    bar.push(']');
    bar
}

/// Terminal presenter: one line per lifecycle notification.
pub struct ConsolePresenter {
    beverage: String,
    target_pour_size: f64,
    units: UnitSystem,
}

impl ConsolePresenter {
    pub fn new(beverage: impl Into<String>, target_pour_size: f64, units: UnitSystem) -> Self {
        Self {
            beverage: beverage.into(),
            target_pour_size,
            units,
        }
    }
}

impl Presenter for ConsolePresenter {
    fn show_large_pour(&mut self, volume: f64, lifetime_total: f64, pours: u64) {
        println!(
            "Cheers! Poured {} of {} (total {}, {} pours)",
            format_pour(volume, self.units),
            self.beverage,
            format_total(lifetime_total, self.units),
            pours + 1
        );
    }

    fn show_small_pour(&mut self, volume: f64) {
        println!(
            "No {} for you! {} is below the minimum; not counted",
            self.beverage,
            format_pour(volume, self.units)
        );
    }

    fn show_progress(&mut self, volume: f64, rate: f64) {
        let bar = render_progress_bar(
            progress_fraction(volume, self.target_pour_size),
            16,
        );
        println!(
            "{} {} {} ({})",
            self.beverage,
            bar,
            format_pour(volume, self.units),
            format_rate(rate, self.units)
        );
    }

    fn show_idle(&mut self, lifetime_total: f64, pours: u64) {
        println!(
            "{} | {} pours | {} served",
            self.beverage,
            pours,
            format_total(lifetime_total, self.units)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pour_formatting_rounds_to_centiliters() {
        assert_eq!(format_pour(0.25, UnitSystem::Metric), "25 cl");
        assert_eq!(format_pour(0.304, UnitSystem::Metric), "30 cl");
        assert_eq!(format_pour(0.5, UnitSystem::Imperial), "8.0 oz");
    }

    #[test]
    fn total_formatting_uses_one_decimal() {
        assert_eq!(format_total(1.25, UnitSystem::Metric), "1.2 L");
        assert_eq!(format_total(3.0, UnitSystem::Imperial), "3.0 pints");
    }

    #[test]
    fn progress_fraction_is_clamped_and_safe() {
        assert_eq!(progress_fraction(0.2, 0.4), 0.5);
        assert_eq!(progress_fraction(1.0, 0.4), 1.0);
        assert_eq!(progress_fraction(0.2, 0.0), 0.0);
        assert_eq!(progress_fraction(0.2, f64::NAN), 0.0);
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(render_progress_bar(0.0, 4), "[----]");
        assert_eq!(render_progress_bar(0.5, 4), "[##--]");
        assert_eq!(render_progress_bar(1.0, 4), "[####]");
        assert_eq!(render_progress_bar(2.0, 4), "[####]");
    }
}
