//! Test and helper mocks for pour_core

use pour_traits::Presenter;

/// A presenter that swallows every notification; useful when only the
/// returned `TickEvent`s matter.
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn show_large_pour(&mut self, _volume: f64, _lifetime_total: f64, _pours: u64) {}
    fn show_small_pour(&mut self, _volume: f64) {}
    fn show_progress(&mut self, _volume: f64, _rate: f64) {}
    fn show_idle(&mut self, _lifetime_total: f64, _pours: u64) {}
}
