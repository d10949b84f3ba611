//! Two-frame temporal bracketing and linear-in-time interpolation.

use chrono::{DateTime, Utc};
use ndarray::{Axis as NdAxis, Zip};

use crate::storage::Storage;
use crate::types::{ShapeCategory, Slot};

/// Refresh state of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StagerState {
    /// No frame has been loaded yet.
    #[default]
    Unprimed,
    /// Both slots hold frames bracketing `tref`.
    Loaded,
}

/// Reference times of the two slots and the current interpolation time.
///
/// Times are seconds relative to the simulation start (or restart) date.
/// Negative simulation times are reserved for priming.
#[derive(Debug, Clone, Default)]
pub struct TemporalStager {
    cadence: Option<f64>,
    tref: [f64; 2],
    ref_dates: [DateTime<Utc>; 2],
    tnow: f64,
    state: StagerState,
}

impl TemporalStager {
    /// Set the data cadence in seconds.
    pub fn set_cadence(&mut self, cadence: f64) {
        self.cadence = Some(cadence);
    }

    /// Data cadence in seconds, if set.
    pub fn cadence(&self) -> Option<f64> {
        self.cadence
    }

    /// Reference times of the previous and next slots.
    pub fn tref(&self) -> [f64; 2] {
        self.tref
    }

    /// Calendar dates of the previous and next slots.
    pub fn ref_dates(&self) -> [DateTime<Utc>; 2] {
        self.ref_dates
    }

    /// Time the "now" buffers were last interpolated to.
    pub fn tnow(&self) -> f64 {
        self.tnow
    }

    /// Current refresh state.
    pub fn state(&self) -> StagerState {
        self.state
    }

    /// Overwrite the reference times.
    pub fn set_tref(&mut self, tref: [f64; 2]) {
        self.tref = tref;
    }

    /// Set both reference dates to `date`.
    pub fn seed_dates(&mut self, date: DateTime<Utc>) {
        self.ref_dates = [date, date];
    }

    /// Whether a new frame must be loaded before interpolating at step `t`.
    ///
    /// Due when the step midpoint reaches the next reference time, or always
    /// for negative `t` (priming).
    pub fn refresh_due(&self, t: f64, dt_model: f64) -> bool {
        t + dt_model / 2.0 >= self.tref[1] || t < 0.0
    }

    /// Advance bookkeeping after a frame dated `loaded` went into the next slot.
    pub fn advance(&mut self, cadence: f64, loaded: DateTime<Utc>) {
        self.tref[0] = self.tref[1];
        self.tref[1] = self.tref[0] + cadence;
        self.ref_dates[0] = self.ref_dates[1];
        self.ref_dates[1] = loaded;
        self.state = StagerState::Loaded;
    }

    /// Fill every "now" buffer with values interpolated linearly in time to
    /// the midpoint of the step starting at `t`.
    ///
    /// `now = previous + (next - previous) / (tref1 - tref0) * (tnow - tref0)`.
    /// Extrapolates when `tnow` lies outside the bracket.
    pub fn interpolate(&mut self, storage: &mut Storage, t: f64, dt_model: f64) {
        let tnow = t + dt_model / 2.0;
        let span = self.tref[1] - self.tref[0];
        let offset = tnow - self.tref[0];

        for category in ShapeCategory::ALL {
            let (dual, mut now) = storage.dual_and_now(category);
            let slot_axis = NdAxis(dual.ndim() - 1);
            let previous = dual.index_axis(slot_axis, Slot::Previous.index());
            let next = dual.index_axis(slot_axis, Slot::Next.index());

            Zip::from(&mut now)
                .and(&previous)
                .and(&next)
                .for_each(|out, &prev, &nxt| {
                    let slope = if span > 0.0 { (nxt - prev) / span } else { 0.0 };
                    *out = prev + slope * offset;
                });
        }

        self.tnow = tnow;
    }

    /// Forget loaded frames; cadence is kept.
    pub fn reset(&mut self) {
        *self = Self {
            cadence: self.cadence,
            ..Self::default()
        };
    }
}
