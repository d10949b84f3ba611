//! Common test fixtures for staging tests.
//!
//! This module provides pre-defined dates, cadences and lattice layouts that
//! recur across unit and integration tests.

/// Common dates for testing.
pub mod dates {
    use chrono::{DateTime, TimeZone, Utc};

    /// Cadence origin used by most tests (2013-02-20T05:00:00Z).
    pub fn origin() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 2, 20, 5, 0, 0)
            .single()
            .unwrap_or_default()
    }

    /// Origin shifted by a whole number of seconds.
    pub fn origin_plus(seconds: i64) -> DateTime<Utc> {
        origin() + chrono::Duration::seconds(seconds)
    }

    /// A date in the middle of a leap day, for calendar edge cases.
    pub fn leap_day_noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2016, 2, 29, 12, 0, 0)
            .single()
            .unwrap_or_default()
    }
}

/// Common data cadences in seconds.
pub mod cadence {
    /// One minute.
    pub const MINUTE: f64 = 60.0;

    /// Fifteen minutes, typical of surface precipitation feeds.
    pub const QUARTER_HOUR: f64 = 900.0;

    /// One hour, typical of reanalysis products.
    pub const HOURLY: f64 = 3600.0;

    /// Six hours, typical of global model output.
    pub const SIX_HOURLY: f64 = 21600.0;
}

/// Common lattice layouts as `(lx1, lx2, lx3)`.
pub mod lattice {
    /// Single point.
    pub const POINT: (usize, usize, usize) = (1, 1, 1);

    /// Vertical profile.
    pub const PROFILE: (usize, usize, usize) = (20, 1, 1);

    /// Horizontal plane, singleton in x1.
    pub const SURFACE: (usize, usize, usize) = (1, 16, 12);

    /// Small full volume.
    pub const VOLUME: (usize, usize, usize) = (6, 5, 4);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_fixed() {
        assert_eq!(dates::origin().to_rfc3339(), "2013-02-20T05:00:00+00:00");
        assert_eq!(
            dates::origin_plus(3600).to_rfc3339(),
            "2013-02-20T06:00:00+00:00"
        );
    }

    #[test]
    fn test_leap_day() {
        assert_eq!(
            dates::leap_day_noon().to_rfc3339(),
            "2016-02-29T12:00:00+00:00"
        );
    }

    #[test]
    fn test_cadences_are_positive() {
        for c in [
            cadence::MINUTE,
            cadence::QUARTER_HOUR,
            cadence::HOURLY,
            cadence::SIX_HOURLY,
        ] {
            assert!(c > 0.0);
        }
    }

    #[test]
    fn test_lattice_layouts() {
        let (a, b, c) = lattice::SURFACE;
        assert_eq!(a, 1);
        assert_eq!(b * c, 192);
        let (a, b, c) = lattice::VOLUME;
        assert_eq!(a * b * c, 120);
    }
}
