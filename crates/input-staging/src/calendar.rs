//! Date arithmetic for cadence-aligned input frames.

use chrono::{DateTime, Duration, Utc};

/// Convert a duration in seconds to a chrono duration (microsecond resolution).
pub fn duration_from_secs(secs: f64) -> Duration {
    Duration::microseconds((secs * 1.0e6).round() as i64)
}

/// Signed number of seconds from `from` to `to`.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    let delta = to - from;
    match delta.num_microseconds() {
        Some(us) => us as f64 * 1.0e-6,
        None => delta.num_milliseconds() as f64 * 1.0e-3,
    }
}

/// Latest cadence slot `origin + k * cadence` that is at or before `target`.
///
/// Slots extend before the origin as well, so a target earlier than the origin
/// yields a slot with negative `k`.
pub fn last_frame_at_or_before(
    origin: DateTime<Utc>,
    target: DateTime<Utc>,
    cadence_secs: f64,
) -> DateTime<Utc> {
    let step = duration_from_secs(cadence_secs);
    let (Some(step_us), Some(elapsed_us)) = (
        step.num_microseconds(),
        (target - origin).num_microseconds(),
    ) else {
        return target;
    };
    if step_us <= 0 {
        return target;
    }

    let slots = elapsed_us.div_euclid(step_us);
    origin + Duration::microseconds(slots * step_us)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2013, 2, 20, h, m, s).unwrap()
    }

    #[test]
    fn test_seconds_between() {
        assert!((seconds_between(at(5, 0, 0), at(5, 1, 30)) - 90.0).abs() < 1e-9);
        assert!((seconds_between(at(5, 1, 30), at(5, 0, 0)) + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_last_frame_on_slot() {
        let origin = at(5, 0, 0);
        assert_eq!(last_frame_at_or_before(origin, at(5, 2, 0), 60.0), at(5, 2, 0));
    }

    #[test]
    fn test_last_frame_between_slots() {
        let origin = at(5, 0, 0);
        assert_eq!(last_frame_at_or_before(origin, at(5, 2, 59), 60.0), at(5, 2, 0));
        assert_eq!(last_frame_at_or_before(origin, at(5, 7, 10), 300.0), at(5, 5, 0));
    }

    #[test]
    fn test_last_frame_before_origin() {
        let origin = at(5, 0, 0);
        assert_eq!(last_frame_at_or_before(origin, at(4, 59, 30), 60.0), at(4, 59, 0));
    }

    #[test]
    fn test_last_frame_crosses_midnight() {
        let origin = Utc.with_ymd_and_hms(2013, 2, 20, 23, 30, 0).unwrap();
        let target = Utc.with_ymd_and_hms(2013, 2, 21, 0, 17, 0).unwrap();
        let expected = Utc.with_ymd_and_hms(2013, 2, 21, 0, 15, 0).unwrap();
        assert_eq!(last_frame_at_or_before(origin, target, 900.0), expected);
    }

    #[test]
    fn test_duration_from_fractional_secs() {
        assert_eq!(duration_from_secs(1.5), Duration::milliseconds(1500));
    }
}
