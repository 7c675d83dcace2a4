//! Windowed trend statistics over a dated numeric series.
//!
//! Shared by the weight and wellness-score views: filter to a trailing
//! window, compare the first and last observations, and classify the
//! direction with a small deadband so measurement noise reads as "stable".

use crate::{DatedPoint, Error, Result, Trend, TrendDirection};
use chrono::{DateTime, Duration, Utc};

/// Percent change at or below which a series is classified as stable
const STABLE_DEADBAND_PCT: f64 = 0.5;

/// Change, percent change, and direction over the last `window_days` days
///
/// The series may arrive in any order; points are ordered by date (ties
/// keep their input order) and filtered to `[now - window_days, now]`.
/// Fewer than two points in the window is an expected state and returns
/// `Ok(None)` rather than an error; a first observation of exactly zero
/// cannot be turned into a percent change and is rejected.
pub fn windowed_trend(
    series: &[DatedPoint],
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<Option<Trend>> {
    let today = now.date_naive();
    let cutoff = today - Duration::days(window_days);

    let mut window: Vec<&DatedPoint> = series
        .iter()
        .filter(|p| p.date >= cutoff && p.date <= today)
        .collect();
    window.sort_by_key(|p| p.date);

    if window.len() < 2 {
        return Ok(None);
    }

    let first = window[0].value;
    let last = window[window.len() - 1].value;

    if first == 0.0 {
        return Err(Error::InvalidInput(
            "cannot compute percent change from a zero baseline".into(),
        ));
    }

    let change = last - first;
    let percent_change = change / first * 100.0;

    let direction = if percent_change.abs() <= STABLE_DEADBAND_PCT {
        TrendDirection::Stable
    } else if change > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };

    Ok(Some(Trend {
        change,
        percent_change,
        direction,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn point(year: i32, month: u32, day: u32, value: f64) -> DatedPoint {
        DatedPoint {
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            value,
        }
    }

    #[test]
    fn test_change_within_deadband_is_stable() {
        let series = vec![point(2024, 6, 1, 100.0), point(2024, 6, 14, 100.4)];

        let trend = windowed_trend(&series, 30, fixed_now()).unwrap().unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert!((trend.change - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_change_past_deadband_goes_up() {
        let series = vec![point(2024, 6, 1, 100.0), point(2024, 6, 14, 100.6)];

        let trend = windowed_trend(&series, 30, fixed_now()).unwrap().unwrap();
        assert_eq!(trend.direction, TrendDirection::Up);
    }

    #[test]
    fn test_downward_change_goes_down() {
        let series = vec![point(2024, 6, 1, 200.0), point(2024, 6, 14, 192.0)];

        let trend = windowed_trend(&series, 30, fixed_now()).unwrap().unwrap();
        assert_eq!(trend.direction, TrendDirection::Down);
        assert_eq!(trend.change, -8.0);
        assert!((trend.percent_change - -4.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_point_is_insufficient_data() {
        let series = vec![point(2024, 6, 10, 150.0)];
        assert_eq!(windowed_trend(&series, 30, fixed_now()).unwrap(), None);
    }

    #[test]
    fn test_points_outside_window_are_ignored() {
        // Only one point falls inside the 7-day window
        let series = vec![
            point(2024, 4, 1, 210.0),
            point(2024, 5, 1, 205.0),
            point(2024, 6, 12, 195.0),
        ];
        assert_eq!(windowed_trend(&series, 7, fixed_now()).unwrap(), None);
    }

    #[test]
    fn test_future_points_are_ignored() {
        let series = vec![
            point(2024, 6, 1, 200.0),
            point(2024, 6, 14, 198.0),
            point(2024, 7, 1, 150.0),
        ];

        let trend = windowed_trend(&series, 30, fixed_now()).unwrap().unwrap();
        assert_eq!(trend.change, -2.0);
    }

    #[test]
    fn test_unsorted_input_is_ordered_by_date() {
        let series = vec![point(2024, 6, 14, 195.0), point(2024, 6, 1, 200.0)];

        let trend = windowed_trend(&series, 30, fixed_now()).unwrap().unwrap();
        assert_eq!(trend.change, -5.0);
        assert_eq!(trend.direction, TrendDirection::Down);
    }

    #[test]
    fn test_zero_baseline_is_rejected() {
        let series = vec![point(2024, 6, 1, 0.0), point(2024, 6, 14, 10.0)];

        assert!(matches!(
            windowed_trend(&series, 30, fixed_now()),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_empty_series_is_insufficient_data() {
        assert_eq!(windowed_trend(&[], 30, fixed_now()).unwrap(), None);
    }
}
