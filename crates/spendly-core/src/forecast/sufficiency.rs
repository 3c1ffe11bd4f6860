//! Data sufficiency scoring
//!
//! A heuristic confidence score deciding whether a series carries enough
//! signal for the seasonal model. Volume dominates, span matters less, and
//! stability contributes least through a reciprocal that stays in (0, 1].

use serde::Serialize;

use crate::series::CategorySeries;

/// Weight of the distinct-date count term
pub const VOLUME_WEIGHT: f64 = 0.5;
/// Weight of the time-span term
pub const SPAN_WEIGHT: f64 = 0.3;
/// Weight of the stability (inverse variance) term
pub const STABILITY_WEIGHT: f64 = 0.2;

/// Distinct dates that saturate the volume term
const VOLUME_SCALE: f64 = 30.0;
/// Days that saturate the span term
const SPAN_SCALE_DAYS: f64 = 365.0;

/// Inputs and result of a sufficiency calculation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sufficiency {
    pub num_points: usize,
    pub time_range_days: i64,
    pub variance: f64,
    pub score: f64,
}

impl Sufficiency {
    /// Contribution of the stability term alone
    pub fn stability_term(&self) -> f64 {
        STABILITY_WEIGHT * (1.0 / (1.0 + self.variance))
    }
}

/// Score a series
pub fn assess(series: &CategorySeries) -> Sufficiency {
    let num_points = series.len();
    let time_range_days = (series.last_date() - series.first_date()).num_days();
    let variance = sample_variance(series.amounts());

    let score = VOLUME_WEIGHT * (num_points as f64 / VOLUME_SCALE)
        + SPAN_WEIGHT * (time_range_days as f64 / SPAN_SCALE_DAYS)
        + STABILITY_WEIGHT * (1.0 / (1.0 + variance));

    Sufficiency {
        num_points,
        time_range_days,
        variance,
        score,
    }
}

/// Score a series, returning only the number
pub fn sufficiency_score(series: &CategorySeries) -> f64 {
    assess(series).score
}

/// Sample variance (n - 1 denominator); 0 for fewer than two values
fn sample_variance(values: impl Iterator<Item = f64>) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.len() < 2 {
        return 0.0;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    sum_sq / (n - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_single_point_uses_zero_variance() {
        let series = CategorySeries::from_daily("Gym", vec![(d(2024, 1, 1), 45.0)]).unwrap();
        let s = assess(&series);

        assert_eq!(s.num_points, 1);
        assert_eq!(s.time_range_days, 0);
        assert_eq!(s.variance, 0.0);
        assert_eq!(s.stability_term(), 0.2);
        assert!((s.score - (0.5 / 30.0 + 0.2)).abs() < 1e-12);
        assert!(s.score.is_finite());
    }

    #[test]
    fn test_score_matches_formula() {
        let series = CategorySeries::from_daily(
            "Dining",
            vec![
                (d(2024, 1, 1), 10.0),
                (d(2024, 1, 11), 20.0),
                (d(2024, 1, 21), 30.0),
            ],
        )
        .unwrap();
        let s = assess(&series);

        // mean 20, squared deviations 100 + 0 + 100, n - 1 = 2
        assert_eq!(s.variance, 100.0);
        assert_eq!(s.time_range_days, 20);
        let expected = 0.5 * (3.0 / 30.0) + 0.3 * (20.0 / 365.0) + 0.2 * (1.0 / 101.0);
        assert!((s.score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_score_monotone_in_volume_and_span() {
        let start = d(2024, 1, 1);
        let sparse = CategorySeries::from_daily(
            "A",
            (0..5).map(|i| (start + Duration::days(i * 7), 10.0)),
        )
        .unwrap();
        let dense = CategorySeries::from_daily(
            "A",
            (0..40).map(|i| (start + Duration::days(i * 7), 10.0)),
        )
        .unwrap();

        assert!(sufficiency_score(&dense) > sufficiency_score(&sparse));
    }

    #[test]
    fn test_score_decreases_with_variance() {
        let start = d(2024, 1, 1);
        let steady = CategorySeries::from_daily(
            "A",
            (0..10).map(|i| (start + Duration::days(i), 10.0)),
        )
        .unwrap();
        let noisy = CategorySeries::from_daily(
            "A",
            (0..10).map(|i| (start + Duration::days(i), if i % 2 == 0 { 1.0 } else { 50.0 })),
        )
        .unwrap();

        assert!(sufficiency_score(&steady) > sufficiency_score(&noisy));
    }

    fn two_points(span_days: i64, second: f64) -> f64 {
        let start = d(2024, 1, 1);
        let series = CategorySeries::from_daily(
            "Insurance",
            vec![(start, 100.0), (start + Duration::days(span_days), second)],
        )
        .unwrap();
        sufficiency_score(&series)
    }

    #[test]
    fn test_two_point_span_needed_to_cross_threshold() {
        // Equal amounts cross just past 324 days
        assert!(two_points(324, 100.0) <= 0.5);
        assert!(two_points(326, 100.0) > 0.5);

        // Large variance pushes the crossing towards 568 days
        assert!(two_points(566, 1e6) <= 0.5);
        assert!(two_points(569, 1e6) > 0.5);
    }

    #[test]
    fn test_score_finite_and_non_negative_for_negative_amounts() {
        let series = CategorySeries::from_daily(
            "Refunds",
            vec![(d(2024, 1, 1), -1e9), (d(2024, 6, 1), 1e9)],
        )
        .unwrap();
        let score = sufficiency_score(&series);
        assert!(score.is_finite());
        assert!(score >= 0.0);
    }
}
