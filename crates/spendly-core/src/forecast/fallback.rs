//! Historical monthly-mean fallback

use std::collections::BTreeMap;

use chrono::Datelike;

use crate::series::CategorySeries;

/// Sum a series into calendar-month totals keyed by (year, month)
pub fn monthly_totals(series: &CategorySeries) -> BTreeMap<(i32, u32), f64> {
    let mut totals = BTreeMap::new();
    for point in series.points() {
        *totals
            .entry((point.date.year(), point.date.month()))
            .or_insert(0.0) += point.amount;
    }
    totals
}

/// Mean of the monthly totals present in the series
///
/// Months without any activity are not counted, so activity concentrated in
/// a few months is not diluted by sparse daily coverage.
pub fn monthly_mean(series: &CategorySeries) -> f64 {
    let totals = monthly_totals(series);
    totals.values().sum::<f64>() / totals.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_mean_of_monthly_totals() {
        let series = CategorySeries::from_daily(
            "Shopping",
            vec![
                (d(2024, 1, 5), 100.0),
                (d(2024, 1, 20), 50.0),
                (d(2024, 2, 10), 30.0),
            ],
        )
        .unwrap();

        let totals = monthly_totals(&series);
        assert_eq!(totals.get(&(2024, 1)), Some(&150.0));
        assert_eq!(totals.get(&(2024, 2)), Some(&30.0));
        assert_eq!(monthly_mean(&series), 90.0);
    }

    #[test]
    fn test_single_month_returns_its_total() {
        let series = CategorySeries::from_daily(
            "Travel",
            vec![(d(2024, 7, 1), 400.0), (d(2024, 7, 11), 120.0)],
        )
        .unwrap();
        assert_eq!(monthly_mean(&series), 520.0);
    }

    #[test]
    fn test_same_month_different_years_kept_apart() {
        let series = CategorySeries::from_daily(
            "Gifts",
            vec![(d(2023, 12, 20), 200.0), (d(2024, 12, 18), 100.0)],
        )
        .unwrap();
        assert_eq!(monthly_totals(&series).len(), 2);
        assert_eq!(monthly_mean(&series), 150.0);
    }

    #[test]
    fn test_gap_months_not_counted() {
        let series = CategorySeries::from_daily(
            "Insurance",
            vec![(d(2024, 1, 15), 600.0), (d(2024, 7, 15), 600.0)],
        )
        .unwrap();
        assert_eq!(monthly_mean(&series), 600.0);
    }

    #[test]
    fn test_deterministic() {
        let series = CategorySeries::from_daily(
            "Dining",
            vec![(d(2024, 3, 3), 13.37), (d(2024, 4, 4), 0.1), (d(2024, 4, 5), 0.2)],
        )
        .unwrap();
        assert_eq!(monthly_mean(&series).to_bits(), monthly_mean(&series).to_bits());
    }
}
