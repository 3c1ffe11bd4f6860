//! Series building
//!
//! Turns stored records into typed [`TransactionPoint`]s and groups them into
//! one chronological [`CategorySeries`] per category, summing same-day
//! amounts. Income records are excluded at both steps.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{is_income, SeriesPoint, StoredRecord, TransactionPoint};

/// Daily series for a single category
///
/// Always non-empty, with strictly increasing dates.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySeries {
    category: String,
    points: Vec<SeriesPoint>,
}

impl CategorySeries {
    /// Build a series from unordered (date, amount) pairs, summing same-day amounts
    pub fn from_daily<I>(category: impl Into<String>, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let category = category.into();
        let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (date, amount) in entries {
            *by_date.entry(date).or_insert(0.0) += amount;
        }

        if by_date.is_empty() {
            return Err(Error::DataFormat(format!(
                "category '{}' has no transactions",
                category
            )));
        }

        let points = by_date
            .into_iter()
            .map(|(date, amount)| SeriesPoint { date, amount })
            .collect();

        Ok(Self { category, points })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    /// Number of distinct dates
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }

    pub fn amounts(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.amount)
    }
}

/// Calendar-date layouts, extended then basic
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Date-time layouts; seconds and fractions are optional
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// UTC offset suffixes: `+HHMM`, `+HH:MM`, and the permissive form
const OFFSET_FORMATS: &[&str] = &["%z", "%:z", "%#z"];

/// Parse an ISO 8601 date or datetime, keeping the calendar (wall-clock) date
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local().date());
    }

    let zulu = expand_zulu(s);
    let normalized = expand_bare_hour(&zulu).unwrap_or(zulu);
    parse_datetime(&normalized)
}

fn parse_datetime(s: &str) -> Option<NaiveDate> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
        for offset in OFFSET_FORMATS {
            let with_offset = format!("{}{}", format, offset);
            if let Ok(dt) = DateTime::parse_from_str(s, &with_offset) {
                return Some(dt.naive_local().date());
            }
        }
    }
    None
}

/// `...Z` → `...+00:00`
fn expand_zulu(s: &str) -> String {
    match s.strip_suffix(|c: char| c == 'Z' || c == 'z') {
        Some(rest) => format!("{}+00:00", rest),
        None => s.to_string(),
    }
}

/// `YYYY-MM-DDTHH[offset]` → `YYYY-MM-DDTHH:00[offset]`
fn expand_bare_hour(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    if bytes.len() < 13 || !matches!(bytes[10], b'T' | b' ') {
        return None;
    }
    if !bytes[11].is_ascii_digit() || !bytes[12].is_ascii_digit() {
        return None;
    }
    match bytes.get(13) {
        None | Some(b'+') | Some(b'-') => Some(format!("{}:00{}", &s[..13], &s[13..])),
        _ => None,
    }
}

/// Validate stored records into transaction points
///
/// Income records are skipped before validation, so a malformed income entry
/// never fails a forecast. Any other record missing its date or amount, or
/// carrying an unparseable date, fails the whole batch.
pub fn parse_records(records: &[StoredRecord]) -> Result<Vec<TransactionPoint>> {
    let mut points = Vec::with_capacity(records.len());

    for record in records {
        if is_income(&record.category) {
            continue;
        }

        if record.category.trim().is_empty() {
            return Err(Error::DataFormat(
                "transaction has an empty category".to_string(),
            ));
        }

        let raw_date = record.date.as_deref().ok_or_else(|| {
            Error::DataFormat(format!(
                "transaction in '{}' is missing a date",
                record.category
            ))
        })?;

        let amount = record.amount.ok_or_else(|| {
            Error::DataFormat(format!(
                "transaction in '{}' is missing an amount",
                record.category
            ))
        })?;

        if !amount.is_finite() {
            return Err(Error::DataFormat(format!(
                "transaction in '{}' has a non-finite amount",
                record.category
            )));
        }

        let date = parse_date(raw_date).ok_or_else(|| {
            Error::DataFormat(format!(
                "unparseable date '{}' in '{}'",
                raw_date, record.category
            ))
        })?;

        points.push(TransactionPoint::new(record.category.clone(), date, amount));
    }

    Ok(points)
}

/// Group points into one series per category
///
/// Categories come back sorted by label. An input with no non-income points
/// yields an empty vector.
pub fn build_series(points: &[TransactionPoint]) -> Result<Vec<CategorySeries>> {
    let mut grouped: HashMap<&str, Vec<(NaiveDate, f64)>> = HashMap::new();

    for point in points.iter().filter(|p| !is_income(&p.category)) {
        grouped
            .entry(point.category.as_str())
            .or_default()
            .push((point.date, point.amount));
    }

    let mut series = grouped
        .into_iter()
        .map(|(category, entries)| CategorySeries::from_daily(category, entries))
        .collect::<Result<Vec<_>>>()?;
    series.sort_by(|a, b| a.category().cmp(b.category()));

    debug!(
        categories = series.len(),
        points = points.len(),
        "Built category series"
    );

    Ok(series)
}
