//! Per-user prediction: load, validate, group, forecast

use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::forecast::{FitOptions, ForecastPipeline};
use crate::models::{CategoryForecast, ForecastResult, StoredRecord};
use crate::series::{build_series, parse_records, CategorySeries};

/// Source of a user's stored transaction records
pub trait TransactionStore: Send + Sync {
    /// Fails with `NotFound` for unknown users
    fn load_user_records(&self, user_id: &str) -> Result<Vec<StoredRecord>>;
}

impl TransactionStore for Database {
    fn load_user_records(&self, user_id: &str) -> Result<Vec<StoredRecord>> {
        Database::load_user_records(self, user_id)
    }
}

/// Predict next-30-day totals per category for one user
pub fn predict_for_user<S: TransactionStore + ?Sized>(
    store: &S,
    user_id: Option<&str>,
    options: FitOptions,
) -> Result<ForecastResult> {
    let (user_id, series) = load_series(store, user_id)?;
    let result = ForecastPipeline::with_fit_options(options).run(&series)?;

    info!(user = %user_id, categories = result.len(), "Prediction complete");
    Ok(result)
}

/// Like [`predict_for_user`], keeping the score and method per category
pub fn predict_details_for_user<S: TransactionStore + ?Sized>(
    store: &S,
    user_id: Option<&str>,
    options: FitOptions,
) -> Result<Vec<CategoryForecast>> {
    let (user_id, series) = load_series(store, user_id)?;
    let forecasts = ForecastPipeline::with_fit_options(options).run_detailed(&series)?;

    info!(user = %user_id, categories = forecasts.len(), "Detailed prediction complete");
    Ok(forecasts)
}

fn load_series<'a, S: TransactionStore + ?Sized>(
    store: &S,
    user_id: Option<&'a str>,
) -> Result<(&'a str, Vec<CategorySeries>)> {
    let user_id = user_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::MissingInput("Missing user_id".to_string()))?;

    let records = store.load_user_records(user_id)?;
    let points = parse_records(&records)?;
    let series = build_series(&points)?;

    Ok((user_id, series))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MemoryStore {
        users: HashMap<String, Vec<StoredRecord>>,
        loads: AtomicUsize,
    }

    impl MemoryStore {
        fn with_user(user: &str, records: Vec<StoredRecord>) -> Self {
            let mut store = Self::default();
            store.users.insert(user.to_string(), records);
            store
        }
    }

    impl TransactionStore for MemoryStore {
        fn load_user_records(&self, user_id: &str) -> Result<Vec<StoredRecord>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            self.users
                .get(user_id)
                .cloned()
                .ok_or_else(|| Error::NotFound(format!("User not found: {}", user_id)))
        }
    }

    fn record(category: &str, date: &str, amount: f64) -> StoredRecord {
        StoredRecord {
            category: category.to_string(),
            date: Some(date.to_string()),
            amount: Some(amount),
        }
    }

    #[test]
    fn test_missing_user_id_skips_store() {
        let store = MemoryStore::default();

        for id in [None, Some(""), Some("   ")] {
            let err = predict_for_user(&store, id, FitOptions::default()).unwrap_err();
            assert!(matches!(err, Error::MissingInput(_)));
        }
        assert_eq!(store.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let store = MemoryStore::default();
        let err = predict_for_user(&store, Some("ghost"), FitOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_user_id_is_trimmed() {
        let store = MemoryStore::with_user("u1", vec![record("Coffee", "2024-01-03", 4.5)]);
        let result = predict_for_user(&store, Some("  u1 "), FitOptions::default()).unwrap();
        assert_eq!(result.get("Coffee"), Some(&4.5));
    }

    #[test]
    fn test_bad_date_fails_whole_request() {
        let store = MemoryStore::with_user(
            "u1",
            vec![
                record("Coffee", "2024-01-03", 4.5),
                record("Rent", "first of March", 1200.0),
            ],
        );
        let err = predict_for_user(&store, Some("u1"), FitOptions::default()).unwrap_err();
        assert!(matches!(err, Error::DataFormat(_)));
    }

    #[test]
    fn test_income_only_user_yields_empty_mapping() {
        let store = MemoryStore::with_user("u1", vec![record("Income", "2024-01-01", 5000.0)]);
        let result = predict_for_user(&store, Some("u1"), FitOptions::default()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_details_match_totals() {
        let store = MemoryStore::with_user(
            "u1",
            vec![
                record("Travel", "2024-03-01", 200.0),
                record("Travel", "2024-03-11", 100.0),
                record("Coffee", "2024-03-02", 4.0),
            ],
        );

        let totals = predict_for_user(&store, Some("u1"), FitOptions::default()).unwrap();
        let details =
            predict_details_for_user(&store, Some("u1"), FitOptions::default()).unwrap();

        assert_eq!(details.len(), totals.len());
        for forecast in details {
            assert_eq!(totals.get(&forecast.category), Some(&forecast.total));
        }
        assert_eq!(totals.get("Travel"), Some(&300.0));
    }
}
