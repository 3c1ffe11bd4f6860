//! Domain models for Spendly

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Reserved category that is never forecast (compared case-insensitively)
pub const INCOME_CATEGORY: &str = "income";

/// Whether a category label is the reserved income category
pub fn is_income(category: &str) -> bool {
    category.eq_ignore_ascii_case(INCOME_CATEGORY)
}

/// A single parsed transaction, ready for the forecasting pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionPoint {
    pub date: NaiveDate,
    pub amount: f64,
    pub category: String,
}

impl TransactionPoint {
    pub fn new(category: impl Into<String>, date: NaiveDate, amount: f64) -> Self {
        Self {
            date,
            amount,
            category: category.into(),
        }
    }
}

/// One day of a category series (same-day amounts already summed)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// A transaction record as held by the store, before validation
///
/// Date and amount are optional because stored documents are loosely
/// structured; the parse step rejects records that lack either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub category: String,
    pub date: Option<String>,
    pub amount: Option<f64>,
}

/// A single entry in an imported user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
}

/// Nested per-user document: `{"transactions": {category: [{date, amount}]}}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default)]
    pub transactions: BTreeMap<String, Vec<RawRecord>>,
}

impl UserDocument {
    /// Flatten into stored records, one per entry
    pub fn into_records(self) -> Vec<StoredRecord> {
        self.transactions
            .into_iter()
            .flat_map(|(category, items)| {
                items.into_iter().map(move |item| StoredRecord {
                    category: category.clone(),
                    date: item.date,
                    amount: item.amount,
                })
            })
            .collect()
    }
}

/// Predicted 30-day total per category label
pub type ForecastResult = BTreeMap<String, f64>;

/// Which estimator produced a category's total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastMethod {
    Seasonal,
    Fallback,
}

impl ForecastMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seasonal => "seasonal",
            Self::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Routing decision and outcome for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryForecast {
    pub category: String,
    pub method: ForecastMethod,
    pub sufficiency_score: f64,
    pub total: f64,
}

/// A stored user with their record count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub record_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_income_ignores_case() {
        assert!(is_income("income"));
        assert!(is_income("Income"));
        assert!(is_income("INCOME"));
        assert!(!is_income("Incomes"));
        assert!(!is_income("Groceries"));
    }

    #[test]
    fn test_user_document_flattens_categories() {
        let doc: UserDocument = serde_json::from_str(
            r#"{"transactions": {
                "Groceries": [{"date": "2024-01-05", "amount": 12.5}, {"date": "2024-01-06"}],
                "Travel": [{"amount": 300}]
            }}"#,
        )
        .unwrap();

        let records = doc.into_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].category, "Groceries");
        assert_eq!(records[0].amount, Some(12.5));
        assert_eq!(records[1].amount, None);
        assert_eq!(records[2].category, "Travel");
        assert_eq!(records[2].date, None);
    }

    #[test]
    fn test_user_document_rejects_non_list_category() {
        let result: std::result::Result<UserDocument, _> =
            serde_json::from_str(r#"{"transactions": {"Groceries": "oops"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_forecast_method_serializes_lowercase() {
        let json = serde_json::to_string(&ForecastMethod::Seasonal).unwrap();
        assert_eq!(json, "\"seasonal\"");
        assert_eq!(ForecastMethod::Fallback.to_string(), "fallback");
    }
}
