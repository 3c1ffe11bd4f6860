//! Spendly Core Library
//!
//! Shared functionality for the Spendly spending forecaster:
//! - Database access and migrations
//! - Record validation and per-category daily series
//! - Data sufficiency scoring
//! - Seasonal additive model with a monthly-mean fallback
//! - Per-user prediction service

pub mod config;
pub mod db;
pub mod error;
pub mod forecast;
pub mod models;
pub mod series;
pub mod service;

pub use config::{AppConfig, ServerSettings};
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{
    FitOptions, ForecastPipeline, PeriodForecaster, SeasonalConfig, SeasonalForecaster,
    HORIZON_DAYS, SUFFICIENCY_THRESHOLD,
};
pub use models::{CategoryForecast, ForecastMethod, ForecastResult, StoredRecord, UserDocument};
pub use series::{build_series, parse_records, CategorySeries};
pub use service::{predict_details_for_user, predict_for_user, TransactionStore};
