//! Forecasting pipeline
//!
//! For each category series:
//!
//! 1. [`sufficiency`] scores whether the series carries enough signal
//! 2. [`pipeline`] routes on that score, once, before any model is fit
//! 3. [`seasonal`] fits an additive trend + seasonality model, or
//!    [`fallback`] takes the mean of historical monthly totals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use spendly_core::forecast::ForecastPipeline;
//!
//! let pipeline = ForecastPipeline::new();
//! let result = pipeline.run(&series)?;
//! ```

pub mod fallback;
mod linalg;
pub mod pipeline;
pub mod seasonal;
pub mod sufficiency;

use crate::error::Result;
use crate::series::CategorySeries;

pub use fallback::monthly_mean;
pub use pipeline::{ForecastPipeline, HORIZON_DAYS, SUFFICIENCY_THRESHOLD};
pub use seasonal::{
    AdditiveModel, FitOptions, FittedModel, ForecastDay, SeasonalConfig, SeasonalForecaster,
    Seasonality,
};
pub use sufficiency::{assess, sufficiency_score, Sufficiency};

/// Produces a period total for one category
///
/// The seasonal path goes through this trait so the pipeline can be driven
/// with a substitute model.
pub trait PeriodForecaster: Send + Sync {
    /// Predicted total over the `horizon_days` after the last observation
    fn forecast_total(&self, series: &CategorySeries, horizon_days: u32) -> Result<f64>;
}
