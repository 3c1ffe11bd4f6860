//! Forecast orchestration: score, route, collect

use tracing::debug;

use super::fallback::monthly_mean;
use super::seasonal::{FitOptions, SeasonalConfig, SeasonalForecaster};
use super::sufficiency::sufficiency_score;
use super::PeriodForecaster;
use crate::error::Result;
use crate::models::{CategoryForecast, ForecastMethod, ForecastResult};
use crate::series::CategorySeries;

/// Scores strictly above this use the seasonal model
pub const SUFFICIENCY_THRESHOLD: f64 = 0.5;

/// Forecast window in days
pub const HORIZON_DAYS: u32 = 30;

/// Routes each category to the seasonal model or the monthly-mean fallback
pub struct ForecastPipeline<F = SeasonalForecaster> {
    seasonal: F,
}

impl ForecastPipeline<SeasonalForecaster> {
    pub fn new() -> Self {
        Self::with_forecaster(SeasonalForecaster::default())
    }

    /// Production model with a custom solver budget
    pub fn with_fit_options(options: FitOptions) -> Self {
        Self::with_forecaster(SeasonalForecaster::new(
            SeasonalConfig::sparse_financial(),
            options,
        ))
    }
}

impl Default for ForecastPipeline<SeasonalForecaster> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: PeriodForecaster> ForecastPipeline<F> {
    pub fn with_forecaster(seasonal: F) -> Self {
        Self { seasonal }
    }

    pub fn forecaster(&self) -> &F {
        &self.seasonal
    }

    /// Score and forecast a single category
    ///
    /// The route is fixed by the score before any fit is attempted; a
    /// seasonal failure is returned as-is, never retried on the fallback.
    pub fn forecast_category(&self, series: &CategorySeries) -> Result<CategoryForecast> {
        let score = sufficiency_score(series);
        debug!(category = %series.category(), score, "Data sufficiency score");

        let (method, total) = if score > SUFFICIENCY_THRESHOLD {
            let total = self.seasonal.forecast_total(series, HORIZON_DAYS)?;
            (ForecastMethod::Seasonal, total)
        } else {
            let total = monthly_mean(series);
            debug!(category = %series.category(), total, "Using fallback method");
            (ForecastMethod::Fallback, total)
        };

        Ok(CategoryForecast {
            category: series.category().to_string(),
            method,
            sufficiency_score: score,
            total,
        })
    }

    /// Forecast every category, stopping at the first failure
    pub fn run_detailed(&self, series: &[CategorySeries]) -> Result<Vec<CategoryForecast>> {
        let forecasts = series
            .iter()
            .map(|s| self.forecast_category(s))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            seasonal = forecasts
                .iter()
                .filter(|f| f.method == ForecastMethod::Seasonal)
                .count(),
            fallback = forecasts
                .iter()
                .filter(|f| f.method == ForecastMethod::Fallback)
                .count(),
            "Forecast complete"
        );

        Ok(forecasts)
    }

    /// Forecast every category into a label → total mapping
    pub fn run(&self, series: &[CategorySeries]) -> Result<ForecastResult> {
        let result: ForecastResult = self
            .run_detailed(series)?
            .into_iter()
            .map(|f| (f.category, f.total))
            .collect();

        debug!(predictions = ?result, "Predictions");
        Ok(result)
    }
}
