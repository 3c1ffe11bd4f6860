//! Prediction handlers

use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{AppError, AppState};
use spendly_core::models::{CategoryForecast, ForecastResult};
use spendly_core::service::{predict_details_for_user, predict_for_user};

/// Request body for prediction endpoints
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Map a body rejection (malformed JSON, wrong content type, empty body) to a 400
fn parse_body(
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<PredictRequest, AppError> {
    match body {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected malformed prediction request");
            Err(AppError::bad_request(&format!(
                "Invalid request body: {}",
                rejection.body_text()
            )))
        }
    }
}

/// POST /predict - Predicted 30-day total per category
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<ForecastResult>, AppError> {
    let request = parse_body(body)?;
    let fit = state.config.fit;
    let worker = state.clone();

    let result = run_bounded(&state, move || {
        predict_for_user(&worker.db, request.user_id.as_deref(), fit)
    })
    .await?;

    info!(categories = result.len(), "Served prediction");
    Ok(Json(result))
}

/// POST /predict/details - Per-category totals with method and score
pub async fn predict_details(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<Vec<CategoryForecast>>, AppError> {
    let request = parse_body(body)?;
    let fit = state.config.fit;
    let worker = state.clone();

    let forecasts = run_bounded(&state, move || {
        predict_details_for_user(&worker.db, request.user_id.as_deref(), fit)
    })
    .await?;

    Ok(Json(forecasts))
}

/// Run a CPU-bound prediction on the blocking pool under the request timeout
async fn run_bounded<T, F>(state: &AppState, job: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce() -> spendly_core::Result<T> + Send + 'static,
{
    let timeout = state.config.server.request_timeout;
    match with_timeout(timeout, tokio::task::spawn_blocking(job)).await {
        Some(joined) => Ok(joined??),
        None => {
            warn!(timeout_secs = timeout.as_secs(), "Prediction timed out");
            Err(AppError::internal("Prediction timed out"))
        }
    }
}

async fn with_timeout<F: Future>(limit: std::time::Duration, fut: F) -> Option<F::Output> {
    tokio::time::timeout(limit, fut).await.ok()
}
