//! Wage prediction endpoint

use axum::{extract::State, routing::post, Json, Router};
use fairwage_common::{PredictionResult, WageQuery};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::validate::parse_experience;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/predict request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience: Value,
    #[serde(default)]
    pub location: String,
}

impl PredictRequest {
    /// Validate numeric fields and build the predictor query
    pub fn to_query(&self) -> Result<WageQuery, String> {
        Ok(WageQuery::new(
            self.job_title.as_str(),
            self.education.as_str(),
            parse_experience(&self.experience)?,
            self.location.as_str(),
        ))
    }
}

/// POST /api/predict
///
/// Predict the fair wage for one job profile.
pub async fn predict_wage(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> ApiResult<Json<PredictionResult>> {
    let query = request.to_query().map_err(ApiError::BadRequest)?;
    let result = state.predictor.predict(&state.store, &query).await?;

    info!(
        "Predicted {} for '{}' in '{}' (tier {}, confidence {}%)",
        result.predicted_wage, query.job_title, query.location, result.metadata.benchmark_tier, result.confidence
    );

    Ok(Json(result))
}

/// Build prediction routes
pub fn predict_routes() -> Router<AppState> {
    Router::new().route("/api/predict", post(predict_wage))
}
