//! Single fairness assessment endpoint

use axum::{extract::State, routing::post, Json, Router};
use fairwage_common::predictor::WageBand;
use fairwage_common::{FairnessVerdict, WageQuery};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::validate::{parse_experience, parse_wage};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/assess request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessRequest {
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience: Value,
    #[serde(default)]
    pub location: String,
    /// Actual wage being assessed
    #[serde(default)]
    pub wage: Value,
}

/// Verdict plus the prediction it was measured against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessResponse {
    pub status: FairnessVerdict,
    pub percent_difference: f64,
    pub predicted_wage: i64,
    pub confidence: u8,
    pub wage_range: WageBand,
    pub model_version: String,
}

/// Predict, then classify `actual_wage` against the prediction
pub async fn assess_query(
    state: &AppState,
    query: &WageQuery,
    actual_wage: f64,
) -> fairwage_common::Result<AssessResponse> {
    let prediction = state.predictor.predict(&state.store, query).await?;
    let assessment = state.predictor.assess(&prediction, actual_wage)?;

    Ok(AssessResponse {
        status: assessment.status,
        percent_difference: assessment.percent_difference,
        predicted_wage: prediction.predicted_wage,
        confidence: prediction.confidence,
        wage_range: prediction.wage_range,
        model_version: prediction.model_version,
    })
}

/// POST /api/assess
///
/// Classify one actual wage as below, within or above the fair band.
pub async fn assess_wage(
    State(state): State<AppState>,
    Json(request): Json<AssessRequest>,
) -> ApiResult<Json<AssessResponse>> {
    let experience = parse_experience(&request.experience).map_err(ApiError::BadRequest)?;
    let wage = parse_wage(&request.wage, "wage").map_err(ApiError::BadRequest)?;
    let query = WageQuery::new(request.job_title, request.education, experience, request.location);

    let response = assess_query(&state, &query, wage).await?;

    info!(
        "Assessed '{}': {} ({:+.1}% vs {})",
        query.job_title, response.status, response.percent_difference, response.predicted_wage
    );

    Ok(Json(response))
}

/// Build assessment routes
pub fn assess_routes() -> Router<AppState> {
    Router::new().route("/api/assess", post(assess_wage))
}
