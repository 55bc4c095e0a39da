//! Batch fairness assessment endpoint
//!
//! Every employee is assessed concurrently; a failure for one employee
//! becomes an error entry in its slot and never aborts the batch.

use axum::{extract::State, routing::post, Json, Router};
use fairwage_common::WageQuery;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use super::assess::{assess_query, AssessResponse};
use super::validate::{parse_experience, parse_wage};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// One employee row of a batch
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchEmployee {
    #[serde(default)]
    pub employee_name: String,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience: Value,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub current_wage: Value,
}

/// POST /api/assess/batch request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRequest {
    /// Caller's organisation, echoed in logs only
    #[serde(default)]
    pub company_id: Option<String>,
    pub employees: Vec<BatchEmployee>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAssessment {
    pub employee_name: String,
    #[serde(flatten)]
    pub assessment: AssessResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub employee_name: String,
    pub error: String,
}

/// Per-employee outcome, in request order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Assessed(BatchAssessment),
    Failed(BatchFailure),
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchEntry>,
}

async fn assess_employee(state: &AppState, employee: BatchEmployee) -> BatchEntry {
    let fail = |error: String| {
        BatchEntry::Failed(BatchFailure {
            employee_name: employee.employee_name.clone(),
            error,
        })
    };

    let experience = match parse_experience(&employee.experience) {
        Ok(years) => years,
        Err(e) => return fail(e),
    };
    let wage = match parse_wage(&employee.current_wage, "currentWage") {
        Ok(wage) => wage,
        Err(e) => return fail(e),
    };

    let query = WageQuery::new(
        employee.job_title.as_str(),
        employee.education.as_str(),
        experience,
        employee.location.as_str(),
    );
    match assess_query(state, &query, wage).await {
        Ok(assessment) => BatchEntry::Assessed(BatchAssessment {
            employee_name: employee.employee_name.clone(),
            assessment,
        }),
        Err(e) => {
            warn!("Batch assessment failed for '{}': {}", employee.employee_name, e);
            fail(e.to_string())
        }
    }
}

/// POST /api/assess/batch
pub async fn assess_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> ApiResult<Json<BatchResponse>> {
    if request.employees.len() > state.max_batch_size {
        return Err(ApiError::BadRequest(format!(
            "Batch of {} employees exceeds the limit of {}",
            request.employees.len(),
            state.max_batch_size
        )));
    }

    let total = request.employees.len();
    let results = join_all(
        request
            .employees
            .into_iter()
            .map(|employee| assess_employee(&state, employee)),
    )
    .await;

    let failed = results
        .iter()
        .filter(|entry| matches!(entry, BatchEntry::Failed(_)))
        .count();
    info!(
        "Batch assessment for {}: {} employees, {} failed",
        request.company_id.as_deref().unwrap_or("unknown company"),
        total,
        failed
    );

    Ok(Json(BatchResponse { results }))
}

/// Build batch routes
pub fn batch_routes() -> Router<AppState> {
    Router::new().route("/api/assess/batch", post(assess_batch))
}
