//! fairwage-api library - HTTP front end for the wage prediction engine
//!
//! Exposes single predictions, single fairness assessments and batch
//! assessments over JSON. All prediction logic lives in `fairwage-common`.

use std::sync::Arc;

use axum::Router;
use fairwage_common::db::SqliteBenchmarkStore;
use fairwage_common::WagePredictor;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Predictor holding the loaded rules and model version tag
    pub predictor: Arc<WagePredictor>,
    /// Benchmark dataset
    pub store: SqliteBenchmarkStore,
    /// Largest accepted batch
    pub max_batch_size: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(predictor: WagePredictor, store: SqliteBenchmarkStore, max_batch_size: usize) -> Self {
        Self {
            predictor: Arc::new(predictor),
            store,
            max_batch_size,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::predict_routes())
        .merge(api::assess_routes())
        .merge(api::batch_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
