//! HTTP API handlers for fairwage-api

pub mod assess;
pub mod batch;
pub mod health;
pub mod predict;
pub mod validate;

pub use assess::assess_routes;
pub use batch::batch_routes;
pub use health::health_routes;
pub use predict::predict_routes;
