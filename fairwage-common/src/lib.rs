//! # FairWage Common Library
//!
//! Shared code for the FairWage services including:
//! - Rules and factor tables (loaded once, passed explicitly)
//! - Lexical normalization of free-text job titles and education
//! - Benchmark resolution against a reference dataset
//! - Career index, ensemble prediction and confidence calibration
//! - Fairness classification of an actual wage against a prediction
//! - SQLite-backed benchmark store
//! - Bootstrap configuration loading

pub mod benchmark;
pub mod calibration;
pub mod career;
pub mod config;
pub mod db;
pub mod ensemble;
pub mod error;
pub mod factors;
pub mod fairness;
pub mod normalize;
pub mod predictor;
pub mod rules;

pub use benchmark::{BenchmarkKey, BenchmarkRecord, BenchmarkSource, BenchmarkTier, InMemoryBenchmarks};
pub use error::{Error, Result};
pub use fairness::{FairnessAssessment, FairnessVerdict};
pub use predictor::{PredictionResult, WagePredictor, WageQuery};
pub use rules::Rules;
