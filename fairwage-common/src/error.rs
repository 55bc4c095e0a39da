//! Common error types for FairWage

use thiserror::Error;

/// Common result type for FairWage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across FairWage crates
///
/// Unrecognized job titles, locations and education strings are never
/// errors; they resolve through fallback tiers with reduced confidence.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration or rules file loading/validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller-supplied input (rejected at the boundary)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Benchmark row that failed typed validation
    #[error("Invalid benchmark record: {0}")]
    InvalidBenchmark(String),

    /// Benchmark collaborator could not answer at all
    #[error("Benchmark store unavailable: {0}")]
    BenchmarkUnavailable(String),

    /// Benchmark lookup gave up waiting for the store
    #[error("Benchmark lookup timed out: {0}")]
    BenchmarkTimeout(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
