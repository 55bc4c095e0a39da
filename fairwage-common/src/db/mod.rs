//! SQLite storage for the benchmark dataset and model version registry

pub mod benchmarks;
pub mod init;
pub mod model_versions;

pub use benchmarks::*;
pub use init::*;
pub use model_versions::*;
