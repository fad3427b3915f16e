pub mod types;
pub mod cache_key;
pub mod metrics;
pub mod fallback;
pub mod orchestrator;

pub use types::*;
pub use cache_key::*;
pub use metrics::*;
pub use orchestrator::*;

use thiserror::Error;

use crate::pipeline::catalogue::CatalogueError;
use crate::pipeline::classify::ClassificationError;
use crate::pipeline::extraction::ExtractionError;
use crate::pipeline::normalize::NormalizeError;
use crate::pipeline::validation::ValidationError;
use crate::pipeline_config::ConfigError;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Classification failed: {0}")]
    Classification(#[from] ClassificationError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Batch task failed: {0}")]
    BatchTask(String),
}

impl EngineError {
    /// Stage that raised the error, for logs and fallback results.
    pub fn stage(&self) -> &'static str {
        match self {
            EngineError::Normalize(_) => "normalize",
            EngineError::Extraction(_) => "extract",
            EngineError::Classification(_) => "classify",
            EngineError::Validation(_) => "validate",
            EngineError::Catalogue(_) | EngineError::Config(_) => "setup",
            EngineError::BatchTask(_) => "batch",
        }
    }
}
