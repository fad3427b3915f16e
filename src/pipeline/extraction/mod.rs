pub mod types;
pub mod endpoints;
pub mod special;
pub mod numeric;
pub mod positions;
pub mod resolve;
pub mod extractor;

pub use types::*;
pub use extractor::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Endpoint pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}
