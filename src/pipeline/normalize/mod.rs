pub mod types;
pub mod typo;
pub mod units;
pub mod normalizer;

pub use types::*;
pub use normalizer::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("Invalid input: text is empty")]
    EmptyInput,

    #[error("Synonym pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),
}
