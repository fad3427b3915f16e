pub mod types;
pub mod constraints;
pub mod case_type;
pub mod scoring;
pub mod confidence;
pub mod classifier;

pub use types::*;
pub use constraints::*;
pub use case_type::*;
pub use classifier::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClassificationError {
    #[error("Procedure catalogue is empty")]
    EmptyCatalogue,
}
