pub mod types;
pub mod geometric;
pub mod anomaly;
pub mod validator;

pub use types::*;
pub use validator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Constraint {field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },
}
