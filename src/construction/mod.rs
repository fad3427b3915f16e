//! Construction rendering: turns an interpreted problem into the ordered
//! drawing steps of its procedure.
//!
//! - `ConstructionRenderer`: one implementation per procedure
//! - `RendererRegistry`: resolves a pipeline result to its renderer
//! - `CanonicalObliqueRenderer`: PROC-01, the two-angle oblique line

pub mod primitives;
pub mod traits;
pub mod registry;
pub mod canonical;

pub use primitives::*;
pub use traits::*;
pub use registry::*;
pub use canonical::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConstructionError {
    #[error("Result has no selected procedure")]
    NoProcedure,

    #[error("Procedure {0} is not in the catalogue")]
    UnknownProcedure(String),

    #[error("No renderer registered for {0}")]
    NoRenderer(String),

    #[error("Renderer for {proc_id} draws {renderer} steps, catalogue expects {catalogue}")]
    StepCountMismatch {
        proc_id: String,
        renderer: u32,
        catalogue: u32,
    },

    #[error("Step {step} is out of range 1..={total}")]
    StepOutOfRange { step: u32, total: u32 },

    #[error("Missing constraint {0}")]
    MissingConstraint(&'static str),

    #[error("Constraints cannot be constructed: {0}")]
    Infeasible(String),
}
