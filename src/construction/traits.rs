use crate::pipeline::classify::ConstraintMap;

use super::primitives::ConstructionStep;
use super::ConstructionError;

/// Draws the construction of one catalogue procedure.
pub trait ConstructionRenderer: Send + Sync {
    /// Catalogue id of the procedure this renderer draws.
    fn proc_id(&self) -> &str;

    /// Fixed number of steps; must equal the catalogue's `total_steps`.
    fn total_steps(&self) -> u32;

    /// Render step `step` (1-based) for the given constraints.
    fn render_step(&self, step: u32, constraints: &ConstraintMap) -> Result<ConstructionStep, ConstructionError>;

    /// Render every step in order.
    fn render_all(&self, constraints: &ConstraintMap) -> Result<Vec<ConstructionStep>, ConstructionError> {
        (1..=self.total_steps())
            .map(|step| self.render_step(step, constraints))
            .collect()
    }
}
