use std::collections::HashMap;
use std::sync::Arc;

use crate::pipeline::catalogue::{Catalogue, ProcedureDescriptor};
use crate::pipeline::engine::PipelineResult;

use super::canonical::CanonicalObliqueRenderer;
use super::primitives::ConstructionStep;
use super::traits::ConstructionRenderer;
use super::ConstructionError;

/// Renderers keyed by procedure id, checked against the catalogue.
pub struct RendererRegistry {
    catalogue: Arc<Catalogue>,
    renderers: HashMap<String, Box<dyn ConstructionRenderer>>,
}

impl RendererRegistry {
    pub fn new(catalogue: Arc<Catalogue>) -> Self {
        Self {
            catalogue,
            renderers: HashMap::new(),
        }
    }

    /// Registry over the standard catalogue with every built-in renderer.
    pub fn standard() -> Result<Self, ConstructionError> {
        let mut registry = Self::new(Arc::new(Catalogue::standard()));
        registry.register(Box::new(CanonicalObliqueRenderer))?;
        Ok(registry)
    }

    /// Add a renderer. Its procedure must exist and its step count must
    /// match the catalogue. Replaces any renderer for the same id.
    pub fn register(&mut self, renderer: Box<dyn ConstructionRenderer>) -> Result<(), ConstructionError> {
        let descriptor = self.descriptor(renderer.proc_id())?;
        check_steps(descriptor, renderer.as_ref())?;
        self.renderers.insert(descriptor.proc_id.clone(), renderer);
        Ok(())
    }

    pub fn has_renderer(&self, proc_id: &str) -> bool {
        self.renderers.contains_key(proc_id)
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Find the renderer and descriptor for a pipeline result.
    pub fn resolve(
        &self,
        result: &PipelineResult,
    ) -> Result<(&dyn ConstructionRenderer, &ProcedureDescriptor), ConstructionError> {
        let proc_id = result.proc_id.as_deref().ok_or(ConstructionError::NoProcedure)?;
        let descriptor = self.descriptor(proc_id)?;
        let renderer = self
            .renderers
            .get(proc_id)
            .ok_or_else(|| ConstructionError::NoRenderer(proc_id.to_string()))?;
        check_steps(descriptor, renderer.as_ref())?;
        Ok((renderer.as_ref(), descriptor))
    }

    /// Render every step of the result's procedure.
    pub fn render(&self, result: &PipelineResult) -> Result<Vec<ConstructionStep>, ConstructionError> {
        let (renderer, descriptor) = self.resolve(result)?;
        let steps = renderer.render_all(&result.constraints)?;
        tracing::debug!(proc_id = %descriptor.proc_id, steps = steps.len(), "Construction rendered");
        Ok(steps)
    }

    fn descriptor(&self, proc_id: &str) -> Result<&ProcedureDescriptor, ConstructionError> {
        self.catalogue
            .procedure(proc_id)
            .ok_or_else(|| ConstructionError::UnknownProcedure(proc_id.to_string()))
    }
}

fn check_steps(
    descriptor: &ProcedureDescriptor,
    renderer: &dyn ConstructionRenderer,
) -> Result<(), ConstructionError> {
    if renderer.total_steps() != descriptor.total_steps {
        return Err(ConstructionError::StepCountMismatch {
            proc_id: descriptor.proc_id.clone(),
            renderer: renderer.total_steps(),
            catalogue: descriptor.total_steps,
        });
    }
    Ok(())
}
