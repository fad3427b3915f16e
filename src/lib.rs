pub mod config;
pub mod pipeline_config;
pub mod lru_cache;
pub mod pipeline;
pub mod construction; // Step-by-step renderers per procedure

pub use construction::{ConstructionRenderer, RendererRegistry};
pub use pipeline::engine::{EngineError, InterpretationEngine, PipelineResult};
pub use pipeline_config::{PipelineConfig, ProcessOptions};
