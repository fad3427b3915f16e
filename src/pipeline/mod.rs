pub mod catalogue; // Procedure catalogue, lexicon, distributions
pub mod normalize;
pub mod extraction;
pub mod classify;
pub mod validation;
pub mod engine; // Orchestrator, cache, metrics, corrections
