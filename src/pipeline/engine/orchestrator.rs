//! Interpretation engine: runs the four stages in sequence, caches
//! successful results, degrades to a keyword fallback on failure and keeps
//! running metrics plus a log of reviewer corrections.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use futures_util::future::join_all;

use crate::lru_cache::LruCache;
use crate::pipeline::catalogue::{Catalogue, DistributionTable, Lexicon, ProcedureDescriptor};
use crate::pipeline::classify::{ClassificationResult, Classifier};
use crate::pipeline::extraction::{ExtractionResult, Extractor};
use crate::pipeline::normalize::{NormalizeResult, Normalizer};
use crate::pipeline::validation::{ValidationResult, Validator};
use crate::pipeline_config::{PipelineConfig, ProcessOptions};

use super::cache_key::cache_key;
use super::fallback::fallback_result;
use super::metrics::{CacheStatus, Metrics, MetricsSnapshot};
use super::types::{CorrectionRecord, Interpretation, PipelineResult, Stage, StageConfidences};
use super::EngineError;

/// Sample run once at construction so the first real request does not
/// pay for lazy pattern compilation.
const WARM_UP_TEXT: &str =
    "Line AB 80mm long at 30° to HP and 45° to VP. A is 20mm above HP and 15mm in front of VP.";

/// Validation stage confidence when errors were found.
const INVALID_STAGE_CONFIDENCE: f64 = 0.5;

pub struct InterpretationEngine {
    config: PipelineConfig,
    normalizer: Normalizer,
    extractor: Extractor,
    classifier: Classifier,
    validator: Validator,
    cache: Mutex<LruCache<String, PipelineResult>>,
    evictions: Arc<AtomicU64>,
    metrics: Mutex<Metrics>,
    corrections: Mutex<Vec<CorrectionRecord>>,
}

impl InterpretationEngine {
    /// Engine over the standard catalogue, lexicon and distribution table.
    pub fn new(config: PipelineConfig) -> Result<Self, EngineError> {
        Self::with_components(
            config,
            Arc::new(Catalogue::standard()),
            Arc::new(Lexicon::standard()),
            Arc::new(DistributionTable::standard()),
        )
    }

    pub fn standard() -> Result<Self, EngineError> {
        Self::new(PipelineConfig::default())
    }

    /// Build an engine from injected read-only tables.
    pub fn with_components(
        config: PipelineConfig,
        catalogue: Arc<Catalogue>,
        lexicon: Arc<Lexicon>,
        distributions: Arc<DistributionTable>,
    ) -> Result<Self, EngineError> {
        config.validate()?;

        let evictions = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&evictions);
        let cache = LruCache::new(config.cache_capacity).with_eviction_callback(Box::new(
            move |_: &String, _: &PipelineResult| {
                counter.fetch_add(1, Ordering::Relaxed);
            },
        ));

        let engine = Self {
            normalizer: Normalizer::new(lexicon)?,
            extractor: Extractor::new(),
            classifier: Classifier::new(catalogue),
            validator: Validator::new(distributions),
            cache: Mutex::new(cache),
            evictions,
            metrics: Mutex::new(Metrics::new(
                config.latency_history_limit,
                config.latency_history_retain,
            )),
            corrections: Mutex::new(Vec::new()),
            config,
        };

        if let Err(e) = engine.warm_up() {
            tracing::warn!(error = %e, "Warm-up failed, engine will fall back on every request");
        }

        Ok(engine)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn catalogue(&self) -> &Catalogue {
        self.classifier.catalogue()
    }

    /// Run the sample sentence through every stage without touching the
    /// cache or metrics.
    pub fn warm_up(&self) -> Result<(), EngineError> {
        let start = Instant::now();
        let result = self.run_stages(WARM_UP_TEXT, &ProcessOptions::uncached(), &mut |_: Stage, _: u64| {})?;
        tracing::debug!(
            proc_id = ?result.proc_id,
            elapsed_us = start.elapsed().as_micros() as u64,
            "Warm-up complete"
        );
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════
    // Processing
    // ═══════════════════════════════════════════════════════════

    /// Interpret one problem statement.
    ///
    /// Stage failures become a fallback result unless fallback is disabled,
    /// in which case the stage error is returned.
    pub fn process(&self, text: &str, options: &ProcessOptions) -> Result<PipelineResult, EngineError> {
        let key = cache_key(text);
        let span = tracing::info_span!("interpret", key = %key);
        let _enter = span.enter();
        let start = Instant::now();

        self.lock_metrics().total_processed += 1;

        if options.use_cache {
            let cached = self.lock_cache().get(&key).cloned();
            if let Some(hit) = cached {
                self.lock_metrics().cache_hits += 1;
                tracing::debug!("Cache hit");
                return Ok(PipelineResult {
                    from_cache: true,
                    processing_us: 0,
                    ..hit
                });
            }
            self.lock_metrics().cache_misses += 1;
        }

        let staged = self.run_stages(text, options, &mut |stage: Stage, us: u64| {
            self.lock_metrics().record_latency(stage, us);
        });

        match staged {
            Ok(result) => {
                {
                    let mut metrics = self.lock_metrics();
                    if let Some(proc_id) = &result.proc_id {
                        metrics.record_procedure(proc_id);
                    }
                    if result.requires_review {
                        metrics.low_confidence += 1;
                    }
                }
                if options.use_cache && result.success {
                    self.lock_cache().put(key, result.clone());
                }
                Ok(result)
            }
            Err(e) => self.recover(text, e, start),
        }
    }

    /// Interpret many statements, at most `concurrency` at a time. Zero
    /// uses the configured batch concurrency. Results keep input order.
    pub async fn process_batch(
        self: &Arc<Self>,
        texts: &[String],
        concurrency: usize,
        options: ProcessOptions,
    ) -> Result<Vec<PipelineResult>, EngineError> {
        let concurrency = if concurrency == 0 {
            self.config.batch_concurrency
        } else {
            concurrency
        };
        let mut results = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(concurrency) {
            let tasks = chunk.iter().map(|text| {
                let engine = Arc::clone(self);
                let text = text.clone();
                tokio::task::spawn_blocking(move || engine.process(&text, &options))
            });

            for (text, joined) in chunk.iter().zip(join_all(tasks).await) {
                let result = match joined {
                    Ok(outcome) => outcome?,
                    Err(join_err) => {
                        self.recover(text, EngineError::BatchTask(join_err.to_string()), Instant::now())?
                    }
                };
                results.push(result);
            }
        }

        tracing::info!(count = results.len(), concurrency, "Batch complete");
        Ok(results)
    }

    fn run_stages(
        &self,
        text: &str,
        options: &ProcessOptions,
        record: &mut dyn FnMut(Stage, u64),
    ) -> Result<PipelineResult, EngineError> {
        let start = Instant::now();

        let t = Instant::now();
        let normalized = self.normalizer.normalize_checked(text);
        record(Stage::Normalize, micros(t));
        let normalized = normalized?;

        let t = Instant::now();
        let extraction = self.extractor.extract(&normalized.normalized, text);
        record(Stage::Extract, micros(t));
        let extraction = extraction?;

        let t = Instant::now();
        let classification = self.classifier.classify(&extraction);
        record(Stage::Classify, micros(t));
        let classification = classification?;

        let procedure = classification
            .proc_id
            .as_deref()
            .and_then(|id| self.catalogue().procedure(id));

        let t = Instant::now();
        let validation = (!options.skip_validation).then(|| {
            self.validator.validate_for_procedure(
                &classification.constraints,
                &classification.slot_details,
                procedure,
            )
        });
        record(Stage::Validate, micros(t));
        let validation = validation.transpose()?;

        Ok(self.assemble(
            text,
            normalized,
            extraction,
            classification,
            validation,
            procedure,
            micros(start),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        text: &str,
        normalized: NormalizeResult,
        extraction: ExtractionResult,
        classification: ClassificationResult,
        validation: Option<ValidationResult>,
        procedure: Option<&ProcedureDescriptor>,
        processing_us: u64,
    ) -> PipelineResult {
        let stage_confidences = StageConfidences {
            normalization: normalized.confidence,
            extraction: extraction.metadata.confidence,
            classification: classification.confidence,
            validation: match &validation {
                Some(v) if !v.valid => INVALID_STAGE_CONFIDENCE,
                _ => 1.0,
            },
        };
        let overall_confidence = stage_confidences.overall();
        let threshold = self.config.min_confidence_threshold;
        let review_reason = (overall_confidence < threshold)
            .then(|| format!("Overall confidence {overall_confidence} below threshold {threshold}"));

        let (valid, validation_errors, validation_warnings, explanations, anomaly_score) = match validation {
            Some(v) => (Some(v.valid), v.errors, v.warnings, v.explanations, v.anomaly_score),
            None => (None, Vec::new(), Vec::new(), Vec::new(), 0.0),
        };

        PipelineResult {
            success: true,
            text: text.to_string(),
            normalized: normalized.normalized,
            normalization_changes: normalized.changes,
            corrections: normalized.corrections,
            slots_found: extraction.slot_count(),
            atoms: extraction.atoms,
            endpoints: extraction.endpoints,
            special_flags: extraction.special_flags,
            proc_id: classification.proc_id,
            proc_name: procedure.map(|p| p.name.clone()),
            case_type: classification.case_type,
            constraints: classification.constraints,
            alternatives: classification.alternatives,
            completeness: Some(classification.completeness),
            reasoning: classification.reasoning,
            valid,
            validation_errors,
            validation_warnings,
            explanations,
            anomaly_score,
            limitations: procedure
                .and_then(|p| p.limitation.clone())
                .into_iter()
                .collect(),
            stage_confidences: Some(stage_confidences),
            overall_confidence,
            requires_review: review_reason.is_some(),
            review_reason,
            fallback_data: None,
            error: None,
            processing_us,
            from_cache: false,
        }
    }

    fn recover(&self, text: &str, error: EngineError, start: Instant) -> Result<PipelineResult, EngineError> {
        self.lock_metrics().errors += 1;
        if !self.config.fallback_to_rule_based {
            tracing::warn!(stage = error.stage(), error = %error, "Pipeline failed");
            return Err(error);
        }
        self.lock_metrics().fallbacks += 1;
        tracing::warn!(stage = error.stage(), error = %error, "Pipeline failed, using fallback");
        Ok(fallback_result(text, &error.to_string(), micros(start)))
    }

    // ═══════════════════════════════════════════════════════════
    // Corrections
    // ═══════════════════════════════════════════════════════════

    /// Record a reviewer correction and drop the cached result for `input`.
    /// Live scoring is unaffected.
    pub fn update_from_correction(
        &self,
        input: &str,
        predicted: &Interpretation,
        actual: &Interpretation,
    ) -> CorrectionRecord {
        let key = cache_key(input);
        self.lock_cache().remove(&key);

        let record = CorrectionRecord::new(input, predicted, actual, key);
        {
            let mut log = self.lock_corrections();
            log.push(record.clone());
            if log.len() > self.config.correction_log_limit {
                let drop = log.len() - self.config.correction_log_retain;
                log.drain(..drop);
            }
        }

        tracing::info!(
            id = %record.id,
            predicted = ?record.predicted_proc_id,
            actual = ?record.actual_proc_id,
            "Correction recorded"
        );
        record
    }

    pub fn corrections(&self) -> Vec<CorrectionRecord> {
        self.lock_corrections().clone()
    }

    // ═══════════════════════════════════════════════════════════
    // Metrics & cache control
    // ═══════════════════════════════════════════════════════════

    pub fn metrics(&self) -> MetricsSnapshot {
        let cache = {
            let cache = self.lock_cache();
            CacheStatus {
                size: cache.len(),
                capacity: cache.capacity(),
                evictions: self.evictions.load(Ordering::Relaxed),
            }
        };
        let pending = self.lock_corrections().len();
        self.lock_metrics().snapshot(cache, pending)
    }

    /// Zero every counter and latency history. Corrections are kept.
    pub fn reset_metrics(&self) {
        self.lock_metrics().reset();
        self.evictions.store(0, Ordering::Relaxed);
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.lock_cache().len()
    }

    // ── Locks ────────────────────────────────────────────

    // Poisoned locks are recovered.
    fn lock_cache(&self) -> MutexGuard<'_, LruCache<String, PipelineResult>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_metrics(&self) -> MutexGuard<'_, Metrics> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_corrections(&self) -> MutexGuard<'_, Vec<CorrectionRecord>> {
        self.corrections.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn micros(since: Instant) -> u64 {
    since.elapsed().as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalogue::{CaseType, SlotWeights};
    use crate::pipeline::classify::ConstraintMap;
    use crate::pipeline::catalogue::DatumKind;
    use crate::pipeline::normalize::NormalizeError;

    const CANONICAL: &str = "Line AB 75mm long inclined at 30° to HP and 45° to VP. \
                             End A is 20mm above HP and 25mm in front of VP.";

    fn engine() -> InterpretationEngine {
        InterpretationEngine::standard().unwrap()
    }

    fn engine_with(config: PipelineConfig) -> InterpretationEngine {
        InterpretationEngine::new(config).unwrap()
    }

    #[test]
    fn canonical_problem_round_trip() {
        let result = engine().process(CANONICAL, &ProcessOptions::default()).unwrap();
        assert!(result.success);
        assert_eq!(result.proc_id.as_deref(), Some("PROC-01"));
        assert_eq!(result.proc_name.as_deref(), Some("Canonical Oblique"));
        assert_eq!(result.case_type, Some(CaseType::D));
        assert_eq!(result.constraints.true_length, Some(75.0));
        assert_eq!(result.constraints.theta, Some(30.0));
        assert_eq!(result.constraints.phi, Some(45.0));
        assert_eq!(result.constraints.height_a, Some(20.0));
        assert_eq!(result.constraints.depth_a, Some(25.0));
        assert_eq!(result.valid, Some(true));
        assert!(result.overall_confidence >= 0.6, "Expected ≥ 0.6, got {}", result.overall_confidence);
        assert!(!result.requires_review);
        assert!(!result.from_cache);
        assert!(result.limitations.is_empty());
    }

    #[test]
    fn second_request_served_from_cache() {
        let engine = engine();
        let first = engine.process(CANONICAL, &ProcessOptions::default()).unwrap();
        let second = engine.process(CANONICAL, &ProcessOptions::default()).unwrap();

        assert!(second.from_cache);
        assert_eq!(second.processing_us, 0);
        assert_eq!(second.proc_id, first.proc_id);
        assert_eq!(second.constraints, first.constraints);

        let metrics = engine.metrics();
        assert_eq!(metrics.total_processed, 2);
        assert_eq!(metrics.cache_hits, 1);
        assert_eq!(metrics.cache_misses, 1);
        assert_eq!(metrics.cache_hit_rate, "50.0%");
        assert_eq!(metrics.cache.size, 1);
    }

    #[test]
    fn uncached_requests_are_deterministic() {
        let engine = engine();
        let a = engine.process(CANONICAL, &ProcessOptions::uncached()).unwrap();
        let b = engine.process(CANONICAL, &ProcessOptions::uncached()).unwrap();
        assert!(!b.from_cache);
        assert_eq!(a.proc_id, b.proc_id);
        assert_eq!(a.constraints, b.constraints);
        assert_eq!(a.overall_confidence, b.overall_confidence);
        assert_eq!(engine.cache_len(), 0);
        assert_eq!(engine.metrics().cache_misses, 0);
    }

    #[test]
    fn every_stage_latency_recorded() {
        let engine = engine();
        engine.process(CANONICAL, &ProcessOptions::uncached()).unwrap();
        let metrics = engine.metrics();
        for stage in Stage::ALL {
            let stats = metrics.latency[&stage];
            assert_eq!(stats.map(|s| s.count), Some(1), "Expected one {} sample", stage.as_str());
        }
        assert_eq!(metrics.proc_distribution.get("PROC-01"), Some(&1));
    }

    #[test]
    fn skipped_validation_counts_as_valid() {
        let options = ProcessOptions { use_cache: false, skip_validation: true };
        let result = engine().process(CANONICAL, &options).unwrap();
        assert_eq!(result.valid, None);
        assert!(result.explanations.is_empty());
        assert_eq!(result.stage_confidences.unwrap().validation, 1.0);
    }

    #[test]
    fn empty_input_falls_back() {
        let engine = engine();
        let result = engine.process("   ", &ProcessOptions::default()).unwrap();
        assert!(!result.success);
        assert!(result.proc_id.is_none());
        assert_eq!(result.overall_confidence, 0.1);
        assert!(result.requires_review);
        let error = result.error.unwrap();
        assert!(error.contains("empty"), "Expected empty-input error, got {error}");

        let metrics = engine.metrics();
        assert_eq!(metrics.errors, 1);
        assert_eq!(metrics.fallbacks, 1);
        assert_eq!(metrics.cache.size, 0, "Fallback results must not be cached");
    }

    #[test]
    fn disabled_fallback_propagates_stage_error() {
        let engine = engine_with(PipelineConfig {
            fallback_to_rule_based: false,
            ..PipelineConfig::default()
        });
        let err = engine.process("", &ProcessOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::Normalize(NormalizeError::EmptyInput)));
        assert_eq!(err.stage(), "normalize");
        assert_eq!(engine.metrics().errors, 1);
        assert_eq!(engine.metrics().fallbacks, 0);
    }

    #[test]
    fn sparse_problem_flagged_for_review() {
        let engine = engine();
        let result = engine.process("Line AB 60mm long.", &ProcessOptions::default()).unwrap();
        assert!(result.success);
        assert!(result.proc_id.is_none());
        assert!(!result.completeness.as_ref().unwrap().sufficient);
        assert!(result.requires_review);
        let reason = result.review_reason.unwrap();
        assert!(reason.contains("below threshold 0.6"), "Got {reason}");
        assert_eq!(engine.metrics().low_confidence, 1);
    }

    #[test]
    fn empty_catalogue_degrades_to_fallback() {
        let catalogue = Catalogue::new(vec![], SlotWeights::standard()).unwrap();
        let engine = InterpretationEngine::with_components(
            PipelineConfig::default(),
            Arc::new(catalogue),
            Arc::new(Lexicon::standard()),
            Arc::new(DistributionTable::standard()),
        )
        .unwrap();
        assert!(engine.warm_up().is_err());

        let result = engine.process(CANONICAL, &ProcessOptions::default()).unwrap();
        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.contains("catalogue is empty"), "Got {error}");
        assert_eq!(result.fallback_data.unwrap().numbers, vec![75.0, 20.0, 25.0]);
    }

    #[test]
    fn invalid_config_rejected() {
        let result = InterpretationEngine::new(PipelineConfig {
            cache_capacity: 0,
            ..PipelineConfig::default()
        });
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn cache_evictions_counted() {
        let engine = engine_with(PipelineConfig {
            cache_capacity: 1,
            ..PipelineConfig::default()
        });
        engine.process(CANONICAL, &ProcessOptions::default()).unwrap();
        engine.process("Line PQ 60mm long.", &ProcessOptions::default()).unwrap();
        let metrics = engine.metrics();
        assert_eq!(metrics.cache.size, 1);
        assert_eq!(metrics.cache.evictions, 1);

        engine.reset_metrics();
        assert_eq!(engine.metrics().cache.evictions, 0);
        assert_eq!(engine.metrics().total_processed, 0);
    }

    #[test]
    fn clear_cache_forces_recompute() {
        let engine = engine();
        engine.process(CANONICAL, &ProcessOptions::default()).unwrap();
        engine.clear_cache();
        let result = engine.process(CANONICAL, &ProcessOptions::default()).unwrap();
        assert!(!result.from_cache);
    }

    #[test]
    fn correction_invalidates_cache_and_logs() {
        let engine = engine();
        let result = engine.process(CANONICAL, &ProcessOptions::default()).unwrap();
        assert_eq!(engine.cache_len(), 1);

        let actual = Interpretation {
            proc_id: Some("PROC-02".into()),
            constraints: ConstraintMap::default().with(DatumKind::TrueLength, 75.0),
        };
        let record = engine.update_from_correction(CANONICAL, &Interpretation::from(&result), &actual);

        assert_eq!(engine.cache_len(), 0);
        assert_eq!(record.cache_key, cache_key(CANONICAL));
        assert_eq!(record.predicted_proc_id.as_deref(), Some("PROC-01"));
        assert!(record.changed_procedure());
        assert_eq!(engine.metrics().pending_corrections, 1);

        // Live scoring unchanged
        let again = engine.process(CANONICAL, &ProcessOptions::default()).unwrap();
        assert_eq!(again.proc_id.as_deref(), Some("PROC-01"));
    }

    #[test]
    fn correction_log_is_bounded() {
        let engine = engine_with(PipelineConfig {
            correction_log_limit: 3,
            correction_log_retain: 2,
            ..PipelineConfig::default()
        });
        let label = Interpretation::default();
        for i in 0..4 {
            engine.update_from_correction(&format!("problem {i}"), &label, &label);
        }
        let log = engine.corrections();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].input, "problem 2");
        assert_eq!(log[1].input, "problem 3");
    }

    #[tokio::test]
    async fn batch_preserves_order() {
        let engine = Arc::new(engine());
        let texts = vec![
            CANONICAL.to_string(),
            String::new(),
            "Line AB 60mm long.".to_string(),
            CANONICAL.to_string(),
            "Line CD 80mm long at 30° to HP and 45° to VP. C is 20mm above HP and 15mm in front of VP."
                .to_string(),
        ];
        let results = engine
            .process_batch(&texts, 2, ProcessOptions::uncached())
            .await
            .unwrap();

        assert_eq!(results.len(), 5);
        for (text, result) in texts.iter().zip(&results) {
            assert_eq!(&result.text, text);
        }
        assert_eq!(results[0].proc_id.as_deref(), Some("PROC-01"));
        assert!(!results[1].success);
        assert!(results[2].proc_id.is_none());
        assert_eq!(results[3].proc_id, results[0].proc_id);
        assert_eq!(engine.metrics().total_processed, 5);
        assert_eq!(engine.metrics().fallbacks, 1);
    }

    #[tokio::test]
    async fn batch_without_fallback_returns_first_error() {
        let engine = Arc::new(engine_with(PipelineConfig {
            fallback_to_rule_based: false,
            ..PipelineConfig::default()
        }));
        let texts = vec![CANONICAL.to_string(), String::new()];
        let result = engine.process_batch(&texts, 0, ProcessOptions::default()).await;
        assert!(matches!(result, Err(EngineError::Normalize(_))));
    }
}
