//! Degraded interpretation used when a stage fails.
//!
//! Keeps only what plain keyword scanning can recover and marks the
//! result for manual review. The failing stage's message is preserved.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::classify::ConstraintMap;
use crate::pipeline::extraction::endpoints::DEFAULT_ENDPOINTS;

use super::types::{FallbackData, PipelineResult};

/// Overall confidence of every fallback result.
pub const FALLBACK_CONFIDENCE: f64 = 0.1;
const FALLBACK_ANOMALY: f64 = 0.5;

static MM_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*mm").unwrap());
static HP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bHP\b").unwrap());
static VP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bVP\b").unwrap());
static DEGREE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\d+°|\d+\s*deg").unwrap());

pub fn scan(text: &str) -> FallbackData {
    FallbackData {
        numbers: MM_VALUE
            .captures_iter(text)
            .filter_map(|c| c[1].parse().ok())
            .collect(),
        has_hp: HP.is_match(text),
        has_vp: VP.is_match(text),
        has_degree: DEGREE.is_match(text),
    }
}

/// Build the fallback result for `text` after a stage failed with `error`.
pub fn fallback_result(text: &str, error: &str, processing_us: u64) -> PipelineResult {
    PipelineResult {
        success: false,
        text: text.to_string(),
        normalized: text.to_lowercase(),
        normalization_changes: Vec::new(),
        corrections: Vec::new(),
        atoms: Vec::new(),
        endpoints: DEFAULT_ENDPOINTS.to_vec(),
        special_flags: Vec::new(),
        slots_found: 0,
        proc_id: None,
        proc_name: None,
        case_type: None,
        constraints: ConstraintMap::default(),
        alternatives: Vec::new(),
        completeness: None,
        reasoning: format!("Fallback mode: pipeline failed. Original error: {error}"),
        valid: None,
        validation_errors: Vec::new(),
        validation_warnings: Vec::new(),
        explanations: Vec::new(),
        anomaly_score: FALLBACK_ANOMALY,
        limitations: Vec::new(),
        stage_confidences: None,
        overall_confidence: FALLBACK_CONFIDENCE,
        requires_review: true,
        review_reason: Some("Fallback result, requires manual review".to_string()),
        fallback_data: Some(scan(text)),
        error: Some(error.to_string()),
        processing_us,
        from_cache: false,
    }
}
