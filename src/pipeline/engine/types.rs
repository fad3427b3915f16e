use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::catalogue::CaseType;
use crate::pipeline::classify::confidence::round2;
use crate::pipeline::classify::{Alternative, Completeness, ConstraintMap};
use crate::pipeline::extraction::{Atom, SpecialFlag};
use crate::pipeline::normalize::{NormalizationChange, TypoCorrection};
use crate::pipeline::validation::Explanation;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Normalize,
    Extract,
    Classify,
    Validate,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Normalize, Stage::Extract, Stage::Classify, Stage::Validate];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Normalize => "normalize",
            Stage::Extract => "extract",
            Stage::Classify => "classify",
            Stage::Validate => "validate",
        }
    }
}

/// Confidence reported by each stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StageConfidences {
    pub normalization: f64,
    pub extraction: f64,
    pub classification: f64,
    /// 1.0 when valid or skipped, 0.5 when invalid.
    pub validation: f64,
}

impl StageConfidences {
    /// Geometric mean of the four stages, rounded to two decimals.
    pub fn overall(&self) -> f64 {
        let product = self.normalization * self.extraction * self.classification * self.validation;
        round2(product.powf(0.25))
    }
}

/// Keyword-level facts salvaged when the pipeline fails.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FallbackData {
    /// Every `N mm` value in order of appearance.
    pub numbers: Vec<f64>,
    pub has_hp: bool,
    pub has_vp: bool,
    pub has_degree: bool,
}

/// Everything the engine knows about one problem statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub success: bool,
    pub text: String,
    pub normalized: String,
    pub normalization_changes: Vec<NormalizationChange>,
    pub corrections: Vec<TypoCorrection>,

    pub atoms: Vec<Atom>,
    pub endpoints: Vec<char>,
    pub special_flags: Vec<SpecialFlag>,
    pub slots_found: u32,

    pub proc_id: Option<String>,
    pub proc_name: Option<String>,
    pub case_type: Option<CaseType>,
    pub constraints: ConstraintMap,
    pub alternatives: Vec<Alternative>,
    pub completeness: Option<Completeness>,
    pub reasoning: String,

    /// `None` when validation was skipped or never ran.
    pub valid: Option<bool>,
    pub validation_errors: Vec<String>,
    pub validation_warnings: Vec<String>,
    pub explanations: Vec<Explanation>,
    pub anomaly_score: f64,
    /// Known approximations of the selected procedure.
    pub limitations: Vec<String>,

    pub stage_confidences: Option<StageConfidences>,
    pub overall_confidence: f64,
    pub requires_review: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_data: Option<FallbackData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub processing_us: u64,
    pub from_cache: bool,
}

/// A labelled interpretation, as predicted by the engine or supplied by
/// a reviewer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Interpretation {
    pub proc_id: Option<String>,
    pub constraints: ConstraintMap,
}

impl From<&PipelineResult> for Interpretation {
    fn from(result: &PipelineResult) -> Self {
        Self {
            proc_id: result.proc_id.clone(),
            constraints: result.constraints.clone(),
        }
    }
}

/// One reviewer correction, kept for offline retraining.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrectionRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub input: String,
    pub predicted_proc_id: Option<String>,
    pub actual_proc_id: Option<String>,
    pub predicted_constraints: ConstraintMap,
    pub actual_constraints: ConstraintMap,
    pub cache_key: String,
}

impl CorrectionRecord {
    pub fn new(input: &str, predicted: &Interpretation, actual: &Interpretation, cache_key: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            input: input.to_string(),
            predicted_proc_id: predicted.proc_id.clone(),
            actual_proc_id: actual.proc_id.clone(),
            predicted_constraints: predicted.constraints.clone(),
            actual_constraints: actual.constraints.clone(),
            cache_key,
        }
    }

    pub fn changed_procedure(&self) -> bool {
        self.predicted_proc_id != self.actual_proc_id
    }
}
