use std::sync::Arc;
use std::time::Instant;

use crate::pipeline::catalogue::{DistributionTable, ProcedureDescriptor};
use crate::pipeline::classify::confidence::round2;
use crate::pipeline::classify::{source_of, ConstraintMap, SlotDetail};

use super::anomaly::detect_anomalies;
use super::geometric::{cross_field_checks, geometric_checks};
use super::types::{Explanation, Severity, ValidationResult};
use super::ValidationError;

/// Anomaly score contributions.
const ERROR_WEIGHT: f64 = 0.3;
const WARNING_WEIGHT: f64 = 0.05;
const STEEP_ANGLES_PENALTY: f64 = 0.1;
const STEEP_ANGLE_SUM: f64 = 85.0;

/// Confidence reported when errors were found.
const ERROR_CONFIDENCE: f64 = 0.95;

/// Physics-based checks, anomaly detection and cross-field plausibility
/// over a constraint map.
#[derive(Debug, Clone)]
pub struct Validator {
    distributions: Arc<DistributionTable>,
}

impl Validator {
    pub fn new(distributions: Arc<DistributionTable>) -> Self {
        Self { distributions }
    }

    pub fn standard() -> Self {
        Self::new(Arc::new(DistributionTable::standard()))
    }

    pub fn validate(
        &self,
        constraints: &ConstraintMap,
        slot_details: &[SlotDetail],
    ) -> Result<ValidationResult, ValidationError> {
        self.run(constraints, slot_details, Vec::new())
    }

    /// Validate, adding an `approximate_construction` warning when the
    /// selected procedure carries a known limitation.
    pub fn validate_for_procedure(
        &self,
        constraints: &ConstraintMap,
        slot_details: &[SlotDetail],
        procedure: Option<&ProcedureDescriptor>,
    ) -> Result<ValidationResult, ValidationError> {
        let extra = procedure
            .and_then(|p| {
                p.limitation.as_ref().map(|note| {
                    Explanation::warning(
                        "approximate_construction",
                        format!("{} ({}) is an approximate construction", p.proc_id, p.name),
                        note.clone(),
                    )
                })
            })
            .into_iter()
            .collect();
        self.run(constraints, slot_details, extra)
    }

    fn run(
        &self,
        constraints: &ConstraintMap,
        slot_details: &[SlotDetail],
        extra: Vec<Explanation>,
    ) -> Result<ValidationResult, ValidationError> {
        if let Some((kind, value)) = constraints.known().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::NonFinite { field: kind.field(), value });
        }
        let start = Instant::now();

        let mut explanations = geometric_checks(constraints);
        explanations.extend(detect_anomalies(constraints, &self.distributions));
        explanations.extend(cross_field_checks(constraints));
        explanations.extend(extra);

        for explanation in &mut explanations {
            if let Some(field) = explanation.field {
                explanation.source = source_of(slot_details, field);
            }
        }

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for explanation in &explanations {
            match explanation.severity {
                Severity::Error => errors.push(explanation.message.clone()),
                Severity::Warning | Severity::Anomaly => warnings.push(explanation.message.clone()),
            }
        }

        let anomaly_score = anomaly_score(constraints, errors.len(), warnings.len());
        let confidence = if errors.is_empty() {
            (1.0 - anomaly_score * 0.5).max(0.5)
        } else {
            ERROR_CONFIDENCE
        };
        let summary = summary(&errors, &warnings);

        if !errors.is_empty() {
            tracing::info!(errors = errors.len(), warnings = warnings.len(), "Constraint validation failed");
        }

        Ok(ValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
            anomaly_score: round2(anomaly_score),
            explanations,
            confidence: round2(confidence),
            summary,
            elapsed_us: start.elapsed().as_micros() as u64,
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::standard()
    }
}

fn anomaly_score(c: &ConstraintMap, errors: usize, warnings: usize) -> f64 {
    let mut score = errors as f64 * ERROR_WEIGHT + warnings as f64 * WARNING_WEIGHT;
    if let (Some(theta), Some(phi)) = (c.theta, c.phi) {
        if theta + phi > STEEP_ANGLE_SUM {
            score += STEEP_ANGLES_PENALTY;
        }
    }
    score.min(1.0)
}

fn summary(errors: &[String], warnings: &[String]) -> String {
    if !errors.is_empty() {
        format!("{} error(s): {}", errors.len(), errors.join("; "))
    } else if !warnings.is_empty() {
        format!("Valid with {} warning(s)", warnings.len())
    } else {
        "All constraints valid".to_string()
    }
}
