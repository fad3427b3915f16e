use serde::Serialize;

use crate::pipeline::extraction::AtomSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Anomaly,
}

/// One finding with the check that produced it and why it matters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Explanation {
    pub severity: Severity,
    pub check: String,
    pub message: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Extraction path of the atom behind `field`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<AtomSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomaly_score: Option<f64>,
}

impl Explanation {
    fn new(severity: Severity, check: impl Into<String>, message: String, reason: impl Into<String>) -> Self {
        Self {
            severity,
            check: check.into(),
            message,
            reason: reason.into(),
            field: None,
            value: None,
            source: None,
            anomaly_score: None,
        }
    }

    pub fn error(check: impl Into<String>, message: String, reason: impl Into<String>) -> Self {
        Self::new(Severity::Error, check, message, reason)
    }

    pub fn warning(check: impl Into<String>, message: String, reason: impl Into<String>) -> Self {
        Self::new(Severity::Warning, check, message, reason)
    }

    pub fn anomaly(check: impl Into<String>, message: String, reason: impl Into<String>) -> Self {
        Self::new(Severity::Anomaly, check, message, reason)
    }

    pub fn on_field(mut self, field: &'static str, value: f64) -> Self {
        self.field = Some(field);
        self.value = Some(value);
        self
    }

    pub fn scored(mut self, anomaly_score: f64) -> Self {
        self.anomaly_score = Some(anomaly_score);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub anomaly_score: f64,
    pub explanations: Vec<Explanation>,
    pub confidence: f64,
    pub summary: String,
    pub elapsed_us: u64,
}

impl ValidationResult {
    pub fn has_check(&self, check: &str) -> bool {
        self.explanations.iter().any(|e| e.check == check)
    }
}
