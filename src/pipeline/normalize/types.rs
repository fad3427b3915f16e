use serde::Serialize;

/// How a typo was fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionMethod {
    Dictionary,
    Levenshtein,
}

/// One word-level correction applied by the normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypoCorrection {
    pub original: String,
    pub corrected: String,
    pub method: CorrectionMethod,
    /// Similarity of a fuzzy match, `1 - distance / longer_len`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Normalization stages that modified the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationChange {
    CharacterCorrection,
    DegreeNormalization,
    TypoCorrection,
    SynonymExpansion,
    PlaneNormalization,
    UnitConversion,
    UnitInference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizeResult {
    pub normalized: String,
    pub original_length: usize,
    pub normalized_length: usize,
    pub corrections: Vec<TypoCorrection>,
    pub confidence: f64,
    pub changes: Vec<NormalizationChange>,
    pub elapsed_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NormalizeResult {
    /// Zero-confidence result for unusable input.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            normalized: String::new(),
            original_length: 0,
            normalized_length: 0,
            corrections: Vec::new(),
            confidence: 0.0,
            changes: Vec::new(),
            elapsed_us: 0,
            error: Some(reason.into()),
        }
    }

    pub fn levenshtein_corrections(&self) -> usize {
        self.corrections
            .iter()
            .filter(|c| c.method == CorrectionMethod::Levenshtein)
            .count()
    }
}

/// Running counters since construction or the last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizerStats {
    pub normalizations: u64,
    pub degree_fixes: u64,
    pub unit_conversions: u64,
    pub abbreviation_expansions: u64,
    pub typo_corrections: u64,
    pub semantic_expansions: u64,
}
