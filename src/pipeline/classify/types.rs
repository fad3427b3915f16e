use serde::Serialize;

use crate::pipeline::catalogue::{CaseType, SlotId, SpecialKind};
use crate::pipeline::extraction::AtomSource;

use super::constraints::ConstraintMap;

/// One ranked candidate procedure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternative {
    pub rank: usize,
    pub proc_id: String,
    pub proc_name: String,
    pub confidence: f64,
    pub score: f64,
    pub matched_slots: Vec<SlotId>,
    pub missing_slots: Vec<SlotId>,
    pub rationale: String,
}

/// How far the problem is from being fully determined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Completeness {
    pub sufficient: bool,
    pub slots_found: u32,
    pub slots_required: u32,
    /// Human-readable names of the nearest procedure's missing slots.
    pub missing: Vec<String>,
    pub missing_ids: Vec<SlotId>,
    pub nearest_proc_id: Option<String>,
    pub nearest_proc_name: Option<String>,
    pub coverage_percent: u32,
}

/// Where one consumed slot came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotDetail {
    pub slot: SlotId,
    pub slots: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<AtomSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<SpecialKind>,
}

/// Source of the atom behind a constraint field, if one was extracted.
pub fn source_of(details: &[SlotDetail], field: &str) -> Option<AtomSource> {
    details
        .iter()
        .find(|d| d.field == Some(field))
        .and_then(|d| d.source)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Best procedure, present only when `confidence` clears the
    /// acceptance threshold.
    pub proc_id: Option<String>,
    pub confidence: f64,
    pub case_type: Option<CaseType>,
    pub alternatives: Vec<Alternative>,
    pub completeness: Completeness,
    pub slot_count: u32,
    pub constraints: ConstraintMap,
    pub slot_details: Vec<SlotDetail>,
    pub data_types_found: Vec<SlotId>,
    pub reasoning: String,
    pub elapsed_us: u64,
}
