use std::sync::Arc;
use std::time::Instant;

use crate::pipeline::catalogue::{CaseType, Catalogue, SlotId};
use crate::pipeline::extraction::endpoints::DEFAULT_ENDPOINTS;
use crate::pipeline::extraction::ExtractionResult;

use super::case_type::derive_case;
use super::confidence::{calibrate, classification_thresholds};
use super::constraints::ConstraintMap;
use super::scoring::{join_codes, score_procedures, QueryVector, ScoredProcedure};
use super::types::{Alternative, ClassificationResult, Completeness, SlotDetail};
use super::ClassificationError;

const TOP_ALTERNATIVES: usize = 3;

/// Maps an extraction to the best-matching construction procedure.
#[derive(Debug, Clone)]
pub struct Classifier {
    catalogue: Arc<Catalogue>,
}

impl Classifier {
    pub fn new(catalogue: Arc<Catalogue>) -> Self {
        Self { catalogue }
    }

    pub fn standard() -> Self {
        Self::new(Arc::new(Catalogue::standard()))
    }

    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    pub fn classify(&self, extraction: &ExtractionResult) -> Result<ClassificationResult, ClassificationError> {
        if self.catalogue.is_empty() {
            return Err(ClassificationError::EmptyCatalogue);
        }
        let start = Instant::now();
        let atoms = &extraction.atoms;
        let flags = &extraction.special_flags;

        let first = extraction
            .endpoints
            .first()
            .copied()
            .unwrap_or(DEFAULT_ENDPOINTS[0]);
        let constraints = ConstraintMap::build(atoms, flags, first);
        let slot_count = extraction.slot_count();
        let slot_details = slot_details(extraction);
        let query = QueryVector::build(atoms, flags, &self.catalogue);

        let case_type = derive_case(&constraints);
        let scored = score_procedures(&query, case_type, &self.catalogue);
        let top: Vec<&ScoredProcedure> = scored.iter().take(TOP_ALTERNATIVES).collect();
        let best = top[0];

        let confidence = calibrate(best.score, slot_count, case_type.is_some());
        let proc_id = (confidence >= classification_thresholds::ACCEPT)
            .then(|| best.procedure.proc_id.clone());

        let alternatives = top
            .iter()
            .enumerate()
            .map(|(i, s)| Alternative {
                rank: i + 1,
                proc_id: s.procedure.proc_id.clone(),
                proc_name: s.procedure.name.clone(),
                confidence: calibrate(s.score, slot_count, case_type.is_some()),
                score: s.score,
                matched_slots: s.matched.clone(),
                missing_slots: s.missing.clone(),
                rationale: s.rationale(),
            })
            .collect();

        let reasoning = reasoning(best, &query, &constraints, case_type);

        tracing::debug!(
            best = %best.procedure.proc_id,
            score = best.score,
            confidence,
            slots = slot_count,
            "Classification complete"
        );

        Ok(ClassificationResult {
            proc_id,
            confidence,
            case_type,
            alternatives,
            completeness: completeness(best, slot_count),
            slot_count,
            constraints,
            slot_details,
            data_types_found: query.slots().collect(),
            reasoning,
            elapsed_us: start.elapsed().as_micros() as u64,
        })
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::standard()
    }
}

fn slot_details(extraction: &ExtractionResult) -> Vec<SlotDetail> {
    let atoms = extraction.atoms.iter().map(|a| SlotDetail {
        slot: SlotId::Datum(a.data_type),
        slots: 1,
        field: Some(a.field),
        value: Some(a.value),
        source: Some(a.source),
        flag: None,
    });
    let flags = extraction
        .special_flags
        .iter()
        .filter(|f| f.slots > 0)
        .map(|f| SlotDetail {
            slot: SlotId::Special(f.flag),
            slots: f.slots,
            field: None,
            value: f.value,
            source: None,
            flag: Some(f.flag),
        });
    atoms.chain(flags).collect()
}

fn completeness(nearest: &ScoredProcedure, slot_count: u32) -> Completeness {
    Completeness {
        sufficient: slot_count >= classification_thresholds::SUFFICIENT_SLOTS,
        slots_found: slot_count,
        slots_required: classification_thresholds::SUFFICIENT_SLOTS,
        missing: nearest.missing.iter().map(|s| s.describe()).collect(),
        missing_ids: nearest.missing.clone(),
        nearest_proc_id: Some(nearest.procedure.proc_id.clone()),
        nearest_proc_name: Some(nearest.procedure.name.clone()),
        coverage_percent: (nearest.coverage * 100.0).round() as u32,
    }
}

fn reasoning(
    best: &ScoredProcedure,
    query: &QueryVector,
    constraints: &ConstraintMap,
    case_type: Option<CaseType>,
) -> String {
    if best.matched.is_empty() {
        return "No matching PROC found.".to_string();
    }

    let mut lines = vec![
        format!(
            "Selected {} ({}) with score {:.1}%.",
            best.procedure.proc_id,
            best.procedure.name,
            best.score * 100.0
        ),
        format!(
            "Case type: {}.",
            case_type.map_or("undetermined", CaseType::as_str)
        ),
        format!("Matched slots: {}.", join_codes(&best.matched)),
    ];

    if !best.missing.is_empty() {
        lines.push(format!("Unmatched in PROC: {}.", join_codes(&best.missing)));
    }

    let extra: Vec<SlotId> = query.slots().filter(|s| !best.procedure.requires(*s)).collect();
    if !extra.is_empty() {
        lines.push(format!("Extra data not in PROC definition: {}.", join_codes(&extra)));
    }

    if let (Some(theta), Some(phi)) = (constraints.theta, constraints.phi) {
        lines.push(format!("θ={theta}°, φ={phi}° → θ+φ={:.1}°.", theta + phi));
    }

    lines.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalogue::{DatumKind, SlotWeights, SpecialKind};
    use crate::pipeline::extraction::Extractor;
    use crate::pipeline::normalize::Normalizer;

    fn classify(raw: &str) -> ClassificationResult {
        let normalized = Normalizer::standard().unwrap().normalize(raw).normalized;
        let extraction = Extractor::new().extract(&normalized, raw).unwrap();
        Classifier::standard().classify(&extraction).unwrap()
    }

    #[test]
    fn canonical_oblique_problem() {
        let result = classify(
            "Line AB 75mm long inclined at 30° to HP and 45° to VP. \
             End A is 20mm above HP and 25mm in front of VP.",
        );
        assert_eq!(result.proc_id.as_deref(), Some("PROC-01"));
        assert_eq!(result.case_type, Some(CaseType::D));
        assert!(result.confidence >= 0.6, "Expected confident match, got {}", result.confidence);
        assert_eq!(result.slot_count, 5);
        assert!(result.completeness.sufficient);
        assert_eq!(result.completeness.coverage_percent, 100);
        assert_eq!(result.alternatives.len(), 3);
        assert_eq!(result.alternatives[0].rank, 1);
        assert_eq!(result.alternatives[0].proc_id, "PROC-01");
        assert_eq!(result.constraints.height_a, Some(20.0));
    }

    #[test]
    fn reasoning_mentions_selection_and_angles() {
        let result = classify(
            "Line AB 75mm long inclined at 30° to HP and 45° to VP. \
             End A is 20mm above HP and 25mm in front of VP.",
        );
        assert!(
            result.reasoning.starts_with("Selected PROC-01 (Canonical Oblique) with score 105.0%."),
            "Got: {}",
            result.reasoning
        );
        assert!(result.reasoning.contains("Case type: D."));
        assert!(result.reasoning.contains("θ=30°, φ=45° → θ+φ=75.0°."));
        assert!(!result.reasoning.contains("Unmatched"));
    }

    #[test]
    fn parallel_to_vp_routes_to_case_c() {
        let result = classify(
            "Line AB 80mm long inclined at 30° to HP and parallel to VP. \
             End A is 20mm above HP and 15mm in front of VP.",
        );
        assert_eq!(result.case_type, Some(CaseType::C));
        assert_eq!(result.proc_id.as_deref(), Some("PROC-04"));
        assert_eq!(result.constraints.phi, Some(0.0));
    }

    #[test]
    fn parallel_to_both_planes_routes_to_its_procedure() {
        let result = classify(
            "Line AB 80mm long parallel to both HP and VP. A is 20mm above HP and 15mm in front of VP.",
        );
        assert_eq!(
            result.proc_id.as_deref(),
            Some("PROC-06"),
            "Expected PROC-06, got {:?} ({})",
            result.proc_id,
            result.reasoning
        );
    }

    #[test]
    fn trace_data_does_not_pose_as_endpoint_position() {
        let result = classify(
            "Line AB 70mm long is inclined at 30° to HP and 45° to VP. \
             Its VT is 25mm above HP and its HT is 30mm in front of VP.",
        );
        assert_eq!(result.slot_count, 5, "Got: {}", result.reasoning);
        assert!(result.constraints.height_a.is_none());
        assert!(result.constraints.depth_a.is_none());
        assert!(
            result.constraints.vt_height == Some(25.0) && result.constraints.ht_depth == Some(30.0),
            "Expected trace data in the constraints, got {:?}",
            result.constraints
        );

        let canonical = result
            .alternatives
            .iter()
            .find(|a| a.proc_id == "PROC-01")
            .expect("PROC-01 ranked");
        assert!(
            canonical.missing_slots.contains(&SlotId::Datum(DatumKind::HeightA))
                && canonical.missing_slots.contains(&SlotId::Datum(DatumKind::DepthA)),
            "Expected PROC-01 to miss both endpoint coordinates, got {:?}",
            canonical.missing_slots
        );
    }

    #[test]
    fn sparse_problem_is_not_accepted() {
        let result = classify("A line AB 60mm long");
        assert!(result.proc_id.is_none(), "Expected no proc, got {:?}", result.proc_id);
        assert!(!result.completeness.sufficient);
        assert_eq!(result.completeness.slots_found, 1);
        assert!(!result.completeness.missing.is_empty());
        assert!(result.completeness.missing.iter().any(|m| m == "Inclination to HP (θ)"),
            "Got: {:?}", result.completeness.missing);
        assert_eq!(result.alternatives.len(), 3);
    }

    #[test]
    fn empty_extraction_reports_no_match() {
        let extraction = Extractor::new().extract("draw a line", "draw a line").unwrap();
        let result = Classifier::standard().classify(&extraction).unwrap();
        assert_eq!(result.reasoning, "No matching PROC found.");
        assert!(result.proc_id.is_none());
        assert_eq!(result.case_type, None);
    }

    #[test]
    fn flag_slots_reported_in_details() {
        let result = classify(
            "Line AB 80mm long has end A in both HP and VP. It is inclined at 30° to HP and 45° to VP.",
        );
        let flag = result
            .slot_details
            .iter()
            .find(|d| d.flag == Some(SpecialKind::OnBoth))
            .unwrap();
        assert_eq!(flag.slots, 2);
        assert_eq!(result.constraints.height_a, Some(0.0));
        assert_eq!(result.constraints.depth_a, Some(0.0));
        assert!(result.data_types_found.contains(&SlotId::Special(SpecialKind::OnBoth)));
    }

    #[test]
    fn empty_catalogue_is_an_error() {
        let catalogue = Catalogue::new(vec![], SlotWeights::standard()).unwrap();
        let classifier = Classifier::new(Arc::new(catalogue));
        let extraction = Extractor::new().extract("line ab 75mm long", "line AB 75mm long").unwrap();
        assert!(matches!(
            classifier.classify(&extraction),
            Err(ClassificationError::EmptyCatalogue)
        ));
    }

    #[test]
    fn classification_is_deterministic() {
        let text = "Line PQ 70mm long. Its top view measures 60mm and front view measures 65mm. P is 10mm above HP and 15mm in front of VP.";
        let (a, b) = (classify(text), classify(text));
        assert_eq!(a.proc_id, b.proc_id);
        assert_eq!(a.alternatives, b.alternatives);
        assert_eq!(a.constraints, b.constraints);
        assert!(a.constraints.get(DatumKind::TopViewLength).is_some());
    }
}
