//! Weighted slot matching of a query against every procedure.

use crate::pipeline::catalogue::{CaseType, Catalogue, ProcedureDescriptor, SlotId};
use crate::pipeline::extraction::{Atom, SpecialFlag};

const JACCARD_WEIGHT: f64 = 0.5;
const COVERAGE_WEIGHT: f64 = 0.4;
const PRIORITY_WEIGHT: f64 = 0.05;
const CASE_BONUS: f64 = 0.10;

/// Weighted slot vector of one problem, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryVector {
    entries: Vec<(SlotId, f64)>,
}

impl QueryVector {
    /// One weight per atom; a flag contributes its weight times its slot
    /// cost. Zero-slot flags are left out.
    pub fn build(atoms: &[Atom], flags: &[SpecialFlag], catalogue: &Catalogue) -> Self {
        let mut vector = Self::default();
        for atom in atoms {
            let slot = SlotId::Datum(atom.data_type);
            vector.add(slot, catalogue.weight(slot));
        }
        for flag in flags.iter().filter(|f| f.slots > 0) {
            let slot = SlotId::Special(flag.flag);
            vector.add(slot, catalogue.weight(slot) * f64::from(flag.slots));
        }
        vector
    }

    fn add(&mut self, slot: SlotId, weight: f64) {
        match self.entries.iter_mut().find(|(s, _)| *s == slot) {
            Some((_, w)) => *w += weight,
            None => self.entries.push((slot, weight)),
        }
    }

    pub fn contains(&self, slot: SlotId) -> bool {
        self.entries.iter().any(|(s, _)| *s == slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.entries.iter().map(|(s, _)| *s)
    }

    pub fn entries(&self) -> &[(SlotId, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One procedure's match against a query.
#[derive(Debug, Clone)]
pub struct ScoredProcedure<'a> {
    pub procedure: &'a ProcedureDescriptor,
    pub score: f64,
    pub jaccard: f64,
    pub coverage: f64,
    pub matched: Vec<SlotId>,
    pub missing: Vec<SlotId>,
}

impl ScoredProcedure<'_> {
    /// Short rationale tiered by coverage.
    pub fn rationale(&self) -> String {
        let id = &self.procedure.proc_id;
        let matched = self.matched.len();
        let total = self.procedure.required_slots.len();
        if self.coverage >= 1.0 {
            format!("Perfect slot match for {id}.")
        } else if self.coverage >= 0.8 {
            format!(
                "Strong match: {matched}/{total} slots matched. Missing: {}.",
                join_codes(&self.missing)
            )
        } else if self.coverage >= 0.6 {
            format!("Partial match: {matched}/{total} slots matched.")
        } else {
            format!("Weak match: only {matched}/{total} slots matched.")
        }
    }
}

/// Score every procedure and sort best first. The sort is stable, so ties
/// keep catalogue order.
pub fn score_procedures<'a>(
    query: &QueryVector,
    case_type: Option<CaseType>,
    catalogue: &'a Catalogue,
) -> Vec<ScoredProcedure<'a>> {
    let mut scored: Vec<ScoredProcedure<'a>> = catalogue
        .procedures()
        .iter()
        .map(|procedure| score_one(query, case_type, procedure, catalogue))
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

fn score_one<'a>(
    query: &QueryVector,
    case_type: Option<CaseType>,
    procedure: &'a ProcedureDescriptor,
    catalogue: &Catalogue,
) -> ScoredProcedure<'a> {
    let mut intersection = 0.0;
    let mut union = 0.0;
    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for &slot in &procedure.required_slots {
        let weight = catalogue.weight(slot);
        if query.contains(slot) {
            intersection += weight;
            matched.push(slot);
        } else {
            missing.push(slot);
        }
        union += weight;
    }
    for &(slot, weight) in query.entries() {
        if !procedure.requires(slot) {
            union += weight;
        }
    }

    let jaccard = if union > 0.0 { intersection / union } else { 0.0 };
    let required = procedure.required_slots.len();
    let coverage = if required > 0 {
        matched.len() as f64 / required as f64
    } else {
        0.0
    };
    let priority_bonus = f64::from(procedure.priority) / 100.0 * PRIORITY_WEIGHT;
    let case_bonus = if case_type == Some(procedure.case_type) { CASE_BONUS } else { 0.0 };

    ScoredProcedure {
        procedure,
        score: JACCARD_WEIGHT * jaccard + COVERAGE_WEIGHT * coverage + priority_bonus + case_bonus,
        jaccard,
        coverage,
        matched,
        missing,
    }
}

pub(crate) fn join_codes(slots: &[SlotId]) -> String {
    slots.iter().map(|s| s.code()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalogue::{DatumKind, SpecialKind};
    use crate::pipeline::extraction::AtomSource;

    fn atoms(kinds: &[DatumKind]) -> Vec<Atom> {
        kinds
            .iter()
            .map(|&k| Atom::new(k, 10.0, AtomSource::Pattern))
            .collect()
    }

    fn canonical() -> Vec<Atom> {
        atoms(&[
            DatumKind::TrueLength,
            DatumKind::InclinationHp,
            DatumKind::InclinationVp,
            DatumKind::HeightA,
            DatumKind::DepthA,
        ])
    }

    #[test]
    fn query_weights_follow_table() {
        let catalogue = Catalogue::standard();
        let query = QueryVector::build(&canonical(), &[], &catalogue);
        assert_eq!(query.entries()[0], (SlotId::Datum(DatumKind::TrueLength), 1.2));
        assert_eq!(query.entries().len(), 5);
    }

    #[test]
    fn flag_weight_scaled_by_slots() {
        let catalogue = Catalogue::standard();
        let flags = [
            SpecialFlag::new(SpecialKind::OnBoth).at('A'),
            SpecialFlag::new(SpecialKind::Midpoint),
        ];
        let query = QueryVector::build(&[], &flags, &catalogue);
        assert_eq!(query.entries(), &[(SlotId::Special(SpecialKind::OnBoth), 2.4)]);
    }

    #[test]
    fn canonical_query_ranks_proc_01_first() {
        let catalogue = Catalogue::standard();
        let query = QueryVector::build(&canonical(), &[], &catalogue);
        let scored = score_procedures(&query, Some(CaseType::D), &catalogue);
        let best = &scored[0];
        assert_eq!(best.procedure.proc_id, "PROC-01");
        assert_eq!(best.coverage, 1.0);
        assert!((best.jaccard - 1.0).abs() < 1e-9);
        assert!((best.score - 1.05).abs() < 1e-9, "Expected 1.05, got {}", best.score);
        assert_eq!(best.rationale(), "Perfect slot match for PROC-01.");
    }

    #[test]
    fn extra_query_slots_enlarge_union() {
        let catalogue = Catalogue::standard();
        let mut with_extra = canonical();
        with_extra.extend(atoms(&[DatumKind::TopViewLength]));
        let query = QueryVector::build(&with_extra, &[], &catalogue);
        let scored = score_procedures(&query, None, &catalogue);
        let proc01 = scored.iter().find(|s| s.procedure.proc_id == "PROC-01").unwrap();
        let expected = 5.4 / (5.4 + 0.9);
        assert!((proc01.jaccard - expected).abs() < 1e-9);
    }

    #[test]
    fn scores_sorted_descending() {
        let catalogue = Catalogue::standard();
        let query = QueryVector::build(&atoms(&[DatumKind::TrueLength]), &[], &catalogue);
        let scored = score_procedures(&query, None, &catalogue);
        assert_eq!(scored.len(), 30);
        for pair in scored.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn rationale_tiers() {
        let catalogue = Catalogue::standard();
        let query = QueryVector::build(
            &atoms(&[DatumKind::TrueLength, DatumKind::InclinationHp, DatumKind::InclinationVp, DatumKind::HeightA]),
            &[],
            &catalogue,
        );
        let scored = score_procedures(&query, None, &catalogue);
        let proc01 = scored.iter().find(|s| s.procedure.proc_id == "PROC-01").unwrap();
        assert_eq!(proc01.rationale(), "Strong match: 4/5 slots matched. Missing: D05.");
        let proc21 = scored.iter().find(|s| s.procedure.proc_id == "PROC-21").unwrap();
        assert_eq!(proc21.rationale(), "Weak match: only 1/5 slots matched.");
    }
}
