pub mod datum;
pub mod special;
pub mod procedures;
pub mod lexicon;
pub mod distributions;

pub use datum::*;
pub use special::*;
pub use procedures::*;
pub use lexicon::*;
pub use distributions::*;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogueError {
    #[error("Duplicate procedure id: {0}")]
    DuplicateProcedure(String),

    #[error("Procedure {proc_id} lists slot {slot} more than once")]
    DuplicateSlot { proc_id: String, slot: String },

    #[error("Procedure {0} has no required slots")]
    EmptySlots(String),

    #[error("Corrupt distribution for {field}: {reason}")]
    CorruptDistribution { field: String, reason: String },
}

/// One training sentence tagged with its procedure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingExample {
    pub proc_id: String,
    pub case_type: CaseType,
    pub text: String,
}

/// The procedure catalogue and classifier weight table.
///
/// Immutable once built. Components receive it through an `Arc`.
#[derive(Debug, Clone)]
pub struct Catalogue {
    procedures: Vec<ProcedureDescriptor>,
    weights: SlotWeights,
}

impl Catalogue {
    /// Validate and build a catalogue. An empty procedure list is accepted
    /// here; classification against it fails instead.
    pub fn new(
        procedures: Vec<ProcedureDescriptor>,
        weights: SlotWeights,
    ) -> Result<Self, CatalogueError> {
        for (i, proc) in procedures.iter().enumerate() {
            if procedures[..i].iter().any(|p| p.proc_id == proc.proc_id) {
                return Err(CatalogueError::DuplicateProcedure(proc.proc_id.clone()));
            }
            if proc.required_slots.is_empty() {
                return Err(CatalogueError::EmptySlots(proc.proc_id.clone()));
            }
            for (j, slot) in proc.required_slots.iter().enumerate() {
                if proc.required_slots[..j].contains(slot) {
                    return Err(CatalogueError::DuplicateSlot {
                        proc_id: proc.proc_id.clone(),
                        slot: slot.code().to_string(),
                    });
                }
            }
        }
        Ok(Self { procedures, weights })
    }

    /// The 30 standard procedures with the standard weight table.
    pub fn standard() -> Self {
        Self {
            procedures: standard_procedures(),
            weights: SlotWeights::standard(),
        }
    }

    pub fn procedures(&self) -> &[ProcedureDescriptor] {
        &self.procedures
    }

    pub fn procedure(&self, proc_id: &str) -> Option<&ProcedureDescriptor> {
        self.procedures.iter().find(|p| p.proc_id == proc_id)
    }

    pub fn weights(&self) -> &SlotWeights {
        &self.weights
    }

    pub fn weight(&self, slot: SlotId) -> f64 {
        self.weights.weight(slot)
    }

    pub fn datum(&self, kind: DatumKind) -> &'static DatumType {
        kind.descriptor()
    }

    pub fn datum_by_field(&self, field: &str) -> Option<&'static DatumType> {
        DatumKind::from_field(field).map(DatumKind::descriptor)
    }

    /// Domain of a constraint field, if the field is known.
    pub fn field_domain(&self, field: &str) -> Option<Domain> {
        self.datum_by_field(field).map(|d| d.domain)
    }

    pub fn special(&self, kind: SpecialKind) -> &'static SpecialCondition {
        kind.descriptor()
    }

    pub fn describe_slot(&self, slot: SlotId) -> String {
        slot.describe()
    }

    pub fn training_examples(&self) -> Vec<TrainingExample> {
        self.procedures
            .iter()
            .flat_map(|p| {
                p.training_examples.iter().map(move |text| TrainingExample {
                    proc_id: p.proc_id.clone(),
                    case_type: p.case_type,
                    text: text.clone(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

impl Default for Catalogue {
    fn default() -> Self {
        Self::standard()
    }
}
