use std::time::Instant;

use crate::pipeline::catalogue::{DatumKind, SpecialKind};

use super::endpoints::detect_endpoints;
use super::numeric::{extract_paired_angles, extract_primary, extract_secondary};
use super::positions::extract_positions;
use super::resolve::{backfill_endpoints, deduplicate, validate_domain, EndpointContext};
use super::special::detect_special;
use super::types::{slot_count, ExtractionMetadata, ExtractionResult};
use super::ExtractionError;

pub const EXTRACTION_METHOD: &str = "multi_pass";

/// Multi-pass structured extraction over normalized text.
///
/// Pure: the same inputs always give the same result.
#[derive(Debug, Default, Clone, Copy)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract atoms, endpoints and special flags.
    ///
    /// Endpoint labels are read from `original`, where letter case still
    /// distinguishes "AB" from "ab"; everything else reads `normalized`.
    /// Missing data produces fewer atoms, never an error.
    pub fn extract(&self, normalized: &str, original: &str) -> Result<ExtractionResult, ExtractionError> {
        let start = Instant::now();

        // 1. Endpoints
        let label_source = if original.trim().is_empty() { normalized } else { original };
        let endpoints = detect_endpoints(label_source);
        let ctx = EndpointContext::new(&endpoints)?;

        // 2. Special conditions
        let special_flags = detect_special(normalized, &ctx);

        // 3. Paired angles
        let mut atoms = extract_paired_angles(normalized);

        // 4. Numeric data
        let primary = extract_primary(normalized, &atoms);
        let true_length = primary
            .iter()
            .find(|a| a.data_type == DatumKind::TrueLength)
            .map(|a| a.value);
        atoms.extend(primary);
        atoms.extend(extract_positions(normalized, &ctx, &special_flags));
        let midpoint = special_flags.iter().any(|f| f.flag == SpecialKind::Midpoint);
        atoms.extend(extract_secondary(normalized, true_length, midpoint));

        // 5. Deduplicate
        let mut atoms = deduplicate(atoms);

        // 6. Implicit endpoints
        backfill_endpoints(&mut atoms, ctx.first, ctx.second);

        // 7. Domain ranges
        let (atoms, diagnostics) = validate_domain(atoms);

        let confidence = extraction_confidence(slot_count(&atoms, &special_flags));

        tracing::debug!(
            atoms = atoms.len(),
            flags = special_flags.len(),
            confidence,
            "Extraction complete"
        );

        Ok(ExtractionResult {
            metadata: ExtractionMetadata {
                atom_count: atoms.len(),
                special_count: special_flags.len(),
                endpoints: endpoints.clone(),
                method: EXTRACTION_METHOD,
                confidence,
                diagnostics,
                elapsed_us: start.elapsed().as_micros() as u64,
            },
            atoms,
            endpoints,
            special_flags,
        })
    }
}

/// Step function of the slot count.
pub fn extraction_confidence(slots: u32) -> f64 {
    match slots {
        5.. => 0.95,
        4 => 0.80,
        3 => 0.65,
        _ => 0.40,
    }
}
