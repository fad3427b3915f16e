use crate::pipeline::catalogue::{CaseType, SpecialKind};

use super::constraints::ConstraintMap;

/// Tolerance in degrees for the θ+φ = 90° boundary case.
pub const BOUNDARY_TOLERANCE: f64 = 0.5;

/// Derive the engineering case from resolved constraints, falling back to
/// the parallel/perpendicular flags when the angles are incomplete.
pub fn derive_case(c: &ConstraintMap) -> Option<CaseType> {
    if c.theta == Some(90.0) {
        return Some(CaseType::PerpendicularHp);
    }
    if c.phi == Some(90.0) {
        return Some(CaseType::PerpendicularVp);
    }
    if let (Some(theta), Some(phi)) = (c.theta, c.phi) {
        if (theta + phi - 90.0).abs() < BOUNDARY_TOLERANCE {
            return Some(CaseType::DStar);
        }
        if theta > 0.0 && phi > 0.0 && theta + phi < 90.0 {
            return Some(CaseType::D);
        }
        if theta > 0.0 && phi == 0.0 {
            return Some(CaseType::C);
        }
        if phi > 0.0 && theta == 0.0 {
            return Some(CaseType::B);
        }
        if theta == 0.0 && phi == 0.0 {
            return Some(CaseType::A);
        }
    }

    let parallel_hp = c.has_special(SpecialKind::ParallelHp);
    let parallel_vp = c.has_special(SpecialKind::ParallelVp);
    match (parallel_hp, parallel_vp) {
        (true, true) => Some(CaseType::A),
        (true, false) => Some(CaseType::B),
        (false, true) => Some(CaseType::C),
        _ if c.has_special(SpecialKind::PerpendicularHp) => Some(CaseType::PerpendicularHp),
        _ if c.has_special(SpecialKind::PerpendicularVp) => Some(CaseType::PerpendicularVp),
        _ => None,
    }
}
