use std::fmt;

use serde::Serialize;

/// The 13 special conditions a problem statement can state in words.
///
/// Some substitute for one or two numeric data items, which is why each
/// carries a slot cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecialKind {
    ParallelHp,
    ParallelVp,
    #[serde(rename = "PERP_HP")]
    PerpendicularHp,
    #[serde(rename = "PERP_VP")]
    PerpendicularVp,
    OnHp,
    OnVp,
    OnBoth,
    #[serde(rename = "EQUAL_DIST_N")]
    EqualDistance,
    #[serde(rename = "EQUAL_DIST_UNK")]
    Equidistant,
    OnXy,
    Midpoint,
    #[serde(rename = "TRACE_REQ")]
    TraceRequest,
    #[serde(rename = "FIRST_QUAD")]
    FirstQuadrant,
}

impl SpecialKind {
    pub const ALL: [SpecialKind; 13] = [
        SpecialKind::ParallelHp,
        SpecialKind::ParallelVp,
        SpecialKind::PerpendicularHp,
        SpecialKind::PerpendicularVp,
        SpecialKind::OnHp,
        SpecialKind::OnVp,
        SpecialKind::OnBoth,
        SpecialKind::EqualDistance,
        SpecialKind::Equidistant,
        SpecialKind::OnXy,
        SpecialKind::Midpoint,
        SpecialKind::TraceRequest,
        SpecialKind::FirstQuadrant,
    ];

    pub fn descriptor(self) -> &'static SpecialCondition {
        &SPECIAL_CONDITIONS[self as usize]
    }

    /// Catalogue code ("SK01".."SK13").
    pub fn code(self) -> &'static str {
        self.descriptor().code
    }

    /// Tag written into the constraint map ("PARALLEL_HP", ...).
    pub fn flag(self) -> &'static str {
        self.descriptor().flag
    }

    pub fn slots(self) -> u32 {
        self.descriptor().slots
    }

    /// Whether the condition pins a position of one particular endpoint.
    pub fn is_endpoint_scoped(self) -> bool {
        matches!(
            self,
            SpecialKind::OnHp
                | SpecialKind::OnVp
                | SpecialKind::OnBoth
                | SpecialKind::EqualDistance
                | SpecialKind::OnXy
        )
    }
}

impl fmt::Display for SpecialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

/// Immutable descriptor for one special condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialCondition {
    pub code: &'static str,
    pub flag: &'static str,
    pub slots: u32,
    pub description: &'static str,
}

pub const SPECIAL_CONDITIONS: [SpecialCondition; 13] = [
    SpecialCondition { code: "SK01", flag: "PARALLEL_HP", slots: 1, description: "Line parallel to HP → θ=0" },
    SpecialCondition { code: "SK02", flag: "PARALLEL_VP", slots: 1, description: "Line parallel to VP → φ=0" },
    SpecialCondition { code: "SK03", flag: "PERP_HP", slots: 1, description: "Line perpendicular to HP → θ=90" },
    SpecialCondition { code: "SK04", flag: "PERP_VP", slots: 1, description: "Line perpendicular to VP → φ=90" },
    SpecialCondition { code: "SK05", flag: "ON_HP", slots: 1, description: "Endpoint on HP → h=0" },
    SpecialCondition { code: "SK06", flag: "ON_VP", slots: 1, description: "Endpoint on VP → d=0" },
    SpecialCondition { code: "SK07", flag: "ON_BOTH", slots: 2, description: "Endpoint on both HP and VP → h=0 AND d=0" },
    SpecialCondition { code: "SK08", flag: "EQUAL_DIST_N", slots: 2, description: "Equal distance from both planes → h=N AND d=N" },
    SpecialCondition { code: "SK09", flag: "EQUAL_DIST_UNK", slots: 1, description: "Equidistant from both (unknown value)" },
    SpecialCondition { code: "SK10", flag: "ON_XY", slots: 2, description: "Line intersects XY at endpoint → h=0 AND d=0" },
    SpecialCondition { code: "SK11", flag: "MIDPOINT", slots: 0, description: "Routing flag: h/d values are for midpoint M" },
    SpecialCondition { code: "SK12", flag: "TRACE_REQ", slots: 0, description: "Post-processing flag: find and mark traces" },
    SpecialCondition { code: "SK13", flag: "FIRST_QUAD", slots: 0, description: "Context: line in first quadrant (h>0, d>0)" },
];
