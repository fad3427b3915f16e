use std::fmt;

use serde::{Serialize, Serializer};

use super::datum::DatumKind;
use super::special::SpecialKind;

// ═══════════════════════════════════════════════════════════
// Slot identifiers
// ═══════════════════════════════════════════════════════════

/// One unit of independent geometric information a procedure consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotId {
    Datum(DatumKind),
    Special(SpecialKind),
}

impl SlotId {
    pub fn code(self) -> &'static str {
        match self {
            SlotId::Datum(kind) => kind.code(),
            SlotId::Special(kind) => kind.code(),
        }
    }

    /// Human-readable label: "True Length (TL)" or the condition description.
    pub fn describe(self) -> String {
        match self {
            SlotId::Datum(kind) => kind.descriptor().display_name(),
            SlotId::Special(kind) => kind.descriptor().description.to_string(),
        }
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl Serialize for SlotId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl From<DatumKind> for SlotId {
    fn from(kind: DatumKind) -> Self {
        SlotId::Datum(kind)
    }
}

impl From<SpecialKind> for SlotId {
    fn from(kind: SpecialKind) -> Self {
        SlotId::Special(kind)
    }
}

// ═══════════════════════════════════════════════════════════
// Case types
// ═══════════════════════════════════════════════════════════

/// Engineering case family of a line problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CaseType {
    /// Parallel to both HP and VP.
    #[serde(rename = "A")]
    A,
    /// Parallel to HP, inclined to VP.
    #[serde(rename = "B")]
    B,
    /// Parallel to VP, inclined to HP.
    #[serde(rename = "C")]
    C,
    /// Oblique: inclined to both, θ+φ < 90°.
    #[serde(rename = "D")]
    D,
    /// Oblique boundary: θ+φ = 90°, line lies in a profile plane.
    #[serde(rename = "D★")]
    DStar,
    /// Perpendicular to HP.
    #[serde(rename = "2A")]
    PerpendicularHp,
    /// Perpendicular to VP.
    #[serde(rename = "2B")]
    PerpendicularVp,
}

impl CaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseType::A => "A",
            CaseType::B => "B",
            CaseType::C => "C",
            CaseType::D => "D",
            CaseType::DStar => "D★",
            CaseType::PerpendicularHp => "2A",
            CaseType::PerpendicularVp => "2B",
        }
    }
}

impl fmt::Display for CaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════
// Procedure descriptors
// ═══════════════════════════════════════════════════════════

/// A standard construction procedure and the slots it needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcedureDescriptor {
    pub proc_id: String,
    pub name: String,
    pub required_slots: Vec<SlotId>,
    pub case_type: CaseType,
    pub priority: u32,
    pub total_steps: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub training_examples: Vec<String>,
    /// Known approximation in the construction, surfaced when selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limitation: Option<String>,
}

impl ProcedureDescriptor {
    pub fn requires(&self, slot: SlotId) -> bool {
        self.required_slots.contains(&slot)
    }
}

use super::datum::DatumKind as D;
use super::special::SpecialKind as S;

struct Row {
    id: &'static str,
    name: &'static str,
    slots: &'static [SlotId],
    case_type: CaseType,
    priority: u32,
    total_steps: u32,
    examples: &'static [&'static str],
    limitation: Option<&'static str>,
}

const fn d(kind: DatumKind) -> SlotId {
    SlotId::Datum(kind)
}

const fn s(kind: SpecialKind) -> SlotId {
    SlotId::Special(kind)
}

const STANDARD: &[Row] = &[
    Row {
        id: "PROC-01", name: "Canonical Oblique",
        slots: &[d(D::TrueLength), d(D::InclinationHp), d(D::InclinationVp), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::D, priority: 100, total_steps: 10,
        examples: &[
            "Line AB 75mm long inclined at 30° to HP and 45° to VP. End A is 20mm above HP and 25mm in front of VP.",
            "A line PQ 100mm long makes 45° with HP and 30° with VP. P is 15mm above HP and 20mm in front of VP.",
            "Draw line AB 80mm long. It makes 35° with HP and 40° with VP. A is 10mm above HP and 15mm in front of VP.",
            "A 90mm line is inclined at 25° to HP and 50° to VP. One end is 30mm above HP and 20mm in front of VP.",
            "Line MN 60mm long. M is 10mm above HP and 15mm in front of VP. Inclination to HP is 30° and to VP is 45°.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-02", name: "Oblique from B",
        slots: &[d(D::TrueLength), d(D::InclinationHp), d(D::InclinationVp), d(D::HeightB), d(D::DepthB)],
        case_type: CaseType::D, priority: 95, total_steps: 11,
        examples: &[
            "Line AB 90mm long at 30° to HP and 45° to VP. End B is 20mm above HP and 25mm in front of VP.",
            "PQ 75mm makes 40° with HP and 35° with VP. Q is 15mm above HP and 30mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-03", name: "Oblique Midpoint",
        slots: &[d(D::TrueLength), d(D::InclinationHp), d(D::InclinationVp), d(D::MidpointHeight), d(D::MidpointDepth)],
        case_type: CaseType::D, priority: 90, total_steps: 12,
        examples: &[
            "Line AB 100mm long at 30° to HP and 45° to VP. Midpoint is 20mm above HP and 25mm in front of VP.",
            "A 75mm line inclined 35° to HP and 40° to VP. Its midpoint is 15mm above HP and 20mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-04", name: "Inclined to HP only",
        slots: &[d(D::TrueLength), d(D::InclinationHp), s(S::ParallelVp), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::C, priority: 85, total_steps: 5,
        examples: &[
            "Line AB 80mm long inclined at 30° to HP and parallel to VP. A is 20mm above HP and 15mm in front of VP.",
            "A 100mm line makes 45° with HP and is parallel to VP. One end is 10mm above HP and 25mm in front of VP.",
            "PQ 75mm is inclined 40° to HP and parallel to VP. P is 15mm above HP and 20mm in front of VP.",
            "Draw a 90mm line inclined to HP at 35° and parallel to VP. End A 25mm above HP and 20mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-05", name: "Inclined to VP only",
        slots: &[d(D::TrueLength), s(S::ParallelHp), d(D::InclinationVp), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::B, priority: 85, total_steps: 5,
        examples: &[
            "Line AB 80mm long parallel to HP and inclined 45° to VP. A is 20mm above HP and 15mm in front of VP.",
            "A line 100mm long makes 30° with VP and is parallel to HP. One end 25mm above HP and 20mm in front of VP.",
            "PQ 75mm parallel to HP and inclined 40° to VP. P is 10mm above HP and 30mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-06", name: "Parallel to both",
        slots: &[d(D::TrueLength), s(S::ParallelHp), s(S::ParallelVp), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::A, priority: 80, total_steps: 5,
        examples: &[
            "Line AB 80mm long parallel to both HP and VP. A is 20mm above HP and 15mm in front of VP.",
            "A line 100mm long is parallel to HP and VP. One end is 25mm above HP and 20mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-07", name: "Perpendicular to HP",
        slots: &[d(D::TrueLength), s(S::PerpendicularHp), s(S::ParallelVp), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::PerpendicularHp, priority: 75, total_steps: 5,
        examples: &[
            "A vertical line AB 80mm long. A is 20mm above HP and 15mm in front of VP.",
            "Line perpendicular to HP 75mm long. One end 10mm above HP and 25mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-08", name: "Perpendicular to VP",
        slots: &[d(D::TrueLength), s(S::ParallelHp), s(S::PerpendicularVp), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::PerpendicularVp, priority: 75, total_steps: 5,
        examples: &[
            "Line AB perpendicular to VP 80mm long. A is 20mm above HP and 15mm in front of VP.",
            "A line perpendicular to VP 100mm long. One end 25mm above HP and 20mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-09", name: "L_TV with both angles",
        slots: &[d(D::TopViewLength), d(D::InclinationHp), d(D::InclinationVp), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::D, priority: 70, total_steps: 8,
        examples: &[
            "Top view of line AB is 65mm. Line is inclined 30° to HP and 45° to VP. A is 20mm above HP and 25mm in front of VP.",
            "The plan of PQ measures 75mm. PQ makes 40° with HP and 30° with VP. P is 10mm above HP and 20mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-10", name: "L_FV with both angles",
        slots: &[d(D::FrontViewLength), d(D::InclinationHp), d(D::InclinationVp), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::D, priority: 70, total_steps: 8,
        examples: &[
            "Front view of line AB is 60mm. It makes 30° with HP and 45° with VP. A is 20mm above HP and 25mm in front of VP.",
            "The elevation of PQ measures 50mm. PQ makes 35° with HP and 40° with VP. P is 10mm above HP and 15mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-11", name: "L_TV inclined to HP",
        slots: &[d(D::TopViewLength), d(D::InclinationHp), s(S::ParallelVp), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::C, priority: 65, total_steps: 6,
        examples: &[
            "Line AB parallel to VP. Its top view is 65mm and inclined 30° to HP. A is 20mm above HP and 25mm in front of VP.",
            "PQ parallel to VP has a top view of 75mm making 40° with HP. P is 10mm above HP and 20mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-12", name: "L_FV inclined to VP",
        slots: &[d(D::FrontViewLength), s(S::ParallelHp), d(D::InclinationVp), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::B, priority: 65, total_steps: 6,
        examples: &[
            "Line AB parallel to HP. Its front view is 60mm and inclined 45° to VP. A is 20mm above HP and 25mm in front of VP.",
            "PQ parallel to HP has front view of 75mm making 35° with VP. P is 10mm above HP and 15mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-13", name: "Both views + Δx",
        slots: &[d(D::TopViewLength), d(D::FrontViewLength), d(D::HeightA), d(D::DepthA), d(D::ProjectorDistance)],
        case_type: CaseType::D, priority: 60, total_steps: 10,
        examples: &[
            "Line AB has top view 65mm and front view 55mm. A is 20mm above HP and 25mm in front of VP. Projectors are 50mm apart.",
            "PQ has plan 75mm, elevation 60mm, A is 10mm above HP and 20mm in front of VP. End projectors 60mm apart.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-14", name: "Both views no Δx",
        slots: &[d(D::TopViewLength), d(D::FrontViewLength), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::D, priority: 55, total_steps: 8,
        examples: &[
            "Line AB has top view 65mm and front view 55mm. A is 20mm above HP and 25mm in front of VP.",
            "PQ has plan 75mm and elevation 60mm. P is 10mm above HP and 20mm in front of VP.",
        ],
        limitation: Some(
            "Only four slots are given: the true length is estimated from both view lengths without a projector distance",
        ),
    },
    Row {
        id: "PROC-15", name: "TL with apparent angles",
        slots: &[d(D::TrueLength), d(D::TopViewAngle), d(D::FrontViewAngle), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::D, priority: 50, total_steps: 8,
        examples: &[
            "Line AB 80mm long. Its top view makes 30° and front view makes 45° with XY. A is 20mm above HP and 25mm in front of VP.",
            "PQ 75mm. Plan makes 40° with XY and elevation makes 35° with XY. P is 10mm above HP and 20mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-16", name: "L_TV, α, h_B",
        slots: &[d(D::TopViewLength), d(D::TopViewAngle), d(D::HeightA), d(D::DepthA), d(D::HeightB)],
        case_type: CaseType::D, priority: 45, total_steps: 8,
        examples: &[
            "Top view of AB is 65mm at 30° to XY. A is 20mm above HP and 25mm in front of VP. B is 50mm above HP.",
            "Plan of PQ is 75mm at 40° with XY. P is 10mm above HP and 20mm in front of VP. Q is 60mm above HP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-17", name: "L_FV, β, d_B",
        slots: &[d(D::FrontViewLength), d(D::FrontViewAngle), d(D::HeightA), d(D::DepthA), d(D::DepthB)],
        case_type: CaseType::D, priority: 45, total_steps: 8,
        examples: &[
            "Front view of AB is 60mm making 45° with XY. A is 20mm above HP and 25mm in front of VP. B is 30mm in front of VP.",
            "Elevation of PQ is 50mm at 35° with XY. P is 10mm above HP and 15mm in front of VP. Q is 40mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-18", name: "TL, α, h_B",
        slots: &[d(D::TrueLength), d(D::TopViewAngle), d(D::HeightA), d(D::DepthA), d(D::HeightB)],
        case_type: CaseType::D, priority: 40, total_steps: 8,
        examples: &[
            "Line AB 80mm long. Its plan makes 30° with XY. A is 20mm above HP and 25mm in front of VP. B is 55mm above HP.",
            "PQ 90mm. Top view at 40° to XY. P is 10mm above HP and 20mm in front of VP. Q is 65mm above HP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-19", name: "TL, β, d_B",
        slots: &[d(D::TrueLength), d(D::FrontViewAngle), d(D::HeightA), d(D::DepthA), d(D::DepthB)],
        case_type: CaseType::D, priority: 40, total_steps: 8,
        examples: &[
            "Line AB 80mm long. Front view makes 45° with XY. A is 20mm above HP and 25mm in front of VP. B is 35mm in front of VP.",
            "PQ 90mm. Elevation at 35° to XY. P is 10mm above HP and 15mm in front of VP. Q is 45mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-20", name: "TL + both endpoints",
        slots: &[d(D::TrueLength), d(D::HeightA), d(D::DepthA), d(D::HeightB), d(D::DepthB)],
        case_type: CaseType::D, priority: 35, total_steps: 8,
        examples: &[
            "Line AB 90mm long. A is 20mm above HP and 25mm in front of VP. B is 50mm above HP and 40mm in front of VP.",
            "PQ 75mm. P is 10mm above HP and 20mm in front of VP. Q is 45mm above HP and 35mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-21", name: "Find TL from positions",
        slots: &[d(D::HeightA), d(D::DepthA), d(D::HeightB), d(D::DepthB), d(D::ProjectorDistance)],
        case_type: CaseType::D, priority: 30, total_steps: 8,
        examples: &[
            "Line AB. A is 20mm above HP and 25mm in front of VP. B is 50mm above HP and 40mm in front of VP. Projectors are 60mm apart.",
            "PQ. P is 10mm above HP and 20mm in front of VP. Q is 45mm above HP and 35mm in front of VP. End projectors 50mm apart.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-22", name: "TL, A, h_B, Δx",
        slots: &[d(D::TrueLength), d(D::HeightA), d(D::DepthA), d(D::HeightB), d(D::ProjectorDistance)],
        case_type: CaseType::D, priority: 25, total_steps: 8,
        examples: &[
            "Line AB 90mm long. A is 20mm above HP and 25mm in front of VP. B is 55mm above HP. Projectors 60mm apart.",
            "PQ 75mm. P is 10mm above HP and 15mm in front of VP. Q is 50mm above HP. End projectors 55mm apart.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-23", name: "TL, A, d_B, Δx",
        slots: &[d(D::TrueLength), d(D::HeightA), d(D::DepthA), d(D::DepthB), d(D::ProjectorDistance)],
        case_type: CaseType::D, priority: 25, total_steps: 8,
        examples: &[
            "Line AB 90mm long. A is 20mm above HP and 25mm in front of VP. B is 40mm in front of VP. Projectors 60mm apart.",
            "PQ 75mm. P is 10mm above HP and 20mm in front of VP. Q is 35mm in front of VP. Projectors 50mm apart.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-24", name: "TL, θ, Δx",
        slots: &[d(D::TrueLength), d(D::InclinationHp), d(D::HeightA), d(D::DepthA), d(D::ProjectorDistance)],
        case_type: CaseType::D, priority: 20, total_steps: 8,
        examples: &[
            "Line AB 90mm long inclined 30° to HP. A is 20mm above HP and 25mm in front of VP. Projectors 60mm apart.",
            "PQ 75mm at 40° to HP. P is 10mm above HP and 20mm in front of VP. End projectors 55mm apart.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-25", name: "TL, φ, Δx",
        slots: &[d(D::TrueLength), d(D::InclinationVp), d(D::HeightA), d(D::DepthA), d(D::ProjectorDistance)],
        case_type: CaseType::D, priority: 20, total_steps: 8,
        examples: &[
            "Line AB 90mm long inclined 45° to VP. A is 20mm above HP and 25mm in front of VP. Projectors 60mm apart.",
            "PQ 75mm at 35° to VP. P is 10mm above HP and 20mm in front of VP. End projectors 50mm apart.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-26", name: "L_FV, β, h_B",
        slots: &[d(D::FrontViewLength), d(D::FrontViewAngle), d(D::HeightA), d(D::DepthA), d(D::HeightB)],
        case_type: CaseType::D, priority: 15, total_steps: 8,
        examples: &[
            "Front view of AB is 60mm making 45° with XY. A is 20mm above HP and 25mm in front of VP. B is 50mm above HP.",
            "Elevation of PQ is 50mm at 35° with XY. P is 10mm above HP and 15mm in front of VP. Q is 60mm above HP.",
        ],
        limitation: Some(
            "The depth of end B is not given: the construction places B at the depth of A as a placeholder",
        ),
    },
    Row {
        id: "PROC-27", name: "Base + Traces",
        slots: &[d(D::TrueLength), d(D::InclinationHp), d(D::InclinationVp), d(D::HeightA), s(S::TraceRequest)],
        case_type: CaseType::D, priority: 10, total_steps: 12,
        examples: &[
            "Line AB 80mm at 30° to HP and 45° to VP. A is 20mm above HP. Mark traces.",
            "PQ 75mm making 35° with HP and 40° with VP. P is 10mm above HP. Find HT and VT.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-28", name: "VT as 5th datum",
        slots: &[d(D::FrontViewLength), d(D::InclinationVp), d(D::HeightA), d(D::HeightB), d(D::VerticalTraceHeight)],
        case_type: CaseType::D, priority: 5, total_steps: 6,
        examples: &[
            "Front view of AB is 60mm at 45° to VP. A is 20mm above HP. B is 55mm above HP. VT is 30mm above HP.",
            "Elevation of PQ is 50mm. PQ inclined 35° to VP. P is 10mm above HP. Q is 45mm above HP. VT 25mm above HP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-29", name: "TL + both views + position",
        slots: &[d(D::TrueLength), d(D::TopViewLength), d(D::FrontViewLength), s(S::OnHp), d(D::DepthA)],
        case_type: CaseType::D, priority: 50, total_steps: 8,
        examples: &[
            "Line AB 75mm long. Top view 65mm and front view 55mm. End A is in HP and 25mm in front of VP.",
            "PQ 80mm. Plan 70mm, elevation 60mm. P is on HP and 20mm in front of VP.",
        ],
        limitation: None,
    },
    Row {
        id: "PROC-30", name: "TL + both views + both positions",
        slots: &[d(D::TrueLength), d(D::TopViewLength), d(D::FrontViewLength), d(D::HeightA), d(D::DepthA)],
        case_type: CaseType::D, priority: 48, total_steps: 8,
        examples: &[
            "Line AB 75mm long. Top view 65mm and front view 55mm. A is 20mm above HP and 25mm in front of VP.",
            "PQ 80mm. Plan 70mm, elevation 60mm. P is 10mm above HP and 20mm in front of VP.",
        ],
        limitation: None,
    },
];

/// The 30 standard procedures, in catalogue order.
pub fn standard_procedures() -> Vec<ProcedureDescriptor> {
    STANDARD
        .iter()
        .map(|row| ProcedureDescriptor {
            proc_id: row.id.to_string(),
            name: row.name.to_string(),
            required_slots: row.slots.to_vec(),
            case_type: row.case_type,
            priority: row.priority,
            total_steps: row.total_steps,
            training_examples: row.examples.iter().map(|e| e.to_string()).collect(),
            limitation: row.limitation.map(str::to_string),
        })
        .collect()
}

// ═══════════════════════════════════════════════════════════
// Slot weights
// ═══════════════════════════════════════════════════════════

/// Feature importance of each slot in the classifier's weighted Jaccard.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotWeights {
    datum: [f64; 18],
    special: [f64; 13],
}

impl SlotWeights {
    /// Weight applied to a slot missing from the table.
    pub const DEFAULT: f64 = 1.0;

    pub fn standard() -> Self {
        Self {
            datum: [
                1.2, 1.0, 1.0, 1.1, 1.1, 1.0, 1.0, 0.9, 0.9, 0.8, 0.8, 0.85, 0.75, 0.75, 0.7, 0.7,
                0.6, 0.6,
            ],
            special: [1.1, 1.1, 1.0, 1.0, 1.0, 1.0, 1.2, 1.1, 0.9, 1.1, 0.7, 0.8, 0.5],
        }
    }

    /// Uniform table, every slot at `DEFAULT`.
    pub fn uniform() -> Self {
        Self {
            datum: [Self::DEFAULT; 18],
            special: [Self::DEFAULT; 13],
        }
    }

    pub fn weight(&self, slot: SlotId) -> f64 {
        match slot {
            SlotId::Datum(kind) => self.datum[kind as usize],
            SlotId::Special(kind) => self.special[kind as usize],
        }
    }

    pub fn set(&mut self, slot: SlotId, weight: f64) {
        match slot {
            SlotId::Datum(kind) => self.datum[kind as usize] = weight,
            SlotId::Special(kind) => self.special[kind as usize] = weight,
        }
    }
}

impl Default for SlotWeights {
    fn default() -> Self {
        Self::standard()
    }
}
