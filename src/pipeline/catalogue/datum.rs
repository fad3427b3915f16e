use std::fmt;

use serde::Serialize;

/// The 18 kinds of numeric datum a problem statement can carry.
///
/// Discriminant order matches `DATUM_TYPES` so a kind can index the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DatumKind {
    #[serde(rename = "D01")]
    TrueLength,
    #[serde(rename = "D02")]
    InclinationHp,
    #[serde(rename = "D03")]
    InclinationVp,
    #[serde(rename = "D04")]
    HeightA,
    #[serde(rename = "D05")]
    DepthA,
    #[serde(rename = "D06")]
    HeightB,
    #[serde(rename = "D07")]
    DepthB,
    #[serde(rename = "D08")]
    TopViewLength,
    #[serde(rename = "D09")]
    FrontViewLength,
    #[serde(rename = "D10")]
    TopViewAngle,
    #[serde(rename = "D11")]
    FrontViewAngle,
    #[serde(rename = "D12")]
    ProjectorDistance,
    #[serde(rename = "D13")]
    MidpointHeight,
    #[serde(rename = "D14")]
    MidpointDepth,
    #[serde(rename = "D15")]
    VerticalTraceHeight,
    #[serde(rename = "D16")]
    HorizontalTraceDepth,
    #[serde(rename = "D17")]
    SideViewLength,
    #[serde(rename = "D18")]
    InclinationPp,
}

impl DatumKind {
    pub const ALL: [DatumKind; 18] = [
        DatumKind::TrueLength,
        DatumKind::InclinationHp,
        DatumKind::InclinationVp,
        DatumKind::HeightA,
        DatumKind::DepthA,
        DatumKind::HeightB,
        DatumKind::DepthB,
        DatumKind::TopViewLength,
        DatumKind::FrontViewLength,
        DatumKind::TopViewAngle,
        DatumKind::FrontViewAngle,
        DatumKind::ProjectorDistance,
        DatumKind::MidpointHeight,
        DatumKind::MidpointDepth,
        DatumKind::VerticalTraceHeight,
        DatumKind::HorizontalTraceDepth,
        DatumKind::SideViewLength,
        DatumKind::InclinationPp,
    ];

    /// Catalogue code ("D01".."D18").
    pub fn code(self) -> &'static str {
        self.descriptor().code
    }

    /// Constraint-map field name ("TL", "theta", "h_A", ...).
    pub fn field(self) -> &'static str {
        self.descriptor().field
    }

    pub fn descriptor(self) -> &'static DatumType {
        &DATUM_TYPES[self as usize]
    }

    pub fn from_field(field: &str) -> Option<DatumKind> {
        DatumKind::ALL.into_iter().find(|k| k.field() == field)
    }

    pub fn is_angle(self) -> bool {
        self.descriptor().unit == Unit::Degree
    }
}

impl fmt::Display for DatumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Millimetre,
    Degree,
}

/// Closed numeric interval; either bound may be infinite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

impl Domain {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn is_bounded(&self) -> bool {
        self.min.is_finite() || self.max.is_finite()
    }
}

/// Immutable descriptor for one datum kind.
#[derive(Debug, Clone, PartialEq)]
pub struct DatumType {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub field: &'static str,
    pub unit: Unit,
    pub domain: Domain,
    pub feature_weight: f64,
    pub description: &'static str,
}

impl DatumType {
    /// "True Length (TL)" form used in completeness reports.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.name, self.symbol)
    }
}

const NON_NEGATIVE: Domain = Domain::new(0.0, f64::INFINITY);
const ANGLE: Domain = Domain::new(0.0, 90.0);
const UNBOUNDED: Domain = Domain::new(f64::NEG_INFINITY, f64::INFINITY);

const fn datum(
    code: &'static str,
    symbol: &'static str,
    name: &'static str,
    field: &'static str,
    unit: Unit,
    domain: Domain,
    feature_weight: f64,
    description: &'static str,
) -> DatumType {
    DatumType { code, symbol, name, field, unit, domain, feature_weight, description }
}

pub const DATUM_TYPES: [DatumType; 18] = [
    datum("D01", "TL", "True Length", "TL", Unit::Millimetre, NON_NEGATIVE, 1.0,
        "The actual 3D length of the line segment"),
    datum("D02", "θ", "Inclination to HP", "theta", Unit::Degree, ANGLE, 0.9,
        "True angle measured from HP plane upward"),
    datum("D03", "φ", "Inclination to VP", "phi", Unit::Degree, ANGLE, 0.9,
        "True angle measured from VP plane forward"),
    datum("D04", "h_A", "Height of end A", "h_A", Unit::Millimetre, UNBOUNDED, 0.85,
        "Perpendicular distance of A from HP (above=+, below=-)"),
    datum("D05", "d_A", "Depth of end A", "d_A", Unit::Millimetre, UNBOUNDED, 0.85,
        "Perpendicular distance of A from VP (front=+, behind=-)"),
    datum("D06", "h_B", "Height of end B", "h_B", Unit::Millimetre, UNBOUNDED, 0.85,
        "Perpendicular distance of B from HP"),
    datum("D07", "d_B", "Depth of end B", "d_B", Unit::Millimetre, UNBOUNDED, 0.85,
        "Perpendicular distance of B from VP"),
    datum("D08", "L_TV", "Top View length", "L_TV", Unit::Millimetre, NON_NEGATIVE, 0.8,
        "Projected length in horizontal plane (plan)"),
    datum("D09", "L_FV", "Front View length", "L_FV", Unit::Millimetre, NON_NEGATIVE, 0.8,
        "Projected length in vertical plane (elevation)"),
    datum("D10", "α", "TV angle with XY", "alpha", Unit::Degree, ANGLE, 0.7,
        "Apparent angle in top view"),
    datum("D11", "β", "FV angle with XY", "beta", Unit::Degree, ANGLE, 0.7,
        "Apparent angle in front view"),
    datum("D12", "Δx", "Projector distance", "delta_X", Unit::Millimetre, NON_NEGATIVE, 0.75,
        "Horizontal distance between projectors of A and B"),
    datum("D13", "h_mid", "Midpoint height", "h_mid", Unit::Millimetre, UNBOUNDED, 0.65,
        "Height of midpoint M above HP"),
    datum("D14", "d_mid", "Midpoint depth", "d_mid", Unit::Millimetre, UNBOUNDED, 0.65,
        "Depth of midpoint M from VP"),
    datum("D15", "VT_h", "VT height", "VT_h", Unit::Millimetre, UNBOUNDED, 0.6,
        "Height where line meets VP"),
    datum("D16", "HT_d", "HT depth", "HT_d", Unit::Millimetre, UNBOUNDED, 0.6,
        "Depth where line meets HP"),
    datum("D17", "L_SV", "Side View length", "L_SV", Unit::Millimetre, NON_NEGATIVE, 0.5,
        "Projected length in Profile Plane"),
    datum("D18", "γ", "Inclination to PP", "gamma", Unit::Degree, ANGLE, 0.5,
        "True angle with Profile Plane"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_matches_enum_discriminants() {
        for (i, kind) in DatumKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, i);
            assert_eq!(kind.code(), format!("D{:02}", i + 1));
        }
    }

    #[test]
    fn field_lookup_round_trips() {
        for kind in DatumKind::ALL {
            assert_eq!(DatumKind::from_field(kind.field()), Some(kind));
        }
        assert_eq!(DatumKind::from_field("nonsense"), None);
    }

    #[test]
    fn angle_kinds_are_bounded_to_ninety() {
        for kind in DatumKind::ALL.into_iter().filter(|k| k.is_angle()) {
            let domain = kind.descriptor().domain;
            assert_eq!(domain.min, 0.0);
            assert_eq!(domain.max, 90.0, "{} should cap at 90°", kind.field());
        }
    }

    #[test]
    fn endpoint_positions_are_unbounded() {
        let domain = DatumKind::HeightA.descriptor().domain;
        assert!(!domain.is_bounded());
        assert!(domain.contains(-250.0));
    }

    #[test]
    fn display_name_combines_name_and_symbol() {
        assert_eq!(DatumKind::TrueLength.descriptor().display_name(), "True Length (TL)");
    }

    #[test]
    fn serializes_as_catalogue_code() {
        let json = serde_json::to_string(&DatumKind::ProjectorDistance).unwrap();
        assert_eq!(json, "\"D12\"");
    }
}
