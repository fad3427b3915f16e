use serde::Serialize;

use super::datum::DatumKind;
use super::CatalogueError;

/// Typical textbook spread of one constraint field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldDistribution {
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl FieldDistribution {
    pub const fn new(mean: f64, std: f64, min: f64, max: f64) -> Self {
        Self { mean, std, min, max }
    }

    pub fn z_score(&self, value: f64) -> f64 {
        (value - self.mean).abs() / self.std
    }

    pub fn in_range(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Read-only distribution table used by the anomaly pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DistributionTable {
    entries: Vec<(DatumKind, FieldDistribution)>,
}

const STANDARD: [(DatumKind, FieldDistribution); 12] = [
    (DatumKind::TrueLength, FieldDistribution::new(80.0, 30.0, 10.0, 300.0)),
    (DatumKind::InclinationHp, FieldDistribution::new(35.0, 20.0, 0.0, 90.0)),
    (DatumKind::InclinationVp, FieldDistribution::new(35.0, 20.0, 0.0, 90.0)),
    (DatumKind::HeightA, FieldDistribution::new(20.0, 15.0, -100.0, 150.0)),
    (DatumKind::DepthA, FieldDistribution::new(20.0, 15.0, -100.0, 150.0)),
    (DatumKind::HeightB, FieldDistribution::new(40.0, 25.0, -100.0, 200.0)),
    (DatumKind::DepthB, FieldDistribution::new(30.0, 20.0, -100.0, 200.0)),
    (DatumKind::TopViewLength, FieldDistribution::new(65.0, 25.0, 0.0, 300.0)),
    (DatumKind::FrontViewLength, FieldDistribution::new(55.0, 20.0, 0.0, 300.0)),
    (DatumKind::TopViewAngle, FieldDistribution::new(35.0, 20.0, 0.0, 90.0)),
    (DatumKind::FrontViewAngle, FieldDistribution::new(40.0, 20.0, 0.0, 90.0)),
    (DatumKind::ProjectorDistance, FieldDistribution::new(55.0, 20.0, 0.0, 300.0)),
];

impl DistributionTable {
    /// Validate and build a table. Order is preserved for reporting.
    pub fn new(entries: Vec<(DatumKind, FieldDistribution)>) -> Result<Self, CatalogueError> {
        for (i, (kind, dist)) in entries.iter().enumerate() {
            let finite = dist.mean.is_finite() && dist.std.is_finite();
            if !finite || dist.std <= 0.0 || dist.min > dist.max {
                return Err(CatalogueError::CorruptDistribution {
                    field: kind.field().to_string(),
                    reason: format!(
                        "mean={} std={} range=[{}, {}]",
                        dist.mean, dist.std, dist.min, dist.max
                    ),
                });
            }
            if entries[..i].iter().any(|(k, _)| k == kind) {
                return Err(CatalogueError::CorruptDistribution {
                    field: kind.field().to_string(),
                    reason: "listed twice".into(),
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn standard() -> Self {
        Self { entries: STANDARD.to_vec() }
    }

    pub fn get(&self, kind: DatumKind) -> Option<&FieldDistribution> {
        self.entries.iter().find(|(k, _)| *k == kind).map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(DatumKind, FieldDistribution)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DistributionTable {
    fn default() -> Self {
        Self::standard()
    }
}
