use crate::pipeline::catalogue::DistributionTable;
use crate::pipeline::classify::confidence::round2;
use crate::pipeline::classify::ConstraintMap;

use super::types::Explanation;

/// Standard deviations from the mean before a value is flagged.
const Z_THRESHOLD: f64 = 3.0;

/// Compare every known field against its textbook distribution.
/// Values outside the hard range score 1.0; outliers score `min(1, z/5)`.
pub fn detect_anomalies(c: &ConstraintMap, table: &DistributionTable) -> Vec<Explanation> {
    let mut anomalies = Vec::new();

    for (kind, dist) in table.iter() {
        let Some(value) = c.get(*kind) else { continue };
        let field = kind.field();

        if !dist.in_range(value) {
            anomalies.push(
                Explanation::anomaly(
                    "distribution",
                    format!(
                        "{field}={value} is outside expected range [{}, {}]",
                        dist.min, dist.max
                    ),
                    format!("Typical values for {field} are between {} and {}", dist.min, dist.max),
                )
                .on_field(field, value)
                .scored(1.0),
            );
            continue;
        }

        let z = dist.z_score(value);
        if z > Z_THRESHOLD {
            anomalies.push(
                Explanation::anomaly(
                    "distribution",
                    format!("{field}={value} is unusual (Z-score: {z:.1}, mean={})", dist.mean),
                    format!(
                        "This value is {z:.1} standard deviations from the typical mean of {}",
                        dist.mean
                    ),
                )
                .on_field(field, value)
                .scored(round2((z / 5.0).min(1.0))),
            );
        }
    }

    anomalies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalogue::DatumKind;

    #[test]
    fn typical_values_pass() {
        let c = ConstraintMap::default()
            .with(DatumKind::TrueLength, 75.0)
            .with(DatumKind::HeightA, 20.0);
        assert!(detect_anomalies(&c, &DistributionTable::standard()).is_empty());
    }

    #[test]
    fn out_of_range_scores_one() {
        let c = ConstraintMap::default().with(DatumKind::TrueLength, 500.0);
        let found = detect_anomalies(&c, &DistributionTable::standard());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].anomaly_score, Some(1.0));
        assert_eq!(found[0].field, Some("TL"));
        assert!(found[0].message.contains("[10, 300]"), "Got: {}", found[0].message);
    }

    #[test]
    fn outlier_scored_by_z() {
        // (140 - 20) / 15 = 8 → capped at 1
        let c = ConstraintMap::default().with(DatumKind::HeightA, 140.0);
        let found = detect_anomalies(&c, &DistributionTable::standard());
        assert_eq!(found[0].anomaly_score, Some(1.0));

        // (200 - 80) / 30 = 4 → 0.8
        let c = ConstraintMap::default().with(DatumKind::TrueLength, 200.0);
        let found = detect_anomalies(&c, &DistributionTable::standard());
        assert_eq!(found[0].anomaly_score, Some(0.8));
        assert!(found[0].message.contains("Z-score: 4.0"));
    }

    #[test]
    fn fields_without_distribution_ignored() {
        let c = ConstraintMap::default().with(DatumKind::SideViewLength, 9999.0);
        assert!(detect_anomalies(&c, &DistributionTable::standard()).is_empty());
    }
}
