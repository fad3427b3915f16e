//! Rule-based geometric checks. Each rule reports at most one finding.

use crate::pipeline::classify::ConstraintMap;

use super::types::Explanation;

/// Angle sum above which a line cannot exist.
const MAX_ANGLE_SUM: f64 = 90.5;
const BOUNDARY_TOLERANCE: f64 = 0.5;
/// Coordinate agreement for midpoint and parallel-line checks, in mm.
const POSITION_TOLERANCE: f64 = 1.0;
const PROJECTOR_TOLERANCE: f64 = 2.0;

type Rule = fn(&ConstraintMap) -> Option<Explanation>;

const RULES: [Rule; 9] = [
    true_length_positive,
    angle_domains,
    angle_sum,
    projection_consistency,
    projector_distance,
    midpoint_consistency,
    parallel_consistency,
    view_length_bounds,
    trace_position,
];

/// Run every rule in order.
pub fn geometric_checks(c: &ConstraintMap) -> Vec<Explanation> {
    RULES.iter().filter_map(|rule| rule(c)).collect()
}

fn cos_deg(deg: f64) -> f64 {
    deg.to_radians().cos()
}

/// TL when present and non-zero; a zero TL is left to `TL_positive`.
fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0)
}

fn true_length_positive(c: &ConstraintMap) -> Option<Explanation> {
    let tl = c.true_length?;
    (tl <= 0.0).then(|| {
        Explanation::error(
            "TL_positive",
            format!("True Length must be positive (got {tl}mm)"),
            "A line segment cannot have zero or negative length",
        )
        .on_field("TL", tl)
    })
}

fn angle_domains(c: &ConstraintMap) -> Option<Explanation> {
    let angles = [
        ("theta", "θ (inclination to HP)", c.theta),
        ("phi", "φ (inclination to VP)", c.phi),
        ("alpha", "α (TV angle)", c.alpha),
        ("beta", "β (FV angle)", c.beta),
        ("gamma", "γ (inclination to PP)", c.gamma),
    ];
    angles.into_iter().find_map(|(field, label, value)| {
        let value = value?;
        (!(0.0..=90.0).contains(&value)).then(|| {
            Explanation::error(
                format!("angle_domain_{field}"),
                format!("{label} must be in [0°, 90°] (got {value}°)"),
                "Inclination angles are measured from the reference plane [0°, 90°]",
            )
            .on_field(field, value)
        })
    })
}

fn angle_sum(c: &ConstraintMap) -> Option<Explanation> {
    let (theta, phi) = (c.theta?, c.phi?);
    if theta == 0.0 && phi == 0.0 {
        return None;
    }
    let sum = theta + phi;

    if sum > MAX_ANGLE_SUM {
        return Some(Explanation::error(
            "angle_sum",
            format!("θ + φ = {sum:.1}° exceeds 90° (θ={theta}°, φ={phi}°)"),
            "The true inclinations of a line to HP and VP cannot add up to more than 90°",
        ));
    }
    if (sum - 90.0).abs() < BOUNDARY_TOLERANCE && theta > 0.0 && phi > 0.0 {
        return Some(Explanation::warning(
            "angle_sum_boundary",
            format!("θ + φ ≈ 90° ({sum:.1}°): line lies in a profile plane"),
            "When θ + φ = 90° both views are perpendicular to XY, a degenerate case",
        ));
    }
    None
}

fn projection_consistency(c: &ConstraintMap) -> Option<Explanation> {
    let tl = nonzero(c.true_length)?;
    let tolerance = 2.0 + 0.05 * tl;

    if let (Some(theta), Some(tv)) = (c.theta, c.top_view) {
        let expected = tl * cos_deg(theta);
        if (tv - expected).abs() > tolerance {
            return Some(
                Explanation::error(
                    "tv_length_consistency",
                    format!(
                        "L_TV={tv}mm inconsistent with TL={tl}mm and θ={theta}° (expected ~{expected:.1}mm)"
                    ),
                    format!("Top view length = TL × cos(θ), so L_TV should be ~{expected:.1}mm"),
                )
                .on_field("L_TV", tv),
            );
        }
    }

    if let (Some(phi), Some(fv)) = (c.phi, c.front_view) {
        let expected = tl * cos_deg(phi);
        if (fv - expected).abs() > tolerance {
            return Some(
                Explanation::error(
                    "fv_length_consistency",
                    format!(
                        "L_FV={fv}mm inconsistent with TL={tl}mm and φ={phi}° (expected ~{expected:.1}mm)"
                    ),
                    format!("Front view length = TL × cos(φ), so L_FV should be ~{expected:.1}mm"),
                )
                .on_field("L_FV", fv),
            );
        }
    }

    if let (Some(tv), Some(h_a), Some(h_b)) = (c.top_view, c.height_a, c.height_b) {
        let dh = h_b - h_a;
        let dd = match (c.depth_a, c.depth_b) {
            (Some(d_a), Some(d_b)) => d_b - d_a,
            _ => 0.0,
        };
        let computed = (tv * tv + dh * dh + dd * dd).sqrt();
        if (computed - tl).abs() > 3.0 + 0.05 * tl {
            return Some(
                Explanation::warning(
                    "tl_geometry_check",
                    format!(
                        "TL={tl}mm may be inconsistent with endpoint positions (computed TL≈{computed:.1}mm)"
                    ),
                    "TL² = L_TV² + ΔH² + ΔD²; check the endpoint coordinates",
                )
                .on_field("TL", tl),
            );
        }
    }

    None
}

fn projector_distance(c: &ConstraintMap) -> Option<Explanation> {
    let dx = nonzero(c.delta_x)?;
    let tv = c.top_view?;

    if dx > tv + 1.0 {
        return Some(
            Explanation::error(
                "projector_distance",
                format!("Projector distance Δx={dx}mm cannot exceed top view length L_TV={tv}mm"),
                "The distance between projectors is L_TV × cos(α), so Δx ≤ L_TV",
            )
            .on_field("delta_X", dx),
        );
    }

    let alpha = c.alpha?;
    let expected = tv * cos_deg(alpha);
    ((dx - expected).abs() > PROJECTOR_TOLERANCE).then(|| {
        Explanation::warning(
            "projector_alpha_consistency",
            format!(
                "Δx={dx}mm inconsistent with L_TV={tv}mm and α={alpha}° (expected ~{expected:.1}mm)"
            ),
            "Δx = L_TV × cos(α)",
        )
        .on_field("delta_X", dx)
    })
}

fn midpoint_consistency(c: &ConstraintMap) -> Option<Explanation> {
    if let (Some(h_a), Some(h_b), Some(h_mid)) = (c.height_a, c.height_b, c.h_mid) {
        let expected = (h_a + h_b) / 2.0;
        if (h_mid - expected).abs() > POSITION_TOLERANCE {
            return Some(
                Explanation::error(
                    "midpoint_height",
                    format!("Midpoint height {h_mid}mm ≠ (h_A + h_B)/2 = {expected:.1}mm"),
                    "Midpoint height must be the average of endpoint heights",
                )
                .on_field("h_mid", h_mid),
            );
        }
    }

    if let (Some(d_a), Some(d_b), Some(d_mid)) = (c.depth_a, c.depth_b, c.d_mid) {
        let expected = (d_a + d_b) / 2.0;
        if (d_mid - expected).abs() > POSITION_TOLERANCE {
            return Some(
                Explanation::error(
                    "midpoint_depth",
                    format!("Midpoint depth {d_mid}mm ≠ (d_A + d_B)/2 = {expected:.1}mm"),
                    "Midpoint depth must be the average of endpoint depths",
                )
                .on_field("d_mid", d_mid),
            );
        }
    }

    None
}

fn parallel_consistency(c: &ConstraintMap) -> Option<Explanation> {
    if let (true, Some(h_a), Some(h_b)) = (c.theta == Some(0.0), c.height_a, c.height_b) {
        if (h_a - h_b).abs() > POSITION_TOLERANCE {
            return Some(
                Explanation::error(
                    "parallel_hp_height",
                    format!(
                        "If line is parallel to HP (θ=0), both endpoints must have same height. h_A={h_a}, h_B={h_b}"
                    ),
                    "A line parallel to HP is at constant height throughout its length",
                )
                .on_field("h_B", h_b),
            );
        }
    }

    if let (true, Some(d_a), Some(d_b)) = (c.phi == Some(0.0), c.depth_a, c.depth_b) {
        if (d_a - d_b).abs() > POSITION_TOLERANCE {
            return Some(
                Explanation::error(
                    "parallel_vp_depth",
                    format!(
                        "If line is parallel to VP (φ=0), both endpoints must have same depth. d_A={d_a}, d_B={d_b}"
                    ),
                    "A line parallel to VP is at constant depth throughout its length",
                )
                .on_field("d_B", d_b),
            );
        }
    }

    None
}

fn view_length_bounds(c: &ConstraintMap) -> Option<Explanation> {
    let tl = nonzero(c.true_length)?;

    if let Some(tv) = c.top_view.filter(|tv| *tv > tl + 1.0) {
        return Some(
            Explanation::error(
                "tv_length_bound",
                format!("Top view length L_TV={tv}mm cannot exceed true length TL={tl}mm"),
                "A projection is never longer than the true length (cos θ ≤ 1)",
            )
            .on_field("L_TV", tv),
        );
    }

    c.front_view.filter(|fv| *fv > tl + 1.0).map(|fv| {
        Explanation::error(
            "fv_length_bound",
            format!("Front view length L_FV={fv}mm cannot exceed true length TL={tl}mm"),
            "A projection is never longer than the true length (cos φ ≤ 1)",
        )
        .on_field("L_FV", fv)
    })
}

fn trace_position(c: &ConstraintMap) -> Option<Explanation> {
    let (vt, theta, h_a) = (c.vt_height?, c.theta?, c.height_a?);
    (theta > 0.0 && h_a > 0.0 && vt < 0.0).then(|| {
        Explanation::warning(
            "vt_position",
            format!("VT at {vt}mm below HP is unusual when line rises from HP (θ={theta}°)"),
            "Check sign conventions for VT height",
        )
        .on_field("VT_h", vt)
    })
}

/// Plausibility checks spanning several fields.
pub fn cross_field_checks(c: &ConstraintMap) -> Vec<Explanation> {
    let mut issues = Vec::new();

    if let (Some(h_a), Some(h_b), Some(theta)) = (c.height_a, c.height_b, c.theta) {
        if theta > 0.0 && h_b < h_a {
            issues.push(
                Explanation::warning(
                    "cross_field",
                    format!(
                        "End B (h_B={h_b}) is lower than End A (h_A={h_a}) while θ={theta}°: check endpoint labeling"
                    ),
                    "End A is usually the lower end when the line rises from A to B",
                )
                .on_field("h_B", h_b),
            );
        }
    }

    if let (Some(theta), Some(phi)) = (c.theta, c.phi) {
        let sum = theta.to_radians().sin().powi(2) + phi.to_radians().sin().powi(2);
        if sum > 1.01 {
            issues.push(Explanation::error(
                "cross_field",
                format!("sin²θ + sin²φ = {sum:.3} > 1: angles are geometrically impossible"),
                "For a line in space sin²θ + sin²φ ≤ 1",
            ));
        }
    }

    issues
}
