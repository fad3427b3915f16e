//! PROC-01: line inclined to both planes, given TL, θ, φ and the position
//! of end A.
//!
//! Rotating-line method: draw the line first parallel to VP (true θ in the
//! front view) and then parallel to HP (true φ in the top view), carry the
//! end heights and depths as loci, and swing the apparent lengths onto
//! them.

use crate::pipeline::catalogue::DatumKind;
use crate::pipeline::classify::ConstraintMap;

use super::primitives::{ConstructionStep, DrawPrimitive, LineStyle, Point2};
use super::traits::ConstructionRenderer;
use super::ConstructionError;

const STEPS: u32 = 10;

/// Distance from the drawing origin to the projector of end A.
const ORIGIN_X: f64 = 20.0;
/// Extra XY length beyond the line's reach.
const XY_MARGIN: f64 = 20.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalObliqueRenderer;

/// Every point of the construction, solved once.
#[derive(Debug, Clone, Copy)]
struct Layout {
    tl: f64,
    theta: f64,
    phi: f64,
    /// Front view of A.
    a_fv: Point2,
    /// Top view of A.
    a_tv: Point2,
    /// B with the line parallel to VP.
    b1_fv: Point2,
    b1_tv: Point2,
    /// B with the line parallel to HP.
    b2_tv: Point2,
    b2_fv: Point2,
    /// Final positions.
    b_fv: Point2,
    b_tv: Point2,
    alpha: f64,
    beta: f64,
}

impl Layout {
    fn solve(c: &ConstraintMap) -> Result<Self, ConstructionError> {
        let tl = require(c, DatumKind::TrueLength)?;
        let theta = require(c, DatumKind::InclinationHp)?;
        let phi = require(c, DatumKind::InclinationVp)?;
        let h_a = require(c, DatumKind::HeightA)?;
        let d_a = require(c, DatumKind::DepthA)?;

        if tl <= 0.0 {
            return Err(ConstructionError::Infeasible(format!("TL={tl} must be positive")));
        }
        let (t, p) = (theta.to_radians(), phi.to_radians());

        // Horizontal run of the final views; negative when θ+φ > 90.
        let run_sq = p.cos().powi(2) - t.sin().powi(2);
        if run_sq < -1e-9 {
            return Err(ConstructionError::Infeasible(format!(
                "θ={theta}° and φ={phi}° sum past 90°"
            )));
        }
        let run = tl * run_sq.max(0.0).sqrt();
        let rise = tl * t.sin();
        let spread = tl * p.sin();

        let a_fv = Point2::new(ORIGIN_X, h_a);
        let a_tv = Point2::new(ORIGIN_X, -d_a);

        Ok(Self {
            tl,
            theta,
            phi,
            a_fv,
            a_tv,
            b1_fv: Point2::new(ORIGIN_X + tl * t.cos(), h_a + rise),
            b1_tv: Point2::new(ORIGIN_X + tl * t.cos(), -d_a),
            b2_tv: Point2::new(ORIGIN_X + tl * p.cos(), -d_a - spread),
            b2_fv: Point2::new(ORIGIN_X + tl * p.cos(), h_a),
            b_fv: Point2::new(ORIGIN_X + run, h_a + rise),
            b_tv: Point2::new(ORIGIN_X + run, -d_a - spread),
            alpha: rise.atan2(run).to_degrees(),
            beta: spread.atan2(run).to_degrees(),
        })
    }

    fn reach(&self) -> f64 {
        ORIGIN_X + self.tl + XY_MARGIN
    }
}

fn require(c: &ConstraintMap, kind: DatumKind) -> Result<f64, ConstructionError> {
    c.get(kind).ok_or(ConstructionError::MissingConstraint(kind.field()))
}

fn horizontal(y: f64, from_x: f64, to_x: f64) -> DrawPrimitive {
    DrawPrimitive::line(Point2::new(from_x, y), Point2::new(to_x, y), LineStyle::Construction)
}

impl ConstructionRenderer for CanonicalObliqueRenderer {
    fn proc_id(&self) -> &str {
        "PROC-01"
    }

    fn total_steps(&self) -> u32 {
        STEPS
    }

    fn render_step(&self, step: u32, constraints: &ConstraintMap) -> Result<ConstructionStep, ConstructionError> {
        if !(1..=STEPS).contains(&step) {
            return Err(ConstructionError::StepOutOfRange { step, total: STEPS });
        }
        let l = Layout::solve(constraints)?;
        let reach = l.reach();

        let (instruction, primitives) = match step {
            1 => (
                "Draw the reference line XY.".to_string(),
                vec![DrawPrimitive::line(
                    Point2::new(0.0, 0.0),
                    Point2::new(reach, 0.0),
                    LineStyle::Reference,
                )],
            ),
            2 => (
                format!(
                    "On a common projector mark a' {} mm above XY and a {} mm below XY.",
                    l.a_fv.y, -l.a_tv.y
                ),
                vec![
                    DrawPrimitive::line(l.a_fv, l.a_tv, LineStyle::Projector),
                    DrawPrimitive::point("a'", l.a_fv),
                    DrawPrimitive::point("a", l.a_tv),
                ],
            ),
            3 => (
                format!(
                    "From a' draw a'b1' = {} mm (TL) at {}° to XY; the line is parallel to VP.",
                    l.tl, l.theta
                ),
                vec![
                    DrawPrimitive::line(l.a_fv, l.b1_fv, LineStyle::Construction),
                    DrawPrimitive::point("b1'", l.b1_fv),
                    DrawPrimitive::AngleAnnotation {
                        vertex: l.a_fv,
                        from_deg: 0.0,
                        to_deg: l.theta,
                        label: "θ".into(),
                    },
                ],
            ),
            4 => (
                "Project b1' down to b1 on the horizontal through a; ab1 is the top view length."
                    .to_string(),
                vec![
                    DrawPrimitive::line(l.b1_fv, l.b1_tv, LineStyle::Projector),
                    DrawPrimitive::line(l.a_tv, l.b1_tv, LineStyle::Construction),
                    DrawPrimitive::point("b1", l.b1_tv),
                    DrawPrimitive::dimension(l.a_tv, l.b1_tv),
                ],
            ),
            5 => (
                format!(
                    "From a draw ab2 = {} mm (TL) at {}° to XY; the line is parallel to HP.",
                    l.tl, l.phi
                ),
                vec![
                    DrawPrimitive::line(l.a_tv, l.b2_tv, LineStyle::Construction),
                    DrawPrimitive::point("b2", l.b2_tv),
                    DrawPrimitive::AngleAnnotation {
                        vertex: l.a_tv,
                        from_deg: -l.phi,
                        to_deg: 0.0,
                        label: "φ".into(),
                    },
                ],
            ),
            6 => (
                "Project b2 up to b2' on the horizontal through a'; a'b2' is the front view length."
                    .to_string(),
                vec![
                    DrawPrimitive::line(l.b2_tv, l.b2_fv, LineStyle::Projector),
                    DrawPrimitive::line(l.a_fv, l.b2_fv, LineStyle::Construction),
                    DrawPrimitive::point("b2'", l.b2_fv),
                    DrawPrimitive::dimension(l.a_fv, l.b2_fv),
                ],
            ),
            7 => (
                "Draw the locus of b' through b1' parallel to XY.".to_string(),
                vec![horizontal(l.b1_fv.y, 0.0, reach)],
            ),
            8 => (
                "Draw the locus of b through b2 parallel to XY.".to_string(),
                vec![horizontal(l.b2_tv.y, 0.0, reach)],
            ),
            9 => (
                "With centre a' and radius a'b2' cut the b' locus; with centre a and radius ab1 cut the b locus."
                    .to_string(),
                vec![
                    DrawPrimitive::Arc {
                        center: l.a_fv,
                        radius: l.a_fv.distance(&l.b2_fv),
                        start_deg: 0.0,
                        end_deg: l.alpha,
                    },
                    DrawPrimitive::Arc {
                        center: l.a_tv,
                        radius: l.a_tv.distance(&l.b1_tv),
                        start_deg: -l.beta,
                        end_deg: 0.0,
                    },
                    DrawPrimitive::point("b'", l.b_fv),
                    DrawPrimitive::point("b", l.b_tv),
                ],
            ),
            _ => (
                format!(
                    "Join a'b' and ab. b' and b share a projector; apparent angles α = {:.1}° and β = {:.1}°.",
                    l.alpha, l.beta
                ),
                vec![
                    DrawPrimitive::line(l.a_fv, l.b_fv, LineStyle::Object),
                    DrawPrimitive::line(l.a_tv, l.b_tv, LineStyle::Object),
                    DrawPrimitive::line(l.b_fv, l.b_tv, LineStyle::Projector),
                    DrawPrimitive::AngleAnnotation {
                        vertex: l.a_fv,
                        from_deg: 0.0,
                        to_deg: l.alpha,
                        label: "α".into(),
                    },
                    DrawPrimitive::AngleAnnotation {
                        vertex: l.a_tv,
                        from_deg: -l.beta,
                        to_deg: 0.0,
                        label: "β".into(),
                    },
                ],
            ),
        };

        Ok(ConstructionStep {
            index: step,
            instruction,
            primitives,
        })
    }
}
