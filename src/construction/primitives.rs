use serde::Serialize;

/// Drawing-plane coordinates in millimetres. `x` runs along the XY
/// reference line; front-view points sit above it (`y > 0`) and top-view
/// points below (`y < 0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    /// Final views.
    Object,
    /// Construction and locus lines.
    Construction,
    /// Projectors between views.
    Projector,
    /// The XY reference line.
    Reference,
}

/// One drawable element of a construction step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawPrimitive {
    Point {
        label: String,
        at: Point2,
    },
    Line {
        from: Point2,
        to: Point2,
        style: LineStyle,
    },
    Arc {
        center: Point2,
        radius: f64,
        start_deg: f64,
        end_deg: f64,
    },
    AngleAnnotation {
        vertex: Point2,
        from_deg: f64,
        to_deg: f64,
        label: String,
    },
    Dimension {
        from: Point2,
        to: Point2,
        text: String,
    },
}

impl DrawPrimitive {
    pub fn point(label: impl Into<String>, at: Point2) -> Self {
        DrawPrimitive::Point { label: label.into(), at }
    }

    pub fn line(from: Point2, to: Point2, style: LineStyle) -> Self {
        DrawPrimitive::Line { from, to, style }
    }

    pub fn dimension(from: Point2, to: Point2) -> Self {
        DrawPrimitive::Dimension {
            from,
            to,
            text: format!("{:.1}", from.distance(&to)),
        }
    }
}

/// One numbered step: what to do and what it draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstructionStep {
    /// 1-based.
    pub index: u32,
    pub instruction: String,
    pub primitives: Vec<DrawPrimitive>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_text_is_rounded_length() {
        let d = DrawPrimitive::dimension(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert!(matches!(d, DrawPrimitive::Dimension { ref text, .. } if text == "5.0"));
    }

    #[test]
    fn primitives_serialize_with_kind_tag() {
        let p = DrawPrimitive::line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), LineStyle::Reference);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["kind"], "line");
        assert_eq!(json["style"], "reference");

        let a = DrawPrimitive::AngleAnnotation {
            vertex: Point2::new(0.0, 0.0),
            from_deg: 0.0,
            to_deg: 30.0,
            label: "θ".into(),
        };
        assert_eq!(serde_json::to_value(&a).unwrap()["kind"], "angle_annotation");
    }
}
