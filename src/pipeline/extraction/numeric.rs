//! Pattern families for the non-positional data kinds.
//!
//! Each family is an ordered list of alternatives; the first alternative
//! that matches wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::pipeline::catalogue::DatumKind;

use super::types::{Atom, AtomSource};

const NUM: &str = r"(\d+(?:\.\d+)?)";

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(&format!("(?i){}", p.replace("{N}", NUM))).unwrap())
        .collect()
}

// ═══════════════════════════════════════════
// Paired inclinations
// ═══════════════════════════════════════════

struct PairTemplate {
    pattern: Regex,
    first: DatumKind,
    second: DatumKind,
}

static PAIRED: LazyLock<Vec<PairTemplate>> = LazyLock::new(|| {
    // "N° and M° to HP and VP respectively" goes first, or the last
    // template reads its M° as φ alone.
    let pats = compile(&[
        r"{N}°\s+and\s+{N}°\s+(?:to|with)\s+(?:the\s+)?HP\s+and\s+(?:the\s+)?VP(?:\s+respectively)?",
        r"{N}°\s+and\s+{N}°\s+(?:to|with)\s+(?:the\s+)?VP\s+and\s+(?:the\s+)?HP(?:\s+respectively)?",
        r"{N}°\s*(?:to|with)\s+HP[^.]*?{N}°\s*(?:to|with)\s+VP",
        r"{N}°\s*(?:to|with)\s+VP[^.]*?{N}°\s*(?:to|with)\s+HP",
        r"inclined?\s+(?:at\s+)?{N}°\s+(?:to\s+HP\s+)?and\s+{N}°\s+to\s+VP",
    ]);
    let order = [
        (DatumKind::InclinationHp, DatumKind::InclinationVp),
        (DatumKind::InclinationVp, DatumKind::InclinationHp),
        (DatumKind::InclinationHp, DatumKind::InclinationVp),
        (DatumKind::InclinationVp, DatumKind::InclinationHp),
        (DatumKind::InclinationHp, DatumKind::InclinationVp),
    ];
    pats.into_iter()
        .zip(order)
        .map(|(pattern, (first, second))| PairTemplate { pattern, first, second })
        .collect()
});

/// θ and φ stated together in either order. Only the first matching
/// template is used.
pub fn extract_paired_angles(text: &str) -> Vec<Atom> {
    for template in PAIRED.iter() {
        let Some(caps) = template.pattern.captures(text) else { continue };
        let (Ok(a), Ok(b)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
            continue;
        };
        return vec![
            Atom::new(template.first, a, AtomSource::Paired),
            Atom::new(template.second, b, AtomSource::Paired),
        ];
    }
    Vec::new()
}

// ═══════════════════════════════════════════
// Single patterns
// ═══════════════════════════════════════════

static TRUE_LENGTH: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"{N}\s*mm\s+long\s+(?:straight\s+)?line",
        r"line\s+(?:\w{1,4}\s+)?(?:is\s+)?{N}\s*mm\s+long",
        r"line\s+(?:\w{1,4}\s+)?{N}\s*mm\s+(?:in\s+)?(?:true\s+)?length",
        r"(?:true\s+)?length\s+(?:of\s+(?:the\s+)?line\s+(?:\w+\s+)?(?:is\s+)?)?{N}\s*mm",
        r"{N}\s*mm\s+(?:in\s+)?length",
        r"(?:it|line)\s+(?:has\s+)?(?:true\s+)?length\s+(?:of\s+)?{N}",
        r"^(?:a|an)\s+{N}\s*mm\s+(?:long\s+)?(?:straight\s+)?line",
    ])
});

static THETA: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:inclined?\s+(?:at\s+)?)?{N}°\s*(?:to|with)\s+(?:the\s+)?HP",
        r"(?:inclination|angle)\s+(?:to|with)\s+HP\s+(?:is\s+)?{N}°",
        r"HP\s+(?:at|=|:)\s*{N}°",
    ])
});

static PHI: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:inclined?\s+(?:at\s+)?)?{N}°\s*(?:to|with)\s+(?:the\s+)?VP",
        r"(?:inclination|angle)\s+(?:to|with)\s+VP\s+(?:is\s+)?{N}°",
        r"VP\s+(?:at|=|:)\s*{N}°",
    ])
});

static TOP_VIEW: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"top\s+view\s+of\s+(?:the\s+|a\s+)?(?:\d+(?:\.\d+)?\s*mm\s+long\s+)?line\s+(?:\w+\s+)?(?:measures?|is)\s+{N}\s*mm",
        r"top\s+view\s+(?:\w+\s+)?(?:measures?|is)\s+{N}\s*mm",
        r"(?:its\s+)?top\s+view\s+(?:length\s+)?(?:is|=)\s*{N}\s*mm",
        r"(?:top\s+view|plan|TV)\s+(?:measures?|is)\s*{N}\s*mm",
        r"{N}\s*mm\s+(?:long\s+)?(?:in\s+)?top\s+view",
        r"plan\s+(?:view\s+)?(?:measures?|is|=)\s*{N}\s*mm",
    ])
});

static LONG_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s+long\b").unwrap());

static FRONT_VIEW: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"front\s+view\s+(?:\w+\s+)?(?:measures?|is)\s+{N}\s*mm",
        r"(?:elevation|FV)\s+(?:measures?|is|=)\s*{N}\s*mm",
        r"{N}\s*mm\s+(?:in\s+)?front\s+view",
    ])
});

static ALPHA: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:top\s+view|plan|TV)\s+(?:(?:makes?|is)\s+)?(?:an?\s+angle\s+of\s+)?(?:inclined\s+(?:at\s+)?)?{N}°\s*(?:with|to)\s+(?:the\s+)?XY",
        r"(?:apparent\s+)?angle\s+(?:of\s+)?(?:top\s+view|plan)\s+(?:is\s+)?{N}°",
    ])
});

static BETA: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?:front\s+view|elevation|FV)\s+(?:(?:makes?|is)\s+)?(?:an?\s+angle\s+of\s+)?(?:inclined\s+(?:at\s+)?)?{N}°\s*(?:with|to)\s+(?:the\s+)?XY",
        r"(?:apparent\s+)?angle\s+(?:of\s+)?(?:front\s+view|elevation)\s+(?:is\s+)?{N}°",
    ])
});

static PROJECTOR_DISTANCE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"projectors?\s+(?:are\s+)?{N}\s*mm\s+apart",
        r"{N}\s*mm\s+(?:between|apart).{0,25}projectors?",
        r"end\s+projectors?\s+(?:are\s+)?{N}\s*mm",
        r"distance\s+between\s+(?:end\s+)?projectors?\s+(?:is\s+)?{N}\s*mm",
    ])
});

static MIDPOINT_HEIGHT: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[r"mid(?:dle|[-\s]?point)?\s+(?:is\s+)?{N}\s*mm\s+above\s+(?:the\s+)?HP"])
});
static MIDPOINT_DEPTH: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[r"mid(?:dle|[-\s]?point)?\s+(?:is\s+)?{N}\s*mm\s+(?:in\s+front\s+of|from)\s+(?:the\s+)?VP"])
});
static VERTICAL_TRACE: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"VT\s+(?:is\s+)?{N}\s*mm\s+above\s+(?:the\s+)?HP"]));
static HORIZONTAL_TRACE: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[r"HT\s+(?:is\s+)?{N}\s*mm\s+(?:in\s+front\s+of|from)\s+(?:the\s+)?VP"])
});
static SIDE_VIEW: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"side\s+view\s+(?:is|measures?)\s+{N}\s*mm"]));
static GAMMA: LazyLock<Vec<Regex>> =
    LazyLock::new(|| compile(&[r"{N}°\s*(?:to|with)\s+(?:the\s+)?(?:profile\s+plane|PP)"]));

fn first_value(patterns: &[Regex], text: &str) -> Option<f64> {
    patterns
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| c[1].parse().ok()))
}

/// TL, then θ and φ unless the paired pass already supplied them.
pub fn extract_primary(text: &str, paired: &[Atom]) -> Vec<Atom> {
    let mut atoms = Vec::new();
    if let Some(tl) = first_value(&TRUE_LENGTH, text) {
        atoms.push(Atom::new(DatumKind::TrueLength, tl, AtomSource::Pattern));
    }
    for (kind, patterns) in [(DatumKind::InclinationHp, &*THETA), (DatumKind::InclinationVp, &*PHI)] {
        if paired.iter().any(|a| a.data_type == kind) {
            continue;
        }
        if let Some(v) = first_value(patterns, text) {
            atoms.push(Atom::new(kind, v, AtomSource::Pattern));
        }
    }
    atoms
}

/// View lengths, apparent angles, projector distance, midpoint, traces,
/// side view and γ. `true_length` is the TL already found, if any.
pub fn extract_secondary(text: &str, true_length: Option<f64>, midpoint: bool) -> Vec<Atom> {
    let mut atoms = Vec::new();

    if let Some(v) = top_view_length(text, true_length) {
        atoms.push(Atom::new(DatumKind::TopViewLength, v, AtomSource::Pattern));
    }

    let mut families: Vec<(DatumKind, &[Regex])> = vec![
        (DatumKind::FrontViewLength, &FRONT_VIEW[..]),
        (DatumKind::TopViewAngle, &ALPHA[..]),
        (DatumKind::FrontViewAngle, &BETA[..]),
        (DatumKind::ProjectorDistance, &PROJECTOR_DISTANCE[..]),
    ];
    if midpoint {
        families.push((DatumKind::MidpointHeight, &MIDPOINT_HEIGHT[..]));
        families.push((DatumKind::MidpointDepth, &MIDPOINT_DEPTH[..]));
    }
    families.extend([
        (DatumKind::VerticalTraceHeight, &VERTICAL_TRACE[..]),
        (DatumKind::HorizontalTraceDepth, &HORIZONTAL_TRACE[..]),
        (DatumKind::SideViewLength, &SIDE_VIEW[..]),
        (DatumKind::InclinationPp, &GAMMA[..]),
    ]);

    for (kind, patterns) in families {
        if let Some(v) = first_value(patterns, text) {
            atoms.push(Atom::new(kind, v, AtomSource::Pattern));
        }
    }
    atoms
}

/// Leading top-view forms where "N mm long" names the line, not the view.
const LONG_GUARDED_FORMS: usize = 2;

/// "top view measures 65mm" style lengths. A value equal to TL is taken as
/// the line's own length and the next alternative is tried.
fn top_view_length(text: &str, true_length: Option<f64>) -> Option<f64> {
    for (i, re) in TOP_VIEW.iter().enumerate() {
        for caps in re.captures_iter(text) {
            let (Some(whole), Ok(value)) = (caps.get(0), caps[1].parse::<f64>()) else {
                continue;
            };
            if i < LONG_GUARDED_FORMS && LONG_SUFFIX.is_match(&text[whole.end()..]) {
                continue;
            }
            if true_length == Some(value) {
                break;
            }
            return Some(value);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(atoms: &[Atom], kind: DatumKind) -> Option<f64> {
        atoms.iter().find(|a| a.data_type == kind).map(|a| a.value)
    }

    #[test]
    fn paired_hp_then_vp() {
        let atoms = extract_paired_angles("inclined at 30° to HP and 45° to VP");
        assert_eq!(value(&atoms, DatumKind::InclinationHp), Some(30.0));
        assert_eq!(value(&atoms, DatumKind::InclinationVp), Some(45.0));
        assert!(atoms.iter().all(|a| a.source == AtomSource::Paired));
    }

    #[test]
    fn paired_vp_then_hp() {
        let atoms = extract_paired_angles("inclined at 40° to VP and 25° to HP");
        assert_eq!(value(&atoms, DatumKind::InclinationVp), Some(40.0));
        assert_eq!(value(&atoms, DatumKind::InclinationHp), Some(25.0));
    }

    #[test]
    fn paired_respectively_form() {
        let atoms = extract_paired_angles("line ab is inclined at 30° and 45° to HP and VP respectively");
        assert_eq!(value(&atoms, DatumKind::InclinationHp), Some(30.0));
        assert_eq!(
            value(&atoms, DatumKind::InclinationVp),
            Some(45.0),
            "Expected φ from the second angle, got {atoms:?}"
        );

        let atoms = extract_paired_angles("inclined at 40° and 20° to VP and HP");
        assert_eq!(value(&atoms, DatumKind::InclinationVp), Some(40.0));
        assert_eq!(value(&atoms, DatumKind::InclinationHp), Some(20.0));
    }

    #[test]
    fn paired_does_not_cross_sentences() {
        let atoms = extract_paired_angles("30° to HP. the top view is 40° to VP");
        assert!(atoms.is_empty());
    }

    #[test]
    fn true_length_forms() {
        let cases = [
            ("a 75mm long line ab", 75.0),
            ("line ab 80mm long", 80.0),
            ("line ab 90mm in true length", 90.0),
            ("the true length of the line is 65mm", 65.0),
            ("it has length of 70mm", 70.0),
            ("it has true length of 55", 55.0),
        ];
        for (text, expected) in cases {
            let atoms = extract_primary(text, &[]);
            assert_eq!(value(&atoms, DatumKind::TrueLength), Some(expected), "For {text:?}");
        }
    }

    #[test]
    fn single_angles_skipped_when_paired() {
        let text = "inclined at 30° to HP and 45° to VP";
        let paired = extract_paired_angles(text);
        let atoms = extract_primary(text, &paired);
        assert!(value(&atoms, DatumKind::InclinationHp).is_none());
        let atoms = extract_primary("the line is inclined at 35° to HP", &[]);
        assert_eq!(value(&atoms, DatumKind::InclinationHp), Some(35.0));
        assert!(value(&atoms, DatumKind::InclinationVp).is_none());
    }

    #[test]
    fn top_view_of_long_line_measures() {
        let text = "the top view of the 75mm long line ab measures 65mm";
        let primary = extract_primary(text, &[]);
        assert_eq!(value(&primary, DatumKind::TrueLength), Some(75.0));
        let atoms = extract_secondary(text, Some(75.0), false);
        assert_eq!(value(&atoms, DatumKind::TopViewLength), Some(65.0));
    }

    #[test]
    fn top_view_equal_to_true_length_rejected() {
        let atoms = extract_secondary("top view measures 75mm", Some(75.0), false);
        assert!(value(&atoms, DatumKind::TopViewLength).is_none());
    }

    #[test]
    fn view_lengths_and_apparent_angles() {
        let text = "its top view measures 60mm and front view measures 55mm. \
                    the top view makes 35° with XY and front view is inclined at 50° to XY";
        let atoms = extract_secondary(text, None, false);
        assert_eq!(value(&atoms, DatumKind::TopViewLength), Some(60.0));
        assert_eq!(value(&atoms, DatumKind::FrontViewLength), Some(55.0));
        assert_eq!(value(&atoms, DatumKind::TopViewAngle), Some(35.0));
        assert_eq!(value(&atoms, DatumKind::FrontViewAngle), Some(50.0));
    }

    #[test]
    fn projector_distance_forms() {
        for text in [
            "end projectors are 50mm apart",
            "the distance between end projectors is 50mm",
            "50mm apart measured between the projectors",
        ] {
            let atoms = extract_secondary(text, None, false);
            assert_eq!(value(&atoms, DatumKind::ProjectorDistance), Some(50.0), "For {text:?}");
        }
    }

    #[test]
    fn midpoint_only_with_flag() {
        let text = "its midpoint is 30mm above HP and midpoint is 25mm in front of VP";
        let without = extract_secondary(text, None, false);
        assert!(value(&without, DatumKind::MidpointHeight).is_none());
        let with = extract_secondary(text, None, true);
        assert_eq!(value(&with, DatumKind::MidpointHeight), Some(30.0));
        assert_eq!(value(&with, DatumKind::MidpointDepth), Some(25.0));
    }

    #[test]
    fn traces_side_view_and_gamma() {
        let text = "its VT is 15mm above HP and HT is 20mm in front of VP. \
                    side view measures 45mm and it is inclined at 30° to PP";
        let atoms = extract_secondary(text, None, false);
        assert_eq!(value(&atoms, DatumKind::VerticalTraceHeight), Some(15.0));
        assert_eq!(value(&atoms, DatumKind::HorizontalTraceDepth), Some(20.0));
        assert_eq!(value(&atoms, DatumKind::SideViewLength), Some(45.0));
        assert_eq!(value(&atoms, DatumKind::InclinationPp), Some(30.0));
    }
}
