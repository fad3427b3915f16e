//! Degree, length-unit and implied-unit rewriting.
//!
//! All functions expect lowercased text except `infer_units`, which runs
//! after plane names have been restored to upper case.

use std::sync::LazyLock;

use regex::{Captures, Regex};

// ── Degrees ──

static DEGREE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(\d+(?:\.\d+)?)\s*degrees?\b",
        r"(\d+(?:\.\d+)?)\s*deg\b",
        r"(\d+(?:\.\d+)?)\s*°",
        r"(\d+(?:\.\d+)?)\s*º",
        r"(\d+(?:\.\d+)?)\s*˚",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static REPEATED_DEGREE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"°+").unwrap());

/// Rewrite every degree spelling to `N°`. Returns the text and the number of
/// patterns that changed it.
pub fn unify_degrees(text: &str) -> (String, u64) {
    let mut t = text.to_string();
    let mut fixes = 0;
    for pattern in DEGREE_PATTERNS.iter() {
        let next = pattern.replace_all(&t, "${1}°").into_owned();
        if next != t {
            fixes += 1;
            t = next;
        }
    }
    let t = REPEATED_DEGREE.replace_all(&t, "°").into_owned();
    (t, fixes)
}

// ── Lengths ──

static CENTIMETRES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*cm\b").unwrap());
static METRES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*m\b").unwrap());
static SPACED_MM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s+mm\b").unwrap());

/// Convert cm and m to mm and close the gap in "75 mm". Returns the text and
/// the number of quantities converted.
pub fn standardize_units(text: &str) -> (String, u64) {
    let mut count = 0;
    let t = scale_matches(&CENTIMETRES, text, 10.0, &mut count);
    let t = scale_matches(&METRES, &t, 1000.0, &mut count);
    let t = SPACED_MM.replace_all(&t, "${1}mm").into_owned();
    (t, count)
}

fn scale_matches(pattern: &Regex, text: &str, factor: f64, count: &mut u64) -> String {
    pattern
        .replace_all(text, |caps: &Captures| match caps[1].parse::<f64>() {
            Ok(n) => {
                *count += 1;
                format!("{}mm", format_number(n * factor))
            }
            Err(_) => caps[0].to_string(),
        })
        .into_owned()
}

/// Shortest decimal form, at most four fractional digits.
pub fn format_number(n: f64) -> String {
    let s = format!("{n:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

// ── Implied degrees ──

static INCLINED_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(inclined?\s+(?:at\s+)?)(\d+(?:\.\d+)?)\s+(to\s+HP|to\s+VP|with\s+HP|with\s+VP|to\s+the\s+HP|to\s+the\s+VP|to\s+horizontal|to\s+vertical|makes|inclined)",
    )
    .unwrap()
});

static MAKES_BARE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(makes?\s+(?:an?\s+angle\s+of\s+)?)(\d+(?:\.\d+)?)\s+(with|to)\s+(HP|VP)").unwrap()
});

/// Add the missing `°` to bare numbers in angle phrasing such as
/// "inclined 30 to HP". Returns the text and whether anything changed.
pub fn infer_units(text: &str) -> (String, bool) {
    let t = INCLINED_BARE.replace_all(text, "${1}${2}° ${3}");
    let t = MAKES_BARE.replace_all(&t, "${1}${2}° ${3} ${4}").into_owned();
    let changed = t != text;
    (t, changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_words_become_symbol() {
        let (text, fixes) = unify_degrees("inclined at 30 degrees to hp and 45 deg to vp");
        assert_eq!(text, "inclined at 30° to hp and 45° to vp");
        assert_eq!(fixes, 2);
    }

    #[test]
    fn degree_variants_unified() {
        let (text, _) = unify_degrees("30º and 45˚ and 60 °");
        assert_eq!(text, "30° and 45° and 60°");
    }

    #[test]
    fn canonical_degrees_not_counted() {
        let (text, fixes) = unify_degrees("at 30° to hp");
        assert_eq!(text, "at 30° to hp");
        assert_eq!(fixes, 0);
    }

    #[test]
    fn degree_word_inside_longer_word_untouched() {
        let (text, _) = unify_degrees("30 degreesx");
        assert_eq!(text, "30 degreesx");
    }

    #[test]
    fn repeated_degree_collapsed() {
        let (text, _) = unify_degrees("30°° to hp");
        assert_eq!(text, "30° to hp");
    }

    #[test]
    fn centimetres_to_millimetres() {
        let (text, count) = standardize_units("a line 7.5 cm long");
        assert_eq!(text, "a line 75mm long");
        assert_eq!(count, 1);
    }

    #[test]
    fn metres_to_millimetres_without_touching_mm() {
        let (text, count) = standardize_units("0.1 m long, 20 mm above hp");
        assert_eq!(text, "100mm long, 20mm above hp");
        assert_eq!(count, 1);
    }

    #[test]
    fn spaced_mm_is_closed_but_not_counted() {
        let (text, count) = standardize_units("75 mm long");
        assert_eq!(text, "75mm long");
        assert_eq!(count, 0);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(75.0), "75");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(0.1 * 3.0), "0.3");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn bare_inclination_gets_degree() {
        let (text, changed) = infer_units("line inclined 30 to HP");
        assert_eq!(text, "line inclined 30° to HP");
        assert!(changed);
    }

    #[test]
    fn bare_makes_gets_degree() {
        let (text, changed) = infer_units("the line makes 45 with VP");
        assert_eq!(text, "the line makes 45° with VP");
        assert!(changed);
    }

    #[test]
    fn explicit_degrees_left_alone() {
        let (text, changed) = infer_units("inclined at 30° to HP");
        assert_eq!(text, "inclined at 30° to HP");
        assert!(!changed);
    }
}
