use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use regex::{Captures, NoExpand, Regex};

use crate::pipeline::catalogue::Lexicon;

use super::types::{NormalizationChange, NormalizeResult, NormalizerStats};
use super::{typo, units, NormalizeError};

// ═══════════════════════════════════════════
// Character repair patterns
// ═══════════════════════════════════════════

/// Literal mojibake repairs, applied in order. Longer sequences precede
/// their own prefixes.
const LITERAL_REPAIRS: &[(&str, &str)] = &[
    ("Ã‚Â°", "°"),
    ("Â°", "°"),
    ("â€˜", "'"),
    ("â€™", "'"),
    ("Î¸", "θ"),
    ("Ï†", "φ"),
    ("Î±", "α"),
    ("Î²", "β"),
    ("Î”", "Δ"),
    ("Î\"", "Δ"),
    ("â€”", "-"),
    ("â€“", "-"),
    ("â€\"", "-"),
    ("â€œ", "\""),
    ("â€", "\""),
    ("\u{2018}", "'"),
    ("\u{2019}", "'"),
    ("\u{201C}", "\""),
    ("\u{201D}", "\""),
];

static HTML_DEGREE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&deg;|&#176;|&#xb0;").unwrap());
static BROKEN_DEGREE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)\s*(?:Ëš|Âº)").unwrap());
static PIPE_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|ine\b").unwrap());
static LETTER_O_DIGIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d)[oO](\d)").unwrap());
static HP_DOT_VP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bHP\s*[.,]\s*VP\b").unwrap());

// ── Plane names ──

/// H.P., V.P. and P.P., with or without the final dot.
static DOTTED_PLANE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b([hvp])\.p\b(\.)?").unwrap());
static XY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bxy(?:[-\s]?(?:line|axis|plane))?\b").unwrap());

// ── Cleanup ──

static PREPOSITION_PLANE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(above|below|from|in|on|parallel to|perpendicular to|inclined to|with)\s+(hp|vp|pp|xy)\b",
    )
    .unwrap()
});
static IN_FRONT_OF_PLANE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bin front of\s+(hp|vp|pp)\b").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());
static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\.\s*([a-zA-Z])").unwrap());

// ═══════════════════════════════════════════
// Normalizer
// ═══════════════════════════════════════════

/// Multi-stage text cleaner for problem statements.
///
/// Stateless apart from monotonically increasing counters; safe to share
/// across threads.
pub struct Normalizer {
    lexicon: Arc<Lexicon>,
    synonyms: Vec<(Regex, String)>,
    stats: AtomicStats,
}

#[derive(Default)]
struct AtomicStats {
    normalizations: AtomicU64,
    degree_fixes: AtomicU64,
    unit_conversions: AtomicU64,
    abbreviation_expansions: AtomicU64,
    typo_corrections: AtomicU64,
    semantic_expansions: AtomicU64,
}

impl Normalizer {
    /// Compile the synonym table into word-bounded patterns.
    pub fn new(lexicon: Arc<Lexicon>) -> Result<Self, NormalizeError> {
        let mut synonyms = Vec::with_capacity(lexicon.synonyms().len());
        for (phrase, canonical) in lexicon.synonyms() {
            if phrase.is_empty() || phrase == canonical {
                continue;
            }
            synonyms.push((Regex::new(&synonym_pattern(phrase))?, canonical.clone()));
        }
        Ok(Self {
            lexicon,
            synonyms,
            stats: AtomicStats::default(),
        })
    }

    pub fn standard() -> Result<Self, NormalizeError> {
        Self::new(Arc::new(Lexicon::standard()))
    }

    /// Normalize a raw problem statement.
    ///
    /// Empty or whitespace-only input yields a rejected result with zero
    /// confidence instead of an error.
    pub fn normalize(&self, raw: &str) -> NormalizeResult {
        if raw.trim().is_empty() {
            return NormalizeResult::rejected("Invalid input: empty text");
        }

        let start = Instant::now();
        let mut changes = Vec::new();

        // 1. Encoding and OCR repair
        let (t, repaired) = repair_characters(raw);
        if repaired {
            changes.push(NormalizationChange::CharacterCorrection);
        }

        // 2. Dotted plane names, while sentence case is still visible
        let (t, collapsed) = collapse_dotted_planes(&t);
        if collapsed {
            changes.push(NormalizationChange::PlaneNormalization);
        }

        // 3. Lowercase
        let t = t.to_lowercase();

        // 4. Degrees
        let (t, degree_fixes) = units::unify_degrees(&t);
        if degree_fixes > 0 {
            changes.push(NormalizationChange::DegreeNormalization);
            self.stats.degree_fixes.fetch_add(degree_fixes, Ordering::Relaxed);
        }

        // 5. Typos
        let (t, corrections) = typo::correct_typos(&t, &self.lexicon);
        if !corrections.is_empty() {
            changes.push(NormalizationChange::TypoCorrection);
            self.stats
                .typo_corrections
                .fetch_add(corrections.len() as u64, Ordering::Relaxed);
        }

        // 6. Synonyms
        let (t, expansions) = self.expand_synonyms(t);
        if expansions > 0 {
            changes.push(NormalizationChange::SynonymExpansion);
            self.stats.abbreviation_expansions.fetch_add(expansions, Ordering::Relaxed);
            self.stats.semantic_expansions.fetch_add(1, Ordering::Relaxed);
        }

        // 7. XY line
        let (t, planes_changed) = normalize_planes(t);
        if planes_changed && !collapsed {
            changes.push(NormalizationChange::PlaneNormalization);
        }

        // 8. Length units
        let (t, conversions) = units::standardize_units(&t);
        if conversions > 0 {
            changes.push(NormalizationChange::UnitConversion);
            self.stats.unit_conversions.fetch_add(conversions, Ordering::Relaxed);
        }

        // 9. Implied degrees
        let (t, inferred) = units::infer_units(&t);
        if inferred {
            changes.push(NormalizationChange::UnitInference);
        }

        // 10. Cleanup
        let normalized = clean_text(&t);

        let confidence = self.confidence(&normalized, &corrections);
        self.stats.normalizations.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(
            changes = changes.len(),
            corrections = corrections.len(),
            confidence,
            "Text normalized"
        );

        NormalizeResult {
            original_length: raw.chars().count(),
            normalized_length: normalized.chars().count(),
            normalized,
            corrections,
            confidence,
            changes,
            elapsed_us: start.elapsed().as_micros() as u64,
            error: None,
        }
    }

    /// Like `normalize`, but rejected input is an error.
    pub fn normalize_checked(&self, raw: &str) -> Result<NormalizeResult, NormalizeError> {
        let result = self.normalize(raw);
        if result.error.is_some() {
            return Err(NormalizeError::EmptyInput);
        }
        Ok(result)
    }

    pub fn stats(&self) -> NormalizerStats {
        let s = &self.stats;
        NormalizerStats {
            normalizations: s.normalizations.load(Ordering::Relaxed),
            degree_fixes: s.degree_fixes.load(Ordering::Relaxed),
            unit_conversions: s.unit_conversions.load(Ordering::Relaxed),
            abbreviation_expansions: s.abbreviation_expansions.load(Ordering::Relaxed),
            typo_corrections: s.typo_corrections.load(Ordering::Relaxed),
            semantic_expansions: s.semantic_expansions.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        let s = &self.stats;
        for counter in [
            &s.normalizations,
            &s.degree_fixes,
            &s.unit_conversions,
            &s.abbreviation_expansions,
            &s.typo_corrections,
            &s.semantic_expansions,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Returns the text and the number of phrases that changed it.
    fn expand_synonyms(&self, text: String) -> (String, u64) {
        let mut t = text;
        let mut expansions = 0;
        for (pattern, canonical) in &self.synonyms {
            let next = pattern.replace_all(&t, NoExpand(canonical));
            if next != t {
                expansions += 1;
                t = next.into_owned();
            }
        }
        (t, expansions)
    }

    /// Starts at 1.0, loses 0.03 per fuzzy correction, gains 0.02 per key
    /// term present. Clamped to [0.3, 1.0].
    fn confidence(&self, normalized: &str, corrections: &[super::TypoCorrection]) -> f64 {
        let fuzzy = corrections
            .iter()
            .filter(|c| c.method == super::CorrectionMethod::Levenshtein)
            .count();
        let found = self
            .lexicon
            .key_terms()
            .iter()
            .filter(|term| normalized.contains(term.as_str()))
            .count();
        let score = (1.0 - 0.03 * fuzzy as f64 + 0.02 * found as f64).min(1.0);
        score.clamp(0.3, 1.0)
    }
}

impl std::fmt::Debug for Normalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Normalizer")
            .field("synonyms", &self.synonyms.len())
            .field("stats", &self.stats())
            .finish()
    }
}

/// Case-insensitive pattern for a synonym phrase. Word boundaries are only
/// required on sides where the phrase starts or ends with a word character.
fn synonym_pattern(phrase: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let leading = phrase.chars().next().is_some_and(is_word);
    let trailing = phrase.chars().last().is_some_and(is_word);
    format!(
        "(?i){}{}{}",
        if leading { r"\b" } else { "" },
        regex::escape(phrase),
        if trailing { r"\b" } else { "" },
    )
}

fn repair_characters(raw: &str) -> (String, bool) {
    let mut t = raw.to_string();
    for (broken, fixed) in LITERAL_REPAIRS {
        if t.contains(broken) {
            t = t.replace(broken, fixed);
        }
    }
    t = HTML_DEGREE.replace_all(&t, "°").into_owned();
    t = BROKEN_DEGREE.replace_all(&t, "${1}°").into_owned();
    t = PIPE_LINE.replace_all(&t, "line").into_owned();
    t = LETTER_O_DIGIT.replace_all(&t, "${1}0${2}").into_owned();
    t = HP_DOT_VP.replace_all(&t, "HP and VP").into_owned();
    let changed = t != raw;
    (t, changed)
}

/// Rewrite `H.P.` style names to `HP`. The final dot stays when it also
/// ends the sentence: at end of text, or before a capitalized word.
fn collapse_dotted_planes(text: &str) -> (String, bool) {
    let t = DOTTED_PLANE.replace_all(text, |caps: &Captures| {
        let plane = format!("{}P", caps[1].to_ascii_uppercase());
        let end = caps.get(0).map_or(text.len(), |m| m.end());
        match caps.get(2) {
            Some(_) if ends_sentence(&text[end..]) => format!("{plane}."),
            _ => plane,
        }
    });
    let changed = t != text;
    (t.into_owned(), changed)
}

fn ends_sentence(rest: &str) -> bool {
    let next = rest.trim_start();
    next.is_empty() || (next.len() < rest.len() && next.starts_with(char::is_uppercase))
}

fn normalize_planes(text: String) -> (String, bool) {
    let t = XY_NAME.replace_all(&text, "XY").into_owned();
    let changed = t != text;
    (t, changed)
}

fn clean_text(text: &str) -> String {
    let t = PREPOSITION_PLANE.replace_all(text, |caps: &Captures| {
        format!("{} {}", &caps[1], caps[2].to_uppercase())
    });
    let t = IN_FRONT_OF_PLANE.replace_all(&t, |caps: &Captures| {
        format!("in front of {}", caps[1].to_uppercase())
    });
    let t = WHITESPACE.replace_all(&t, " ");
    let t = COMMA.replace_all(&t, ", ");
    let t = SENTENCE_BREAK.replace_all(&t, ". $1");
    t.trim().to_string()
}
