//! Endpoint label detection on the original (un-normalized) text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Upper-case pairs that name planes, views, traces or units, never a line.
pub const RESERVED_PAIRS: &[&str] = &[
    "HP", "VP", "PP", "XY", "HT", "VT", "TV", "FV", "SV", "TL", "MM", "CM",
];

pub const DEFAULT_ENDPOINTS: [char; 2] = ['A', 'B'];

static LABEL_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z])([A-Z])\b").unwrap());
static NAMED_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:end|point)\s+([A-Z])\b").unwrap());
static ONE_OR_OTHER_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:one|other)\s+end\b").unwrap());
static LETTER_POSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Z])\s+is\s+\d+(?:\.\d+)?\s*mm\s+(?:above|below|in\s+front\s+of|behind)\b").unwrap()
});
static ENDPOINT_A_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:AB|AC|end\s*A|point\s*A)\b|\bA\s+is\s+\d").unwrap()
});

/// Detect up to two endpoint labels, sorted. Falls back to `['A', 'B']`.
///
/// A lone "A" without endpoint context is the article and is discarded.
pub fn detect_endpoints(text: &str) -> Vec<char> {
    let mut labels: BTreeSet<char> = BTreeSet::new();

    for caps in LABEL_PAIR.captures_iter(text) {
        if RESERVED_PAIRS.contains(&&caps[0]) {
            continue;
        }
        labels.extend(caps[1].chars().chain(caps[2].chars()));
    }

    for caps in NAMED_END.captures_iter(text) {
        labels.extend(caps[1].chars().map(|c| c.to_ascii_uppercase()));
    }

    if labels.is_empty() && ONE_OR_OTHER_END.is_match(text) {
        labels.extend(DEFAULT_ENDPOINTS);
    }

    for caps in LETTER_POSITION.captures_iter(text) {
        for candidate in caps[1].chars().map(|c| c.to_ascii_uppercase()) {
            // "A is" and "I is" are usually prose, not labels
            if !matches!(candidate, 'A' | 'I') || labels.contains(&candidate) {
                labels.insert(candidate);
            }
        }
    }

    if labels.len() == 1 && labels.contains(&'A') && !ENDPOINT_A_CONTEXT.is_match(text) {
        labels.clear();
    }

    if labels.is_empty() {
        return DEFAULT_ENDPOINTS.to_vec();
    }
    labels.into_iter().take(2).collect()
}
