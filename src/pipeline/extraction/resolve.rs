//! Endpoint attribution, deduplication and domain filtering.

use std::sync::LazyLock;

use regex::Regex;

use super::types::Atom;
use super::ExtractionError;

static MIDPOINT_CUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bmid(?:dle|[-\s]?point)|\bcent(?:re|er)\s+of\s+(?:the\s+)?line").unwrap()
});

static TRACE_CUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\b(?:VT|HT)\b").unwrap());

/// Who a measurement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Endpoint(char),
    Midpoint,
    /// "its VT is 25mm above HP": trace data, not an endpoint position.
    Trace,
}

/// Compiled cues for one endpoint pair.
#[derive(Debug)]
pub struct EndpointContext {
    pub first: char,
    pub second: char,
    first_cue: Regex,
    second_cue: Regex,
    first_is: Regex,
    second_is: Regex,
    /// Whole-word patterns for the detected labels, in detection order.
    words: Vec<(char, Regex)>,
}

impl EndpointContext {
    pub fn new(endpoints: &[char]) -> Result<Self, ExtractionError> {
        let first = endpoints.first().copied().unwrap_or('A');
        let second = endpoints.get(1).copied().unwrap_or('B');
        let words = endpoints
            .iter()
            .map(|&ep| Ok((ep, Regex::new(&format!(r"(?i)\b{}\b", label(ep)))?)))
            .collect::<Result<Vec<_>, regex::Error>>()?;

        Ok(Self {
            first,
            second,
            first_cue: Regex::new(&format!(
                r"(?i)\b(?:one\s+end|first\s+end|lower\s+end|end\s+{a}|point\s+{a})\b",
                a = label(first)
            ))?,
            second_cue: Regex::new(&format!(
                r"(?i)\b(?:other\s+end|second\s+end|higher\s+end|end\s+{b}|point\s+{b})\b",
                b = label(second)
            ))?,
            first_is: Regex::new(&format!(r"(?i)\b{}\s+is\b", label(first)))?,
            second_is: Regex::new(&format!(r"(?i)\b{}\s+is\b", label(second)))?,
            words,
        })
    }

    /// Attribute a measurement from the text before and after it.
    ///
    /// The current clause is searched first, then the sentence, then the
    /// whole lookback. Within each window the latest keyword or trace cue
    /// wins, then "X is", then the latest bare label. Keyword cues in the
    /// lookahead come next; the first endpoint is the default.
    pub fn resolve(&self, lookback: &str, lookahead: &str) -> Owner {
        let sentence = sentence_tail(lookback);
        let clause = clause_tail(sentence);
        for window in [clause, sentence, lookback] {
            if let Some(owner) = self.owner_in(window) {
                return owner;
            }
        }
        match self.latest_cue(lookahead) {
            Some((_, owner)) => owner,
            None => Owner::Endpoint(self.first),
        }
    }

    fn owner_in(&self, window: &str) -> Option<Owner> {
        if window.trim().is_empty() {
            return None;
        }
        let cue = self.latest_cue(window);
        if let Some(trace) = last_end(&TRACE_CUE, window) {
            if cue.is_none_or(|(pos, _)| trace > pos) {
                return Some(Owner::Trace);
            }
        }
        if let Some((_, owner)) = cue {
            return Some(owner);
        }
        let first = last_end(&self.first_is, window);
        let second = last_end(&self.second_is, window);
        if let Some(ep) = later(first, self.first, second, self.second) {
            return Some(Owner::Endpoint(ep));
        }
        // Bare letters; "a" and "i" are far more often words than labels
        self.words
            .iter()
            .filter(|(ep, _)| !matches!(ep, 'A' | 'I'))
            .filter_map(|(ep, re)| last_end(re, window).map(|pos| (pos, *ep)))
            .max_by_key(|(pos, _)| *pos)
            .map(|(_, ep)| Owner::Endpoint(ep))
    }

    /// Latest endpoint or midpoint keyword, with the offset it ends at.
    fn latest_cue(&self, window: &str) -> Option<(usize, Owner)> {
        let first = last_end(&self.first_cue, window);
        let second = last_end(&self.second_cue, window);
        let mid = last_end(&MIDPOINT_CUE, window);
        let endpoint = match (first, second) {
            (Some(a), Some(b)) if b > a => Some((b, self.second)),
            (Some(a), _) => Some((a, self.first)),
            (None, Some(b)) => Some((b, self.second)),
            (None, None) => None,
        };
        match (endpoint, mid) {
            (Some((pos, _)), Some(m)) if m > pos => Some((m, Owner::Midpoint)),
            (Some((pos, ep)), _) => Some((pos, Owner::Endpoint(ep))),
            (None, Some(m)) => Some((m, Owner::Midpoint)),
            (None, None) => None,
        }
    }

    /// Last-detected label mentioned as a whole word in `window`.
    pub fn find_endpoint(&self, window: &str) -> Option<char> {
        self.words
            .iter()
            .rev()
            .find(|(_, re)| re.is_match(window))
            .map(|(ep, _)| *ep)
    }
}

fn label(ep: char) -> String {
    regex::escape(&ep.to_string())
}

fn last_end(re: &Regex, text: &str) -> Option<usize> {
    re.find_iter(text).last().map(|m| m.end())
}

fn later(a: Option<usize>, a_ep: char, b: Option<usize>, b_ep: char) -> Option<char> {
    match (a, b) {
        (Some(x), Some(y)) => Some(if y > x { b_ep } else { a_ep }),
        (Some(_), None) => Some(a_ep),
        (None, Some(_)) => Some(b_ep),
        (None, None) => None,
    }
}

// ── Text windows ──

/// Up to `len` bytes of `text` ending at `pos`, widened to a char boundary.
pub fn window_before(text: &str, pos: usize, len: usize) -> &str {
    let mut start = pos.saturating_sub(len);
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..pos]
}

/// Up to `len` bytes of `text` starting at `pos`, narrowed to a char boundary.
pub fn window_after(text: &str, pos: usize, len: usize) -> &str {
    let mut end = (pos + len).min(text.len());
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[pos..end]
}

/// Text after the last full stop that ends a sentence. Decimal points
/// are not sentence breaks.
fn sentence_tail(text: &str) -> &str {
    let bytes = text.as_bytes();
    let mut cut = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'.' && bytes.get(i + 1).is_none_or(|n| n.is_ascii_whitespace()) {
            cut = i + 1;
        }
    }
    &text[cut..]
}

fn clause_tail(sentence: &str) -> &str {
    let cut = [",", ";", ":", " and ", " while ", " whereas "]
        .iter()
        .filter_map(|sep| sentence.rfind(sep).map(|i| i + sep.len()))
        .max()
        .unwrap_or(0);
    &sentence[cut..]
}

// ── Post-processing passes ──

/// Keep one atom per `(field, endpoint)`, preferring higher-priority
/// sources. First-seen order is preserved; a winner takes the loser's place.
pub fn deduplicate(atoms: Vec<Atom>) -> Vec<Atom> {
    let mut kept: Vec<Atom> = Vec::with_capacity(atoms.len());
    for atom in atoms {
        match kept
            .iter_mut()
            .find(|k| k.field == atom.field && k.endpoint == atom.endpoint)
        {
            Some(existing) => {
                if atom.source.priority() > existing.source.priority() {
                    *existing = atom;
                }
            }
            None => kept.push(atom),
        }
    }
    kept
}

/// Give endpoint-position atoms without a label the label their field implies.
pub fn backfill_endpoints(atoms: &mut [Atom], first: char, second: char) {
    for atom in atoms.iter_mut().filter(|a| a.endpoint.is_none()) {
        match atom.field {
            "h_A" | "d_A" => atom.endpoint = Some(first),
            "h_B" | "d_B" => atom.endpoint = Some(second),
            _ => {}
        }
    }
}

/// Drop atoms outside their datum's domain. Returns the survivors and one
/// diagnostic per dropped atom.
pub fn validate_domain(atoms: Vec<Atom>) -> (Vec<Atom>, Vec<String>) {
    let mut diagnostics = Vec::new();
    let kept = atoms
        .into_iter()
        .filter(|atom| {
            let domain = atom.data_type.descriptor().domain;
            if atom.value.is_finite() && domain.contains(atom.value) {
                return true;
            }
            tracing::warn!(
                field = %atom.field,
                value = atom.value,
                min = domain.min,
                max = domain.max,
                "Atom outside domain, dropped"
            );
            diagnostics.push(format!(
                "{} = {} outside [{}, {}]",
                atom.field, atom.value, domain.min, domain.max
            ));
            false
        })
        .collect();
    (kept, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::catalogue::DatumKind;
    use crate::pipeline::extraction::AtomSource;

    fn ctx() -> EndpointContext {
        EndpointContext::new(&['A', 'B']).unwrap()
    }

    #[test]
    fn clause_keyword_wins_over_earlier_mentions() {
        let c = ctx();
        let owner = c.resolve("end a is 20mm above HP. end b is ", "");
        assert_eq!(owner, Owner::Endpoint('B'));
    }

    #[test]
    fn falls_back_to_sentence_when_clause_is_empty() {
        let c = ctx();
        let owner = c.resolve("end b is 50mm above HP and ", "");
        assert_eq!(owner, Owner::Endpoint('B'));
    }

    #[test]
    fn earlier_sentence_used_when_current_has_no_cue() {
        let c = ctx();
        let owner = c.resolve("the other end is 60mm above HP. it is ", "");
        assert_eq!(owner, Owner::Endpoint('B'));
    }

    #[test]
    fn x_is_cue() {
        let c = EndpointContext::new(&['P', 'Q']).unwrap();
        assert_eq!(c.resolve("line pq, q is ", ""), Owner::Endpoint('Q'));
    }

    #[test]
    fn bare_label_mention() {
        let c = EndpointContext::new(&['P', 'Q']).unwrap();
        assert_eq!(c.resolve("for q the point lies ", ""), Owner::Endpoint('Q'));
    }

    #[test]
    fn midpoint_takes_ownership() {
        let c = ctx();
        assert_eq!(c.resolve("line ab 80mm long. its midpoint is ", ""), Owner::Midpoint);
    }

    #[test]
    fn trace_takes_ownership() {
        let c = ctx();
        assert_eq!(c.resolve("45° to VP. its VT is ", ""), Owner::Trace);
        assert_eq!(c.resolve("its VT is 25mm above HP and its HT is ", ""), Owner::Trace);
    }

    #[test]
    fn endpoint_cue_after_trace_wins() {
        let c = ctx();
        let owner = c.resolve("its HT is on XY. end b is ", "");
        assert_eq!(owner, Owner::Endpoint('B'), "Expected end b to own the value, got {owner:?}");
    }

    #[test]
    fn trace_in_lookahead_does_not_claim() {
        let c = ctx();
        let owner = c.resolve("a line ", "20mm above HP. its VT is");
        assert_eq!(owner, Owner::Endpoint('A'));
    }

    #[test]
    fn lookahead_then_default() {
        let c = ctx();
        assert_eq!(c.resolve("", "20mm above HP for the other end"), Owner::Endpoint('B'));
        assert_eq!(c.resolve("a line ", "20mm above HP"), Owner::Endpoint('A'));
    }

    #[test]
    fn find_endpoint_prefers_last_label() {
        let c = ctx();
        assert_eq!(c.find_endpoint("end b is "), Some('B'));
        assert_eq!(c.find_endpoint("the line "), None);
    }

    #[test]
    fn sentence_tail_ignores_decimal_points() {
        assert_eq!(sentence_tail("tl is 7.5mm and "), "tl is 7.5mm and ");
        assert_eq!(sentence_tail("HP. end b "), " end b ");
    }

    #[test]
    fn windows_respect_char_boundaries() {
        let text = "30° to HP";
        let before = window_before(text, text.len(), 8);
        assert!(before.ends_with("HP"));
        let after = window_after(text, 0, 3);
        assert_eq!(after, "30");
    }

    #[test]
    fn dedup_prefers_priority_and_keeps_order() {
        let atoms = vec![
            Atom::new(DatumKind::HeightA, 10.0, AtomSource::OneEndPattern).at('A'),
            Atom::new(DatumKind::TrueLength, 75.0, AtomSource::Pattern),
            Atom::new(DatumKind::HeightA, 20.0, AtomSource::Position).at('A'),
            Atom::new(DatumKind::TrueLength, 80.0, AtomSource::Pattern),
        ];
        let kept = deduplicate(atoms);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].value, 20.0);
        assert_eq!(kept[1].value, 75.0);
    }

    #[test]
    fn backfill_by_field() {
        let mut atoms = vec![
            Atom::new(DatumKind::HeightB, 10.0, AtomSource::Pattern),
            Atom::new(DatumKind::TrueLength, 75.0, AtomSource::Pattern),
        ];
        backfill_endpoints(&mut atoms, 'P', 'Q');
        assert_eq!(atoms[0].endpoint, Some('Q'));
        assert_eq!(atoms[1].endpoint, None);
    }

    #[test]
    fn out_of_domain_atoms_dropped_with_diagnostic() {
        let atoms = vec![
            Atom::new(DatumKind::InclinationHp, 120.0, AtomSource::Pattern),
            Atom::new(DatumKind::HeightA, -40.0, AtomSource::Position).at('A'),
        ];
        let (kept, diagnostics) = validate_domain(atoms);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].field, "h_A");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].starts_with("theta"), "Got: {}", diagnostics[0]);
    }
}
