//! Word-level typo correction.
//!
//! Exact dictionary hits are applied first. Otherwise a bounded Levenshtein
//! match runs against the dictionary keys and then the domain vocabulary.
//! Words under four letters and protected words are left alone, and a tie
//! between two different targets is treated as ambiguous.

use crate::pipeline::catalogue::Lexicon;

use super::types::{CorrectionMethod, TypoCorrection};

const MIN_WORD_LEN: usize = 4;

/// Correct every ASCII-letter run in `text`. Returns the new text and the
/// corrections that actually changed it.
pub fn correct_typos(text: &str, lexicon: &Lexicon) -> (String, Vec<TypoCorrection>) {
    let entries = lexicon.typo_entries();
    let mut result = String::with_capacity(text.len());
    let mut corrections = Vec::new();
    let mut word_buf = String::new();

    for ch in text.chars() {
        if ch.is_ascii_alphabetic() {
            word_buf.push(ch);
        } else {
            flush_word(&mut word_buf, &mut result, &mut corrections, lexicon, &entries);
            result.push(ch);
        }
    }
    flush_word(&mut word_buf, &mut result, &mut corrections, lexicon, &entries);

    (result, corrections)
}

fn flush_word(
    word_buf: &mut String,
    result: &mut String,
    corrections: &mut Vec<TypoCorrection>,
    lexicon: &Lexicon,
    entries: &[(&str, &str)],
) {
    if word_buf.is_empty() {
        return;
    }
    match try_correct_word(word_buf, lexicon, entries) {
        Some(correction) => {
            result.push_str(&correction.corrected);
            corrections.push(correction);
        }
        None => result.push_str(word_buf),
    }
    word_buf.clear();
}

fn try_correct_word(word: &str, lexicon: &Lexicon, entries: &[(&str, &str)]) -> Option<TypoCorrection> {
    if word.len() < MIN_WORD_LEN {
        return None;
    }
    let lower = word.to_ascii_lowercase();

    if let Some(target) = lexicon.typo_target(&lower) {
        return Some(TypoCorrection {
            original: word.to_string(),
            corrected: target.to_string(),
            method: CorrectionMethod::Dictionary,
            score: None,
        });
    }

    if lexicon.is_protected(&lower) {
        return None;
    }

    let threshold = edit_threshold(lower.len());
    let candidates = match best_match(&lower, threshold, entries.iter().copied()) {
        Match::None => best_match(
            &lower,
            threshold,
            lexicon.vocabulary().iter().map(|w| (w.as_str(), w.as_str())),
        ),
        other => other,
    };

    match candidates {
        Match::Unique { target, score } if target != lower => Some(TypoCorrection {
            original: word.to_string(),
            corrected: target,
            method: CorrectionMethod::Levenshtein,
            score: Some(score),
        }),
        _ => None,
    }
}

enum Match {
    None,
    Ambiguous,
    Unique { target: String, score: f64 },
}

/// Closest candidate within `threshold`. Candidates are `(key, target)`
/// pairs; equal distances to different targets are ambiguous.
fn best_match<'a>(
    word: &str,
    threshold: u32,
    candidates: impl Iterator<Item = (&'a str, &'a str)>,
) -> Match {
    let mut best: Option<(u32, &str, f64)> = None;
    let mut ambiguous = false;

    for (key, target) in candidates {
        let Some(dist) = edit_distance_within(word, key, threshold) else {
            continue;
        };
        let score = 1.0 - f64::from(dist) / word.len().max(key.len()) as f64;
        match best {
            Some((best_dist, _, _)) if dist < best_dist => {
                best = Some((dist, target, score));
                ambiguous = false;
            }
            Some((best_dist, best_target, _)) if dist == best_dist && best_target != target => {
                ambiguous = true;
            }
            None => best = Some((dist, target, score)),
            _ => {}
        }
    }

    match best {
        None => Match::None,
        Some(_) if ambiguous => Match::Ambiguous,
        Some((_, target, score)) => Match::Unique {
            target: target.to_string(),
            score,
        },
    }
}

/// Maximum edit distance accepted for a word of `len` letters.
pub fn edit_threshold(len: usize) -> u32 {
    match len {
        0..=6 => 1,
        7..=12 => 2,
        _ => 3,
    }
}

/// Levenshtein distance between `a` and `b`, or `None` as soon as it
/// must exceed `limit`. Rows are abandoned once their smallest cell is
/// over the limit.
pub fn edit_distance_within(a: &str, b: &str, limit: u32) -> Option<u32> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > limit as usize {
        return None;
    }

    let mut row: Vec<u32> = (0..=b.len() as u32).collect();
    for (i, &ca) in a.iter().enumerate() {
        let mut diagonal = row[0];
        row[0] = i as u32 + 1;
        let mut row_min = row[0];
        for (j, &cb) in b.iter().enumerate() {
            let substitute = diagonal + u32::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substitute.min(row[j] + 1).min(diagonal + 1);
            row_min = row_min.min(row[j + 1]);
        }
        if row_min > limit {
            return None;
        }
    }

    row.last().copied().filter(|&d| d <= limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correct(text: &str) -> (String, Vec<TypoCorrection>) {
        correct_typos(text, &Lexicon::standard())
    }

    #[test]
    fn dictionary_hit_replaced() {
        let (text, corrections) = correct("end a is 20mm abov hp");
        assert_eq!(text, "end a is 20mm above hp");
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].method, CorrectionMethod::Dictionary);
        assert_eq!(corrections[0].score, None);
    }

    #[test]
    fn dictionary_hit_can_expand_to_two_words() {
        let (text, _) = correct("25mm infront of vp");
        assert_eq!(text, "25mm in front of vp");
    }

    #[test]
    fn fuzzy_match_against_vocabulary() {
        // "paralell" is not a dictionary key; one substitution from "parallel"
        let (text, corrections) = correct("line paralell to hp");
        assert_eq!(text, "line parallel to hp");
        assert_eq!(corrections[0].method, CorrectionMethod::Levenshtein);
        let score = corrections[0].score.unwrap();
        assert!(score > 0.8, "Expected > 0.8, got {score}");
    }

    #[test]
    fn from_is_never_rewritten_to_front() {
        let (text, corrections) = correct("20mm from hp and 30mm from vp");
        assert_eq!(text, "20mm from hp and 30mm from vp");
        assert!(corrections.is_empty());
    }

    #[test]
    fn common_words_preserved() {
        let input = "both ends of the line lies in the plane with projections measured";
        let (text, corrections) = correct(input);
        assert_eq!(text, input);
        assert!(corrections.is_empty(), "Unexpected corrections: {corrections:?}");
    }

    #[test]
    fn short_words_skipped() {
        let (text, corrections) = correct("lin is at 30");
        assert_eq!(text, "lin is at 30");
        assert!(corrections.is_empty());
    }

    #[test]
    fn correct_words_produce_no_record() {
        let (_, corrections) = correct("inclined parallel perpendicular");
        assert!(corrections.is_empty());
    }

    #[test]
    fn numbers_and_units_untouched() {
        let (text, _) = correct("75mm long at 30°");
        assert_eq!(text, "75mm long at 30°");
    }

    #[test]
    fn thresholds_by_length() {
        assert_eq!(edit_threshold(4), 1);
        assert_eq!(edit_threshold(6), 1);
        assert_eq!(edit_threshold(7), 2);
        assert_eq!(edit_threshold(12), 2);
        assert_eq!(edit_threshold(13), 3);
    }

    #[test]
    fn edit_distance_basic() {
        assert_eq!(edit_distance_within("kitten", "sitting", 3), Some(3));
        assert_eq!(edit_distance_within("", "abc", 3), Some(3));
        assert_eq!(edit_distance_within("above", "above", 0), Some(0));
        assert_eq!(edit_distance_within("fromt", "from", 1), Some(1));
    }

    #[test]
    fn edit_distance_gives_up_past_limit() {
        assert_eq!(edit_distance_within("kitten", "sitting", 2), None);
        assert_eq!(edit_distance_within("ab", "abcdef", 3), None, "Length gap alone exceeds the limit");
        assert_eq!(edit_distance_within("inclined", "xxxxxxxx", 2), None);
        assert_eq!(edit_distance_within("infront", "in front", 1), Some(1));
    }

    #[test]
    fn ambiguous_tie_left_unchanged() {
        let lex = Lexicon::new(
            vec![
                ("abcx".to_string(), "first".to_string()),
                ("abcy".to_string(), "second".to_string()),
            ],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        let (text, corrections) = correct_typos("abcz", &lex);
        assert_eq!(text, "abcz");
        assert!(corrections.is_empty());
    }
}
