use std::collections::{HashMap, HashSet};

/// Typo, synonym and vocabulary tables for the normalizer.
///
/// Built once and shared behind an `Arc`. Synonyms are kept sorted
/// longest-first so multi-word phrases win over their sub-phrases.
#[derive(Debug, Clone)]
pub struct Lexicon {
    typos: HashMap<String, String>,
    synonyms: Vec<(String, String)>,
    vocabulary: Vec<String>,
    protected: HashSet<String>,
    key_terms: Vec<String>,
}

/// Misspelling → correction. Multi-word keys are kept for completeness but
/// only single words are ever looked up.
const TYPOS: &[(&str, &str)] = &[
    // Spatial
    ("infornt", "in front"), ("infron", "in front"), ("infront", "in front"),
    ("frount", "front"), ("fornt", "front"), ("fromt", "front"),
    ("bove", "above"), ("abov", "above"), ("abobe", "above"), ("aboue", "above"),
    ("bellow", "below"), ("belows", "below"), ("belw", "below"),
    // Technical
    ("mesures", "measures"), ("measurs", "measures"), ("mesure", "measure"),
    ("measrues", "measures"), ("meaures", "measures"),
    ("inclned", "inclined"), ("inclind", "inclined"), ("inclied", "inclined"),
    ("parrallel", "parallel"), ("paralel", "parallel"), ("paralle", "parallel"),
    ("perpendiclar", "perpendicular"), ("perpendiculr", "perpendicular"),
    ("incliantion", "inclination"), ("incliation", "inclination"),
    ("lenth", "length"), ("lenght", "length"), ("lengt", "length"), ("lenthg", "length"),
    ("hieght", "height"), ("heigh", "height"), ("hight", "height"),
    ("verticle", "vertical"), ("vertcal", "vertical"),
    ("horizantal", "horizontal"), ("horizonatal", "horizontal"), ("horizonal", "horizontal"),
    ("midponit", "midpoint"), ("midpoitn", "midpoint"), ("midepoint", "midpoint"),
    ("projectoin", "projection"), ("porjection", "projection"), ("projecion", "projection"),
    ("projecors", "projectors"), ("projecs", "projectors"),
    ("lne", "line"), ("lien", "line"), ("liine", "line"),
    // Views
    ("elevtion", "elevation"), ("elevetion", "elevation"), ("elev", "elevation"),
    ("fornt view", "front view"), ("fron view", "front view"),
    ("topp view", "top view"), ("top veiw", "top view"),
    // Units
    ("milimeter", "mm"), ("millimeter", "mm"), ("millimetre", "mm"), ("milimetre", "mm"),
    ("millimeters", "mm"), ("millimetres", "mm"),
    ("centimeter", "cm"), ("centimetre", "cm"), ("centimeters", "cm"), ("centimetres", "cm"),
    ("mtr", "m"), ("mts", "m"), ("meter", "m"), ("metre", "m"), ("meters", "m"), ("metres", "m"),
];

/// Phrase → canonical phrase, applied on word boundaries.
const SYNONYMS: &[(&str, &str)] = &[
    // Planes
    ("horizontal plane", "HP"), ("h p", "HP"), ("hp", "HP"),
    ("vertical plane", "VP"), ("v p", "VP"), ("vp", "VP"),
    ("profile plane", "PP"), ("pp", "PP"),
    // Views
    ("elevation", "front view"), ("front elevation", "front view"),
    ("plan view", "top view"), ("plan", "top view"),
    ("top projection", "top view"), ("horizontal projection", "top view"),
    ("vertical projection", "front view"),
    ("profile view", "side view"),
    // Geometry
    ("true inclination to hp", "inclination to HP"),
    ("true inclination to vp", "inclination to VP"),
    ("straight line", "line"), ("straight", ""),
    // Position
    ("infront of", "in front of"), ("infront", "in front"),
    // Angle phrasing
    ("makes an angle of", "inclined at"), ("making an angle of", "inclined at"),
    ("makes an angle", "inclined"), ("making an angle", "inclined"),
    ("makes angle", "inclined"), ("at an angle of", "at"), ("at an angle", "inclined"),
];

/// Domain words the fuzzy matcher may correct towards.
const VOCABULARY: &[&str] = &[
    "parallel", "perpendicular", "inclined", "inclination", "horizontal", "vertical",
    "projection", "projectors", "elevation", "midpoint", "measures", "length",
    "above", "below", "front", "behind",
];

/// Ordinary words that sit within one edit of a dictionary entry.
const COMMON_WORDS: &[&str] = &[
    "from", "lies", "lie", "line", "lines", "long", "with", "both", "plane", "planes",
    "view", "views", "projections", "projector", "measured", "measure", "measuring",
    "height", "heights", "lengths", "point", "points", "ends", "each", "other",
    "makes", "making", "first", "second", "draw", "find", "mark", "show", "locate",
    "trace", "traces", "axis", "angle", "angles", "apparent", "true", "distance",
    "apart", "given", "that", "this", "then", "which", "into", "onto", "also",
    "plan", "side", "profile", "meets", "intersects", "crosses", "lower", "higher",
    "upper", "same", "their", "quadrant", "middle", "centre", "center", "equidistant",
    "equal", "equally", "inclines", "incline", "degree", "degrees", "high", "right", "eight",
];

const KEY_TERMS: &[&str] = &[
    "HP", "VP", "mm", "°", "line", "inclined", "parallel", "front view", "top view",
];

impl Lexicon {
    /// Build a lexicon; synonyms are re-sorted longest-first.
    ///
    /// Protected words are the vocabulary, every dictionary target and the
    /// given common words. The fuzzy matcher never rewrites them.
    pub fn new<T, S, V, C>(typos: T, synonyms: S, vocabulary: V, common_words: C) -> Self
    where
        T: IntoIterator<Item = (String, String)>,
        S: IntoIterator<Item = (String, String)>,
        V: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        let typos: HashMap<String, String> = typos
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();

        let mut synonyms: Vec<(String, String)> = synonyms
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        // Stable: equal-length phrases keep their declared order
        synonyms.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let vocabulary: Vec<String> = vocabulary.into_iter().map(|w| w.to_lowercase()).collect();

        let mut protected: HashSet<String> = common_words.into_iter().map(|w| w.to_lowercase()).collect();
        protected.extend(vocabulary.iter().cloned());
        for target in typos.values() {
            for word in target.split_whitespace() {
                protected.insert(word.to_lowercase());
            }
        }

        Self {
            typos,
            synonyms,
            vocabulary,
            protected,
            key_terms: KEY_TERMS.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub fn standard() -> Self {
        Self::new(
            TYPOS.iter().map(|(k, v)| (k.to_string(), v.to_string())),
            SYNONYMS.iter().map(|(k, v)| (k.to_string(), v.to_string())),
            VOCABULARY.iter().map(|w| w.to_string()),
            COMMON_WORDS.iter().map(|w| w.to_string()),
        )
    }

    /// Exact dictionary correction for a lowercase word.
    ///
    /// Identity entries and entries that would not change the word return `None`.
    pub fn typo_target(&self, word: &str) -> Option<&str> {
        self.typos
            .get(word)
            .map(String::as_str)
            .filter(|target| *target != word)
    }

    /// Single-word dictionary entries, in deterministic order.
    pub fn typo_entries(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .typos
            .iter()
            .filter(|(k, v)| !k.contains(' ') && k != v)
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        entries.sort_unstable();
        entries
    }

    pub fn synonyms(&self) -> &[(String, String)] {
        &self.synonyms
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    pub fn is_protected(&self, word: &str) -> bool {
        self.protected.contains(word)
    }

    pub fn key_terms(&self) -> &[String] {
        &self.key_terms
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_sorted_longest_first() {
        let lex = Lexicon::standard();
        for pair in lex.synonyms().windows(2) {
            assert!(
                pair[0].0.len() >= pair[1].0.len(),
                "{:?} sorted before {:?}",
                pair[0].0,
                pair[1].0
            );
        }
    }

    #[test]
    fn identity_entries_are_not_corrections() {
        let lex = Lexicon::new(
            vec![("inclined".to_string(), "inclined".to_string())],
            Vec::new(),
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(lex.typo_target("inclined"), None);
        assert!(lex.typo_entries().is_empty());
    }

    #[test]
    fn dictionary_targets_are_protected() {
        let lex = Lexicon::standard();
        assert!(lex.is_protected("front"));
        assert!(lex.is_protected("height"));
        assert!(lex.is_protected("from"));
        assert!(lex.is_protected("parallel"));
        assert!(!lex.is_protected("fromt"));
    }

    #[test]
    fn multi_word_typos_excluded_from_word_entries() {
        let lex = Lexicon::standard();
        assert!(lex.typo_entries().iter().all(|(k, _)| !k.contains(' ')));
        assert_eq!(lex.typo_target("hieght"), Some("height"));
    }
}
