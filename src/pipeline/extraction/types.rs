use serde::Serialize;

use crate::pipeline::catalogue::{DatumKind, SpecialKind};

/// Which extraction path produced an atom. Higher priority wins during
/// deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomSource {
    Paired,
    Pattern,
    Position,
    OneEndPattern,
    EqualDistance,
}

impl AtomSource {
    pub fn priority(self) -> u8 {
        match self {
            AtomSource::Paired => 3,
            AtomSource::Pattern | AtomSource::Position | AtomSource::EqualDistance => 2,
            AtomSource::OneEndPattern => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AtomSource::Paired => "paired",
            AtomSource::Pattern => "pattern",
            AtomSource::Position => "position",
            AtomSource::OneEndPattern => "one_end_pattern",
            AtomSource::EqualDistance => "equal_distance",
        }
    }
}

/// One typed numeric fact pulled from the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Atom {
    pub data_type: DatumKind,
    pub field: &'static str,
    pub value: f64,
    pub endpoint: Option<char>,
    pub source: AtomSource,
}

impl Atom {
    pub fn new(kind: DatumKind, value: f64, source: AtomSource) -> Self {
        Self {
            data_type: kind,
            field: kind.field(),
            value,
            endpoint: None,
            source,
        }
    }

    pub fn at(mut self, endpoint: char) -> Self {
        self.endpoint = Some(endpoint);
        self
    }
}

/// A special condition detected in the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialFlag {
    pub id: &'static str,
    pub flag: SpecialKind,
    pub slots: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

impl SpecialFlag {
    pub fn new(kind: SpecialKind) -> Self {
        Self {
            id: kind.code(),
            flag: kind,
            slots: kind.slots(),
            endpoint: None,
            value: None,
        }
    }

    pub fn at(mut self, endpoint: char) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionMetadata {
    pub atom_count: usize,
    pub special_count: usize,
    pub endpoints: Vec<char>,
    pub method: &'static str,
    pub confidence: f64,
    /// Atoms dropped by domain validation, one line each.
    pub diagnostics: Vec<String>,
    pub elapsed_us: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    pub atoms: Vec<Atom>,
    pub endpoints: Vec<char>,
    pub special_flags: Vec<SpecialFlag>,
    pub metadata: ExtractionMetadata,
}

impl ExtractionResult {
    pub fn atom(&self, kind: DatumKind) -> Option<&Atom> {
        self.atoms.iter().find(|a| a.data_type == kind)
    }

    pub fn value(&self, kind: DatumKind) -> Option<f64> {
        self.atom(kind).map(|a| a.value)
    }

    pub fn has_flag(&self, kind: SpecialKind) -> bool {
        self.special_flags.iter().any(|f| f.flag == kind)
    }

    /// Atoms plus the slot cost of every flag.
    pub fn slot_count(&self) -> u32 {
        slot_count(&self.atoms, &self.special_flags)
    }
}

pub(crate) fn slot_count(atoms: &[Atom], flags: &[SpecialFlag]) -> u32 {
    atoms.len() as u32 + flags.iter().map(|f| f.slots).sum::<u32>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_priorities() {
        assert!(AtomSource::Paired.priority() > AtomSource::Pattern.priority());
        assert_eq!(AtomSource::Position.priority(), AtomSource::EqualDistance.priority());
        assert!(AtomSource::OneEndPattern.priority() < AtomSource::Position.priority());
    }

    #[test]
    fn atom_serializes_with_codes() {
        let atom = Atom::new(DatumKind::HeightA, 20.0, AtomSource::Position).at('A');
        let json = serde_json::to_value(&atom).unwrap();
        assert_eq!(json["data_type"], "D04");
        assert_eq!(json["field"], "h_A");
        assert_eq!(json["endpoint"], "A");
        assert_eq!(json["source"], "position");
    }

    #[test]
    fn flag_carries_catalogue_slots() {
        let flag = SpecialFlag::new(SpecialKind::OnBoth).at('B');
        assert_eq!(flag.id, "SK07");
        assert_eq!(flag.slots, 2);
        let json = serde_json::to_value(&flag).unwrap();
        assert_eq!(json["flag"], "ON_BOTH");
        assert!(json.get("value").is_none());
    }
}
