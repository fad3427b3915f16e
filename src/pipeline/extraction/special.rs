//! Special-condition detection (SK01..SK13).

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::pipeline::catalogue::SpecialKind;

use super::resolve::{window_after, window_before, EndpointContext};
use super::types::SpecialFlag;

const LOOKBACK: usize = 40;

static PARALLEL_HP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)parallel\s+to\s+(?:both\s+)?(?:the\s+)?(?:HP|VP\s+and\s+(?:the\s+)?HP)\b").unwrap()
});
static PARALLEL_VP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)parallel\s+to\s+(?:both\s+)?(?:the\s+)?(?:VP|HP\s+and\s+(?:the\s+)?VP)\b").unwrap()
});
static PERP_HP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)perpendicular\s+to\s+(?:the\s+)?HP|vertical\s+line").unwrap()
});
static PERP_VP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)perpendicular\s+to\s+(?:the\s+)?VP").unwrap());

static ON_BOTH_NAMED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:end|point)\s+([a-z])\s+(?:is\s+)?(?:on|in)\s+both\s+(?:HP\s+and\s+VP|VP\s+and\s+HP)").unwrap()
});
static ON_BOTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:on|in)\s+both\s+(?:HP\s+and\s+VP|VP\s+and\s+HP)").unwrap()
});
static ON_XY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:intersects?|meets?|\bon|crosses?)\s+(?:the\s+)?XY").unwrap()
});

static EQUAL_DIST: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*mm\s+from\s+both\s+(?:HP\s+and\s+VP|planes?)").unwrap(),
        Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*mm\s+(?:from\s+each|equally\s+(?:from|distant))").unwrap(),
    ]
});
static EQUIDISTANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)equidistant\s+from\s+both|equal\s+distances?\s+from\s+both").unwrap()
});

static ON_HP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:end\s+|point\s+)?\b([a-z])\s+(?:is\s+)?(?:in|on|lies?\s+(?:in|on))\s+(?:the\s+)?HP\b").unwrap()
});
static ON_VP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:end\s+|point\s+)?\b([a-z])\s+(?:is\s+)?(?:in|on|lies?\s+(?:in|on))\s+(?:the\s+)?VP\b").unwrap()
});
static AND_VP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s+and\s+(?:the\s+)?VP\b").unwrap());
static AND_HP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s+and\s+(?:the\s+)?HP\b").unwrap());
static BOTH_PLANES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)HP\s+and\s+VP|VP\s+and\s+HP|both").unwrap());
static ONE_END_ON_HP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bone\s+end\s+(?:is\s+)?(?:in|on)\s+(?:the\s+)?HP").unwrap());
static ONE_END_ON_VP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bone\s+end\s+(?:is\s+)?(?:in|on)\s+(?:the\s+)?VP").unwrap());

static MIDPOINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mid(?:dle|[-\s]?point)|centre\s+of\s+(?:the\s+)?line").unwrap()
});
static TRACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:mark|find|show|locate)\s+(?:its\s+)?traces?|(?:HT|VT)\s+and\s+(?:VT|HT)").unwrap()
});
static FIRST_QUADRANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)first\s+(?:quadrant|angle|dihedral)|1st\s+(?:quadrant|angle)").unwrap()
});

/// Detect every special condition in normalized text.
///
/// ON_BOTH and ON_XY are checked before the single-plane conditions, and
/// ON_HP/ON_VP are skipped entirely once ON_BOTH is present.
pub fn detect_special(text: &str, ctx: &EndpointContext) -> Vec<SpecialFlag> {
    let mut flags = Vec::new();

    for (pattern, kind) in [
        (&*PARALLEL_HP, SpecialKind::ParallelHp),
        (&*PARALLEL_VP, SpecialKind::ParallelVp),
        (&*PERP_HP, SpecialKind::PerpendicularHp),
        (&*PERP_VP, SpecialKind::PerpendicularVp),
    ] {
        if pattern.is_match(text) {
            flags.push(SpecialFlag::new(kind));
        }
    }

    // ── Endpoint on both planes / on XY ──
    if let Some(caps) = ON_BOTH_NAMED.captures(text) {
        let ep = letter(&caps).unwrap_or(ctx.first);
        flags.push(SpecialFlag::new(SpecialKind::OnBoth).at(ep));
    } else if ON_BOTH.is_match(text) {
        flags.push(SpecialFlag::new(SpecialKind::OnBoth).at(ctx.first));
    }

    if let Some(m) = ON_XY.find(text) {
        let lookback = window_before(text, m.start(), LOOKBACK);
        let ep = ctx.find_endpoint(lookback).unwrap_or(ctx.first);
        flags.push(SpecialFlag::new(SpecialKind::OnXy).at(ep));
    }

    // ── Equal distances ──
    let equal = EQUAL_DIST.iter().find_map(|re| re.captures(text));
    match equal {
        Some(caps) => {
            let start = caps.get(0).map_or(0, |m| m.start());
            let lookback = window_before(text, start, LOOKBACK);
            let ep = ctx.find_endpoint(lookback).unwrap_or(ctx.first);
            let mut flag = SpecialFlag::new(SpecialKind::EqualDistance).at(ep);
            if let Ok(value) = caps[1].parse::<f64>() {
                flag = flag.with_value(value);
            }
            flags.push(flag);
        }
        None if EQUIDISTANT.is_match(text) => flags.push(SpecialFlag::new(SpecialKind::Equidistant)),
        None => {}
    }

    // ── Single plane ──
    if !flags.iter().any(|f| f.flag == SpecialKind::OnBoth) {
        detect_on_plane(text, ctx, &ON_HP, &AND_VP, SpecialKind::OnHp, &mut flags);
        if ONE_END_ON_HP.is_match(text) && !flags.iter().any(|f| f.flag == SpecialKind::OnHp) {
            flags.push(SpecialFlag::new(SpecialKind::OnHp).at(ctx.first));
        }
        detect_on_plane(text, ctx, &ON_VP, &AND_HP, SpecialKind::OnVp, &mut flags);
        if ONE_END_ON_VP.is_match(text) && !flags.iter().any(|f| f.flag == SpecialKind::OnVp) {
            flags.push(SpecialFlag::new(SpecialKind::OnVp).at(ctx.first));
        }
    }

    // ── Routing and context ──
    for (pattern, kind) in [
        (&*MIDPOINT, SpecialKind::Midpoint),
        (&*TRACES, SpecialKind::TraceRequest),
        (&*FIRST_QUADRANT, SpecialKind::FirstQuadrant),
    ] {
        if pattern.is_match(text) {
            flags.push(SpecialFlag::new(kind));
        }
    }

    flags
}

/// "end a is in HP"-style statements. A match directly followed by
/// "and <other plane>" or mentioning both planes belongs to ON_BOTH.
fn detect_on_plane(
    text: &str,
    ctx: &EndpointContext,
    pattern: &Regex,
    and_other: &Regex,
    kind: SpecialKind,
    flags: &mut Vec<SpecialFlag>,
) {
    for caps in pattern.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        let Some(ep) = letter(&caps) else { continue };
        if ep != ctx.first && ep != ctx.second && ep != 'A' && ep != 'B' {
            continue;
        }
        if and_other.is_match(&text[m.end()..]) {
            continue;
        }
        if BOTH_PLANES.is_match(window_after(text, m.start(), 20)) {
            continue;
        }
        if flags.iter().any(|f| f.flag == kind && f.endpoint == Some(ep)) {
            continue;
        }
        flags.push(SpecialFlag::new(kind).at(ep));
    }
}

fn letter(caps: &Captures) -> Option<char> {
    caps.get(1)
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_uppercase())
}
