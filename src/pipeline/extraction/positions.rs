//! Endpoint heights and depths (h_A, d_A, h_B, d_B).

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::pipeline::catalogue::{DatumKind, SpecialKind};

use super::resolve::{window_after, window_before, EndpointContext, Owner};
use super::types::{Atom, AtomSource, SpecialFlag};

const LOOKBACK: usize = 60;
const LOOKAHEAD: usize = 30;

static HEIGHT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*mm\s+(above|below|from)\s+(?:the\s+)?HP\b").unwrap()
});
static DEPTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*mm\s+(in\s+front\s+of|behind|from)\s+(?:the\s+)?VP\b").unwrap()
});
static ONE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bone\s+end\s+(?:is\s+)?(\d+(?:\.\d+)?)\s*mm\s+(above|below)\s+(?:the\s+)?HP").unwrap()
});
static OTHER_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bother\s+end\s+(?:is\s+)?(\d+(?:\.\d+)?)\s*mm\s+(above|below)\s+(?:the\s+)?HP").unwrap()
});

#[derive(Clone, Copy)]
enum Axis {
    Height,
    Depth,
}

impl Axis {
    fn kind(self, first: bool) -> DatumKind {
        match (self, first) {
            (Axis::Height, true) => DatumKind::HeightA,
            (Axis::Height, false) => DatumKind::HeightB,
            (Axis::Depth, true) => DatumKind::DepthA,
            (Axis::Depth, false) => DatumKind::DepthB,
        }
    }

    /// Flags that already fix this coordinate of an endpoint.
    fn pinned_by(self, flag: SpecialKind) -> bool {
        match self {
            Axis::Height => matches!(flag, SpecialKind::OnBoth | SpecialKind::OnXy | SpecialKind::OnHp),
            Axis::Depth => matches!(flag, SpecialKind::OnBoth | SpecialKind::OnXy | SpecialKind::OnVp),
        }
    }
}

/// Extract endpoint positions in three passes: windowed attribution of
/// every "N mm above HP"/"N mm in front of VP" (midpoint and trace
/// measurements skipped), the one-end/other-end phrasing, then the SK08
/// value for its endpoint. The first atom per
/// field wins within this pass.
pub fn extract_positions(text: &str, ctx: &EndpointContext, flags: &[SpecialFlag]) -> Vec<Atom> {
    let mut atoms: Vec<Atom> = Vec::new();

    for (pattern, axis) in [(&*HEIGHT, Axis::Height), (&*DEPTH, Axis::Depth)] {
        for caps in pattern.captures_iter(text) {
            let Some((start, value)) = signed_value(&caps) else { continue };
            let lookback = window_before(text, start, LOOKBACK);
            let lookahead = window_after(text, start, LOOKAHEAD);
            let Owner::Endpoint(ep) = ctx.resolve(lookback, lookahead) else {
                continue;
            };
            push_position(&mut atoms, ctx, flags, axis, ep, value, AtomSource::Position);
        }
    }

    for (pattern, ep) in [(&*ONE_END, ctx.first), (&*OTHER_END, ctx.second)] {
        if let Some((_, value)) = pattern.captures(text).as_ref().and_then(signed_value) {
            push_position(&mut atoms, ctx, flags, Axis::Height, ep, value, AtomSource::OneEndPattern);
        }
    }

    if let Some(flag) = flags.iter().find(|f| f.flag == SpecialKind::EqualDistance) {
        if let Some(value) = flag.value {
            let ep = flag.endpoint.unwrap_or(ctx.first);
            for axis in [Axis::Height, Axis::Depth] {
                let kind = axis.kind(ep == ctx.first);
                if ep == ctx.first || ep == ctx.second {
                    if !atoms.iter().any(|a| a.data_type == kind) {
                        atoms.push(Atom::new(kind, value, AtomSource::EqualDistance).at(ep));
                    }
                }
            }
        }
    }

    atoms
}

fn push_position(
    atoms: &mut Vec<Atom>,
    ctx: &EndpointContext,
    flags: &[SpecialFlag],
    axis: Axis,
    ep: char,
    value: f64,
    source: AtomSource,
) {
    if ep != ctx.first && ep != ctx.second {
        return;
    }
    let pinned = flags
        .iter()
        .any(|f| f.endpoint == Some(ep) && axis.pinned_by(f.flag));
    if pinned {
        return;
    }
    let kind = axis.kind(ep == ctx.first);
    if atoms.iter().any(|a| a.data_type == kind) {
        return;
    }
    atoms.push(Atom::new(kind, value, source).at(ep));
}

/// Match start and value, negated for "below" and "behind".
fn signed_value(caps: &Captures) -> Option<(usize, f64)> {
    let start = caps.get(0)?.start();
    let value: f64 = caps[1].parse().ok()?;
    let direction = caps[2].to_ascii_lowercase();
    let sign = if direction == "below" || direction == "behind" { -1.0 } else { 1.0 };
    Some((start, sign * value))
}
