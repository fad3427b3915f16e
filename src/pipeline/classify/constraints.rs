use serde::Serialize;

use crate::pipeline::catalogue::{DatumKind, SpecialKind};
use crate::pipeline::extraction::{Atom, SpecialFlag};

/// Resolved numeric constraints for one problem, plus the special
/// conditions that produced part of them.
///
/// Built flags-first: a field set by a special condition is never
/// overwritten by an atom.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstraintMap {
    #[serde(rename = "TL")]
    pub true_length: Option<f64>,
    pub theta: Option<f64>,
    pub phi: Option<f64>,
    #[serde(rename = "h_A")]
    pub height_a: Option<f64>,
    #[serde(rename = "d_A")]
    pub depth_a: Option<f64>,
    #[serde(rename = "h_B")]
    pub height_b: Option<f64>,
    #[serde(rename = "d_B")]
    pub depth_b: Option<f64>,
    #[serde(rename = "L_TV")]
    pub top_view: Option<f64>,
    #[serde(rename = "L_FV")]
    pub front_view: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    #[serde(rename = "delta_X")]
    pub delta_x: Option<f64>,
    pub h_mid: Option<f64>,
    pub d_mid: Option<f64>,
    #[serde(rename = "VT_h")]
    pub vt_height: Option<f64>,
    #[serde(rename = "HT_d")]
    pub ht_depth: Option<f64>,
    #[serde(rename = "L_SV")]
    pub side_view: Option<f64>,
    pub gamma: Option<f64>,
    pub special: Vec<SpecialKind>,
}

impl ConstraintMap {
    /// Fold flags, then atoms, into a map. `first` is the label that maps
    /// to the A-side fields; any other endpoint maps to the B side.
    pub fn build(atoms: &[Atom], flags: &[SpecialFlag], first: char) -> Self {
        let mut map = Self::default();

        for flag in flags {
            let first_end = flag.endpoint.is_none_or(|ep| ep == first);
            let (h, d) = if first_end {
                (DatumKind::HeightA, DatumKind::DepthA)
            } else {
                (DatumKind::HeightB, DatumKind::DepthB)
            };
            match flag.flag {
                SpecialKind::ParallelHp => map.theta = Some(0.0),
                SpecialKind::ParallelVp => map.phi = Some(0.0),
                SpecialKind::PerpendicularHp => map.theta = Some(90.0),
                SpecialKind::PerpendicularVp => map.phi = Some(90.0),
                SpecialKind::OnBoth | SpecialKind::OnXy => {
                    *map.slot_mut(h) = Some(0.0);
                    *map.slot_mut(d) = Some(0.0);
                }
                SpecialKind::EqualDistance => {
                    if let Some(value) = flag.value {
                        *map.slot_mut(h) = Some(value);
                        *map.slot_mut(d) = Some(value);
                    }
                }
                SpecialKind::OnHp => *map.slot_mut(h) = Some(0.0),
                SpecialKind::OnVp => *map.slot_mut(d) = Some(0.0),
                _ => {}
            }
            map.special.push(flag.flag);
        }

        for atom in atoms {
            let slot = map.slot_mut(atom.data_type);
            if slot.is_none() {
                *slot = Some(atom.value);
            }
        }

        map
    }

    pub fn get(&self, kind: DatumKind) -> Option<f64> {
        match kind {
            DatumKind::TrueLength => self.true_length,
            DatumKind::InclinationHp => self.theta,
            DatumKind::InclinationVp => self.phi,
            DatumKind::HeightA => self.height_a,
            DatumKind::DepthA => self.depth_a,
            DatumKind::HeightB => self.height_b,
            DatumKind::DepthB => self.depth_b,
            DatumKind::TopViewLength => self.top_view,
            DatumKind::FrontViewLength => self.front_view,
            DatumKind::TopViewAngle => self.alpha,
            DatumKind::FrontViewAngle => self.beta,
            DatumKind::ProjectorDistance => self.delta_x,
            DatumKind::MidpointHeight => self.h_mid,
            DatumKind::MidpointDepth => self.d_mid,
            DatumKind::VerticalTraceHeight => self.vt_height,
            DatumKind::HorizontalTraceDepth => self.ht_depth,
            DatumKind::SideViewLength => self.side_view,
            DatumKind::InclinationPp => self.gamma,
        }
    }

    pub fn slot_mut(&mut self, kind: DatumKind) -> &mut Option<f64> {
        match kind {
            DatumKind::TrueLength => &mut self.true_length,
            DatumKind::InclinationHp => &mut self.theta,
            DatumKind::InclinationVp => &mut self.phi,
            DatumKind::HeightA => &mut self.height_a,
            DatumKind::DepthA => &mut self.depth_a,
            DatumKind::HeightB => &mut self.height_b,
            DatumKind::DepthB => &mut self.depth_b,
            DatumKind::TopViewLength => &mut self.top_view,
            DatumKind::FrontViewLength => &mut self.front_view,
            DatumKind::TopViewAngle => &mut self.alpha,
            DatumKind::FrontViewAngle => &mut self.beta,
            DatumKind::ProjectorDistance => &mut self.delta_x,
            DatumKind::MidpointHeight => &mut self.h_mid,
            DatumKind::MidpointDepth => &mut self.d_mid,
            DatumKind::VerticalTraceHeight => &mut self.vt_height,
            DatumKind::HorizontalTraceDepth => &mut self.ht_depth,
            DatumKind::SideViewLength => &mut self.side_view,
            DatumKind::InclinationPp => &mut self.gamma,
        }
    }

    /// Builder used where a map is assembled by hand.
    pub fn with(mut self, kind: DatumKind, value: f64) -> Self {
        *self.slot_mut(kind) = Some(value);
        self
    }

    pub fn has_special(&self, kind: SpecialKind) -> bool {
        self.special.contains(&kind)
    }

    /// Known fields in catalogue order.
    pub fn known(&self) -> impl Iterator<Item = (DatumKind, f64)> + '_ {
        DatumKind::ALL
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|v| (kind, v)))
    }

    pub fn known_count(&self) -> usize {
        self.known().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::AtomSource;

    fn atom(kind: DatumKind, value: f64) -> Atom {
        Atom::new(kind, value, AtomSource::Pattern)
    }

    #[test]
    fn atoms_fill_fields() {
        let map = ConstraintMap::build(
            &[atom(DatumKind::TrueLength, 75.0), atom(DatumKind::InclinationHp, 30.0)],
            &[],
            'A',
        );
        assert_eq!(map.true_length, Some(75.0));
        assert_eq!(map.theta, Some(30.0));
        assert_eq!(map.phi, None);
        assert_eq!(map.known_count(), 2);
    }

    #[test]
    fn flag_value_never_overwritten_by_atom() {
        let map = ConstraintMap::build(
            &[atom(DatumKind::InclinationVp, 30.0), atom(DatumKind::HeightA, 15.0)],
            &[
                SpecialFlag::new(SpecialKind::ParallelVp),
                SpecialFlag::new(SpecialKind::OnHp).at('A'),
            ],
            'A',
        );
        assert_eq!(map.phi, Some(0.0), "PARALLEL_VP must pin phi");
        assert_eq!(map.height_a, Some(0.0), "ON_HP must pin h_A");
        assert_eq!(map.special, vec![SpecialKind::ParallelVp, SpecialKind::OnHp]);
    }

    #[test]
    fn on_both_for_second_endpoint() {
        let map = ConstraintMap::build(&[], &[SpecialFlag::new(SpecialKind::OnBoth).at('Q')], 'P');
        assert_eq!(map.height_b, Some(0.0));
        assert_eq!(map.depth_b, Some(0.0));
        assert_eq!(map.height_a, None);
    }

    #[test]
    fn first_endpoint_label_maps_to_a_side() {
        let map = ConstraintMap::build(&[], &[SpecialFlag::new(SpecialKind::OnXy).at('P')], 'P');
        assert_eq!(map.height_a, Some(0.0));
        assert_eq!(map.depth_a, Some(0.0));
    }

    #[test]
    fn equal_distance_sets_both_coordinates() {
        let flag = SpecialFlag::new(SpecialKind::EqualDistance).at('B').with_value(25.0);
        let map = ConstraintMap::build(&[], &[flag], 'A');
        assert_eq!(map.height_b, Some(25.0));
        assert_eq!(map.depth_b, Some(25.0));
    }

    #[test]
    fn equal_distance_without_value_sets_nothing() {
        let map = ConstraintMap::build(&[], &[SpecialFlag::new(SpecialKind::EqualDistance)], 'A');
        assert_eq!(map.known_count(), 0);
        assert!(map.has_special(SpecialKind::EqualDistance));
    }

    #[test]
    fn perpendicular_flags_set_ninety() {
        let map = ConstraintMap::build(
            &[],
            &[
                SpecialFlag::new(SpecialKind::PerpendicularHp),
                SpecialFlag::new(SpecialKind::PerpendicularVp),
            ],
            'A',
        );
        assert_eq!(map.theta, Some(90.0));
        assert_eq!(map.phi, Some(90.0));
    }

    #[test]
    fn serializes_with_field_names() {
        let map = ConstraintMap::default()
            .with(DatumKind::TrueLength, 75.0)
            .with(DatumKind::HeightA, 20.0)
            .with(DatumKind::ProjectorDistance, 50.0);
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["TL"], 75.0);
        assert_eq!(json["h_A"], 20.0);
        assert_eq!(json["delta_X"], 50.0);
        assert!(json["theta"].is_null());
    }

    #[test]
    fn get_and_slot_mut_agree_for_every_kind() {
        let mut map = ConstraintMap::default();
        for (i, kind) in DatumKind::ALL.into_iter().enumerate() {
            *map.slot_mut(kind) = Some(i as f64);
        }
        for (i, kind) in DatumKind::ALL.into_iter().enumerate() {
            assert_eq!(map.get(kind), Some(i as f64), "Mismatch for {}", kind.field());
        }
    }
}
