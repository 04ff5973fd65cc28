use std::collections::BTreeMap;

use _model::Rank;
use serde::{Deserialize, Serialize};

use crate::geometry::GeometryKind;

/// Parts of a course, or other games, that never count as a course.
const EXCLUDED: &[(&str, &str)] = &[
    ("golf", "driving_range"),
    ("golf", "practice"),
    ("golf", "hole"),
    ("golf", "green"),
    ("golf", "tee"),
    ("golf", "fairway"),
    ("golf", "pin"),
    ("golf", "bunker"),
    ("golf", "rough"),
    ("golf", "water_hazard"),
    ("golf", "lateral_water_hazard"),
    ("golf", "miniature"),
    ("leisure", "miniature_golf"),
    ("sport", "miniature_golf"),
    ("sport", "disc_golf"),
];

const STRONG: &[(&str, &str)] = &[("leisure", "golf_course"), ("golf", "course")];

const WEAK: (&str, &str) = ("sport", "golf");

/// Generic area-use keys that make a `sport=golf` tag describe an area.
const AREA_USE: &[&str] = &["leisure", "landuse"];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tagging {
    Excluded,
    Strong,
    Weak,
    Unrelated,
}

fn has(tags: &BTreeMap<String, String>, (k, v): (&str, &str)) -> bool {
    tags.get(k).is_some_and(|x| x == v)
}

/// Which rule, if any, a tag set falls under. Exclusions take precedence.
pub fn tagging(tags: &BTreeMap<String, String>) -> Tagging {
    if EXCLUDED.iter().any(|x| has(tags, *x)) {
        Tagging::Excluded
    } else if STRONG.iter().any(|x| has(tags, *x)) {
        Tagging::Strong
    } else if has(tags, WEAK) && AREA_USE.iter().any(|k| tags.contains_key(*k)) {
        Tagging::Weak
    } else {
        Tagging::Unrelated
    }
}

pub fn rank(kind: GeometryKind) -> Rank {
    match kind {
        GeometryKind::Point => Rank::Point,
        GeometryKind::OpenLine | GeometryKind::ClosedRing => Rank::Way,
        GeometryKind::MultiRing => Rank::Relation,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Classifier {
    /// Smallest area at which a loosely tagged polygon is kept.
    pub min_weak_area_m2: f64,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            min_weak_area_m2: 20_000.0,
        }
    }
}

impl Classifier {
    /// `None` rejects the feature.
    pub fn classify(
        &self,
        tags: &BTreeMap<String, String>,
        kind: GeometryKind,
        area_m2: f64,
    ) -> Option<Rank> {
        match tagging(tags) {
            Tagging::Strong => Some(rank(kind)),
            Tagging::Weak => match kind {
                GeometryKind::ClosedRing | GeometryKind::MultiRing
                    if area_m2 >= self.min_weak_area_m2 =>
                {
                    Some(rank(kind))
                }
                _ => None,
            },
            Tagging::Excluded | Tagging::Unrelated => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn strong_rank_follows_geometry() {
        let c = Classifier::default();
        let t = tags(&[("leisure", "golf_course")]);
        assert_eq!(c.classify(&t, GeometryKind::Point, 0.0), Some(Rank::Point));
        assert_eq!(c.classify(&t, GeometryKind::OpenLine, 0.0), Some(Rank::Way));
        assert_eq!(c.classify(&t, GeometryKind::ClosedRing, 5.0), Some(Rank::Way));
        assert_eq!(
            c.classify(&t, GeometryKind::MultiRing, 5.0),
            Some(Rank::Relation)
        );

        let t = tags(&[("golf", "course")]);
        assert_eq!(c.classify(&t, GeometryKind::Point, 0.0), Some(Rank::Point));
    }

    #[test]
    fn exclusions_win() {
        let c = Classifier::default();
        for x in [
            tags(&[("leisure", "golf_course"), ("golf", "driving_range")]),
            tags(&[("leisure", "miniature_golf"), ("golf", "course")]),
            tags(&[("golf", "hole"), ("sport", "golf"), ("landuse", "grass")]),
            tags(&[("golf", "green")]),
        ] {
            assert_eq!(tagging(&x), Tagging::Excluded);
            assert_eq!(c.classify(&x, GeometryKind::MultiRing, 1e7), None);
        }
    }

    #[test]
    fn weak_needs_large_area() {
        let c = Classifier::default();
        let t = tags(&[("sport", "golf"), ("leisure", "pitch")]);
        assert_eq!(tagging(&t), Tagging::Weak);
        assert_eq!(c.classify(&t, GeometryKind::Point, 0.0), None);
        assert_eq!(c.classify(&t, GeometryKind::OpenLine, 1e6), None);
        assert_eq!(c.classify(&t, GeometryKind::ClosedRing, 19_999.9), None);
        assert_eq!(
            c.classify(&t, GeometryKind::ClosedRing, 20_000.0),
            Some(Rank::Way)
        );
        assert_eq!(
            c.classify(&t, GeometryKind::MultiRing, 50_000.0),
            Some(Rank::Relation)
        );

        let loose = Classifier {
            min_weak_area_m2: 0.0,
        };
        assert_eq!(
            loose.classify(&t, GeometryKind::ClosedRing, 0.0),
            Some(Rank::Way)
        );
    }

    #[test]
    fn sport_alone_is_unrelated() {
        let c = Classifier::default();
        let t = tags(&[("sport", "golf"), ("shop", "golf")]);
        assert_eq!(tagging(&t), Tagging::Unrelated);
        assert_eq!(c.classify(&t, GeometryKind::MultiRing, 1e7), None);
        assert_eq!(tagging(&tags(&[("amenity", "pub")])), Tagging::Unrelated);
    }
}
