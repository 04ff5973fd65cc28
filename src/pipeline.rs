//! Raw features to candidate records.

use std::{collections::BTreeMap, fmt};

use _model::CandidateRecord;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{
    classify::{tagging, Classifier, Tagging},
    geometry::{resolve, RawFeature},
};

const NAME_KEYS: [&str; 3] = ["name", "name:en", "operator"];

const META_KEYS: [&str; 5] = [
    "addr:state",
    "addr:city",
    "addr:town",
    "addr:village",
    "is_in:state",
];

/// What became of one feature.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Accepted(CandidateRecord),
    /// Not tagged as anything golf related.
    Unrelated,
    /// Golf tagged, but by an exclusion or an unmet weak-tag threshold.
    Rejected,
    Unnamed,
    Unresolved,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub accepted: usize,
    pub unrelated: usize,
    pub rejected: usize,
    pub unnamed: usize,
    pub unresolved: usize,
}

impl Tally {
    fn count(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Accepted(_) => self.accepted += 1,
            Outcome::Unrelated => self.unrelated += 1,
            Outcome::Rejected => self.rejected += 1,
            Outcome::Unnamed => self.unnamed += 1,
            Outcome::Unresolved => self.unresolved += 1,
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} accepted, {} rejected, {} unnamed, {} unresolved",
            self.accepted, self.rejected, self.unnamed, self.unresolved
        )
    }
}

pub fn name(tags: &BTreeMap<String, String>) -> Option<&str> {
    NAME_KEYS
        .iter()
        .filter_map(|k| tags.get(*k))
        .map(|x| x.trim())
        .find(|x| !x.is_empty())
}

pub fn meta<'a>(tags: &'a BTreeMap<String, String>, fallback: &'a str) -> &'a str {
    META_KEYS
        .iter()
        .filter_map(|k| tags.get(*k))
        .map(|x| x.trim())
        .find(|x| !x.is_empty())
        .unwrap_or(fallback)
}

pub struct Extractor<'a> {
    pub classifier: &'a Classifier,
    /// Meta for features without address tags.
    pub region_meta: &'a str,
}

impl Extractor<'_> {
    pub fn outcome(&self, feature: &RawFeature) -> Outcome {
        match tagging(&feature.tags) {
            Tagging::Unrelated => return Outcome::Unrelated,
            Tagging::Excluded => return Outcome::Rejected,
            Tagging::Strong | Tagging::Weak => {}
        }

        let Some(label) = name(&feature.tags) else {
            return Outcome::Unnamed;
        };
        let Some(resolved) = resolve(&feature.geometry) else {
            return Outcome::Unresolved;
        };
        let kind = feature.geometry.kind();
        let Some(rank) = self
            .classifier
            .classify(&feature.tags, kind, resolved.area_m2)
        else {
            return Outcome::Rejected;
        };

        match CandidateRecord::new(
            label,
            resolved.lat(),
            resolved.lon(),
            rank,
            resolved.area_m2,
            meta(&feature.tags, self.region_meta),
        ) {
            Some(x) => Outcome::Accepted(x),
            None => Outcome::Unresolved,
        }
    }

    pub fn extract(
        &self,
        features: impl IntoIterator<Item = RawFeature>,
    ) -> (Vec<CandidateRecord>, Tally) {
        let mut records = Vec::new();
        let mut tally = Tally::default();
        for feature in features {
            let outcome = self.outcome(&feature);
            tally.count(&outcome);
            match outcome {
                Outcome::Accepted(x) => records.push(x),
                Outcome::Unrelated => {}
                x => {
                    if let Some(id) = &feature.id {
                        trace!("{} excluded: {x:?}", id.link());
                    }
                }
            }
        }
        (records, tally)
    }
}

#[cfg(test)]
mod tests {
    use _model::{OsmId, Rank};
    use geo::Coord;

    use super::*;
    use crate::geometry::Geometry;

    fn feature(geometry: Geometry, pairs: &[(&str, &str)]) -> RawFeature {
        RawFeature {
            id: Some(OsmId::Way(1)),
            geometry,
            tags: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn point(lon: f64, lat: f64) -> Geometry {
        Geometry::Point(Coord { x: lon, y: lat })
    }

    fn square(side: f64) -> Geometry {
        Geometry::Way(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: side, y: 0.0 },
            Coord { x: side, y: side },
            Coord { x: 0.0, y: side },
            Coord { x: 0.0, y: 0.0 },
        ])
    }

    fn extractor(classifier: &Classifier) -> Extractor<'_> {
        Extractor {
            classifier,
            region_meta: "NJ",
        }
    }

    #[test]
    fn accepts_named_point() {
        let classifier = Classifier::default();
        let x = extractor(&classifier).outcome(&feature(
            point(-74.930001, 39.800004),
            &[("leisure", "golf_course"), ("name", " Pine Valley GC ")],
        ));
        assert_eq!(
            x,
            Outcome::Accepted(CandidateRecord {
                label: "Pine Valley GC".to_string(),
                lat: 39.8,
                lon: -74.93,
                rank: Rank::Point,
                area_m2: 0.0,
                meta: "NJ".to_string(),
            })
        );
    }

    #[test]
    fn name_fallbacks() {
        let tags = |pairs: &[(&str, &str)]| feature(point(0.0, 0.0), pairs).tags;
        assert_eq!(name(&tags(&[("name:en", "Old Course")])), Some("Old Course"));
        assert_eq!(
            name(&tags(&[("name", "  "), ("operator", "Links Trust")])),
            Some("Links Trust")
        );
        assert_eq!(name(&tags(&[("leisure", "golf_course")])), None);
    }

    #[test]
    fn meta_prefers_address_tags() {
        let tags = feature(point(0.0, 0.0), &[("addr:city", "Clementon")]).tags;
        assert_eq!(meta(&tags, "NJ"), "Clementon");
        assert_eq!(meta(&BTreeMap::new(), "NJ"), "NJ");
    }

    #[test]
    fn tallies_every_exclusion() {
        let classifier = Classifier::default();
        let features = vec![
            feature(point(1.0, 1.0), &[("golf", "course"), ("name", "A")]),
            feature(point(1.0, 1.0), &[("amenity", "cafe"), ("name", "B")]),
            feature(point(1.0, 1.0), &[("golf", "hole"), ("name", "Hole 1")]),
            feature(point(1.0, 1.0), &[("leisure", "golf_course")]),
            feature(Geometry::Way(vec![]), &[("golf", "course"), ("name", "C")]),
            feature(
                square(0.0001),
                &[("sport", "golf"), ("landuse", "grass"), ("name", "Tiny")],
            ),
            feature(
                square(0.01),
                &[("sport", "golf"), ("landuse", "grass"), ("name", "Big")],
            ),
            feature(point(1.0, 95.0), &[("golf", "course"), ("name", "Off")]),
        ];
        let (records, tally) = extractor(&classifier).extract(features);
        assert_eq!(
            records.iter().map(|x| x.label.as_str()).collect::<Vec<_>>(),
            vec!["A", "Big"]
        );
        assert_eq!(records[1].rank, Rank::Way);
        assert!(records[1].area_m2 > 1_000_000.0);
        assert_eq!(
            tally,
            Tally {
                accepted: 2,
                unrelated: 1,
                rejected: 2,
                unnamed: 1,
                unresolved: 2,
            }
        );
    }
}
