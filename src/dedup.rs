//! Merging records that describe the same course.

use std::{cmp::Ordering, collections::BTreeMap};

use _model::{CandidateRecord, CanonicalRecord};
use anyhow::{bail, Result};
use clap::ValueEnum;
use geo::HaversineDistance;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    canonical::{normalize_key, similarity},
    grid::Grid,
};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Policy {
    /// Fuzzy name match within a tight radius, in source order.
    #[serde(alias = "a")]
    #[value(alias = "a")]
    Proximity,
    /// Exact name groups, best geometry first, within a loose radius.
    #[serde(alias = "b")]
    #[value(alias = "b")]
    Ranked,
    /// `ranked`, then `proximity` over its survivors in quality order.
    #[default]
    Unified,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dedup {
    pub policy: Policy,
    /// metres, inclusive
    pub proximity_radius_m: f64,
    /// metres, inclusive
    pub cluster_radius_m: f64,
    /// inclusive
    pub similarity_threshold: f64,
    pub cell_size_deg: f64,
}

impl Default for Dedup {
    fn default() -> Self {
        Self {
            policy: Policy::Unified,
            proximity_radius_m: 150.0,
            cluster_radius_m: 1000.0,
            similarity_threshold: 0.88,
            cell_size_deg: 0.002,
        }
    }
}

/// Finer cells than this (about a metre) only make neighbour scans slower.
const MIN_CELL_DEG: f64 = 1e-5;

impl Dedup {
    /// Rejects settings the merges cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size_deg.is_finite() && self.cell_size_deg >= MIN_CELL_DEG) {
            bail!(
                "cell_size_deg must be at least {MIN_CELL_DEG}, got {}",
                self.cell_size_deg
            );
        }
        for (name, radius) in [
            ("proximity_radius_m", self.proximity_radius_m),
            ("cluster_radius_m", self.cluster_radius_m),
        ] {
            if !(radius.is_finite() && radius >= 0.0) {
                bail!("{name} must be a finite distance, got {radius}");
            }
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            bail!(
                "similarity_threshold must be within 0..=1, got {}",
                self.similarity_threshold
            );
        }
        Ok(())
    }

    /// Deduplicates one batch and returns it sorted by lowercased label.
    pub fn run(&self, records: Vec<CandidateRecord>) -> Vec<CanonicalRecord> {
        let before = records.len();
        let survivors = match self.policy {
            Policy::Proximity => self.proximity_merge(records),
            Policy::Ranked => self.rank_merge(records),
            Policy::Unified => {
                let mut ranked = self.rank_merge(records);
                ranked.sort_by(by_quality);
                self.proximity_merge(ranked)
            }
        };
        debug!(
            policy = ?self.policy,
            before,
            after = survivors.len(),
            "deduplicated"
        );
        canonicalize(survivors)
    }

    /// Absorbs each record into the first earlier survivor that is both
    /// within `proximity_radius_m` and similarly named. Absorbing only
    /// fills in a missing `meta`.
    pub fn proximity_merge(&self, records: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
        let mut grid = Grid::new(self.cell_size_deg);
        let mut survivors: Vec<CandidateRecord> = Vec::new();
        let mut keys: Vec<String> = Vec::new();

        for record in records {
            let key = normalize_key(&record.label);
            let point = record.point();
            let absorber = grid
                .within(record.lat, record.lon, self.proximity_radius_m)
                .into_iter()
                .filter(|&i| {
                    point.haversine_distance(&survivors[i].point()) <= self.proximity_radius_m
                        && similarity(&key, &keys[i]) >= self.similarity_threshold
                })
                .min();

            match absorber {
                Some(i) => absorb_meta(&mut survivors[i], record),
                None => {
                    grid.insert(record.lat, record.lon, survivors.len());
                    survivors.push(record);
                    keys.push(key);
                }
            }
        }

        survivors
    }

    /// Clusters records sharing an exact key within `cluster_radius_m`,
    /// keeping the higher rank, then the larger area.
    pub fn rank_merge(&self, records: Vec<CandidateRecord>) -> Vec<CandidateRecord> {
        let mut groups: BTreeMap<String, Vec<CandidateRecord>> = BTreeMap::new();
        for record in records {
            groups
                .entry(normalize_key(&record.label))
                .or_default()
                .push(record);
        }

        let mut survivors = Vec::new();
        for (_, mut group) in groups {
            group.sort_by(by_quality);

            let mut clusters: Vec<CandidateRecord> = Vec::new();
            for record in group {
                let point = record.point();
                let cluster = clusters.iter_mut().find(|x| {
                    point.haversine_distance(&x.point()) <= self.cluster_radius_m
                });
                match cluster {
                    Some(x) => {
                        if outranks(&record, x) {
                            let old = std::mem::replace(x, record);
                            absorb_meta(x, old);
                        } else {
                            absorb_meta(x, record);
                        }
                    }
                    None => clusters.push(record),
                }
            }
            survivors.extend(clusters);
        }

        survivors
    }
}

fn absorb_meta(survivor: &mut CandidateRecord, other: CandidateRecord) {
    if survivor.meta.is_empty() && !other.meta.is_empty() {
        survivor.meta = other.meta;
    }
}

fn outranks(a: &CandidateRecord, b: &CandidateRecord) -> bool {
    (a.rank, a.area_m2) > (b.rank, b.area_m2)
}

/// Best geometry first, then a total order on everything else so that
/// equal inputs always come out the same way.
fn by_quality(a: &CandidateRecord, b: &CandidateRecord) -> Ordering {
    b.rank
        .cmp(&a.rank)
        .then(b.area_m2.total_cmp(&a.area_m2))
        .then_with(|| by_label(a, b))
}

fn by_label(a: &CandidateRecord, b: &CandidateRecord) -> Ordering {
    a.label
        .to_lowercase()
        .cmp(&b.label.to_lowercase())
        .then_with(|| a.label.cmp(&b.label))
        .then(a.lat.total_cmp(&b.lat))
        .then(a.lon.total_cmp(&b.lon))
        .then_with(|| a.meta.cmp(&b.meta))
}

/// Drops the resolution-only fields and sorts by lowercased label.
pub fn canonicalize(mut survivors: Vec<CandidateRecord>) -> Vec<CanonicalRecord> {
    survivors.sort_by(by_label);
    survivors.into_iter().map(CanonicalRecord::from).collect()
}
