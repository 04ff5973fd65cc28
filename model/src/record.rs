use geo::Point;
use serde::{Deserialize, Serialize};
use serde_repr::{Deserialize_repr, Serialize_repr};

/// How precisely a feature's geometry was captured.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize_repr, Deserialize_repr,
)]
#[repr(u8)]
pub enum Rank {
    Point = 1,
    Way = 2,
    Relation = 3,
}

/// Output coordinates carry five decimals (about a metre).
pub fn round5(x: f64) -> f64 {
    (x * 1e5).round() / 1e5
}

/// A classified, located course awaiting deduplication.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    pub rank: Rank,
    pub area_m2: f64,
    pub meta: String,
}

impl CandidateRecord {
    /// Trims the label and rounds the coordinates. Returns `None` for an
    /// empty label or a position outside WGS84 bounds.
    pub fn new(
        label: &str,
        lat: f64,
        lon: f64,
        rank: Rank,
        area_m2: f64,
        meta: &str,
    ) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }

        let (lat, lon) = (round5(lat), round5(lon));
        if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
            return None;
        }

        Some(Self {
            label: label.to_string(),
            lat,
            lon,
            rank,
            area_m2: if area_m2.is_finite() { area_m2.max(0.0) } else { 0.0 },
            meta: meta.trim().to_string(),
        })
    }

    pub fn point(&self) -> Point {
        Point::new(self.lon, self.lat)
    }
}

/// Final `[label, lat, lon, meta]` row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "CanonicalRow", into = "CanonicalRow")]
pub struct CanonicalRecord {
    pub label: String,
    pub lat: f64,
    pub lon: f64,
    pub meta: String,
}

type CanonicalRow = (String, f64, f64, String);

impl From<CanonicalRow> for CanonicalRecord {
    fn from((label, lat, lon, meta): CanonicalRow) -> Self {
        Self {
            label,
            lat,
            lon,
            meta,
        }
    }
}

impl From<CanonicalRecord> for CanonicalRow {
    fn from(x: CanonicalRecord) -> Self {
        (x.label, x.lat, x.lon, x.meta)
    }
}

impl From<CandidateRecord> for CanonicalRecord {
    fn from(x: CandidateRecord) -> Self {
        Self {
            label: x.label,
            lat: x.lat,
            lon: x.lon,
            meta: x.meta,
        }
    }
}

impl CandidateRecord {
    /// Re-deduplicating published rows: their geometry provenance is gone,
    /// so they all count as points. Rows that would not pass [`Self::new`]
    /// are `None`.
    pub fn from_canonical(x: &CanonicalRecord) -> Option<Self> {
        Self::new(&x.label, x.lat, x.lon, Rank::Point, 0.0, &x.meta)
    }
}
