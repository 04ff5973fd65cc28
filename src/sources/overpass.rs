use std::collections::BTreeMap;

use _model::OsmId;
use anyhow::{Context, Result};
use geo::Coord;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::geometry::{assemble_rings, Geometry, RawFeature};

/// Parses an Overpass JSON response (`out geom` or `out center`).
///
/// Elements that fail to deserialize are skipped and counted rather than
/// failing the whole response.
pub fn parse(json: &str) -> Result<(Vec<RawFeature>, usize)> {
    let response: OverpassResponse =
        serde_json::from_str(json).context("not an Overpass response")?;

    let mut features = Vec::new();
    let mut malformed = 0;
    for x in response.elements {
        match serde_json::from_value::<RawElement>(x) {
            Ok(x) => features.push(x.refine()),
            Err(e) => {
                debug!("skipping malformed element: {e}");
                malformed += 1;
            }
        }
    }
    Ok((features, malformed))
}

#[derive(Deserialize)]
struct OverpassResponse {
    elements: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum RawElement {
    Node {
        id: i64,
        lat: Option<f64>,
        lon: Option<f64>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Way {
        id: i64,
        #[serde(default)]
        geometry: Vec<Option<RawPosition>>,
        center: Option<RawPosition>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
    Relation {
        id: i64,
        #[serde(default)]
        members: Vec<RawMember>,
        center: Option<RawPosition>,
        #[serde(default)]
        tags: BTreeMap<String, String>,
    },
}

#[derive(Deserialize)]
struct RawMember {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: String,
    #[serde(default)]
    geometry: Vec<Option<RawPosition>>,
}

#[derive(Copy, Clone, Deserialize)]
struct RawPosition {
    lat: f64,
    lon: f64,
}

impl RawPosition {
    fn refine(self) -> Coord {
        Coord {
            x: self.lon,
            y: self.lat,
        }
    }
}

fn vertices(geometry: Vec<Option<RawPosition>>) -> Vec<Coord> {
    geometry.into_iter().flatten().map(RawPosition::refine).collect()
}

impl RawElement {
    /// Elements summarised only by a `center` become points: their shape
    /// is unknown, so they carry no area and rank as points.
    fn refine(self) -> RawFeature {
        match self {
            Self::Node { id, lat, lon, tags } => RawFeature {
                id: Some(OsmId::Node(id)),
                geometry: Geometry::Point(Coord {
                    x: lon.unwrap_or(f64::NAN),
                    y: lat.unwrap_or(f64::NAN),
                }),
                tags,
            },
            Self::Way {
                id,
                geometry,
                center,
                tags,
            } => {
                let vertices = vertices(geometry);
                RawFeature {
                    id: Some(OsmId::Way(id)),
                    geometry: match center {
                        Some(x) if vertices.is_empty() => Geometry::Point(x.refine()),
                        _ => Geometry::Way(vertices),
                    },
                    tags,
                }
            }
            Self::Relation {
                id,
                members,
                center,
                tags,
            } => {
                let rings = assemble_rings(
                    members
                        .into_iter()
                        .filter(|x| x.kind == "way" && matches!(x.role.as_str(), "outer" | ""))
                        .map(|x| vertices(x.geometry))
                        .collect(),
                );
                RawFeature {
                    id: Some(OsmId::Relation(id)),
                    geometry: match center {
                        Some(x) if rings.is_empty() => Geometry::Point(x.refine()),
                        _ => Geometry::MultiRing(rings),
                    },
                    tags,
                }
            }
        }
    }
}
