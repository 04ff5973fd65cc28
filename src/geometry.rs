//! Representative points and approximate areas for raw features.

use std::collections::BTreeMap;

use _model::OsmId;
use geo::{Area, Centroid, Coord, LineString, Point, Polygon};

/// Mean earth radius used by the local projection, in metres.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Rings with less projected area than this are treated as collapsed.
const DEGENERATE_AREA_M2: f64 = 1e-3;

/// Vertex coordinates are `x = longitude`, `y = latitude`.
#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Point(Coord),
    Way(Vec<Coord>),
    MultiRing(Vec<Vec<Coord>>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GeometryKind {
    Point,
    OpenLine,
    ClosedRing,
    MultiRing,
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Point(_) => GeometryKind::Point,
            Self::Way(x) if is_closed(x) => GeometryKind::ClosedRing,
            Self::Way(_) => GeometryKind::OpenLine,
            Self::MultiRing(_) => GeometryKind::MultiRing,
        }
    }
}

/// One source element: where it is and how it is tagged.
#[derive(Clone, Debug)]
pub struct RawFeature {
    pub id: Option<OsmId>,
    pub geometry: Geometry,
    pub tags: BTreeMap<String, String>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Resolved {
    pub point: Point,
    pub area_m2: f64,
}

impl Resolved {
    fn new(c: Coord, area_m2: f64) -> Option<Self> {
        if c.x.is_finite() && c.y.is_finite() {
            Some(Self {
                point: c.into(),
                area_m2,
            })
        } else {
            None
        }
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }
}

/// Reduces a geometry to one point and an area in square metres.
///
/// Returns `None` when nothing finite can be placed, which callers count
/// as an excluded feature rather than an error.
pub fn resolve(geometry: &Geometry) -> Option<Resolved> {
    match geometry {
        Geometry::Point(c) => Resolved::new(*c, 0.0),
        Geometry::Way(vertices) if is_closed(vertices) => match ring(vertices) {
            Some(x) => Resolved::new(x.centroid, x.area_m2),
            None => Resolved::new(mean(distinct(vertices))?, 0.0),
        },
        Geometry::Way(vertices) => Resolved::new(mean(vertices)?, 0.0),
        Geometry::MultiRing(rings) => multi_ring(rings),
    }
}

fn multi_ring(rings: &[Vec<Coord>]) -> Option<Resolved> {
    let mut largest: Option<Ring> = None;
    let mut total = 0.0;
    for x in rings.iter().filter(|x| is_closed(x)).filter_map(|x| ring(x)) {
        total += x.area_m2;
        // first ring wins a tie
        if largest.map_or(true, |l| x.area_m2 > l.area_m2) {
            largest = Some(x);
        }
    }

    match largest {
        Some(x) => Resolved::new(x.centroid, total),
        None => {
            let first = rings
                .iter()
                .flatten()
                .find(|c| c.x.is_finite() && c.y.is_finite())?;
            Resolved::new(*first, 0.0)
        }
    }
}

/// Stitches the outer member ways of a multipolygon into rings, in member
/// order. Chains that never close are kept so they can still supply a
/// fallback vertex.
pub fn assemble_rings(segments: Vec<Vec<Coord>>) -> Vec<Vec<Coord>> {
    let mut pending: Vec<_> = segments.into_iter().filter(|x| !x.is_empty()).collect();
    let mut rings = Vec::new();
    while !pending.is_empty() {
        let mut chain = pending.remove(0);
        while !is_closed(&chain) {
            let Some(&end) = chain.last() else { break };
            let Some(i) = pending
                .iter()
                .position(|x| x.first() == Some(&end) || x.last() == Some(&end))
            else {
                break;
            };
            let mut next = pending.remove(i);
            if next.first() != Some(&end) {
                next.reverse();
            }
            chain.extend(next.into_iter().skip(1));
        }
        rings.push(chain);
    }
    rings
}

fn is_closed(vertices: &[Coord]) -> bool {
    vertices.len() >= 4 && vertices.first() == vertices.last()
}

/// A closed ring without its repeated closing vertex.
fn distinct(vertices: &[Coord]) -> &[Coord] {
    &vertices[..vertices.len() - 1]
}

fn mean(vertices: &[Coord]) -> Option<Coord> {
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f64;
    let sum = vertices
        .iter()
        .fold(Coord { x: 0.0, y: 0.0 }, |acc, c| acc + *c);
    Some(Coord {
        x: sum.x / n,
        y: sum.y / n,
    })
}

#[derive(Copy, Clone, Debug)]
struct Ring {
    centroid: Coord,
    area_m2: f64,
}

/// Area-weighted centroid of a closed ring, or `None` when the ring has
/// collapsed to (numerically) zero area.
fn ring(vertices: &[Coord]) -> Option<Ring> {
    let projection = Projection::centered(distinct(vertices))?;
    let exterior: LineString = vertices.iter().map(|c| projection.forward(*c)).collect();
    let polygon = Polygon::new(exterior, vec![]);

    let area_m2 = polygon.signed_area().abs();
    if !(area_m2 >= DEGENERATE_AREA_M2) {
        return None;
    }

    let centroid = projection.inverse(polygon.centroid()?.0);
    Some(Ring { centroid, area_m2 })
}

/// Equirectangular projection onto a plane tangent at the vertex mean.
struct Projection {
    origin: Coord,
    cos_lat: f64,
}

impl Projection {
    fn centered(vertices: &[Coord]) -> Option<Self> {
        let origin = mean(vertices)?;
        Some(Self {
            origin,
            cos_lat: origin.y.to_radians().cos(),
        })
    }

    fn forward(&self, c: Coord) -> Coord {
        Coord {
            x: EARTH_RADIUS_M * (c.x - self.origin.x).to_radians() * self.cos_lat,
            y: EARTH_RADIUS_M * (c.y - self.origin.y).to_radians(),
        }
    }

    fn inverse(&self, c: Coord) -> Coord {
        Coord {
            x: self.origin.x + (c.x / (EARTH_RADIUS_M * self.cos_lat)).to_degrees(),
            y: self.origin.y + (c.y / EARTH_RADIUS_M).to_degrees(),
        }
    }
}
