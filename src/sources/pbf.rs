use std::{collections::BTreeMap, fs::File, path::Path};

use _model::OsmId;
use anyhow::{Context, Result};
use geo::Coord;
use osmpbfreader::{NodeId, OsmId as PbfId, OsmObj, OsmPbfReader, Ref, Tags};

use crate::geometry::{assemble_rings, Geometry, RawFeature};

/// Cheap prefilter applied to every object in the extract; the classifier
/// makes the real decision later.
fn mentions_golf(tags: &Tags) -> bool {
    tags.iter().any(|(k, v)| match k.as_str() {
        "golf" => true,
        "leisure" | "sport" => v.contains("golf"),
        _ => false,
    })
}

/// Reads every golf-tagged node, way and relation from a PBF extract,
/// along with the nodes and member ways needed to place them.
pub fn read(path: &Path) -> Result<Vec<RawFeature>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut pbf = OsmPbfReader::new(file);
    let objs = pbf
        .get_objs_and_deps(|obj| mentions_golf(obj.tags()))
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(features(&objs))
}

fn features(objs: &BTreeMap<PbfId, OsmObj>) -> Vec<RawFeature> {
    objs.values()
        .filter(|obj| mentions_golf(obj.tags()))
        .map(|obj| RawFeature {
            id: Some(id(obj.id())),
            geometry: match obj {
                OsmObj::Node(x) => Geometry::Point(Coord {
                    x: x.lon(),
                    y: x.lat(),
                }),
                OsmObj::Way(x) => Geometry::Way(vertices(objs, &x.nodes)),
                OsmObj::Relation(x) => Geometry::MultiRing(rings(objs, &x.refs)),
            },
            tags: obj
                .tags()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        })
        .collect()
}

/// Nodes missing from the extract are skipped.
fn vertices(objs: &BTreeMap<PbfId, OsmObj>, nodes: &[NodeId]) -> Vec<Coord> {
    nodes
        .iter()
        .filter_map(|x| match objs.get(&PbfId::Node(*x)) {
            Some(OsmObj::Node(n)) => Some(Coord {
                x: n.lon(),
                y: n.lat(),
            }),
            _ => None,
        })
        .collect()
}

fn rings(objs: &BTreeMap<PbfId, OsmObj>, refs: &[Ref]) -> Vec<Vec<Coord>> {
    assemble_rings(
        refs.iter()
            .filter(|x| matches!(x.role.as_str(), "outer" | ""))
            .filter_map(|x| match objs.get(&x.member) {
                Some(OsmObj::Way(w)) => Some(vertices(objs, &w.nodes)),
                _ => None,
            })
            .collect(),
    )
}

fn id(x: PbfId) -> OsmId {
    match x {
        PbfId::Node(x) => OsmId::Node(x.0),
        PbfId::Way(x) => OsmId::Way(x.0),
        PbfId::Relation(x) => OsmId::Relation(x.0),
    }
}
