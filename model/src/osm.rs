use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type", content = "id")]
pub enum OsmId {
    Node(i64),
    Way(i64),
    Relation(i64),
}

impl OsmId {
    pub fn link(&self) -> String {
        format!("https://www.openstreetmap.org/{self}")
    }
}

impl fmt::Display for OsmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(x) => write!(f, "node/{x}"),
            Self::Way(x) => write!(f, "way/{x}"),
            Self::Relation(x) => write!(f, "relation/{x}"),
        }
    }
}
