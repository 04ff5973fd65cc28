mod osm;
mod record;
mod region;

pub use osm::OsmId;
pub use record::{round5, CandidateRecord, CanonicalRecord, Rank};
pub use region::{Country, Region, UsState};
