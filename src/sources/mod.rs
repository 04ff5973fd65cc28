//! Readers turning source data into [`RawFeature`](crate::geometry::RawFeature)s.

pub mod overpass;
pub mod pbf;
