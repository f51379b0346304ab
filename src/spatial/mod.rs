//! Queryable facility set.
//!
//! Holds the records that survived the pipeline and answers region
//! (city / district) and distance (nearest, radius) queries. Distance
//! queries use geodesic distance on the WGS84 ellipsoid, with an R-tree
//! narrowing radius searches to a bounding box first.

mod engine;
mod index;

pub use engine::{geodesic_km, FacilitySet, Neighbor, RegionQuery};
pub use index::{FacilityIndex, IndexedFacility};
