//! Medimap - medical facility registry pipeline and spatial queries.
//!
//! Loads a public registry export, keeps active facilities with geometry,
//! projects their legacy planar coordinates to WGS84 and serves region and
//! distance queries over the result.

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod projection;
pub mod spatial;

#[cfg(test)]
mod testing;

pub use cache::{CacheKey, SnapshotCache};
pub use config::{Config, PipelineConfig, SourceSchema};
pub use error::{LoadError, TransformError};
pub use loader::{CsvSource, RowSource, Snapshot};
pub use models::{FacilityRecord, GeoPoint, PlanarPoint, RawRow, RegionTokens};
pub use projection::CrsPreset;
pub use spatial::{FacilitySet, Neighbor, RegionQuery};
