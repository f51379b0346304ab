//! Core data models for the facility pipeline.

pub mod facility;
pub mod row;

pub use facility::{FacilityRecord, GeoPoint, PlanarPoint, RegionTokens};
pub use row::{NormalizedRow, RawRow};
