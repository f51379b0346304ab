//! Facility record served to the presentation layer.

use serde::Serialize;

/// Geographic point on WGS84, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// `geo` works in (x = lon, y = lat)
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

/// Point in a projected legacy system, in metres (x = easting, y = northing)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Two-level region classification derived from the address text
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct RegionTokens {
    pub city: String,
    pub district: String,
}

/// A single queryable facility.
///
/// Only the pipeline constructs these, and only from an active row whose
/// coordinates projected successfully, so every record carries a location.
/// Fields are read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityRecord {
    source_index: usize,
    name: String,
    address: String,
    phone: String,
    category: String,
    specialty: String,
    status: String,
    planar: PlanarPoint,
    location: GeoPoint,
    region: RegionTokens,
}

/// Descriptive columns copied off a normalized row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FacilityText {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub category: String,
    pub specialty: String,
    pub status: String,
}

impl FacilityRecord {
    pub(crate) fn new(
        source_index: usize,
        text: FacilityText,
        planar: PlanarPoint,
        location: GeoPoint,
        region: RegionTokens,
    ) -> Self {
        Self {
            source_index,
            name: text.name,
            address: text.address,
            phone: text.phone,
            category: text.category,
            specialty: text.specialty,
            status: text.status,
            planar,
            location,
            region,
        }
    }

    /// Position of the originating raw row
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Facility-type label (hospital, clinic, ...)
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn specialty(&self) -> &str {
        &self.specialty
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Source coordinates in the legacy projected system
    pub fn planar(&self) -> PlanarPoint {
        self.planar
    }

    pub fn location(&self) -> GeoPoint {
        self.location
    }

    pub fn region(&self) -> &RegionTokens {
        &self.region
    }

    pub fn city(&self) -> &str {
        &self.region.city
    }

    pub fn district(&self) -> &str {
        &self.region.district
    }
}
