//! R-tree over facility locations for envelope pre-selection.

use rstar::{RTree, RTreeObject, AABB};
use tracing::debug;

use crate::models::{FacilityRecord, GeoPoint};

/// Approximate lower bound on the length of one degree of latitude, km.
/// Smaller than the true minimum (~110.57 km) so boxes err on the wide side.
const KM_PER_DEG_LAT: f64 = 110.0;
/// Same for one degree of longitude at the equator
const KM_PER_DEG_LON: f64 = 111.0;

/// Wrapper for R-tree indexing of a record position (x = lon, y = lat)
#[derive(Debug, Clone, Copy)]
pub struct IndexedFacility {
    /// Position of the record in its [`FacilitySet`](super::FacilitySet)
    pub slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedFacility {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Spatial index for facility locations using R-tree
#[derive(Debug, Clone)]
pub struct FacilityIndex {
    tree: RTree<IndexedFacility>,
}

impl FacilityIndex {
    pub fn build(records: &[FacilityRecord]) -> Self {
        let indexed: Vec<IndexedFacility> = records
            .iter()
            .enumerate()
            .map(|(slot, record)| {
                let p = record.location();
                IndexedFacility {
                    slot,
                    envelope: AABB::from_point([p.lon, p.lat]),
                }
            })
            .collect();

        let tree = RTree::bulk_load(indexed);
        debug!("Facility index built with {} entries", tree.size());

        Self { tree }
    }

    /// Slots of every record inside a lat/lon box that is guaranteed to
    /// contain the geodesic disc of `radius_km` around `origin`.
    /// Order is unspecified.
    pub fn candidates_within(&self, origin: GeoPoint, radius_km: f64) -> Vec<usize> {
        let (lower, upper) = bounding_box(origin, radius_km);
        self.tree
            .locate_in_envelope(&AABB::from_corners(lower, upper))
            .map(|f| f.slot)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

/// Conservative [lon, lat] corners around a disc. Falls back to the full
/// longitude range near the poles and across the antimeridian.
fn bounding_box(origin: GeoPoint, radius_km: f64) -> ([f64; 2], [f64; 2]) {
    let dlat = radius_km / KM_PER_DEG_LAT;
    let min_lat = (origin.lat - dlat).max(-90.0);
    let max_lat = (origin.lat + dlat).min(90.0);

    let widest = min_lat.abs().max(max_lat.abs());
    let full = ([-180.0, min_lat], [180.0, max_lat]);
    if widest >= 89.0 {
        return full;
    }

    let dlon = radius_km / (KM_PER_DEG_LON * widest.to_radians().cos());
    let (min_lon, max_lon) = (origin.lon - dlon, origin.lon + dlon);
    if min_lon < -180.0 || max_lon > 180.0 {
        return full;
    }

    ([min_lon, min_lat], [max_lon, max_lat])
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Destination, Distance, Geodesic};

    #[test]
    fn test_box_contains_disc_edge() {
        let origin = GeoPoint::new(37.5, 127.0);
        let (lower, upper) = bounding_box(origin, 10.0);

        // Points exactly 10 km away due north and due east must be inside
        for bearing in [0.0, 90.0, 180.0, 270.0] {
            let edge = Geodesic.destination(origin.to_point(), bearing, 10_000.0);
            assert!(edge.x() >= lower[0] && edge.x() <= upper[0], "bearing {bearing}");
            assert!(edge.y() >= lower[1] && edge.y() <= upper[1], "bearing {bearing}");
            let d = Geodesic.distance(origin.to_point(), edge);
            assert!((d - 10_000.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_polar_box_spans_all_longitudes() {
        let (lower, upper) = bounding_box(GeoPoint::new(89.5, 10.0), 100.0);
        assert_eq!(lower[0], -180.0);
        assert_eq!(upper[0], 180.0);
        assert_eq!(upper[1], 90.0);
    }

    #[test]
    fn test_empty_index() {
        let index = FacilityIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index
            .candidates_within(GeoPoint::new(37.5, 127.0), 10.0)
            .is_empty());
    }
}
