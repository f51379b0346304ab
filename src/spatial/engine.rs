//! The queryable facility set and its region and distance queries.

use std::collections::BTreeSet;

use geo::{Distance, Geodesic};
use hashbrown::HashMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use super::FacilityIndex;
use crate::config::PipelineConfig;
use crate::models::{FacilityRecord, GeoPoint, RawRow};
use crate::pipeline::{self, PipelineReport};

/// A record paired with its geodesic distance from a query origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor<'a> {
    pub record: &'a FacilityRecord,
    pub distance_km: f64,
}

/// Answer to a region filter.
///
/// `NoData` is a real answer ("nothing registered here"), distinct from not
/// having asked yet, which callers model as the absence of a `RegionQuery`.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionQuery<'a> {
    Matches(Vec<&'a FacilityRecord>),
    NoData { city: String, district: String },
}

impl<'a> RegionQuery<'a> {
    pub fn records(&self) -> &[&'a FacilityRecord] {
        match self {
            RegionQuery::Matches(records) => records,
            RegionQuery::NoData { .. } => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }
}

/// Geodesic (WGS84 ellipsoid) distance in kilometres
pub fn geodesic_km(a: GeoPoint, b: GeoPoint) -> f64 {
    Geodesic.distance(a.to_point(), b.to_point()) / 1000.0
}

fn valid_origin(origin: GeoPoint) -> bool {
    origin.lat.is_finite()
        && origin.lon.is_finite()
        && (-90.0..=90.0).contains(&origin.lat)
        && (-180.0..=180.0).contains(&origin.lon)
}

/// Immutable, fully built record set. Cheap to share behind an `Arc`;
/// readers never need a lock.
#[derive(Debug, Clone)]
pub struct FacilitySet {
    records: Vec<FacilityRecord>,
    /// source_index -> slot in `records`
    slots: HashMap<usize, usize>,
    index: FacilityIndex,
    report: PipelineReport,
}

impl FacilitySet {
    /// Run the pipeline over loaded rows and index the survivors.
    pub fn build(rows: &[RawRow], config: &PipelineConfig) -> Self {
        let (records, report) = pipeline::run(rows, config);
        Self::from_parts(records, report)
    }

    fn from_parts(records: Vec<FacilityRecord>, report: PipelineReport) -> Self {
        let index = FacilityIndex::build(&records);
        let mut slots = HashMap::with_capacity(records.len());
        for (slot, record) in records.iter().enumerate() {
            slots.entry(record.source_index()).or_insert(slot);
        }
        Self {
            records,
            slots,
            index,
            report,
        }
    }

    /// Records in source order
    pub fn records(&self) -> &[FacilityRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Diagnostics from the run that produced this set
    pub fn report(&self) -> &PipelineReport {
        &self.report
    }

    /// Look up a record by the index of the raw row it came from. With
    /// duplicate indices the first record wins.
    pub fn get(&self, source_index: usize) -> Option<&FacilityRecord> {
        self.slots.get(&source_index).map(|&slot| &self.records[slot])
    }

    /// Sorted, de-duplicated city names. An empty name is listed when some
    /// address had no tokens, so every record stays reachable.
    pub fn distinct_cities(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(FacilityRecord::city)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Sorted district names among records in `city` (exact match),
    /// including `""` for single-token addresses.
    pub fn distinct_districts(&self, city: &str) -> Vec<&str> {
        self.records
            .iter()
            .filter(|r| r.city() == city)
            .map(FacilityRecord::district)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Records whose city and district equal the arguments exactly
    /// (case-sensitive), in source order.
    pub fn region_filter(&self, city: &str, district: &str) -> RegionQuery<'_> {
        let matches: Vec<&FacilityRecord> = self
            .records
            .iter()
            .filter(|r| r.city() == city && r.district() == district)
            .collect();

        debug!("Region {} {}: {} records", city, district, matches.len());

        if matches.is_empty() {
            RegionQuery::NoData {
                city: city.to_string(),
                district: district.to_string(),
            }
        } else {
            RegionQuery::Matches(matches)
        }
    }

    /// Mean position of a region's records, used to centre a map on it
    pub fn region_center(&self, city: &str, district: &str) -> Option<GeoPoint> {
        let query = self.region_filter(city, district);
        let records = query.records();
        if records.is_empty() {
            return None;
        }
        let n = records.len() as f64;
        let (lat, lon) = records.iter().fold((0.0, 0.0), |(lat, lon), r| {
            let p = r.location();
            (lat + p.lat, lon + p.lon)
        });
        Some(GeoPoint::new(lat / n, lon / n))
    }

    /// Every record with its distance from `origin`, in source order
    fn distances(&self, origin: GeoPoint) -> Vec<Neighbor<'_>> {
        self.records
            .par_iter()
            .map(|record| Neighbor {
                record,
                distance_km: geodesic_km(origin, record.location()),
            })
            .collect()
    }

    /// The `k` closest records by geodesic distance, nearest first.
    ///
    /// Ties keep source order. `k == 0` gives an empty result and `k` past
    /// the set size gives the whole set. An origin that is not a valid
    /// latitude/longitude also gives an empty result.
    pub fn nearest_k(&self, origin: GeoPoint, k: usize) -> Vec<Neighbor<'_>> {
        if k == 0 || self.records.is_empty() {
            return Vec::new();
        }
        if !valid_origin(origin) {
            warn!("Ignoring nearest query from invalid origin {:?}", origin);
            return Vec::new();
        }

        let mut neighbors = self.distances(origin);
        // stable: equal distances stay in source order
        neighbors.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        neighbors.truncate(k);
        neighbors
    }

    /// Every record within `radius_km` of `origin`, nearest first.
    pub fn within_radius(&self, origin: GeoPoint, radius_km: f64) -> Vec<Neighbor<'_>> {
        if !valid_origin(origin) || !radius_km.is_finite() || radius_km < 0.0 {
            warn!(
                "Ignoring radius query ({:?}, {} km) with invalid arguments",
                origin, radius_km
            );
            return Vec::new();
        }

        let mut candidates = self.index.candidates_within(origin, radius_km);
        candidates.sort_unstable();

        let mut neighbors: Vec<Neighbor<'_>> = candidates
            .into_par_iter()
            .map(|slot| {
                let record = &self.records[slot];
                Neighbor {
                    record,
                    distance_km: geodesic_km(origin, record.location()),
                }
            })
            .filter(|n| n.distance_km <= radius_km)
            .collect();

        neighbors.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRow;
    use crate::testing::{english_config, facility, registry};

    fn set() -> FacilitySet {
        FacilitySet::build(&registry(), &english_config())
    }

    fn names<'a>(records: impl IntoIterator<Item = &'a FacilityRecord>) -> Vec<&'a str> {
        records.into_iter().map(FacilityRecord::name).collect()
    }

    #[test]
    fn test_distinct_cities_sorted() {
        assert_eq!(set().distinct_cities(), vec!["Busan", "Sejong", "Seoul"]);
    }

    #[test]
    fn test_distinct_districts() {
        let set = set();
        assert_eq!(
            set.distinct_districts("Seoul"),
            vec!["Gangnam", "Jongno", "Seocho"]
        );
        assert_eq!(set.distinct_districts("Busan"), vec!["Busanjin", "Haeundae"]);
        // single-token address is still selectable through its empty district
        assert_eq!(set.distinct_districts("Sejong"), vec![""]);
        assert!(set.distinct_districts("seoul").is_empty());
    }

    #[test]
    fn test_every_record_reachable_through_region_lists() {
        let mut rows = registry();
        rows.push(facility(7, "Nowhere Clinic", "", 210_000.0, 440_000.0));
        let set = FacilitySet::build(&rows, &english_config());

        assert_eq!(set.distinct_cities(), vec!["", "Busan", "Sejong", "Seoul"]);
        let mut reached = 0;
        for city in set.distinct_cities() {
            for district in set.distinct_districts(city) {
                reached += set.region_filter(city, district).len();
            }
        }
        assert_eq!(reached, set.len());
    }

    #[test]
    fn test_region_filter_exact() {
        let set = set();
        let query = set.region_filter("Seoul", "Gangnam");
        assert_eq!(names(query.records().iter().copied()), vec!["Gangnam Clinic", "Gangnam Dental"]);
        assert!(!query.is_empty());

        for r in query.records() {
            assert_eq!(r.city(), "Seoul");
            assert_eq!(r.district(), "Gangnam");
        }
    }

    #[test]
    fn test_region_filter_no_partial_or_case_match() {
        let set = set();
        assert!(set.region_filter("seoul", "gangnam").is_empty());
        assert!(set.region_filter("Seoul", "Gang").is_empty());
        assert_eq!(
            set.region_filter("Daegu", "Jung"),
            RegionQuery::NoData {
                city: "Daegu".into(),
                district: "Jung".into()
            }
        );
    }

    #[test]
    fn test_region_filter_empty_district() {
        let set = set();
        assert_eq!(names(set.region_filter("Sejong", "").records().iter().copied()), vec!["Sejong Clinic"]);
    }

    #[test]
    fn test_region_center() {
        let set = set();
        let center = set.region_center("Seoul", "Gangnam").unwrap();
        let a = set.get(0).unwrap().location();
        let b = set.get(2).unwrap().location();
        assert!((center.lat - (a.lat + b.lat) / 2.0).abs() < 1e-12);
        assert!((center.lon - (a.lon + b.lon) / 2.0).abs() < 1e-12);
        assert!(set.region_center("Daegu", "Jung").is_none());
    }

    #[test]
    fn test_nearest_length_and_order() {
        let set = set();
        let origin = GeoPoint::new(37.50, 127.03);
        for k in [0, 1, 3, set.len(), set.len() + 5] {
            let result = set.nearest_k(origin, k);
            assert_eq!(result.len(), k.min(set.len()));
            for pair in result.windows(2) {
                assert!(pair[0].distance_km <= pair[1].distance_km);
            }
        }
    }

    #[test]
    fn test_nearest_one_is_global_argmin() {
        let set = set();
        for origin in [
            GeoPoint::new(37.50, 127.03),
            GeoPoint::new(35.16, 129.16),
            GeoPoint::new(36.48, 127.29),
        ] {
            let best = set
                .records()
                .iter()
                .min_by(|a, b| {
                    geodesic_km(origin, a.location()).total_cmp(&geodesic_km(origin, b.location()))
                })
                .unwrap();
            let result = set.nearest_k(origin, 1);
            assert_eq!(result[0].record.source_index(), best.source_index());
        }
    }

    #[test]
    fn test_nearest_busan() {
        let set = set();
        let result = set.nearest_k(GeoPoint::new(35.16, 129.16), 2);
        assert_eq!(names(result.iter().map(|n| n.record)), vec!["Haeundae Medical", "Busanjin Clinic"]);
        // Seoul is roughly 325 km away
        let seoul = set.nearest_k(GeoPoint::new(35.16, 129.16), set.len());
        let last = seoul.last().unwrap();
        assert!(last.distance_km > 250.0 && last.distance_km < 400.0);
    }

    #[test]
    fn test_nearest_ties_keep_source_order() {
        let rows = vec![
            facility(0, "First", "Seoul Gangnam", 203_000.0, 444_000.0),
            facility(1, "Second", "Seoul Gangnam", 203_000.0, 444_000.0),
            facility(2, "Third", "Seoul Gangnam", 203_000.0, 444_000.0),
        ];
        let set = FacilitySet::build(&rows, &english_config());
        let result = set.nearest_k(GeoPoint::new(37.0, 127.0), 3);
        assert_eq!(names(result.iter().map(|n| n.record)), vec!["First", "Second", "Third"]);
    }

    #[test]
    fn test_nearest_rejects_invalid_origin() {
        let set = set();
        assert!(set.nearest_k(GeoPoint::new(f64::NAN, 127.0), 3).is_empty());
        assert!(set.nearest_k(GeoPoint::new(91.0, 127.0), 3).is_empty());
    }

    #[test]
    fn test_nearest_on_empty_set() {
        let set = FacilitySet::build(&[], &english_config());
        assert!(set.nearest_k(GeoPoint::new(37.0, 127.0), 5).is_empty());
        assert!(set.distinct_cities().is_empty());
    }

    #[test]
    fn test_within_radius_matches_brute_force() {
        let set = set();
        let origin = GeoPoint::new(37.50, 127.03);
        for radius in [0.5, 2.0, 5.0, 20.0, 500.0] {
            let got: Vec<usize> = set
                .within_radius(origin, radius)
                .iter()
                .map(|n| n.record.source_index())
                .collect();
            let expected: Vec<usize> = set
                .nearest_k(origin, set.len())
                .iter()
                .filter(|n| n.distance_km <= radius)
                .map(|n| n.record.source_index())
                .collect();
            assert_eq!(got, expected, "radius {radius}");
        }
    }

    #[test]
    fn test_get_with_unordered_source_indices() {
        let rows = vec![
            facility(30, "A", "Seoul Gangnam", 203_000.0, 444_000.0),
            facility(10, "B", "Seoul Seocho", 199_500.0, 443_000.0),
            facility(20, "C", "Seoul Jongno", 198_000.0, 453_000.0),
        ];
        let set = FacilitySet::build(&rows, &english_config());

        assert_eq!(set.get(30).map(FacilityRecord::name), Some("A"));
        assert_eq!(set.get(10).map(FacilityRecord::name), Some("B"));
        assert_eq!(set.get(20).map(FacilityRecord::name), Some("C"));
        assert!(set.get(0).is_none());
    }

    #[test]
    fn test_region_query_emptiness_follows_records() {
        let set = set();
        let empty = RegionQuery::Matches(Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
        assert!(set.region_filter("Daegu", "Jung").is_empty());
        assert!(!set.region_filter("Seoul", "Jongno").is_empty());
    }

    #[test]
    fn test_get_by_source_index() {
        let mut rows = registry();
        rows.insert(1, RawRow::new(99));
        for (i, row) in rows.iter_mut().enumerate() {
            row.index = i;
        }
        let set = FacilitySet::build(&rows, &english_config());
        assert!(set.get(1).is_none());
        assert_eq!(set.get(2).unwrap().name(), "Seocho Hospital");
    }
}
