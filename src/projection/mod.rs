//! Legacy planar coordinate systems and their mapping to WGS84.
//!
//! Every supported system is a Transverse Mercator belt, optionally on a
//! non-WGS84 datum reached through a seven-parameter Helmert shift. The
//! projection math itself is `proj4rs`; this module fixes the definitions
//! and checks results against the area of use.

use std::fmt;

use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::models::{GeoPoint, PlanarPoint};

/// A projected point must survive forward re-projection within this many
/// metres, otherwise the projection was evaluated outside its valid range.
const DOMAIN_TOLERANCE_M: f64 = 1.0;

/// Korean 1985 to WGS84, position-vector convention
const KOREAN_1985_TOWGS84: &str = "+towgs84=-115.80,474.99,674.11,1.16,-2.31,-1.63,6.43";

/// Named legacy systems the registry exports are known to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrsPreset {
    /// Korean 1985 / Modified Central Belt
    #[default]
    Epsg5174,
    /// Korean 1985 / Central Belt
    Epsg2097,
    /// Korea 2000 / Central Belt 2010
    Epsg5186,
}

impl CrsPreset {
    pub fn all() -> &'static [CrsPreset] {
        &[CrsPreset::Epsg5174, CrsPreset::Epsg2097, CrsPreset::Epsg5186]
    }

    pub fn code(&self) -> u32 {
        match self {
            CrsPreset::Epsg5174 => 5174,
            CrsPreset::Epsg2097 => 2097,
            CrsPreset::Epsg5186 => 5186,
        }
    }

    /// PROJ string of the planar system
    pub fn proj_string(&self) -> String {
        match self {
            CrsPreset::Epsg5174 => format!(
                "+proj=tmerc +lat_0=38 +lon_0=127.0028902777778 +k=1 +x_0=200000 +y_0=500000 +ellps=bessel {}",
                KOREAN_1985_TOWGS84
            ),
            CrsPreset::Epsg2097 => format!(
                "+proj=tmerc +lat_0=38 +lon_0=127 +k=1 +x_0=200000 +y_0=500000 +ellps=bessel {}",
                KOREAN_1985_TOWGS84
            ),
            CrsPreset::Epsg5186 => "+proj=tmerc +lat_0=38 +lon_0=127 +k=1 +x_0=200000 +y_0=600000 +ellps=GRS80".to_string(),
        }
    }

    /// PROJ string of the geographic system results are reported in.
    /// Korea 2000 is used as-is; GRS80 and WGS84 coincide at this precision.
    fn geographic_string(&self) -> &'static str {
        match self {
            CrsPreset::Epsg5174 | CrsPreset::Epsg2097 => "+proj=longlat +ellps=WGS84 +towgs84=0,0,0",
            CrsPreset::Epsg5186 => "+proj=longlat +ellps=GRS80",
        }
    }

    pub fn definition(&self) -> Result<LegacyCrs, TransformError> {
        Ok(LegacyCrs {
            preset: *self,
            planar: Proj::from_proj_string(&self.proj_string())?,
            geographic: Proj::from_proj_string(self.geographic_string())?,
            area: AreaOfUse::KOREA,
        })
    }
}

impl fmt::Display for CrsPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epsg{}", self.code())
    }
}

impl std::str::FromStr for CrsPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .to_ascii_lowercase()
            .trim_start_matches("epsg")
            .trim_start_matches(':')
            .to_string();
        CrsPreset::all()
            .iter()
            .find(|p| p.code().to_string() == digits)
            .copied()
            .ok_or_else(|| format!("unsupported coordinate system '{}'", s))
    }
}

/// Geographic bounds (WGS84 degrees) a projected result must fall in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AreaOfUse {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl AreaOfUse {
    pub const KOREA: AreaOfUse = AreaOfUse {
        min_lat: 32.0,
        max_lat: 44.0,
        min_lon: 123.0,
        max_lon: 133.0,
    };

    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat)
            && (self.min_lon..=self.max_lon).contains(&p.lon)
    }
}

/// A concrete legacy system: planar and geographic definitions plus the
/// area results must fall in
pub struct LegacyCrs {
    preset: CrsPreset,
    planar: Proj,
    geographic: Proj,
    area: AreaOfUse,
}

impl fmt::Debug for LegacyCrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyCrs")
            .field("preset", &self.preset)
            .field("area", &self.area)
            .finish()
    }
}

impl LegacyCrs {
    pub fn preset(&self) -> CrsPreset {
        self.preset
    }

    pub fn area(&self) -> AreaOfUse {
        self.area
    }

    /// Planar source coordinates to WGS84.
    ///
    /// Fails for non-finite input, for results outside the area of use, and
    /// for points that no longer round-trip.
    pub fn to_geographic(&self, planar: PlanarPoint) -> Result<GeoPoint, TransformError> {
        if !planar.x.is_finite() || !planar.y.is_finite() {
            return Err(TransformError::NonFinite);
        }

        let mut p = (planar.x, planar.y, 0.0);
        transform(&self.planar, &self.geographic, &mut p)?;

        let point = GeoPoint::new(p.1.to_degrees(), p.0.to_degrees());
        // NaN fails the containment test too
        if !self.area.contains(point) {
            return Err(TransformError::OutOfDomain {
                lat: point.lat,
                lon: point.lon,
            });
        }

        let back = self.to_planar(point)?;
        if (back.x - planar.x).hypot(back.y - planar.y) > DOMAIN_TOLERANCE_M {
            return Err(TransformError::OutOfDomain {
                lat: point.lat,
                lon: point.lon,
            });
        }

        Ok(point)
    }

    /// WGS84 back to planar source coordinates.
    ///
    /// Geographic output carries no height, so the WGS84 height is solved for
    /// such that the point sits on the source ellipsoid surface, which is
    /// where [`to_geographic`](Self::to_geographic) started from.
    pub fn to_planar(&self, point: GeoPoint) -> Result<PlanarPoint, TransformError> {
        let (lon, lat) = (point.lon.to_radians(), point.lat.to_radians());

        let mut h = 0.0;
        for _ in 0..3 {
            let mut p = (lon, lat, h);
            transform(&self.geographic, &self.planar, &mut p)?;
            h -= p.2;
        }

        let mut p = (lon, lat, h);
        transform(&self.geographic, &self.planar, &mut p)?;
        Ok(PlanarPoint::new(p.0, p.1))
    }
}
