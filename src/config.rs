use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use xxhash_rust::xxh64::Xxh64;

use crate::projection::CrsPreset;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub schema: SourceSchema,
    pub projection: ProjectionConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SourceConfig {
    /// Registry export to load when no path is given on the command line
    pub path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ProjectionConfig {
    pub crs: CrsPreset,
}

/// Column names of the registry export and the active-status sentinel.
///
/// Names are matched after trimming header whitespace.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct SourceSchema {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub category: String,
    pub specialty: String,
    pub planar_x: String,
    pub planar_y: String,
    pub status: String,
    pub active_status: String,
}

impl Default for SourceSchema {
    fn default() -> Self {
        Self {
            name: "사업장명".to_string(),
            address: "소재지전체주소".to_string(),
            phone: "소재지전화".to_string(),
            category: "의료기관종별명".to_string(),
            specialty: "진료과목내용명".to_string(),
            planar_x: "좌표정보x(epsg5174)".to_string(),
            planar_y: "좌표정보y(epsg5174)".to_string(),
            status: "영업상태명".to_string(),
            active_status: "영업/정상".to_string(),
        }
    }
}

/// Everything that changes what the pipeline produces from a given input
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PipelineConfig {
    pub schema: SourceSchema,
    pub crs: CrsPreset,
}

impl PipelineConfig {
    pub fn new(schema: SourceSchema, crs: CrsPreset) -> Self {
        Self { schema, crs }
    }

    /// Stable hash of the configuration, combined with the input hash to key
    /// cached snapshots.
    pub fn fingerprint(&self) -> u64 {
        let s = &self.schema;
        let mut hasher = Xxh64::new(0);
        for part in [
            &s.name,
            &s.address,
            &s.phone,
            &s.category,
            &s.specialty,
            &s.planar_x,
            &s.planar_y,
            &s.status,
            &s.active_status,
        ] {
            hasher.update(part.as_bytes());
            hasher.update(&[0xff]);
        }
        hasher.update(&self.crs.code().to_le_bytes());
        hasher.digest()
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig::new(self.schema.clone(), self.projection.crs)
    }
}
