//! Shared fixtures for unit tests.

use crate::config::{PipelineConfig, SourceSchema};
use crate::models::RawRow;
use crate::projection::CrsPreset;

pub fn english_schema() -> SourceSchema {
    SourceSchema {
        name: "name".into(),
        address: "address".into(),
        phone: "phone".into(),
        category: "category".into(),
        specialty: "specialty".into(),
        planar_x: "planarX".into(),
        planar_y: "planarY".into(),
        status: "status".into(),
        active_status: "Active".into(),
    }
}

pub fn english_config() -> PipelineConfig {
    PipelineConfig::new(english_schema(), CrsPreset::Epsg5174)
}

/// An active row in EPSG:5174 with the English column names
pub fn facility(index: usize, name: &str, address: &str, x: f64, y: f64) -> RawRow {
    RawRow::new(index)
        .with("name", name)
        .with("address", address)
        .with("category", "병원")
        .with("planarX", x.to_string())
        .with("planarY", y.to_string())
        .with("status", "Active")
}

/// A small registry spread over three cities
pub fn registry() -> Vec<RawRow> {
    vec![
        facility(0, "Gangnam Clinic", "Seoul Gangnam Teheran-ro 1", 203_000.0, 444_000.0),
        facility(1, "Seocho Hospital", "Seoul Seocho Banpo-daero 2", 199_500.0, 443_000.0),
        facility(2, "Gangnam Dental", "Seoul Gangnam Dosan-daero 3", 202_000.0, 446_000.0),
        facility(3, "Jongno Clinic", "Seoul Jongno Jong-ro 4", 198_000.0, 453_000.0),
        facility(4, "Haeundae Medical", "Busan Haeundae U-dong 5", 394_000.0, 187_000.0),
        facility(5, "Busanjin Clinic", "Busan Busanjin Jungang-daero 6", 386_000.0, 186_000.0),
        facility(6, "Sejong Clinic", "Sejong", 229_000.0, 335_000.0),
    ]
}
