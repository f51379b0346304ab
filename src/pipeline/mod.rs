//! Batch pipeline: normalize -> transform -> extract regions.
//!
//! Each stage consumes the previous stage's output and never grows it.
//! Per-row problems are values, not errors; only the loader can fail a batch.

pub mod hierarchy;
pub mod normalize;
pub mod transform;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::error::TransformError;
use crate::models::facility::FacilityText;
use crate::models::{FacilityRecord, GeoPoint, NormalizedRow, PlanarPoint, RawRow};
pub use hierarchy::extract_region;
pub use normalize::{normalize_row, normalize_rows, DropReason, NormalizeReport};
pub use transform::{transform_row, transform_rows, RowOutcome};

/// A row that was active and had geometry but could not be projected
#[derive(Debug, Clone, PartialEq)]
pub struct TransformFailure {
    pub source_index: usize,
    pub reason: TransformError,
}

/// Diagnostics for one pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub normalize: NormalizeReport,
    pub failures: Vec<TransformFailure>,
    pub records: usize,
}

/// Compact, serializable summary of a [`PipelineReport`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub input: usize,
    pub missing_geometry: usize,
    pub inactive: usize,
    pub transform_failures: usize,
    pub records: usize,
}

impl PipelineReport {
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            input: self.normalize.input,
            missing_geometry: self.normalize.missing_geometry,
            inactive: self.normalize.inactive,
            transform_failures: self.failures.len(),
            records: self.records,
        }
    }
}

fn build_record(
    row: NormalizedRow,
    planar: PlanarPoint,
    location: GeoPoint,
    config: &PipelineConfig,
) -> FacilityRecord {
    let schema = &config.schema;
    let region = extract_region(row.field(&schema.address));
    let text = FacilityText {
        name: row.text(&schema.name),
        address: row.text(&schema.address),
        phone: row.text(&schema.phone),
        category: row.text(&schema.category),
        specialty: row.text(&schema.specialty),
        status: row.text(&schema.status),
    };
    FacilityRecord::new(row.source_index, text, planar, location, region)
}

/// Run the whole batch over already-loaded rows.
pub fn run(rows: &[RawRow], config: &PipelineConfig) -> (Vec<FacilityRecord>, PipelineReport) {
    let (normalized, normalize) = normalize_rows(rows, &config.schema);
    debug!(
        "Normalized {} rows: {} kept, {} missing geometry, {} inactive",
        normalize.input, normalize.kept, normalize.missing_geometry, normalize.inactive
    );

    let outcomes = transform_rows(normalized, config.crs);

    let mut records = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            RowOutcome::Projected {
                row,
                planar,
                location,
            } => records.push(build_record(row, planar, location, config)),
            RowOutcome::Failed {
                source_index,
                reason,
            } => {
                debug!("Row {} failed to project: {}", source_index, reason);
                failures.push(TransformFailure {
                    source_index,
                    reason,
                });
            }
        }
    }

    let report = PipelineReport {
        normalize,
        failures,
        records: records.len(),
    };

    info!(
        "Pipeline ({}): {} rows in, {} records out ({} missing geometry, {} inactive, {} transform failures)",
        config.crs,
        report.normalize.input,
        report.records,
        report.normalize.missing_geometry,
        report.normalize.inactive,
        report.failures.len()
    );
    if report.records == 0 && report.normalize.input > 0 {
        warn!("No queryable records survived the pipeline; check the schema and coordinate system");
    }

    (records, report)
}
