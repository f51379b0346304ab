//! Row normalization: trimmed keys, required geometry, active status.

use serde::Serialize;

use crate::config::SourceSchema;
use crate::models::{NormalizedRow, RawRow};

/// Why a row left the batch during normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingGeometry,
    InactiveStatus,
}

/// Counts of what normalization kept and dropped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeReport {
    pub input: usize,
    pub kept: usize,
    pub missing_geometry: usize,
    pub inactive: usize,
}

/// Present means the column exists and is non-blank after trimming
fn present(fields: &[(String, String)], key: &str) -> Option<String> {
    fields
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Normalize a single row, or say why it is dropped.
pub fn normalize_row(row: &RawRow, schema: &SourceSchema) -> Result<NormalizedRow, DropReason> {
    let fields: Vec<(String, String)> = row
        .fields
        .iter()
        .map(|(k, v)| (k.trim().to_string(), v.clone()))
        .collect();

    let (raw_x, raw_y) = match (
        present(&fields, &schema.planar_x),
        present(&fields, &schema.planar_y),
    ) {
        (Some(x), Some(y)) => (x, y),
        _ => return Err(DropReason::MissingGeometry),
    };

    let active = present(&fields, &schema.status)
        .map(|status| status == schema.active_status)
        .unwrap_or(false);
    if !active {
        return Err(DropReason::InactiveStatus);
    }

    Ok(NormalizedRow::new(row.index, fields, raw_x, raw_y))
}

/// Normalize a batch. Survivors keep their original order.
pub fn normalize_rows(rows: &[RawRow], schema: &SourceSchema) -> (Vec<NormalizedRow>, NormalizeReport) {
    let mut report = NormalizeReport {
        input: rows.len(),
        ..Default::default()
    };
    let mut kept = Vec::with_capacity(rows.len());

    for row in rows {
        match normalize_row(row, schema) {
            Ok(normalized) => kept.push(normalized),
            Err(DropReason::MissingGeometry) => report.missing_geometry += 1,
            Err(DropReason::InactiveStatus) => report.inactive += 1,
        }
    }

    report.kept = kept.len();
    (kept, report)
}
