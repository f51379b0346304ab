//! Per-row coordinate transform with isolated failures.

use rayon::prelude::*;

use crate::error::{Axis, TransformError};
use crate::models::{GeoPoint, NormalizedRow, PlanarPoint};
use crate::projection::{CrsPreset, LegacyCrs};

/// Result of projecting one row. A failure only ever affects its own row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Projected {
        row: NormalizedRow,
        planar: PlanarPoint,
        location: GeoPoint,
    },
    Failed {
        source_index: usize,
        reason: TransformError,
    },
}

fn parse_axis(value: &str, axis: Axis) -> Result<f64, TransformError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| TransformError::Malformed {
            axis,
            value: value.to_string(),
        })
}

/// Parse the planar pair of a normalized row
pub fn parse_planar(row: &NormalizedRow) -> Result<PlanarPoint, TransformError> {
    let x = parse_axis(row.raw_x(), Axis::X)?;
    let y = parse_axis(row.raw_y(), Axis::Y)?;
    Ok(PlanarPoint::new(x, y))
}

pub fn transform_row(row: NormalizedRow, crs: &LegacyCrs) -> RowOutcome {
    let result = parse_planar(&row)
        .and_then(|planar| crs.to_geographic(planar).map(|location| (planar, location)));

    match result {
        Ok((planar, location)) => RowOutcome::Projected {
            row,
            planar,
            location,
        },
        Err(reason) => RowOutcome::Failed {
            source_index: row.source_index,
            reason,
        },
    }
}

/// Project every row in parallel. Output order matches input order.
///
/// Each worker builds its own [`LegacyCrs`]. If the definition itself is
/// rejected, every row fails with that reason.
pub fn transform_rows(rows: Vec<NormalizedRow>, preset: CrsPreset) -> Vec<RowOutcome> {
    rows.into_par_iter()
        .map_init(
            || preset.definition(),
            |crs, row| match crs {
                Ok(crs) => transform_row(row, crs),
                Err(reason) => RowOutcome::Failed {
                    source_index: row.source_index,
                    reason: reason.clone(),
                },
            },
        )
        .collect()
}
