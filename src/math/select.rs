//! Peak selection and nearest-neighbour lookup over the dataset.
//!
//! Both scans run in dataset order and keep the first row on ties, so the
//! plotted series, the critical point and the unknown estimate always agree
//! on which row "wins".

use crate::domain::{CriticalPoint, DerivedRow, UnknownEstimate};

/// Row with the highest mean temperature (first one on ties).
pub fn critical_point(dataset: &[DerivedRow]) -> Option<CriticalPoint> {
    let mut best: Option<&DerivedRow> = None;
    for row in dataset {
        match best {
            Some(b) if row.mean_temp <= b.mean_temp => {}
            _ => best = Some(row),
        }
    }
    best.map(|row| CriticalPoint {
        temperature: row.mean_temp,
        composition: row.phenol_percent,
        row: row.row,
    })
}

/// Dataset row whose mean temperature is closest to `target` (first one on ties).
pub fn nearest_by_mean_temp(dataset: &[DerivedRow], target: f64) -> Option<UnknownEstimate> {
    let mut best: Option<(&DerivedRow, f64)> = None;
    for row in dataset {
        let delta = (row.mean_temp - target).abs();
        match best {
            Some((_, best_delta)) if delta >= best_delta => {}
            _ => best = Some((row, delta)),
        }
    }
    best.map(|(row, delta)| UnknownEstimate {
        mean_temp: target,
        phenol_percent: row.phenol_percent,
        matched_row: row.row,
        delta,
    })
}
