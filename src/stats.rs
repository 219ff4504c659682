use std::cmp::Ordering;

use crate::error::{InsightsError, InsightsResult};

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values.iter().map(|v| (v - avg).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Percentile with linear interpolation between closest ranks.
pub fn percentile(values: &[f64], pct: f64) -> InsightsResult<f64> {
    if values.is_empty() {
        return Err(InsightsError::Computation(
            "percentile of an empty sample".to_string(),
        ));
    }
    let mut sorted = values.to_vec();
    sort_desc_or_err(&mut sorted)?;
    sorted.reverse();

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    Ok(sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64))
}

/// Sorts descending, failing on values that have no ordering (NaN).
pub fn sort_desc_or_err(values: &mut [f64]) -> InsightsResult<()> {
    if values.iter().any(|v| v.is_nan()) {
        return Err(InsightsError::Computation(
            "cannot order a sample containing NaN".to_string(),
        ));
    }
    values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    Ok(())
}

/// Descending comparison that keeps `None` after every value.
pub fn cmp_desc_nulls_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
