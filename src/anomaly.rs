use crate::models::{Anomaly, AnomalyKind, ForecastPoint};
use crate::stats::{mean, std_dev};

pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

/// Flags forecast points whose z-score exceeds `threshold`. The standard
/// deviation is floored at 1 so near-constant series never fire.
pub fn detect_anomalies(points: &[ForecastPoint], threshold: f64) -> Vec<Anomaly> {
    let values: Vec<f64> = points.iter().map(|p| p.predicted_revenue).collect();
    let (Some(avg), Some(sd)) = (mean(&values), std_dev(&values)) else {
        return Vec::new();
    };
    let scale = sd.max(1.0);

    points
        .iter()
        .filter(|p| (p.predicted_revenue - avg).abs() / scale > threshold)
        .map(|p| Anomaly {
            date: p.date,
            value: p.predicted_revenue,
            kind: if p.predicted_revenue < avg {
                AnomalyKind::Drop
            } else {
                AnomalyKind::Spike
            },
        })
        .collect()
}
