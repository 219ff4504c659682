//! Short-horizon revenue trend extrapolation.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::error::{InsightsError, InsightsResult};
use crate::models::ForecastPoint;

pub const DEFAULT_HORIZON: usize = 7;

pub trait TrendModel {
    fn name(&self) -> &'static str;

    /// Predicts `horizon` values following `history`, using the sample
    /// index as the time axis.
    fn predict(&self, history: &[f64], horizon: usize) -> InsightsResult<Vec<f64>>;
}

/// Ordinary least squares over index-as-time, backed by `ndarray`.
pub struct LeastSquaresTrend;

impl TrendModel for LeastSquaresTrend {
    fn name(&self) -> &'static str {
        "least-squares"
    }

    #[cfg(feature = "ols")]
    fn predict(&self, history: &[f64], horizon: usize) -> InsightsResult<Vec<f64>> {
        use ndarray::{Array1, ArrayView1};

        if history.len() < 2 {
            return Err(InsightsError::Forecast(format!(
                "need at least 2 points, got {}",
                history.len()
            )));
        }
        let n = history.len() as f64;
        let y = ArrayView1::from(history);
        let x = Array1::range(0.0, n, 1.0);

        let missing = || InsightsError::Forecast("empty series".to_string());
        let x_mean = x.mean().ok_or_else(missing)?;
        let y_mean = y.mean().ok_or_else(missing)?;
        let dx = &x - x_mean;
        let dy = &y - y_mean;

        let slope = dx.dot(&dy) / dx.dot(&dx);
        let intercept = y_mean - slope * x_mean;

        let future = Array1::range(n, n + horizon as f64, 1.0);
        Ok((future * slope + intercept).to_vec())
    }

    #[cfg(not(feature = "ols"))]
    fn predict(&self, _history: &[f64], _horizon: usize) -> InsightsResult<Vec<f64>> {
        Err(InsightsError::Forecast(
            "least-squares backend not compiled in (enable the `ols` feature)".to_string(),
        ))
    }
}

/// Degree-1 polynomial fit solved from the normal equations.
/// Fewer than two points predict zeros.
pub struct LinearPolyfit;

impl TrendModel for LinearPolyfit {
    fn name(&self) -> &'static str {
        "polyfit"
    }

    fn predict(&self, history: &[f64], horizon: usize) -> InsightsResult<Vec<f64>> {
        if history.len() < 2 {
            return Ok(vec![0.0; horizon]);
        }
        let n = history.len() as f64;
        let (mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0);
        for (i, y) in history.iter().enumerate() {
            let x = i as f64;
            sx += x;
            sy += y;
            sxx += x * x;
            sxy += x * y;
        }
        let det = n * sxx - sx * sx;
        let slope = (n * sxy - sx * sy) / det;
        let intercept = (sy - slope * sx) / n;

        Ok((0..horizon)
            .map(|step| intercept + slope * (history.len() + step) as f64)
            .collect())
    }
}

/// Primary least-squares fit, falling back to the polynomial fit, with
/// every prediction clamped at zero.
pub fn predict_revenue(history: &[f64], horizon: usize) -> Vec<f64> {
    let primary = LeastSquaresTrend;
    let fallback = LinearPolyfit;

    let raw = primary.predict(history, horizon).or_else(|err| {
        debug!(model = primary.name(), error = %err, "falling back to {}", fallback.name());
        fallback.predict(history, horizon)
    });

    match raw {
        Ok(values) => values
            .into_iter()
            .map(|v| if v.is_finite() { v.max(0.0) } else { 0.0 })
            .collect(),
        Err(_) => vec![0.0; horizon],
    }
}

/// Daily forecast points starting the day after `today`.
pub fn forecast_revenue(history: &[f64], horizon: usize, today: NaiveDate) -> Vec<ForecastPoint> {
    predict_revenue(history, horizon)
        .into_iter()
        .enumerate()
        .map(|(i, predicted_revenue)| ForecastPoint {
            date: today + Duration::days(i as i64 + 1),
            predicted_revenue,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &[f64], b: &[f64]) -> bool {
        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-6)
    }

    #[test]
    fn polyfit_extends_a_line() {
        let out = LinearPolyfit.predict(&[1.0, 3.0, 5.0], 3).unwrap();
        assert!(close(&out, &[7.0, 9.0, 11.0]));
    }

    #[test]
    fn polyfit_short_series_is_zero() {
        assert_eq!(LinearPolyfit.predict(&[12.0], 4).unwrap(), vec![0.0; 4]);
        assert_eq!(LinearPolyfit.predict(&[], 2).unwrap(), vec![0.0; 2]);
    }

    #[cfg(feature = "ols")]
    #[test]
    fn least_squares_matches_polyfit() {
        let history = [10.0, 12.0, 15.0, 15.0, 21.0];
        let ols = LeastSquaresTrend.predict(&history, 4).unwrap();
        let poly = LinearPolyfit.predict(&history, 4).unwrap();
        assert!(close(&ols, &poly));
    }

    #[test]
    fn least_squares_rejects_short_series() {
        assert!(LeastSquaresTrend.predict(&[5.0], 3).is_err());
    }

    #[test]
    fn horizon_length_and_non_negative() {
        let falling = [500.0, 300.0, 100.0];
        let out = predict_revenue(&falling, 7);
        assert_eq!(out.len(), 7);
        assert!(out.iter().all(|v| *v >= 0.0));
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn single_point_predicts_zeros() {
        assert_eq!(predict_revenue(&[80.0], 3), vec![0.0; 3]);
    }

    #[test]
    fn dates_start_tomorrow() {
        let today = NaiveDate::from_ymd_opt(2025, 12, 30).unwrap();
        let points = forecast_revenue(&[1.0, 2.0], 3, today);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
        assert_eq!(points[2].date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert!((points[0].predicted_revenue - 3.0).abs() < 1e-9);
    }
}
