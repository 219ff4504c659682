use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::anomaly::DEFAULT_Z_THRESHOLD;
use crate::engagement::DEFAULT_SEED;
use crate::forecast::DEFAULT_HORIZON;
use crate::insights::InsightsContext;

pub const DEFAULT_DATA_DIR: &str = "data";

/// Runtime settings shared by every CLI subcommand.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub seed: u64,
    pub anomaly_threshold: f64,
    pub forecast_horizon: usize,
    pub log_json: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            seed: DEFAULT_SEED,
            anomaly_threshold: DEFAULT_Z_THRESHOLD,
            forecast_horizon: DEFAULT_HORIZON,
            log_json: false,
        }
    }
}

impl Settings {
    pub fn context(&self, now: DateTime<Utc>) -> InsightsContext {
        InsightsContext {
            now,
            seed: self.seed,
            anomaly_threshold: self.anomaly_threshold,
            forecast_horizon: self.forecast_horizon,
        }
    }
}
