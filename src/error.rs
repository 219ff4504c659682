use thiserror::Error;

pub type InsightsResult<T> = Result<T, InsightsError>;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Forecast error: {0}")]
    Forecast(String),

    #[error("Polarity scorer error: {0}")]
    Polarity(String),

    #[error("Computation error: {0}")]
    Computation(String),
}
