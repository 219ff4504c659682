pub mod activity;
pub mod anomaly;
pub mod columns;
pub mod config;
pub mod engagement;
pub mod error;
pub mod export;
pub mod forecast;
pub mod insights;
pub mod kpi;
pub mod models;
pub mod normalize;
pub mod optimizer;
pub mod recommend;
pub mod report;
pub mod sentiment;
pub mod smart;
pub mod snapshot;
pub mod stats;

pub use error::{InsightsError, InsightsResult};
pub use insights::{generate_admin_report, generate_client_report, InsightsContext};
