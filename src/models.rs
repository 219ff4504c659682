use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Trailing window a client snapshot covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "30d")]
    Days30,
    #[serde(rename = "60d")]
    Days60,
    #[serde(rename = "90d")]
    Days90,
}

impl Period {
    pub fn days(self) -> i64 {
        match self {
            Period::Days30 => 30,
            Period::Days60 => 60,
            Period::Days90 => 90,
        }
    }

    /// The window immediately preceding this one, if any snapshot exists for it.
    pub fn previous(self) -> Option<Period> {
        match self {
            Period::Days30 => Some(Period::Days60),
            Period::Days60 => Some(Period::Days90),
            Period::Days90 => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Days30 => "30d",
            Period::Days60 => "60d",
            Period::Days90 => "90d",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "30d" | "30" => Ok(Period::Days30),
            "60d" | "60" => Ok(Period::Days60),
            "90d" | "90" => Ok(Period::Days90),
            other => Err(format!("unknown period '{other}', expected 30d, 60d or 90d")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Option<String>,
    pub store: Option<String>,
    pub channel: String,
    pub amount: Option<f64>,
    pub prep_time: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: Option<String>,
    pub last_order: Option<DateTime<Utc>>,
    pub total_spent: Option<f64>,
    pub avg_ticket: Option<f64>,
    pub is_vip: bool,
    pub churn_risk: bool,
    pub segment: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignRecord {
    pub id: Option<String>,
    pub name: Option<String>,
    pub store: Option<String>,
    pub channel: Option<String>,
    /// Campaign type, the optimizer's grouping dimension.
    pub kind: Option<String>,
    /// Display badge shown on the engagement table.
    pub badge: Option<String>,
    pub hour: Option<i64>,
    /// Fraction in [0, 1].
    pub conversion_rate: Option<f64>,
    pub sent: Option<f64>,
    pub delivered: Option<f64>,
    pub sent_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseClass {
    Positive,
    Negative,
    Undetermined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignQueueEntry {
    pub campaign_id: Option<String>,
    pub response: Option<String>,
    pub class: ResponseClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Spike,
    Drop,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub date: NaiveDate,
    pub value: f64,
    pub kind: AnomalyKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub message: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallSummary {
    pub avg_ticket: f64,
    pub avg_prep_time: f64,
    pub order_count: usize,
    pub customer_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreKpi {
    pub store: Option<String>,
    pub channel: String,
    pub orders: usize,
    pub revenue: f64,
    pub avg_ticket: Option<f64>,
    pub avg_prep_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelKpi {
    pub channel: String,
    pub orders: usize,
    pub revenue: f64,
    pub avg_ticket: Option<f64>,
    pub avg_prep_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignEngagement {
    pub name: Option<String>,
    pub store: Option<String>,
    pub badge: Option<String>,
    pub response_rate_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionPick {
    pub value: String,
    pub rate_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignOptimization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_channel: Option<DimensionPick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_hour: Option<DimensionPick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_type: Option<DimensionPick>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientSummary {
    pub avg_ticket: f64,
    pub total_revenue: f64,
    pub active_customers: usize,
    pub inactive_customers: usize,
    pub reactivated_customers: usize,
    pub inactivity_rate: f64,
    pub recovery_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartCampaigns {
    pub reactivation: usize,
    pub loyalty: usize,
    pub vips: usize,
    pub churn_risk: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignHighlight {
    pub name: String,
    pub conversion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignInsights {
    pub avg_conversion_pct: f64,
    pub best: CampaignHighlight,
    pub worst: CampaignHighlight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminReport {
    pub title: String,
    pub period: String,
    pub summary: OverallSummary,
    pub top_stores: Vec<StoreKpi>,
    pub sales_channels: Vec<ChannelKpi>,
    pub campaign_engagement: Vec<CampaignEngagement>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientReport {
    pub title: String,
    pub period: Period,
    pub summary: ClientSummary,
    pub revenue_forecast: Vec<ForecastPoint>,
    pub sentiment: SentimentBreakdown,
    pub campaign_optimization: CampaignOptimization,
    pub anomalies: Vec<Anomaly>,
    pub smart_campaigns: SmartCampaigns,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_insights: Option<CampaignInsights>,
    pub recommendations: Vec<String>,
    pub smart_recommendations: Vec<String>,
}
