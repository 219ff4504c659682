//! Admin and client report assembly.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::activity::{self, ActivityFigures};
use crate::anomaly::{self, DEFAULT_Z_THRESHOLD};
use crate::engagement::{self, DEFAULT_SEED};
use crate::forecast::{self, DEFAULT_HORIZON};
use crate::kpi;
use crate::models::{AdminReport, ClientReport, ClientSummary, Period, SmartCampaigns};
use crate::optimizer;
use crate::recommend::{self, ClientSignals};
use crate::sentiment::{self, PolarityScorer};
use crate::smart;
use crate::snapshot::{AdminSnapshot, PeriodSnapshot, SnapshotSource};
use crate::stats::{mean, round_to};

pub const ADMIN_TITLE: &str = "Cannoli Admin Dashboard";
pub const CLIENT_TITLE: &str = "La Pasticceria Cannoli";
const TOP_STORES: usize = 10;

/// Everything a report depends on besides the snapshot itself.
#[derive(Debug, Clone, Copy)]
pub struct InsightsContext {
    pub now: DateTime<Utc>,
    pub seed: u64,
    pub anomaly_threshold: f64,
    pub forecast_horizon: usize,
}

impl InsightsContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            seed: DEFAULT_SEED,
            anomaly_threshold: DEFAULT_Z_THRESHOLD,
            forecast_horizon: DEFAULT_HORIZON,
        }
    }
}

pub fn admin_insights(snapshot: &AdminSnapshot, period: Period, ctx: &InsightsContext) -> AdminReport {
    let summary = kpi::overall_summary(&snapshot.orders, &snapshot.customers);
    let mut top_stores = kpi::by_store(&snapshot.orders);
    top_stores.truncate(TOP_STORES);
    let sales_channels = kpi::by_channel(&snapshot.orders);
    let campaign_engagement =
        engagement::campaign_engagement(&snapshot.campaigns, &snapshot.queue, ctx.seed);
    let recommendations = recommend::admin_recommendations(&summary, &campaign_engagement);

    AdminReport {
        title: ADMIN_TITLE.to_string(),
        period: period.label().to_string(),
        summary,
        top_stores,
        sales_channels,
        campaign_engagement,
        recommendations,
    }
}

/// Builds the client dashboard. `prior` is the preceding period's snapshot
/// when one exists and could be loaded; without it reactivation is zero.
pub fn client_insights(
    current: &PeriodSnapshot,
    prior: Option<&PeriodSnapshot>,
    period: Period,
    ctx: &InsightsContext,
    scorer: &dyn PolarityScorer,
) -> ClientReport {
    let customers = &current.customers;
    let days = period.days();

    let tickets: Vec<f64> = customers.iter().filter_map(|c| c.avg_ticket).collect();
    let spent: Vec<f64> = customers.iter().filter_map(|c| c.total_spent).collect();
    let (inactive, inactivity_rate) = activity::inactivity_rate(customers, days, ctx.now);
    let reactivated = prior.map_or(0, |prior| {
        activity::reactivated_count(&prior.customers, customers, days, ctx.now)
    });

    let raw = ActivityFigures {
        avg_ticket: mean(&tickets).map_or(0.0, |m| round_to(m, 2)),
        total_revenue: round_to(spent.iter().fold(0.0, |acc, v| acc + v), 2),
        active_customers: customers
            .iter()
            .filter(|c| c.status.as_deref() == Some("Active"))
            .count(),
        inactive_customers: inactive,
        reactivated_customers: reactivated,
        inactivity_rate,
    };
    let figures = activity::calibrate(period, raw);
    let summary = ClientSummary {
        avg_ticket: figures.avg_ticket,
        total_revenue: figures.total_revenue,
        active_customers: figures.active_customers,
        inactive_customers: figures.inactive_customers,
        reactivated_customers: figures.reactivated_customers,
        inactivity_rate: figures.inactivity_rate,
        recovery_rate: activity::recovery_rate(
            figures.inactive_customers,
            figures.reactivated_customers,
        ),
    };

    let mut history = spent;
    history.sort_by(f64::total_cmp);
    let revenue_forecast = if history.is_empty() {
        Vec::new()
    } else {
        forecast::forecast_revenue(&history, ctx.forecast_horizon, ctx.now.date_naive())
    };
    let anomalies = anomaly::detect_anomalies(&revenue_forecast, ctx.anomaly_threshold);

    let sentiment =
        sentiment::analyze(current.queue.iter().filter_map(|q| q.response.as_deref()), scorer);

    let smart_campaigns = SmartCampaigns {
        reactivation: figures.reactivated_customers,
        loyalty: smart::loyal_count(customers),
        vips: customers.iter().filter(|c| c.is_vip).count(),
        churn_risk: customers.iter().filter(|c| c.churn_risk).count(),
    };
    let signals = ClientSignals {
        inactive: figures.inactive_customers,
        reactivated: figures.reactivated_customers,
        loyal: smart_campaigns.loyalty,
        vip: smart_campaigns.vips,
        churn_risk: smart_campaigns.churn_risk,
        negative_feedback: sentiment.negative,
        positive_feedback: sentiment.positive,
    };

    ClientReport {
        title: CLIENT_TITLE.to_string(),
        period,
        summary,
        revenue_forecast,
        sentiment,
        campaign_optimization: optimizer::optimize_campaigns(&current.campaigns),
        anomalies,
        smart_campaigns,
        campaign_insights: optimizer::campaign_insights(&current.campaigns),
        recommendations: recommend::client_recommendations(&signals),
        smart_recommendations: smart::smart_recommendations(
            &current.campaigns,
            &current.orders,
            customers,
            ctx.now,
        ),
    }
}

pub fn generate_admin_report<S: SnapshotSource>(
    source: &S,
    period: Period,
    ctx: &InsightsContext,
) -> AdminReport {
    let snapshot = source.load_admin();
    info!(
        period = %period,
        orders = snapshot.orders.len(),
        customers = snapshot.customers.len(),
        campaigns = snapshot.campaigns.len(),
        "building admin report"
    );
    admin_insights(&snapshot, period, ctx)
}

/// Loads the period snapshots and builds the client report. Unreadable
/// current-period files degrade to empty tables; an unreadable prior
/// snapshot leaves reactivation at zero.
pub fn generate_client_report<S: SnapshotSource>(
    source: &S,
    period: Period,
    ctx: &InsightsContext,
    scorer: &dyn PolarityScorer,
) -> ClientReport {
    let current = source.load_current(period);
    let prior = period.previous().and_then(|previous| match source.load_period(previous) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!(period = %previous, error = %err, "prior snapshot unreadable, reactivation set to zero");
            None
        }
    });

    info!(
        period = %period,
        customers = current.customers.len(),
        orders = current.orders.len(),
        prior = prior.is_some(),
        "building client report"
    );
    client_insights(&current, prior.as_ref(), period, ctx, scorer)
}
