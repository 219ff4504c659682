use std::fmt::Write;

use crate::models::{AnomalyKind, ClientReport, DimensionPick};

fn pick_line(label: &str, pick: Option<&DimensionPick>) -> String {
    match pick {
        Some(pick) => format!("- Best {label}: {} ({:.2}% conversion)", pick.value, pick.rate_pct),
        None => format!("- Best {label}: not enough data"),
    }
}

pub fn render_client_markdown(report: &ClientReport) -> String {
    let mut output = String::new();
    let summary = &report.summary;

    let _ = writeln!(output, "# {}", report.title);
    let _ = writeln!(output, "Customer insights for the last {} days", report.period.days());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Average ticket: {:.2}", summary.avg_ticket);
    let _ = writeln!(output, "- Total revenue: {:.2}", summary.total_revenue);
    let _ = writeln!(output, "- Active customers: {}", summary.active_customers);
    let _ = writeln!(
        output,
        "- Inactive customers: {} ({:.2}% inactivity)",
        summary.inactive_customers, summary.inactivity_rate
    );
    let _ = writeln!(
        output,
        "- Reactivated customers: {} ({:.2}% recovery)",
        summary.reactivated_customers, summary.recovery_rate
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Revenue Forecast");
    if report.revenue_forecast.is_empty() {
        let _ = writeln!(output, "No spend history to forecast from.");
    } else {
        for point in &report.revenue_forecast {
            let _ = writeln!(output, "- {}: {:.2}", point.date, point.predicted_revenue);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Anomalies");
    if report.anomalies.is_empty() {
        let _ = writeln!(output, "No anomalies flagged.");
    } else {
        for anomaly in &report.anomalies {
            let kind = match anomaly.kind {
                AnomalyKind::Spike => "spike",
                AnomalyKind::Drop => "drop",
            };
            let _ = writeln!(output, "- {} {kind} at {:.2}", anomaly.date, anomaly.value);
        }
    }

    let sentiment = &report.sentiment;
    let _ = writeln!(output);
    let _ = writeln!(output, "## Feedback Sentiment");
    let _ = writeln!(
        output,
        "- Positive: {} ({:.1}%)",
        sentiment.positive, sentiment.positive_pct
    );
    let _ = writeln!(
        output,
        "- Neutral: {} ({:.1}%)",
        sentiment.neutral, sentiment.neutral_pct
    );
    let _ = writeln!(
        output,
        "- Negative: {} ({:.1}%)",
        sentiment.negative, sentiment.negative_pct
    );

    let optimization = &report.campaign_optimization;
    let _ = writeln!(output);
    let _ = writeln!(output, "## Campaigns");
    let _ = writeln!(output, "{}", pick_line("channel", optimization.best_channel.as_ref()));
    let _ = writeln!(output, "{}", pick_line("hour", optimization.best_hour.as_ref()));
    let _ = writeln!(output, "{}", pick_line("type", optimization.best_type.as_ref()));
    if let Some(insights) = &report.campaign_insights {
        let _ = writeln!(
            output,
            "- Average conversion: {:.2}%",
            insights.avg_conversion_pct
        );
        let _ = writeln!(
            output,
            "- Best campaign: {} ({})",
            insights.best.name, insights.best.conversion
        );
        let _ = writeln!(
            output,
            "- Worst campaign: {} ({})",
            insights.worst.name, insights.worst.conversion
        );
    }

    let audiences = &report.smart_campaigns;
    let _ = writeln!(output);
    let _ = writeln!(output, "## Audiences");
    let _ = writeln!(output, "- Reactivation: {}", audiences.reactivation);
    let _ = writeln!(output, "- Loyalty: {}", audiences.loyalty);
    let _ = writeln!(output, "- VIP: {}", audiences.vips);
    let _ = writeln!(output, "- Churn risk: {}", audiences.churn_risk);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommendations");
    for message in &report.recommendations {
        let _ = writeln!(output, "- {message}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Campaign Assistant");
    for message in &report.smart_recommendations {
        let _ = writeln!(output, "- {message}");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Anomaly, CampaignHighlight, CampaignInsights, ClientSummary, CampaignOptimization,
        Period, SentimentBreakdown, SmartCampaigns,
    };
    use chrono::NaiveDate;

    fn report() -> ClientReport {
        ClientReport {
            title: "La Pasticceria Cannoli".to_string(),
            period: Period::Days60,
            summary: ClientSummary {
                avg_ticket: 64.5,
                total_revenue: 1200.0,
                ..ClientSummary::default()
            },
            revenue_forecast: Vec::new(),
            sentiment: SentimentBreakdown::default(),
            campaign_optimization: CampaignOptimization {
                best_channel: Some(DimensionPick {
                    value: "WhatsApp".to_string(),
                    rate_pct: 12.5,
                }),
                ..CampaignOptimization::default()
            },
            anomalies: vec![Anomaly {
                date: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
                value: 310.0,
                kind: AnomalyKind::Spike,
            }],
            smart_campaigns: SmartCampaigns::default(),
            campaign_insights: Some(CampaignInsights {
                avg_conversion_pct: 12.5,
                best: CampaignHighlight {
                    name: "Lunch".to_string(),
                    conversion: "20.0%".to_string(),
                },
                worst: CampaignHighlight {
                    name: "Late".to_string(),
                    conversion: "5.0%".to_string(),
                },
            }),
            recommendations: vec!["Offer exclusive benefits to 2 VIP customers.".to_string()],
            smart_recommendations: Vec::new(),
        }
    }

    #[test]
    fn renders_sections() {
        let markdown = render_client_markdown(&report());
        assert!(markdown.starts_with("# La Pasticceria Cannoli\n"));
        assert!(markdown.contains("last 60 days"));
        assert!(markdown.contains("- Average ticket: 64.50"));
        assert!(markdown.contains("No spend history to forecast from."));
        assert!(markdown.contains("- 2024-06-02 spike at 310.00"));
        assert!(markdown.contains("- Best channel: WhatsApp (12.50% conversion)"));
        assert!(markdown.contains("- Best hour: not enough data"));
        assert!(markdown.contains("- Worst campaign: Late (5.0%)"));
        assert!(markdown.contains("- Offer exclusive benefits to 2 VIP customers."));
    }
}
