use std::collections::BTreeMap;

use crate::models::{
    CampaignHighlight, CampaignInsights, CampaignOptimization, CampaignRecord, DimensionPick,
};
use crate::stats::{mean, round_to};

/// Mean conversion per key, then the single best key. Ties keep the
/// smallest key. Returns `None` when no campaign carries both values.
fn best_by<K, F>(campaigns: &[CampaignRecord], key: F) -> Option<(K, f64)>
where
    K: Ord,
    F: Fn(&CampaignRecord) -> Option<K>,
{
    let mut groups: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for campaign in campaigns {
        if let (Some(k), Some(rate)) = (key(campaign), campaign.conversion_rate) {
            groups.entry(k).or_default().push(rate);
        }
    }

    let mut best: Option<(K, f64)> = None;
    for (k, rates) in groups {
        let Some(avg) = mean(&rates) else { continue };
        if best.as_ref().map_or(true, |(_, top)| avg > *top) {
            best = Some((k, avg));
        }
    }
    best
}

/// Best channel, send hour and campaign type by mean conversion. A
/// dimension missing from every campaign is left out of the result.
pub fn optimize_campaigns(campaigns: &[CampaignRecord]) -> CampaignOptimization {
    CampaignOptimization {
        best_channel: best_by(campaigns, |c| c.channel.clone()).map(|(value, rate)| DimensionPick {
            value,
            rate_pct: round_to(rate * 100.0, 2),
        }),
        best_hour: best_by(campaigns, |c| c.hour).map(|(hour, rate)| DimensionPick {
            value: format!("{hour:02}:00h"),
            rate_pct: round_to(rate * 100.0, 2),
        }),
        best_type: best_by(campaigns, |c| c.kind.clone()).map(|(value, rate)| DimensionPick {
            value,
            rate_pct: round_to(rate * 100.0, 2),
        }),
    }
}

/// Mean conversion plus the best and worst campaign (first occurrence on
/// ties). `None` when no campaign reports a conversion rate.
pub fn campaign_insights(campaigns: &[CampaignRecord]) -> Option<CampaignInsights> {
    let rated: Vec<(&CampaignRecord, f64)> = campaigns
        .iter()
        .filter_map(|c| c.conversion_rate.map(|rate| (c, rate)))
        .collect();
    let rates: Vec<f64> = rated.iter().map(|(_, rate)| *rate).collect();
    let avg = mean(&rates)?;

    let mut best = rated[0];
    let mut worst = rated[0];
    for &(campaign, rate) in &rated[1..] {
        if rate > best.1 {
            best = (campaign, rate);
        }
        if rate < worst.1 {
            worst = (campaign, rate);
        }
    }

    let highlight = |(campaign, rate): (&CampaignRecord, f64)| CampaignHighlight {
        name: campaign.name.clone().unwrap_or_else(|| "N/A".to_string()),
        conversion: format!("{:.1}%", rate * 100.0),
    };
    Some(CampaignInsights {
        avg_conversion_pct: round_to(avg * 100.0, 2),
        best: highlight(best),
        worst: highlight(worst),
    })
}
