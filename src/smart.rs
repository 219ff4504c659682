//! Pattern-derived recommendations for the client dashboard.
//!
//! Each step reads one kind of signal (channel delivery, send hours,
//! customer segments, campaign extremes, order value spread) and tolerates
//! absent fields. A step that fails stops the derivation; messages from
//! earlier steps are kept and one diagnostic message is appended.

use std::collections::BTreeMap;

use chrono::{DateTime, Timelike, Utc};
use tracing::warn;

use crate::activity::{reactivation_audience, REACTIVATION_AUDIENCE_DAYS};
use crate::error::{InsightsError, InsightsResult};
use crate::models::{CampaignRecord, CustomerRecord, OrderRecord};
use crate::normalize::UNKNOWN_CHANNEL;
use crate::recommend::dedup_messages;
use crate::stats::{percentile, round_to};

const MIN_PRICED_ORDERS: usize = 10;
const FALLBACK_MESSAGE: &str = "💡 Suggestion: run a reactivation flow (WhatsApp → e-mail) and a \
     creative A/B test on the highest-revenue channel.";

pub fn smart_recommendations(
    campaigns: &[CampaignRecord],
    orders: &[OrderRecord],
    customers: &[CustomerRecord],
    now: DateTime<Utc>,
) -> Vec<String> {
    let mut recs = Vec::new();
    if let Err(err) = derive(&mut recs, campaigns, orders, customers, now) {
        warn!(error = %err, "smart recommendations degraded");
        recs.push(format!("⚙️ Campaign assistant running in safe mode: {err}"));
    }

    let clean = dedup_messages(recs);
    if clean.is_empty() {
        return vec![FALLBACK_MESSAGE.to_string()];
    }
    clean
}

fn derive(
    recs: &mut Vec<String>,
    campaigns: &[CampaignRecord],
    orders: &[OrderRecord],
    customers: &[CustomerRecord],
    now: DateTime<Utc>,
) -> InsightsResult<()> {
    recs.extend(by_channel(campaigns, orders)?);
    recs.extend(by_send_hour(campaigns, orders));
    recs.extend(by_segment(customers, now)?);
    recs.extend(by_campaign_extremes(campaigns)?);
    recs.extend(by_pricing(orders)?);
    Ok(())
}

fn ensure_ordered(values: impl IntoIterator<Item = f64>, what: &str) -> InsightsResult<()> {
    if values.into_iter().any(f64::is_nan) {
        return Err(InsightsError::Computation(format!("{what} is not a number")));
    }
    Ok(())
}

fn by_channel(campaigns: &[CampaignRecord], orders: &[OrderRecord]) -> InsightsResult<Vec<String>> {
    let mut recs = Vec::new();

    let mut delivery: BTreeMap<&str, (f64, f64)> = BTreeMap::new();
    for campaign in campaigns {
        let Some(channel) = campaign.channel.as_deref() else {
            continue;
        };
        let totals = delivery.entry(channel).or_insert((0.0, 0.0));
        totals.0 += campaign.sent.unwrap_or(0.0);
        totals.1 += campaign.delivered.unwrap_or(0.0);
    }

    let mut channels: Vec<(&str, f64, f64)> = delivery
        .into_iter()
        .map(|(channel, (sent, delivered))| {
            let rate = if sent > 0.0 {
                round_to(delivered / sent * 100.0, 1)
            } else {
                0.0
            };
            (channel, rate, delivered)
        })
        .collect();
    ensure_ordered(channels.iter().flat_map(|c| [c.1, c.2]), "channel delivery rate")?;
    channels.sort_by(|a, b| b.1.total_cmp(&a.1).then(b.2.total_cmp(&a.2)));

    if let Some((top, rate, _)) = channels.first() {
        recs.push(format!(
            "📣 Prioritize the **{top}** channel: delivery rate {rate:.1}% (best among channels)."
        ));
        if let Some((second, _, _)) = channels.get(1) {
            recs.push(format!(
                "🧪 A/B test {top} vs {second} over a short 3–5 day flow to validate real conversion."
            ));
        }
    }

    if orders.iter().any(|o| o.channel != UNKNOWN_CHANNEL) {
        let mut revenue: BTreeMap<&str, f64> = BTreeMap::new();
        for order in orders {
            *revenue.entry(order.channel.as_str()).or_insert(0.0) += order.amount.unwrap_or(0.0);
        }
        ensure_ordered(revenue.values().copied(), "channel revenue")?;
        let best = revenue
            .into_iter()
            .fold(None::<(&str, f64)>, |best, (channel, total)| match best {
                Some((_, top)) if top >= total => best,
                _ => Some((channel, total)),
            });
        if let Some((channel, total)) = best {
            recs.push(format!(
                "💰 Channel with the highest recent revenue: **{channel}** (R$ {}). Route the best offers through it.",
                format_brl(total)
            ));
        }
    }

    Ok(recs)
}

/// Most frequent hour; ties keep the earliest hour.
fn peak_hour(stamps: impl Iterator<Item = DateTime<Utc>>) -> Option<u32> {
    let mut counts = [0usize; 24];
    let mut any = false;
    for stamp in stamps {
        counts[stamp.hour() as usize] += 1;
        any = true;
    }
    if !any {
        return None;
    }
    let mut best = 0;
    for hour in 1..24 {
        if counts[hour] > counts[best] {
            best = hour;
        }
    }
    Some(best as u32)
}

fn by_send_hour(campaigns: &[CampaignRecord], orders: &[OrderRecord]) -> Vec<String> {
    if let Some(hour) = peak_hour(campaigns.iter().filter_map(|c| c.sent_at)) {
        return vec![format!(
            "🕒 Schedule sends between **{hour:02}h–{:02}h**: highest concentration of successful sends.",
            (hour + 1) % 24
        )];
    }
    if let Some(hour) = peak_hour(orders.iter().filter_map(|o| o.created_at)) {
        return vec![format!(
            "🕒 Fire campaigns close to **{hour:02}h** (order peak)."
        )];
    }
    Vec::new()
}

fn by_segment(customers: &[CustomerRecord], now: DateTime<Utc>) -> InsightsResult<Vec<String>> {
    let mut recs = Vec::new();
    if customers.is_empty() {
        return Ok(recs);
    }

    let vips = customers.iter().filter(|c| c.is_vip).count();
    if vips > 0 {
        recs.push(format!(
            "👑 **VIPs ({vips})** respond best to exclusive perks. Try free delivery plus early access to new items."
        ));
    }

    let loyal = loyal_count(customers);
    if loyal > 0 {
        recs.push(format!(
            "💚 **Loyal ({loyal})**: schedule a benefit upgrade (e.g. double points on the next order)."
        ));
    }

    if let Some(audience) = reactivation_audience(customers, REACTIVATION_AUDIENCE_DAYS, now) {
        if audience > 0 {
            recs.push(format!(
                "🔄 **Reactivation ({audience})**: two-step flow: 1) WhatsApp with 10% OFF; 2) 72h later, e-mail with a **scarcity trigger**."
            ));
        }
    }

    let tickets: Vec<f64> = customers.iter().filter_map(|c| c.avg_ticket).collect();
    if !tickets.is_empty() {
        let p25 = percentile(&tickets, 25.0)?;
        let p75 = percentile(&tickets, 75.0)?;
        let low = tickets.iter().filter(|t| **t <= p25).count();
        let high = tickets.iter().filter(|t| **t >= p75).count();
        if low > 0 {
            recs.push(format!(
                "🧩 Convert **low ticket ({low} customers)** with 'buy 2, get 15% off' combos."
            ));
        }
        if high > 0 {
            recs.push(format!(
                "💎 **High ticket ({high})**: build premium bundles with an extra dessert and priority prep (upsell)."
            ));
        }
    }

    Ok(recs)
}

pub fn loyal_count(customers: &[CustomerRecord]) -> usize {
    customers
        .iter()
        .filter(|c| {
            c.segment
                .as_deref()
                .is_some_and(|s| s.to_lowercase() == "loyal")
        })
        .count()
}

/// First campaign holding the extreme value under `better`.
fn extreme<'a>(
    scored: &[(&'a CampaignRecord, f64)],
    better: impl Fn(f64, f64) -> bool,
) -> Option<(&'a CampaignRecord, f64)> {
    scored.iter().copied().fold(None, |best, (campaign, value)| match best {
        Some((_, top)) if !better(value, top) => best,
        _ => Some((campaign, value)),
    })
}

fn by_campaign_extremes(campaigns: &[CampaignRecord]) -> InsightsResult<Vec<String>> {
    let mut recs = Vec::new();

    let conversions: Vec<(&CampaignRecord, f64)> = campaigns
        .iter()
        .filter_map(|c| c.conversion_rate.map(|rate| (c, rate)))
        .collect();
    ensure_ordered(conversions.iter().map(|(_, rate)| *rate), "conversion rate")?;

    if let (Some((best, best_rate)), Some((worst, worst_rate))) = (
        extreme(&conversions, |a, b| a > b),
        extreme(&conversions, |a, b| a < b),
    ) {
        let best_name = best.name.as_deref().unwrap_or("N/A");
        let worst_name = worst.name.as_deref().unwrap_or("N/A");
        recs.push(format!(
            "🏆 Best recent campaign: **{best_name}** ({:.1}% conversion). Replicate its creative and channel.",
            best_rate * 100.0
        ));
        recs.push(format!(
            "⛔ Avoid **{worst_name}** ({:.1}%); keep it only as a control group.",
            worst_rate * 100.0
        ));
    }

    let delivery: Vec<(&CampaignRecord, f64)> = campaigns
        .iter()
        .filter_map(|c| match (c.sent, c.delivered) {
            (Some(sent), Some(delivered)) if sent > 0.0 => {
                Some((c, round_to(delivered / sent * 100.0, 1)))
            }
            _ => None,
        })
        .collect();
    ensure_ordered(delivery.iter().map(|(_, rate)| *rate), "delivery rate")?;

    if let Some((campaign, rate)) = extreme(&delivery, |a, b| a > b) {
        let name = campaign.name.as_deref().unwrap_or("Campaign");
        recs.push(format!(
            "🚀 Highest delivery rate: **{name}** ({rate:.1}%). Reuse its segmentation and base."
        ));
    }

    Ok(recs)
}

fn by_pricing(orders: &[OrderRecord]) -> InsightsResult<Vec<String>> {
    let amounts: Vec<f64> = orders.iter().filter_map(|o| o.amount).collect();
    if amounts.len() < MIN_PRICED_ORDERS {
        return Ok(Vec::new());
    }

    let q25 = percentile(&amounts, 25.0)?;
    let q75 = percentile(&amounts, 75.0)?;
    if q75 - q25 <= 0.0 {
        return Ok(Vec::new());
    }
    Ok(vec![format!(
        "🎯 Try **anchor pricing**: feature an item around R$ {} to lift the average ticket.",
        format_brl(q75)
    )])
}

/// Brazilian currency digits: `1234.5` renders as `1.234,50`.
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}
