//! Rule-based recommendations for the admin and client dashboards.
//!
//! Every rule is checked independently and every match is kept, in rule
//! order, without repeating a message. When nothing matches the list holds
//! a single nominal message.

use std::collections::HashSet;

use crate::models::{CampaignEngagement, OverallSummary, Priority, Recommendation};

pub const LOW_TICKET_THRESHOLD: f64 = 70.0;
pub const SLOW_PREP_THRESHOLD: f64 = 40.0;
pub const LOW_ORDER_THRESHOLD: usize = 50;

/// Ordered, de-duplicated message accumulator.
#[derive(Debug)]
pub struct Accumulator<T> {
    seen: HashSet<String>,
    items: Vec<T>,
}

impl<T> Accumulator<T> {
    pub fn new() -> Self {
        Self {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }

    /// Keeps `item` unless its message is blank or the exact same text was
    /// already pushed.
    pub fn push(&mut self, message: &str, item: impl FnOnce(String) -> T) {
        if message.trim().is_empty() || !self.seen.insert(message.to_string()) {
            return;
        }
        self.items.push(item(message.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Default for Accumulator<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn dedup_messages<I, S>(messages: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut acc = Accumulator::new();
    for message in messages {
        acc.push(message.as_ref(), |m| m);
    }
    acc.into_vec()
}

pub fn admin_recommendations(
    summary: &OverallSummary,
    engagement: &[CampaignEngagement],
) -> Vec<Recommendation> {
    let mut acc = Accumulator::new();
    let mut add = |message: &str, priority: Priority| {
        acc.push(message, |message| Recommendation { message, priority })
    };

    if summary.avg_ticket < LOW_TICKET_THRESHOLD {
        add(
            "💡 Average ticket below target: test combos and progressive discounts.",
            Priority::High,
        );
    }
    if summary.avg_prep_time > SLOW_PREP_THRESHOLD {
        add(
            "⏱️ Preparation time is high: investigate kitchen bottlenecks.",
            Priority::High,
        );
    }
    if summary.order_count < LOW_ORDER_THRESHOLD {
        add(
            "📉 Few orders: run regional engagement campaigns.",
            Priority::High,
        );
    }
    if let Some(top) = engagement.first() {
        let name = top.name.as_deref().unwrap_or("N/A");
        add(
            &format!("📈 Campaign '{name}' performed well: reuse its copy and layout."),
            Priority::Medium,
        );
    }

    if acc.is_empty() {
        acc.push("✅ Everything within the expected range.", |message| {
            Recommendation {
                message,
                priority: Priority::Low,
            }
        });
    }
    acc.into_vec()
}

/// Counts the client dashboard rules look at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientSignals {
    pub inactive: usize,
    pub reactivated: usize,
    pub loyal: usize,
    pub vip: usize,
    pub churn_risk: usize,
    pub negative_feedback: usize,
    pub positive_feedback: usize,
}

pub fn client_recommendations(signals: &ClientSignals) -> Vec<String> {
    let mut messages = Vec::new();
    if signals.inactive > 0 {
        messages.push(format!(
            "Send 'Come back and get 10% off' to {} inactive customers.",
            signals.inactive
        ));
    }
    if signals.reactivated > 0 {
        messages.push(format!(
            "🎉 Congratulate {} reactivated customers with a special coupon.",
            signals.reactivated
        ));
    }
    if signals.loyal > 0 {
        messages.push(format!(
            "Create a points program for {} loyal customers.",
            signals.loyal
        ));
    }
    if signals.vip > 0 {
        messages.push(format!(
            "Offer exclusive benefits to {} VIP customers.",
            signals.vip
        ));
    }
    if signals.churn_risk > 0 {
        messages.push(format!(
            "Run a retention campaign for {} customers at risk of churn.",
            signals.churn_risk
        ));
    }
    if signals.negative_feedback > 0 {
        messages.push(format!(
            "⚠️ Find and answer {} negative feedback messages to improve satisfaction.",
            signals.negative_feedback
        ));
    }
    if signals.positive_feedback > 0 {
        messages.push(format!(
            "💬 Feature {} compliments on social media or in future campaigns.",
            signals.positive_feedback
        ));
    }

    let messages = dedup_messages(messages);
    if messages.is_empty() {
        return vec!["✅ Customer base is stable: no action needed this period.".to_string()];
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(avg_ticket: f64, avg_prep_time: f64, order_count: usize) -> OverallSummary {
        OverallSummary {
            avg_ticket,
            avg_prep_time,
            order_count,
            customer_count: 10,
        }
    }

    #[test]
    fn every_matching_admin_rule_fires() {
        let recs = admin_recommendations(&summary(50.0, 55.0, 10), &[]);
        assert_eq!(recs.len(), 3);
        assert!(recs.iter().all(|r| r.priority == Priority::High));
        assert!(recs[0].message.contains("ticket"));
        assert!(recs[1].message.contains("Preparation"));
        assert!(recs[2].message.contains("Few orders"));
    }

    #[test]
    fn best_campaign_is_medium_priority() {
        let engagement = vec![CampaignEngagement {
            name: Some("Pizza Friday".to_string()),
            store: None,
            badge: None,
            response_rate_pct: 81.0,
        }];
        let recs = admin_recommendations(&summary(90.0, 20.0, 200), &engagement);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Medium);
        assert!(recs[0].message.contains("'Pizza Friday'"));
    }

    #[test]
    fn nominal_message_when_nothing_fires() {
        let recs = admin_recommendations(&summary(90.0, 20.0, 200), &[]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Low);
    }

    #[test]
    fn client_rules_accumulate_in_order() {
        let signals = ClientSignals {
            inactive: 20,
            vip: 3,
            negative_feedback: 2,
            ..ClientSignals::default()
        };
        let recs = client_recommendations(&signals);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].contains("20 inactive"));
        assert!(recs[1].contains("3 VIP"));
        assert!(recs[2].contains("2 negative"));
    }

    #[test]
    fn client_default_message() {
        let recs = client_recommendations(&ClientSignals::default());
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        let out = dedup_messages(["b", "a", "b", "", "  ", "a", "c"]);
        assert_eq!(out, vec!["b", "a", "c"]);
    }

    #[test]
    fn dedup_compares_exact_text() {
        let out = dedup_messages(["a", " a", "a"]);
        assert_eq!(out, vec!["a", " a"]);
    }
}
