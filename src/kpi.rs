use std::collections::BTreeMap;

use crate::models::{ChannelKpi, CustomerRecord, OrderRecord, OverallSummary, StoreKpi};
use crate::stats::{cmp_desc_nulls_last, mean, round_to};

pub fn overall_summary(orders: &[OrderRecord], customers: &[CustomerRecord]) -> OverallSummary {
    if orders.is_empty() || customers.is_empty() {
        return OverallSummary::default();
    }

    let amounts: Vec<f64> = orders.iter().filter_map(|o| o.amount).collect();
    let prep_times: Vec<f64> = orders.iter().filter_map(|o| o.prep_time).collect();

    OverallSummary {
        avg_ticket: mean(&amounts).map(|v| round_to(v, 2)).unwrap_or(0.0),
        avg_prep_time: mean(&prep_times).map(|v| round_to(v, 2)).unwrap_or(0.0),
        order_count: orders.len(),
        customer_count: customers.len(),
    }
}

#[derive(Default)]
struct Bucket {
    orders: usize,
    amounts: Vec<f64>,
    prep_times: Vec<f64>,
}

impl Bucket {
    fn push(&mut self, order: &OrderRecord) {
        // only rows carrying an order identifier are counted
        if order.id.is_some() {
            self.orders += 1;
        }
        self.amounts.extend(order.amount);
        self.prep_times.extend(order.prep_time);
    }

    fn revenue(&self) -> f64 {
        round_to(self.amounts.iter().fold(0.0, |acc, v| acc + v), 2)
    }

    fn avg_ticket(&self) -> Option<f64> {
        mean(&self.amounts).map(|v| round_to(v, 2))
    }

    fn avg_prep_time(&self) -> Option<f64> {
        mean(&self.prep_times).map(|v| round_to(v, 2))
    }
}

pub fn by_store(orders: &[OrderRecord]) -> Vec<StoreKpi> {
    let mut groups: BTreeMap<(Option<String>, String), Bucket> = BTreeMap::new();
    for order in orders {
        groups
            .entry((order.store.clone(), order.channel.clone()))
            .or_default()
            .push(order);
    }

    let mut kpis: Vec<StoreKpi> = groups
        .into_iter()
        .map(|((store, channel), bucket)| StoreKpi {
            store,
            channel,
            orders: bucket.orders,
            revenue: bucket.revenue(),
            avg_ticket: bucket.avg_ticket(),
            avg_prep_time: bucket.avg_prep_time(),
        })
        .collect();

    kpis.sort_by(|a, b| cmp_desc_nulls_last(Some(a.revenue), Some(b.revenue)));
    kpis
}

pub fn by_channel(orders: &[OrderRecord]) -> Vec<ChannelKpi> {
    let mut groups: BTreeMap<String, Bucket> = BTreeMap::new();
    for order in orders {
        groups.entry(order.channel.clone()).or_default().push(order);
    }

    let mut kpis: Vec<ChannelKpi> = groups
        .into_iter()
        .map(|(channel, bucket)| ChannelKpi {
            channel,
            orders: bucket.orders,
            revenue: bucket.revenue(),
            avg_ticket: bucket.avg_ticket(),
            avg_prep_time: bucket.avg_prep_time(),
        })
        .collect();

    kpis.sort_by(|a, b| cmp_desc_nulls_last(Some(a.revenue), Some(b.revenue)));
    kpis
}
