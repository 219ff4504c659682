//! Record normalization: flattening, column hygiene, type coercion and
//! extraction of typed records from raw snapshot rows.
//!
//! Every function here takes rows by reference and returns fresh rows, so
//! callers never observe their input being rewritten.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Number, Value};

use crate::columns::{self, first_match, Aliases, RawRecord};
use crate::engagement::classify_response;
use crate::models::{CampaignQueueEntry, CampaignRecord, CustomerRecord, OrderRecord};

pub const SALES_CHANNEL: &str = "saleschannel";
pub const UNKNOWN_CHANNEL: &str = "Unknown";
pub const ORDER_NUMERIC_COLUMNS: &[&str] = &["total.orderamount", "preparationtime"];

/// Flattens nested objects into dotted column names (`store.name`).
pub fn flatten(value: &Value) -> RawRecord {
    let mut out = RawRecord::new();
    if let Value::Object(map) = value {
        flatten_into(&mut out, None, map);
    }
    out
}

fn flatten_into(out: &mut RawRecord, prefix: Option<&str>, map: &RawRecord) {
    for (key, value) in map {
        let name = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(out, Some(&name), inner),
            other => {
                out.insert(name, other.clone());
            }
        }
    }
}

pub fn has_column(rows: &[RawRecord], name: &str) -> bool {
    rows.iter().any(|row| row.contains_key(name))
}

pub fn lower_strip_columns(rows: &[RawRecord]) -> Vec<RawRecord> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|(key, value)| (key.trim().to_lowercase(), value.clone()))
                .collect()
        })
        .collect()
}

/// Renames `alias` to `canonical` when the table lacks the canonical column.
pub fn rename_alias(rows: &[RawRecord], canonical: &str, alias: &str) -> Vec<RawRecord> {
    if has_column(rows, canonical) || !has_column(rows, alias) {
        return rows.to_vec();
    }
    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            if let Some(value) = row.remove(alias) {
                row.insert(canonical.to_string(), value);
            }
            row
        })
        .collect()
}

/// Coerces each listed column that exists to a number, or null when the
/// cell does not parse.
pub fn to_numeric(rows: &[RawRecord], cols: &[&str]) -> Vec<RawRecord> {
    rows.iter()
        .map(|row| {
            let mut row = row.clone();
            for col in cols {
                if let Some(cell) = row.get_mut(*col) {
                    *cell = coerce_number(cell)
                        .and_then(Number::from_f64)
                        .map(Value::Number)
                        .unwrap_or(Value::Null);
                }
            }
            row
        })
        .collect()
}

/// Canonicalizes the sales channel column: alias rename, "Unknown" fill,
/// stringify and trim.
pub fn normalize_sales_channel(rows: &[RawRecord]) -> Vec<RawRecord> {
    let mut rows = rename_alias(rows, SALES_CHANNEL, "salesChannel");
    if !has_column(&rows, SALES_CHANNEL) {
        return rows;
    }
    for row in rows.iter_mut() {
        let channel = row
            .get(SALES_CHANNEL)
            .and_then(coerce_text)
            .map(|text| text.trim().to_string())
            .unwrap_or_else(|| UNKNOWN_CHANNEL.to_string());
        row.insert(SALES_CHANNEL.to_string(), Value::String(channel));
    }
    rows
}

pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

pub fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn coerce_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() == Some(1.0),
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Parses RFC 3339, naive ISO timestamps (taken as UTC), plain dates and
/// epoch milliseconds. Anything else is missing.
pub fn coerce_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_timestamp(s.trim()),
        Value::Number(n) => n.as_i64().and_then(DateTime::from_timestamp_millis),
        _ => None,
    }
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|parsed| parsed.and_utc())
}

fn text(row: &RawRecord, aliases: Aliases) -> Option<String> {
    first_match(row, aliases).and_then(coerce_text)
}

fn number(row: &RawRecord, aliases: Aliases) -> Option<f64> {
    first_match(row, aliases).and_then(coerce_number)
}

fn flag(row: &RawRecord, aliases: Aliases) -> bool {
    first_match(row, aliases).map(coerce_flag).unwrap_or(false)
}

fn timestamp(row: &RawRecord, aliases: Aliases) -> Option<DateTime<Utc>> {
    first_match(row, aliases).and_then(coerce_timestamp)
}

pub fn order_record(row: &RawRecord) -> OrderRecord {
    OrderRecord {
        id: text(row, columns::order::ID),
        store: text(row, columns::order::STORE),
        channel: text(row, columns::order::CHANNEL)
            .map(|channel| channel.trim().to_string())
            .unwrap_or_else(|| UNKNOWN_CHANNEL.to_string()),
        amount: number(row, columns::order::AMOUNT),
        prep_time: number(row, columns::order::PREP_TIME),
        created_at: timestamp(row, columns::order::CREATED_AT),
    }
}

pub fn customer_record(row: &RawRecord) -> CustomerRecord {
    CustomerRecord {
        id: text(row, columns::customer::ID),
        last_order: timestamp(row, columns::customer::LAST_ORDER),
        total_spent: number(row, columns::customer::TOTAL_SPENT),
        avg_ticket: number(row, columns::customer::AVG_TICKET),
        is_vip: flag(row, columns::customer::VIP),
        churn_risk: flag(row, columns::customer::CHURN_RISK),
        segment: text(row, columns::customer::SEGMENT),
        status: text(row, columns::customer::STATUS),
    }
}

pub fn campaign_record(row: &RawRecord) -> CampaignRecord {
    CampaignRecord {
        id: text(row, columns::campaign::ID),
        name: text(row, columns::campaign::NAME),
        store: text(row, columns::campaign::STORE),
        channel: text(row, columns::campaign::CHANNEL),
        kind: text(row, columns::campaign::KIND),
        badge: text(row, columns::campaign::BADGE),
        hour: number(row, columns::campaign::HOUR).map(|hour| hour.trunc() as i64),
        conversion_rate: number(row, columns::campaign::CONVERSION),
        sent: number(row, columns::campaign::SENT),
        delivered: number(row, columns::campaign::DELIVERED),
        sent_at: timestamp(row, columns::campaign::SENT_AT),
    }
}

pub fn queue_entry(row: &RawRecord) -> CampaignQueueEntry {
    let response = text(row, columns::queue::RESPONSE);
    CampaignQueueEntry {
        campaign_id: text(row, columns::queue::CAMPAIGN_ID),
        class: classify_response(response.as_deref()),
        response,
    }
}

/// Full order pipeline: channel canonicalization, numeric coercion, typing.
pub fn orders(rows: &[RawRecord]) -> Vec<OrderRecord> {
    let rows = normalize_sales_channel(rows);
    let rows = to_numeric(&rows, ORDER_NUMERIC_COLUMNS);
    rows.iter().map(order_record).collect()
}

pub fn customers(rows: &[RawRecord]) -> Vec<CustomerRecord> {
    rows.iter().map(customer_record).collect()
}

pub fn campaigns(rows: &[RawRecord]) -> Vec<CampaignRecord> {
    rows.iter().map(campaign_record).collect()
}

pub fn queue_entries(rows: &[RawRecord]) -> Vec<CampaignQueueEntry> {
    rows.iter().map(queue_entry).collect()
}
