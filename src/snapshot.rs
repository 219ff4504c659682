//! Snapshot loading from a directory of JSON exports.

use std::io::ErrorKind;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, warn};

use crate::columns::RawRecord;
use crate::error::{InsightsError, InsightsResult};
use crate::models::{CampaignQueueEntry, CampaignRecord, CustomerRecord, OrderRecord, Period};
use crate::normalize;

/// The four "API ready" record sets behind the admin dashboard.
#[derive(Debug, Clone, Default)]
pub struct AdminSnapshot {
    pub campaigns: Vec<CampaignRecord>,
    pub queue: Vec<CampaignQueueEntry>,
    pub customers: Vec<CustomerRecord>,
    pub orders: Vec<OrderRecord>,
}

/// One trailing-window export behind the client dashboard.
#[derive(Debug, Clone, Default)]
pub struct PeriodSnapshot {
    pub orders: Vec<OrderRecord>,
    pub customers: Vec<CustomerRecord>,
    pub campaigns: Vec<CampaignRecord>,
    pub queue: Vec<CampaignQueueEntry>,
}

pub trait SnapshotSource {
    /// Never fails: unreadable files become empty record sets.
    fn load_admin(&self) -> AdminSnapshot;

    /// Strict load: any unreadable file fails the whole snapshot.
    fn load_period(&self, period: Period) -> InsightsResult<PeriodSnapshot>;

    /// Lenient load for the period being reported on. Sources that can
    /// recover per file should override this; the default drops the whole
    /// snapshot on failure.
    fn load_current(&self, period: Period) -> PeriodSnapshot {
        self.load_period(period).unwrap_or_else(|err| {
            warn!(period = %period, error = %err, "current snapshot unreadable, using empty snapshot");
            PeriodSnapshot::default()
        })
    }
}

/// Parses a JSON document into flattened rows. An array yields one row per
/// object element; a lone object yields one row.
pub fn parse_rows(text: &str) -> InsightsResult<Vec<RawRecord>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(items
            .iter()
            .filter(|item| item.is_object())
            .map(normalize::flatten)
            .collect()),
        value @ Value::Object(_) => Ok(vec![normalize::flatten(&value)]),
        other => Err(InsightsError::Snapshot(format!(
            "expected an array of records, found {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reads one file. A missing file is an empty table, not an error.
    pub fn read_table(&self, file: &str) -> InsightsResult<Vec<RawRecord>> {
        let path = self.root.join(file);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                warn!(file = %path.display(), "snapshot file not found, using empty table");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err.into()),
        };
        let rows = parse_rows(&text)
            .map_err(|err| InsightsError::Snapshot(format!("{}: {err}", path.display())))?;
        debug!(file = %path.display(), rows = rows.len(), "snapshot table loaded");
        Ok(rows)
    }

    fn read_table_lenient(&self, file: &str) -> Vec<RawRecord> {
        self.read_table(file).unwrap_or_else(|err| {
            warn!(error = %err, "unreadable snapshot file, using empty table");
            Vec::new()
        })
    }
}

impl SnapshotSource for DataDir {
    fn load_admin(&self) -> AdminSnapshot {
        let read = |file: &str| normalize::lower_strip_columns(&self.read_table_lenient(file));
        AdminSnapshot {
            campaigns: normalize::campaigns(&read("Campaign_API_ready.json")),
            queue: normalize::queue_entries(&read("CampaignQueue_API_ready.json")),
            customers: normalize::customers(&read("Customer_API_ready.json")),
            orders: normalize::orders(&read("Order_API_ready.json")),
        }
    }

    fn load_current(&self, period: Period) -> PeriodSnapshot {
        PeriodSnapshot {
            orders: normalize::orders(&self.read_table_lenient(&format!("orders_{period}.json"))),
            customers: normalize::customers(
                &self.read_table_lenient(&format!("customers_{period}.json")),
            ),
            campaigns: normalize::campaigns(&self.read_table_lenient("campaigns.json")),
            queue: normalize::queue_entries(
                &self.read_table_lenient(&format!("campaignqueue_{period}.json")),
            ),
        }
    }

    fn load_period(&self, period: Period) -> InsightsResult<PeriodSnapshot> {
        Ok(PeriodSnapshot {
            orders: normalize::orders(&self.read_table(&format!("orders_{period}.json"))?),
            customers: normalize::customers(&self.read_table(&format!("customers_{period}.json"))?),
            campaigns: normalize::campaigns(&self.read_table("campaigns.json")?),
            queue: normalize::queue_entries(
                &self.read_table(&format!("campaignqueue_{period}.json"))?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "cannoli-insights-{name}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn parse_rows_flattens_and_skips_scalars() {
        let rows = parse_rows(r#"[{"store": {"name": "Centro"}}, 3, {"id": 1}]"#).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].contains_key("store.name"));
        assert_eq!(parse_rows(r#"{"id": 1}"#).unwrap().len(), 1);
        assert!(parse_rows("42").is_err());
        assert!(parse_rows("not json").is_err());
    }

    #[test]
    fn missing_files_are_empty_tables() {
        let dir = scratch_dir("missing");
        let source = DataDir::new(&dir);
        assert!(source.read_table("nope.json").unwrap().is_empty());

        let admin = source.load_admin();
        assert!(admin.orders.is_empty() && admin.customers.is_empty());

        let period = source.load_period(Period::Days30).unwrap();
        assert!(period.orders.is_empty() && period.queue.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn admin_columns_are_lowercased() {
        let dir = scratch_dir("admin");
        fs::write(
            dir.join("Order_API_ready.json"),
            r#"[{"ID": 1, "SalesChannel": "App", "Total": {"OrderAmount": "80.5"}}]"#,
        )
        .unwrap();
        fs::write(dir.join("Customer_API_ready.json"), "{broken").unwrap();

        let admin = DataDir::new(&dir).load_admin();
        assert_eq!(admin.orders.len(), 1);
        assert_eq!(admin.orders[0].channel, "App");
        assert_eq!(admin.orders[0].amount, Some(80.5));
        assert!(admin.customers.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn broken_queue_keeps_current_customers() {
        let dir = scratch_dir("current");
        fs::write(
            dir.join("customers_90d.json"),
            r#"[{"id": 1, "status": "Active", "totalSpent": 100},
                {"id": 2, "status": "Active", "totalSpent": 300}]"#,
        )
        .unwrap();
        fs::write(dir.join("campaignqueue_90d.json"), "[{broken").unwrap();
        fs::write(dir.join("campaigns.json"), "{oops").unwrap();

        let source = DataDir::new(&dir);
        assert!(source.load_period(Period::Days90).is_err());

        let current = source.load_current(Period::Days90);
        assert_eq!(current.customers.len(), 2);
        assert_eq!(current.customers[1].total_spent, Some(300.0));
        assert!(current.queue.is_empty());
        assert!(current.campaigns.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_period_file_is_an_error() {
        let dir = scratch_dir("period");
        fs::write(dir.join("customers_60d.json"), "[1,").unwrap();
        assert!(DataDir::new(&dir).load_period(Period::Days60).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
