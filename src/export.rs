//! Writes report tables to disk as CSV or JSON.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::InsightsResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unsupported export format '{other}' (use csv or json)")),
        }
    }
}

/// Writes `rows` to `<dir>/<name>.<ext>` and returns the path. Empty row
/// sets write nothing and return `None`.
pub fn export_rows<T: Serialize>(
    rows: &[T],
    name: &str,
    format: ExportFormat,
    dir: &Path,
) -> InsightsResult<Option<PathBuf>> {
    if rows.is_empty() {
        warn!(table = name, "nothing to export");
        return Ok(None);
    }

    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{name}.{}", format.extension()));
    match format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(&path)?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        ExportFormat::Json => {
            let file = File::create(&path)?;
            serde_json::to_writer_pretty(file, rows)?;
        }
    }

    info!(table = name, rows = rows.len(), file = %path.display(), "table exported");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelKpi;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("cannoli-export-{name}-{}", std::process::id()))
    }

    fn channels() -> Vec<ChannelKpi> {
        vec![
            ChannelKpi {
                channel: "App".to_string(),
                orders: 3,
                revenue: 240.5,
                avg_ticket: Some(80.17),
                avg_prep_time: Some(22.0),
            },
            ChannelKpi {
                channel: "Unknown".to_string(),
                orders: 1,
                revenue: 0.0,
                avg_ticket: None,
                avg_prep_time: None,
            },
        ]
    }

    #[test]
    fn parses_formats() {
        assert_eq!("CSV".parse::<ExportFormat>(), Ok(ExportFormat::Csv));
        assert_eq!(" json ".parse::<ExportFormat>(), Ok(ExportFormat::Json));
        assert!("xlsx".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn writes_csv_with_header() {
        let dir = scratch_dir("csv");
        let path = export_rows(&channels(), "channels", ExportFormat::Csv, &dir)
            .unwrap()
            .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("channel,orders,revenue,avg_ticket,avg_prep_time")
        );
        assert_eq!(lines.next(), Some("App,3,240.5,80.17,22.0"));
        assert_eq!(lines.next(), Some("Unknown,1,0.0,,"));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn writes_json_array() {
        let dir = scratch_dir("json");
        let path = export_rows(&channels(), "channels", ExportFormat::Json, &dir)
            .unwrap()
            .unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn empty_tables_are_skipped() {
        let dir = scratch_dir("empty");
        let rows: Vec<ChannelKpi> = Vec::new();
        assert!(export_rows(&rows, "channels", ExportFormat::Csv, &dir)
            .unwrap()
            .is_none());
        assert!(!dir.exists());
    }
}
