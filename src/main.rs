use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use cannoli_insights::config::Settings;
use cannoli_insights::export::{self, ExportFormat};
use cannoli_insights::models::Period;
use cannoli_insights::report;
use cannoli_insights::sentiment::LexiconPolarity;
use cannoli_insights::snapshot::DataDir;
use cannoli_insights::{generate_admin_report, generate_client_report};

#[derive(Parser)]
#[command(name = "cannoli-insights")]
#[command(about = "Admin and client dashboards for the Cannoli restaurant chain", long_about = None)]
struct Cli {
    /// Directory holding the JSON snapshots
    #[arg(long, env = "CANNOLI_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,
    /// Seed for the fallback engagement rates
    #[arg(long, env = "CANNOLI_SEED", default_value_t = 42, global = true)]
    seed: u64,
    #[arg(long, env = "CANNOLI_ANOMALY_THRESHOLD", default_value_t = 2.0, global = true)]
    anomaly_threshold: f64,
    /// Forecast horizon in days
    #[arg(long, env = "CANNOLI_FORECAST_HORIZON", default_value_t = 7, global = true)]
    horizon: usize,
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the admin dashboard as JSON
    Admin {
        #[arg(long, default_value = "30d")]
        period: Period,
    },
    /// Print the client dashboard as JSON
    Client {
        #[arg(long, default_value = "30d")]
        period: Period,
    },
    /// Write a markdown digest of the client dashboard
    Report {
        #[arg(long, default_value = "30d")]
        period: Period,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Export one report table as CSV or JSON
    Export {
        #[arg(long, default_value = "30d")]
        period: Period,
        #[arg(long, value_enum)]
        table: Table,
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
        #[arg(long, default_value = "exports")]
        out_dir: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Table {
    Stores,
    Channels,
    Campaigns,
    Forecast,
    Anomalies,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Table::Stores => "stores",
            Table::Channels => "channels",
            Table::Campaigns => "campaigns",
            Table::Forecast => "forecast",
            Table::Anomalies => "anomalies",
        }
    }
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            data_dir: self.data_dir.clone(),
            seed: self.seed,
            anomaly_threshold: self.anomaly_threshold,
            forecast_horizon: self.horizon,
            log_json: self.log_json,
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cannoli_insights=info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.settings();
    init_tracing(settings.log_json);

    let source = DataDir::new(&settings.data_dir);
    let ctx = settings.context(Utc::now());
    let scorer = LexiconPolarity::new();

    match cli.command {
        Commands::Admin { period } => {
            let report = generate_admin_report(&source, period, &ctx);
            let json = serde_json::to_string_pretty(&report)
                .context("failed to serialize admin report")?;
            println!("{json}");
        }
        Commands::Client { period } => {
            let report = generate_client_report(&source, period, &ctx, &scorer);
            let json = serde_json::to_string_pretty(&report)
                .context("failed to serialize client report")?;
            println!("{json}");
        }
        Commands::Report { period, out } => {
            let report = generate_client_report(&source, period, &ctx, &scorer);
            std::fs::write(&out, report::render_client_markdown(&report))
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export {
            period,
            table,
            format,
            out_dir,
        } => {
            let name = format!("{}_{period}", table.name());
            let written = match table {
                Table::Stores => {
                    let admin = generate_admin_report(&source, period, &ctx);
                    export::export_rows(&admin.top_stores, &name, format, &out_dir)
                }
                Table::Channels => {
                    let admin = generate_admin_report(&source, period, &ctx);
                    export::export_rows(&admin.sales_channels, &name, format, &out_dir)
                }
                Table::Campaigns => {
                    let admin = generate_admin_report(&source, period, &ctx);
                    export::export_rows(&admin.campaign_engagement, &name, format, &out_dir)
                }
                Table::Forecast => {
                    let client = generate_client_report(&source, period, &ctx, &scorer);
                    export::export_rows(&client.revenue_forecast, &name, format, &out_dir)
                }
                Table::Anomalies => {
                    let client = generate_client_report(&source, period, &ctx, &scorer);
                    export::export_rows(&client.anomalies, &name, format, &out_dir)
                }
            }
            .with_context(|| format!("failed to export {name}"))?;

            match written {
                Some(path) => println!("Exported {} to {}.", table.name(), path.display()),
                None => println!("No rows to export for {}.", table.name()),
            }
        }
    }

    Ok(())
}
