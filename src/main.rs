mod catalog;
mod chart;
mod config;
mod dashboard;
mod data;
mod metrics;
mod range;
mod report;
mod webui;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use dashboard::{DashboardRequest, DashboardView};
use data::StoragePaths;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Stock price prediction dashboard: historical vs. predicted prices from CSV files",
    after_help = "EXAMPLES:
    # Summary for one symbol over the default range
    cargo run --release -- --symbol TCS.BO

    # Explicit range with raw tables, chart figure written to disk
    cargo run --release -- --symbol INFY.BO --start 2024-01-01 --end 2024-06-30 \\
        --show-tables --chart-out chart.json

    # Launch the browser dashboard
    cargo run --release -- --webui"
)]
struct Args {
    /// Ticker to load (default: first catalog entry)
    #[arg(long)]
    symbol: Option<String>,

    /// First date to show, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    start: Option<NaiveDate>,

    /// Last date to show, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_cli_date)]
    end: Option<NaiveDate>,

    /// Directory containing data/ and predictions/ (default: $DASHBOARD_DATA_ROOT or .)
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Print the known symbols and exit
    #[arg(long)]
    list_symbols: bool,

    /// Print the filtered historical and prediction tables
    #[arg(long)]
    show_tables: bool,

    /// Print the whole dashboard view as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Write the chart figure (Plotly JSON) to this file
    #[arg(long)]
    chart_out: Option<PathBuf>,

    /// Launch in WebUI mode
    #[arg(long)]
    webui: bool,

    /// WebUI server port
    #[arg(long, default_value_t = config::DEFAULT_WEBUI_PORT)]
    webui_port: u16,
}

fn parse_cli_date(raw: &str) -> Result<NaiveDate, String> {
    data::parse_date(raw).ok_or_else(|| format!("expected a date like 2024-01-31, got '{}'", raw))
}

/// A load failure ends the run with a non-zero exit status.
fn load_view(paths: &StoragePaths, request: &DashboardRequest) -> Result<DashboardView> {
    dashboard::render_dashboard(paths, request).map_err(|failure| {
        error!("{}", failure.message());
        anyhow::Error::new(failure)
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("stock_dashboard=info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    let args = Args::parse();

    if args.list_symbols {
        print!("{}", report::format_symbol_list());
        return Ok(());
    }

    let paths = StoragePaths::new(config::data_root(args.data_root.clone()));
    info!("Reading inputs under {}", paths.root().display());

    if args.webui {
        webui::run_webui_server(args.webui_port, paths)
            .await
            .context("WebUI failed")?;
        info!("WebUI exited.");
        return Ok(());
    }

    let request = DashboardRequest {
        symbol: args
            .symbol
            .as_deref()
            .map(str::trim)
            .unwrap_or(catalog::default_symbol())
            .to_string(),
        start: args.start,
        end: args.end,
    };

    let view = load_view(&paths, &request)?;

    if let Some(path) = &args.chart_out {
        match view.figure() {
            Some(figure) => {
                let body = serde_json::to_string_pretty(&figure)?;
                std::fs::write(path, body)
                    .with_context(|| format!("writing chart to {}", path.display()))?;
                info!("Chart written to {}", path.display());
            }
            None => error!("Could not create chart. Please check your data files."),
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", report::format_report(&view, args.show_tables));
    }

    Ok(())
}
