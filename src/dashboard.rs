use crate::catalog::display_name;
use crate::chart::{build_stock_chart, ChartSpec};
use crate::config::{CLOSE_COLUMN, DATE_COLUMN};
use crate::data::{load_stock_data, DataError, PriceSeries, StoragePaths};
use crate::metrics::{calculate_metrics, MetricCard, MetricsSnapshot};
use crate::range::{DateBounds, DateRange};
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

/// User selection driving one render cycle.
#[derive(Clone, Debug)]
pub struct DashboardRequest {
    pub symbol: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Everything the presentation layer needs for one symbol.
#[derive(Clone, Debug, Serialize)]
pub struct DashboardView {
    pub symbol: String,
    pub display_name: String,
    pub metrics: MetricsSnapshot,
    pub cards: [MetricCard; 4],
    pub bounds: Option<DateBounds>,
    pub range: Option<DateRange>,
    pub chart: Option<ChartSpec>,
    pub historical: PriceSeries,
    pub predicted: PriceSeries,
}

/// Load failure rendered inline; the dashboard stays usable.
#[derive(Debug)]
pub struct DashboardFailure {
    pub symbol: String,
    pub historical_path: PathBuf,
    pub prediction_path: PathBuf,
    pub cause: DataError,
}

impl DashboardFailure {
    pub fn message(&self) -> String {
        format!(
            "Could not load data for {}.\n\n\
             Please ensure you have CSV files named:\n\
             - {} (historical data)\n\
             - {} (prediction data)\n\n\
             Both files should contain at minimum columns for '{}' and '{}' price.\n\n\
             Cause: {}",
            self.symbol,
            self.historical_path.display(),
            self.prediction_path.display(),
            DATE_COLUMN,
            CLOSE_COLUMN,
            self.cause
        )
    }
}

impl std::fmt::Display for DashboardFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for DashboardFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Runs loader, metrics and chart builder for one request.
pub fn render_dashboard(
    paths: &StoragePaths,
    request: &DashboardRequest,
) -> Result<DashboardView, DashboardFailure> {
    let symbol = request.symbol.as_str();

    let (historical, predicted) = load_stock_data(paths, symbol).map_err(|cause| {
        warn!("Error loading data for {}: {}", symbol, cause);
        DashboardFailure {
            symbol: symbol.to_string(),
            historical_path: paths.historical_path(symbol),
            prediction_path: paths.prediction_path(symbol),
            cause,
        }
    })?;

    // Cards describe the whole dataset, not the visible window.
    let metrics = calculate_metrics(&historical, &predicted);
    let cards = metrics.cards();

    let bounds = DateBounds::from_series(&historical, &predicted);
    let range = bounds.map(|b| b.resolve(request.start, request.end));

    let (filtered_historical, filtered_predicted) = match &range {
        Some(range) => (range.filter(&historical), range.filter(&predicted)),
        None => (historical.clone(), predicted.clone()),
    };

    if let Some(range) = &range {
        if filtered_historical.is_empty() && filtered_predicted.is_empty() {
            info!(
                "No rows for {} between {} and {}",
                symbol, range.start, range.end
            );
        }
    }

    let chart = build_stock_chart(
        Some(&filtered_historical),
        Some(&filtered_predicted),
        historical.max_date(),
        symbol,
    );

    Ok(DashboardView {
        symbol: symbol.to_string(),
        display_name: display_name(symbol).to_string(),
        metrics,
        cards,
        bounds,
        range,
        chart,
        historical: filtered_historical,
        predicted: filtered_predicted,
    })
}

impl DashboardView {
    /// Plotly figure for the chart, honouring the selected range.
    pub fn figure(&self) -> Option<Value> {
        self.chart
            .as_ref()
            .map(|chart| chart.to_figure(self.range.as_ref()))
    }
}
