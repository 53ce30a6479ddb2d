use std::path::PathBuf;
use std::sync::OnceLock;
use tracing::{info, warn};

static DATA_ROOT: OnceLock<PathBuf> = OnceLock::new();

/// Directory (under the data root) holding observed price files.
pub const HISTORICAL_DIR: &str = "data";
/// Directory (under the data root) holding forecast price files.
pub const PREDICTIONS_DIR: &str = "predictions";
pub const FILE_EXTENSION: &str = "csv";

pub const DATE_COLUMN: &str = "Date";
pub const CLOSE_COLUMN: &str = "Close";
pub const VOLUME_COLUMN: &str = "Volume";

/// Trading days (data points, not calendar days) behind the latest close.
pub const WEEKLY_WINDOW: usize = 5;
pub const MONTHLY_WINDOW: usize = 21;

/// Default start of the visible range, counted from the first historical date.
pub const DEFAULT_START_OFFSET_DAYS: i64 = 30;

pub const CURRENCY_SYMBOL: &str = "₹";
pub const CHART_HEIGHT: u32 = 600;
pub const DEFAULT_WEBUI_PORT: u16 = 8080;

/// Resolves the storage root once: explicit CLI value, then
/// `DASHBOARD_DATA_ROOT`, then the working directory.
pub fn data_root(cli_override: Option<PathBuf>) -> PathBuf {
    DATA_ROOT
        .get_or_init(|| {
            if let Some(path) = cli_override {
                info!("Using data root from --data-root: {}", path.display());
                return path;
            }

            match std::env::var("DASHBOARD_DATA_ROOT") {
                Ok(value) if !value.trim().is_empty() => {
                    let path = PathBuf::from(value.trim());
                    info!("Using data root from DASHBOARD_DATA_ROOT: {}", path.display());
                    path
                }
                Ok(_) => {
                    warn!("DASHBOARD_DATA_ROOT is set but empty; using the working directory");
                    PathBuf::from(".")
                }
                Err(_) => PathBuf::from("."),
            }
        })
        .clone()
}
