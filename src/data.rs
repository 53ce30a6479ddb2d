use crate::config::{
    CLOSE_COLUMN, DATE_COLUMN, FILE_EXTENSION, HISTORICAL_DIR, PREDICTIONS_DIR, VOLUME_COLUMN,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// A single trading day: closing price plus optional volume.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<u64>,
}

/// Ordered daily series for one symbol, either observed or forecast.
///
/// Rows keep file order. `has_volume` records whether the source file had a
/// `Volume` column at all, which is independent of how many rows survive a
/// date filter.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
    #[serde(skip)]
    pub has_volume: bool,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>, has_volume: bool) -> Self {
        Self { points, has_volume }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// Close `offset` points before the last one (`0` is the latest close).
    pub fn close_back(&self, offset: usize) -> Option<f64> {
        let idx = self.points.len().checked_sub(offset + 1)?;
        Some(self.points[idx].close)
    }

    pub fn min_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).min()
    }

    pub fn max_date(&self) -> Option<NaiveDate> {
        self.points.iter().map(|p| p.date).max()
    }

    /// Points dated within `[start, end]`, both ends inclusive.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            points: self
                .points
                .iter()
                .filter(|p| p.date >= start && p.date <= end)
                .cloned()
                .collect(),
            has_volume: self.has_volume,
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn volumes(&self) -> Vec<Option<u64>> {
        self.points.iter().map(|p| p.volume).collect()
    }

    #[cfg(test)]
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                date: start + chrono::Duration::days(i as i64),
                close,
                volume: None,
            })
            .collect();
        Self::new(points, false)
    }
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("cannot read {} for {symbol}: {source}", .path.display())]
    Unavailable {
        symbol: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} for {symbol} is malformed: {reason}", .path.display())]
    Malformed {
        symbol: String,
        path: PathBuf,
        reason: String,
    },
}

/// File layout for per-symbol inputs: `{root}/data/{symbol}.csv` and
/// `{root}/predictions/{symbol}.csv`.
#[derive(Clone, Debug)]
pub struct StoragePaths {
    root: PathBuf,
}

impl StoragePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn historical_path(&self, symbol: &str) -> PathBuf {
        self.root
            .join(HISTORICAL_DIR)
            .join(format!("{}.{}", symbol, FILE_EXTENSION))
    }

    pub fn prediction_path(&self, symbol: &str) -> PathBuf {
        self.root
            .join(PREDICTIONS_DIR)
            .join(format!("{}.{}", symbol, FILE_EXTENSION))
    }
}

/// Loads the historical and prediction series for `symbol`.
///
/// Both files must load; there is no partial result.
pub fn load_stock_data(
    paths: &StoragePaths,
    symbol: &str,
) -> Result<(PriceSeries, PriceSeries), DataError> {
    let historical_path = paths.historical_path(symbol);
    let prediction_path = paths.prediction_path(symbol);

    let historical = load_series(&historical_path, symbol)?;
    let predicted = load_series(&prediction_path, symbol)?;

    info!(
        "Loaded {} historical and {} predicted rows for {}",
        historical.len(),
        predicted.len(),
        symbol
    );
    warn_on_ordering(symbol, &historical, &predicted);

    Ok((historical, predicted))
}

pub fn load_series(path: &Path, symbol: &str) -> Result<PriceSeries, DataError> {
    let file = File::open(path).map_err(|source| DataError::Unavailable {
        symbol: symbol.to_string(),
        path: path.to_path_buf(),
        source,
    })?;
    parse_series(file, path, symbol)
}

/// Parses `Date`/`Close`[/`Volume`] rows from any CSV source.
pub fn parse_series<R: Read>(
    source: R,
    path: &Path,
    symbol: &str,
) -> Result<PriceSeries, DataError> {
    let malformed = |reason: String| DataError::Malformed {
        symbol: symbol.to_string(),
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader.headers().map_err(|e| csv_error(e, path, symbol))?.clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let date_idx = column(DATE_COLUMN)
        .ok_or_else(|| malformed(format!("missing required column '{}'", DATE_COLUMN)))?;
    let close_idx = column(CLOSE_COLUMN)
        .ok_or_else(|| malformed(format!("missing required column '{}'", CLOSE_COLUMN)))?;
    let volume_idx = column(VOLUME_COLUMN);

    let mut points = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_error(e, path, symbol))?;
        // Header is line 1.
        let line = row + 2;

        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date)
            .ok_or_else(|| malformed(format!("line {}: invalid date '{}'", line, raw_date)))?;

        let raw_close = record.get(close_idx).unwrap_or("");
        let close = raw_close
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| malformed(format!("line {}: invalid close '{}'", line, raw_close)))?;

        let volume = match volume_idx {
            Some(idx) => {
                let raw_volume = record.get(idx).unwrap_or("");
                parse_volume(raw_volume).map_err(|_| {
                    malformed(format!("line {}: invalid volume '{}'", line, raw_volume))
                })?
            }
            None => None,
        };

        points.push(PricePoint { date, close, volume });
    }

    Ok(PriceSeries::new(points, volume_idx.is_some()))
}

fn csv_error(err: csv::Error, path: &Path, symbol: &str) -> DataError {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => DataError::Unavailable {
            symbol: symbol.to_string(),
            path: path.to_path_buf(),
            source,
        },
        _ => DataError::Malformed {
            symbol: symbol.to_string(),
            path: path.to_path_buf(),
            reason: message,
        },
    }
}

/// Accepts plain dates, naive timestamps and offset timestamps; keeps the
/// calendar date as written.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%:z", "%Y-%m-%d %H:%M:%S%z"] {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.date_naive());
        }
    }

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// Empty cells are missing volume; integral floats like `1200.0` are accepted.
fn parse_volume(raw: &str) -> Result<Option<u64>, ()> {
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(Some(v));
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u64::MAX as f64 => {
            Ok(Some(v as u64))
        }
        _ => Err(()),
    }
}

fn warn_on_ordering(symbol: &str, historical: &PriceSeries, predicted: &PriceSeries) {
    if historical.points.windows(2).any(|w| w[1].date <= w[0].date) {
        warn!(
            "Historical dates for {} are not strictly increasing; the boundary marker may mislead",
            symbol
        );
    }

    let last_historical = historical.max_date();
    let first_predicted = predicted.min_date();
    if let (Some(last), Some(first)) = (last_historical, first_predicted) {
        if first < last {
            warn!(
                "Predictions for {} start at {} before the last historical date {}",
                symbol, first, last
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn parse(csv: &str) -> Result<PriceSeries, DataError> {
        parse_series(csv.as_bytes(), Path::new("data/TEST.csv"), "TEST")
    }

    fn write_inputs(root: &Path, symbol: &str, historical: &str, predicted: &str) {
        fs::create_dir_all(root.join("data")).unwrap();
        fs::create_dir_all(root.join("predictions")).unwrap();
        fs::write(root.join("data").join(format!("{symbol}.csv")), historical).unwrap();
        fs::write(root.join("predictions").join(format!("{symbol}.csv")), predicted).unwrap();
    }

    #[test]
    fn test_parse_minimal_columns() {
        let series = parse("Date,Close\n2024-01-01,100\n2024-01-02,102.5\n").unwrap();

        assert_eq!(series.len(), 2);
        assert!(!series.has_volume);
        assert_eq!(series.points[0].date, date(2024, 1, 1));
        assert_eq!(series.points[1].close, 102.5);
        assert_eq!(series.points[1].volume, None);
    }

    #[test]
    fn test_parse_extra_columns_and_volume() {
        let csv = "Date,Open,High,Low,Close,Volume\n\
                   2024-01-01,99,101,98,100,1500\n\
                   2024-01-02,100,103,99,102,2000.0\n\
                   2024-01-03,102,104,101,103,\n";
        let series = parse(csv).unwrap();

        assert!(series.has_volume);
        assert_eq!(series.volumes(), vec![Some(1500), Some(2000), None]);
        assert_eq!(series.closes(), vec![100.0, 102.0, 103.0]);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_date("2024-03-05"), Some(date(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05 00:00:00"), Some(date(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05 00:00:00+05:30"), Some(date(2024, 3, 5)));
        assert_eq!(parse_date("2024-03-05T09:15:00Z"), Some(date(2024, 3, 5)));
        assert_eq!(parse_date("05/03/2024x"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_missing_required_column_is_malformed() {
        let err = parse("Date,Open\n2024-01-01,100\n").unwrap_err();
        match err {
            DataError::Malformed { reason, .. } => assert!(reason.contains("Close")),
            other => panic!("expected malformed error, got {other:?}"),
        }

        assert!(matches!(parse(""), Err(DataError::Malformed { .. })));
    }

    #[test]
    fn test_bad_cells_are_malformed() {
        let err = parse("Date,Close\n2024-01-01,100\nnot-a-date,101\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));

        assert!(matches!(
            parse("Date,Close\n2024-01-01,abc\n"),
            Err(DataError::Malformed { .. })
        ));
        assert!(matches!(
            parse("Date,Close,Volume\n2024-01-01,100,-5\n"),
            Err(DataError::Malformed { .. })
        ));
    }

    #[test]
    fn test_load_stock_data_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        write_inputs(
            dir.path(),
            "TCS.BO",
            "Date,Close,Volume\n2024-01-01,100,10\n2024-01-02,102,20\n",
            "Date,Close\n2024-01-03,103\n2024-01-04,104\n",
        );

        let paths = StoragePaths::new(dir.path());
        let (historical, predicted) = load_stock_data(&paths, "TCS.BO").unwrap();

        assert_eq!(historical.len(), 2);
        assert!(historical.has_volume);
        assert_eq!(predicted.max_date(), Some(date(2024, 1, 4)));
    }

    #[test]
    fn test_missing_prediction_file_fails_whole_load() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data/INFY.BO.csv"), "Date,Close\n2024-01-01,1\n").unwrap();

        let paths = StoragePaths::new(dir.path());
        let err = load_stock_data(&paths, "INFY.BO").unwrap_err();
        match err {
            DataError::Unavailable { symbol, path, .. } => {
                assert_eq!(symbol, "INFY.BO");
                assert!(path.ends_with("predictions/INFY.BO.csv"));
            }
            other => panic!("expected unavailable error, got {other:?}"),
        }
    }

    #[test]
    fn test_storage_paths_layout() {
        let paths = StoragePaths::new("/srv/stocks");
        assert_eq!(
            paths.historical_path("SBIN.BO"),
            PathBuf::from("/srv/stocks/data/SBIN.BO.csv")
        );
        assert_eq!(
            paths.prediction_path("SBIN.BO"),
            PathBuf::from("/srv/stocks/predictions/SBIN.BO.csv")
        );
    }

    #[test]
    fn test_series_helpers() {
        let series = PriceSeries::from_closes(date(2024, 1, 1), &[1.0, 2.0, 3.0]);
        assert_eq!(series.close_back(0), Some(3.0));
        assert_eq!(series.close_back(2), Some(1.0));
        assert_eq!(series.close_back(3), None);
        assert_eq!(series.min_date(), Some(date(2024, 1, 1)));
        assert_eq!(series.max_date(), Some(date(2024, 1, 3)));

        let single = series.between(date(2024, 1, 2), date(2024, 1, 2));
        assert_eq!(single.closes(), vec![2.0]);
    }
}
