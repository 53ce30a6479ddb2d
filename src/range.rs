use crate::config::DEFAULT_START_OFFSET_DAYS;
use crate::data::PriceSeries;
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Selectable span: first historical date through last predicted date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DateBounds {
    pub min: NaiveDate,
    pub max: NaiveDate,
}

/// Inclusive `[start, end]` window applied to both series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateBounds {
    /// Falls back to the other series when one side is empty; `None` when
    /// both are.
    pub fn from_series(historical: &PriceSeries, predicted: &PriceSeries) -> Option<Self> {
        let min = historical.min_date().or_else(|| predicted.min_date())?;
        let max = predicted.max_date().or_else(|| historical.max_date())?;
        Some(Self { min, max })
    }

    pub fn default_range(&self) -> DateRange {
        let start = self
            .min
            .checked_add_signed(Duration::days(DEFAULT_START_OFFSET_DAYS))
            .map_or(self.max, |d| d.min(self.max));
        DateRange { start, end: self.max }
    }

    pub fn clamp(&self, date: NaiveDate) -> NaiveDate {
        if date < self.min {
            self.min
        } else if date > self.max {
            self.max
        } else {
            date
        }
    }

    /// Requested bounds clamped into range; missing ends take the defaults.
    /// A start after the end is kept as-is and filters to nothing.
    pub fn resolve(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DateRange {
        let defaults = self.default_range();
        DateRange {
            start: start.map(|d| self.clamp(d)).unwrap_or(defaults.start),
            end: end.map(|d| self.clamp(d)).unwrap_or(defaults.end),
        }
    }
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn filter(&self, series: &PriceSeries) -> PriceSeries {
        series.between(self.start, self.end)
    }
}
