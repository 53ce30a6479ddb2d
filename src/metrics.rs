use crate::config::{CURRENCY_SYMBOL, MONTHLY_WINDOW, WEEKLY_WINDOW};
use crate::data::PriceSeries;
use serde::Serialize;

/// Point-in-time and windowed statistics for one symbol.
///
/// Percentages are signed and in percent units. Every field is optional:
/// an empty history yields an empty snapshot instead of an error.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub latest_price: Option<f64>,
    pub daily_change_pct: Option<f64>,
    pub weekly_change_pct: Option<f64>,
    pub monthly_change_pct: Option<f64>,
    pub predicted_future_price: Option<f64>,
    pub predicted_change_pct: Option<f64>,
}

/// One summary card as shown on the dashboard.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricCard {
    pub label: &'static str,
    pub value: String,
    pub delta: Option<String>,
}

pub fn calculate_metrics(historical: &PriceSeries, predicted: &PriceSeries) -> MetricsSnapshot {
    let Some(latest) = historical.close_back(0) else {
        return MetricsSnapshot::default();
    };

    let change_from = |offset: usize| {
        historical
            .close_back(offset)
            .and_then(|base| percent_change(base, latest))
    };

    let predicted_future_price = predicted.last().map(|p| p.close);

    MetricsSnapshot {
        latest_price: Some(latest),
        daily_change_pct: change_from(1),
        weekly_change_pct: change_from(WEEKLY_WINDOW),
        monthly_change_pct: change_from(MONTHLY_WINDOW),
        predicted_future_price,
        predicted_change_pct: predicted_future_price
            .and_then(|future| percent_change(latest, future)),
    }
}

/// `(to - from) / from * 100`, undefined when the base is zero.
pub fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    let pct = (to - from) / from * 100.0;
    pct.is_finite().then_some(pct)
}

impl MetricsSnapshot {
    pub fn cards(&self) -> [MetricCard; 4] {
        [
            MetricCard {
                label: "Current Price",
                value: format_price(self.latest_price),
                delta: self.daily_change_pct.map(format_pct),
            },
            MetricCard {
                label: "Weekly Change",
                value: self.weekly_change_pct.map(format_pct).unwrap_or_else(na),
                delta: None,
            },
            MetricCard {
                label: "Monthly Change",
                value: self.monthly_change_pct.map(format_pct).unwrap_or_else(na),
                delta: None,
            },
            MetricCard {
                label: "Predicted (End of Period)",
                value: format_price(self.predicted_future_price),
                delta: self.predicted_change_pct.map(format_pct),
            },
        ]
    }
}

fn format_price(price: Option<f64>) -> String {
    price
        .map(|p| format!("{}{:.2}", CURRENCY_SYMBOL, p))
        .unwrap_or_else(na)
}

fn format_pct(pct: f64) -> String {
    format!("{:.2}%", pct)
}

fn na() -> String {
    "N/A".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::from_closes(start(), closes)
    }

    #[test]
    fn test_empty_history_gives_empty_snapshot() {
        let snapshot = calculate_metrics(&series(&[]), &series(&[120.0]));
        assert_eq!(snapshot, MetricsSnapshot::default());
    }

    #[test]
    fn test_single_point_has_no_daily_change() {
        let snapshot = calculate_metrics(&series(&[100.0]), &series(&[]));
        assert_eq!(snapshot.latest_price, Some(100.0));
        assert!(snapshot.daily_change_pct.is_none());
        assert!(snapshot.predicted_future_price.is_none());
        assert!(snapshot.predicted_change_pct.is_none());
    }

    #[test]
    fn test_short_history_only_has_daily_change() {
        for len in 2..=5 {
            let closes: Vec<f64> = (0..len).map(|i| 100.0 + i as f64).collect();
            let snapshot = calculate_metrics(&series(&closes), &series(&[]));
            assert!(snapshot.daily_change_pct.is_some(), "len {len}");
            assert!(snapshot.weekly_change_pct.is_none(), "len {len}");
            assert!(snapshot.monthly_change_pct.is_none(), "len {len}");
        }
    }

    #[test]
    fn test_two_day_round_trip() {
        let snapshot = calculate_metrics(&series(&[100.0, 102.0]), &series(&[]));
        assert!((snapshot.daily_change_pct.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_window_uses_sixth_from_last() {
        let closes = [50.0, 80.0, 81.0, 82.0, 83.0, 84.0];
        let snapshot = calculate_metrics(&series(&closes), &series(&[]));
        let expected = (84.0 - 50.0) / 50.0 * 100.0;
        assert!((snapshot.weekly_change_pct.unwrap() - expected).abs() < 1e-9);
        assert!(snapshot.monthly_change_pct.is_none());
    }

    #[test]
    fn test_monthly_window_matches_formula() {
        for len in [22usize, 23, 40] {
            let closes: Vec<f64> = (0..len).map(|i| 90.0 + (i as f64 * 1.7).sin() * 5.0).collect();
            let snapshot = calculate_metrics(&series(&closes), &series(&[]));
            let base = closes[len - 22];
            let expected = (closes[len - 1] - base) / base * 100.0;
            assert!((snapshot.monthly_change_pct.unwrap() - expected).abs() < 1e-9);
        }

        let closes: Vec<f64> = (0..21).map(|i| 100.0 + i as f64).collect();
        assert!(calculate_metrics(&series(&closes), &series(&[])).monthly_change_pct.is_none());
    }

    #[test]
    fn test_end_to_end_scenario() {
        // 30 days from 100 to 130, then 5 forecast days from 131 to 140.
        let historical: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 30.0 / 29.0).collect();
        let predicted = [131.0, 133.0, 135.5, 138.0, 140.0];
        let snapshot = calculate_metrics(&series(&historical), &series(&predicted));

        assert!((snapshot.latest_price.unwrap() - 130.0).abs() < 1e-9);
        let day_eight = historical[30 - 22];
        let expected_monthly = (130.0 - day_eight) / day_eight * 100.0;
        assert!((snapshot.monthly_change_pct.unwrap() - expected_monthly).abs() < 1e-9);
        assert_eq!(snapshot.predicted_future_price, Some(140.0));
        assert!((snapshot.predicted_change_pct.unwrap() - 7.6923).abs() < 1e-3);
    }

    #[test]
    fn test_zero_base_is_undefined() {
        let snapshot = calculate_metrics(&series(&[0.0, 5.0]), &series(&[10.0]));
        assert!(snapshot.daily_change_pct.is_none());

        let snapshot = calculate_metrics(&series(&[5.0, 0.0]), &series(&[10.0]));
        assert_eq!(snapshot.latest_price, Some(0.0));
        assert_eq!(snapshot.predicted_future_price, Some(10.0));
        assert!(snapshot.predicted_change_pct.is_none());
    }

    #[test]
    fn test_cards_formatting() {
        let snapshot = calculate_metrics(&series(&[100.0, 102.0]), &series(&[110.0]));
        let cards = snapshot.cards();

        assert_eq!(cards[0].label, "Current Price");
        assert_eq!(cards[0].value, "₹102.00");
        assert_eq!(cards[0].delta.as_deref(), Some("2.00%"));
        assert_eq!(cards[1].value, "N/A");
        assert_eq!(cards[2].value, "N/A");
        assert_eq!(cards[3].value, "₹110.00");
        assert_eq!(cards[3].delta.as_deref(), Some("7.84%"));

        let empty = MetricsSnapshot::default().cards();
        assert_eq!(empty[0].value, "N/A");
        assert!(empty[0].delta.is_none());
    }
}
