use crate::catalog::STOCK_CATALOG;
use crate::dashboard::DashboardView;
use crate::data::PriceSeries;
use std::fmt::Write;

/// Plain-text rendering of a dashboard view for the terminal.
pub fn format_report(view: &DashboardView, show_tables: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{} ({})", view.display_name, view.symbol);
    for card in &view.cards {
        match &card.delta {
            Some(delta) => {
                let _ = writeln!(out, "  {:<26} {:>12}  ({})", card.label, card.value, delta);
            }
            None => {
                let _ = writeln!(out, "  {:<26} {:>12}", card.label, card.value);
            }
        }
    }

    match (&view.bounds, &view.range) {
        (Some(bounds), Some(range)) => {
            let _ = writeln!(
                out,
                "  Range {} .. {} (available {} .. {})",
                range.start, range.end, bounds.min, bounds.max
            );
        }
        _ => {
            let _ = writeln!(out, "  No dated rows available");
        }
    }
    let _ = writeln!(
        out,
        "  Showing {} historical and {} predicted rows",
        view.historical.len(),
        view.predicted.len()
    );

    if let Some(chart) = &view.chart {
        let marker = if chart.boundary_visible(view.range.as_ref()) {
            chart
                .boundary
                .as_ref()
                .map(|b| format!(", {} at {}", b.annotation, b.date))
                .unwrap_or_default()
        } else {
            String::new()
        };
        let volume = if chart.has_secondary_axis() { ", with volume" } else { "" };
        let _ = writeln!(out, "  Chart: {}{}{}", chart.layout.title, volume, marker);
    }

    if show_tables {
        write_table(&mut out, "Historical Data", &view.historical);
        write_table(&mut out, "Prediction Data", &view.predicted);
    }

    out
}

fn write_table(out: &mut String, title: &str, series: &PriceSeries) {
    let _ = writeln!(out, "\n{}", title);
    let _ = writeln!(out, "  {:<12} {:>12} {:>14}", "Date", "Close", "Volume");
    for point in &series.points {
        let volume = point.volume.map(|v| v.to_string()).unwrap_or_default();
        let _ = writeln!(
            out,
            "  {:<12} {:>12.2} {:>14}",
            point.date.to_string(),
            point.close,
            volume
        );
    }
}

pub fn format_symbol_list() -> String {
    let mut out = String::new();
    for (symbol, name) in STOCK_CATALOG {
        let _ = writeln!(out, "{:<16} {}", symbol, name);
    }
    out
}
