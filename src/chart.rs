use crate::catalog::display_name;
use crate::config::{CHART_HEIGHT, CURRENCY_SYMBOL};
use crate::data::PriceSeries;
use crate::range::DateRange;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Line,
    Bar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Primary,
    Secondary,
}

/// One plotted series sharing the date axis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Trace {
    pub name: &'static str,
    pub kind: TraceKind,
    pub axis: Axis,
    pub x: Vec<NaiveDate>,
    pub y: Vec<Option<f64>>,
    pub color: &'static str,
    pub dash: LineDash,
    pub hover_template: String,
}

/// Vertical line at the last observed date.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoundaryMarker {
    pub date: NaiveDate,
    pub color: &'static str,
    pub width: u32,
    pub dash: LineDash,
    pub annotation: &'static str,
    pub annotation_position: &'static str,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartLayout {
    pub title: String,
    pub x_axis_title: &'static str,
    pub y_axis_title: String,
    pub secondary_y_axis_title: Option<&'static str>,
    pub hover_mode: &'static str,
    pub height: u32,
    pub background_color: &'static str,
    pub grid_color: &'static str,
}

/// Declarative chart description; rendering is left to the consumer.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    pub traces: Vec<Trace>,
    pub boundary: Option<BoundaryMarker>,
    pub layout: ChartLayout,
}

/// Builds the price/volume chart for already filtered series.
///
/// `boundary` must come from the unfiltered history so the marker stays
/// fixed when the user narrows the range. Returns `None` when either series
/// is missing.
pub fn build_stock_chart(
    historical: Option<&PriceSeries>,
    predicted: Option<&PriceSeries>,
    boundary: Option<NaiveDate>,
    symbol: &str,
) -> Option<ChartSpec> {
    let historical = historical?;
    let predicted = predicted?;

    let mut traces = vec![
        Trace {
            name: "Historical Price",
            kind: TraceKind::Line,
            axis: Axis::Primary,
            x: historical.dates(),
            y: historical.closes().into_iter().map(Some).collect(),
            color: "blue",
            dash: LineDash::Solid,
            hover_template: format!(
                "%{{x}}<br>Price: {}%{{y:.2f}}<extra></extra>",
                CURRENCY_SYMBOL
            ),
        },
        Trace {
            name: "Predicted Price",
            kind: TraceKind::Line,
            axis: Axis::Primary,
            x: predicted.dates(),
            y: predicted.closes().into_iter().map(Some).collect(),
            color: "red",
            dash: LineDash::Dash,
            hover_template: format!(
                "%{{x}}<br>Predicted: {}%{{y:.2f}}<extra></extra>",
                CURRENCY_SYMBOL
            ),
        },
    ];

    if historical.has_volume {
        traces.push(Trace {
            name: "Volume",
            kind: TraceKind::Bar,
            axis: Axis::Secondary,
            x: historical.dates(),
            y: historical
                .volumes()
                .into_iter()
                .map(|v| v.map(|v| v as f64))
                .collect(),
            color: "rgba(0, 128, 0, 0.3)",
            dash: LineDash::Solid,
            hover_template: "%{x}<br>Volume: %{y:,}<extra></extra>".to_string(),
        });
    }

    let boundary = boundary.map(|date| BoundaryMarker {
        date,
        color: "green",
        width: 2,
        dash: LineDash::Dash,
        annotation: "Prediction Starts",
        annotation_position: "top right",
    });

    let layout = ChartLayout {
        title: format!("{} Stock Price Analysis", display_name(symbol)),
        x_axis_title: "Date",
        y_axis_title: format!("Price ({})", CURRENCY_SYMBOL),
        secondary_y_axis_title: historical.has_volume.then_some("Volume"),
        hover_mode: "x unified",
        height: CHART_HEIGHT,
        background_color: "white",
        grid_color: "#EBF0F8",
    };

    Some(ChartSpec {
        traces,
        boundary,
        layout,
    })
}

impl ChartSpec {
    pub fn has_secondary_axis(&self) -> bool {
        self.traces.iter().any(|t| t.axis == Axis::Secondary)
    }

    /// Whether the marker falls inside the visible range.
    pub fn boundary_visible(&self, range: Option<&DateRange>) -> bool {
        match (&self.boundary, range) {
            (Some(marker), Some(range)) => range.contains(marker.date),
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Plotly-compatible `{data, layout}` figure. The boundary marker is
    /// dropped when it lies outside `range`.
    pub fn to_figure(&self, range: Option<&DateRange>) -> Value {
        let data: Vec<Value> = self.traces.iter().map(trace_to_figure).collect();

        let mut layout = json!({
            "title": { "text": self.layout.title },
            "xaxis": {
                "title": { "text": self.layout.x_axis_title },
                "gridcolor": self.layout.grid_color
            },
            "yaxis": {
                "title": { "text": self.layout.y_axis_title },
                "gridcolor": self.layout.grid_color
            },
            "hovermode": self.layout.hover_mode,
            "legend": {
                "orientation": "h",
                "yanchor": "bottom",
                "y": 1.02,
                "xanchor": "right",
                "x": 1
            },
            "height": self.layout.height,
            "paper_bgcolor": self.layout.background_color,
            "plot_bgcolor": self.layout.background_color,
        });

        if let Some(title) = self.layout.secondary_y_axis_title {
            layout["yaxis2"] = json!({
                "title": { "text": title },
                "overlaying": "y",
                "side": "right",
                "showgrid": false
            });
        }

        match &self.boundary {
            Some(marker) if self.boundary_visible(range) => {
                layout["shapes"] = json!([{
                    "type": "line",
                    "xref": "x",
                    "yref": "paper",
                    "x0": marker.date,
                    "x1": marker.date,
                    "y0": 0,
                    "y1": 1,
                    "line": {
                        "color": marker.color,
                        "width": marker.width,
                        "dash": dash_name(marker.dash)
                    }
                }]);
                layout["annotations"] = json!([{
                    "x": marker.date,
                    "xref": "x",
                    "y": 1,
                    "yref": "paper",
                    "text": marker.annotation,
                    "showarrow": false,
                    "xanchor": "left",
                    "yanchor": "top"
                }]);
            }
            _ => {}
        }

        json!({ "data": data, "layout": layout })
    }
}

fn trace_to_figure(trace: &Trace) -> Value {
    let yaxis = match trace.axis {
        Axis::Primary => "y",
        Axis::Secondary => "y2",
    };

    match trace.kind {
        TraceKind::Line => json!({
            "type": "scatter",
            "mode": "lines",
            "name": trace.name,
            "x": trace.x,
            "y": trace.y,
            "yaxis": yaxis,
            "line": { "color": trace.color, "dash": dash_name(trace.dash) },
            "hovertemplate": trace.hover_template,
        }),
        TraceKind::Bar => json!({
            "type": "bar",
            "name": trace.name,
            "x": trace.x,
            "y": trace.y,
            "yaxis": yaxis,
            "marker": { "color": trace.color },
            "hovertemplate": trace.hover_template,
        }),
    }
}

fn dash_name(dash: LineDash) -> &'static str {
    match dash {
        LineDash::Solid => "solid",
        LineDash::Dash => "dash",
    }
}
