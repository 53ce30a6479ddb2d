use crate::catalog::{self, SymbolOption};
use crate::dashboard::{self, DashboardRequest, DashboardView};
use crate::data::{parse_date, StoragePaths};
use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

const INDEX_HTML: &str = include_str!("../web/index.html");
const APP_JS: &str = include_str!("../web/app.js");

#[derive(Clone)]
struct WebState {
    paths: Arc<StoragePaths>,
}

#[derive(Clone, Debug, Serialize)]
struct ApiError {
    error: String,
}

#[derive(Debug, Deserialize)]
struct DashboardQuery {
    symbol: Option<String>,
    start: Option<String>,
    end: Option<String>,
}

#[derive(Debug, Serialize)]
struct DashboardResponse {
    #[serde(flatten)]
    view: DashboardView,
    figure: Option<serde_json::Value>,
}

pub async fn run_webui_server(port: u16, paths: StoragePaths) -> Result<()> {
    let app = router(paths);

    let addr = format!("0.0.0.0:{}", port);
    info!("WebUI listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn router(paths: StoragePaths) -> Router {
    let state = WebState {
        paths: Arc::new(paths),
    };

    Router::new()
        .route("/", get(index))
        .route("/app.js", get(app_js))
        .route("/api/health", get(health))
        .route("/api/symbols", get(symbols))
        .route("/api/dashboard", get(dashboard_view))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn app_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], APP_JS)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

async fn symbols() -> Json<Vec<SymbolOption>> {
    Json(catalog::symbol_options())
}

async fn dashboard_view(
    State(state): State<WebState>,
    Query(query): Query<DashboardQuery>,
) -> Result<Json<DashboardResponse>, (StatusCode, Json<ApiError>)> {
    let symbol = query
        .symbol
        .as_deref()
        .map(str::trim)
        .unwrap_or(catalog::default_symbol())
        .to_string();
    if symbol.is_empty() {
        return Err(api_err(StatusCode::BAD_REQUEST, "symbol is required"));
    }

    let request = DashboardRequest {
        symbol,
        start: query_date(query.start.as_deref(), "start")?,
        end: query_date(query.end.as_deref(), "end")?,
    };

    let view = dashboard::render_dashboard(&state.paths, &request).map_err(|failure| {
        warn!("WebUI dashboard request failed for {}", request.symbol);
        api_err(StatusCode::NOT_FOUND, &failure.message())
    })?;

    let figure = view.figure();
    Ok(Json(DashboardResponse { view, figure }))
}

fn query_date(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<chrono::NaiveDate>, (StatusCode, Json<ApiError>)> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => parse_date(value).map(Some).ok_or_else(|| {
            api_err(
                StatusCode::BAD_REQUEST,
                &format!("{} must be a date like 2024-01-31, got '{}'", field, value),
            )
        }),
    }
}

fn api_err(status: StatusCode, message: &str) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            error: message.to_string(),
        }),
    )
}
