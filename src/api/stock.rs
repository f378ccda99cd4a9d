use crate::api::ApiResponse;
use crate::error::{AppError, IndicatorError, Result};
use crate::services::ChartView;
use crate::types::{IndicatorConfig, Interval, PriceSeries, SymbolMatch};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::warn;

/// Longest history window a client may request.
const MAX_HISTORY_DAYS: i64 = 3650;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub symbol: String,
    pub interval: Option<String>,
    pub days: Option<i64>,
}

/// Overlay periods; a missing value keeps the default overlay.
#[derive(Debug, Deserialize)]
pub struct ChartQuery {
    pub symbol: String,
    pub interval: Option<String>,
    pub sma: Option<i64>,
    pub ema: Option<i64>,
    pub rsi: Option<i64>,
    pub bollinger: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

fn parse_interval(raw: Option<&str>) -> Result<Interval> {
    match raw {
        None => Ok(Interval::Daily),
        Some(s) => Interval::from_str(s).ok_or_else(|| AppError::BadRequest(format!("Unknown interval: {}", s))),
    }
}

/// Apply a requested period on top of a default overlay.
fn overlay(default: IndicatorConfig, requested: Option<i64>) -> std::result::Result<IndicatorConfig, IndicatorError> {
    let Some(period) = requested else {
        return Ok(default);
    };

    match u32::try_from(period) {
        Ok(p) if p > 0 => Ok(IndicatorConfig {
            enabled: true,
            period: p,
            ..default
        }),
        _ => Err(IndicatorError::InvalidPeriod {
            indicator: default.id().trim_end_matches(|c: char| c.is_ascii_digit()).to_string(),
            period,
        }),
    }
}

fn chart_configs(query: &ChartQuery) -> std::result::Result<Vec<IndicatorConfig>, IndicatorError> {
    let defaults = IndicatorConfig::defaults();
    let requested = [query.sma, query.ema, query.rsi, query.bollinger];

    defaults
        .into_iter()
        .zip(requested)
        .map(|(default, period)| overlay(default, period))
        .collect()
}

/// Get raw price history.
async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<PriceSeries>>> {
    let interval = parse_interval(query.interval.as_deref())?;
    let days = query.days.unwrap_or(state.config.scan.chart_lookback_days);
    if !(1..=MAX_HISTORY_DAYS).contains(&days) {
        return Err(AppError::BadRequest(format!("days must be between 1 and {}", MAX_HISTORY_DAYS)));
    }

    let series = state.charts.history(&query.symbol, interval, days).await?;
    Ok(Json(ApiResponse::new(series)))
}

/// Get price history with indicator overlays.
async fn get_chart(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Result<Json<ApiResponse<ChartView>>> {
    let interval = parse_interval(query.interval.as_deref())?;
    let configs = chart_configs(&query)?;

    let view = state.charts.load(&query.symbol, interval, &configs).await?;
    Ok(Json(ApiResponse::new(view)))
}

/// Search symbols by free text.
async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<SymbolMatch>>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Ok(Json(ApiResponse::new(Vec::new())));
    }

    let results = match state.search.search(q).await {
        Ok(results) => results,
        Err(e) => {
            warn!("Symbol search for {:?} failed: {}", q, e);
            return Err(e.into());
        }
    };

    Ok(Json(ApiResponse::new(results)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/history", get(get_history))
        .route("/chart", get(get_chart))
        .route("/search", get(search))
}
