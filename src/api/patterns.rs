use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::{OperationState, PatternCategory, PatternKind, ScanReport, ScanRequest, SectorId};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
}

/// Scan request body. The sector arrives as free text so an unknown sector
/// is a 400 rather than a body rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanBody {
    #[serde(default, alias = "patternName")]
    pub pattern: String,
    #[serde(default)]
    pub sector: Option<String>,
    /// Client session whose scan board entry tracks this scan.
    #[serde(default)]
    pub session: Option<String>,
}

impl ScanBody {
    fn into_request(self) -> Result<(ScanRequest, Option<String>)> {
        let pattern = self.pattern.trim();
        if pattern.is_empty() {
            return Err(AppError::BadRequest("Pattern name is required".to_string()));
        }

        let sector = match self.sector.as_deref() {
            None => SectorId::All,
            Some(raw) => SectorId::from_str(raw).ok_or_else(|| AppError::BadRequest(format!("Unknown sector: {}", raw)))?,
        };

        let session = self.session.filter(|s| !s.trim().is_empty());
        Ok((ScanRequest::new(pattern, sector), session))
    }
}

/// List known patterns, optionally by category.
async fn get_catalog(Query(query): Query<CatalogQuery>) -> Result<Json<ApiResponse<Vec<&'static PatternKind>>>> {
    let category = match query.category.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        None => None,
        Some(raw) => Some(
            PatternCategory::from_str(raw).ok_or_else(|| AppError::BadRequest(format!("Unknown category: {}", raw)))?,
        ),
    };

    Ok(Json(ApiResponse::new(PatternKind::catalog(category))))
}

/// Run a pattern scan.
///
/// With a session the outcome is also recorded on the scan board, where a
/// newer scan for the same session supersedes this one.
async fn run_scan(State(state): State<AppState>, Json(body): Json<ScanBody>) -> Result<Json<ApiResponse<ScanReport>>> {
    let (request, session) = body.into_request()?;

    let ticket = session.as_deref().map(|s| state.scans.begin(s));
    let result = state.scanner.scan(&request).await;

    if let Some(ticket) = &ticket {
        let outcome = match &result {
            Ok(report) => Ok(report.clone()),
            Err(e) => Err(e.to_string()),
        };
        if !state.scans.finish(ticket, outcome) {
            debug!("Scan #{} for session {} was superseded", ticket.seq, ticket.session);
        }
    }

    let report = result?;
    info!(
        "Scan {} returned {} match(es) for {}",
        report.scan_id,
        report.matches.len(),
        report.pattern
    );
    Ok(Json(ApiResponse::new(report)))
}

/// Current scan state for a session.
async fn get_scan_state(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<ApiResponse<OperationState<ScanReport>>>> {
    state
        .scans
        .get(&session)
        .map(|s| Json(ApiResponse::new(s)))
        .ok_or_else(|| AppError::NotFound(format!("No scan for session {}", session)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(get_catalog))
        .route("/scan", post(run_scan))
        .route("/scan/:session", get(get_scan_state))
}
