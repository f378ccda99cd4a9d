use crate::api::ApiResponse;
use crate::error::{AppError, Result};
use crate::types::{SectorId, SectorStock};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Serialize)]
pub struct SectorInfo {
    pub id: SectorId,
    pub name: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct StocksQuery {
    pub sector: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddStockBody {
    pub sector: String,
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveStockQuery {
    pub sector: String,
    pub symbol: String,
}

#[derive(Debug, Serialize)]
pub struct ChangeResponse {
    pub changed: bool,
}

fn parse_sector(raw: &str) -> Result<SectorId> {
    SectorId::from_str(raw).ok_or_else(|| AppError::BadRequest(format!("Unknown sector: {}", raw)))
}

/// List sectors with display names.
async fn list_sectors() -> Json<ApiResponse<Vec<SectorInfo>>> {
    let sectors = std::iter::once(SectorId::All)
        .chain(SectorId::SECTORS)
        .map(|id| SectorInfo { id, name: id.name() })
        .collect();
    Json(ApiResponse::new(sectors))
}

/// User-added stocks, optionally for one sector.
async fn list_stocks(
    State(state): State<AppState>,
    Query(query): Query<StocksQuery>,
) -> Result<Json<ApiResponse<Vec<SectorStock>>>> {
    let sector = match query.sector.as_deref() {
        None => SectorId::All,
        Some(raw) => parse_sector(raw)?,
    };

    let stocks = if sector == SectorId::All {
        state.roster_store.list_all()?
    } else {
        state.roster_store.list(sector)?
    };
    Ok(Json(ApiResponse::new(stocks)))
}

/// Add a stock to a sector roster.
async fn add_stock(
    State(state): State<AppState>,
    Json(body): Json<AddStockBody>,
) -> Result<(StatusCode, Json<ApiResponse<ChangeResponse>>)> {
    let sector = parse_sector(&body.sector)?;
    let added = state.roster_store.add(sector, &body.symbol, &body.name)?;

    let status = if added {
        info!("Added {} to {} roster", body.symbol.trim().to_uppercase(), sector);
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::new(ChangeResponse { changed: added }))))
}

/// Remove a stock from a sector roster.
async fn remove_stock(
    State(state): State<AppState>,
    Query(query): Query<RemoveStockQuery>,
) -> Result<Json<ApiResponse<ChangeResponse>>> {
    let sector = parse_sector(&query.sector)?;
    if !state.roster_store.remove(sector, &query.symbol)? {
        return Err(AppError::NotFound(format!("{} is not in the {} roster", query.symbol, sector)));
    }

    info!("Removed {} from {} roster", query.symbol, sector);
    Ok(Json(ApiResponse::new(ChangeResponse { changed: true })))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sectors))
        .route("/stocks", get(list_stocks).post(add_stock).delete(remove_stock))
}
