use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Indicator configuration errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndicatorError {
    #[error("Invalid period for {indicator}: {period} (must be at least 1)")]
    InvalidPeriod { indicator: String, period: i64 },
}

/// Failures reported by external collaborators (price history, search, LLM).
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Data unavailable for {symbol}: {reason}")]
    Unavailable { symbol: String, reason: String },

    #[error("Upstream request failed: {0}")]
    Request(String),

    #[error("Unexpected upstream response: {0}")]
    InvalidResponse(String),

    #[error("Upstream call timed out after {0}s")]
    Timeout(u64),

    #[error("Missing credentials: {0}")]
    NotConfigured(String),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
}

/// Errors that stop a scan from producing a report.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid scan request: {0}")]
    InvalidRequest(String),

    #[error("No data available for {sector} scan")]
    NoData { sector: String },

    #[error("Pattern analysis failed: {0}")]
    Analysis(#[source] SourceError),
}

/// Chart loading errors.
#[derive(Error, Debug)]
pub enum ChartError {
    #[error(transparent)]
    Indicator(#[from] IndicatorError),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Chat errors.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Invalid chat request: {0}")]
    InvalidRequest(String),

    #[error("Assistant returned an empty reply")]
    EmptyReply,

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Sector roster store errors.
#[derive(Error, Debug)]
pub enum RosterError {
    #[error("Invalid roster entry: {0}")]
    Invalid(String),

    #[error("Roster store lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl From<IndicatorError> for AppError {
    fn from(e: IndicatorError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl From<SourceError> for AppError {
    fn from(e: SourceError) -> Self {
        match e {
            SourceError::Unavailable { .. } => AppError::NotFound(e.to_string()),
            SourceError::NotConfigured(_) => AppError::Unavailable(e.to_string()),
            other => AppError::ExternalApi(other.to_string()),
        }
    }
}

impl From<ScanError> for AppError {
    fn from(e: ScanError) -> Self {
        match e {
            ScanError::InvalidRequest(_) => AppError::BadRequest(e.to_string()),
            ScanError::NoData { .. } => AppError::Unavailable(e.to_string()),
            ScanError::Analysis(_) => AppError::ExternalApi(e.to_string()),
        }
    }
}

impl From<ChartError> for AppError {
    fn from(e: ChartError) -> Self {
        match e {
            ChartError::Indicator(e) => e.into(),
            ChartError::Source(e) => e.into(),
        }
    }
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::InvalidRequest(_) => AppError::BadRequest(e.to_string()),
            ChatError::EmptyReply => AppError::ExternalApi(e.to_string()),
            ChatError::Source(source) => source.into(),
        }
    }
}

impl From<RosterError> for AppError {
    fn from(e: RosterError) -> Self {
        match e {
            RosterError::Invalid(_) => AppError::BadRequest(e.to_string()),
            RosterError::LockPoisoned | RosterError::Sqlite(_) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::SerdeJson(e) => (StatusCode::BAD_REQUEST, e.to_string()),
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_maps_to_unavailable() {
        let err: AppError = ScanError::NoData {
            sector: "technology".to_string(),
        }
        .into();
        assert!(matches!(err, AppError::Unavailable(_)));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_invalid_period_maps_to_bad_request() {
        let err: AppError = IndicatorError::InvalidPeriod {
            indicator: "sma".to_string(),
            period: 0,
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_analysis_failure_maps_to_bad_gateway() {
        let err: AppError = ScanError::Analysis(SourceError::Timeout(60)).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_unavailable_symbol_maps_to_not_found() {
        let err: AppError = SourceError::Unavailable {
            symbol: "ZZZZ".to_string(),
            reason: "no bars".to_string(),
        }
        .into();
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
