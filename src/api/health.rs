use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Whether scans and chat can reach the language model.
    analysis_enabled: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        analysis_enabled: state.config.anthropic.api_key.is_some(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok",
            version: "1.0.0",
            analysis_enabled: false,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"version\":\"1.0.0\""));
        assert!(json.contains("\"analysisEnabled\":false"));
    }
}
