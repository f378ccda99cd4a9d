pub mod chat;
pub mod health;
pub mod patterns;
pub mod sectors;
pub mod stock;

use crate::AppState;
use axum::Router;
use serde::Serialize;

/// API response wrapper matching frontend expectations
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .nest("/api/stock", stock::router())
        .nest("/api/patterns", patterns::router())
        .nest("/api/sectors", sectors::router())
        .nest("/api/chat", chat::router())
}
