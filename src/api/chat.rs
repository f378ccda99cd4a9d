use crate::api::ApiResponse;
use crate::error::Result;
use crate::types::{ChatReply, ChatRequest};
use crate::AppState;
use axum::{extract::State, routing::post, Json, Router};

/// Ask the assistant about a symbol's chart.
async fn post_chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Result<Json<ApiResponse<ChatReply>>> {
    let reply = state.chat.reply(request).await?;
    Ok(Json(ApiResponse::new(reply)))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(post_chat))
}
