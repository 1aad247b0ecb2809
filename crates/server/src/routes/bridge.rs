use axum::extract::State;
use axum::Json;
use serde_json::json;

use service::bridge::{self, BridgeRequest};

use crate::errors::JsonApiError;
use crate::session::ServerState;

/// Single entry point for external tools. The body carries the action name,
/// its parameters and the caller's API key; no session cookie is involved.
#[utoipa::path(post, path = "/mcp", tag = "bridge", request_body = crate::openapi::BridgeRequestDoc, responses((status = 200, description = "Action result under `data`"), (status = 400, description = "Unknown action or bad params"), (status = 401, description = "Invalid API key"), (status = 404, description = "Named folder not found")))]
pub async fn dispatch(
    State(state): State<ServerState>,
    Json(req): Json<BridgeRequest>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    let data = bridge::dispatch(&state.db, req).await?;
    Ok(Json(json!({ "data": data })))
}
