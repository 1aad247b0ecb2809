use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use models::apikey;
use service::apikey_service;

use crate::errors::JsonApiError;
use crate::session::{CurrentUser, ServerState};

#[utoipa::path(get, path = "/api/api-key", tag = "api-key", responses((status = 200, description = "Current key or null"), (status = 401, description = "Unauthorized")))]
pub async fn get_key(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Option<apikey::Model>>, JsonApiError> {
    let key = apikey_service::get_key(&state.db, user_id).await?;
    Ok(Json(key))
}

/// Create and regenerate are the same operation: any previous key is replaced.
pub async fn create_key(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<(StatusCode, Json<apikey::Model>), JsonApiError> {
    let key = apikey_service::rotate_key(&state.db, user_id).await?;
    Ok((StatusCode::CREATED, Json(key)))
}

pub async fn regenerate_key(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<apikey::Model>, JsonApiError> {
    let key = apikey_service::rotate_key(&state.db, user_id).await?;
    Ok(Json(key))
}

pub async fn remove_key(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<StatusCode, JsonApiError> {
    apikey_service::delete_key(&state.db, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
