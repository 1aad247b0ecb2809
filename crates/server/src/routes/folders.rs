use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use models::folder;
use service::folder_service::{self, FolderWithCount};

use crate::errors::JsonApiError;
use crate::session::{CurrentUser, ServerState};

#[derive(Deserialize)]
pub struct CreateFolderBody {
    pub name: String,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateFolderBody {
    pub name: Option<String>,
    pub icon: Option<String>,
}

#[derive(Deserialize)]
pub struct ShareBody {
    pub is_shared: bool,
}

#[utoipa::path(get, path = "/api/folders", tag = "folders", responses((status = 200, description = "Caller's folders with bookmark counts"), (status = 401, description = "Unauthorized")))]
pub async fn list(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<FolderWithCount>>, JsonApiError> {
    let folders = folder_service::list_folders(&state.db, user_id).await?;
    Ok(Json(folders))
}

#[utoipa::path(post, path = "/api/folders", tag = "folders", request_body = crate::openapi::CreateFolderRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request")))]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<CreateFolderBody>,
) -> Result<(StatusCode, Json<folder::Model>), JsonApiError> {
    let created =
        folder_service::create_folder(&state.db, user_id, &body.name, body.icon.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateFolderBody>,
) -> Result<Json<folder::Model>, JsonApiError> {
    let updated = folder_service::update_folder(
        &state.db,
        user_id,
        id,
        body.name.as_deref(),
        body.icon.as_deref(),
    )
    .await?;
    Ok(Json(updated))
}

pub async fn remove(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    folder_service::delete_folder(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn share(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ShareBody>,
) -> Result<Json<folder::Model>, JsonApiError> {
    let updated = folder_service::set_shared(&state.db, user_id, id, body.is_shared).await?;
    Ok(Json(updated))
}
