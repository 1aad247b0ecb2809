use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use models::bookmark;
use service::bookmark_service::{self, SearchHit};

use crate::errors::JsonApiError;
use crate::session::{CurrentUser, ServerState};

#[derive(Deserialize)]
pub struct CreateBookmarkBody {
    pub folder_id: Uuid,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub og_image_url: Option<String>,
}

#[derive(Deserialize)]
pub struct MoveBookmarkBody {
    pub folder_id: Uuid,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub folder_id: Option<Uuid>,
}

pub async fn list(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Path(folder_id): Path<Uuid>,
) -> Result<Json<Vec<bookmark::Model>>, JsonApiError> {
    let bookmarks = bookmark_service::list_by_folder(&state.db, user_id, folder_id).await?;
    Ok(Json(bookmarks))
}

#[utoipa::path(post, path = "/api/bookmarks", tag = "bookmarks", request_body = crate::openapi::CreateBookmarkRequest, responses((status = 201, description = "Created"), (status = 400, description = "Bad Request"), (status = 404, description = "Folder not found"), (status = 409, description = "Duplicate URL in folder")))]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<CreateBookmarkBody>,
) -> Result<(StatusCode, Json<bookmark::Model>), JsonApiError> {
    let created = bookmark_service::create_bookmark(
        &state.db,
        user_id,
        body.folder_id,
        &body.url,
        &body.title,
        body.description.as_deref(),
        body.favicon_url.as_deref(),
        body.og_image_url.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn remove(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    bookmark_service::delete_bookmark(&state.db, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn move_to_folder(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveBookmarkBody>,
) -> Result<Json<bookmark::Model>, JsonApiError> {
    let moved = bookmark_service::move_bookmark(&state.db, user_id, id, body.folder_id).await?;
    Ok(Json(moved))
}

#[utoipa::path(get, path = "/api/bookmarks/search", tag = "bookmarks", params(("q" = String, Query, description = "Substring to match against title, url and description"), ("folder_id" = Option<Uuid>, Query, description = "Restrict to one folder")), responses((status = 200, description = "Up to 20 matches, newest first")))]
pub async fn search(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, JsonApiError> {
    let hits =
        bookmark_service::search_bookmarks(&state.db, user_id, &query.q, query.folder_id).await?;
    Ok(Json(hits))
}
