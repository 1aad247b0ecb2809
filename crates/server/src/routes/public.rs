use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use models::bookmark;
use service::public_service::{self, SharedFolder};

use crate::errors::JsonApiError;
use crate::session::ServerState;

/// Anonymous view of a shared folder. Unknown and private folders both read
/// as 404; this route never answers with an authorization error.
#[utoipa::path(get, path = "/public/folders/{id}", tag = "public", params(("id" = Uuid, Path, description = "Folder id")), responses((status = 200, description = "Shared folder with owner descriptor"), (status = 404, description = "Not shared or unknown")))]
pub async fn get_folder(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SharedFolder>, JsonApiError> {
    let folder = public_service::get_shared_folder(&state.db, id)
        .await?
        .ok_or_else(|| JsonApiError::new(StatusCode::NOT_FOUND, "folder not found"))?;
    Ok(Json(folder))
}

pub async fn get_folder_bookmarks(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<bookmark::Model>>, JsonApiError> {
    let bookmarks = public_service::get_shared_folder_bookmarks(&state.db, id).await?;
    Ok(Json(bookmarks))
}
