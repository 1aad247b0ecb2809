use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use common::metadata::{fetch_page_metadata, PageMetadata};

use crate::errors::JsonApiError;
use crate::session::{CurrentUser, ServerState};

#[derive(Deserialize)]
pub struct MetadataQuery {
    pub url: String,
}

/// Preview helper for the save form. Always answers 200; a fetch failure
/// degrades to a record whose title is the URL itself.
pub async fn fetch(
    State(_state): State<ServerState>,
    CurrentUser(_user_id): CurrentUser,
    Query(query): Query<MetadataQuery>,
) -> Result<Json<PageMetadata>, JsonApiError> {
    Ok(Json(fetch_page_metadata(&query.url).await))
}
