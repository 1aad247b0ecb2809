//! JSON action bridge for external tools (CLI clients, agent integrations).
//! One POST endpoint, authenticated by the caller's API key rather than a
//! session cookie, dispatching on an `action` string.

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use models::{bookmark, folder};

use crate::errors::ServiceError;
use crate::{apikey_service, bookmark_service, folder_service};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeRequest {
    pub action: String,
    #[serde(default)]
    pub params: Value,
    pub api_key: String,
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Invalid API key")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetBookmarksParams {
    folder_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams {
    query: String,
    folder_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveParams {
    url: String,
    folder_name: String,
    title: String,
    description: Option<String>,
    favicon_url: Option<String>,
    og_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateFolderParams {
    name: String,
    icon: Option<String>,
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Value) -> Result<T, BridgeError> {
    serde_json::from_value(params).map_err(|e| BridgeError::Invalid(format!("invalid params: {e}")))
}

fn folder_json(f: &folder::Model) -> Value {
    json!({
        "id": f.id,
        "name": f.name,
        "icon": f.icon,
        "isShared": f.is_shared,
    })
}

fn bookmark_json(b: &bookmark::Model) -> Value {
    json!({
        "id": b.id,
        "url": b.url,
        "title": b.title,
        "description": b.description,
        "faviconUrl": b.favicon_url,
        "ogImageUrl": b.og_image_url,
        "createdAt": b.created_at,
    })
}

/// Resolve a bridge folder reference. Callers address folders by name, so the
/// lookup is case-insensitive and a miss names the folder in the error.
async fn folder_by_name(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
) -> Result<folder::Model, BridgeError> {
    folder_service::find_owned_by_name(db, user_id, name)
        .await?
        .ok_or_else(|| BridgeError::NotFound(format!("Folder \"{name}\" not found")))
}

/// Authenticate the key, stamp its usage, then run the requested action.
/// Returns the action's `data` payload.
pub async fn dispatch(db: &DatabaseConnection, req: BridgeRequest) -> Result<Value, BridgeError> {
    let key = apikey_service::find_by_key(db, &req.api_key)
        .await?
        .ok_or(BridgeError::Unauthorized)?;
    apikey_service::touch_last_used(db, key.id).await;
    let user_id = key.user_id;
    debug!(action = %req.action, %user_id, "bridge_dispatch");

    match req.action.as_str() {
        "listFolders" => {
            let folders = folder_service::list_folders(db, user_id).await?;
            let out: Vec<Value> = folders
                .iter()
                .map(|f| {
                    json!({
                        "id": f.id,
                        "name": f.name,
                        "icon": f.icon,
                        "bookmarkCount": f.bookmark_count,
                        "isShared": f.is_shared,
                    })
                })
                .collect();
            Ok(json!(out))
        }
        "getBookmarks" => {
            let p: GetBookmarksParams = parse_params(req.params)?;
            let f = folder_by_name(db, user_id, &p.folder_name).await?;
            let bookmarks = bookmark_service::list_by_folder(db, user_id, f.id).await?;
            let out: Vec<Value> = bookmarks.iter().map(bookmark_json).collect();
            Ok(json!({ "folder": folder_json(&f), "bookmarks": out }))
        }
        "searchBookmarks" => {
            let p: SearchParams = parse_params(req.params)?;
            let folder_id = match &p.folder_name {
                Some(name) => Some(folder_by_name(db, user_id, name).await?.id),
                None => None,
            };
            let hits = bookmark_service::search_bookmarks(db, user_id, &p.query, folder_id).await?;
            let out: Vec<Value> = hits
                .iter()
                .map(|h| {
                    json!({
                        "id": h.id,
                        "url": h.url,
                        "title": h.title,
                        "description": h.description,
                        "faviconUrl": h.favicon_url,
                        "ogImageUrl": h.og_image_url,
                        "createdAt": h.created_at,
                        "folder": { "name": h.folder_name, "icon": h.folder_icon },
                    })
                })
                .collect();
            Ok(json!(out))
        }
        "saveBookmark" => {
            let p: SaveParams = parse_params(req.params)?;
            // A miss on the save path carries extra guidance toward the
            // folder actions; the read paths keep the short form.
            let f = folder_service::find_owned_by_name(db, user_id, &p.folder_name)
                .await?
                .ok_or_else(|| {
                    BridgeError::NotFound(format!(
                        "Folder \"{}\" not found. Use list_folders to see available folders or create_folder to create a new one.",
                        p.folder_name
                    ))
                })?;
            // The bridge always dedupes by exact URL, regardless of the
            // folder's allow_duplicate setting. External tools retry.
            let existing = bookmark::Entity::find()
                .filter(bookmark::Column::FolderId.eq(f.id))
                .filter(bookmark::Column::Url.eq(p.url.as_str()))
                .one(db)
                .await
                .map_err(|e| ServiceError::Db(e.to_string()))?;
            if existing.is_some() {
                return Ok(json!({ "existing": true, "folder": folder_json(&f) }));
            }
            let created = bookmark_service::create_bookmark(
                db,
                user_id,
                f.id,
                &p.url,
                &p.title,
                p.description.as_deref(),
                p.favicon_url.as_deref(),
                p.og_image_url.as_deref(),
            )
            .await?;
            Ok(json!({ "bookmark": bookmark_json(&created), "folder": folder_json(&f) }))
        }
        "createFolder" => {
            let p: CreateFolderParams = parse_params(req.params)?;
            // Exact-name pre-check, unlike the id-addressed create path.
            if folder_service::find_owned_by_exact_name(db, user_id, &p.name)
                .await?
                .is_some()
            {
                return Err(BridgeError::Invalid("Folder already exists".to_string()));
            }
            let created =
                folder_service::create_folder(db, user_id, &p.name, p.icon.as_deref()).await?;
            Ok(folder_json(&created))
        }
        other => Err(BridgeError::Invalid(format!("Unknown action: {other}"))),
    }
}
