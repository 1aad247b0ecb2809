use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use uuid::Uuid;

use models::{bookmark, folder, user};

use crate::errors::ServiceError;

/// Anonymous view of a shared folder. Exposes the owner's display name and
/// avatar but never their email or id.
#[derive(Debug, Clone, Serialize)]
pub struct SharedFolder {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub created_at: DateTimeWithTimeZone,
    pub owner_name: String,
    pub owner_image: Option<String>,
}

/// A shared folder by id, or `None` when the folder is absent or not shared.
/// The two cases are indistinguishable to the caller.
pub async fn get_shared_folder(
    db: &DatabaseConnection,
    folder_id: Uuid,
) -> Result<Option<SharedFolder>, ServiceError> {
    let found = folder::Entity::find()
        .filter(folder::Column::Id.eq(folder_id))
        .filter(folder::Column::IsShared.eq(true))
        .find_also_related(user::Entity)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found.and_then(|(f, owner)| {
        owner.map(|owner| SharedFolder {
            id: f.id,
            name: f.name,
            icon: f.icon,
            created_at: f.created_at,
            owner_name: owner.name,
            owner_image: owner.image,
        })
    }))
}

/// Bookmarks of a shared folder, newest first. An unshared or unknown folder
/// yields an empty list rather than an error.
pub async fn get_shared_folder_bookmarks(
    db: &DatabaseConnection,
    folder_id: Uuid,
) -> Result<Vec<bookmark::Model>, ServiceError> {
    let shared = folder::Entity::find()
        .filter(folder::Column::Id.eq(folder_id))
        .filter(folder::Column::IsShared.eq(true))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if shared.is_none() {
        return Ok(Vec::new());
    }
    bookmark::Entity::find()
        .filter(bookmark::Column::FolderId.eq(folder_id))
        .order_by_desc(bookmark::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}
