use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use models::{bookmark, folder};

use crate::errors::ServiceError;

/// Owner-scoped folder listing row: the folder plus its bookmark count.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct FolderWithCount {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub allow_duplicate: bool,
    pub is_shared: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub bookmark_count: i64,
}

/// All folders owned by `user_id`, newest first, each with its bookmark count.
/// Full set, no pagination.
pub async fn list_folders(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Vec<FolderWithCount>, ServiceError> {
    folder::Entity::find()
        .filter(folder::Column::UserId.eq(user_id))
        .left_join(bookmark::Entity)
        .select_only()
        .column(folder::Column::Id)
        .column(folder::Column::Name)
        .column(folder::Column::Icon)
        .column(folder::Column::AllowDuplicate)
        .column(folder::Column::IsShared)
        .column(folder::Column::CreatedAt)
        .column(folder::Column::UpdatedAt)
        .column_as(bookmark::Column::Id.count(), "bookmark_count")
        .group_by(folder::Column::Id)
        .order_by_desc(folder::Column::CreatedAt)
        .into_model::<FolderWithCount>()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Create a folder. Duplicate names are allowed here; only the external-tool
/// bridge adds a name pre-check on its own create path.
pub async fn create_folder(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
    icon: Option<&str>,
) -> Result<folder::Model, ServiceError> {
    let created = folder::create(db, user_id, name, icon).await?;
    info!(folder_id = %created.id, user_id = %user_id, "folder_created");
    Ok(created)
}

/// Resolve a folder by id only when `user_id` owns it.
pub async fn find_owned(
    db: &DatabaseConnection,
    user_id: Uuid,
    folder_id: Uuid,
) -> Result<Option<folder::Model>, ServiceError> {
    folder::Entity::find()
        .filter(folder::Column::Id.eq(folder_id))
        .filter(folder::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Resolve a folder by case-insensitive name equality. Used by the bridge,
/// whose callers know folder names rather than ids.
pub async fn find_owned_by_name(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
) -> Result<Option<folder::Model>, ServiceError> {
    folder::Entity::find()
        .filter(folder::Column::UserId.eq(user_id))
        .filter(
            Expr::expr(Func::lower(Expr::col((folder::Entity, folder::Column::Name))))
                .eq(name.to_lowercase()),
        )
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Exact-name lookup backing the bridge's duplicate-name pre-check.
pub async fn find_owned_by_exact_name(
    db: &DatabaseConnection,
    user_id: Uuid,
    name: &str,
) -> Result<Option<folder::Model>, ServiceError> {
    folder::Entity::find()
        .filter(folder::Column::UserId.eq(user_id))
        .filter(folder::Column::Name.eq(name))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Partial rename/restyle. Ownership is part of the lookup predicate, so a
/// foreign folder id reads as not-found.
pub async fn update_folder(
    db: &DatabaseConnection,
    user_id: Uuid,
    folder_id: Uuid,
    name: Option<&str>,
    icon: Option<&str>,
) -> Result<folder::Model, ServiceError> {
    if let Some(name) = name {
        folder::validate_name(name)?;
    }
    if let Some(icon) = icon {
        folder::validate_icon(icon)?;
    }
    let found = find_owned(db, user_id, folder_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("folder"))?;
    let mut am: folder::ActiveModel = found.into();
    if let Some(name) = name {
        am.name = Set(name.to_string());
    }
    if let Some(icon) = icon {
        am.icon = Set(icon.to_string());
    }
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

/// Delete a folder and everything in it. The bookmark delete runs in the same
/// transaction as the folder row so no orphan can ever be observed.
pub async fn delete_folder(
    db: &DatabaseConnection,
    user_id: Uuid,
    folder_id: Uuid,
) -> Result<(), ServiceError> {
    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let found = folder::Entity::find()
        .filter(folder::Column::Id.eq(folder_id))
        .filter(folder::Column::UserId.eq(user_id))
        .one(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("folder"))?;
    bookmark::Entity::delete_many()
        .filter(bookmark::Column::FolderId.eq(found.id))
        .exec(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    folder::Entity::delete_by_id(found.id)
        .exec(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(%folder_id, user_id = %user_id, "folder_deleted");
    Ok(())
}

/// Toggle public visibility of a folder and its bookmarks.
pub async fn set_shared(
    db: &DatabaseConnection,
    user_id: Uuid,
    folder_id: Uuid,
    is_shared: bool,
) -> Result<folder::Model, ServiceError> {
    let found = find_owned(db, user_id, folder_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("folder"))?;
    let mut am: folder::ActiveModel = found.into();
    am.is_shared = Set(is_shared);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(%folder_id, is_shared, "folder_share_toggled");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::user;

    async fn test_user(db: &DatabaseConnection) -> user::Model {
        let email = format!("folder_svc_{}@example.com", Uuid::new_v4());
        user::create(db, &email, "Folder Svc", None).await.expect("create user")
    }

    #[tokio::test]
    async fn folder_crud_service() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => { eprintln!("skip: no database: {e}"); return Ok(()); }
        };
        let u = test_user(&db).await;

        let f = create_folder(&db, u.id, "Reading", Some("📖")).await?;
        assert_eq!(f.name, "Reading");
        assert_eq!(f.icon, "📖");

        let listed = list_folders(&db, u.id).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].bookmark_count, 0);

        let renamed = update_folder(&db, u.id, f.id, Some("Read Later"), None).await?;
        assert_eq!(renamed.name, "Read Later");
        assert_eq!(renamed.icon, "📖");

        let shared = set_shared(&db, u.id, f.id, true).await?;
        assert!(shared.is_shared);

        delete_folder(&db, u.id, f.id).await?;
        assert!(list_folders(&db, u.id).await?.is_empty());

        user::Entity::delete_by_id(u.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_owner_scoped() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => { eprintln!("skip: no database: {e}"); return Ok(()); }
        };
        let alice = test_user(&db).await;
        let bob = test_user(&db).await;

        let mine = create_folder(&db, alice.id, "Mine", None).await?;
        create_folder(&db, bob.id, "Theirs", None).await?;

        let listed = list_folders(&db, alice.id).await?;
        assert!(listed.iter().all(|f| f.id == mine.id));

        // foreign folder id reads as not-found for update and delete
        let theirs = list_folders(&db, bob.id).await?;
        let err = update_folder(&db, alice.id, theirs[0].id, Some("Hijack"), None).await;
        assert!(matches!(err, Err(ServiceError::NotFound(_))));
        let err = delete_folder(&db, alice.id, theirs[0].id).await;
        assert!(matches!(err, Err(ServiceError::NotFound(_))));

        user::Entity::delete_by_id(alice.id).exec(&db).await?;
        user::Entity::delete_by_id(bob.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn name_lookup_is_case_insensitive() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => { eprintln!("skip: no database: {e}"); return Ok(()); }
        };
        let u = test_user(&db).await;
        let f = create_folder(&db, u.id, "Recipes", None).await?;

        let hit = find_owned_by_name(&db, u.id, "rEcIpEs").await?;
        assert_eq!(hit.map(|f| f.id), Some(f.id));

        let exact = find_owned_by_exact_name(&db, u.id, "rEcIpEs").await?;
        assert!(exact.is_none());

        user::Entity::delete_by_id(u.id).exec(&db).await?;
        Ok(())
    }
}
