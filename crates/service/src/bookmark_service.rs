use chrono::Utc;
use sea_orm::sea_query::{Expr, ExprTrait, Func};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use models::{bookmark, folder};

use crate::errors::ServiceError;
use crate::folder_service;

/// Upper bound on search results; recency-ordered, no further ranking.
pub const SEARCH_LIMIT: u64 = 20;

/// A search match joined with its folder's display descriptor.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct SearchHit {
    pub id: Uuid,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub favicon_url: Option<String>,
    pub og_image_url: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub folder_id: Uuid,
    pub folder_name: String,
    pub folder_icon: String,
}

/// Bookmarks of an owned folder, newest first. A foreign or missing folder id
/// reads as not-found.
pub async fn list_by_folder(
    db: &DatabaseConnection,
    user_id: Uuid,
    folder_id: Uuid,
) -> Result<Vec<bookmark::Model>, ServiceError> {
    folder_service::find_owned(db, user_id, folder_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("folder"))?;
    bookmark::Entity::find()
        .filter(bookmark::Column::FolderId.eq(folder_id))
        .order_by_desc(bookmark::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Save a bookmark into an owned folder.
///
/// When the folder disallows duplicates, an existing bookmark with the exact
/// same URL string rejects the save. Comparison is not normalized: URLs that
/// differ only by trailing slash or query order are distinct.
pub async fn create_bookmark(
    db: &DatabaseConnection,
    user_id: Uuid,
    folder_id: Uuid,
    url: &str,
    title: &str,
    description: Option<&str>,
    favicon_url: Option<&str>,
    og_image_url: Option<&str>,
) -> Result<bookmark::Model, ServiceError> {
    bookmark::validate_url(url)?;
    bookmark::validate_title(title)?;

    // The policy check and the insert run in one transaction holding a lock on
    // the folder row, so two concurrent saves of the same URL serialize and
    // the loser observes the winner's row.
    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let folder = folder::Entity::find()
        .filter(folder::Column::Id.eq(folder_id))
        .filter(folder::Column::UserId.eq(user_id))
        .lock_exclusive()
        .one(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("folder"))?;

    if !folder.allow_duplicate {
        let existing = bookmark::Entity::find()
            .filter(bookmark::Column::FolderId.eq(folder_id))
            .filter(bookmark::Column::Url.eq(url))
            .one(&txn)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if existing.is_some() {
            return Err(ServiceError::duplicate("Bookmark already exists in this folder"));
        }
    }

    let created = bookmark::new_model(folder_id, url, title, description, favicon_url, og_image_url)
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(bookmark_id = %created.id, %folder_id, "bookmark_created");
    Ok(created)
}

/// Look up a bookmark together with its parent folder, only when that folder
/// is owned by `user_id`. Ownership is transitive; the bookmark row itself
/// carries no owner.
async fn find_owned_with_folder(
    db: &DatabaseConnection,
    user_id: Uuid,
    bookmark_id: Uuid,
) -> Result<Option<(bookmark::Model, folder::Model)>, ServiceError> {
    let found = bookmark::Entity::find_by_id(bookmark_id)
        .find_also_related(folder::Entity)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(match found {
        Some((b, Some(f))) if f.user_id == user_id => Some((b, f)),
        _ => None,
    })
}

pub async fn delete_bookmark(
    db: &DatabaseConnection,
    user_id: Uuid,
    bookmark_id: Uuid,
) -> Result<(), ServiceError> {
    let (found, _) = find_owned_with_folder(db, user_id, bookmark_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("bookmark"))?;
    bookmark::Entity::delete_by_id(found.id)
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(%bookmark_id, "bookmark_deleted");
    Ok(())
}

/// Repoint a bookmark to another owned folder. Both the source and the target
/// folder must be owned; a single update makes the move atomic. The target's
/// duplicate policy is not consulted (matches the create-only legacy rule).
pub async fn move_bookmark(
    db: &DatabaseConnection,
    user_id: Uuid,
    bookmark_id: Uuid,
    target_folder_id: Uuid,
) -> Result<bookmark::Model, ServiceError> {
    let (found, _) = find_owned_with_folder(db, user_id, bookmark_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("bookmark"))?;
    folder_service::find_owned(db, user_id, target_folder_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("folder"))?;
    let mut am: bookmark::ActiveModel = found.into();
    am.folder_id = Set(target_folder_id);
    am.updated_at = Set(Utc::now().into());
    let moved = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(%bookmark_id, %target_folder_id, "bookmark_moved");
    Ok(moved)
}

/// Case-insensitive substring search across title, url and description,
/// restricted to the caller's folders (optionally a single one), newest
/// first, capped at [`SEARCH_LIMIT`].
pub async fn search_bookmarks(
    db: &DatabaseConnection,
    user_id: Uuid,
    query: &str,
    folder_id: Option<Uuid>,
) -> Result<Vec<SearchHit>, ServiceError> {
    let pattern = format!("%{}%", query.to_lowercase());
    let matches = Condition::any()
        .add(
            Expr::expr(Func::lower(Expr::col((bookmark::Entity, bookmark::Column::Title))))
                .like(pattern.clone()),
        )
        .add(
            Expr::expr(Func::lower(Expr::col((bookmark::Entity, bookmark::Column::Url))))
                .like(pattern.clone()),
        )
        .add(
            Expr::expr(Func::lower(Expr::col((bookmark::Entity, bookmark::Column::Description))))
                .like(pattern),
        );

    let mut select = bookmark::Entity::find()
        .inner_join(folder::Entity)
        .filter(folder::Column::UserId.eq(user_id));
    if let Some(folder_id) = folder_id {
        select = select.filter(folder::Column::Id.eq(folder_id));
    }
    select
        .filter(matches)
        .select_only()
        .column(bookmark::Column::Id)
        .column(bookmark::Column::Url)
        .column(bookmark::Column::Title)
        .column(bookmark::Column::Description)
        .column(bookmark::Column::FaviconUrl)
        .column(bookmark::Column::OgImageUrl)
        .column(bookmark::Column::CreatedAt)
        .column(bookmark::Column::FolderId)
        .column_as(folder::Column::Name, "folder_name")
        .column_as(folder::Column::Icon, "folder_icon")
        .order_by_desc(bookmark::Column::CreatedAt)
        .limit(SEARCH_LIMIT)
        .into_model::<SearchHit>()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::user;
    use sea_orm::ActiveModelTrait;

    async fn seed(db: &DatabaseConnection) -> (user::Model, folder::Model) {
        let email = format!("bm_svc_{}@example.com", Uuid::new_v4());
        let u = user::create(db, &email, "Bm Svc", None).await.expect("create user");
        let f = folder_service::create_folder(db, u.id, "Links", None).await.expect("create folder");
        (u, f)
    }

    #[tokio::test]
    async fn create_list_delete_flow() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => { eprintln!("skip: no database: {e}"); return Ok(()); }
        };
        let (u, f) = seed(&db).await;

        let b = create_bookmark(&db, u.id, f.id, "https://example.com", "Example", None, None, None).await?;
        let listed = list_by_folder(&db, u.id, f.id).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, b.id);

        delete_bookmark(&db, u.id, b.id).await?;
        assert!(list_by_folder(&db, u.id, f.id).await?.is_empty());

        user::Entity::delete_by_id(u.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_policy_is_per_folder() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => { eprintln!("skip: no database: {e}"); return Ok(()); }
        };
        let (u, f) = seed(&db).await;

        // allow_duplicate defaults to true: both rows coexist
        create_bookmark(&db, u.id, f.id, "https://example.com", "One", None, None, None).await?;
        create_bookmark(&db, u.id, f.id, "https://example.com", "Two", None, None, None).await?;
        assert_eq!(list_by_folder(&db, u.id, f.id).await?.len(), 2);

        // flip the flag and the same URL rejects
        let mut am: folder::ActiveModel = folder_service::find_owned(&db, u.id, f.id).await?.unwrap().into();
        am.allow_duplicate = Set(false);
        am.update(&db).await?;
        let err = create_bookmark(&db, u.id, f.id, "https://example.com", "Three", None, None, None).await;
        assert!(matches!(err, Err(ServiceError::Duplicate(_))));

        // different URL string still fine (comparison is exact)
        create_bookmark(&db, u.id, f.id, "https://example.com/", "Slash", None, None, None).await?;

        user::Entity::delete_by_id(u.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_saves_respect_the_duplicate_policy() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => { eprintln!("skip: no database: {e}"); return Ok(()); }
        };
        let (u, f) = seed(&db).await;

        let mut am: folder::ActiveModel = folder_service::find_owned(&db, u.id, f.id).await?.unwrap().into();
        am.allow_duplicate = Set(false);
        am.update(&db).await?;

        // two simultaneous saves of the same URL: the folder row lock serializes
        // them, so exactly one wins and the other sees the winner's row
        let (first, second) = tokio::join!(
            create_bookmark(&db, u.id, f.id, "https://example.com", "First", None, None, None),
            create_bookmark(&db, u.id, f.id, "https://example.com", "Second", None, None, None),
        );
        let results = [first, second];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(r, Err(ServiceError::Duplicate(_)))));
        assert_eq!(list_by_folder(&db, u.id, f.id).await?.len(), 1);

        user::Entity::delete_by_id(u.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn move_between_owned_folders() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => { eprintln!("skip: no database: {e}"); return Ok(()); }
        };
        let (u, a) = seed(&db).await;
        let b_folder = folder_service::create_folder(&db, u.id, "Archive", None).await?;

        let bm = create_bookmark(&db, u.id, a.id, "https://example.com", "Example", None, None, None).await?;
        move_bookmark(&db, u.id, bm.id, b_folder.id).await?;
        assert!(list_by_folder(&db, u.id, a.id).await?.is_empty());
        assert_eq!(list_by_folder(&db, u.id, b_folder.id).await?.len(), 1);

        // a foreign target folder fails and leaves the bookmark in place
        let email = format!("bm_svc_{}@example.com", Uuid::new_v4());
        let stranger = user::create(&db, &email, "Stranger", None).await?;
        let foreign = folder_service::create_folder(&db, stranger.id, "Foreign", None).await?;
        let err = move_bookmark(&db, u.id, bm.id, foreign.id).await;
        assert!(matches!(err, Err(ServiceError::NotFound(_))));
        assert_eq!(list_by_folder(&db, u.id, b_folder.id).await?.len(), 1);

        user::Entity::delete_by_id(u.id).exec(&db).await?;
        user::Entity::delete_by_id(stranger.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn search_matches_title_url_description() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => { eprintln!("skip: no database: {e}"); return Ok(()); }
        };
        let (u, f) = seed(&db).await;

        create_bookmark(&db, u.id, f.id, "https://rust-lang.org", "The Rust Language", None, None, None).await?;
        create_bookmark(&db, u.id, f.id, "https://example.com", "Plain", Some("a rusty description"), None, None).await?;
        create_bookmark(&db, u.id, f.id, "https://crates.io", "Registry", None, None, None).await?;

        let hits = search_bookmarks(&db, u.id, "RUST", None).await?;
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.folder_name == "Links"));

        let scoped = search_bookmarks(&db, u.id, "registry", Some(f.id)).await?;
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].url, "https://crates.io");

        // other users' bookmarks never leak into results
        let email = format!("bm_svc_{}@example.com", Uuid::new_v4());
        let other = user::create(&db, &email, "Other", None).await?;
        assert!(search_bookmarks(&db, other.id, "rust", None).await?.is_empty());

        user::Entity::delete_by_id(u.id).exec(&db).await?;
        user::Entity::delete_by_id(other.id).exec(&db).await?;
        Ok(())
    }
}
