use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use models::apikey;

use crate::errors::ServiceError;

/// The caller's current key, if one exists. Keys are stored and returned
/// verbatim so the dashboard can re-display them.
pub async fn get_key(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<apikey::Model>, ServiceError> {
    apikey::Entity::find()
        .filter(apikey::Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Replace the caller's key with a freshly generated one. Delete and insert
/// run in one transaction, so the at-most-one-key invariant holds even if two
/// rotations race (the unique index on user_id breaks the tie).
pub async fn rotate_key(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<apikey::Model, ServiceError> {
    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    apikey::Entity::delete_many()
        .filter(apikey::Column::UserId.eq(user_id))
        .exec(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let created = apikey::new_key_model(user_id)
        .insert(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(user_id = %user_id, "api_key_rotated");
    Ok(created)
}

/// Revoke the caller's key. Idempotent: revoking when no key exists succeeds.
pub async fn delete_key(db: &DatabaseConnection, user_id: Uuid) -> Result<(), ServiceError> {
    let res = apikey::Entity::delete_many()
        .filter(apikey::Column::UserId.eq(user_id))
        .exec(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if res.rows_affected > 0 {
        info!(user_id = %user_id, "api_key_deleted");
    }
    Ok(())
}

/// Resolve a presented key to its row. Used by the bridge to authenticate.
pub async fn find_by_key(
    db: &DatabaseConnection,
    key: &str,
) -> Result<Option<apikey::Model>, ServiceError> {
    apikey::Entity::find()
        .filter(apikey::Column::Key.eq(key))
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Stamp last_used_at. Best effort: a failed stamp must never fail the
/// request that authenticated with the key.
pub async fn touch_last_used(db: &DatabaseConnection, key_id: Uuid) {
    let res = apikey::Entity::update_many()
        .col_expr(apikey::Column::LastUsedAt, Expr::value(Utc::now()))
        .filter(apikey::Column::Id.eq(key_id))
        .exec(db)
        .await;
    if let Err(e) = res {
        warn!(%key_id, error = %e, "failed to stamp api key usage");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::user;

    #[tokio::test]
    async fn rotation_replaces_the_single_key() -> Result<(), anyhow::Error> {
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => { eprintln!("skip: no database: {e}"); return Ok(()); }
        };
        let email = format!("apikey_svc_{}@example.com", Uuid::new_v4());
        let u = user::create(&db, &email, "Key Svc", None).await?;

        assert!(get_key(&db, u.id).await?.is_none());

        let first = rotate_key(&db, u.id).await?;
        assert!(first.key.starts_with(apikey::KEY_PREFIX));
        assert!(first.last_used_at.is_none());

        let second = rotate_key(&db, u.id).await?;
        assert_ne!(first.key, second.key);
        // the old key no longer authenticates
        assert!(find_by_key(&db, &first.key).await?.is_none());
        assert_eq!(get_key(&db, u.id).await?.map(|k| k.id), Some(second.id));

        touch_last_used(&db, second.id).await;
        assert!(get_key(&db, u.id).await?.unwrap().last_used_at.is_some());

        delete_key(&db, u.id).await?;
        assert!(get_key(&db, u.id).await?.is_none());
        // idempotent revoke
        delete_key(&db, u.id).await?;

        user::Entity::delete_by_id(u.id).exec(&db).await?;
        Ok(())
    }
}
