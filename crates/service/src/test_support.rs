#![cfg(test)]
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connect for a test run. `Err` means no database is reachable and the
/// calling test should skip instead of failing.
pub async fn get_db() -> anyhow::Result<DatabaseConnection> {
    let db = models::db::connect().await?;
    MIGRATED
        .get_or_try_init(|| async {
            migration::Migrator::up(&db, None).await?;
            Ok::<_, anyhow::Error>(())
        })
        .await?;
    Ok(db)
}
