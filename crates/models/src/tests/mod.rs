

use anyhow::Result;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Connect and migrate once per test process.
pub(crate) async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = crate::db::connect().await?;
    MIGRATED
        .get_or_try_init(|| async { migration::Migrator::up(&db, None).await })
        .await?;
    Ok(db)
}
