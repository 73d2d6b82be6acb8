#![cfg(test)]
use std::sync::Arc;

use migration::MigratorTrait;
use models::db::DatabaseConfig;
use models::pool::DbPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Pool for the current test's runtime; migrations run once per process.
pub async fn get_pool() -> Result<Arc<DbPool>, anyhow::Error> {
    let mut cfg = DatabaseConfig::default();
    cfg.apply_env(&|k: &str| std::env::var(k).ok());
    cfg.min_connections = 1;
    cfg.max_connections = cfg.max_connections.max(20);
    cfg.acquire_timeout_secs = 10;

    MIGRATED
        .get_or_try_init(|| async {
            let db = models::db::connect_with_config(&cfg).await?;
            migration::Migrator::up(&db, None).await?;
            Ok::<(), anyhow::Error>(())
        })
        .await?;
    DbPool::connect(cfg).await
}

pub async fn new_user(pool: &DbPool, role: models::user::Role) -> Result<models::user::Model, anyhow::Error> {
    let email = format!("svc_{}@example.com", Uuid::new_v4());
    Ok(models::user::create(pool.conn().as_ref(), &email, role).await?)
}
