use std::time::Duration;

use once_cell::sync::Lazy;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub use configs::DatabaseConfig;

pub static DATABASE_URL: Lazy<String> = Lazy::new(|| {
    // Load .env if present
    let _ = dotenvy::dotenv();
    let mut cfg = DatabaseConfig::default();
    cfg.apply_env(&|k: &str| std::env::var(k).ok());
    cfg.url
});

/// Connect with default pool bounds to `DATABASE_URL` (or the `DB_*` parts).
pub async fn connect() -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig { url: DATABASE_URL.clone(), ..DatabaseConfig::default() };
    connect_with_config(&cfg).await
}

pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    opt.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    opt
}

pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let db = Database::connect(connect_options(cfg)).await?;
    Ok(db)
}
