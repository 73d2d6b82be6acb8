use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use configs::AppConfig;
use migration::MigratorTrait;
use models::pool::DbPool;
use service::identity::KeySet;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::AppState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    let raw = cfg.server.bind_addr();
    raw.parse().map_err(|e| StartupError::InvalidConfig(format!("bind address {raw}: {e}")))
}

/// `.env` first, then the config file and the environment, validated.
pub fn load_config() -> Result<AppConfig, StartupError> {
    dotenvy::dotenv().ok();
    AppConfig::load_and_validate().map_err(|e| StartupError::InvalidConfig(e.to_string()))
}

/// Connect, migrate, fetch keys, start the background tasks and build the router.
pub async fn build_app(cfg: &AppConfig, cancel: &CancellationToken) -> Result<Router, StartupError> {
    let pool = DbPool::connect(cfg.database.clone()).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(pool.conn().as_ref(), None)
            .await
            .map_err(|e| StartupError::Any(e.into()))?;
        info!("migrations_applied");
    }

    let keys = KeySet::fetch(&cfg.auth.jwks_url).await.map_err(|e| StartupError::Jwks(e.to_string()))?;
    keys.spawn_refresher(Duration::from_secs(cfg.auth.refresh_interval_secs), cancel.child_token());
    pool.spawn_liveness_probe(cancel.child_token());

    let state = AppState::new(Arc::clone(&pool), keys);
    Ok(routes::build_router(state, build_cors()))
}

/// Public entry: serve until `shutdown` fires, then drain in-flight requests.
pub async fn run(cfg: AppConfig, shutdown: CancellationToken) -> anyhow::Result<()> {
    let addr = bind_addr(&cfg)?;
    let app = build_app(&cfg, &shutdown).await?;

    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let drain = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { drain.cancelled().await })
        .await?;
    // stop the background loops if the server exited on its own
    shutdown.cancel();
    info!("server stopped");
    Ok(())
}
