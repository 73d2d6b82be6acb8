use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: None }
    }
}

/// Connection settings plus the liveness probe knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_ping_interval")]
    pub ping_interval_secs: u64,
    #[serde(default = "default_reconnect_fail_threshold")]
    pub reconnect_fail_threshold: u32,
    #[serde(default)]
    pub run_migrations: bool,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            max_lifetime_secs: default_max_lifetime(),
            ping_interval_secs: default_ping_interval(),
            reconnect_fail_threshold: default_reconnect_fail_threshold(),
            run_migrations: false,
            sqlx_logging: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwks_url: String,
    #[serde(default = "default_jwks_refresh")]
    pub refresh_interval_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self { jwks_url: String::new(), refresh_interval_secs: default_jwks_refresh() }
    }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 8082 }
fn default_max_connections() -> u32 { 50 }
fn default_min_connections() -> u32 { 10 }
fn default_connect_timeout() -> u64 { 30 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_max_lifetime() -> u64 { 300 }
fn default_ping_interval() -> u64 { 60 }
fn default_reconnect_fail_threshold() -> u32 { 3 }
fn default_jwks_refresh() -> u64 { 3600 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if std::path::Path::new(&path).exists() {
        load_from_file(&path)
    } else {
        Ok(AppConfig::default())
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl AppConfig {
    /// File (if any) + process environment, normalized and validated.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok());
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Override fields from an environment lookup. Environment wins over the file.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.trim().parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        self.database.apply_env(&lookup);
        if let Some(url) = lookup("JWKS_URL") {
            self.auth.jwks_url = url;
        }
        if let Some(secs) = lookup("JWKS_REFRESH_SECS").and_then(|v| v.trim().parse::<u64>().ok()) {
            self.auth.refresh_interval_secs = secs;
        }
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.database.validate()?;
        self.auth.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    /// `DATABASE_URL` wins; otherwise the URL is assembled from the `DB_*` parts
    /// when the file did not provide one.
    pub fn apply_env<F>(&mut self, lookup: &F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) {
            self.url = url;
        } else if self.url.trim().is_empty() {
            let user = lookup("DB_USER").unwrap_or_else(|| "postgres".into());
            let password = lookup("DB_PASSWORD").unwrap_or_else(|| "postgres".into());
            let host = lookup("DB_HOST").unwrap_or_else(|| "localhost".into());
            let port = lookup("DB_PORT").unwrap_or_else(|| "5432".into());
            let name = lookup("DB_NAME").unwrap_or_else(|| "officedesk".into());
            let (user, password) = (urlencoding::encode(&user), urlencoding::encode(&password));
            self.url = format!("postgres://{user}:{password}@{host}:{port}/{name}");
        }
        if let Some(flag) = lookup("RUN_MIGRATIONS") {
            self.run_migrations = parse_flag(&flag);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set DATABASE_URL or the DB_* variables"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        if self.ping_interval_secs == 0 || self.reconnect_fail_threshold == 0 {
            return Err(anyhow!("database liveness interval and threshold must be positive"));
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn validate(&self) -> Result<()> {
        if self.jwks_url.trim().is_empty() {
            return Err(anyhow!("auth.jwks_url is empty; set JWKS_URL"));
        }
        if self.refresh_interval_secs == 0 {
            return Err(anyhow!("auth.refresh_interval_secs must be positive"));
        }
        Ok(())
    }
}
