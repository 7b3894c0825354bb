use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use mercado_db::DbConfig;
use mercado_storage::StorageConfig;

/// Session secrets that ship in sample configs.
pub const PLACEHOLDER_SECRETS: &[&str] = &["session_cookie_secret", "change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db: DbConfig,
    pub db_retry: Duration,
    pub cors_origins: Vec<String>,
    pub session_cookie: String,
    pub session_secret: String,
    pub static_dir: PathBuf,
    pub upload_limit_bytes: usize,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host = var("MERCADO_HOST", "0.0.0.0");
        let port: u16 = parse(&lookup, "MERCADO_PORT", 3001)?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let db = DbConfig {
            host: var("MERCADO_DB_HOST", "localhost"),
            port: parse(&lookup, "MERCADO_DB_PORT", 3306)?,
            user: var("MERCADO_DB_USER", "root"),
            password: var("MERCADO_DB_PASSWORD", ""),
            database: var("MERCADO_DB_NAME", "marketplace"),
            max_connections: parse(&lookup, "MERCADO_DB_MAX_CONNECTIONS", 10)?,
            acquire_timeout: Duration::from_secs(parse(&lookup, "MERCADO_DB_ACQUIRE_TIMEOUT_SECS", 30)?),
        };

        let cors_origins = var("MERCADO_CORS_ORIGINS", "http://localhost:3000")
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();

        let upload_limit_mb: usize = parse(&lookup, "MERCADO_UPLOAD_LIMIT_MB", 25)?;

        let credentials: PathBuf = var("MERCADO_GOOGLE_CREDENTIALS", "api.json").into();
        let storage = match var("MERCADO_STORAGE", "disk").to_ascii_lowercase().as_str() {
            "disk" => StorageConfig::Disk {
                dir: var("MERCADO_UPLOAD_DIR", "./imagenes").into(),
                public_base_url: lookup("MERCADO_PUBLIC_URL")
                    .unwrap_or_else(|| format!("http://localhost:{}", port)),
            },
            "gcs" => StorageConfig::Gcs {
                bucket: lookup("MERCADO_GCS_BUCKET")
                    .context("MERCADO_GCS_BUCKET is required for the gcs backend")?,
                credentials,
            },
            "drive" => StorageConfig::Drive {
                folder_id: lookup("MERCADO_DRIVE_FOLDER")
                    .context("MERCADO_DRIVE_FOLDER is required for the drive backend")?,
                credentials,
            },
            other => bail!("unknown MERCADO_STORAGE '{}' (expected disk, gcs or drive)", other),
        };

        Ok(Self {
            addr,
            db,
            db_retry: Duration::from_secs(parse(&lookup, "MERCADO_DB_RETRY_SECS", 5)?),
            cors_origins,
            session_cookie: var("MERCADO_SESSION_COOKIE", "session_cookie_name"),
            session_secret: var("MERCADO_SESSION_SECRET", "session_cookie_secret"),
            static_dir: var("MERCADO_STATIC_DIR", "public").into(),
            upload_limit_bytes: upload_limit_mb * 1024 * 1024,
            storage,
        })
    }

    pub fn has_placeholder_secret(&self) -> bool {
        self.session_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&self.session_secret.as_str())
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", key, raw)),
        None => Ok(default),
    }
}
