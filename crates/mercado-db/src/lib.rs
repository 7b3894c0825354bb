pub mod models;
pub mod queries;

use std::time::Duration;

use anyhow::Result;
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use tracing::{info, warn};

/// Connection settings for the marketplace database.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 3306,
            user: "root".into(),
            password: String::new(),
            database: "marketplace".into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

impl DbConfig {
    pub fn connect_options(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.database)
    }
}

/// Handle to the connection pool. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    pool: MySqlPool,
}

impl Database {
    /// Build the pool without touching the network. Connections are opened
    /// on first use, so the server can start while MySQL is still down.
    pub fn connect_lazy(config: &DbConfig) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_lazy_with(config.connect_options());

        info!(
            "Database pool for {}@{}:{}/{} (max {} connections)",
            config.user, config.host, config.port, config.database, config.max_connections
        );
        Self { pool }
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Acquire one connection and hand it straight back.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.pool.acquire().await?;
        drop(conn);
        Ok(())
    }

    /// Block until a connection can be acquired, retrying forever on a fixed delay.
    pub async fn wait_until_ready(&self, retry_delay: Duration) {
        let mut attempt: u64 = 0;
        loop {
            attempt += 1;
            match self.ping().await {
                Ok(()) => {
                    info!("Connected to MySQL after {} attempt(s)", attempt);
                    return;
                }
                Err(e) => {
                    warn!(
                        "Database unavailable (attempt {}): {}. Retrying in {}s",
                        attempt,
                        e,
                        retry_delay.as_secs_f32()
                    );
                    tokio::time::sleep(retry_delay).await;
                }
            }
        }
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Database pool closed");
    }
}
