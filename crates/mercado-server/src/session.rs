use std::time::Duration;

use anyhow::{Result, anyhow};
use sha2::{Digest, Sha512};
use sqlx::MySqlPool;
use tokio::task::JoinHandle;
use tower_sessions::{
    ExpiredDeletion, Expiry, SessionManagerLayer,
    cookie::{Key, SameSite, time},
    service::SignedCookie,
};
use tower_sessions_sqlx_store::MySqlStore;
use tracing::{info, warn};

const SESSION_TABLE: &str = "sessions";
const DELETION_INTERVAL: Duration = Duration::from_secs(60);
const INACTIVITY_HOURS: i64 = 24;

/// Create the session table in the marketplace schema and start the
/// expired-record sweeper.
pub async fn open_store(pool: MySqlPool, schema: &str) -> Result<(MySqlStore, JoinHandle<()>)> {
    let store = MySqlStore::new(pool)
        .with_schema_name(schema)
        .map_err(|e| anyhow!("invalid session schema: {}", e))?
        .with_table_name(SESSION_TABLE)
        .map_err(|e| anyhow!("invalid session table: {}", e))?;
    store.migrate().await?;
    info!("Session table {}.{} ready", schema, SESSION_TABLE);

    let sweeper = store.clone();
    let task = tokio::spawn(async move {
        if let Err(e) = sweeper.continuously_delete_expired(DELETION_INTERVAL).await {
            warn!("Session cleanup stopped: {}", e);
        }
    });
    Ok((store, task))
}

/// 64-byte signing key stretched from an arbitrary-length secret.
pub fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

pub fn layer(
    store: MySqlStore,
    cookie_name: String,
    secret: &str,
) -> SessionManagerLayer<MySqlStore, SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(cookie_name)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::hours(INACTIVITY_HOURS)))
        .with_signed(signing_key(secret))
}
