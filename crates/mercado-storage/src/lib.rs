//! Upload gateway: one trait, one implementation per object-store backend.
//!
//! The server picks a backend from configuration at startup and hands it to
//! the API as `Arc<dyn ObjectStore>`.

pub mod disk;
pub mod drive;
pub mod gcs;
pub mod google_auth;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};

pub use disk::DiskStore;
pub use drive::DriveStore;
pub use gcs::GcsStore;
pub use google_auth::GoogleAuth;

/// Route prefix under which the disk backend's files are served.
pub const IMAGES_ROUTE: &str = "/imagenes";

/// Content type assumed when the client does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// A file ready to be stored.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store the upload and return a publicly reachable URL for it.
    async fn put(&self, upload: Upload) -> Result<String>;

    /// Short backend name for logs.
    fn kind(&self) -> &'static str;
}

/// Which backend to build, with its settings.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    Disk { dir: PathBuf, public_base_url: String },
    Gcs { bucket: String, credentials: PathBuf },
    Drive { folder_id: String, credentials: PathBuf },
}

pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config {
        StorageConfig::Disk { dir, public_base_url } => {
            Arc::new(DiskStore::new(dir.clone(), public_base_url.clone()).await?)
        }
        StorageConfig::Gcs { bucket, credentials } => {
            let auth = GoogleAuth::from_key_file(credentials, gcs::SCOPE)?;
            Arc::new(GcsStore::new(bucket.clone(), auth))
        }
        StorageConfig::Drive { folder_id, credentials } => {
            let auth = GoogleAuth::from_key_file(credentials, drive::SCOPE)?;
            Arc::new(DriveStore::new(folder_id.clone(), auth))
        }
    };
    tracing::info!("Object store backend: {}", store.kind());
    Ok(store)
}

/// `{unix-millis}_{name}`, keeping only the last path component of the
/// client-supplied name and replacing anything outside `[A-Za-z0-9._-]`.
pub fn timestamped_name(original: &str, now: DateTime<Utc>) -> String {
    let base = original
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim_start_matches('.');

    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect();

    let cleaned = if cleaned.is_empty() { "imagen".to_string() } else { cleaned };
    format!("{}_{}", now.timestamp_millis(), cleaned)
}
