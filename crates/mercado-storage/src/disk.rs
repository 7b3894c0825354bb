use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::{IMAGES_ROUTE, ObjectStore, Upload};

/// Stores uploads as flat files in a local directory.
///
/// Each upload lands at `{dir}/{file_name}`; the server serves that directory
/// under [`IMAGES_ROUTE`], so the public URL is derived from the configured base.
pub struct DiskStore {
    dir: PathBuf,
    public_base_url: String,
}

impl DiskStore {
    pub async fn new(dir: PathBuf, public_base_url: String) -> Result<Self> {
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("creating upload directory {}", dir.display()))?;
        info!("Upload directory: {}", dir.display());
        Ok(Self {
            dir,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    pub fn public_url(&self, file_name: &str) -> String {
        format!("{}{}/{}", self.public_base_url, IMAGES_ROUTE, file_name)
    }
}

#[async_trait]
impl ObjectStore for DiskStore {
    async fn put(&self, upload: Upload) -> Result<String> {
        let path = self.file_path(&upload.file_name);
        // Never replace an earlier upload that got the same name.
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .with_context(|| format!("creating {}", path.display()))?;
        file.write_all(&upload.bytes).await?;
        file.flush().await?;

        info!("Stored {} ({} bytes) on disk", upload.file_name, upload.bytes.len());
        Ok(self.public_url(&upload.file_name))
    }

    fn kind(&self) -> &'static str {
        "disk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn writes_file_and_returns_served_url() {
        let dir = std::env::temp_dir().join(format!("mercado_disk_store_{}", std::process::id()));
        let store = DiskStore::new(dir.clone(), "http://localhost:3001/".into()).await.unwrap();

        let url = store
            .put(Upload {
                file_name: "1_foto.jpg".into(),
                content_type: "image/jpeg".into(),
                bytes: Bytes::from_static(b"\xff\xd8\xff\xe0jpeg"),
            })
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:3001/imagenes/1_foto.jpg");
        let written = tokio::fs::read(dir.join("1_foto.jpg")).await.unwrap();
        assert_eq!(written, b"\xff\xd8\xff\xe0jpeg");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }

    #[tokio::test]
    async fn same_name_twice_is_rejected() {
        let dir = std::env::temp_dir().join(format!("mercado_disk_clash_{}", std::process::id()));
        let store = DiskStore::new(dir.clone(), "http://localhost:3001".into()).await.unwrap();
        let upload = |data: &'static [u8]| Upload {
            file_name: "5_chile.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: Bytes::from_static(data),
        };

        store.put(upload(b"primero")).await.unwrap();
        let err = store.put(upload(b"segundo")).await.unwrap_err();
        assert!(err.to_string().contains("5_chile.jpg"), "unexpected error: {err}");

        let kept = tokio::fs::read(dir.join("5_chile.jpg")).await.unwrap();
        assert_eq!(kept, b"primero");

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
