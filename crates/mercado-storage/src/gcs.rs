use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use tracing::info;

use crate::{GoogleAuth, ObjectStore, Upload};

pub const SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

const UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1";
const PUBLIC_BASE: &str = "https://storage.googleapis.com";

/// Google Cloud Storage bucket. Objects are expected to be publicly readable
/// through bucket-level IAM, so the URL is simply bucket + object name.
pub struct GcsStore {
    bucket: String,
    auth: GoogleAuth,
    upload_base: String,
    public_base: String,
}

impl GcsStore {
    pub fn new(bucket: String, auth: GoogleAuth) -> Self {
        Self::with_endpoints(bucket, auth, UPLOAD_BASE.into(), PUBLIC_BASE.into())
    }

    /// Point the store at other endpoints (emulators, tests).
    pub fn with_endpoints(
        bucket: String,
        auth: GoogleAuth,
        upload_base: String,
        public_base: String,
    ) -> Self {
        Self {
            bucket,
            auth,
            upload_base: upload_base.trim_end_matches('/').to_string(),
            public_base,
        }
    }

    pub fn public_url(&self, object_name: &str) -> Result<String> {
        let mut url = Url::parse(&self.public_base)?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("public base {} cannot take a path", self.public_base))?
            .pop_if_empty()
            .push(&self.bucket)
            .push(object_name);
        Ok(url.to_string())
    }
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn put(&self, upload: Upload) -> Result<String> {
        let token = self.auth.access_token().await?;
        let endpoint = format!("{}/b/{}/o", self.upload_base, self.bucket);
        let size = upload.bytes.len();

        let response = self
            .auth
            .http()
            .post(&endpoint)
            .query(&[("uploadType", "media"), ("name", upload.file_name.as_str())])
            .bearer_auth(token)
            .header(CONTENT_TYPE, upload.content_type)
            .body(upload.bytes)
            .send()
            .await
            .context("bucket upload request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("bucket upload returned {}: {}", status, body));
        }

        info!("Uploaded {} ({} bytes) to bucket {}", upload.file_name, size, self.bucket);
        self.public_url(&upload.file_name)
    }

    fn kind(&self) -> &'static str {
        "gcs"
    }
}
