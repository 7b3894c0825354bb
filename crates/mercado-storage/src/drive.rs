use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::{GoogleAuth, ObjectStore, Upload};

pub const SCOPE: &str = "https://www.googleapis.com/auth/drive";

const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const API_BASE: &str = "https://www.googleapis.com/drive/v3";

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
}

/// Google Drive folder. Each upload is made world-readable and addressed
/// through Drive's thumbnail endpoint.
pub struct DriveStore {
    folder_id: String,
    auth: GoogleAuth,
    upload_base: String,
    api_base: String,
}

impl DriveStore {
    pub fn new(folder_id: String, auth: GoogleAuth) -> Self {
        Self::with_endpoints(folder_id, auth, UPLOAD_BASE.into(), API_BASE.into())
    }

    pub fn with_endpoints(
        folder_id: String,
        auth: GoogleAuth,
        upload_base: String,
        api_base: String,
    ) -> Self {
        Self {
            folder_id,
            auth,
            upload_base: upload_base.trim_end_matches('/').to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    pub fn public_url(file_id: &str) -> String {
        format!("https://drive.google.com/thumbnail?id={}&sz=w1000-h1000", file_id)
    }

    async fn expect_success(response: reqwest::Response, step: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(anyhow!("drive {} returned {}: {}", step, status, body))
    }

    async fn place_and_share(&self, token: &str, file_id: &str, file_name: &str) -> Result<()> {
        let http = self.auth.http();

        // Name it and move it into the target folder.
        let response = http
            .patch(format!("{}/files/{}", self.api_base, file_id))
            .query(&[("addParents", self.folder_id.as_str()), ("fields", "id")])
            .bearer_auth(token)
            .json(&json!({ "name": file_name }))
            .send()
            .await
            .context("drive metadata request failed")?;
        Self::expect_success(response, "metadata update").await?;

        // Anyone with the link can read it.
        let response = http
            .post(format!("{}/files/{}/permissions", self.api_base, file_id))
            .bearer_auth(token)
            .json(&json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await
            .context("drive permission request failed")?;
        Self::expect_success(response, "permission grant").await?;
        Ok(())
    }

    async fn discard(&self, token: &str, file_id: &str) {
        let result = self
            .auth
            .http()
            .delete(format!("{}/files/{}", self.api_base, file_id))
            .bearer_auth(token)
            .send()
            .await;
        match result {
            Ok(response) if response.status().is_success() => {
                info!("Removed incomplete Drive upload {}", file_id)
            }
            Ok(response) => warn!("Could not remove Drive file {}: {}", file_id, response.status()),
            Err(e) => warn!("Could not remove Drive file {}: {}", file_id, e),
        }
    }
}

#[async_trait]
impl ObjectStore for DriveStore {
    async fn put(&self, upload: Upload) -> Result<String> {
        let token = self.auth.access_token().await?;
        let http = self.auth.http();
        let size = upload.bytes.len();

        // 1. Raw media upload; Drive assigns an id and a placeholder name.
        let response = http
            .post(format!("{}/files", self.upload_base))
            .query(&[("uploadType", "media"), ("fields", "id")])
            .bearer_auth(&token)
            .header(CONTENT_TYPE, upload.content_type)
            .body(upload.bytes)
            .send()
            .await
            .context("drive upload request failed")?;
        let file: DriveFile = Self::expect_success(response, "upload").await?.json().await?;

        // 2 and 3. A file that cannot be placed or shared is removed again.
        if let Err(e) = self.place_and_share(&token, &file.id, &upload.file_name).await {
            self.discard(&token, &file.id).await;
            return Err(e);
        }

        info!("Uploaded {} ({} bytes) to Drive as {}", upload.file_name, size, file.id);
        Ok(Self::public_url(&file.id))
    }

    fn kind(&self) -> &'static str {
        "drive"
    }
}
