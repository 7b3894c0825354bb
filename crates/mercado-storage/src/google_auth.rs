use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed this long before Google says they expire.
const REFRESH_MARGIN_SECS: i64 = 60;

/// The fields of a service-account key file that the token exchange needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

struct CachedToken {
    value: String,
    refresh_at: DateTime<Utc>,
}

/// Service-account authentication: signs an RS256 assertion and trades it
/// for a bearer token, cached until shortly before it expires.
pub struct GoogleAuth {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scope: &'static str,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl GoogleAuth {
    pub fn new(key: ServiceAccountKey, scope: &'static str) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("service account private_key is not a valid RSA PEM")?;
        Ok(Self {
            key,
            encoding_key,
            scope,
            http: reqwest::Client::new(),
            cached: Mutex::new(None),
        })
    }

    pub fn from_key_file(path: &Path, scope: &'static str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading service account key {}", path.display()))?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .with_context(|| format!("parsing service account key {}", path.display()))?;
        Self::new(key, scope)
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// A valid bearer token, fetching a fresh one when the cached one is stale.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.refresh_at > now {
                return Ok(token.value.clone());
            }
        }

        let response = self.exchange(now).await?;
        let refresh_at = now + Duration::seconds((response.expires_in - REFRESH_MARGIN_SECS).max(0));
        debug!("Fetched Google access token for {}", self.key.client_email);

        *cached = Some(CachedToken {
            value: response.access_token.clone(),
            refresh_at,
        });
        Ok(response.access_token)
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: self.scope,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?)
    }

    async fn exchange(&self, now: DateTime<Utc>) -> Result<TokenResponse> {
        let assertion = self.assertion(now)?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .context("token request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("token endpoint returned {}: {}", status, body));
        }

        Ok(response.json::<TokenResponse>().await?)
    }
}
