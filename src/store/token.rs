//! OAuth2 access tokens for a service account.
//!
//! A short-lived RS256 assertion signed with the account's private key is
//! exchanged at the token endpoint (JWT bearer grant) for an access token.
//! The token is cached and refreshed shortly before it expires.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use super::StoreError;
use crate::config::ServiceAccountKey;

/// Scopes needed for Realtime Database REST access.
pub const SCOPES: &str = "https://www.googleapis.com/auth/firebase.database \
                          https://www.googleapis.com/auth/userinfo.email";

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for each assertion, the maximum the endpoint accepts.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_SECS: u64 = 60;

/// Claims of the signed assertion.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

pub struct TokenSource {
    client: reqwest::Client,
    client_email: String,
    token_uri: String,
    header: Header,
    key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSource")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl TokenSource {
    /// Fails if the private key is not a valid RSA PEM key.
    pub fn new(client: reqwest::Client, account: &ServiceAccountKey) -> Result<Self, StoreError> {
        let key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())
            .map_err(|e| StoreError::Auth(format!("Invalid private key: {}", e)))?;

        let mut header = Header::new(Algorithm::RS256);
        header.kid = account.private_key_id.clone();

        Ok(Self {
            client,
            client_email: account.client_email.clone(),
            token_uri: account.token_uri.clone(),
            header,
            key,
            cached: Mutex::new(None),
        })
    }

    /// Returns a valid access token, exchanging a new assertion when the
    /// cached one is missing or about to expire.
    pub async fn access_token(&self) -> Result<String, StoreError> {
        // Held across the exchange so concurrent callers share one refresh.
        let mut cached = self.cached.lock().await;
        let now = now_secs();

        if let Some(token) = cached
            .as_ref()
            .filter(|token| token.expires_at > now + REFRESH_MARGIN_SECS)
        {
            return Ok(token.value.clone());
        }

        let token = self.exchange(now).await?;
        tracing::debug!("Obtained access token for {}", self.client_email);
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Signs the assertion presented to the token endpoint.
    pub fn assertion(&self, now: u64) -> Result<String, StoreError> {
        let claims = AssertionClaims {
            iss: self.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: self.token_uri.clone(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&self.header, &claims, &self.key)
            .map_err(|e| StoreError::Auth(format!("Failed to sign assertion: {}", e)))
    }

    async fn exchange(&self, now: u64) -> Result<CachedToken, StoreError> {
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(&self.token_uri)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Auth(format!(
                "Token endpoint returned status {}",
                status
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Auth(e.to_string()))?;

        Ok(CachedToken {
            value: body.access_token,
            expires_at: now + body.expires_in,
        })
    }
}
