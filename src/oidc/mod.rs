use std::{env, sync::Arc, time::Duration};

use anyhow::{Context, Result, anyhow, bail};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

/// Google's published discovery document for the OpenID-Connect flow.
const DISCOVERY_URL: &str = "https://accounts.google.com/.well-known/openid-configuration";
const OAUTH_SCOPES: &str = "openid email profile";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Endpoint URLs resolved from the provider's well-known metadata document.
#[derive(Clone, Debug, Deserialize)]
pub struct ProviderMetadata {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    pub userinfo_endpoint: String,
}

/// Standardized identity claims returned by the provider's userinfo endpoint.
/// This is what gets written into the session as the `user` entry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Client for the authorization-code exchange with the identity provider.
///
/// Provider endpoints are fetched once from the discovery document and cached
/// for the process lifetime. A duplicate fetch from two concurrent first
/// requests is harmless; both store identical metadata.
#[derive(Clone)]
pub struct OidcClient {
    http: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    discovery_url: String,
    metadata: Arc<RwLock<Option<ProviderMetadata>>>,
}

impl OidcClient {
    /// Build a client using environment variables. Missing credentials do not
    /// prevent startup; login requests fail until they are configured.
    pub fn from_env() -> Result<Self> {
        let client_id = env::var("GOOGLE_CLIENT_ID").ok();
        let client_secret = env::var("GOOGLE_CLIENT_SECRET").ok();

        if client_id.is_none() || client_secret.is_none() {
            info!("GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET not set; login is disabled");
        }

        Self::new(client_id, client_secret, DISCOVERY_URL)
    }

    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        discovery_url: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            client_id,
            client_secret,
            discovery_url: discovery_url.into(),
            metadata: Arc::new(RwLock::new(None)),
        })
    }

    /// Resolve provider endpoints, fetching the discovery document on first use.
    pub async fn metadata(&self) -> Result<ProviderMetadata> {
        {
            let guard = self.metadata.read().await;
            if let Some(meta) = guard.as_ref() {
                return Ok(meta.clone());
            }
        }

        let meta = self
            .http
            .get(&self.discovery_url)
            .send()
            .await
            .context("discovery document request failed")?
            .error_for_status()
            .context("discovery document request rejected")?
            .json::<ProviderMetadata>()
            .await
            .context("failed to parse discovery document")?;

        let mut guard = self.metadata.write().await;
        *guard = Some(meta.clone());
        Ok(meta)
    }

    /// Build the provider authorization URL the browser is redirected to.
    /// Mutates no local state.
    pub async fn authorization_url(&self, redirect_uri: &str) -> Result<String> {
        let Some(client_id) = self.client_id.as_deref() else {
            bail!("GOOGLE_CLIENT_ID is not configured but required for login");
        };

        let meta = self.metadata().await?;
        build_authorization_url(&meta, client_id, redirect_uri)
    }

    /// Exchange an authorization code for identity claims: the token endpoint
    /// yields an access token, which is then presented to the userinfo
    /// endpoint for the standardized claims.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<UserClaims> {
        let (Some(client_id), Some(client_secret)) =
            (self.client_id.as_deref(), self.client_secret.as_deref())
        else {
            bail!("OAuth client credentials are not configured");
        };

        let meta = self.metadata().await?;

        let response = self
            .http
            .post(&meta.token_endpoint)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await
            .context("token endpoint request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("authorization code exchange rejected with status {status}: {body}");
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .context("failed to parse token endpoint response")?;

        self.http
            .get(&meta.userinfo_endpoint)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("userinfo request failed")?
            .error_for_status()
            .context("userinfo request rejected")?
            .json::<UserClaims>()
            .await
            .context("failed to parse userinfo claims")
    }
}

fn build_authorization_url(
    meta: &ProviderMetadata,
    client_id: &str,
    redirect_uri: &str,
) -> Result<String> {
    let mut url = Url::parse(&meta.authorization_endpoint)
        .map_err(|err| anyhow!("invalid authorization endpoint: {err}"))?;

    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("client_id", client_id)
        .append_pair("redirect_uri", redirect_uri)
        .append_pair("scope", OAUTH_SCOPES);

    Ok(url.into())
}
