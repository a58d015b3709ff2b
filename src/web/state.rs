use std::env;

use anyhow::Result;
use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use tracing::warn;

use crate::oidc::OidcClient;
use crate::web::session::{DEFAULT_SESSION_SECRET, session_key};

#[derive(Clone)]
pub struct AppState {
    oidc: OidcClient,
    key: Key,
}

impl AppState {
    pub fn new() -> Result<Self> {
        let oidc = OidcClient::from_env()?;

        let secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            warn!("SESSION_SECRET not set; using the insecure placeholder secret");
            DEFAULT_SESSION_SECRET.to_string()
        });

        Ok(Self::from_parts(oidc, session_key(&secret)))
    }

    pub fn from_parts(oidc: OidcClient, key: Key) -> Self {
        Self { oidc, key }
    }

    pub fn oidc(&self) -> &OidcClient {
        &self.oidc
    }
}

// Feeds the private cookie jar extractor.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Key {
        state.key.clone()
    }
}
