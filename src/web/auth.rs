use axum::{
    extract::{Query, State},
    http::{HeaderMap, header},
    response::Redirect,
};
use axum_extra::extract::cookie::PrivateCookieJar;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::web::{AppState, session::Session};

#[derive(Default, Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}

/// GET /login — redirect the browser to the provider's authorization URL.
pub async fn login(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    let redirect_uri = callback_url(&headers);

    match state.oidc().authorization_url(&redirect_uri).await {
        Ok(url) => Redirect::to(&url),
        Err(err) => {
            error!(?err, "failed to begin login");
            Redirect::to("/")
        }
    }
}

/// GET /auth — the provider callback. Exchanges the authorization code for
/// identity claims and writes them into the session. Any failure is logged
/// and lands the user back on the home page unauthenticated.
pub async fn auth_callback(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    Query(params): Query<AuthCallbackQuery>,
) -> (PrivateCookieJar, Redirect) {
    if let Some(provider_error) = params.error.as_deref() {
        warn!(provider_error, "identity provider declined authorization");
        return (jar, Redirect::to("/"));
    }

    let Some(code) = params.code.as_deref() else {
        warn!("auth callback arrived without an authorization code");
        return (jar, Redirect::to("/"));
    };

    let redirect_uri = callback_url(&headers);
    match state.oidc().exchange_code(code, &redirect_uri).await {
        Ok(claims) => {
            info!(email = %claims.email, "login completed");
            let session = Session::new(jar).set_user(&claims);
            (session.into_jar(), Redirect::to("/"))
        }
        Err(err) => {
            error!(?err, "authorization code exchange failed");
            (jar, Redirect::to("/"))
        }
    }
}

/// GET /logout — clear the session. Idempotent for anonymous callers.
pub async fn logout(jar: PrivateCookieJar) -> (PrivateCookieJar, Redirect) {
    let session = Session::new(jar).clear();
    (session.into_jar(), Redirect::to("/"))
}

/// Derive the /auth callback URL from the current request's own origin.
/// Forwarded headers win over `Host` so the URL stays correct behind a
/// proxy that rewrites it.
pub fn callback_url(headers: &HeaderMap) -> String {
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get("x-forwarded-host")
        .or_else(|| headers.get(header::HOST))
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");

    format!("{proto}://{host}/auth")
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn callback_url_uses_request_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:10000"));
        assert_eq!(callback_url(&headers), "http://localhost:10000/auth");
    }

    #[test]
    fn callback_url_honors_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("app.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(callback_url(&headers), "https://app.example.com/auth");
    }

    #[test]
    fn callback_url_prefers_forwarded_host_over_internal_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("10.0.0.5:10000"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("app.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(callback_url(&headers), "https://app.example.com/auth");
    }
}
