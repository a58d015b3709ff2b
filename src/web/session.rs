use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use serde_json::{Map, Value};
use tracing::{error, warn};

use crate::oidc::UserClaims;

pub const SESSION_COOKIE: &str = "session";
pub const DEFAULT_SESSION_SECRET: &str = "change-this-secret";
const USER_KEY: &str = "user";

// Key::derive_from wants at least this much master key material.
const MIN_KEY_MATERIAL: usize = 64;

/// Derive the cookie encryption key from the configured session secret.
/// Short secrets are cycled up to the minimum master-key length; an empty
/// secret would never grow, so it falls back to the placeholder.
pub fn session_key(secret: &str) -> Key {
    let secret = if secret.is_empty() {
        warn!("SESSION_SECRET is empty; using the insecure placeholder secret");
        DEFAULT_SESSION_SECRET
    } else {
        secret
    };

    let mut material = Vec::with_capacity(MIN_KEY_MATERIAL);
    while material.len() < MIN_KEY_MATERIAL {
        material.extend_from_slice(secret.as_bytes());
    }
    Key::derive_from(&material)
}

/// Key/value facade over the client-side encrypted session cookie.
///
/// The whole session is one JSON object inside a single private cookie, so
/// every operation is a synchronous read or rewrite of the current request's
/// jar; nothing suspends and nothing is stored server-side.
pub struct Session {
    jar: PrivateCookieJar,
}

impl Session {
    pub fn new(jar: PrivateCookieJar) -> Self {
        Self { jar }
    }

    /// Hand the jar back so the response carries any cookie changes.
    pub fn into_jar(self) -> PrivateCookieJar {
        self.jar
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read_map().get(key).cloned()
    }

    pub fn set(self, key: &str, value: Value) -> Self {
        let mut map = self.read_map();
        map.insert(key.to_string(), value);
        self.write_map(map)
    }

    /// Drop the session cookie entirely, removing every key.
    pub fn clear(self) -> Self {
        let jar = self.jar.remove(removal_cookie());
        Self { jar }
    }

    /// The `user` entry is the sole authorization gate: present means
    /// authenticated.
    pub fn user(&self) -> Option<UserClaims> {
        let value = self.get(USER_KEY)?;
        serde_json::from_value(value).ok()
    }

    pub fn set_user(self, claims: &UserClaims) -> Self {
        match serde_json::to_value(claims) {
            Ok(value) => self.set(USER_KEY, value),
            Err(err) => {
                error!(?err, "failed to serialize user claims into session");
                self
            }
        }
    }

    fn read_map(&self) -> Map<String, Value> {
        self.jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
            .unwrap_or_default()
    }

    fn write_map(self, map: Map<String, Value>) -> Self {
        let jar = match serde_json::to_string(&map) {
            Ok(encoded) => self.jar.add(session_cookie(encoded)),
            Err(err) => {
                error!(?err, "failed to serialize session map");
                self.jar
            }
        };
        Self { jar }
    }
}

fn session_cookie(value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie
}
