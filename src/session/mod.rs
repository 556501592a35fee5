//! Server-side sessions keyed by an opaque cookie token.
//!
//! A session only records which user is logged in. Sessions do not expire; they
//! end at logout or when the process restarts.

use anyhow::{Context, Result};
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use std::{collections::HashMap, sync::RwLock};
use tracing::error;

pub const SESSION_COOKIE_NAME: &str = "studymate_session";

pub trait SessionStore: Send + Sync {
    /// Start a session for `username` and return its token.
    ///
    /// # Errors
    /// Returns an error if a token cannot be generated or stored.
    fn create(&self, username: &str) -> Result<String>;

    /// Username bound to `token`, if the session exists.
    fn get(&self, token: &str) -> Option<String>;

    /// End the session; unknown tokens are ignored.
    fn remove(&self, token: &str);
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().map_or(0, |sessions| sessions.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn create(&self, username: &str) -> Result<String> {
        let token = generate_session_token()?;
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| anyhow::anyhow!("session store lock poisoned"))?;
        sessions.insert(token.clone(), username.to_string());
        Ok(token)
    }

    fn get(&self, token: &str) -> Option<String> {
        match self.sessions.read() {
            Ok(sessions) => sessions.get(token).cloned(),
            Err(err) => {
                error!("Failed to read session store: {err}");
                None
            }
        }
    }

    fn remove(&self, token: &str) {
        match self.sessions.write() {
            Ok(mut sessions) => {
                sessions.remove(token);
            }
            Err(err) => error!("Failed to write session store: {err}"),
        }
    }
}

/// Generate a random URL-safe session token.
///
/// # Errors
/// Returns an error if the OS random source fails.
pub fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Build the `HttpOnly` cookie carrying the session token.
///
/// # Errors
/// Returns an error if the token contains characters not allowed in a header.
pub fn session_cookie(token: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Cookie that makes the browser drop the session token.
///
/// # Errors
/// Never in practice; the value is static apart from the `Secure` flag.
pub fn clear_session_cookie(secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read the session token from the `Cookie` header.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let (Some(key), Some(val)) = (parts.next(), parts.next()) else {
                continue;
            };
            let val = val.trim();
            if key.trim() == SESSION_COOKIE_NAME && !val.is_empty() {
                return Some(val.to_string());
            }
        }
    }
    None
}
