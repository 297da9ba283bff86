//! API3 client-credentials session with a shared, self-refreshing token.
//!
//! One [`AuthSession`] is created per [`LookerClient`](crate::LookerClient)
//! and shared by every call made through it. It is the only state concurrent
//! calls share.
//!
//! Logins are serialized behind a single async mutex. A caller that needs a
//! token waits for the lock and re-checks the cache once it has it, so when
//! many calls find the token missing, expired, or rejected at the same time,
//! exactly one of them logs in and the rest pick up its token.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use tokio::sync::{Mutex, RwLock};

use crate::constants::{LOGIN_PATH, LOGOUT_PATH, TOKEN_EXPIRY_LEEWAY};
use crate::error::{ApiErrorBody, LookerError, Result};

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Body of a successful `POST /login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// A cached bearer token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    value: String,
    expires_at: Option<DateTime<Utc>>,
    leeway: chrono::Duration,
    generation: u64,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("generation", &self.generation)
            .finish()
    }
}

impl AccessToken {
    /// The raw token string.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// When the server said the token expires, if it said.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Monotonic counter distinguishing successive logins.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether the token can still be used at `now`.
    ///
    /// Tokens are retired [`TOKEN_EXPIRY_LEEWAY`] early, or half their
    /// lifetime early when they were issued for less than twice that.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(at) => now + self.leeway < at,
            None => true,
        }
    }

    /// `Authorization` header value.
    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

fn leeway() -> chrono::Duration {
    chrono::Duration::from_std(TOKEN_EXPIRY_LEEWAY).unwrap_or_else(|_| chrono::Duration::zero())
}

// ---------------------------------------------------------------------------
// AuthSession
// ---------------------------------------------------------------------------

/// Credential holder for one client: hands out a valid token, logging in or
/// refreshing when needed.
pub struct AuthSession {
    http: reqwest::Client,
    api_root: String,
    client_id: String,
    client_secret: String,
    timeout: Option<Duration>,
    headers: HeaderMap,
    token: RwLock<Option<AccessToken>>,
    login_lock: Mutex<()>,
    logins: AtomicU64,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("api_root", &self.api_root)
            .field("client_id", &self.client_id)
            .field("logins", &self.logins.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl AuthSession {
    /// Create a session that logs in against `api_root` with API3
    /// credentials. No request is made until a token is needed.
    pub fn new(
        http: reqwest::Client,
        api_root: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_root: api_root.into().trim_end_matches('/').to_owned(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout: None,
            headers: HeaderMap::new(),
            token: RwLock::new(None),
            login_lock: Mutex::new(()),
            logins: AtomicU64::new(0),
        }
    }

    /// Apply a timeout to login and logout requests.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send these headers with login and logout requests.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Return a valid token, logging in if none is cached or the cached one
    /// has expired.
    pub async fn token(&self) -> Result<AccessToken> {
        if let Some(token) = self.cached_valid().await {
            return Ok(token);
        }

        let seen = self.logins.load(Ordering::SeqCst);
        let _guard = self.login_lock.lock().await;
        // A login that finished while we waited is fresh enough, whatever
        // its expiry.
        if let Some(token) = self.cached_newer_than(seen).await {
            return Ok(token);
        }
        if let Some(token) = self.cached_valid().await {
            return Ok(token);
        }
        self.login_locked().await
    }

    /// Replace a token the server rejected.
    ///
    /// If another caller already replaced `stale`, its newer token is returned
    /// without logging in again.
    pub async fn refresh_rejected(&self, stale: &AccessToken) -> Result<AccessToken> {
        let _guard = self.login_lock.lock().await;
        if let Some(current) = self.cached_newer_than(stale.generation).await {
            return Ok(current);
        }
        tracing::warn!(generation = stale.generation, "access token rejected, logging in again");
        self.login_locked().await
    }

    /// Log in unconditionally and cache the new token.
    pub async fn login(&self) -> Result<AccessToken> {
        let _guard = self.login_lock.lock().await;
        self.login_locked().await
    }

    /// Revoke the current token on the server and clear the cache.
    ///
    /// Returns `false` when there was no token to revoke. A token the server
    /// no longer recognises (401/404) is still cleared locally.
    pub async fn logout(&self) -> Result<bool> {
        let _guard = self.login_lock.lock().await;
        let Some(token) = self.token.write().await.take() else {
            return Ok(false);
        };

        let url = format!("{}{}", self.api_root, LOGOUT_PATH);
        tracing::debug!(%url, "DELETE logout");

        let mut req = self
            .http
            .delete(&url)
            .headers(self.headers.clone())
            .header(reqwest::header::AUTHORIZATION, token.bearer());
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let resp = req.send().await?;
        let status = resp.status();

        if status.is_success() || status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
            Ok(true)
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(LookerError::from_response(status, body))
        }
    }

    /// Drop the cached token without contacting the server.
    pub async fn invalidate(&self) {
        self.token.write().await.take();
    }

    /// Whether a token is cached and not expired.
    pub async fn is_authenticated(&self) -> bool {
        self.cached_valid().await.is_some()
    }

    /// Number of logins performed so far.
    pub fn login_count(&self) -> u64 {
        self.logins.load(Ordering::SeqCst)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    async fn cached_valid(&self) -> Option<AccessToken> {
        self.token
            .read()
            .await
            .as_ref()
            .filter(|t| t.is_valid_at(Utc::now()))
            .cloned()
    }

    async fn cached_newer_than(&self, generation: u64) -> Option<AccessToken> {
        self.token
            .read()
            .await
            .as_ref()
            .filter(|t| t.generation > generation)
            .cloned()
    }

    /// Perform the login request. Caller must hold `login_lock`.
    async fn login_locked(&self) -> Result<AccessToken> {
        let url = format!("{}{}", self.api_root, LOGIN_PATH);
        tracing::debug!(%url, client_id = %self.client_id, "POST login");

        let mut req = self.http.post(&url).headers(self.headers.clone()).form(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ]);
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }
        let resp = req.send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            tracing::warn!(%status, "login failed");
            return Err(LookerError::Authentication {
                status: Some(status),
                message: ApiErrorBody::message_from(&body),
            });
        }

        let parsed: AccessTokenResponse = serde_json::from_str(&body).map_err(|e| LookerError::Authentication {
            status: Some(status),
            message: format!("malformed login response: {e}"),
        })?;

        let lifetime = parsed.expires_in.map(chrono::Duration::seconds);
        let token = AccessToken {
            value: parsed.access_token,
            expires_at: lifetime.map(|l| Utc::now() + l),
            leeway: lifetime.map_or_else(leeway, |l| leeway().min(l / 2)),
            generation: self.logins.load(Ordering::SeqCst) + 1,
        };
        let generation = token.generation;
        *self.token.write().await = Some(token.clone());
        self.logins.store(generation, Ordering::SeqCst);
        tracing::debug!(generation, expires_at = ?token.expires_at, "logged in");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: Option<DateTime<Utc>>) -> AccessToken {
        AccessToken {
            value: "abc".into(),
            expires_at,
            leeway: leeway(),
            generation: 1,
        }
    }

    #[test]
    fn validity_respects_leeway() {
        let now = Utc::now();
        assert!(token(None).is_valid_at(now));
        assert!(token(Some(now + chrono::Duration::seconds(3600))).is_valid_at(now));
        assert!(!token(Some(now + chrono::Duration::seconds(5))).is_valid_at(now));
        assert!(!token(Some(now - chrono::Duration::seconds(1))).is_valid_at(now));
    }

    #[test]
    fn short_lived_token_gets_a_smaller_leeway() {
        let now = Utc::now();
        let t = AccessToken {
            value: "abc".into(),
            expires_at: Some(now + chrono::Duration::seconds(5)),
            leeway: leeway().min(chrono::Duration::seconds(5) / 2),
            generation: 1,
        };
        assert!(t.is_valid_at(now));
        assert!(!t.is_valid_at(now + chrono::Duration::seconds(3)));
    }

    #[test]
    fn debug_hides_token_value() {
        let t = token(None);
        assert!(!format!("{t:?}").contains("abc"));
        assert_eq!(t.bearer(), "Bearer abc");
    }
}
