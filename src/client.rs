//! Core client and authenticated streaming dispatcher for the Looker REST API.
//!
//! The [`LookerClient`] struct is the main entry point. Every endpoint method
//! in [`crate::api`] builds a [`RequestDescriptor`] and hands it to
//! [`LookerClient::invoke`], which authenticates, sends the request, and
//! feeds the response body to a consumer chosen by the caller.
//!
//! Endpoint methods are added to `LookerClient` via `impl` blocks in the
//! [`crate::api`] module.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;

use crate::auth::{AccessToken, AuthSession};
use crate::config::LookerConfig;
use crate::constants::{AGENT_TAG_HEADER, USER_AGENT};
use crate::error::{ApiErrorBody, BoxError, LookerError, Result};
use crate::request::RequestDescriptor;
use crate::settings::TransportSettings;
use crate::stream::{ByteStream, FromByteStream};

/// Authentication progress of a single dispatched call. A rejection while
/// in `TokenExpiredRetry` is terminal.
#[derive(Debug)]
enum AuthState {
    /// No token obtained for this call yet.
    Unauthenticated,
    /// The server rejected this token once; refresh and retry.
    TokenExpiredRetry(AccessToken),
}

/// Client for the Looker REST API.
///
/// Cheap to clone: clones share the connection pool and the
/// [`AuthSession`], so they also share its token.
///
/// # Example
///
/// ```no_run
/// use looker_rs::{Json, LookerClient, LookerConfig};
/// use looker_rs::types::user::User;
///
/// # #[tokio::main]
/// # async fn main() -> looker_rs::Result<()> {
/// let config = LookerConfig::new("https://example.looker.com:19999", "client-id", "client-secret");
/// let client = LookerClient::new(config)?;
/// let me: Json<User> = client.me(Some("id,email"), None).await?;
/// println!("{:?}", me.email);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LookerClient {
    http: reqwest::Client,
    api_root: String,
    defaults: TransportSettings,
    session: Arc<AuthSession>,
}

impl fmt::Debug for LookerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookerClient")
            .field("api_root", &self.api_root)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl LookerClient {
    /// Create a client from a [`LookerConfig`].
    pub fn new(config: LookerConfig) -> Result<Self> {
        let mut defaults = TransportSettings::new()
            .timeout(config.timeout)
            .verify_ssl(config.verify_ssl);
        if let Some(tag) = &config.agent_tag {
            defaults = defaults.header(AGENT_TAG_HEADER, tag)?;
        }
        if let Some(proxy) = &config.proxy {
            defaults = defaults.proxy(proxy.clone());
        }

        let http = Self::build_http(&defaults)?;
        let api_root = config.api_root();
        let session = AuthSession::new(
            http.clone(),
            api_root.clone(),
            config.client_id,
            config.client_secret,
        )
        .with_timeout(config.timeout)
        .with_headers(defaults.headers.clone());

        Ok(Self {
            http,
            api_root,
            defaults,
            session: Arc::new(session),
        })
    }

    /// Create a client from `LOOKERSDK_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::new(LookerConfig::from_env()?)
    }

    /// The API root endpoint paths are appended to.
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// The shared authentication session.
    pub fn auth(&self) -> &AuthSession {
        &self.session
    }

    /// Settings every call starts from.
    pub fn default_settings(&self) -> &TransportSettings {
        &self.defaults
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Dispatch a request and build `T` from the response body.
    ///
    /// ```no_run
    /// # use looker_rs::{Json, LookerClient, LookerConfig};
    /// # use looker_rs::request::{HttpMethod, RequestBuilder};
    /// # #[tokio::main]
    /// # async fn main() -> looker_rs::Result<()> {
    /// # let client = LookerClient::new(LookerConfig::new("https://x", "id", "secret"))?;
    /// let req = RequestBuilder::new(HttpMethod::Get, "/versions").build();
    /// let versions: Json<serde_json::Value> = client.invoke(&req, None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn invoke<T: FromByteStream>(
        &self,
        request: &RequestDescriptor,
        settings: Option<&TransportSettings>,
    ) -> Result<T> {
        self.dispatch(request, settings, T::from_byte_stream).await
    }

    /// Dispatch a request and hand the response body to `consumer`.
    ///
    /// The consumer's error is returned as [`LookerError::Consumer`] and is
    /// never retried.
    pub async fn invoke_with<T, E, F, Fut>(
        &self,
        request: &RequestDescriptor,
        settings: Option<&TransportSettings>,
        consumer: F,
    ) -> Result<T>
    where
        F: FnOnce(ByteStream) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<BoxError>,
    {
        self.dispatch(request, settings, |stream| async move {
            consumer(stream).await.map_err(|e| LookerError::Consumer(e.into()))
        })
        .await
    }

    async fn dispatch<T, F, Fut>(
        &self,
        request: &RequestDescriptor,
        settings: Option<&TransportSettings>,
        consume: F,
    ) -> Result<T>
    where
        F: FnOnce(ByteStream) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let settings = match settings {
            Some(s) => s.merged_over(&self.defaults),
            None => self.defaults.clone(),
        };
        let cancel = settings.cancel.clone();

        let work = async {
            let resp = self.send_authenticated(request, &settings).await?;
            let stream = ByteStream::from_response(
                resp,
                settings.encoding.unwrap_or_default(),
                cancel.clone(),
            );
            consume(stream).await
        };

        match &cancel {
            Some(token) => run_cancellable(token, work).await,
            None => work.await,
        }
    }

    /// Send `request`, refreshing the token and retrying once on a 401.
    /// Returns the response once it has a success status.
    async fn send_authenticated(
        &self,
        request: &RequestDescriptor,
        settings: &TransportSettings,
    ) -> Result<reqwest::Response> {
        let http = if settings.overrides_connection(&self.defaults) {
            Self::build_http(settings)?
        } else {
            self.http.clone()
        };
        let url = request.url(&self.api_root)?;

        let mut state = AuthState::Unauthenticated;
        loop {
            let (token, retrying) = match state {
                AuthState::Unauthenticated => (self.session.token().await?, false),
                AuthState::TokenExpiredRetry(stale) => (self.session.refresh_rejected(&stale).await?, true),
            };

            tracing::debug!(method = %request.method(), %url, retrying, "request");
            let mut builder = http
                .request(request.method().into(), url.clone())
                .headers(settings.headers.clone())
                .header(header::AUTHORIZATION, token.bearer());
            if let Some(timeout) = settings.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(body) = request.body() {
                builder = builder
                    .header(header::CONTENT_TYPE, body.content_type())
                    .body(body.to_bytes());
            }

            let resp = builder.send().await?;
            let status = resp.status();
            if status.is_success() {
                return Ok(resp);
            }

            let body = resp.text().await.unwrap_or_default();
            if status == StatusCode::UNAUTHORIZED {
                if !retrying {
                    tracing::warn!(%url, "401 Unauthorized, refreshing token and retrying once");
                    state = AuthState::TokenExpiredRetry(token);
                    continue;
                }
                tracing::warn!(%url, "401 Unauthorized after token refresh");
                return Err(LookerError::Authentication {
                    status: Some(status),
                    message: ApiErrorBody::message_from(&body),
                });
            }
            return Err(LookerError::from_response(status, body));
        }
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Build a `reqwest::Client` for the connection-level parts of `settings`.
    fn build_http(settings: &TransportSettings) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .default_headers(Self::default_headers())
            .danger_accept_invalid_certs(!settings.verify_ssl.unwrap_or(true));
        if let Some(proxy) = &settings.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| LookerError::Config(format!("invalid proxy {proxy:?}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        builder
            .build()
            .map_err(|e| LookerError::Config(format!("failed to build HTTP client: {e}")))
    }

    /// Default headers applied to every request.
    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        headers
    }
}

/// Run `work` unless `token` fires first. Dropping `work` closes any
/// in-flight request and response body.
async fn run_cancellable<T>(token: &CancellationToken, work: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!("request cancelled");
            Err(LookerError::Cancelled)
        }
        result = work => result,
    }
}
