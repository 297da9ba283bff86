//! Client configuration.
//!
//! A [`LookerConfig`] names the Looker instance, the API3 credentials used by
//! the [`AuthSession`](crate::auth::AuthSession), and the connection defaults
//! every call starts from. It can be built directly or read from the
//! `LOOKERSDK_*` environment variables.

use std::time::Duration;

use crate::constants::{self, API_VERSION, DEFAULT_TIMEOUT};
use crate::error::{LookerError, Result};

/// Connection and credential settings for a [`LookerClient`](crate::LookerClient).
#[derive(Clone)]
pub struct LookerConfig {
    /// Instance URL without the `/api/<version>` suffix.
    pub base_url: String,
    /// API version segment, e.g. `4.0`.
    pub api_version: String,
    /// API3 client id.
    pub client_id: String,
    /// API3 client secret.
    pub client_secret: String,
    /// Whether to verify the server's TLS certificate.
    pub verify_ssl: bool,
    /// Default request timeout.
    pub timeout: Duration,
    /// Optional application identifier sent as `x-looker-appid`.
    pub agent_tag: Option<String>,
    /// Optional proxy URL applied to every request.
    pub proxy: Option<String>,
}

impl std::fmt::Debug for LookerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookerConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("verify_ssl", &self.verify_ssl)
            .field("timeout", &self.timeout)
            .field("agent_tag", &self.agent_tag)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl LookerConfig {
    /// Create a config with default version, timeout, and TLS verification.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_version: API_VERSION.to_owned(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            verify_ssl: true,
            timeout: DEFAULT_TIMEOUT,
            agent_tag: None,
            proxy: None,
        }
    }

    /// Read the configuration from `LOOKERSDK_*` environment variables.
    ///
    /// `LOOKERSDK_BASE_URL`, `LOOKERSDK_CLIENT_ID` and
    /// `LOOKERSDK_CLIENT_SECRET` are required.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup, using the same
    /// keys as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let require = |key: &str| get(key).ok_or_else(|| LookerError::Config(format!("{key} is not set")));

        let mut config = Self::new(
            require(constants::env::BASE_URL)?,
            require(constants::env::CLIENT_ID)?,
            require(constants::env::CLIENT_SECRET)?,
        );

        if let Some(version) = get(constants::env::API_VERSION) {
            config.api_version = version;
        }
        if let Some(raw) = get(constants::env::VERIFY_SSL) {
            config.verify_ssl = parse_bool(&raw).ok_or_else(|| {
                LookerError::Config(format!("{}: expected a boolean, got {raw:?}", constants::env::VERIFY_SSL))
            })?;
        }
        if let Some(raw) = get(constants::env::TIMEOUT) {
            let secs: u64 = raw.parse().map_err(|_| {
                LookerError::Config(format!("{}: expected seconds, got {raw:?}", constants::env::TIMEOUT))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        config.proxy = get(constants::env::PROXY);
        config.agent_tag = get(constants::env::AGENT_TAG);

        Ok(config)
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the application identifier sent as `x-looker-appid`.
    pub fn with_agent_tag(mut self, tag: impl Into<String>) -> Self {
        self.agent_tag = Some(tag.into());
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn with_verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// Route every request through a proxy.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// The API root every endpoint path is appended to:
    /// `{base_url}/api/{api_version}`.
    pub fn api_root(&self) -> String {
        format!(
            "{}/api/{}",
            self.base_url.trim_end_matches('/'),
            self.api_version.trim_matches('/')
        )
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "t" => Some(true),
        "false" | "0" | "no" | "n" | "f" => Some(false),
        _ => None,
    }
}
