//! Constants for the Looker REST API client.
//!
//! Contains API versioning, environment variable names, timeouts, and
//! header names. These are used internally by
//! [`LookerClient`](crate::client::LookerClient) and
//! [`LookerConfig`](crate::config::LookerConfig), but are also exported for
//! advanced usage.

use std::time::Duration;

// ---------------------------------------------------------------------------
// API
// ---------------------------------------------------------------------------

/// REST API version targeted by the endpoint methods in [`crate::api`].
pub const API_VERSION: &str = "4.0";

/// Path (under the API root) of the client-credentials login endpoint.
pub const LOGIN_PATH: &str = "/login";

/// Path (under the API root) of the logout endpoint.
pub const LOGOUT_PATH: &str = "/logout";

/// Value sent as `User-Agent` on every request.
pub const USER_AGENT: &str = concat!("looker-rs/", env!("CARGO_PKG_VERSION"));

/// Header carrying the optional application identifier.
pub const AGENT_TAG_HEADER: &str = "x-looker-appid";

// ---------------------------------------------------------------------------
// Timeouts & tokens
// ---------------------------------------------------------------------------

/// Default request timeout when neither config nor per-call settings set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// A token is treated as expired this long before the server says it is.
pub const TOKEN_EXPIRY_LEEWAY: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Environment variables
// ---------------------------------------------------------------------------

/// Environment variable names read by
/// [`LookerConfig::from_env`](crate::config::LookerConfig::from_env).
pub mod env {
    /// Looker instance URL, e.g. `https://example.looker.com:19999`.
    pub const BASE_URL: &str = "LOOKERSDK_BASE_URL";
    /// API version override (defaults to [`API_VERSION`](super::API_VERSION)).
    pub const API_VERSION: &str = "LOOKERSDK_API_VERSION";
    /// API3 client id.
    pub const CLIENT_ID: &str = "LOOKERSDK_CLIENT_ID";
    /// API3 client secret.
    pub const CLIENT_SECRET: &str = "LOOKERSDK_CLIENT_SECRET";
    /// `true`/`false`; whether to verify the server's TLS certificate.
    pub const VERIFY_SSL: &str = "LOOKERSDK_VERIFY_SSL";
    /// Request timeout in seconds.
    pub const TIMEOUT: &str = "LOOKERSDK_TIMEOUT";
    /// Proxy URL for all requests.
    pub const PROXY: &str = "LOOKERSDK_PROXY";
    /// Application identifier sent as `x-looker-appid`.
    pub const AGENT_TAG: &str = "LOOKERSDK_AGENT_TAG";
}
