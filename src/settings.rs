//! Per-call transport settings.
//!
//! A [`TransportSettings`] value is built for one call, merged over the
//! client's defaults with [`TransportSettings::merged_over`], and dropped when
//! the call finishes.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tokio_util::sync::CancellationToken;

use crate::error::{LookerError, Result};

/// How a text consumer should decode the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseEncoding {
    /// Strict UTF-8.
    #[default]
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    /// Binary payload; refuse to decode as text.
    Binary,
}

/// Options for a single call. Unset options fall back to the client's
/// defaults.
#[derive(Debug, Clone, Default)]
pub struct TransportSettings {
    /// Whole-request timeout, including reading the body.
    pub timeout: Option<Duration>,
    /// Extra headers. These replace same-named default headers.
    pub headers: HeaderMap,
    /// Proxy URL for this call.
    pub proxy: Option<String>,
    /// Whether to verify the server's TLS certificate for this call.
    pub verify_ssl: Option<bool>,
    /// Decoding hint for text consumers.
    pub encoding: Option<ResponseEncoding>,
    /// Cooperative cancellation for the in-flight request and its body.
    pub cancel: Option<CancellationToken>,
}

impl TransportSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a header, replacing any previous value of the same name.
    ///
    /// Fails with [`LookerError::Encoding`] if the name or value is not a
    /// valid header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::try_from(name)
            .map_err(|e| LookerError::Encoding(format!("invalid header name {name:?}: {e}")))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| LookerError::Encoding(format!("invalid value for header {name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Route this call through a proxy.
    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Enable or disable TLS verification for this call.
    pub fn verify_ssl(mut self, verify: bool) -> Self {
        self.verify_ssl = Some(verify);
        self
    }

    /// Set the decoding hint for text consumers.
    pub fn encoding(mut self, encoding: ResponseEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Attach a cancellation token.
    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Overlay these settings on `defaults`: every option set here wins,
    /// headers are unioned with ours replacing same-named defaults.
    pub fn merged_over(&self, defaults: &TransportSettings) -> TransportSettings {
        let mut headers = defaults.headers.clone();
        for name in self.headers.keys() {
            headers.remove(name);
            for value in self.headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        TransportSettings {
            timeout: self.timeout.or(defaults.timeout),
            headers,
            proxy: self.proxy.clone().or_else(|| defaults.proxy.clone()),
            verify_ssl: self.verify_ssl.or(defaults.verify_ssl),
            encoding: self.encoding.or(defaults.encoding),
            cancel: self.cancel.clone().or_else(|| defaults.cancel.clone()),
        }
    }

    /// Whether these settings need a connection different from the one the
    /// client was built with.
    pub(crate) fn overrides_connection(&self, defaults: &TransportSettings) -> bool {
        self.proxy != defaults.proxy || self.verify_ssl.unwrap_or(true) != defaults.verify_ssl.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_values_win_and_unset_fall_back() {
        let defaults = TransportSettings::new()
            .timeout(Duration::from_secs(120))
            .header("x-looker-appid", "reports")
            .unwrap()
            .header("accept", "application/json")
            .unwrap()
            .verify_ssl(true);
        let call = TransportSettings::new()
            .header("accept", "image/png")
            .unwrap()
            .encoding(ResponseEncoding::Binary);

        let merged = call.merged_over(&defaults);
        assert_eq!(merged.timeout, Some(Duration::from_secs(120)));
        assert_eq!(merged.headers["accept"], "image/png");
        assert_eq!(merged.headers["x-looker-appid"], "reports");
        assert_eq!(merged.headers.get_all("accept").iter().count(), 1);
        assert_eq!(merged.encoding, Some(ResponseEncoding::Binary));
        assert_eq!(merged.verify_ssl, Some(true));
        assert!(merged.cancel.is_none());
    }

    #[test]
    fn merging_does_not_touch_inputs() {
        let defaults = TransportSettings::new().timeout(Duration::from_secs(5));
        let call = TransportSettings::new().timeout(Duration::from_secs(1));
        let merged = call.merged_over(&defaults);
        assert_eq!(merged.timeout, Some(Duration::from_secs(1)));
        assert_eq!(defaults.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn connection_overrides() {
        let defaults = TransportSettings::new().verify_ssl(true);
        assert!(!TransportSettings::new().merged_over(&defaults).overrides_connection(&defaults));
        let merged = TransportSettings::new().verify_ssl(false).merged_over(&defaults);
        assert!(merged.overrides_connection(&defaults));
        let merged = TransportSettings::new().proxy("http://proxy:3128").merged_over(&defaults);
        assert!(merged.overrides_connection(&defaults));
    }

    #[test]
    fn header_replaces_previous_value() {
        let settings = TransportSettings::new()
            .header("x-trace", "first")
            .unwrap()
            .header("x-trace", "second")
            .unwrap();
        assert_eq!(settings.headers.get_all("x-trace").iter().count(), 1);
        assert_eq!(settings.headers["x-trace"], "second");
    }

    #[test]
    fn invalid_header_is_rejected() {
        let err = TransportSettings::new().header("bad header", "x").unwrap_err();
        assert!(matches!(err, LookerError::Encoding(_)));
    }
}
