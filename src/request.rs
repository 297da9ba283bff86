//! Request descriptors and the operation table they are built from.
//!
//! Every endpoint method turns its typed arguments into a
//! [`RequestDescriptor`] (`{method, path, query, body}`) through a
//! [`RequestBuilder`], usually starting from the endpoint's
//! [`Operation`] constant. The descriptor is immutable once built and holds
//! nothing connection- or auth-specific, so it can be compared in tests and
//! re-sent on an authentication retry.

use std::fmt;

use bytes::Bytes;
use serde::Serialize;
use strum::{Display, EnumString};
use url::Url;

use crate::encode::{QueryValue, encode_path_segment};
use crate::error::{LookerError, Result};

// ---------------------------------------------------------------------------
// HttpMethod
// ---------------------------------------------------------------------------

/// HTTP methods used by the Looker REST API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// A request body, serialized once when the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    /// Serialized JSON document.
    Json(Bytes),
    /// Plain text (sent as `text/plain`).
    Text(String),
    /// Raw bytes (sent as `application/octet-stream`).
    Binary(Bytes),
}

impl Body {
    /// Serialize a value as a JSON body.
    pub fn json<B: Serialize + ?Sized>(value: &B) -> Result<Self> {
        serde_json::to_vec(value)
            .map(|v| Self::Json(Bytes::from(v)))
            .map_err(|e| LookerError::Encoding(format!("request body: {e}")))
    }

    /// The `Content-Type` this body is sent with.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => "application/json",
            Self::Text(_) => "text/plain; charset=utf-8",
            Self::Binary(_) => "application/octet-stream",
        }
    }

    /// The body bytes. Cheap: shares the underlying buffer.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Self::Json(b) | Self::Binary(b) => b.clone(),
            Self::Text(s) => Bytes::from(s.clone()),
        }
    }

    /// Parse a JSON body back into a value (mostly useful in tests).
    pub fn as_json(&self) -> Option<serde_json::Value> {
        match self {
            Self::Json(b) => serde_json::from_slice(b).ok(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// RequestDescriptor
// ---------------------------------------------------------------------------

/// A fully assembled request, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Body>,
}

impl RequestDescriptor {
    /// The HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The path relative to the API root, path parameters already escaped.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Query parameters in the order they were added. Absent values never
    /// appear here.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Render the absolute URL for this request under `api_root`.
    pub fn url(&self, api_root: &str) -> Result<Url> {
        let root = api_root.trim_end_matches('/');
        let mut url = if self.path.starts_with('/') {
            Url::parse(&format!("{root}{}", self.path))?
        } else {
            Url::parse(&format!("{root}/{}", self.path))?
        };
        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

// ---------------------------------------------------------------------------
// RequestBuilder
// ---------------------------------------------------------------------------

/// Builder for a [`RequestDescriptor`].
///
/// ```
/// use looker_rs::request::{HttpMethod, RequestBuilder};
///
/// # fn main() -> looker_rs::Result<()> {
/// let req = RequestBuilder::new(HttpMethod::Get, "/users")
///     .query("fields", "id,email")?
///     .query("per_page", Some(10))?
///     .query("page", None::<i64>)?
///     .build();
/// assert_eq!(req.query().len(), 2);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Body>,
}

impl RequestBuilder {
    /// Start a request for an already-encoded path.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Append a query parameter. Absent values are skipped.
    pub fn query(mut self, name: &str, value: impl QueryValue) -> Result<Self> {
        if let Some(text) = value.encode_query()? {
            self.query.push((name.to_owned(), text));
        }
        Ok(self)
    }

    /// Set a JSON body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(Body::json(body)?);
        Ok(self)
    }

    /// Set a plain-text body.
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(Body::Text(body.into()));
        self
    }

    /// Set a binary body.
    pub fn binary(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(Body::Binary(body.into()));
        self
    }

    /// Finish the descriptor.
    pub fn build(self) -> RequestDescriptor {
        RequestDescriptor {
            method: self.method,
            path: self.path,
            query: self.query,
            body: self.body,
        }
    }
}

// ---------------------------------------------------------------------------
// Operation
// ---------------------------------------------------------------------------

/// Static description of one REST endpoint: its id, method, and path
/// template with `{name}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// Operation id, matching the endpoint method's name.
    pub id: &'static str,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template relative to the API root, e.g. `/users/{user_id}`.
    pub path_template: &'static str,
}

impl Operation {
    pub const fn new(id: &'static str, method: HttpMethod, path_template: &'static str) -> Self {
        Self {
            id,
            method,
            path_template,
        }
    }

    /// Start a request for this operation, substituting each `{name}` in the
    /// path template with the escaped value from `params`.
    ///
    /// A placeholder without a value, or a value without a placeholder, is a
    /// programming error and fails with [`LookerError::Encoding`].
    pub fn request(&self, params: &[(&str, &dyn fmt::Display)]) -> Result<RequestBuilder> {
        let template = self.path_template;
        let mut path = String::with_capacity(template.len() + 16);
        let mut used = vec![false; params.len()];
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            path.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or_else(|| {
                LookerError::Encoding(format!("{}: unterminated placeholder in {template}", self.id))
            })?;
            let name = &after[..close];
            let index = params.iter().position(|(n, _)| *n == name).ok_or_else(|| {
                LookerError::Encoding(format!("{}: missing path parameter `{name}`", self.id))
            })?;
            used[index] = true;
            path.push_str(&encode_path_segment(params[index].1)?);
            rest = &after[close + 1..];
        }
        path.push_str(rest);

        if let Some(i) = used.iter().position(|u| !u) {
            return Err(LookerError::Encoding(format!(
                "{}: unknown path parameter `{}`",
                self.id, params[i].0
            )));
        }

        Ok(RequestBuilder::new(self.method, path))
    }
}
