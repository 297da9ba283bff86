//! REST API endpoint implementations.
//!
//! Each sub-module adds high-level `async` methods to
//! [`LookerClient`](crate::client::LookerClient) via `impl` blocks. Every
//! method has a matching `*_request` function that builds the
//! [`RequestDescriptor`](crate::request::RequestDescriptor) without doing any
//! I/O, and an [`Operation`](crate::request::Operation) constant naming the
//! endpoint.
//!
//! Methods are generic over the result type, which picks how the response
//! body is read (see [`crate::stream`]):
//!
//! ```no_run
//! use looker_rs::{ByteStream, Json, LookerClient};
//! use looker_rs::types::look::Look;
//! use looker_rs::types::query::RunOptions;
//! use looker_rs::types::ResultFormat;
//!
//! # #[tokio::main]
//! # async fn main() -> looker_rs::Result<()> {
//! let client = LookerClient::from_env()?;
//! let looks: Json<Vec<Look>> = client.all_looks(Some("id,title"), None).await?;
//! let csv: String = client.run_look("7", ResultFormat::Csv, &RunOptions::default(), None).await?;
//! let png: ByteStream = client.run_look("7", ResultFormat::Png, &RunOptions::default(), None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! | Module | Endpoints | Description |
//! |---|---|---|
//! | [`session`] | 3 | API session, workspace switching, logout |
//! | [`users`] | 7 | Current user, user CRUD and search |
//! | [`looks`] | 4 | Saved looks, running them |
//! | [`queries`] | 4 | Query creation and running |
//! | [`dashboards`] | 3 | Dashboard listing and search |
//! | [`projects`] | 4 | LookML projects and workspaces |
//! | [`render_tasks`] | 3 | Image/PDF rendering |

pub mod dashboards;
pub mod looks;
pub mod projects;
pub mod queries;
pub mod render_tasks;
pub mod session;
pub mod users;

use crate::settings::{ResponseEncoding, TransportSettings};

/// Settings for an endpoint whose body is naturally decoded as `encoding`.
/// A hint the caller already set is kept.
pub(crate) fn with_encoding_hint(
    settings: Option<&TransportSettings>,
    encoding: ResponseEncoding,
) -> TransportSettings {
    let mut settings = settings.cloned().unwrap_or_default();
    if settings.encoding.is_none() {
        settings.encoding = Some(encoding);
    }
    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_encoding_wins_over_hint() {
        let hinted = with_encoding_hint(None, ResponseEncoding::Binary);
        assert_eq!(hinted.encoding, Some(ResponseEncoding::Binary));

        let caller = TransportSettings::new().encoding(ResponseEncoding::Latin1);
        let hinted = with_encoding_hint(Some(&caller), ResponseEncoding::Binary);
        assert_eq!(hinted.encoding, Some(ResponseEncoding::Latin1));
    }
}
