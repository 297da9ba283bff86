//! # looker-rs
//!
//! A Rust client library for the [Looker REST API 4.0](https://cloud.google.com/looker/docs/reference/looker-api/latest).
//!
//! Every endpoint method builds a [`RequestDescriptor`](request::RequestDescriptor)
//! and hands it to one authenticated, streaming dispatcher
//! ([`LookerClient::invoke`]). The dispatcher logs in with API3 credentials,
//! refreshes the token once when the server rejects it, and streams the
//! response body into whatever the caller asked for: a typed JSON value, text,
//! bytes, or the live [`ByteStream`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use looker_rs::{Json, LookerClient, LookerConfig};
//! use looker_rs::types::user::{RequestAllUsers, User};
//!
//! #[tokio::main]
//! async fn main() -> looker_rs::Result<()> {
//!     let client = LookerClient::new(LookerConfig::from_env()?)?;
//!     let Json(users): Json<Vec<User>> = client
//!         .all_users(&RequestAllUsers { fields: Some("id,email".into()), ..Default::default() }, None)
//!         .await?;
//!     println!("{} users", users.len());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod constants;
pub mod encode;
pub mod error;
pub mod request;
pub mod settings;
pub mod stream;
pub mod types;

/// Re-export the main client type at crate root for convenience.
pub use client::LookerClient;
pub use config::LookerConfig;
/// Re-export the error type and Result alias.
pub use error::{LookerError, Result};
pub use settings::{ResponseEncoding, TransportSettings};
pub use stream::{ByteStream, FromByteStream, Json};
