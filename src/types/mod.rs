//! Request and response types for the Looker REST API 4.0.
//!
//! This module contains the strongly-typed structs used for serializing
//! request bodies and query parameters and deserializing responses for the
//! endpoints in [`crate::api`].
//!
//! ## Organization
//!
//! - [`enums`]: Shared enumerations (result formats, render status)
//! - [`session`]: API session and workspace switching
//! - [`user`]: Users, user writes, list/search parameters
//! - [`look`]: Saved looks
//! - [`query`]: Query definitions and run options
//! - [`dashboard`]: Dashboards and search parameters
//! - [`project`]: LookML projects and workspaces
//! - [`render_task`]: Image/PDF render tasks
//!
//! All enums are re-exported at the module root via `pub use enums::*`.
//! Fields are optional wherever the API may omit them (for example when a
//! `fields` parameter restricts the response).

pub mod dashboard;
pub mod enums;
pub mod look;
pub mod project;
pub mod query;
pub mod render_task;
pub mod session;
pub mod user;

pub use enums::*;
