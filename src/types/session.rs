#![allow(missing_docs)]
//! Session types: active workspace and sudo state.

use serde::{Deserialize, Serialize};

/// Workspace id of the production (deployed) project files.
pub const PRODUCTION_WORKSPACE: &str = "production";

/// Workspace id of the caller's development-mode project files.
pub const DEV_WORKSPACE: &str = "dev";

// ---------------------------------------------------------------------------
// API Session
// ---------------------------------------------------------------------------

/// The caller's API session.
///
/// Returned by `GET /session` and `PATCH /session`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSession {
    #[serde(default)]
    pub workspace_id: Option<String>,
    #[serde(default)]
    pub sudo_user_id: Option<String>,
    #[serde(default)]
    pub can: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Request body for `PATCH /session`.
#[derive(Debug, Clone, Serialize)]
pub struct WriteApiSession {
    /// `"production"` or `"dev"`.
    pub workspace_id: String,
}

impl WriteApiSession {
    /// Switch the session to the production workspace.
    pub fn production() -> Self {
        Self {
            workspace_id: PRODUCTION_WORKSPACE.to_owned(),
        }
    }

    /// Switch the session to the caller's dev workspace.
    pub fn dev() -> Self {
        Self {
            workspace_id: DEV_WORKSPACE.to_owned(),
        }
    }
}
