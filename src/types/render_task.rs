#![allow(missing_docs)]
//! Render task types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::enums::RenderTaskStatus;

/// An asynchronous render of a look, query, or dashboard to an image or PDF.
///
/// Returned by `POST /render_tasks/looks/{look_id}/{result_format}` and
/// `GET /render_tasks/{render_task_id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderTask {
    pub id: String,
    pub status: RenderTaskStatus,
    #[serde(default)]
    pub status_detail: Option<String>,
    #[serde(default)]
    pub result_format: Option<String>,
    #[serde(default)]
    pub width: Option<i64>,
    #[serde(default)]
    pub height: Option<i64>,
    #[serde(default)]
    pub look_id: Option<String>,
    #[serde(default)]
    pub dashboard_id: Option<String>,
    #[serde(default)]
    pub query_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finalized_at: Option<DateTime<Utc>>,
    /// Seconds spent rendering.
    #[serde(default)]
    pub runtime: Option<f64>,
}
