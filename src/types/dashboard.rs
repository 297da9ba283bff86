#![allow(missing_docs)]
//! Dashboard types and search parameters.

use chrono::{DateTime, Utc};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// A dashboard.
///
/// Returned by `GET /dashboards`, `GET /dashboards/search` and
/// `GET /dashboards/{dashboard_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Dashboard {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub folder_id: Option<String>,
    pub user_id: Option<String>,
    pub hidden: Option<bool>,
    pub deleted: Option<bool>,
    pub readonly: Option<bool>,
    pub refresh_interval: Option<String>,
    pub view_count: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub dashboard_elements: Vec<DashboardElement>,
}

/// A tile on a dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DashboardElement {
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub element_type: Option<String>,
    pub look_id: Option<String>,
    pub query_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Search parameters
// ---------------------------------------------------------------------------

/// Query parameters for `GET /dashboards/search`.
#[derive(Debug, Clone, Default)]
pub struct RequestSearchDashboards {
    pub id: Option<String>,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub folder_id: Option<String>,
    pub user_id: Option<String>,
    pub deleted: Option<bool>,
    pub fields: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sorts: Option<String>,
    pub filter_or: Option<bool>,
}
