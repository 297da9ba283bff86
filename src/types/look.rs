#![allow(missing_docs)]
//! Look types.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::types::query::Query;

/// A saved look: a query plus visualization settings, stored in a folder.
///
/// Returned by `GET /looks` (without `query`) and `GET /looks/{look_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Look {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub query_id: Option<String>,
    pub query: Option<Query>,
    pub folder_id: Option<String>,
    pub user_id: Option<String>,
    pub public: Option<bool>,
    pub deleted: Option<bool>,
    pub view_count: Option<i64>,
    pub favorite_count: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub short_url: Option<String>,
}
