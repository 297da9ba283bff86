#![allow(missing_docs)]
//! Query types and the options shared by every `run_*` endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A saved query definition.
///
/// Queries are immutable: once created, a query id always describes the same
/// model, view, fields and filters.
///
/// Returned by `POST /queries` and `GET /queries/{query_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Query {
    pub id: Option<String>,
    pub model: String,
    pub view: String,
    pub fields: Vec<String>,
    pub pivots: Vec<String>,
    pub filters: BTreeMap<String, String>,
    pub filter_expression: Option<String>,
    pub sorts: Vec<String>,
    /// Row limit, as a string (Looker accepts `"-1"` for unlimited).
    pub limit: Option<String>,
    pub column_limit: Option<String>,
    pub total: Option<bool>,
    pub row_total: Option<String>,
    pub vis_config: Option<serde_json::Value>,
    pub client_id: Option<String>,
    pub slug: Option<String>,
    pub share_url: Option<String>,
    pub url: Option<String>,
}

/// Request body for `POST /queries` and `POST /queries/run/{result_format}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteQuery {
    pub model: String,
    pub view: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pivots: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vis_config: Option<serde_json::Value>,
}

impl WriteQuery {
    /// A query over `view` in `model` selecting `fields`.
    pub fn new(model: impl Into<String>, view: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            model: model.into(),
            view: view.into(),
            fields: fields.iter().map(|f| (*f).to_owned()).collect(),
            ..Self::default()
        }
    }

    /// Add a filter, e.g. `("orders.created_date", "7 days")`.
    pub fn filter(mut self, field: impl Into<String>, expression: impl Into<String>) -> Self {
        self.filters.insert(field.into(), expression.into());
        self
    }

    /// Set the row limit.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit.to_string());
        self
    }
}

// ---------------------------------------------------------------------------
// Run options
// ---------------------------------------------------------------------------

/// Query-string options accepted by `run_look`, `run_query` and
/// `run_inline_query`.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Row limit override.
    pub limit: Option<i64>,
    /// Apply model-specified formatting to each result.
    pub apply_formatting: Option<bool>,
    /// Apply visualization options to results.
    pub apply_vis: Option<bool>,
    /// Get results from cache if available.
    pub cache: Option<bool>,
    /// Render width for image formats.
    pub image_width: Option<i64>,
    /// Render height for image formats.
    pub image_height: Option<i64>,
    /// Generate drill links (only for json_detail).
    pub generate_drill_links: Option<bool>,
    /// Force use of production models even in dev mode.
    pub force_production: Option<bool>,
    /// Retrieve results only from cache; never run the query.
    pub cache_only: Option<bool>,
    /// Prefix for generated drill links (url encoded).
    pub path_prefix: Option<String>,
    /// Rebuild PDTs used in the query.
    pub rebuild_pdts: Option<bool>,
    /// Perform table calculations on query results.
    pub server_table_calcs: Option<bool>,
}
