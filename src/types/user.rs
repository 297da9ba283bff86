#![allow(missing_docs)]
//! User types and list/search request parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::encode::DelimArray;

// ---------------------------------------------------------------------------
// User
// ---------------------------------------------------------------------------

/// A Looker user.
///
/// Returned by `GET /user`, `GET /users`, `GET /users/{user_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub display_name: Option<String>,
    pub email: Option<String>,
    pub is_disabled: Option<bool>,
    pub locale: Option<String>,
    pub home_folder_id: Option<String>,
    pub personal_folder_id: Option<String>,
    pub role_ids: Vec<String>,
    pub group_ids: Vec<String>,
    pub verified_looker_employee: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

/// Request body for creating or updating a user.
///
/// Used by `POST /users` and `PATCH /users/{user_id}`. Unset fields are not
/// sent, so a `PATCH` leaves them unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_folder_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Request parameters
// ---------------------------------------------------------------------------

/// Query parameters for `GET /users`.
#[derive(Debug, Clone, Default)]
pub struct RequestAllUsers {
    /// Comma-separated list of fields to return.
    pub fields: Option<String>,
    /// Deprecated by Looker in favour of `offset`; still honoured.
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Fields to sort by, e.g. `"last_name desc"`.
    pub sorts: Option<String>,
    /// Only return users with these ids.
    pub ids: Option<DelimArray<String>>,
}

/// Query parameters for `GET /users/search`.
///
/// String filters accept Looker filter expressions, e.g. `"%smith"`.
#[derive(Debug, Clone, Default)]
pub struct RequestSearchUsers {
    pub fields: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub sorts: Option<String>,
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_disabled: Option<bool>,
    pub group_id: Option<String>,
    /// Combine the filters with OR instead of AND.
    pub filter_or: Option<bool>,
}
