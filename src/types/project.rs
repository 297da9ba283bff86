#![allow(missing_docs)]
//! Project and workspace types.

use serde::Deserialize;

/// A LookML project.
///
/// Returned by `GET /projects` and `GET /projects/{project_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: Option<String>,
    pub name: Option<String>,
    pub uses_git: Option<bool>,
    pub git_remote_url: Option<String>,
    pub git_production_branch_name: Option<String>,
    pub pull_request_mode: Option<String>,
    pub validation_required: Option<bool>,
    pub is_example: Option<bool>,
}

/// A named view of project file versions.
///
/// Returned by `GET /workspaces` and `GET /workspaces/{workspace_id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Workspace {
    /// `"production"` or `"dev"`.
    pub id: Option<String>,
    pub projects: Vec<Project>,
}
