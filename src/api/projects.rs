//! LookML project and workspace endpoints.

use crate::client::LookerClient;
use crate::error::Result;
use crate::request::{HttpMethod, Operation, RequestDescriptor};
use crate::settings::TransportSettings;
use crate::stream::FromByteStream;

pub const ALL_PROJECTS: Operation = Operation::new("all_projects", HttpMethod::Get, "/projects");
pub const PROJECT: Operation = Operation::new("project", HttpMethod::Get, "/projects/{project_id}");
pub const ALL_WORKSPACES: Operation = Operation::new("all_workspaces", HttpMethod::Get, "/workspaces");
pub const WORKSPACE: Operation = Operation::new("workspace", HttpMethod::Get, "/workspaces/{workspace_id}");

pub fn all_projects_request(fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(ALL_PROJECTS.request(&[])?.query("fields", fields)?.build())
}

pub fn project_request(project_id: &str, fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(PROJECT
        .request(&[("project_id", &project_id)])?
        .query("fields", fields)?
        .build())
}

pub fn all_workspaces_request() -> Result<RequestDescriptor> {
    Ok(ALL_WORKSPACES.request(&[])?.build())
}

pub fn workspace_request(workspace_id: &str) -> Result<RequestDescriptor> {
    Ok(WORKSPACE.request(&[("workspace_id", &workspace_id)])?.build())
}

impl LookerClient {
    /// List LookML projects.
    ///
    /// **Endpoint:** `GET /projects`
    pub async fn all_projects<R: FromByteStream>(
        &self,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&all_projects_request(fields)?, settings).await
    }

    /// Get a LookML project.
    ///
    /// **Endpoint:** `GET /projects/{project_id}`
    pub async fn project<R: FromByteStream>(
        &self,
        project_id: &str,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&project_request(project_id, fields)?, settings).await
    }

    /// **Endpoint:** `GET /workspaces`
    pub async fn all_workspaces<R: FromByteStream>(&self, settings: Option<&TransportSettings>) -> Result<R> {
        self.invoke(&all_workspaces_request()?, settings).await
    }

    /// **Endpoint:** `GET /workspaces/{workspace_id}`
    pub async fn workspace<R: FromByteStream>(
        &self,
        workspace_id: &str,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&workspace_request(workspace_id)?, settings).await
    }
}
