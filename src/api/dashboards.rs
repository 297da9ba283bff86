//! Dashboard endpoints.

use crate::client::LookerClient;
use crate::error::Result;
use crate::request::{HttpMethod, Operation, RequestDescriptor};
use crate::settings::TransportSettings;
use crate::stream::FromByteStream;
use crate::types::dashboard::RequestSearchDashboards;

pub const ALL_DASHBOARDS: Operation = Operation::new("all_dashboards", HttpMethod::Get, "/dashboards");
pub const DASHBOARD: Operation = Operation::new("dashboard", HttpMethod::Get, "/dashboards/{dashboard_id}");
pub const SEARCH_DASHBOARDS: Operation =
    Operation::new("search_dashboards", HttpMethod::Get, "/dashboards/search");

pub fn all_dashboards_request(fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(ALL_DASHBOARDS.request(&[])?.query("fields", fields)?.build())
}

pub fn dashboard_request(dashboard_id: &str, fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(DASHBOARD
        .request(&[("dashboard_id", &dashboard_id)])?
        .query("fields", fields)?
        .build())
}

pub fn search_dashboards_request(req: &RequestSearchDashboards) -> Result<RequestDescriptor> {
    Ok(SEARCH_DASHBOARDS
        .request(&[])?
        .query("id", &req.id)?
        .query("slug", &req.slug)?
        .query("title", &req.title)?
        .query("folder_id", &req.folder_id)?
        .query("user_id", &req.user_id)?
        .query("deleted", req.deleted)?
        .query("fields", &req.fields)?
        .query("page", req.page)?
        .query("per_page", req.per_page)?
        .query("limit", req.limit)?
        .query("offset", req.offset)?
        .query("sorts", &req.sorts)?
        .query("filter_or", req.filter_or)?
        .build())
}

impl LookerClient {
    /// List dashboards (without their elements).
    ///
    /// **Endpoint:** `GET /dashboards`
    pub async fn all_dashboards<R: FromByteStream>(
        &self,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&all_dashboards_request(fields)?, settings).await
    }

    /// Get a dashboard. LookML dashboards use `model::name` ids, which are
    /// escaped like any other path value.
    ///
    /// **Endpoint:** `GET /dashboards/{dashboard_id}`
    pub async fn dashboard<R: FromByteStream>(
        &self,
        dashboard_id: &str,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&dashboard_request(dashboard_id, fields)?, settings).await
    }

    /// Search dashboards.
    ///
    /// **Endpoint:** `GET /dashboards/search`
    pub async fn search_dashboards<R: FromByteStream>(
        &self,
        req: &RequestSearchDashboards,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&search_dashboards_request(req)?, settings).await
    }
}
