//! Render task endpoints.
//!
//! Rendering is asynchronous: create a task, poll [`LookerClient::render_task`]
//! until its status is finished, then download the output with
//! [`LookerClient::render_task_results`].

use crate::api::with_encoding_hint;
use crate::client::LookerClient;
use crate::error::Result;
use crate::request::{HttpMethod, Operation, RequestDescriptor};
use crate::settings::{ResponseEncoding, TransportSettings};
use crate::stream::FromByteStream;
use crate::types::RenderFormat;

pub const CREATE_LOOK_RENDER_TASK: Operation = Operation::new(
    "create_look_render_task",
    HttpMethod::Post,
    "/render_tasks/looks/{look_id}/{result_format}",
);
pub const RENDER_TASK: Operation = Operation::new("render_task", HttpMethod::Get, "/render_tasks/{render_task_id}");
pub const RENDER_TASK_RESULTS: Operation = Operation::new(
    "render_task_results",
    HttpMethod::Get,
    "/render_tasks/{render_task_id}/results",
);

pub fn create_look_render_task_request(
    look_id: &str,
    result_format: RenderFormat,
    width: i64,
    height: i64,
    fields: Option<&str>,
) -> Result<RequestDescriptor> {
    Ok(CREATE_LOOK_RENDER_TASK
        .request(&[("look_id", &look_id), ("result_format", &result_format)])?
        .query("width", width)?
        .query("height", height)?
        .query("fields", fields)?
        .build())
}

pub fn render_task_request(render_task_id: &str, fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(RENDER_TASK
        .request(&[("render_task_id", &render_task_id)])?
        .query("fields", fields)?
        .build())
}

pub fn render_task_results_request(render_task_id: &str) -> Result<RequestDescriptor> {
    Ok(RENDER_TASK_RESULTS
        .request(&[("render_task_id", &render_task_id)])?
        .build())
}

impl LookerClient {
    /// Start rendering a look to an image or PDF of `width` x `height` pixels.
    ///
    /// **Endpoint:** `POST /render_tasks/looks/{look_id}/{result_format}`
    pub async fn create_look_render_task<R: FromByteStream>(
        &self,
        look_id: &str,
        result_format: RenderFormat,
        width: i64,
        height: i64,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        let req = create_look_render_task_request(look_id, result_format, width, height, fields)?;
        self.invoke(&req, settings).await
    }

    /// Get the current state of a render task.
    ///
    /// **Endpoint:** `GET /render_tasks/{render_task_id}`
    pub async fn render_task<R: FromByteStream>(
        &self,
        render_task_id: &str,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&render_task_request(render_task_id, fields)?, settings).await
    }

    /// Download a finished render. The body is binary.
    ///
    /// Looker answers `202 Accepted` with an empty body while the task is
    /// still running.
    ///
    /// **Endpoint:** `GET /render_tasks/{render_task_id}/results`
    pub async fn render_task_results<R: FromByteStream>(
        &self,
        render_task_id: &str,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        let settings = with_encoding_hint(settings, ResponseEncoding::Binary);
        self.invoke(&render_task_results_request(render_task_id)?, Some(&settings))
            .await
    }
}
