//! Look endpoints.

use crate::api::queries::run_options;
use crate::api::with_encoding_hint;
use crate::client::LookerClient;
use crate::error::Result;
use crate::request::{HttpMethod, Operation, RequestDescriptor};
use crate::settings::TransportSettings;
use crate::stream::FromByteStream;
use crate::types::ResultFormat;
use crate::types::query::RunOptions;

pub const ALL_LOOKS: Operation = Operation::new("all_looks", HttpMethod::Get, "/looks");
pub const LOOK: Operation = Operation::new("look", HttpMethod::Get, "/looks/{look_id}");
pub const RUN_LOOK: Operation = Operation::new("run_look", HttpMethod::Get, "/looks/{look_id}/run/{result_format}");
pub const DELETE_LOOK: Operation = Operation::new("delete_look", HttpMethod::Delete, "/looks/{look_id}");

pub fn all_looks_request(fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(ALL_LOOKS.request(&[])?.query("fields", fields)?.build())
}

pub fn look_request(look_id: &str, fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(LOOK
        .request(&[("look_id", &look_id)])?
        .query("fields", fields)?
        .build())
}

pub fn run_look_request(look_id: &str, result_format: ResultFormat, options: &RunOptions) -> Result<RequestDescriptor> {
    let builder = RUN_LOOK.request(&[("look_id", &look_id), ("result_format", &result_format)])?;
    Ok(run_options(builder, options)?.build())
}

pub fn delete_look_request(look_id: &str) -> Result<RequestDescriptor> {
    Ok(DELETE_LOOK.request(&[("look_id", &look_id)])?.build())
}

impl LookerClient {
    /// List every look the caller can see.
    ///
    /// **Endpoint:** `GET /looks`
    pub async fn all_looks<R: FromByteStream>(
        &self,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&all_looks_request(fields)?, settings).await
    }

    /// Get a look, including its query.
    ///
    /// **Endpoint:** `GET /looks/{look_id}`
    pub async fn look<R: FromByteStream>(
        &self,
        look_id: &str,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&look_request(look_id, fields)?, settings).await
    }

    /// Run a look's query and return the results in `result_format`.
    ///
    /// **Endpoint:** `GET /looks/{look_id}/run/{result_format}`
    pub async fn run_look<R: FromByteStream>(
        &self,
        look_id: &str,
        result_format: ResultFormat,
        options: &RunOptions,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        let settings = with_encoding_hint(settings, result_format.encoding());
        self.invoke(&run_look_request(look_id, result_format, options)?, Some(&settings))
            .await
    }

    /// Soft-delete a look.
    ///
    /// **Endpoint:** `DELETE /looks/{look_id}`
    pub async fn delete_look(&self, look_id: &str, settings: Option<&TransportSettings>) -> Result<()> {
        self.invoke(&delete_look_request(look_id)?, settings).await
    }
}
