//! Query endpoints.

use crate::api::with_encoding_hint;
use crate::client::LookerClient;
use crate::error::Result;
use crate::request::{HttpMethod, Operation, RequestBuilder, RequestDescriptor};
use crate::settings::TransportSettings;
use crate::stream::FromByteStream;
use crate::types::ResultFormat;
use crate::types::query::{RunOptions, WriteQuery};

pub const CREATE_QUERY: Operation = Operation::new("create_query", HttpMethod::Post, "/queries");
pub const QUERY: Operation = Operation::new("query", HttpMethod::Get, "/queries/{query_id}");
pub const RUN_QUERY: Operation = Operation::new(
    "run_query",
    HttpMethod::Get,
    "/queries/{query_id}/run/{result_format}",
);
pub const RUN_INLINE_QUERY: Operation = Operation::new(
    "run_inline_query",
    HttpMethod::Post,
    "/queries/run/{result_format}",
);

/// Append the shared `run_*` options to a request.
pub(crate) fn run_options(builder: RequestBuilder, options: &RunOptions) -> Result<RequestBuilder> {
    builder
        .query("limit", options.limit)?
        .query("apply_formatting", options.apply_formatting)?
        .query("apply_vis", options.apply_vis)?
        .query("cache", options.cache)?
        .query("image_width", options.image_width)?
        .query("image_height", options.image_height)?
        .query("generate_drill_links", options.generate_drill_links)?
        .query("force_production", options.force_production)?
        .query("cache_only", options.cache_only)?
        .query("path_prefix", &options.path_prefix)?
        .query("rebuild_pdts", options.rebuild_pdts)?
        .query("server_table_calcs", options.server_table_calcs)
}

pub fn create_query_request(body: &WriteQuery, fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(CREATE_QUERY
        .request(&[])?
        .query("fields", fields)?
        .json(body)?
        .build())
}

pub fn query_request(query_id: &str, fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(QUERY
        .request(&[("query_id", &query_id)])?
        .query("fields", fields)?
        .build())
}

pub fn run_query_request(
    query_id: &str,
    result_format: ResultFormat,
    options: &RunOptions,
) -> Result<RequestDescriptor> {
    let builder = RUN_QUERY.request(&[("query_id", &query_id), ("result_format", &result_format)])?;
    Ok(run_options(builder, options)?.build())
}

pub fn run_inline_query_request(
    result_format: ResultFormat,
    body: &WriteQuery,
    options: &RunOptions,
) -> Result<RequestDescriptor> {
    let builder = RUN_INLINE_QUERY.request(&[("result_format", &result_format)])?;
    Ok(run_options(builder, options)?.json(body)?.build())
}

impl LookerClient {
    /// Create a query. Identical definitions may return an existing id.
    ///
    /// **Endpoint:** `POST /queries`
    pub async fn create_query<R: FromByteStream>(
        &self,
        body: &WriteQuery,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&create_query_request(body, fields)?, settings).await
    }

    /// Get a query definition.
    ///
    /// **Endpoint:** `GET /queries/{query_id}`
    pub async fn query<R: FromByteStream>(
        &self,
        query_id: &str,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&query_request(query_id, fields)?, settings).await
    }

    /// Run a saved query and return its results in `result_format`.
    ///
    /// Binary formats default to [`ResponseEncoding::Binary`](crate::settings::ResponseEncoding::Binary),
    /// so read them as `Bytes`, `Vec<u8>`, or a [`ByteStream`](crate::ByteStream).
    ///
    /// **Endpoint:** `GET /queries/{query_id}/run/{result_format}`
    pub async fn run_query<R: FromByteStream>(
        &self,
        query_id: &str,
        result_format: ResultFormat,
        options: &RunOptions,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        let settings = with_encoding_hint(settings, result_format.encoding());
        self.invoke(&run_query_request(query_id, result_format, options)?, Some(&settings))
            .await
    }

    /// Run a query definition without saving it first.
    ///
    /// **Endpoint:** `POST /queries/run/{result_format}`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use looker_rs::LookerClient;
    /// # use looker_rs::types::ResultFormat;
    /// # use looker_rs::types::query::{RunOptions, WriteQuery};
    /// # #[tokio::main]
    /// # async fn main() -> looker_rs::Result<()> {
    /// let client = LookerClient::from_env()?;
    /// let query = WriteQuery::new("thelook", "orders", &["orders.count", "orders.created_date"])
    ///     .filter("orders.created_date", "7 days")
    ///     .limit(100);
    /// let csv: String = client
    ///     .run_inline_query(ResultFormat::Csv, &query, &RunOptions::default(), None)
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_inline_query<R: FromByteStream>(
        &self,
        result_format: ResultFormat,
        body: &WriteQuery,
        options: &RunOptions,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        let settings = with_encoding_hint(settings, result_format.encoding());
        self.invoke(
            &run_inline_query_request(result_format, body, options)?,
            Some(&settings),
        )
        .await
    }
}
