//! API session endpoints.

use crate::client::LookerClient;
use crate::error::Result;
use crate::request::{HttpMethod, Operation, RequestDescriptor};
use crate::settings::TransportSettings;
use crate::stream::FromByteStream;
use crate::types::session::WriteApiSession;

pub const SESSION: Operation = Operation::new("session", HttpMethod::Get, "/session");
pub const UPDATE_SESSION: Operation = Operation::new("update_session", HttpMethod::Patch, "/session");

pub fn session_request() -> Result<RequestDescriptor> {
    Ok(SESSION.request(&[])?.build())
}

pub fn update_session_request(body: &WriteApiSession) -> Result<RequestDescriptor> {
    Ok(UPDATE_SESSION.request(&[])?.json(body)?.build())
}

impl LookerClient {
    /// Get the caller's API session.
    ///
    /// **Endpoint:** `GET /session`
    ///
    /// Usually read as `Json<ApiSession>`.
    pub async fn session<R: FromByteStream>(&self, settings: Option<&TransportSettings>) -> Result<R> {
        self.invoke(&session_request()?, settings).await
    }

    /// Switch the session between the production and dev workspaces.
    ///
    /// **Endpoint:** `PATCH /session`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use looker_rs::{Json, LookerClient};
    /// # use looker_rs::types::session::{ApiSession, WriteApiSession};
    /// # #[tokio::main]
    /// # async fn main() -> looker_rs::Result<()> {
    /// let client = LookerClient::from_env()?;
    /// let session: Json<ApiSession> = client.update_session(&WriteApiSession::dev(), None).await?;
    /// assert_eq!(session.workspace_id.as_deref(), Some("dev"));
    /// # Ok(())
    /// # }
    /// ```
    pub async fn update_session<R: FromByteStream>(
        &self,
        body: &WriteApiSession,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&update_session_request(body)?, settings).await
    }

    /// Revoke the current access token.
    ///
    /// Returns `false` if the client was not logged in. The next call logs in
    /// again.
    ///
    /// **Endpoint:** `DELETE /logout`
    pub async fn logout(&self) -> Result<bool> {
        self.auth().logout().await
    }
}
