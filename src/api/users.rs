//! User endpoints.

use crate::client::LookerClient;
use crate::error::Result;
use crate::request::{HttpMethod, Operation, RequestDescriptor};
use crate::settings::TransportSettings;
use crate::stream::FromByteStream;
use crate::types::user::{RequestAllUsers, RequestSearchUsers, WriteUser};

pub const ME: Operation = Operation::new("me", HttpMethod::Get, "/user");
pub const ALL_USERS: Operation = Operation::new("all_users", HttpMethod::Get, "/users");
pub const SEARCH_USERS: Operation = Operation::new("search_users", HttpMethod::Get, "/users/search");
pub const USER: Operation = Operation::new("user", HttpMethod::Get, "/users/{user_id}");
pub const CREATE_USER: Operation = Operation::new("create_user", HttpMethod::Post, "/users");
pub const UPDATE_USER: Operation = Operation::new("update_user", HttpMethod::Patch, "/users/{user_id}");
pub const DELETE_USER: Operation = Operation::new("delete_user", HttpMethod::Delete, "/users/{user_id}");

pub fn me_request(fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(ME.request(&[])?.query("fields", fields)?.build())
}

pub fn all_users_request(req: &RequestAllUsers) -> Result<RequestDescriptor> {
    Ok(ALL_USERS
        .request(&[])?
        .query("fields", &req.fields)?
        .query("page", req.page)?
        .query("per_page", req.per_page)?
        .query("limit", req.limit)?
        .query("offset", req.offset)?
        .query("sorts", &req.sorts)?
        .query("ids", &req.ids)?
        .build())
}

pub fn search_users_request(req: &RequestSearchUsers) -> Result<RequestDescriptor> {
    Ok(SEARCH_USERS
        .request(&[])?
        .query("fields", &req.fields)?
        .query("page", req.page)?
        .query("per_page", req.per_page)?
        .query("limit", req.limit)?
        .query("offset", req.offset)?
        .query("sorts", &req.sorts)?
        .query("id", &req.id)?
        .query("first_name", &req.first_name)?
        .query("last_name", &req.last_name)?
        .query("email", &req.email)?
        .query("is_disabled", req.is_disabled)?
        .query("group_id", &req.group_id)?
        .query("filter_or", req.filter_or)?
        .build())
}

pub fn user_request(user_id: &str, fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(USER
        .request(&[("user_id", &user_id)])?
        .query("fields", fields)?
        .build())
}

pub fn create_user_request(body: &WriteUser, fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(CREATE_USER
        .request(&[])?
        .query("fields", fields)?
        .json(body)?
        .build())
}

pub fn update_user_request(user_id: &str, body: &WriteUser, fields: Option<&str>) -> Result<RequestDescriptor> {
    Ok(UPDATE_USER
        .request(&[("user_id", &user_id)])?
        .query("fields", fields)?
        .json(body)?
        .build())
}

pub fn delete_user_request(user_id: &str) -> Result<RequestDescriptor> {
    Ok(DELETE_USER.request(&[("user_id", &user_id)])?.build())
}

impl LookerClient {
    /// Get the user the client is logged in as.
    ///
    /// **Endpoint:** `GET /user`
    pub async fn me<R: FromByteStream>(&self, fields: Option<&str>, settings: Option<&TransportSettings>) -> Result<R> {
        self.invoke(&me_request(fields)?, settings).await
    }

    /// List users.
    ///
    /// **Endpoint:** `GET /users`
    pub async fn all_users<R: FromByteStream>(
        &self,
        req: &RequestAllUsers,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&all_users_request(req)?, settings).await
    }

    /// Search users by name, email, group and status.
    ///
    /// **Endpoint:** `GET /users/search`
    pub async fn search_users<R: FromByteStream>(
        &self,
        req: &RequestSearchUsers,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&search_users_request(req)?, settings).await
    }

    /// Get one user.
    ///
    /// **Endpoint:** `GET /users/{user_id}`
    pub async fn user<R: FromByteStream>(
        &self,
        user_id: &str,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&user_request(user_id, fields)?, settings).await
    }

    /// Create a user.
    ///
    /// **Endpoint:** `POST /users`
    pub async fn create_user<R: FromByteStream>(
        &self,
        body: &WriteUser,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&create_user_request(body, fields)?, settings).await
    }

    /// Update the fields set in `body`.
    ///
    /// **Endpoint:** `PATCH /users/{user_id}`
    pub async fn update_user<R: FromByteStream>(
        &self,
        user_id: &str,
        body: &WriteUser,
        fields: Option<&str>,
        settings: Option<&TransportSettings>,
    ) -> Result<R> {
        self.invoke(&update_user_request(user_id, body, fields)?, settings).await
    }

    /// Delete a user. Looker answers with `204 No Content`.
    ///
    /// **Endpoint:** `DELETE /users/{user_id}`
    pub async fn delete_user(&self, user_id: &str, settings: Option<&TransportSettings>) -> Result<()> {
        self.invoke(&delete_user_request(user_id)?, settings).await
    }
}
