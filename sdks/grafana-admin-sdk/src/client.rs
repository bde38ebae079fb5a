//! Admin API facade.
//!
//! Every operation is one round trip: encode the input, send it through the
//! [`Transport`], decode the reply. Failures of any stage are returned as they
//! are; nothing is retried or recovered here.

use async_trait::async_trait;
use bytes::Bytes;
use grafana_http::{CallContext, HttpClient, HttpClientConfig, HttpError, Transport};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::errors::AdminError;
use crate::models::{OrgId, StatusMessage, User, UserId, UserPermissions};

const ADMIN_USERS_PATH: &str = "api/admin/users";

fn admin_user_path(id: UserId) -> String {
    format!("{ADMIN_USERS_PATH}/{id}")
}

fn admin_user_permissions_path(id: UserId) -> String {
    format!("{ADMIN_USERS_PATH}/{id}/permissions")
}

// Grafana documents this endpoint with a leading slash; the transport
// resolves both forms the same way.
fn user_using_org_path(user_id: UserId, org_id: OrgId) -> String {
    format!("/api/users/{user_id}/using/{org_id}")
}

/// The admin operations as an object-safe trait.
///
/// Hold it as `Arc<dyn AdminApi>` to swap in a fake:
/// ```ignore
/// let admin: Arc<dyn AdminApi> = Arc::new(AdminClient::from_config(config)?);
/// admin.delete_user(&CallContext::new(), 42).await?;
/// ```
///
/// Every method fails with [`AdminError`] naming the stage that failed.
#[async_trait]
#[allow(clippy::missing_errors_doc)]
pub trait AdminApi: Send + Sync {
    /// Create a user with `POST api/admin/users`.
    async fn create_user(&self, ctx: &CallContext, user: &User)
    -> Result<StatusMessage, AdminError>;

    /// Delete a user with `DELETE api/admin/users/{id}`.
    async fn delete_user(&self, ctx: &CallContext, id: UserId)
    -> Result<StatusMessage, AdminError>;

    /// Replace the permission flags of a user with
    /// `PUT api/admin/users/{id}/permissions`.
    async fn update_user_permissions(
        &self,
        ctx: &CallContext,
        permissions: &UserPermissions,
        id: UserId,
    ) -> Result<StatusMessage, AdminError>;

    /// Switch the active organization of a user with
    /// `POST /api/users/{user_id}/using/{org_id}`.
    async fn switch_user_context(
        &self,
        ctx: &CallContext,
        user_id: UserId,
        org_id: OrgId,
    ) -> Result<StatusMessage, AdminError>;
}

/// Client handle for the admin endpoints.
///
/// Owns its transport and never mutates it, so a clone can be handed to
/// each task. Base URL and credentials live in the transport.
#[derive(Debug, Clone)]
pub struct AdminClient<T = HttpClient> {
    transport: T,
}

impl AdminClient<HttpClient> {
    /// Build the production transport from `config` and wrap it.
    ///
    /// # Errors
    /// Returns `HttpError` if the transport cannot be built (bad base URL,
    /// disallowed scheme, TLS setup, invalid header values).
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime; see [`HttpClient::new`].
    pub fn from_config(config: HttpClientConfig) -> Result<Self, HttpError> {
        Ok(Self::new(HttpClient::new(config)?))
    }
}

impl<T: Transport> AdminClient<T> {
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// # Errors
    /// See [`AdminError`].
    #[tracing::instrument(name = "grafana_admin.create_user", skip_all)]
    pub async fn create_user(
        &self,
        ctx: &CallContext,
        user: &User,
    ) -> Result<StatusMessage, AdminError> {
        let body = encode(user)?;
        tracing::debug!("creating user");
        let (bytes, _) = self
            .transport
            .post(ctx, ADMIN_USERS_PATH, None, Some(body))
            .await?;
        decode(&bytes)
    }

    /// # Errors
    /// See [`AdminError`].
    #[tracing::instrument(name = "grafana_admin.delete_user", skip_all, fields(user_id = id))]
    pub async fn delete_user(
        &self,
        ctx: &CallContext,
        id: UserId,
    ) -> Result<StatusMessage, AdminError> {
        tracing::debug!("deleting user");
        let (bytes, _) = self
            .transport
            .delete(ctx, &admin_user_path(id), None)
            .await?;
        decode(&bytes)
    }

    /// # Errors
    /// See [`AdminError`].
    #[tracing::instrument(
        name = "grafana_admin.update_user_permissions",
        skip_all,
        fields(user_id = id)
    )]
    pub async fn update_user_permissions(
        &self,
        ctx: &CallContext,
        permissions: &UserPermissions,
        id: UserId,
    ) -> Result<StatusMessage, AdminError> {
        let body = encode(permissions)?;
        tracing::debug!("updating user permissions");
        let (bytes, _) = self
            .transport
            .put(ctx, &admin_user_permissions_path(id), None, Some(body))
            .await?;
        decode(&bytes)
    }

    /// # Errors
    /// See [`AdminError`].
    #[tracing::instrument(
        name = "grafana_admin.switch_user_context",
        skip_all,
        fields(user_id = user_id, org_id = org_id)
    )]
    pub async fn switch_user_context(
        &self,
        ctx: &CallContext,
        user_id: UserId,
        org_id: OrgId,
    ) -> Result<StatusMessage, AdminError> {
        tracing::debug!("switching user organization");
        let (bytes, _) = self
            .transport
            .post(ctx, &user_using_org_path(user_id, org_id), None, None)
            .await?;
        decode(&bytes)
    }
}

#[async_trait]
impl<T: Transport> AdminApi for AdminClient<T> {
    async fn create_user(
        &self,
        ctx: &CallContext,
        user: &User,
    ) -> Result<StatusMessage, AdminError> {
        AdminClient::create_user(self, ctx, user).await
    }

    async fn delete_user(
        &self,
        ctx: &CallContext,
        id: UserId,
    ) -> Result<StatusMessage, AdminError> {
        AdminClient::delete_user(self, ctx, id).await
    }

    async fn update_user_permissions(
        &self,
        ctx: &CallContext,
        permissions: &UserPermissions,
        id: UserId,
    ) -> Result<StatusMessage, AdminError> {
        AdminClient::update_user_permissions(self, ctx, permissions, id).await
    }

    async fn switch_user_context(
        &self,
        ctx: &CallContext,
        user_id: UserId,
        org_id: OrgId,
    ) -> Result<StatusMessage, AdminError> {
        AdminClient::switch_user_context(self, ctx, user_id, org_id).await
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<Bytes, AdminError> {
    serde_json::to_vec(body)
        .map(Bytes::from)
        .map_err(AdminError::Serialize)
}

fn decode<R: DeserializeOwned>(bytes: &[u8]) -> Result<R, AdminError> {
    serde_json::from_slice(bytes).map_err(|err| {
        tracing::debug!(error = %err, len = bytes.len(), "response body did not decode");
        AdminError::Deserialize(err)
    })
}
