//! Request and response records of the admin endpoints.
//!
//! Plain serde data with Grafana's camelCase wire names. Nothing here is
//! validated locally; the server rejects what it does not accept.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric Grafana user id.
pub type UserId = u64;

/// Numeric Grafana organization id.
pub type OrgId = u64;

/// Account to create with `POST api/admin/users`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: u64,
    pub login: String,
    pub name: String,
    pub email: String,
    pub org_id: u64,
    pub theme: String,
    pub password: String,
    pub is_disabled: bool,
    pub auth_labels: Vec<String>,
    pub is_grafana_admin: bool,
    pub is_external: bool,
}

impl User {
    /// Minimal account: login, email and initial password.
    #[must_use]
    pub fn new(
        login: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            login: login.into(),
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn with_org_id(mut self, org_id: OrgId) -> Self {
        self.org_id = org_id;
        self
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("login", &self.login)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("org_id", &self.org_id)
            .field("theme", &self.theme)
            .field("password", &"[REDACTED]")
            .field("is_disabled", &self.is_disabled)
            .field("auth_labels", &self.auth_labels)
            .field("is_grafana_admin", &self.is_grafana_admin)
            .field("is_external", &self.is_external)
            .finish()
    }
}

/// Body of `PUT api/admin/users/{id}/permissions`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserPermissions {
    pub is_grafana_admin: bool,
}

impl UserPermissions {
    #[must_use]
    pub fn grafana_admin(is_grafana_admin: bool) -> Self {
        Self { is_grafana_admin }
    }
}

/// Reply envelope of the mutating admin endpoints.
///
/// Endpoints fill different subsets (`id` and `message` on create, only
/// `message` on delete), so every field is optional. `Default` is the empty
/// envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}
