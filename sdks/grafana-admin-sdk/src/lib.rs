//! Grafana Admin SDK
//!
//! Typed client for the user administration endpoints of the Grafana HTTP API:
//! - `AdminClient` and the object-safe `AdminApi` trait
//! - Request and reply records (`User`, `UserPermissions`, `StatusMessage`)
//! - Error type (`AdminError`)
//!
//! ## Usage
//!
//! ```ignore
//! use grafana_admin_sdk::{AdminClient, UserPermissions};
//! use grafana_http::{CallContext, HttpClientConfig, Credentials};
//!
//! let mut config = HttpClientConfig::new("https://grafana.example.com");
//! config.credentials = Credentials::basic("admin", "admin");
//! let admin = AdminClient::from_config(config)?;
//!
//! let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
//! admin
//!     .update_user_permissions(&ctx, &UserPermissions::grafana_admin(true), 42)
//!     .await?;
//! ```
//!
//! Transport, credentials and TLS come from `grafana_http`.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod errors;
pub mod models;

pub use client::{AdminApi, AdminClient};
pub use errors::AdminError;
pub use models::{OrgId, StatusMessage, User, UserId, UserPermissions};

pub use grafana_http::{CallContext, HttpClientConfig};
