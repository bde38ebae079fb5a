#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP transport for Grafana HTTP API clients
//!
//! This crate provides a hyper-based client bound to one Grafana instance:
//! - TLS via rustls (HTTPS only by default)
//! - Basic or bearer credentials injected on every request
//! - Connection pooling
//! - Per-request timeout plus caller deadlines and cancellation
//! - Transparent response decompression with a decompressed-size limit
//!
//! API clients depend on the [`Transport`] trait, not on [`HttpClient`], so
//! they can be tested against an in-memory fake.
//!
//! ```ignore
//! use grafana_http::{CallContext, HttpClient, Transport};
//!
//! let client = HttpClient::builder()
//!     .base_url("https://grafana.example.com")
//!     .basic_auth("admin", "admin")
//!     .build()?;
//!
//! let (body, meta) = client
//!     .delete(&CallContext::new(), "api/admin/users/42", None)
//!     .await?;
//! ```
//!
//! Nothing is retried: every call sends exactly one request.

mod builder;
mod client;
mod config;
mod context;
mod credentials;
mod error;
mod layers;
mod response;
mod secret;
mod tls;
mod transport;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_MAX_BODY_SIZE, DEFAULT_USER_AGENT, HttpClientConfig, TlsRootConfig,
    TransportSecurity,
};
pub use context::CallContext;
pub use credentials::Credentials;
pub use error::HttpError;
pub use layers::{SetHeaderLayer, SetHeaderService};
pub use response::{ERROR_BODY_PREVIEW_LIMIT, ResponseBody, ResponseMeta};
pub use secret::SecretString;
pub use transport::{QueryParams, RawResponse, Transport};

pub use tokio_util::sync::CancellationToken;
