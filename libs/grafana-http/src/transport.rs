//! The capability API clients depend on: one method per HTTP verb.
//!
//! Clients are written against [`Transport`] rather than a concrete HTTP
//! stack so they can be exercised with an in-memory fake. [`HttpClient`]
//! is the production implementation.
//!
//! [`HttpClient`]: crate::HttpClient

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::context::CallContext;
use crate::error::HttpError;
use crate::response::ResponseMeta;

/// Ordered query parameters, URL-encoded by the transport.
pub type QueryParams = [(String, String)];

/// Body bytes plus status and headers of a 2xx reply.
pub type RawResponse = (Bytes, ResponseMeta);

/// Sends one request per call and returns the raw reply.
///
/// `path` is resolved against the transport's base URL; a leading `/` makes
/// no difference. A `Some` body is sent as `application/json`. Non-2xx
/// replies are reported as [`HttpError::HttpStatus`]. Implementations must
/// not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a POST request.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` on network failure, timeout, cancellation or a
    /// non-2xx reply.
    async fn post(
        &self,
        ctx: &CallContext,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<Bytes>,
    ) -> Result<RawResponse, HttpError>;

    /// Send a PUT request.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Transport::post`].
    async fn put(
        &self,
        ctx: &CallContext,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<Bytes>,
    ) -> Result<RawResponse, HttpError>;

    /// Send a DELETE request with no body.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Transport::post`].
    async fn delete(
        &self,
        ctx: &CallContext,
        path: &str,
        query: Option<&QueryParams>,
    ) -> Result<RawResponse, HttpError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn post(
        &self,
        ctx: &CallContext,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<Bytes>,
    ) -> Result<RawResponse, HttpError> {
        (**self).post(ctx, path, query, body).await
    }

    async fn put(
        &self,
        ctx: &CallContext,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<Bytes>,
    ) -> Result<RawResponse, HttpError> {
        (**self).put(ctx, path, query, body).await
    }

    async fn delete(
        &self,
        ctx: &CallContext,
        path: &str,
        query: Option<&QueryParams>,
    ) -> Result<RawResponse, HttpError> {
        (**self).delete(ctx, path, query).await
    }
}
