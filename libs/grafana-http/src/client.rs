use crate::builder::HttpClientBuilder;
use crate::config::HttpClientConfig;
use crate::context::CallContext;
use crate::error::HttpError;
use crate::response::{ResponseBody, checked_body};
use crate::transport::{QueryParams, RawResponse, Transport};
use async_trait::async_trait;
use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{Method, Request, Response};
use http_body_util::Full;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use tower::Service;
use tower::buffer::Buffer;
use url::Url;

/// Type alias for the future type of the inner service
pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// Buffered middleware stack; cloning it clones a channel sender
pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client bound to one Grafana base URL and one set of credentials.
///
/// The production [`Transport`]. Each call sends exactly one request through
/// the tower stack assembled by [`HttpClientBuilder`]; nothing is retried.
///
/// `HttpClient` is `Clone + Send + Sync` and never mutated after `build()`,
/// so one instance can serve any number of concurrent calls without a lock.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) base_url: Url,
    pub(crate) max_body_size: usize,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("max_body_size", &self.max_body_size)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Build a client from a configuration.
    ///
    /// # Errors
    /// See [`HttpClientBuilder::build`]
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime, like [`HttpClientBuilder::build`].
    pub fn new(config: HttpClientConfig) -> Result<Self, HttpError> {
        HttpClientBuilder::with_config(config).build()
    }

    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` and `query` against the base URL.
    ///
    /// The base path is kept and joined with exactly one `/`, so
    /// `api/admin/users` and `/api/admin/users` resolve to the same URL.
    ///
    /// # Errors
    /// Returns `HttpError::QueryEncode` if the query cannot be encoded
    pub fn endpoint(&self, path: &str, query: Option<&QueryParams>) -> Result<Url, HttpError> {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url.set_query(None);

        if let Some(pairs) = query.filter(|pairs| !pairs.is_empty()) {
            let encoded = serde_urlencoded::to_string(pairs)?;
            url.set_query(Some(&encoded));
        }
        Ok(url)
    }

    async fn execute(
        &self,
        ctx: &CallContext,
        method: Method,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<Bytes>,
    ) -> Result<RawResponse, HttpError> {
        let url = self.endpoint(path, query)?;
        let uri: http::Uri = url
            .as_str()
            .parse()
            .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let mut builder = Request::builder()
            .method(method.clone())
            .uri(uri)
            .header(ACCEPT, "application/json");
        let body = match body {
            Some(bytes) => {
                builder = builder.header(CONTENT_TYPE, "application/json");
                bytes
            }
            None => Bytes::new(),
        };
        let request = builder.body(Full::new(body))?;

        let mut service = self.service.clone();
        let max_body_size = self.max_body_size;
        tracing::debug!(method = %method, url = %url, "sending request");

        ctx.run(async move {
            try_acquire_buffer_slot(&mut service).await?;
            let response = service.call(request).await.map_err(map_buffer_error)?;
            let status = response.status();
            let result = checked_body(response, max_body_size).await;
            tracing::debug!(method = %method, url = %url, status = %status, "received response");
            result
        })
        .await
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn post(
        &self,
        ctx: &CallContext,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<Bytes>,
    ) -> Result<RawResponse, HttpError> {
        self.execute(ctx, Method::POST, path, query, body).await
    }

    async fn put(
        &self,
        ctx: &CallContext,
        path: &str,
        query: Option<&QueryParams>,
        body: Option<Bytes>,
    ) -> Result<RawResponse, HttpError> {
        self.execute(ctx, Method::PUT, path, query, body).await
    }

    async fn delete(
        &self,
        ctx: &CallContext,
        path: &str,
        query: Option<&QueryParams>,
    ) -> Result<RawResponse, HttpError> {
        self.execute(ctx, Method::DELETE, path, query, None).await
    }
}

/// Map buffer errors to `HttpError`
///
/// The buffer wraps inner service errors; anything else means its worker is gone.
fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(
                error = %err,
                "buffer worker closed unexpectedly; service unavailable"
            );
            HttpError::ServiceClosed
        }
    }
}

/// Reserve a buffer slot without waiting; a full buffer is `HttpError::Overloaded`.
async fn try_acquire_buffer_slot(service: &mut BufferedService) -> Result<(), HttpError> {
    use std::task::Poll;

    let poll_result = std::future::poll_fn(|cx| match service.poll_ready(cx) {
        Poll::Ready(result) => Poll::Ready(Some(result)),
        Poll::Pending => Poll::Ready(None),
    })
    .await;

    match poll_result {
        Some(Ok(())) => Ok(()),
        Some(Err(e)) => Err(map_buffer_error(e)),
        None => Err(HttpError::Overloaded),
    }
}
