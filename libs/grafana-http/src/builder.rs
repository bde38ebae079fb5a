use crate::client::{BufferedService, HttpClient};
use crate::config::{HttpClientConfig, TlsRootConfig, TransportSecurity};
use crate::credentials::Credentials;
use crate::error::HttpError;
use crate::layers::SetHeaderLayer;
use crate::response::ResponseBody;
use crate::secret::SecretString;
use crate::tls;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::decompression::DecompressionLayer;
use url::Url;

/// Builder for an [`HttpClient`] bound to one Grafana instance.
///
/// ```ignore
/// let client = HttpClient::builder()
///     .base_url("https://grafana.example.com")
///     .basic_auth("admin", "admin")
///     .timeout(Duration::from_secs(10))
///     .build()?;
/// ```
#[derive(Debug)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    /// Create a new builder with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Create a builder with a specific configuration
    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    /// Authenticate with `Authorization: Basic`
    #[must_use]
    pub fn basic_auth(self, user: impl Into<String>, password: impl Into<SecretString>) -> Self {
        self.credentials(Credentials::basic(user, password))
    }

    /// Authenticate with a service-account or API token
    #[must_use]
    pub fn bearer_token(self, token: impl Into<SecretString>) -> Self {
        self.credentials(Credentials::bearer(token))
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the maximum response body size
    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    #[must_use]
    pub fn tls_roots(mut self, roots: TlsRootConfig) -> Self {
        self.config.tls_roots = roots;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    /// Allow plain `http://` base URLs.
    ///
    /// Only available in debug builds or with the `allow-insecure-http` feature.
    #[must_use]
    #[cfg(any(debug_assertions, feature = "allow-insecure-http"))]
    pub fn allow_insecure_http(mut self) -> Self {
        self.config.transport = TransportSecurity::AllowInsecureHttp;
        self
    }

    /// Maximum number of requests queued in front of the worker.
    ///
    /// Clamped to at least 1; `tower::buffer::Buffer` panics on 0.
    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    #[must_use]
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or not allowed by the
    /// transport security mode, a header value is invalid, or TLS setup fails
    ///
    /// # Panics
    /// Panics when called outside a Tokio runtime: the request buffer spawns
    /// its worker task here.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        let config = self.config;
        let base_url = parse_base_url(&config.base_url, config.transport)?;

        if config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!(
                target: "grafana_http::security",
                base_url = %base_url,
                "insecure HTTP allowed; credentials may be sent in clear text"
            );
        }

        let https = tls::https_connector(config.tls_roots, config.transport)?;

        let mut client_builder = Client::builder(TokioExecutor::new());
        // pool_timer is required for pool_idle_timeout to take effect
        client_builder
            .pool_timer(TokioTimer::new())
            .pool_max_idle_per_host(config.pool_max_idle_per_host);
        if let Some(idle_timeout) = config.pool_idle_timeout {
            client_builder.pool_idle_timeout(idle_timeout);
        }
        let hyper_client = client_builder.build::<_, Full<Bytes>>(https);

        let user_agent = SetHeaderLayer::user_agent(&config.user_agent)?;
        let authorization = SetHeaderLayer::authorization(&config.credentials)?;
        let timeout = config.request_timeout;

        // Request flow (outer -> inner):
        //   Buffer -> ErrorMapping -> Timeout -> Authorization -> UserAgent ->
        //   Decompression -> hyper_client
        //
        // No retry or redirect layer: every call is exactly one request.
        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(authorization)
            .layer(user_agent)
            .layer(DecompressionLayer::new())
            .service(hyper_client)
            .map_response(map_decompression_response)
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout))
            .boxed_clone();

        let service: BufferedService = Buffer::new(service, config.buffer_capacity.max(1));

        Ok(HttpClient {
            service,
            base_url,
            max_body_size: config.max_body_size,
        })
    }
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the base URL and check its scheme against the security mode.
fn parse_base_url(raw: &str, transport: TransportSecurity) -> Result<Url, HttpError> {
    let url = Url::parse(raw).map_err(|e| HttpError::InvalidUrl {
        url: raw.to_owned(),
        reason: e.to_string(),
    })?;

    if !url.has_host() {
        return Err(HttpError::InvalidUrl {
            url: raw.to_owned(),
            reason: "missing host".to_owned(),
        });
    }

    match (url.scheme(), transport) {
        ("https", _) | ("http", TransportSecurity::AllowInsecureHttp) => Ok(url),
        ("http", TransportSecurity::TlsOnly) => Err(HttpError::InvalidScheme {
            scheme: "http".to_owned(),
            reason: "HTTPS required (transport security is TlsOnly)".to_owned(),
        }),
        (scheme, _) => Err(HttpError::InvalidScheme {
            scheme: scheme.to_owned(),
            reason: "only http:// and https:// schemes are supported".to_owned(),
        }),
    }
}

/// Map tower errors to `HttpError`, keeping typed errors from inner services.
fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    let err = match err.downcast::<HttpError>() {
        Ok(http_err) => return *http_err,
        Err(other) => other,
    };
    match err.downcast::<hyper_util::client::legacy::Error>() {
        Ok(client_err) => HttpError::from(*client_err),
        Err(other) => HttpError::Transport(other),
    }
}

/// Box the decompression body into [`ResponseBody`].
fn map_decompression_response<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, body.map_err(Into::into).boxed())
}
