use serde::Deserialize;
use std::time::Duration;

use crate::credentials::Credentials;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("grafana-http/", env!("CARGO_PKG_VERSION"));

/// Base URL of a Grafana instance started with its stock settings
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Default maximum response body size (10 MiB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// TLS root certificate configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TlsRootConfig {
    /// Use Mozilla's root certificates (webpki-roots, no OS dependency)
    #[default]
    WebPki,
    /// Use OS native root certificate store
    Native,
}

/// Whether the client enforces TLS or allows plain HTTP.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TransportSecurity {
    /// HTTPS only
    #[default]
    TlsOnly,
    /// Allow `http://` base URLs. Intended for local instances and mock servers.
    AllowInsecureHttp,
}

/// Configuration of an [`HttpClient`](crate::HttpClient).
///
/// Deserializable so host applications can embed it in their own config
/// files. Durations use humantime notation (`"30s"`, `"1m 30s"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpClientConfig {
    /// Grafana root URL; request paths are resolved beneath it
    pub base_url: String,

    pub credentials: Credentials,

    /// Per-request timeout (default: 30 seconds)
    #[serde(deserialize_with = "humantime_duration::deserialize")]
    pub request_timeout: Duration,

    /// Maximum response body size in bytes (default: 10 MiB)
    pub max_body_size: usize,

    pub user_agent: String,

    pub tls_roots: TlsRootConfig,

    pub transport: TransportSecurity,

    /// Number of requests that may queue in front of the worker (min 1)
    pub buffer_capacity: usize,

    /// Idle pooled connections are closed after this long; `None` keeps them
    #[serde(deserialize_with = "humantime_duration::deserialize_option")]
    pub pool_idle_timeout: Option<Duration>,

    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            credentials: Credentials::None,
            request_timeout: Duration::from_secs(30),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            tls_roots: TlsRootConfig::default(),
            transport: TransportSecurity::default(),
            buffer_capacity: 1024,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 32,
        }
    }
}

impl HttpClientConfig {
    /// Configuration for the given Grafana URL with everything else defaulted.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Configuration for tests against a local mock server.
    ///
    /// Allows plain HTTP and uses a short timeout.
    #[must_use]
    pub fn for_testing(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: Duration::from_secs(5),
            transport: TransportSecurity::AllowInsecureHttp,
            ..Self::default()
        }
    }
}

mod humantime_duration {
    use serde::{Deserialize, Deserializer, de};
    use std::time::Duration;

    pub(super) fn deserialize<'de, D>(d: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(d)?;
        humantime::parse_duration(&raw)
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&raw), &"a duration"))
    }

    pub(super) fn deserialize_option<'de, D>(d: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(d)? else {
            return Ok(None);
        };
        humantime::parse_duration(&raw)
            .map(Some)
            .map_err(|_| de::Error::invalid_value(de::Unexpected::Str(&raw), &"a duration"))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HttpClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.credentials, Credentials::None);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.tls_roots, TlsRootConfig::WebPki);
        assert_eq!(config.transport, TransportSecurity::TlsOnly);
        assert_eq!(config.buffer_capacity, 1024);
        assert_eq!(config.pool_idle_timeout, Some(Duration::from_secs(90)));
        assert_eq!(config.pool_max_idle_per_host, 32);
    }

    #[test]
    fn for_testing_allows_http() {
        let config = HttpClientConfig::for_testing("http://127.0.0.1:3000");
        assert_eq!(config.transport, TransportSecurity::AllowInsecureHttp);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn deserialize_partial_document() {
        let json = r#"{
            "base_url": "https://grafana.example.com",
            "credentials": {"kind": "basic", "user": "admin", "password": "admin"},
            "request_timeout": "1m 30s",
            "tls_roots": "native",
            "pool_idle_timeout": null
        }"#;
        let config: HttpClientConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.base_url, "https://grafana.example.com");
        assert_eq!(config.credentials, Credentials::basic("admin", "admin"));
        assert_eq!(config.request_timeout, Duration::from_secs(90));
        assert_eq!(config.tls_roots, TlsRootConfig::Native);
        assert_eq!(config.pool_idle_timeout, None);
        // untouched keys keep their defaults
        assert_eq!(config.max_body_size, DEFAULT_MAX_BODY_SIZE);
        assert_eq!(config.transport, TransportSecurity::TlsOnly);
    }

    #[test]
    fn deserialize_rejects_bad_duration() {
        let err = serde_json::from_str::<HttpClientConfig>(r#"{"request_timeout": "soon"}"#)
            .unwrap_err();
        assert!(err.to_string().contains("a duration"));
    }

    #[test]
    fn deserialize_rejects_unknown_keys() {
        assert!(serde_json::from_str::<HttpClientConfig>(r#"{"retries": 3}"#).is_err());
    }
}
