use crate::error::HttpError;
use http::header::{AUTHORIZATION, HeaderName, USER_AGENT};
use http::{HeaderValue, Request};
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::credentials::Credentials;

/// Tower layer that inserts a fixed header when the request lacks it.
///
/// With no value configured the layer is a pass-through, which lets the
/// builder stack it unconditionally for optional credentials.
#[derive(Clone, Debug)]
pub struct SetHeaderLayer {
    name: HeaderName,
    value: Option<HeaderValue>,
}

impl SetHeaderLayer {
    #[must_use]
    pub fn new(name: HeaderName, value: Option<HeaderValue>) -> Self {
        Self { name, value }
    }

    /// `User-Agent` layer.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidHeaderValue` if the string is not a valid header value
    pub fn user_agent(user_agent: impl AsRef<str>) -> Result<Self, HttpError> {
        let value = HeaderValue::from_str(user_agent.as_ref())?;
        Ok(Self::new(USER_AGENT, Some(value)))
    }

    /// `Authorization` layer for the given credentials.
    ///
    /// # Errors
    /// Returns `HttpError::InvalidHeaderValue` if a token is not a valid header value
    pub fn authorization(credentials: &Credentials) -> Result<Self, HttpError> {
        Ok(Self::new(AUTHORIZATION, credentials.authorization_header()?))
    }
}

impl<S> Layer<S> for SetHeaderLayer {
    type Service = SetHeaderService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        SetHeaderService {
            inner,
            name: self.name.clone(),
            value: self.value.clone(),
        }
    }
}

/// Service created by [`SetHeaderLayer`]
#[derive(Clone, Debug)]
pub struct SetHeaderService<S> {
    inner: S,
    name: HeaderName,
    value: Option<HeaderValue>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for SetHeaderService<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        if let Some(value) = &self.value
            && !req.headers().contains_key(&self.name)
        {
            req.headers_mut().insert(self.name.clone(), value.clone());
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{HeaderMap, Method};
    use http_body_util::Full;
    use tower::ServiceExt;

    /// Echoes the request headers back as the response.
    #[derive(Clone)]
    struct EchoHeaders;

    impl Service<Request<Full<Bytes>>> for EchoHeaders {
        type Response = HeaderMap;
        type Error = std::convert::Infallible;
        type Future = std::future::Ready<Result<Self::Response, Self::Error>>;

        fn poll_ready(&mut self, _: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: Request<Full<Bytes>>) -> Self::Future {
            std::future::ready(Ok(req.headers().clone()))
        }
    }

    fn request(extra: Option<(HeaderName, &'static str)>) -> Request<Full<Bytes>> {
        let mut builder = Request::builder()
            .method(Method::GET)
            .uri("http://grafana.local/api/health");
        if let Some((name, value)) = extra {
            builder = builder.header(name, value);
        }
        builder.body(Full::new(Bytes::new())).unwrap()
    }

    #[tokio::test]
    async fn user_agent_added() {
        let service = SetHeaderLayer::user_agent("test-agent/1.0")
            .unwrap()
            .layer(EchoHeaders);
        let headers = service.oneshot(request(None)).await.unwrap();
        assert_eq!(headers.get(USER_AGENT).unwrap(), "test-agent/1.0");
    }

    #[tokio::test]
    async fn existing_header_not_overwritten() {
        let service = SetHeaderLayer::user_agent("test-agent/1.0")
            .unwrap()
            .layer(EchoHeaders);
        let headers = service
            .oneshot(request(Some((USER_AGENT, "custom-agent/2.0"))))
            .await
            .unwrap();
        assert_eq!(headers.get(USER_AGENT).unwrap(), "custom-agent/2.0");
    }

    #[tokio::test]
    async fn authorization_from_credentials() {
        let service = SetHeaderLayer::authorization(&Credentials::bearer("glsa_1"))
            .unwrap()
            .layer(EchoHeaders);
        let headers = service.oneshot(request(None)).await.unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer glsa_1");
    }

    #[tokio::test]
    async fn no_credentials_is_pass_through() {
        let service = SetHeaderLayer::authorization(&Credentials::None)
            .unwrap()
            .layer(EchoHeaders);
        let headers = service.oneshot(request(None)).await.unwrap();
        assert!(!headers.contains_key(AUTHORIZATION));
    }

    #[test]
    fn invalid_user_agent_rejected() {
        let result = SetHeaderLayer::user_agent("invalid\x00agent");
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }
}
