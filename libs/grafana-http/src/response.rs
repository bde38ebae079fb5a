use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;

/// Maximum body preview kept in [`HttpError::HttpStatus`] (8 KiB).
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Boxed response body produced by the decompression layer.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// Status line and headers of a reply.
///
/// Handed back next to the body bytes so callers can inspect what the
/// transport saw; the admin facade ignores it.
#[derive(Debug, Clone)]
pub struct ResponseMeta {
    pub status: StatusCode,
    pub headers: HeaderMap,
}

impl ResponseMeta {
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Read a reply, turning any non-2xx status into [`HttpError::HttpStatus`].
///
/// Successful bodies are limited to `max_body_size` bytes. Error bodies are
/// read only up to the preview limit; an oversized error body does not hide
/// the status error.
pub(crate) async fn checked_body(
    response: Response<ResponseBody>,
    max_body_size: usize,
) -> Result<(Bytes, ResponseMeta), HttpError> {
    let (parts, body) = response.into_parts();
    let meta = ResponseMeta {
        status: parts.status,
        headers: parts.headers,
    };

    if !meta.status.is_success() {
        let preview_limit = max_body_size.min(ERROR_BODY_PREVIEW_LIMIT);
        let body_preview = match read_body_limited(body, preview_limit).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
            Err(e) => return Err(e),
        };

        return Err(HttpError::HttpStatus {
            status: meta.status,
            content_type: meta.content_type().map(str::to_owned),
            body_preview,
        });
    }

    let bytes = read_body_limited(body, max_body_size).await?;
    Ok((bytes, meta))
}

/// Collect a (decompressed) body, failing once more than `limit` bytes arrive.
pub(crate) async fn read_body_limited(body: ResponseBody, limit: usize) -> Result<Bytes, HttpError> {
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            let actual = collected.len() + chunk.len();
            if actual > limit {
                return Err(HttpError::BodyTooLarge { limit, actual });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}
