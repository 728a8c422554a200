//! Turning HTTP responses into [`Error`] values.
//!
//! Google APIs report failures in a JSON body of one of these shapes:
//!
//! 1. `{"error": {"message": ..., "errors": [...], "details": [...]}}`
//! 2. `{"error": "invalid_token", "error_description": ...}` (OAuth endpoints)
//! 3. `[{"error": {...}}]` (streaming methods, first element is used)
//!
//! Whatever the body looks like, a non-2xx status always produces an error
//! carrying the status code, the headers and the raw body text.

use crate::error::{Error, ErrorItem};
use bytes::{Buf, Bytes};
use http::{HeaderMap, Response, StatusCode};
use http_body::Body;
use http_body_util::BodyExt;
use serde::Deserialize;
use serde_json::Value;

/// Maximum number of body bytes kept by [`check_media_response`] (1 MiB).
pub const MEDIA_ERROR_BODY_LIMIT: usize = 1 << 20;

/// Status code and headers of a successful API call.
///
/// Generated response types embed this so callers can inspect e.g. `ETag`
/// without keeping the raw response around.
#[derive(Debug, Clone, Default)]
pub struct ServerResponse {
    /// HTTP status code of the response
    pub http_status_code: StatusCode,
    /// Response headers
    pub header: HeaderMap,
}

impl ServerResponse {
    /// Captures status and headers of `response`.
    #[must_use]
    pub fn from_response<B>(response: &Response<B>) -> Self {
        Self {
            http_status_code: response.status(),
            header: response.headers().clone(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorReply {
    #[serde(default)]
    error: Option<ErrorReplyBody>,
}

#[derive(Deserialize)]
struct ErrorReplyBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Option<Vec<ErrorReplyItem>>,
    #[serde(default)]
    details: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct ErrorReplyItem {
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<ErrorReplyItem> for ErrorItem {
    fn from(item: ErrorReplyItem) -> Self {
        Self {
            reason: item.reason.unwrap_or_default(),
            message: item.message.unwrap_or_default(),
        }
    }
}

/// Decodes `body` into the structured part of an error reply.
///
/// Returns `None` when the body matches none of the known shapes or matches
/// one that carries no structured fields.
fn decode_error_reply(body: &[u8]) -> Option<ErrorReplyBody> {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        tracing::trace!(len = body.len(), "error body is not JSON");
        return None;
    };

    match &value {
        Value::Object(_) => {
            if let Ok(reply) = ErrorReply::deserialize(&value) {
                tracing::trace!("error body decoded as error object");
                reply.error
            } else {
                let oauth = value.get("error").is_some_and(Value::is_string);
                tracing::trace!(oauth, "error body has no structured error object");
                None
            }
        }
        Value::Array(replies) => {
            let first = replies.first().filter(|reply| reply.is_object())?;
            let reply = ErrorReply::deserialize(first).ok()?;
            tracing::trace!(count = replies.len(), "error body decoded as error array");
            reply.error
        }
        _ => None,
    }
}

fn error_from_body(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Error {
    let mut err = Error::new(status);
    err.header = headers.clone();

    if let Some(reply) = decode_error_reply(body) {
        err.message = reply.message.unwrap_or_default();
        err.errors = reply
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(ErrorItem::from)
            .collect();
        err.details = reply.details.unwrap_or_default();
    }

    err.body = String::from_utf8_lossy(body).into_owned();
    err
}

/// Checks `status` and decodes an already-read `body` into an [`Error`].
///
/// # Errors
///
/// Returns an [`Error`] for any status outside `200..=299`, even when `body`
/// is empty or not JSON.
pub fn check_response_with_body(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), Error> {
    if status.is_success() {
        return Ok(());
    }
    Err(error_from_body(status, headers, body))
}

/// Checks the status of `response`, draining its body on failure.
///
/// A 2xx response is handed back untouched so the caller can read its body.
/// Otherwise the body is read once to the end and decoded as by
/// [`check_response_with_body`]. If reading the body fails, the error keeps
/// whatever was read before the failure and wraps the read error.
///
/// # Errors
///
/// Returns an [`Error`] for any status outside `200..=299`.
pub async fn check_response<B>(response: Response<B>) -> Result<Response<B>, Error>
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    if response.status().is_success() {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let (bytes, read_error) = read_body(body, usize::MAX).await;

    let err = error_from_body(parts.status, &parts.headers, &bytes);
    Err(match read_error {
        Some(source) => err.wrap(source),
        None => err,
    })
}

/// Like [`check_response`] but for media downloads.
///
/// The body is not decoded; at most [`MEDIA_ERROR_BODY_LIMIT`] bytes of it are
/// kept in [`Error::body`].
///
/// # Errors
///
/// Returns an [`Error`] for any status outside `200..=299`.
pub async fn check_media_response<B>(response: Response<B>) -> Result<Response<B>, Error>
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    if response.status().is_success() {
        return Ok(response);
    }

    let (parts, body) = response.into_parts();
    let (bytes, _read_error) = read_body(body, MEDIA_ERROR_BODY_LIMIT).await;

    let mut err = Error::new(parts.status);
    err.header = parts.headers;
    err.body = String::from_utf8_lossy(&bytes).into_owned();
    Err(err)
}

/// Reads up to `limit` bytes of `body`, stopping early on a read error.
async fn read_body<B>(body: B, limit: usize) -> (Bytes, Option<B::Error>)
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    while let Some(frame) = body.frame().await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(error = %err, read = collected.len(), "failed to read error response body");
                return (Bytes::from(collected), Some(err));
            }
        };
        if let Ok(mut data) = frame.into_data() {
            while data.has_remaining() && collected.len() < limit {
                let chunk = data.chunk();
                let take = chunk.len().min(limit - collected.len());
                collected.extend_from_slice(&chunk[..take]);
                data.advance(take);
            }
        }
        if collected.len() >= limit {
            break;
        }
    }

    (Bytes::from(collected), None)
}
