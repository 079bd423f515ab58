//! Reply normalization shared by both transports.

use serde_json::Value;
use tracing::debug;

use super::error::{FetchError, preview};
use super::transport::RawReply;

/// Turn a raw reply into JSON or a structured error.
///
/// A 2xx reply is parsed as JSON whatever its declared content type: the
/// endpoint sometimes labels JSON as `text/html`. A body that still fails
/// to parse becomes [`FetchError::NonJson`]. Non-2xx replies become
/// [`FetchError::Http`]. Bodies carried in errors are cut to 500 characters.
pub fn normalize_reply(reply: RawReply) -> Result<Value, FetchError> {
    if !(200..300).contains(&reply.status) {
        return Err(FetchError::Http {
            status: reply.status,
            body: preview(&reply.body),
        });
    }

    if !reply.content_type.contains("application/json") {
        debug!(
            content_type = %reply.content_type,
            len = reply.body.len(),
            "reply not labelled as JSON, parsing anyway"
        );
    }

    serde_json::from_str(&reply.body).map_err(|_| FetchError::NonJson {
        content_type: reply.content_type,
        raw_text: preview(&reply.body),
    })
}
