//! Structured decoding of model replies.

use serde::de::{DeserializeOwned, IgnoredAny};
use validator::Validate;

use crate::{Error, Result};

/// Decoder for JSON replies.
///
/// Models asked for JSON still occasionally wrap it in a fenced block or add
/// a sentence of prose around it. [`JsonResponse::extract`] finds the JSON
/// payload; [`JsonResponse::decode`] parses it into `T` and runs the
/// `validator` rules declared on `T`. Both steps share one failure kind,
/// [`ErrorKind::InvalidResponse`](crate::ErrorKind::InvalidResponse).
pub struct JsonResponse;

impl JsonResponse {
    /// Extracts the JSON payload from a reply, stripping markdown fences and prose.
    ///
    /// A reply that already is a JSON document is returned as is, so fences
    /// inside string values are left alone.
    pub fn extract(reply: &str) -> &str {
        let trimmed = reply.trim();
        if serde_json::from_str::<IgnoredAny>(trimmed).is_ok() {
            return trimmed;
        }

        if let Some(start) = reply.find("```json") {
            let after_marker = &reply[start + 7..];
            if let Some(end) = after_marker.find("```") {
                return after_marker[..end].trim();
            }
        }

        if let Some(start) = reply.find("```") {
            let after_marker = &reply[start + 3..];
            let content_start = after_marker.find('\n').map(|i| i + 1).unwrap_or(0);
            let body = &after_marker[content_start..];
            if let Some(end) = body.find("```") {
                return body[..end].trim();
            }
        }

        let start = trimmed.find(['{', '[']);
        let end = trimmed.rfind(['}', ']']).map(|i| i + 1);

        match (start, end) {
            (Some(start), Some(end)) if start < end => &trimmed[start..end],
            _ => trimmed,
        }
    }

    /// Parses a reply into `T` and validates it.
    pub fn decode<T>(reply: &str) -> Result<T>
    where
        T: DeserializeOwned + Validate,
    {
        let payload = Self::extract(reply);
        if payload.is_empty() {
            return Err(Error::invalid_response().with_message("empty reply"));
        }

        let value: T = serde_json::from_str(payload).map_err(|e| {
            Error::invalid_response()
                .with_message(format!("reply is not the expected JSON shape: {e}"))
                .with_source(e)
        })?;

        value.validate().map_err(|e| {
            Error::invalid_response()
                .with_message(format!("reply failed validation: {e}"))
                .with_source(e)
        })?;

        Ok(value)
    }
}
