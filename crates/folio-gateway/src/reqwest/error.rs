//! Error types for the reqwest-based gateway client.

use thiserror::Error;

/// Result type alias for reqwest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Longest upstream error body kept in an error message.
const MAX_BODY_CHARS: usize = 300;

/// Error type for reqwest operations.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),
    /// The gateway answered with a non-2xx status.
    #[error("gateway returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },
    /// The gateway answered 2xx but the payload carried no usable result.
    #[error("gateway returned no result: {0}")]
    Empty(String),
}

impl Error {
    /// Creates a status error, truncating the upstream body.
    pub fn status(status: u16, body: &str) -> Self {
        Self::Status {
            status,
            body: folio_core::text::truncate_with_ellipsis(body.trim(), MAX_BODY_CHARS),
        }
    }
}

impl From<Error> for crate::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    crate::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    crate::Error::network_error()
                        .with_message("Connection failed")
                        .with_source(e)
                } else if e.is_decode() {
                    crate::Error::invalid_response()
                        .with_message(e.to_string())
                        .with_source(e)
                } else {
                    crate::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Status { status, ref body } => {
                let error = match status {
                    401 | 403 => crate::Error::authentication(),
                    408 => crate::Error::timeout(),
                    429 => crate::Error::rate_limited(),
                    500..=599 => crate::Error::service_unavailable(),
                    _ => crate::Error::external_error(),
                };
                error.with_message(format!("status {status}: {body}"))
            }
            Error::Empty(message) => crate::Error::invalid_response().with_message(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (401, ErrorKind::Authentication),
            (403, ErrorKind::Authentication),
            (408, ErrorKind::Timeout),
            (429, ErrorKind::RateLimited),
            (502, ErrorKind::ServiceUnavailable),
            (400, ErrorKind::ExternalError),
        ];

        for (status, kind) in cases {
            let error: crate::Error = Error::status(status, "nope").into();
            assert_eq!(error.kind, kind, "status {status}");
        }
    }

    #[test]
    fn test_status_body_is_truncated() {
        let body = "x".repeat(1000);
        let Error::Status { body, .. } = Error::status(500, &body) else {
            panic!("expected status error");
        };
        assert_eq!(body.chars().count(), MAX_BODY_CHARS);
    }

    #[test]
    fn test_empty_maps_to_invalid_response() {
        let error: crate::Error = Error::Empty("no choices".into()).into();
        assert_eq!(error.kind, ErrorKind::InvalidResponse);
    }
}
