//! The model-or-fallback combinator shared by every chat unit.

use std::future::Future;

use super::TRACING_TARGET;
use crate::{Generated, Result, Unit};

/// Awaits `primary`; on any error, logs it and computes `fallback` instead.
///
/// `primary` covers the whole model path: request construction, the gateway
/// call, decoding, validation and post-processing. `fallback` must be
/// deterministic and must not fail.
pub async fn with_fallback<T, P, F>(unit: Unit, primary: P, fallback: F) -> Generated<T>
where
    P: Future<Output = Result<T>>,
    F: FnOnce() -> T,
{
    match primary.await {
        Ok(value) => {
            tracing::debug!(target: TRACING_TARGET, unit = %unit, "Unit produced model output");
            Generated::model(value)
        }
        Err(error) => {
            tracing::warn!(
                target: TRACING_TARGET,
                unit = %unit,
                kind = error.kind_str(),
                error = %error,
                "Unit failed, using deterministic fallback"
            );
            Generated::fallback(fallback())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Provenance};

    #[tokio::test]
    async fn test_success_is_model() {
        let generated = with_fallback(Unit::Summary, async { Ok(1) }, || 2).await;
        assert_eq!(generated.value, 1);
        assert_eq!(generated.provenance, Provenance::Model);
    }

    #[tokio::test]
    async fn test_error_is_fallback() {
        let generated = with_fallback(
            Unit::Seo,
            async { Err::<i32, _>(Error::timeout()) },
            || 2,
        )
        .await;
        assert_eq!(generated.value, 2);
        assert_eq!(generated.provenance, Provenance::Fallback);
    }

    #[tokio::test]
    async fn test_fallback_not_called_on_success() {
        let generated = with_fallback(Unit::Tags, async { Ok("model") }, || -> &str {
            panic!("fallback must not run")
        })
        .await;
        assert_eq!(generated.value, "model");
    }
}
