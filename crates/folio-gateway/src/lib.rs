#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod service;

pub mod request;
pub mod response;

#[cfg(feature = "reqwest")]
#[cfg_attr(docsrs, doc(cfg(feature = "reqwest")))]
pub mod reqwest;

pub use folio_core::{Error, ErrorKind, Result};
pub use request::{
    ChatRequest, ChatRequestBuilder, EmbeddingRequest, EncodingFormat, GenerationOptions,
    ResponseFormat,
};
pub use response::JsonResponse;
pub use service::GatewayService;

/// Tracing target for gateway operations.
pub const TRACING_TARGET: &str = "folio_gateway::service";

/// Core trait for model gateway operations.
///
/// Implement this trait to plug a different transport (or a test double) in
/// behind [`GatewayService`]. Implementations must issue exactly one upstream
/// call per invocation and must not retry.
#[async_trait::async_trait]
pub trait GatewayProvider: Send + Sync {
    /// Sends one chat completion and returns the raw assistant text.
    async fn chat(&self, request: &ChatRequest) -> Result<String>;

    /// Requests one embedding vector for the given input.
    async fn embed(&self, request: &EmbeddingRequest) -> Result<Vec<f32>>;
}
