//! Mock implementations of the model gateway for testing.
//!
//! Nothing in this module touches the network; replies are scripted per
//! model identifier and embeddings are derived from the input text.

mod embedding;
mod gateway;

pub use embedding::mock_embedding;
pub use gateway::{MockGateway, MockGatewayConfig};
