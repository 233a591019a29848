//! Reqwest-based HTTP client for OpenRouter-compatible gateways.
//!
//! This module provides a reqwest-based implementation of the [`GatewayProvider`] trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_gateway::reqwest::{GatewayConfig, ReqwestGateway};
//! use folio_gateway::GatewayService;
//!
//! let config = GatewayConfig::new("sk-or-...");
//! let service: GatewayService = ReqwestGateway::new(config)?.into_service();
//! ```
//!
//! [`GatewayProvider`]: crate::GatewayProvider

mod client;
mod config;
mod error;
mod wire;

pub use client::ReqwestGateway;
pub use config::GatewayConfig;
pub use error::{Error, Result};

/// Tracing target for reqwest client operations.
pub const TRACING_TARGET: &str = "folio_gateway::reqwest";
