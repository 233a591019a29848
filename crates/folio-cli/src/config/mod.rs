//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── input, title, slug, output   # Document and result locations
//! ├── gateway: GatewayConfig        # API key, base URL, timeout
//! ├── models: ModelTable            # Model identifier per unit
//! ├── publisher: Publisher          # JSON-LD publisher identity
//! └── mock: MockGatewayConfig       # Scripted gateway (feature-gated)
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! folio article.md --pretty
//!
//! # Or via environment variables
//! OPENROUTER_API_KEY="sk-..." FOLIO_SUMMARY_MODEL="openai/gpt-4o" folio article.md
//! ```

mod provider;

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use folio_agents::{ModelTable, Publisher, WorkflowConfig};
use folio_gateway::reqwest::GatewayConfig;
pub use provider::create_gateway;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "folio")]
#[command(about = "Generate summaries, SEO metadata, tags, JSON-LD and embeddings for a markdown document")]
#[command(version)]
pub struct Cli {
    /// Markdown document to process, or `-` for stdin.
    pub input: PathBuf,

    /// Document title (defaults to the first `#` heading, then the file name).
    #[arg(long)]
    pub title: Option<String>,

    /// URL slug (defaults to the slugified title).
    #[arg(long)]
    pub slug: Option<String>,

    /// Write the result to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON result.
    #[arg(long)]
    pub pretty: bool,

    /// Emit logs as JSON lines.
    #[arg(long, env = "FOLIO_JSON_LOGS")]
    pub json_logs: bool,

    /// Exit with status 2 when the result fails the quality gate.
    #[arg(long)]
    pub fail_on_invalid: bool,

    /// Minimum quality score for a valid result (0-100).
    #[arg(
        long,
        env = "FOLIO_QUALITY_THRESHOLD",
        default_value_t = folio_agents::agent::QualityGate::default().threshold(),
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    pub quality_threshold: u8,

    /// Gateway connection configuration.
    #[clap(flatten)]
    pub gateway: GatewayConfig,

    /// Model identifier per unit.
    #[clap(flatten)]
    pub models: ModelTable,

    /// Publisher identity for structured data.
    #[clap(flatten)]
    pub publisher: Publisher,

    /// Use the scripted mock gateway instead of a remote one.
    #[cfg(feature = "mock")]
    #[arg(long)]
    pub mock: bool,

    /// Mock gateway configuration.
    #[cfg(feature = "mock")]
    #[clap(flatten)]
    pub mock_config: folio_test::MockGatewayConfig,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// This ensures .env files are loaded before clap parses arguments, so
    /// variables from .env are picked up as defaults.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing on stderr with environment-based filtering.
    ///
    /// Stdout is reserved for the JSON result.
    pub fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(filter);

        if self.json_logs {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    /// Returns the workflow configuration.
    pub fn workflow_config(&self) -> WorkflowConfig {
        WorkflowConfig::new()
            .with_models(self.models.clone())
            .with_publisher(self.publisher.clone())
            .with_quality_threshold(self.quality_threshold)
    }

    /// Returns true when the mock gateway was requested.
    pub fn use_mock(&self) -> bool {
        #[cfg(feature = "mock")]
        {
            self.mock
        }
        #[cfg(not(feature = "mock"))]
        {
            false
        }
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.use_mock() {
            self.gateway
                .validate()
                .context("invalid gateway configuration")?;
        }

        if self.publisher.site_url.trim().is_empty() {
            anyhow::bail!("site URL cannot be empty");
        }

        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            input = %self.input.display(),
            base_url = %self.gateway.base_url,
            timeout_secs = self.gateway.effective_timeout().as_secs(),
            mock = self.use_mock(),
            quality_threshold = self.quality_threshold,
            "Configuration"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            summary = %self.models.summary,
            seo = %self.models.seo,
            category = %self.models.category,
            tags = %self.models.tags,
            schema = %self.models.schema,
            image_prompt = %self.models.image_prompt,
            validator = %self.models.validator,
            embedding = %self.models.embedding,
            embedding_fallback = %self.models.embedding_fallback,
            "Model table"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [
            cfg!(feature = "dotenv").then_some("dotenv"),
            cfg!(feature = "mock").then_some("mock"),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["folio", "doc.md", "--gateway-api-key", "sk-test"]).unwrap();

        assert_eq!(cli.input, PathBuf::from("doc.md"));
        assert_eq!(cli.quality_threshold, 60);
        assert!(!cli.pretty);
        assert!(cli.validate().is_ok());

        let config = cli.workflow_config();
        assert_eq!(config.quality_threshold, 60);
        assert_eq!(config.publisher, Publisher::default());
    }

    #[test]
    fn test_threshold_range() {
        let result = Cli::try_parse_from([
            "folio",
            "doc.md",
            "--quality-threshold",
            "101",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let cli = Cli::try_parse_from(["folio", "doc.md", "--gateway-api-key", ""]).unwrap();
        if !cli.use_mock() {
            assert!(cli.validate().is_err());
        }
    }
}
