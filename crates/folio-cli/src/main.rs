#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod document;

use std::process;

use anyhow::Context;
use folio_agents::{Workflow, WorkflowResult};

use crate::config::{Cli, create_gateway};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "folio_cli::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "folio_cli::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "folio_cli::config";
pub const TRACING_TARGET_INPUT: &str = "folio_cli::input";

/// Exit status when the result fails the quality gate under `--fail-on-invalid`.
const EXIT_INVALID: i32 = 2;

#[tokio::main]
async fn main() {
    let error = match run().await {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(EXIT_INVALID),
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %error,
            "folio terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
///
/// Returns false when the result failed the quality gate and the caller
/// asked for a failing exit status.
async fn run() -> anyhow::Result<bool> {
    let cli = Cli::init();
    cli.init_tracing();
    cli.log();
    cli.validate()?;

    let input = document::load(&cli.input, cli.title.as_deref(), cli.slug.as_deref()).await?;
    let gateway = create_gateway(&cli)?;
    let workflow = Workflow::new(gateway, cli.workflow_config());

    let result = workflow.run(input).await.context("workflow failed")?;
    write_result(&cli, &result).await?;

    tracing::info!(
        target: TRACING_TARGET_SHUTDOWN,
        run_id = %result.run_id,
        quality_score = result.quality_score(),
        is_valid = result.is_valid(),
        elapsed_ms = result.total_processing_time,
        "Done"
    );

    Ok(result.is_valid() || !cli.fail_on_invalid)
}

/// Writes the result as JSON to the output file or stdout.
async fn write_result(cli: &Cli, result: &WorkflowResult) -> anyhow::Result<()> {
    let mut json = if cli.pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
    .context("failed to serialize result")?;
    json.push('\n');

    match &cli.output {
        Some(path) => tokio::fs::write(path, json)
            .await
            .with_context(|| format!("failed to write result to '{}'", path.display())),
        None => {
            use tokio::io::AsyncWriteExt;

            let mut stdout = tokio::io::stdout();
            stdout.write_all(json.as_bytes()).await?;
            stdout.flush().await.context("failed to write result")
        }
    }
}
