//! Gateway provider selection.

use anyhow::Context;
use folio_gateway::GatewayService;
use folio_gateway::reqwest::ReqwestGateway;

use super::Cli;

/// Creates the gateway service from CLI configuration.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be initialized.
pub fn create_gateway(cli: &Cli) -> anyhow::Result<GatewayService> {
    #[cfg(feature = "mock")]
    if cli.mock {
        let mock = folio_test::MockGateway::from_config(cli.mock_config.clone());
        return Ok(mock.into_service());
    }

    let client =
        ReqwestGateway::new(cli.gateway.clone()).context("failed to create gateway client")?;
    Ok(client.into_service())
}
