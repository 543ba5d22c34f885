use anyhow::Result;
use auriga::config::Config;
use auriga::registry::AccountRegistry;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config =
        Config::load().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    auriga::logging::init_logging(&config.logging)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Auriga Flitsmeister statistics bridge {} starting up",
        env!("APP_VERSION")
    );

    let mut registry = AccountRegistry::new();
    for account in &config.accounts {
        match registry.add_account(&config, account).await {
            Ok(integration) => info!(
                "Account {} set up with {} metrics",
                account.id,
                integration.views().len()
            ),
            Err(e) if e.is_authentication() => error!(
                "Account {} rejected by Flitsmeister, re-authentication required: {}",
                account.id, e
            ),
            Err(e) => error!("Account {} setup failed: {}", account.id, e),
        }
    }

    if registry.is_empty() {
        anyhow::bail!("No accounts could be set up; check configuration and credentials");
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    registry.shutdown();
    info!("Shutdown complete");
    Ok(())
}
