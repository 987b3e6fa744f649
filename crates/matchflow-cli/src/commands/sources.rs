use anyhow::{Context, Result};

use matchflow_sdk::Environment;

/// Execute the `sources` command: register data sources, or list the
/// registered ones when no names are given.
pub async fn execute(env: &Environment, names: &[String]) -> Result<()> {
    let config = env.config();

    if !names.is_empty() {
        let names = names.to_vec();
        let registrar = config.clone();
        let config_id = tokio::task::spawn_blocking(move || registrar.register_data_sources(&names))
            .await
            .context("register task panicked")?
            .context("failed to register data sources")?;
        tracing::info!(config_id, "Data sources registered");
    }

    let lister = config.clone();
    let registered = tokio::task::spawn_blocking(move || lister.data_sources())
        .await
        .context("list task panicked")?
        .context("failed to list data sources")?;

    println!("Registered data sources:");
    for name in registered {
        println!("  {name}");
    }
    Ok(())
}
