use anyhow::{Context, Result};

use matchflow_sdk::Environment;

/// Execute the `stats` command: print engine workload statistics.
pub async fn execute(env: &Environment) -> Result<()> {
    let engine = env.engine();
    let stats = tokio::task::spawn_blocking(move || engine.stats())
        .await
        .context("stats task panicked")?
        .context("failed to fetch engine stats")?;

    let parsed: serde_json::Value =
        serde_json::from_str(&stats).context("engine returned unparseable stats")?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);
    Ok(())
}
