use std::io::Write;

use anyhow::{Context, Result};

use matchflow_sdk::Environment;

/// Execute the `purge` command: remove every record and queued redo item.
///
/// Asks for typed confirmation unless `--force` was given; purging is
/// irreversible.
pub async fn execute(env: &Environment, force: bool) -> Result<()> {
    if !force && !confirm().await? {
        println!("Purge cancelled.");
        return Ok(());
    }

    let engine = env.engine();
    tokio::task::spawn_blocking(move || engine.purge_repository())
        .await
        .context("purge task panicked")?
        .context("failed to purge repository")?;

    tracing::info!("Repository purged");
    println!("Repository purged.");
    Ok(())
}

async fn confirm() -> Result<bool> {
    let answer = tokio::task::spawn_blocking(|| {
        print!(
            "This will remove every record, entity, and queued redo item. \
             Type YES to continue: "
        );
        std::io::stdout().flush()?;
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        Ok::<_, std::io::Error>(line)
    })
    .await
    .context("confirmation prompt task panicked")?
    .context("failed to read confirmation")?;

    Ok(answer.trim() == "YES")
}
