use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for the CLI.
///
/// `RUST_LOG` wins when set. Otherwise `--log-level` is applied to the
/// matchflow crates while dependencies stay at `warn`, so progress and
/// milestone lines are not drowned out by runtime internals.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn default_directives(log_level: &str) -> String {
    format!("warn,matchflow={log_level},matchflow_engine={log_level},matchflow_sdk={log_level}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_cover_every_matchflow_crate() {
        let directives = default_directives("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("matchflow=debug"));
        assert!(directives.contains("matchflow_engine=debug"));
        assert!(directives.contains("matchflow_sdk=debug"));
    }
}
