use std::io::IsTerminal as _;

use anyhow::Context as _;

const DEFAULT_DIRECTIVE: &str = "info";

pub fn init() -> anyhow::Result<()> {
    init_with_default(DEFAULT_DIRECTIVE)
}

/// Installs the stderr subscriber; `RUST_LOG` overrides `directive`.
///
/// Colors are off when stderr is redirected, so batch runs can be logged to
/// a file as plain text.
pub fn init_with_default(directive: &str) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(directive))
        .context("build log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("initialize tracing subscriber: {err}"))?;

    Ok(())
}
