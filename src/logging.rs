use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

const DEFAULT_LEVEL: &str = "info";

/// Base level from `RUST_LOG` (or `info`), with the HTTP stack pinned to warn
/// so request internals do not drown the sync layer's own events.
fn build_env_filter() -> Result<EnvFilter> {
    let level = std::env::var("RUST_LOG")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LEVEL.to_string());

    let mut directives = vec![level];
    for (target, lvl) in [("reqwest", "warn"), ("hyper", "warn"), ("rustls", "warn")] {
        directives.push(format!("{target}={lvl}"));
    }

    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|e| anyhow::anyhow!("invalid tracing filter '{filter_str}': {e}"))
}

/// Installs the global subscriber. Output goes to the configured log file
/// because the terminal UI owns stdout.
pub fn init(config: &AppConfig) -> Result<()> {
    if let Some(parent) = config.log_file.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context("create log directory")?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("open log file {}", config.log_file.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter()?)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("install tracing subscriber: {e}"))?;

    tracing::debug!(file = %config.log_file.display(), "logging initialized");
    Ok(())
}
