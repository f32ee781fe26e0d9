use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_subscriber::{prelude::*, EnvFilter};

pub const LOG_FILE: &str = "perplex.log";

pub fn log_file_path() -> Option<PathBuf> {
    crate::config::config_dir().map(|d| d.join(LOG_FILE))
}

/// Install the global subscriber when `RUST_LOG` is set. Returns whether
/// logging was enabled.
///
/// The TUI owns the terminal, so in that mode events go to a log file in the
/// config directory instead of stderr.
pub fn init(tui: bool) -> Result<bool> {
    if std::env::var("RUST_LOG").is_err() {
        return Ok(false);
    }
    let env_filter = EnvFilter::from_default_env();

    let init_result = if tui {
        let path = log_file_path().context("No config directory for the log file")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::sync::Arc::new(file))
            .with_ansi(false);
        tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
        tracing_subscriber::registry().with(env_filter).with(fmt_layer).try_init()
    };

    if let Err(err) = init_result {
        tracing::warn!(error = %err, "tracing already initialized");
    }
    Ok(true)
}
