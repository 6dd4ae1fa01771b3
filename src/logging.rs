//! File-based tracing, enabled via GV_LOG=<path>.
//!
//! The terminal belongs to the TUI, so events are never written to stdout or
//! stderr. Filtering follows `RUST_LOG` (e.g. `RUST_LOG=gv=debug`).

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable naming the log file.
pub const LOG_ENV: &str = "GV_LOG";

/// Install the global subscriber if `GV_LOG` is set.
///
/// Returns the log path when logging was enabled.
pub fn init() -> anyhow::Result<Option<PathBuf>> {
    let Some(path) = std::env::var_os(LOG_ENV).map(PathBuf::from) else {
        return Ok(None);
    };

    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(EnvFilter::from_default_env())
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(Some(path))
}
