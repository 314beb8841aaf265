use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "radar.log";

pub enum LogTarget {
    Stderr,
    /// The interactive view owns the terminal, so it logs to a file.
    File(PathBuf),
}

pub fn log_file_path() -> Result<PathBuf> {
    Ok(radar::storage::data_dir()?.join(LOG_FILE))
}

/// `RUST_LOG` wins over `level`; `verbose` wins over both. A second call is a
/// no-op.
pub fn init(level: &str, verbose: bool, target: LogTarget) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false);
    let installed = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating log directory {:?}", parent))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("opening log file {:?}", path))?;
            builder.with_writer(Mutex::new(file)).try_init()
        }
    };
    if installed.is_ok() {
        tracing::debug!(version = env!("CARGO_PKG_VERSION"), "logging initialized");
    }
    Ok(())
}
