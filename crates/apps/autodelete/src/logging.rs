//! Log file setup
//!
//! Routes the `log` facade to an append-only text file, one line per event:
//! `timestamp:target:message`.

use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Install env_logger writing to `path`
///
/// The filter comes from `RUST_LOG` and defaults to `info`.
pub fn init(path: &Path) -> Result<()> {
    let file = open_log_file(path)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{}:{}:{}",
                buf.timestamp_millis(),
                record.target(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init()
        .context("Failed to install logger")
}

/// Open the log file for appending, creating it and its directory if needed
fn open_log_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file: {}", path.display()))
}
