// Tracing setup shared by all subcommands

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// `training_output_<YYYYmmdd_HHMMSS>.log` inside `dir`
pub fn log_file_name(dir: &Path) -> PathBuf {
    dir.join(format!(
        "training_output_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

/// Install stdout logging, mirrored into a fresh log file under `log_dir` when given.
///
/// Returns the log file path.
pub fn init(log_dir: Option<&Path>) -> Result<Option<PathBuf>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout = fmt::layer().with_target(false);

    let Some(dir) = log_dir else {
        tracing_subscriber::registry().with(filter).with(stdout).init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
    let path = log_file_name(dir);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let file_layer = fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout)
        .with(file_layer)
        .init();
    Ok(Some(path))
}
