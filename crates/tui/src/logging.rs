//! Logging setup.
//!
//! The terminal belongs to the UI, so logs go to a daily rolling file in the
//! data directory. The filter comes from `ZAPDESK_LOG` (default `info`).

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}

pub fn init(data_dir: &Path) -> Result<PathBuf> {
    let dir = log_dir(data_dir);
    std::fs::create_dir_all(&dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &dir, "zapdesk.log");
    let env_filter = EnvFilter::try_from_env("ZAPDESK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init()?;

    tracing::info!("zapdesk starting, logs in {}", dir.display());
    Ok(dir)
}
