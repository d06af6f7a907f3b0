//! Shared test setup: tracing to console and an NDJSON log file.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//!     // ... exercise the tail; events show up when built with `--features tracing`
//! }
//! ```
//!
//! # Configuration
//!
//! Environment variables:
//! - `RUST_LOG`: Filter directives (e.g., `tailstore=debug,tailstore::alloc=trace`)
//! - `TAILSTORE_LOG_LEVEL`: Level used when `RUST_LOG` is unset (default: `info`)
//! - `TAILSTORE_LOG_DIR`: Log directory (default: `logs/`)
//! - `TAILSTORE_LOG_CONSOLE`: Set to "0" to disable console output
//!
//! # Log Files
//!
//! Events go to `logs/tailstore.jsonl`, one JSON object per line:
//!
//! ```bash
//! # Allocator activity for one block
//! cat logs/tailstore.jsonl | jq 'select(.fields.index == 16)'
//!
//! # Loader warnings
//! cat logs/tailstore.jsonl | jq 'select(.level == "WARN")'
//! ```

#![allow(dead_code)]

use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, Once};

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Ensures tracing is only initialized once per test binary.
static INIT: Once = Once::new();

/// Install the subscriber. Only the first call has an effect.
pub fn init_tracing() {
    INIT.call_once(setup_tracing);
}

/// Logging configuration for tests.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Directory for log files.
    pub log_dir: PathBuf,
    /// Log file name.
    pub log_file: String,
    /// Enable console output.
    pub console_enabled: bool,
    /// Level used if `RUST_LOG` is not set.
    pub default_level: Level,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            log_file: "tailstore.jsonl".to_string(),
            console_enabled: true,
            default_level: Level::INFO,
        }
    }
}

impl TracingConfig {
    /// Build the config from `TAILSTORE_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("TAILSTORE_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(level) = env::var("TAILSTORE_LOG_LEVEL")
            .ok()
            .and_then(|v| Level::from_str(&v).ok())
        {
            config.default_level = level;
        }
        if env::var("TAILSTORE_LOG_CONSOLE").is_ok_and(|v| v == "0") {
            config.console_enabled = false;
        }

        config
    }
}

fn make_filter(default_level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_str()))
}

fn setup_tracing() {
    let config = TracingConfig::from_env();

    // A missing log file only loses the file layer; tests still run.
    let file = std::fs::create_dir_all(&config.log_dir)
        .and_then(|()| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(config.log_dir.join(&config.log_file))
        })
        .ok();

    let console_layer = config.console_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .compact()
            .with_filter(make_filter(config.default_level))
    });

    let file_layer = file.map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(make_filter(config.default_level))
    });

    // try_init: another test binary helper may already have installed one
    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_init() {
        init_tracing();
        init_tracing();
        tracing::info!(index = 1, data = 42, "tracing initialized");
    }
}
