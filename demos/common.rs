//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization
//! - Graceful exit handling

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Path Helpers
// ============================================================================

/// Default settings file under the user's config directory.
pub fn default_settings_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dfs-capture")
        .join("settings.json")
}

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone, Default)]
pub struct Args {
    pub debug: bool,
    pub no_wait: bool,
    pub endpoint: Option<String>,
    pub settings: Option<PathBuf>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub tags: String,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// Flags take no value; options take the next argument.
    pub fn parse() -> Self {
        let mut parsed = Self::default();
        let mut args = std::env::args().skip(1);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--debug" => parsed.debug = true,
                "--no-wait" => parsed.no_wait = true,
                "--endpoint" => parsed.endpoint = args.next(),
                "--settings" => parsed.settings = args.next().map(PathBuf::from),
                "--url" => parsed.url = args.next(),
                "--title" => parsed.title = args.next(),
                "--tags" => parsed.tags = args.next().unwrap_or_default(),
                other => eprintln!("[Args] Ignoring unknown argument: {other}"),
            }
        }

        parsed
    }

    /// Settings file to use.
    pub fn settings_path(&self) -> PathBuf {
        self.settings.clone().unwrap_or_else(default_settings_path)
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "dfs_capture=debug"
    } else {
        "dfs_capture=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Wait for Ctrl+C or skip if `--no-wait` flag is set.
pub async fn wait_for_exit(no_wait: bool) {
    if no_wait {
        println!("[--no-wait] Skipping wait");
        return;
    }

    println!("Press Ctrl+C to exit...");
    tokio::signal::ctrl_c().await.ok();
}
