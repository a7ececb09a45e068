// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! File logging.
//!
//! The dashboard owns the terminal, so log records go to
//! `~/.pyload-cli/cli.log` instead of stderr. The level comes from
//! `PYLOAD_CLI_LOG` (an `EnvFilter` directive), `info` by default.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::config_dir;

pub const LOG_ENV: &str = "PYLOAD_CLI_LOG";
const LOG_FILE: &str = "cli.log";

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to `path`, appending. Returns false when the file cannot be opened
/// or a subscriber is already installed; the program runs on without logs.
pub fn init_logging_to(path: &Path) -> bool {
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(_) => return false,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .is_ok()
}

/// Log to the default file. Returns the path when logging is active.
pub fn init_logging() -> Option<PathBuf> {
    let path = config_dir().ok()?.join(LOG_FILE);
    init_logging_to(&path).then_some(path)
}
