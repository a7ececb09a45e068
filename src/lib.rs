// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! pyload-cli - terminal client for the pyLoad download manager
//!
//! Two ways in: one-shot commands that print and exit, and a live dashboard
//! that redraws download status every second while taking menu input.
//!
//! # Core Modules
//!
//! - [`remote`] - The core's API as a trait, its HTTP binding, and a mock
//! - [`session`] - Dashboard session: shared screen state, input and refresh loops
//! - [`menu`] - Main, add-package and file-manager menus
//! - [`commands`] - One-shot command dispatch
//! - [`check`] - Online-check polling
//! - [`screen`] - Row-addressed terminal output
//! - [`config`] - Preferences file
//! - [`error`] - Error kinds and consistent error formatting

pub mod check;
pub mod colors;
pub mod commands;
pub mod config;
pub mod error;
pub mod format;
pub mod i18n;
pub mod input;
pub mod locks;
pub mod logging;
pub mod menu;
pub mod remote;
pub mod screen;
pub mod session;
pub mod types;

pub use commands::CommandDispatcher;
pub use config::Preferences;
pub use error::{ClientError, ClientResult};
pub use input::InputEvent;
pub use remote::{HttpClient, MockClient, RemoteClient};
pub use screen::{MemoryScreen, ScreenBuffer, TerminalScreen};
pub use session::{Session, SessionEnd};
pub use types::{Destination, DownloadInfo, OnlineCheck, PackageData, ServerStatus};
