// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The pyLoad core as seen by this client.
//!
//! [`RemoteClient`] is the whole surface the dashboard and the one-shot
//! commands consume. [`HttpClient`] binds it to the core's JSON web API;
//! [`MockClient`] records calls and serves canned answers for tests.
//!
//! # Example
//!
//! ```no_run
//! use pyload_cli::remote::{HttpClient, RemoteClient};
//!
//! let client = HttpClient::connect("127.0.0.1", 7227, "admin", "secret")?;
//! for download in client.status_downloads()? {
//!     println!("{} {}%", download.name, download.percent);
//! }
//! # Ok::<(), pyload_cli::error::ClientError>(())
//! ```

pub mod http;
pub mod mock;

pub use http::HttpClient;
pub use mock::{Call, MockClient};

use crate::error::ClientResult;
use crate::types::{Destination, DownloadInfo, OnlineCheck, PackageData, ServerStatus};

/// Calls the client issues against the core.
///
/// Implementations are shared between the input loop and the refresh loop,
/// hence `Send + Sync`.
pub trait RemoteClient: Send + Sync {
    /// Files currently being processed, in core order.
    fn status_downloads(&self) -> ClientResult<Vec<DownloadInfo>>;

    fn status_server(&self) -> ClientResult<ServerStatus>;

    /// Flip the pause flag; returns the new paused state.
    fn toggle_pause(&self) -> ClientResult<bool>;

    fn pause_server(&self) -> ClientResult<()>;

    fn unpause_server(&self) -> ClientResult<()>;

    /// Shut the core down.
    fn kill(&self) -> ClientResult<()>;

    /// Drop the session. Never fails; the connection is going away anyway.
    fn close(&self);

    /// Create a package; returns its id.
    fn add_package(&self, name: &str, links: &[String], dest: Destination) -> ClientResult<i64>;

    fn get_queue_data(&self) -> ClientResult<Vec<PackageData>>;

    fn get_collector_data(&self) -> ClientResult<Vec<PackageData>>;

    /// Package with its file list.
    fn get_package_data(&self, pid: i64) -> ClientResult<PackageData>;

    /// Package without its file list.
    fn get_package_info(&self, pid: i64) -> ClientResult<PackageData>;

    fn delete_files(&self, fids: &[i64]) -> ClientResult<()>;

    fn delete_packages(&self, pids: &[i64]) -> ClientResult<()>;

    fn move_package(&self, dest: Destination, pid: i64) -> ClientResult<()>;

    fn restart_file(&self, fid: i64) -> ClientResult<()>;

    fn restart_package(&self, pid: i64) -> ClientResult<()>;

    /// Submit links for an online check; the result carries the job id.
    fn check_online_status(&self, urls: &[String]) -> ClientResult<OnlineCheck>;

    /// Submit a container file for an online check.
    fn check_online_status_container(
        &self,
        urls: &[String],
        filename: &str,
        data: &[u8],
    ) -> ClientResult<OnlineCheck>;

    /// Next batch of a check job; `rid == -1` marks the last one.
    fn poll_results(&self, rid: i64) -> ClientResult<OnlineCheck>;
}

/// Package list for a holding area.
pub fn packages_in(client: &dyn RemoteClient, dest: Destination) -> ClientResult<Vec<PackageData>> {
    match dest {
        Destination::Queue => client.get_queue_data(),
        Destination::Collector => client.get_collector_data(),
    }
}
