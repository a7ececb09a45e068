// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Recording [`RemoteClient`] for tests.
//!
//! Serves canned data, records every call in order, and can be told to fail
//! a named method once or on every call.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::RemoteClient;
use crate::error::{ClientError, ClientResult};
use crate::locks::resilient_lock;
use crate::types::{Destination, DownloadInfo, OnlineCheck, PackageData, ServerStatus};

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    StatusDownloads,
    StatusServer,
    TogglePause,
    PauseServer,
    UnpauseServer,
    Kill,
    Close,
    AddPackage {
        name: String,
        links: Vec<String>,
        dest: Destination,
    },
    GetQueueData,
    GetCollectorData,
    GetPackageData(i64),
    GetPackageInfo(i64),
    DeleteFiles(Vec<i64>),
    DeletePackages(Vec<i64>),
    MovePackage {
        dest: Destination,
        pid: i64,
    },
    RestartFile(i64),
    RestartPackage(i64),
    CheckOnlineStatus(Vec<String>),
    CheckOnlineStatusContainer {
        urls: Vec<String>,
        filename: String,
        data: Vec<u8>,
    },
    PollResults(i64),
}

impl Call {
    /// Stable method name used by [`MockClient::fail`].
    pub fn method(&self) -> &'static str {
        match self {
            Self::StatusDownloads => "status_downloads",
            Self::StatusServer => "status_server",
            Self::TogglePause => "toggle_pause",
            Self::PauseServer => "pause_server",
            Self::UnpauseServer => "unpause_server",
            Self::Kill => "kill",
            Self::Close => "close",
            Self::AddPackage { .. } => "add_package",
            Self::GetQueueData => "get_queue_data",
            Self::GetCollectorData => "get_collector_data",
            Self::GetPackageData(_) => "get_package_data",
            Self::GetPackageInfo(_) => "get_package_info",
            Self::DeleteFiles(_) => "delete_files",
            Self::DeletePackages(_) => "delete_packages",
            Self::MovePackage { .. } => "move_package",
            Self::RestartFile(_) => "restart_file",
            Self::RestartPackage(_) => "restart_package",
            Self::CheckOnlineStatus(_) => "check_online_status",
            Self::CheckOnlineStatusContainer { .. } => "check_online_status_container",
            Self::PollResults(_) => "poll_results",
        }
    }
}

#[derive(Default)]
struct Canned {
    downloads: Vec<DownloadInfo>,
    server: ServerStatus,
    paused: bool,
    packages: Vec<PackageData>,
    check_rid: i64,
    batches: VecDeque<OnlineCheck>,
    next_pid: i64,
}

/// A hand-rolled mock implementing [`RemoteClient`].
#[derive(Default)]
pub struct MockClient {
    canned: Mutex<Canned>,
    calls: Mutex<Vec<Call>>,
    /// method -> (error, sticky)
    failures: Mutex<HashMap<&'static str, (ClientError, bool)>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_downloads(self, downloads: Vec<DownloadInfo>) -> Self {
        resilient_lock(&self.canned).downloads = downloads;
        self
    }

    pub fn with_server_status(self, status: ServerStatus) -> Self {
        {
            let mut canned = resilient_lock(&self.canned);
            canned.paused = status.pause;
            canned.server = status;
        }
        self
    }

    /// Packages served by the queue/collector/package calls, split by `dest`.
    pub fn with_packages(self, packages: Vec<PackageData>) -> Self {
        resilient_lock(&self.canned).packages = packages;
        self
    }

    /// Job id returned by the check submissions, then one batch per poll.
    pub fn with_check(self, rid: i64, batches: Vec<OnlineCheck>) -> Self {
        {
            let mut canned = resilient_lock(&self.canned);
            canned.check_rid = rid;
            canned.batches = batches.into();
        }
        self
    }

    /// Fail the next call to `method` with `err`.
    pub fn fail_once(&self, method: &'static str, err: ClientError) {
        resilient_lock(&self.failures).insert(method, (err, false));
    }

    /// Fail every call to `method` with `err`.
    pub fn fail(&self, method: &'static str, err: ClientError) {
        resilient_lock(&self.failures).insert(method, (err, true));
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<Call> {
        resilient_lock(&self.calls).clone()
    }

    /// Calls other than the status polls the dashboard issues every tick.
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::StatusDownloads | Call::StatusServer))
            .collect()
    }

    pub fn is_paused(&self) -> bool {
        resilient_lock(&self.canned).paused
    }

    fn record(&self, call: Call) -> ClientResult<()> {
        let method = call.method();
        resilient_lock(&self.calls).push(call);

        let mut failures = resilient_lock(&self.failures);
        match failures.get(method).map(|(_, sticky)| *sticky) {
            None => Ok(()),
            Some(true) => Err(failures[&method].0.clone()),
            Some(false) => match failures.remove(method) {
                Some((err, _)) => Err(err),
                None => Ok(()),
            },
        }
    }

    fn package(&self, pid: i64) -> ClientResult<PackageData> {
        resilient_lock(&self.canned)
            .packages
            .iter()
            .find(|p| p.pid == pid)
            .cloned()
            .ok_or_else(|| ClientError::Remote(format!("package {} not found", pid)))
    }

    fn packages_at(&self, dest: Destination) -> Vec<PackageData> {
        resilient_lock(&self.canned)
            .packages
            .iter()
            .filter(|p| p.dest == dest)
            .cloned()
            .collect()
    }
}

impl RemoteClient for MockClient {
    fn status_downloads(&self) -> ClientResult<Vec<DownloadInfo>> {
        self.record(Call::StatusDownloads)?;
        Ok(resilient_lock(&self.canned).downloads.clone())
    }

    fn status_server(&self) -> ClientResult<ServerStatus> {
        self.record(Call::StatusServer)?;
        let canned = resilient_lock(&self.canned);
        Ok(ServerStatus {
            pause: canned.paused,
            ..canned.server.clone()
        })
    }

    fn toggle_pause(&self) -> ClientResult<bool> {
        self.record(Call::TogglePause)?;
        let mut canned = resilient_lock(&self.canned);
        canned.paused = !canned.paused;
        Ok(canned.paused)
    }

    fn pause_server(&self) -> ClientResult<()> {
        self.record(Call::PauseServer)?;
        resilient_lock(&self.canned).paused = true;
        Ok(())
    }

    fn unpause_server(&self) -> ClientResult<()> {
        self.record(Call::UnpauseServer)?;
        resilient_lock(&self.canned).paused = false;
        Ok(())
    }

    fn kill(&self) -> ClientResult<()> {
        self.record(Call::Kill)
    }

    fn close(&self) {
        let _ = self.record(Call::Close);
    }

    fn add_package(&self, name: &str, links: &[String], dest: Destination) -> ClientResult<i64> {
        self.record(Call::AddPackage {
            name: name.to_string(),
            links: links.to_vec(),
            dest,
        })?;
        let mut canned = resilient_lock(&self.canned);
        canned.next_pid += 1;
        Ok(canned.next_pid)
    }

    fn get_queue_data(&self) -> ClientResult<Vec<PackageData>> {
        self.record(Call::GetQueueData)?;
        Ok(self.packages_at(Destination::Queue))
    }

    fn get_collector_data(&self) -> ClientResult<Vec<PackageData>> {
        self.record(Call::GetCollectorData)?;
        Ok(self.packages_at(Destination::Collector))
    }

    fn get_package_data(&self, pid: i64) -> ClientResult<PackageData> {
        self.record(Call::GetPackageData(pid))?;
        self.package(pid)
    }

    fn get_package_info(&self, pid: i64) -> ClientResult<PackageData> {
        self.record(Call::GetPackageInfo(pid))?;
        self.package(pid).map(|p| PackageData {
            links: Vec::new(),
            ..p
        })
    }

    fn delete_files(&self, fids: &[i64]) -> ClientResult<()> {
        self.record(Call::DeleteFiles(fids.to_vec()))
    }

    fn delete_packages(&self, pids: &[i64]) -> ClientResult<()> {
        self.record(Call::DeletePackages(pids.to_vec()))
    }

    fn move_package(&self, dest: Destination, pid: i64) -> ClientResult<()> {
        self.record(Call::MovePackage { dest, pid })?;
        let mut canned = resilient_lock(&self.canned);
        if let Some(pack) = canned.packages.iter_mut().find(|p| p.pid == pid) {
            pack.dest = dest;
        }
        Ok(())
    }

    fn restart_file(&self, fid: i64) -> ClientResult<()> {
        self.record(Call::RestartFile(fid))
    }

    fn restart_package(&self, pid: i64) -> ClientResult<()> {
        self.record(Call::RestartPackage(pid))
    }

    fn check_online_status(&self, urls: &[String]) -> ClientResult<OnlineCheck> {
        self.record(Call::CheckOnlineStatus(urls.to_vec()))?;
        Ok(OnlineCheck {
            rid: resilient_lock(&self.canned).check_rid,
            ..Default::default()
        })
    }

    fn check_online_status_container(
        &self,
        urls: &[String],
        filename: &str,
        data: &[u8],
    ) -> ClientResult<OnlineCheck> {
        self.record(Call::CheckOnlineStatusContainer {
            urls: urls.to_vec(),
            filename: filename.to_string(),
            data: data.to_vec(),
        })?;
        Ok(OnlineCheck {
            rid: resilient_lock(&self.canned).check_rid,
            ..Default::default()
        })
    }

    fn poll_results(&self, rid: i64) -> ClientResult<OnlineCheck> {
        self.record(Call::PollResults(rid))?;
        // An exhausted script reads as a finished job so loops always end.
        Ok(resilient_lock(&self.canned)
            .batches
            .pop_front()
            .unwrap_or(OnlineCheck {
                rid: crate::types::CHECK_FINISHED,
                ..Default::default()
            }))
    }
}
