// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Data returned by the pyLoad core.
//!
//! These are read-only projections: the client never mutates them locally,
//! every change is a call on the [`RemoteClient`](crate::remote::RemoteClient)
//! followed by a fresh read. Field names follow the core's JSON, so most
//! fields default when the core omits them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::format::format_time;

/// Job id the core returns once an online check has no more batches.
pub const CHECK_FINISHED: i64 = -1;

/// Holding area a package lives in on the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Destination {
    #[default]
    Queue = 0,
    Collector = 1,
}

impl Destination {
    /// The other holding area; applying it twice is the identity.
    pub fn toggled(self) -> Self {
        match self {
            Self::Queue => Self::Collector,
            Self::Collector => Self::Queue,
        }
    }
}

impl TryFrom<i64> for Destination {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Queue),
            1 => Ok(Self::Collector),
            other => Err(format!("invalid destination {}", other)),
        }
    }
}

impl From<Destination> for i64 {
    fn from(dest: Destination) -> Self {
        dest as i64
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queue => write!(f, "queue"),
            Self::Collector => write!(f, "collector"),
        }
    }
}

/// Lifecycle state of a single file, as numbered by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum FileStatus {
    Finished,
    Offline,
    Online,
    Queued,
    Skipped,
    Waiting,
    TempOffline,
    Starting,
    Failed,
    Aborted,
    Decrypting,
    Custom,
    Downloading,
    Processing,
    #[default]
    Unknown,
}

impl From<i32> for FileStatus {
    fn from(code: i32) -> Self {
        match code {
            0 => Self::Finished,
            1 => Self::Offline,
            2 => Self::Online,
            3 => Self::Queued,
            4 => Self::Skipped,
            5 => Self::Waiting,
            6 => Self::TempOffline,
            7 => Self::Starting,
            8 => Self::Failed,
            9 => Self::Aborted,
            10 => Self::Decrypting,
            11 => Self::Custom,
            12 => Self::Downloading,
            13 => Self::Processing,
            _ => Self::Unknown,
        }
    }
}

impl From<FileStatus> for i32 {
    fn from(status: FileStatus) -> Self {
        match status {
            FileStatus::Finished => 0,
            FileStatus::Offline => 1,
            FileStatus::Online => 2,
            FileStatus::Queued => 3,
            FileStatus::Skipped => 4,
            FileStatus::Waiting => 5,
            FileStatus::TempOffline => 6,
            FileStatus::Starting => 7,
            FileStatus::Failed => 8,
            FileStatus::Aborted => 9,
            FileStatus::Decrypting => 10,
            FileStatus::Custom => 11,
            FileStatus::Downloading => 12,
            FileStatus::Processing => 13,
            FileStatus::Unknown => 14,
        }
    }
}

/// One entry of `statusDownloads`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadInfo {
    pub fid: i64,
    pub name: String,
    /// Bytes per second.
    pub speed: i64,
    /// Seconds remaining.
    pub eta: i64,
    pub format_eta: String,
    /// Bytes left.
    pub bleft: i64,
    pub size: i64,
    pub format_size: String,
    pub percent: i32,
    pub status: FileStatus,
    pub statusmsg: String,
    pub format_wait: String,
    pub wait_until: i64,
    #[serde(rename = "packageID")]
    pub package_id: i64,
    #[serde(rename = "packageName")]
    pub package_name: String,
    pub plugin: String,
}

impl DownloadInfo {
    pub fn is_downloading(&self) -> bool {
        self.status == FileStatus::Downloading
    }

    pub fn is_waiting(&self) -> bool {
        self.status == FileStatus::Waiting
    }

    /// Core-formatted ETA, or one derived from `eta` when the core sent none.
    pub fn eta_display(&self) -> String {
        if self.format_eta.is_empty() {
            format_time(self.eta)
        } else {
            self.format_eta.clone()
        }
    }

    /// Bytes already transferred.
    pub fn done(&self) -> i64 {
        (self.size - self.bleft).max(0)
    }
}

/// Sum of `speed` over the entries that are actually downloading.
pub fn aggregate_speed(downloads: &[DownloadInfo]) -> i64 {
    downloads
        .iter()
        .filter(|d| d.is_downloading())
        .map(|d| d.speed)
        .sum()
}

/// Result of `statusServer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerStatus {
    pub pause: bool,
    pub active: i64,
    pub queue: i64,
    pub total: i64,
    pub speed: i64,
    pub download: bool,
    pub reconnect: bool,
}

/// A file inside a package.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileData {
    pub fid: i64,
    pub url: String,
    pub name: String,
    pub plugin: String,
    pub size: i64,
    pub format_size: String,
    pub status: FileStatus,
    pub statusmsg: String,
    #[serde(rename = "packageID")]
    pub package_id: i64,
    pub error: String,
    pub order: i64,
}

/// A package with its files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageData {
    pub pid: i64,
    pub name: String,
    pub folder: String,
    pub site: String,
    pub password: String,
    pub dest: Destination,
    pub order: i64,
    pub linksdone: i64,
    pub sizedone: i64,
    pub sizetotal: i64,
    pub linkstotal: i64,
    pub links: Vec<FileData>,
    pub fids: Vec<i64>,
}

/// Classification of one checked link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    Online,
    Offline,
    Unknown,
}

impl CheckResult {
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => Self::Online,
            1 => Self::Offline,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "Online"),
            Self::Offline => write!(f, "Offline"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Status of one link inside an online-check batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineStatus {
    pub name: String,
    pub plugin: String,
    pub packagename: String,
    pub status: i32,
    pub size: i64,
}

impl OnlineStatus {
    pub fn result(&self) -> CheckResult {
        CheckResult::from_code(self.status)
    }
}

/// A submitted check job or one poll batch of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OnlineCheck {
    pub rid: i64,
    /// Checked url -> status, in the order the core reported them.
    pub data: IndexMap<String, OnlineStatus>,
}

impl OnlineCheck {
    pub fn is_finished(&self) -> bool {
        self.rid == CHECK_FINISHED
    }
}
