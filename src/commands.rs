// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One-shot commands.
//!
//! Each command maps to one remote call or a short fixed sequence of calls,
//! prints its result and returns. Missing or malformed arguments print a
//! usage line and make no call; an unknown command prints the command list.

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::check::{print_online_check, POLL_INTERVAL};
use crate::format::{format_size, pad_display};
use crate::i18n::tr;
use crate::remote::RemoteClient;
use crate::types::{Destination, DownloadInfo, PackageData};

/// Command synopsis and description, in listing order.
pub const COMMANDS: [(&str, &str); 16] = [
    ("status", "Prints server status"),
    ("queue", "Prints downloads in queue"),
    ("collector", "Prints downloads in collector"),
    ("add <name> <link1> <link2>...", "Adds package to queue"),
    ("add_coll <name> <link1> <link2>...", "Adds package to collector"),
    ("del_file <fid> <fid2>...", "Delete Files from Queue/Collector"),
    ("del_package <pid> <pid2>...", "Delete Packages from Queue/Collector"),
    ("move <pid> <pid2>...", "Move Packages from Queue to Collector or vice versa"),
    ("restart_file <fid> <fid2>...", "Restart files"),
    ("restart_package <pid> <pid2>...", "Restart packages"),
    ("check <container|url> ...", "Check online status, works with local container"),
    ("check_container path", "Checks online status of a container file"),
    ("pause", "Pause the server"),
    ("unpause", "continue downloads"),
    ("toggle", "Toggle pause/unpause"),
    ("kill", "kill server"),
];

/// Write the command listing.
pub fn print_commands<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out, "{}", tr("List of commands:"))?;
    writeln!(out)?;
    for (synopsis, description) in COMMANDS {
        writeln!(out, "{:<35} {}", synopsis, tr(description))?;
    }
    Ok(())
}

/// `#fid name Status: msg Size: size`, the first line of a `status` entry.
pub fn status_line(download: &DownloadInfo) -> String {
    format!(
        "#{:<6} {} Status: {} Size: {}",
        download.fid,
        pad_display(&download.name, 40),
        pad_display(&download.statusmsg, 10),
        download.format_size
    )
}

/// Runs one-shot commands against a connected core.
pub struct CommandDispatcher<'a, W: Write> {
    client: &'a dyn RemoteClient,
    out: W,
    workdir: PathBuf,
    poll_interval: Duration,
}

impl<'a, W: Write> CommandDispatcher<'a, W> {
    pub fn new(client: &'a dyn RemoteClient, out: W) -> Self {
        Self {
            client,
            out,
            workdir: PathBuf::from("."),
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Directory `check_container` paths are resolved against.
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = dir.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run `command` with `args`.
    pub fn run(&mut self, command: &str, args: &[String]) -> Result<()> {
        tracing::info!(command, args = args.len(), "running command");
        match command {
            "status" => self.status(),
            "queue" => {
                let packages = self.client.get_queue_data()?;
                self.print_packages(&packages)
            }
            "collector" => {
                let packages = self.client.get_collector_data()?;
                self.print_packages(&packages)
            }
            "add" => self.add(command, args, Destination::Queue),
            "add_coll" => self.add(command, args, Destination::Collector),
            "del_file" => self.with_ids(command, args, "<fid> <fid2> ...", |client, ids| {
                client.delete_files(ids)?;
                Ok(tr("Files deleted."))
            }),
            "del_package" => self.with_ids(command, args, "<pid> <pid2> ...", |client, ids| {
                client.delete_packages(ids)?;
                Ok(tr("Packages deleted."))
            }),
            "move" => self.with_ids(command, args, "<pid> <pid2> ...", |client, ids| {
                for pid in ids {
                    // Read then write: a move racing with another client can
                    // toggle from a stale destination.
                    let package = client.get_package_info(*pid)?;
                    client.move_package(package.dest.toggled(), package.pid)?;
                }
                Ok(tr("Packages moved."))
            }),
            "restart_file" => self.with_ids(command, args, "<fid> <fid2> ...", |client, ids| {
                for fid in ids {
                    client.restart_file(*fid)?;
                }
                Ok(tr("Files restarted."))
            }),
            "restart_package" => self.with_ids(command, args, "<pid> <pid2> ...", |client, ids| {
                for pid in ids {
                    client.restart_package(*pid)?;
                }
                Ok(tr("Packages restarted."))
            }),
            "check" => self.check(command, args),
            "check_container" => self.check_container(command, args),
            "pause" => {
                self.client.pause_server()?;
                self.confirm(tr("Server paused."))
            }
            "unpause" => {
                self.client.unpause_server()?;
                self.confirm(tr("Server unpaused."))
            }
            "toggle" => {
                let paused = self.client.toggle_pause()?;
                self.confirm(if paused { tr("Server paused.") } else { tr("Server unpaused.") })
            }
            "kill" => {
                self.client.kill()?;
                self.confirm(tr("pyLoad was terminated"))
            }
            other => {
                tracing::debug!(command = other, "unknown command");
                print_commands(&mut self.out)?;
                Ok(())
            }
        }
    }

    fn confirm(&mut self, message: &str) -> Result<()> {
        writeln!(self.out, "{} {}", "[+]".green(), message)?;
        Ok(())
    }

    fn usage(&mut self, command: &str, synopsis: &str) -> Result<()> {
        writeln!(
            self.out,
            "{} {} {} {}",
            "[!]".yellow(),
            tr("Please use this syntax:"),
            command,
            synopsis
        )?;
        Ok(())
    }

    fn status(&mut self) -> Result<()> {
        let downloads = self.client.status_downloads()?;
        if downloads.is_empty() {
            writeln!(self.out, "{}", tr("No downloads running."))?;
        }
        for download in &downloads {
            writeln!(self.out, "{}", status_line(download))?;
            if download.is_downloading() {
                writeln!(
                    self.out,
                    "\tDownloading: {} @ {}/s\t {} ({}%)",
                    download.eta_display(),
                    format_size(download.speed),
                    format_size(download.done()),
                    download.percent
                )?;
            } else if download.is_waiting() {
                writeln!(self.out, "\tWaiting: {}", download.format_wait)?;
            }
        }
        Ok(())
    }

    fn print_packages(&mut self, packages: &[PackageData]) -> Result<()> {
        for package in packages {
            writeln!(self.out, "Package {} (#{}):", package.name, package.pid)?;
            for file in &package.links {
                writeln!(
                    self.out,
                    "\t#{:<6} {} {} {}",
                    file.fid,
                    pad_display(&file.name, 30),
                    pad_display(&file.statusmsg, 10),
                    pad_display(&file.plugin, 8)
                )?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn add(&mut self, command: &str, args: &[String], dest: Destination) -> Result<()> {
        let [name, links @ ..] = args else {
            return self.usage(command, "<Package name> <link> <link2> ...");
        };
        if links.is_empty() {
            return self.usage(command, "<Package name> <link> <link2> ...");
        }
        let pid = self.client.add_package(name, links, dest)?;
        tracing::info!(pid, %dest, links = links.len(), "package added");
        self.confirm(tr("Package added."))
    }

    /// Parse `args` as ids and hand them to `action`; any missing or
    /// non-numeric id prints the usage line instead.
    fn with_ids<F>(&mut self, command: &str, args: &[String], synopsis: &str, action: F) -> Result<()>
    where
        F: FnOnce(&dyn RemoteClient, &[i64]) -> Result<&'static str>,
    {
        let Some(ids) = parse_ids(args) else {
            return self.usage(command, synopsis);
        };
        let message = action(self.client, &ids)?;
        self.confirm(message)
    }

    fn check(&mut self, command: &str, args: &[String]) -> Result<()> {
        if args.is_empty() {
            return self.usage(command, "<container|url> ...");
        }
        writeln!(self.out, "{}", tr("Checking %d links:").replace("%d", &args.len().to_string()))?;
        writeln!(self.out)?;
        let job = self.client.check_online_status(args)?;
        print_online_check(self.client, job.rid, &mut self.out, self.poll_interval)?;
        Ok(())
    }

    fn check_container(&mut self, command: &str, args: &[String]) -> Result<()> {
        let Some(arg) = args.first() else {
            return self.usage(command, "path");
        };
        let path = self.workdir.join(arg);
        if !path.is_file() {
            writeln!(self.out, "{} {}", "[!]".yellow(), tr("File does not exist."))?;
            return Ok(());
        }
        let data = std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let job = self
            .client
            .check_online_status_container(&[], &file_name(&path), &data)?;
        print_online_check(self.client, job.rid, &mut self.out, self.poll_interval)?;
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// All of `args` as ids, or `None` when there are none or one is not a number.
pub fn parse_ids(args: &[String]) -> Option<Vec<i64>> {
    if args.is_empty() {
        return None;
    }
    args.iter().map(|arg| arg.trim().parse().ok()).collect()
}
