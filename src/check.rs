// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Online-check polling.
//!
//! After a check job is submitted, the core hands out results in batches.
//! The client polls at a fixed interval and prints every batch until a batch
//! arrives with the finished job id; that batch is printed too, then polling
//! stops. There is no backoff and no iteration cap.

use anyhow::Result;
use colored::Colorize;
use std::io::Write;
use std::thread;
use std::time::Duration;

use crate::format::{format_size, pad_display};
use crate::remote::RemoteClient;
use crate::types::{CheckResult, OnlineStatus};

/// Delay before each poll.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// One result line: name, size, plugin, classification.
pub fn format_check_line(status: &OnlineStatus) -> String {
    let result = status.result();
    let label = match result {
        CheckResult::Online => result.to_string().green(),
        CheckResult::Offline => result.to_string().red(),
        CheckResult::Unknown => result.to_string().yellow(),
    };
    format!(
        "{} {}\t {}\t {}",
        pad_display(&status.name, 45),
        pad_display(&format_size(status.size), 12),
        pad_display(&status.plugin, 15),
        label
    )
}

/// Poll job `rid` to completion, writing each batch to `out`.
/// Returns the number of batches received.
pub fn print_online_check<W: Write>(
    client: &dyn RemoteClient,
    rid: i64,
    out: &mut W,
    interval: Duration,
) -> Result<usize> {
    let mut batches = 0;
    loop {
        thread::sleep(interval);
        let batch = client.poll_results(rid)?;
        batches += 1;
        tracing::debug!(rid, batch = batches, entries = batch.data.len(), "check results polled");

        for status in batch.data.values() {
            writeln!(out, "{}", format_check_line(status))?;
        }

        if batch.is_finished() {
            return Ok(batches);
        }
    }
}
