// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Human-readable sizes, durations and fixed-width columns.

use unicode_width::UnicodeWidthStr;

const SIZE_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

/// Format a byte count the way the core does, e.g. `1.50 MiB`.
///
/// Values are divided by 1024 while above 1000, so `1010` bytes reads
/// `0.99 KiB`.
pub fn format_size(bytes: i64) -> String {
    let mut size = bytes as f64;
    let mut step = 0;
    while size > 1000.0 && step < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        step += 1;
    }
    format!("{:.2} {}", size, SIZE_UNITS[step])
}

/// Format seconds as `HH:MM:SS`. Negative input reads as zero.
pub fn format_time(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

/// Strip ANSI escape codes, leaving the visible text. Tabs are kept.
pub fn strip_ansi(s: &str) -> String {
    // strip_str treats `\t` as a control byte and drops it.
    s.split('\t')
        .map(strip_ansi_escapes::strip_str)
        .collect::<Vec<_>>()
        .join("\t")
}

/// Calculate the display width of a string, accounting for ANSI escape codes
/// and wide characters.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(s).as_str())
}

/// Pad a string to a target display width so columns line up, even when it
/// carries color codes.
pub fn pad_display(s: &str, target_width: usize) -> String {
    let current_width = display_width(s);
    if current_width >= target_width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(target_width - current_width))
    }
}
