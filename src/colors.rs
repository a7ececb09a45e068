// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Unified ANSI color code definitions
//!
//! Single source of truth for the escape codes used on the dashboard. The
//! dashboard writes raw lines at absolute rows, so styling is plain string
//! concatenation rather than `colored` (which one-shot commands use).
//!
//! Color usage conventions:
//! - RED = Errors, server state in the summary line
//! - GREEN = Values (speed, size, ETA, ids)
//! - YELLOW = Progress bar fill, brand suffix
//! - CYAN = File names
//! - BLUE = Brand prefix, progress bar brackets
//! - MAGENTA = Menu keys
//! - WHITE = Titles

/// Reset all formatting
pub const RESET: &str = "\x1b[0m";

/// Red text
pub const RED: &str = "\x1b[31m";

/// Green text
pub const GREEN: &str = "\x1b[32m";

/// Yellow text
pub const YELLOW: &str = "\x1b[33m";

/// Blue text
pub const BLUE: &str = "\x1b[34m";

/// Magenta text
pub const MAGENTA: &str = "\x1b[35m";

/// Cyan text
pub const CYAN: &str = "\x1b[36m";

/// White text
pub const WHITE: &str = "\x1b[37m";

/// Number of cells in a download progress bar.
pub const PROGRESS_CELLS: usize = 25;

fn paint(code: &str, text: impl std::fmt::Display) -> String {
    format!("{code}{text}{RESET}")
}

pub fn red(text: impl std::fmt::Display) -> String {
    paint(RED, text)
}

pub fn green(text: impl std::fmt::Display) -> String {
    paint(GREEN, text)
}

pub fn yellow(text: impl std::fmt::Display) -> String {
    paint(YELLOW, text)
}

pub fn blue(text: impl std::fmt::Display) -> String {
    paint(BLUE, text)
}

pub fn mag(text: impl std::fmt::Display) -> String {
    paint(MAGENTA, text)
}

pub fn cyan(text: impl std::fmt::Display) -> String {
    paint(CYAN, text)
}

pub fn white(text: impl std::fmt::Display) -> String {
    paint(WHITE, text)
}

/// Filled cells of a progress bar for `percent`: `percent / 4`, within `[0, 25]`.
pub fn progress_cells(percent: i32) -> usize {
    (percent.clamp(0, 100) / 4) as usize
}

/// Render the bracketed 25-cell progress bar, e.g. `[#####      ...] `.
pub fn progress_bar(percent: i32) -> String {
    let filled = progress_cells(percent);
    let empty = PROGRESS_CELLS - filled;

    format!(
        "{}{}{}",
        blue("["),
        yellow(format!("{}{}", "#".repeat(filled), " ".repeat(empty))),
        blue("] ")
    )
}

/// The "pyLoad" brand as shown in the dashboard title line.
pub fn brand() -> String {
    format!("{}{}", blue("py"), yellow("Load"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_cells_bounds() {
        for percent in 0..=100 {
            let cells = progress_cells(percent);
            assert_eq!(cells, (percent / 4) as usize);
            assert!(cells <= PROGRESS_CELLS);
        }
        assert_eq!(progress_cells(-5), 0);
        assert_eq!(progress_cells(250), PROGRESS_CELLS);
    }

    #[test]
    fn test_progress_bar_fill() {
        let bar = progress_bar(50);
        assert!(bar.contains(&format!("{}{}", "#".repeat(12), " ".repeat(13))));
    }

    #[test]
    fn test_paint_wraps_with_reset() {
        assert_eq!(red("x"), "\x1b[31mx\x1b[0m");
        assert_eq!(mag(3), "\x1b[35m3\x1b[0m");
    }
}
