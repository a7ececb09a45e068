// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Row-addressed terminal output.
//!
//! The dashboard never scrolls: every line is written at an absolute,
//! 1-based row and replaces whatever was there. [`TerminalScreen`] drives the
//! real terminal through crossterm; [`MemoryScreen`] keeps the rows in memory
//! so renders can be asserted in tests.
//!
//! A failed terminal write cannot be recovered from, so buffers do not
//! surface errors: [`TerminalScreen`] restores the terminal and exits.

use crossterm::{
    cursor::{MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};
use std::collections::BTreeMap;
use std::io::{self, Stdout, Write};
use std::sync::{Arc, Mutex};

use crate::format::strip_ansi;
use crate::locks::resilient_lock;

/// Exit code used when the terminal itself fails.
const TERMINAL_FAILURE_EXIT: i32 = 74;

/// Sink for the dashboard's lines.
pub trait ScreenBuffer: Send {
    /// Replace row `row` (1-based) with `content`.
    fn write_line(&mut self, row: u16, content: &str);

    /// Park the cursor at the start of `row`.
    fn move_cursor(&mut self, row: u16);

    /// Blank the whole screen.
    fn clear(&mut self);
}

/// [`ScreenBuffer`] on stdout.
pub struct TerminalScreen {
    out: Stdout,
}

impl Default for TerminalScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalScreen {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }

    fn fatal(err: io::Error) -> ! {
        tracing::error!(error = %err, "terminal write failed");
        restore_terminal();
        eprintln!("terminal write failed: {}", err);
        std::process::exit(TERMINAL_FAILURE_EXIT);
    }
}

impl ScreenBuffer for TerminalScreen {
    fn write_line(&mut self, row: u16, content: &str) {
        let result = queue!(
            self.out,
            MoveTo(0, row.saturating_sub(1)),
            Clear(ClearType::CurrentLine),
            Print(content)
        )
        .and_then(|_| self.out.flush());
        if let Err(e) = result {
            Self::fatal(e);
        }
    }

    fn move_cursor(&mut self, row: u16) {
        if let Err(e) = execute!(self.out, MoveTo(0, row.saturating_sub(1))) {
            Self::fatal(e);
        }
    }

    fn clear(&mut self) {
        if let Err(e) = execute!(self.out, Clear(ClearType::All), MoveTo(0, 0)) {
            Self::fatal(e);
        }
    }
}

/// Put the terminal in raw mode for the dashboard.
pub fn enter_dashboard() -> io::Result<()> {
    terminal::enable_raw_mode()?;
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))
}

/// Leave raw mode and clear the screen. Safe to call more than once and
/// from any thread; it never touches the screen lock.
pub fn restore_terminal() {
    let _ = terminal::disable_raw_mode();
    let mut out = io::stdout();
    let _ = execute!(out, Clear(ClearType::All), MoveTo(0, 0), Show);
    let _ = out.flush();
}

/// Everything a [`MemoryScreen`] has been told, shared between clones.
#[derive(Debug, Default)]
pub struct Frame {
    pub rows: BTreeMap<u16, String>,
    pub cursor: Option<u16>,
    /// Every write in order, `(row, content)`.
    pub writes: Vec<(u16, String)>,
    pub clears: usize,
}

/// In-memory [`ScreenBuffer`]; clones observe the same frame.
#[derive(Debug, Clone, Default)]
pub struct MemoryScreen {
    frame: Arc<Mutex<Frame>>,
}

impl MemoryScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible text of `row` without color codes; empty when never written.
    pub fn line(&self, row: u16) -> String {
        resilient_lock(&self.frame)
            .rows
            .get(&row)
            .map(|s| strip_ansi(s))
            .unwrap_or_default()
    }

    /// Highest row that currently shows something.
    pub fn last_non_blank_row(&self) -> Option<u16> {
        resilient_lock(&self.frame)
            .rows
            .iter()
            .rev()
            .find(|(_, text)| !strip_ansi(text).trim().is_empty())
            .map(|(row, _)| *row)
    }

    /// Visible text of every non-blank row, top to bottom.
    pub fn text(&self) -> Vec<String> {
        resilient_lock(&self.frame)
            .rows
            .values()
            .map(|s| strip_ansi(s))
            .filter(|s| !s.trim().is_empty())
            .collect()
    }

    pub fn cursor(&self) -> Option<u16> {
        resilient_lock(&self.frame).cursor
    }

    pub fn clears(&self) -> usize {
        resilient_lock(&self.frame).clears
    }

    pub fn writes(&self) -> Vec<(u16, String)> {
        resilient_lock(&self.frame).writes.clone()
    }
}

impl ScreenBuffer for MemoryScreen {
    fn write_line(&mut self, row: u16, content: &str) {
        let mut frame = resilient_lock(&self.frame);
        frame.rows.insert(row, content.to_string());
        frame.writes.push((row, content.to_string()));
    }

    fn move_cursor(&mut self, row: u16) {
        resilient_lock(&self.frame).cursor = Some(row);
    }

    fn clear(&mut self) {
        let mut frame = resilient_lock(&self.frame);
        frame.rows.clear();
        frame.clears += 1;
    }
}
