// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Keyboard input for the dashboard.
//!
//! A reader thread turns crossterm key events into [`InputEvent`]s and sends
//! them over a channel to the input loop. Ctrl-C also fires a callback on
//! the reader thread itself, so it is honored even while the input loop is
//! blocked waiting for the screen lock.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

/// One unit of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Char(char),
    Enter,
    Backspace,
    Escape,
    /// Ctrl-C.
    Interrupt,
}

impl InputEvent {
    /// Classify a raw control code or character.
    pub fn from_char(c: char) -> Self {
        match c {
            '\x03' => Self::Interrupt,
            '\r' | '\n' => Self::Enter,
            '\x7f' | '\x08' => Self::Backspace,
            '\x1b' => Self::Escape,
            other => Self::Char(other),
        }
    }

    /// Map a key press. Key releases and keys the dashboard has no use for
    /// map to `None`.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Self::Interrupt),
            KeyCode::Char(c) => Some(Self::from_char(c)),
            KeyCode::Enter => Some(Self::Enter),
            KeyCode::Backspace => Some(Self::Backspace),
            KeyCode::Esc => Some(Self::Escape),
            _ => None,
        }
    }
}

/// Read keys on a named thread until the receiver hangs up or the terminal
/// fails. Dropping the sender on exit closes the channel, which ends the
/// input loop.
pub fn spawn_reader<F>(tx: Sender<InputEvent>, on_interrupt: F) -> io::Result<JoinHandle<()>>
where
    F: Fn() + Send + 'static,
{
    thread::Builder::new().name("input".to_string()).spawn(move || loop {
        let key = match event::read() {
            Ok(Event::Key(key)) => key,
            Ok(_) => continue,
            Err(e) => {
                tracing::error!(error = %e, "reading terminal input failed");
                return;
            }
        };
        let Some(input) = InputEvent::from_key(key) else {
            continue;
        };
        if input == InputEvent::Interrupt {
            on_interrupt();
        }
        if tx.send(input).is_err() {
            return;
        }
    })
}
