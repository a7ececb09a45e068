// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The interactive dashboard session.
//!
//! Two activities share one [`ScreenState`] behind a mutex:
//!
//! - the input loop, which turns keystrokes into handler calls and redraws
//!   the menu section and the input line,
//! - the refresh loop, which redraws the whole screen once per second.
//!
//! Every dispatch plus the redraw that follows happens under a single lock
//! acquisition, so a refresh never interleaves with half-applied input.
//! Ctrl-C is the exception: it ends the session without taking the lock.
//!
//! Screen layout (1-based rows): the title at row 1, row 2 for inline error
//! messages, the download header from row 3, a blank separator, the active
//! menu, then a blank row and the input line.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::colors::{brand, red, white};
use crate::error::is_connection_lost;
use crate::i18n::tr;
use crate::input::InputEvent;
use crate::locks::{resilient_lock, try_resilient_lock};
use crate::menu::{Action, HandlerSet, MenuContext, MenuKind};
use crate::remote::RemoteClient;
use crate::screen::ScreenBuffer;

pub const TITLE_ROW: u16 = 1;
/// Row where recoverable errors are shown.
pub const MESSAGE_ROW: u16 = 2;
pub const HEADER_ROW: u16 = 3;

/// Delay between full redraws.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user chose Quit.
    Quit,
    /// The user shut the core down.
    Killed,
    /// Ctrl-C.
    Interrupted,
    /// The connection to the core went away.
    ConnectionLost,
    /// The input source closed.
    InputClosed,
}

/// Result of one input dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(SessionEnd),
}

/// Result of one refresh tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered,
    /// A render failed; the message was shown and the main menu restored.
    Recovered(String),
    ConnectionLost,
}

/// Everything both loops touch. Only ever used under the session lock.
pub struct ScreenState {
    input: String,
    /// Row the active menu starts at; set by the header render.
    menu_row: u16,
    /// Row returned by the last body render; the footer goes below it.
    body_end: u16,
    /// Input row of the previous footer render.
    last_footer_row: u16,
    handlers: HandlerSet,
    screen: Box<dyn ScreenBuffer>,
    client: Arc<dyn RemoteClient>,
}

impl ScreenState {
    pub fn new(client: Arc<dyn RemoteClient>, screen: Box<dyn ScreenBuffer>) -> Self {
        Self {
            input: String::new(),
            menu_row: HEADER_ROW,
            body_end: HEADER_ROW,
            last_footer_row: 0,
            handlers: HandlerSet::main(),
            screen,
            client,
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn active_menu(&self) -> MenuKind {
        self.handlers.active()
    }

    pub fn menu_row(&self) -> u16 {
        self.menu_row
    }

    /// Row of the input line as last rendered.
    pub fn footer_row(&self) -> u16 {
        self.last_footer_row
    }

    /// Install a fresh `kind` menu in the body and input roles.
    pub fn set_handler(&mut self, kind: MenuKind) {
        tracing::debug!(from = ?self.handlers.active(), to = ?kind, "switching menu");
        self.handlers.menu = kind.build();
        self.input.clear();
    }

    /// Back to the main menu with an empty buffer.
    pub fn reset(&mut self) {
        self.handlers = HandlerSet::main();
        self.input.clear();
    }

    /// Show `err` on the message row and reset.
    pub fn recover(&mut self, err: &anyhow::Error) {
        tracing::error!(error = %format!("{:#}", err), "resetting to main menu");
        self.show_error(err);
        self.reset();
    }

    fn show_error(&mut self, err: &anyhow::Error) {
        self.screen.write_line(MESSAGE_ROW, &red(format!("{:#}", err)));
    }

    fn render_title(&mut self) {
        self.screen
            .write_line(TITLE_ROW, &format!("{}{}", brand(), white(tr(" Command Line Interface"))));
        self.screen.write_line(MESSAGE_ROW, "");
    }

    fn render_header(&mut self) -> anyhow::Result<()> {
        let Self {
            handlers,
            screen,
            client,
            input,
            ..
        } = self;
        let mut ctx = MenuContext {
            client: client.as_ref(),
            screen: screen.as_mut(),
            input,
        };
        let row = handlers.header.render_header(&mut ctx, HEADER_ROW)?;
        ctx.println(row, "");
        self.menu_row = row + 1;
        Ok(())
    }

    fn render_body(&mut self) -> anyhow::Result<()> {
        let Self {
            handlers,
            screen,
            client,
            input,
            menu_row,
            ..
        } = self;
        let mut ctx = MenuContext {
            client: client.as_ref(),
            screen: screen.as_mut(),
            input,
        };
        self.body_end = handlers.menu.render_body(&mut ctx, *menu_row)?;
        Ok(())
    }

    /// Blank row, then the input line below the body; rows left over from a
    /// taller previous footer are blanked.
    fn render_footer(&mut self) {
        let row = self.body_end + 1;
        self.screen.write_line(self.body_end, "");
        self.screen
            .write_line(row, &format!("{}{}", white(tr(" Input: ")), self.input));
        for stale in row + 1..=self.last_footer_row {
            self.screen.write_line(stale, "");
        }
        self.last_footer_row = row;
        self.screen.move_cursor(row);
    }

    /// Full redraw.
    pub fn refresh(&mut self) -> anyhow::Result<()> {
        self.render_title();
        self.render_header()?;
        self.render_body()?;
        self.render_footer();
        Ok(())
    }

    /// Redraw body and footer after input. A failing body resets to the
    /// main menu, whose body cannot fail.
    fn redraw_menu(&mut self) -> Result<(), SessionEnd> {
        if let Err(e) = self.render_body() {
            if is_connection_lost(&e) {
                return Err(SessionEnd::ConnectionLost);
            }
            self.recover(&e);
            if let Err(e) = self.render_body() {
                tracing::error!(error = %e, "main menu failed to render");
            }
        }
        self.render_footer();
        Ok(())
    }

    fn dispatch(&mut self, event: InputEvent) -> anyhow::Result<Action> {
        let Self {
            handlers,
            screen,
            client,
            input,
            ..
        } = self;
        let mut ctx = MenuContext {
            client: client.as_ref(),
            screen: screen.as_mut(),
            input,
        };

        match event {
            InputEvent::Enter => {
                let line = ctx.input.clone();
                match handlers.menu.on_enter(&mut ctx, &line) {
                    Err(e) if !is_connection_lost(&e) => {
                        tracing::warn!(error = %format!("{:#}", e), "input rejected");
                        self.show_error(&e);
                        Ok(Action::Stay)
                    }
                    other => other,
                }
            }
            InputEvent::Backspace => {
                ctx.input.pop();
                handlers.menu.on_backspace(&mut ctx)
            }
            InputEvent::Char(c) => {
                ctx.input.push(c);
                handlers.menu.on_char(&mut ctx, c)
            }
            InputEvent::Escape => Ok(Action::Stay),
            InputEvent::Interrupt => Ok(Action::Exit(SessionEnd::Interrupted)),
        }
    }

    fn apply(&mut self, action: Action) -> Flow {
        match action {
            Action::Stay => Flow::Continue,
            Action::Open(MenuKind::Main) | Action::Reset => {
                self.reset();
                Flow::Continue
            }
            Action::Open(kind) => {
                self.set_handler(kind);
                Flow::Continue
            }
            Action::Exit(end) => {
                self.screen.clear();
                Flow::Exit(end)
            }
        }
    }

    /// Apply one input unit and redraw the menu section.
    pub fn handle_input(&mut self, event: InputEvent) -> Flow {
        let flow = match self.dispatch(event) {
            Ok(action) => self.apply(action),
            Err(e) if is_connection_lost(&e) => return Flow::Exit(SessionEnd::ConnectionLost),
            Err(e) => {
                self.recover(&e);
                Flow::Continue
            }
        };
        if let Flow::Exit(_) = flow {
            return flow;
        }
        match self.redraw_menu() {
            Ok(()) => flow,
            Err(end) => Flow::Exit(end),
        }
    }

    /// One refresh-loop iteration's worth of work.
    pub fn tick(&mut self) -> TickOutcome {
        match self.refresh() {
            Ok(()) => TickOutcome::Rendered,
            Err(e) if is_connection_lost(&e) => TickOutcome::ConnectionLost,
            Err(e) => {
                let message = format!("{:#}", e);
                self.recover(&e);
                TickOutcome::Recovered(message)
            }
        }
    }
}

/// A dashboard session: the shared state plus the handle to stop the
/// refresh loop.
pub struct Session {
    state: Arc<Mutex<ScreenState>>,
    stopped: Arc<AtomicBool>,
}

impl Session {
    pub fn new(client: Arc<dyn RemoteClient>, screen: Box<dyn ScreenBuffer>) -> Self {
        Self {
            state: Arc::new(Mutex::new(ScreenState::new(client, screen))),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The session lock.
    pub fn state(&self) -> Arc<Mutex<ScreenState>> {
        Arc::clone(&self.state)
    }

    pub fn refresh_loop(&self, interval: Duration) -> RefreshLoop {
        RefreshLoop {
            state: self.state(),
            stopped: Arc::clone(&self.stopped),
            interval,
        }
    }

    pub fn input_loop(&self) -> InputLoop {
        InputLoop { state: self.state() }
    }

    /// Draw the first frame, then process input until the session ends.
    pub fn run(&self, events: Receiver<InputEvent>) -> SessionEnd {
        let first = {
            let mut state = resilient_lock(&self.state);
            state.screen.clear();
            state.tick()
        };
        let end = match first {
            TickOutcome::ConnectionLost => SessionEnd::ConnectionLost,
            _ => self.input_loop().run(events),
        };
        self.stop();
        tracing::info!(reason = ?end, "session ended");
        end
    }

    /// Ask the refresh loop to finish after its current tick.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }
}

/// Consumes input events in order.
pub struct InputLoop {
    state: Arc<Mutex<ScreenState>>,
}

impl InputLoop {
    /// Handle one event. Ctrl-C never waits for the lock, so it works even
    /// while a render is stuck holding it; the screen is cleared only when
    /// the lock happens to be free.
    pub fn handle(&self, event: InputEvent) -> Flow {
        if event == InputEvent::Interrupt {
            if let Some(mut state) = try_resilient_lock(&self.state) {
                state.screen.clear();
            }
            return Flow::Exit(SessionEnd::Interrupted);
        }
        resilient_lock(&self.state).handle_input(event)
    }

    pub fn run(&self, events: Receiver<InputEvent>) -> SessionEnd {
        for event in events {
            if let Flow::Exit(end) = self.handle(event) {
                return end;
            }
        }
        SessionEnd::InputClosed
    }
}

/// Redraws the screen every `interval` until stopped or disconnected.
pub struct RefreshLoop {
    state: Arc<Mutex<ScreenState>>,
    stopped: Arc<AtomicBool>,
    interval: Duration,
}

impl RefreshLoop {
    pub fn tick(&self) -> TickOutcome {
        let outcome = resilient_lock(&self.state).tick();
        match &outcome {
            TickOutcome::Rendered => tracing::trace!("refreshed"),
            TickOutcome::Recovered(message) => tracing::warn!(%message, "refresh failed"),
            TickOutcome::ConnectionLost => tracing::error!("connection to the core lost"),
        }
        outcome
    }

    /// Run on a named thread. `on_connection_lost` runs on that thread when
    /// the core goes away; the loop ends afterwards.
    pub fn spawn<F>(self, on_connection_lost: F) -> std::io::Result<JoinHandle<()>>
    where
        F: FnOnce() + Send + 'static,
    {
        thread::Builder::new()
            .name("refresh".to_string())
            .spawn(move || loop {
                thread::sleep(self.interval);
                if self.stopped.load(Ordering::SeqCst) {
                    return;
                }
                if self.tick() == TickOutcome::ConnectionLost {
                    on_connection_lost();
                    return;
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::remote::{Call, MockClient};
    use crate::screen::MemoryScreen;
    use crate::types::{Destination, PackageData};

    fn state_with(client: MockClient) -> (ScreenState, Arc<MockClient>, MemoryScreen) {
        let client = Arc::new(client);
        let screen = MemoryScreen::new();
        let state = ScreenState::new(client.clone(), Box::new(screen.clone()));
        (state, client, screen)
    }

    fn type_str(state: &mut ScreenState, text: &str) {
        for c in text.chars() {
            assert_eq!(state.handle_input(InputEvent::Char(c)), Flow::Continue);
        }
    }

    #[test]
    fn test_refresh_lays_out_screen() {
        let (mut state, _, screen) = state_with(MockClient::new());
        assert_eq!(state.tick(), TickOutcome::Rendered);

        assert_eq!(screen.line(1), "pyLoad Command Line Interface");
        assert_eq!(screen.line(3), "0 Downloads:");
        // header: count, blank, summary; then the separator
        assert_eq!(state.menu_row(), 7);
        assert_eq!(screen.line(7), "Menu:");
        assert_eq!(screen.line(15), "");
        assert_eq!(screen.line(16), " Input: ");
        assert_eq!(screen.cursor(), Some(16));
    }

    #[test]
    fn test_switch_clears_buffer() {
        let (mut state, _, screen) = state_with(MockClient::new());
        state.tick();
        type_str(&mut state, "xy");
        assert_eq!(state.input(), "xy");
        type_str(&mut state, "1");
        assert_eq!(state.active_menu(), MenuKind::AddPackage);
        assert_eq!(state.input(), "");
        assert_eq!(screen.line(7), "Add Package:");
    }

    #[test]
    fn test_shorter_footer_blanks_stale_rows() {
        let (mut state, _, screen) = state_with(MockClient::new());
        state.tick();
        type_str(&mut state, "2");
        let tall = state.footer_row();
        assert_eq!(screen.line(tall), " Input: ");

        type_str(&mut state, "0");
        state.handle_input(InputEvent::Enter);
        assert_eq!(state.active_menu(), MenuKind::Main);
        let short = state.footer_row();
        assert!(short < tall);
        for row in short + 1..=tall {
            assert_eq!(screen.line(row), "", "row {} should be blank", row);
        }
    }

    #[test]
    fn test_typed_chars_echo_in_footer() {
        let (mut state, _, screen) = state_with(MockClient::new());
        state.tick();
        type_str(&mut state, "1Holiday");
        assert_eq!(screen.line(state.footer_row()), " Input: Holiday");
        state.handle_input(InputEvent::Backspace);
        assert_eq!(screen.line(state.footer_row()), " Input: Holida");
    }

    #[test]
    fn test_escape_changes_nothing() {
        let (mut state, client, _) = state_with(MockClient::new());
        state.tick();
        type_str(&mut state, "1ab");
        assert_eq!(state.handle_input(InputEvent::Escape), Flow::Continue);
        assert_eq!(state.input(), "ab");
        assert_eq!(state.active_menu(), MenuKind::AddPackage);
        assert!(client.mutations().is_empty());
    }

    #[test]
    fn test_enter_error_is_shown_and_swallowed() {
        let client = MockClient::new().with_packages(vec![PackageData {
            pid: 1,
            dest: Destination::Queue,
            ..Default::default()
        }]);
        let (mut state, _, screen) = state_with(client);
        state.tick();
        type_str(&mut state, "2d");
        type_str(&mut state, "x,y");
        assert_eq!(state.handle_input(InputEvent::Enter), Flow::Continue);

        assert!(screen.line(MESSAGE_ROW).contains("Invalid selection"));
        assert_eq!(state.active_menu(), MenuKind::ManageFiles(Destination::Queue));
    }

    #[test]
    fn test_char_error_resets_to_main() {
        let (mut state, client, screen) = state_with(MockClient::new());
        state.tick();
        type_str(&mut state, "1");
        client.fail_once("toggle_pause", ClientError::Remote("busy".into()));
        state.reset();
        type_str(&mut state, "4");
        assert!(screen.line(MESSAGE_ROW).contains("busy"));
        assert_eq!(state.active_menu(), MenuKind::Main);
        assert_eq!(state.input(), "");
    }

    #[test]
    fn test_lost_connection_ends_session() {
        let (mut state, client, _) = state_with(MockClient::new());
        state.tick();
        client.fail("toggle_pause", ClientError::ConnectionClosed);
        assert_eq!(
            state.handle_input(InputEvent::Char('4')),
            Flow::Exit(SessionEnd::ConnectionLost)
        );

        client.fail("status_downloads", ClientError::ConnectionClosed);
        assert_eq!(state.tick(), TickOutcome::ConnectionLost);
    }

    #[test]
    fn test_refresh_error_recovers() {
        let (mut state, client, screen) = state_with(MockClient::new());
        state.tick();
        type_str(&mut state, "1");
        client.fail_once("status_server", ClientError::Remote("hiccup".into()));
        assert!(matches!(state.tick(), TickOutcome::Recovered(m) if m.contains("hiccup")));
        assert_eq!(state.active_menu(), MenuKind::Main);
        assert!(screen.line(MESSAGE_ROW).contains("hiccup"));
    }

    #[test]
    fn test_quit_clears_screen() {
        let (mut state, client, screen) = state_with(MockClient::new());
        state.tick();
        assert_eq!(state.handle_input(InputEvent::Char('6')), Flow::Exit(SessionEnd::Quit));
        assert_eq!(screen.clears(), 1);
        assert!(client.mutations().is_empty());

        assert_eq!(state.handle_input(InputEvent::Char('5')), Flow::Exit(SessionEnd::Killed));
        assert_eq!(client.mutations(), vec![Call::Kill, Call::Close]);
    }

    #[test]
    fn test_input_loop_interrupt_skips_lock() {
        let session = Session::new(Arc::new(MockClient::new()), Box::new(MemoryScreen::new()));
        let state = session.state();
        let _held = resilient_lock(&state);
        assert_eq!(
            session.input_loop().handle(InputEvent::Interrupt),
            Flow::Exit(SessionEnd::Interrupted)
        );
    }
}
