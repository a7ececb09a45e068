// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Screen modes of the dashboard.
//!
//! A screen mode is a [`Handler`]: it can render the header (download
//! status), render the body (the menu section) and react to input. Every
//! facet has a no-op default, so a menu implements only what it owns.
//!
//! The set of menus is closed ([`MenuKind`]): the main menu, the add-package
//! menu, and the file manager for the queue or the collector. Handlers never
//! switch themselves; they return an [`Action`] and the session applies it
//! under the screen lock.

pub mod add_package;
pub mod main_menu;
pub mod manage_files;

pub use add_package::AddPackage;
pub use main_menu::MainMenu;
pub use manage_files::ManageFiles;

use anyhow::Result;

use crate::remote::RemoteClient;
use crate::screen::ScreenBuffer;
use crate::session::SessionEnd;
use crate::types::Destination;

/// What a handler gets to work with during one render or one dispatch.
pub struct MenuContext<'a> {
    pub client: &'a dyn RemoteClient,
    pub screen: &'a mut dyn ScreenBuffer,
    /// The line-edit buffer; handlers clear it once they consumed it.
    pub input: &'a mut String,
}

impl MenuContext<'_> {
    pub fn println(&mut self, row: u16, content: &str) {
        self.screen.write_line(row, content);
    }

    /// Empty the line-edit buffer.
    pub fn clear_input(&mut self) {
        self.input.clear();
    }
}

/// State transition requested by a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Stay,
    /// Replace body and input roles with a fresh menu.
    Open(MenuKind),
    /// Back to the main menu.
    Reset,
    /// End the session.
    Exit(SessionEnd),
}

/// The menus a session can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Main,
    AddPackage,
    ManageFiles(Destination),
}

impl MenuKind {
    pub fn build(self) -> Box<dyn Handler> {
        match self {
            Self::Main => Box::new(MainMenu),
            Self::AddPackage => Box::new(AddPackage::new()),
            Self::ManageFiles(target) => Box::new(ManageFiles::new(target)),
        }
    }
}

/// One screen mode. Rows are 1-based; renderers return the next free row.
pub trait Handler: Send {
    fn kind(&self) -> MenuKind;

    fn render_header(&mut self, _ctx: &mut MenuContext<'_>, row: u16) -> Result<u16> {
        Ok(row)
    }

    fn render_body(&mut self, _ctx: &mut MenuContext<'_>, row: u16) -> Result<u16> {
        Ok(row)
    }

    /// A printable character was appended to the buffer.
    fn on_char(&mut self, _ctx: &mut MenuContext<'_>, _c: char) -> Result<Action> {
        Ok(Action::Stay)
    }

    /// Enter was pressed with `input` in the buffer.
    fn on_enter(&mut self, _ctx: &mut MenuContext<'_>, _input: &str) -> Result<Action> {
        Ok(Action::Stay)
    }

    /// The last character was dropped from the buffer.
    fn on_backspace(&mut self, _ctx: &mut MenuContext<'_>) -> Result<Action> {
        Ok(Action::Stay)
    }
}

/// The active triad. The header role always belongs to the main menu; body
/// and input share one object because a submenu's rendering depends on the
/// input it has consumed.
pub struct HandlerSet {
    pub header: Box<dyn Handler>,
    pub menu: Box<dyn Handler>,
}

impl HandlerSet {
    pub fn main() -> Self {
        Self {
            header: MenuKind::Main.build(),
            menu: MenuKind::Main.build(),
        }
    }

    pub fn active(&self) -> MenuKind {
        self.menu.kind()
    }
}

impl Default for HandlerSet {
    fn default() -> Self {
        Self::main()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::remote::MockClient;
    use crate::screen::MemoryScreen;

    /// Owns what a [`MenuContext`] borrows.
    pub struct Harness {
        pub client: MockClient,
        pub screen: MemoryScreen,
        pub input: String,
    }

    impl Harness {
        pub fn new(client: MockClient) -> Self {
            Self {
                client,
                screen: MemoryScreen::new(),
                input: String::new(),
            }
        }

        pub fn ctx(&mut self) -> MenuContext<'_> {
            MenuContext {
                client: &self.client,
                screen: &mut self.screen,
                input: &mut self.input,
            }
        }

        /// Type `c` the way the input loop does: append, then dispatch.
        pub fn type_char(&mut self, handler: &mut dyn Handler, c: char) -> Action {
            self.input.push(c);
            let mut ctx = self.ctx();
            handler.on_char(&mut ctx, c).unwrap()
        }

        pub fn enter(&mut self, handler: &mut dyn Handler, line: &str) -> Result<Action> {
            self.input = line.to_string();
            let mut ctx = self.ctx();
            handler.on_enter(&mut ctx, line)
        }
    }
}
