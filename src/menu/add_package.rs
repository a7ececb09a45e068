// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Add-package menu: first line names the package, following lines are
//! links, `END` submits.

use anyhow::Result;

use super::{Action, Handler, MenuContext, MenuKind};
use crate::colors::{mag, white};
use crate::i18n::tr;
use crate::types::Destination;

/// Terminates link entry.
pub const END_MARKER: &str = "END";

#[derive(Debug, Default)]
pub struct AddPackage {
    name: Option<String>,
    links: Vec<String>,
}

impl AddPackage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }
}

impl Handler for AddPackage {
    fn kind(&self) -> MenuKind {
        MenuKind::AddPackage
    }

    fn render_body(&mut self, ctx: &mut MenuContext<'_>, row: u16) -> Result<u16> {
        ctx.println(row, &white(tr("Add Package:")));
        ctx.println(row + 1, "");
        let mut line = row + 2;

        match &self.name {
            None => {
                ctx.println(line, tr("Enter a name for the new package"));
                ctx.println(line + 1, "");
                line += 2;
            }
            Some(name) => {
                ctx.println(line, &format!("{}{}", tr("Package: "), name));
                ctx.println(line + 1, tr("Parse the links you want to add."));
                ctx.println(line + 2, tr("Type END when done."));
                ctx.println(line + 3, &format!("{}{}", tr("Links added: "), mag(self.links.len())));
                line += 4;
            }
        }

        ctx.println(line, "");
        ctx.println(line + 1, &format!("{}{}", mag("0."), tr(" back to main menu")));
        Ok(line + 2)
    }

    fn on_enter(&mut self, ctx: &mut MenuContext<'_>, input: &str) -> Result<Action> {
        let input = input.trim();
        if input == "0" {
            return Ok(Action::Reset);
        }

        match &self.name {
            None => {
                if !input.is_empty() {
                    self.name = Some(input.to_string());
                }
            }
            Some(name) if input == END_MARKER => {
                let pid = ctx.client.add_package(name, &self.links, Destination::Queue)?;
                tracing::info!(pid, links = self.links.len(), "package added");
                return Ok(Action::Reset);
            }
            Some(_) => {
                // A pasted line may carry several links.
                self.links
                    .extend(input.split_whitespace().map(str::to_string));
            }
        }

        ctx.clear_input();
        Ok(Action::Stay)
    }
}
