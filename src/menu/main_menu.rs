// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Main menu: live download status in the header and the top-level menu.

use anyhow::Result;

use super::{Action, Handler, MenuContext, MenuKind};
use crate::colors::{cyan, green, mag, progress_bar, red, white};
use crate::format::format_size;
use crate::i18n::tr;
use crate::session::SessionEnd;
use crate::types::{aggregate_speed, Destination, DownloadInfo, ServerStatus};

/// Rows the main menu body takes, menu title and blank line included.
pub const MAIN_MENU_ROWS: u16 = 8;

pub struct MainMenu;

/// The two lines shown for a running download.
pub fn download_lines(download: &DownloadInfo) -> [String; 2] {
    let stats = format!(
        "{}{}{}{}{}{}{}{}{}",
        green(format!("{}%", download.percent)),
        tr(" Speed: "),
        green(format!("{}/s", format_size(download.speed))),
        tr(" Size: "),
        green(format_size(download.size)),
        tr(" Finished in: "),
        green(download.eta_display()),
        tr(" ID: "),
        green(download.fid),
    );
    [
        cyan(&download.name),
        format!("{}{}", progress_bar(download.percent), stats),
    ]
}

/// The summary line under the download list. The speed is the sum over
/// downloading entries, not the core's own figure.
pub fn summary_line(status: &ServerStatus, downloads: &[DownloadInfo]) -> String {
    let state = if status.pause { tr("paused") } else { tr("running") };
    format!(
        "{} {} {}: {} {}: {} {}: {}",
        tr("Status:"),
        red(state),
        tr("total Speed"),
        red(format!("{}/s", format_size(aggregate_speed(downloads)))),
        tr("Files in queue"),
        red(status.queue),
        tr("Total"),
        red(status.total),
    )
}

impl Handler for MainMenu {
    fn kind(&self) -> MenuKind {
        MenuKind::Main
    }

    fn render_header(&mut self, ctx: &mut MenuContext<'_>, row: u16) -> Result<u16> {
        let downloads = ctx.client.status_downloads()?;
        let mut line = row;

        ctx.println(line, &white(format!("{} {}", downloads.len(), tr("Downloads:"))));
        line += 1;

        for download in &downloads {
            if download.is_downloading() {
                for text in download_lines(download) {
                    ctx.println(line, &text);
                    line += 1;
                }
            } else if download.is_waiting() {
                ctx.println(line, &cyan(&download.name));
                ctx.println(line + 1, &format!("{}{}", tr("waiting: "), green(&download.format_wait)));
                line += 2;
            }
        }

        ctx.println(line, "");
        line += 1;

        let status = ctx.client.status_server()?;
        ctx.println(line, &summary_line(&status, &downloads));
        Ok(line + 1)
    }

    fn render_body(&mut self, ctx: &mut MenuContext<'_>, row: u16) -> Result<u16> {
        ctx.println(row, &white(tr("Menu:")));
        ctx.println(row + 1, "");
        let items = [
            " Add Links",
            " Manage Queue",
            " Manage Collector",
            " (Un)Pause Server",
            " Kill Server",
            " Quit",
        ];
        for (offset, item) in (2..).zip(items) {
            let key = mag(format!("{}.", offset - 1));
            ctx.println(row + offset, &format!("{}{}", key, tr(item)));
        }
        Ok(row + MAIN_MENU_ROWS)
    }

    fn on_char(&mut self, ctx: &mut MenuContext<'_>, c: char) -> Result<Action> {
        let action = match c {
            '1' => Action::Open(MenuKind::AddPackage),
            '2' => Action::Open(MenuKind::ManageFiles(Destination::Queue)),
            '3' => Action::Open(MenuKind::ManageFiles(Destination::Collector)),
            '4' => {
                let paused = ctx.client.toggle_pause()?;
                tracing::info!(paused, "server pause toggled");
                ctx.clear_input();
                Action::Stay
            }
            '5' => {
                ctx.client.kill()?;
                ctx.client.close();
                tracing::info!("core shut down from the dashboard");
                Action::Exit(SessionEnd::Killed)
            }
            '6' => Action::Exit(SessionEnd::Quit),
            _ => Action::Stay,
        };
        Ok(action)
    }
}
