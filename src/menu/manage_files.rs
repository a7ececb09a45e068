// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! File manager for one holding area.
//!
//! Two views: the package list of the target, and the links of one package.
//! A mode key (`m`, `d`, `r`) arms an action that the next Enter applies to
//! the selected entries. Remote data is cached briefly so paging does not
//! refetch on every keystroke.

use anyhow::{bail, Context, Result};
use std::time::{Duration, Instant};

use super::{Action, Handler, MenuContext, MenuKind};
use crate::colors::{mag, white};
use crate::i18n::tr;
use crate::remote::{packages_in, RemoteClient};
use crate::types::{Destination, PackageData};

/// Entries shown per page.
pub const PAGE_SIZE: usize = 5;

const PACKAGE_CACHE_TTL: Duration = Duration::from_secs(2);
const LINK_CACHE_TTL: Duration = Duration::from_secs(1);

/// Action armed by a mode key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Move,
    Delete,
    Restart,
}

impl Mode {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            'm' => Some(Self::Move),
            'd' => Some(Self::Delete),
            'r' => Some(Self::Restart),
            _ => None,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            Self::Move => tr("What do you want to move?"),
            Self::Delete => tr("What do you want to delete?"),
            Self::Restart => tr("What do you want to restart?"),
        }
    }
}

struct Cached<T> {
    at: Instant,
    value: T,
}

impl<T> Cached<T> {
    fn new(value: T) -> Self {
        Self {
            at: Instant::now(),
            value,
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.at.elapsed() <= ttl
    }
}

pub struct ManageFiles {
    target: Destination,
    pos: usize,
    package: Option<i64>,
    mode: Option<Mode>,
    packages: Option<Cached<Vec<PackageData>>>,
    links: Option<Cached<PackageData>>,
}

impl ManageFiles {
    pub fn new(target: Destination) -> Self {
        Self {
            target,
            pos: 0,
            package: None,
            mode: None,
            packages: None,
            links: None,
        }
    }

    pub fn target(&self) -> Destination {
        self.target
    }

    pub fn mode(&self) -> Option<Mode> {
        self.mode
    }

    /// Package whose links are shown, if any.
    pub fn package(&self) -> Option<i64> {
        self.package
    }

    /// Offset of the first entry on the current page.
    pub fn pos(&self) -> usize {
        self.pos
    }

    fn packages(&mut self, client: &dyn RemoteClient) -> Result<&[PackageData]> {
        let stale = !matches!(&self.packages, Some(c) if c.is_fresh(PACKAGE_CACHE_TTL));
        if stale {
            let packages = packages_in(client, self.target)
                .with_context(|| format!("Could not load the {}", self.target))?;
            self.packages = Some(Cached::new(packages));
        }
        Ok(self
            .packages
            .as_ref()
            .map(|c| c.value.as_slice())
            .unwrap_or_default())
    }

    /// Links of the open package. A failed fetch shows an empty package
    /// unless the connection itself is gone.
    fn links(&mut self, client: &dyn RemoteClient, pid: i64) -> Result<&PackageData> {
        let stale = !matches!(&self.links, Some(c) if c.is_fresh(LINK_CACHE_TTL) && c.value.pid == pid);
        if stale {
            let package = match client.get_package_data(pid) {
                Ok(package) => package,
                Err(e) if e.is_fatal() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(pid, error = %e, "package detail unavailable");
                    PackageData {
                        pid,
                        ..Default::default()
                    }
                }
            };
            self.links = Some(Cached::new(package));
        }
        match &self.links {
            Some(cached) => Ok(&cached.value),
            None => bail!("package {} is not loaded", pid),
        }
    }

    fn page_entries(&mut self, client: &dyn RemoteClient) -> Result<Vec<String>> {
        let pos = self.pos;
        let entries = match self.package {
            None => self
                .packages(client)?
                .iter()
                .skip(pos)
                .take(PAGE_SIZE)
                .map(|p| format!("{}: {}", mag(p.pid), p.name))
                .collect(),
            Some(pid) => self
                .links(client, pid)?
                .links
                .iter()
                .skip(pos)
                .take(PAGE_SIZE)
                .map(|f| format!("{}: {} | {} | {}", mag(f.fid), f.name, f.statusmsg, f.plugin))
                .collect(),
        };
        Ok(entries)
    }

    fn apply_to_packages(&mut self, client: &dyn RemoteClient, mode: Mode, input: &str) -> Result<()> {
        let ids: Vec<i64> = self.packages(client)?.iter().map(|p| p.pid).collect();
        let pids = parse_selection(input, &ids)?;
        match mode {
            Mode::Move => {
                let dest = self.target.toggled();
                for pid in &pids {
                    client.move_package(dest, *pid)?;
                }
            }
            Mode::Delete => client.delete_packages(&pids)?,
            Mode::Restart => {
                for pid in &pids {
                    client.restart_package(*pid)?;
                }
            }
        }
        tracing::info!(?mode, packages = ?pids, target = %self.target, "package action applied");
        Ok(())
    }

    fn apply_to_links(&mut self, client: &dyn RemoteClient, pid: i64, mode: Mode, input: &str) -> Result<()> {
        let ids: Vec<i64> = self.links(client, pid)?.links.iter().map(|f| f.fid).collect();
        let fids = parse_selection(input, &ids)?;
        match mode {
            Mode::Delete => client.delete_files(&fids)?,
            Mode::Restart => {
                for fid in &fids {
                    client.restart_file(*fid)?;
                }
            }
            Mode::Move => bail!("{}", tr("Links cannot be moved, only packages.")),
        }
        tracing::info!(?mode, files = ?fids, pid, "link action applied");
        Ok(())
    }
}

impl Handler for ManageFiles {
    fn kind(&self) -> MenuKind {
        MenuKind::ManageFiles(self.target)
    }

    fn render_body(&mut self, ctx: &mut MenuContext<'_>, row: u16) -> Result<u16> {
        let title = match self.package {
            None => tr("Manage Packages:"),
            Some(_) => tr("Manage Links:"),
        };
        ctx.println(row, &white(title));

        match self.mode {
            Some(mode) => {
                ctx.println(row + 1, mode.prompt());
                ctx.println(
                    row + 2,
                    tr("Enter a single number, comma separated numbers or ranges. e.g.: 1,2,3 or 1-3."),
                );
            }
            None => {
                ctx.println(row + 1, tr("Choose what you want to do, or enter package number."));
                ctx.println(
                    row + 2,
                    &format!(
                        "{} - {}, {} - {}, {} - {}",
                        mag("d"),
                        tr("delete"),
                        mag("m"),
                        tr("move"),
                        mag("r"),
                        tr("restart")
                    ),
                );
            }
        }

        let mut line = row + 3;
        let mut entries = self.page_entries(ctx.client)?.into_iter();
        for _ in 0..PAGE_SIZE {
            ctx.println(line, &entries.next().unwrap_or_default());
            line += 1;
        }

        ctx.println(
            line,
            &format!("{}{} | {}{}", mag("p"), tr(" - previous"), mag("n"), tr(" - next")),
        );
        ctx.println(line + 1, &format!("{}{}", mag("0."), tr(" back to main menu")));
        Ok(line + 2)
    }

    fn on_char(&mut self, ctx: &mut MenuContext<'_>, c: char) -> Result<Action> {
        if let Some(mode) = Mode::from_key(c) {
            self.mode = Some(mode);
            ctx.clear_input();
            return Ok(Action::Stay);
        }
        match c {
            'p' => {
                self.pos = self.pos.saturating_sub(PAGE_SIZE);
                ctx.input.pop();
            }
            'n' => {
                self.pos += PAGE_SIZE;
                ctx.input.pop();
            }
            _ => {}
        }
        Ok(Action::Stay)
    }

    fn on_backspace(&mut self, ctx: &mut MenuContext<'_>) -> Result<Action> {
        if ctx.input.is_empty() {
            if self.mode.is_some() {
                self.mode = None;
            } else if self.package.is_some() {
                self.package = None;
                self.pos = 0;
            }
        }
        Ok(Action::Stay)
    }

    fn on_enter(&mut self, ctx: &mut MenuContext<'_>, input: &str) -> Result<Action> {
        let input = input.trim();
        if input == "0" {
            return Ok(Action::Reset);
        }

        match (self.package, self.mode) {
            (None, Some(mode)) => self.apply_to_packages(ctx.client, mode, input)?,
            (Some(pid), Some(mode)) => self.apply_to_links(ctx.client, pid, mode, input)?,
            (_, None) => {
                if let Ok(pid) = input.parse::<i64>() {
                    self.package = Some(pid);
                }
            }
        }

        self.packages = None;
        self.links = None;
        self.pos = 0;
        self.mode = None;
        ctx.clear_input();
        Ok(Action::Stay)
    }
}

/// Ids named by `input`: one number, a comma list, or an inclusive range.
/// A range keeps only the ids in `known` that fall inside it.
pub fn parse_selection(input: &str, known: &[i64]) -> Result<Vec<i64>> {
    let input = input.trim();
    if input.is_empty() {
        bail!("Nothing selected.");
    }

    if let Some((lo, hi)) = input.split_once('-') {
        let lo: i64 = lo.trim().parse().with_context(|| format!("Invalid range '{}'", input))?;
        let hi: i64 = hi.trim().parse().with_context(|| format!("Invalid range '{}'", input))?;
        return Ok(known.iter().copied().filter(|id| (lo..=hi).contains(id)).collect());
    }

    input
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid selection '{}'", input))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::menu::testing::Harness;
    use crate::remote::{Call, MockClient};
    use crate::types::FileData;

    fn package(pid: i64, dest: Destination, fids: &[i64]) -> PackageData {
        PackageData {
            pid,
            name: format!("pack{}", pid),
            dest,
            links: fids
                .iter()
                .map(|fid| FileData {
                    fid: *fid,
                    name: format!("file{}", fid),
                    statusmsg: "queued".into(),
                    plugin: "BasePlugin".into(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    fn queue_of(count: i64) -> MockClient {
        MockClient::new().with_packages((1..=count).map(|pid| package(pid, Destination::Queue, &[])).collect())
    }

    #[test]
    fn test_parse_selection_forms() {
        let known = [1, 2, 3, 7, 9];
        assert_eq!(parse_selection("3", &known).unwrap(), vec![3]);
        assert_eq!(parse_selection("1, 2,5", &known).unwrap(), vec![1, 2, 5]);
        assert_eq!(parse_selection("2-7", &known).unwrap(), vec![2, 3, 7]);
        assert!(parse_selection("", &known).is_err());
        assert!(parse_selection("a,b", &known).is_err());
        assert!(parse_selection("1-x", &known).is_err());
    }

    #[test]
    fn test_body_pads_page_to_five_rows() {
        let mut h = Harness::new(queue_of(2));
        let mut menu = ManageFiles::new(Destination::Queue);
        let next = menu.render_body(&mut h.ctx(), 10).unwrap();

        assert_eq!(h.screen.line(10), "Manage Packages:");
        assert_eq!(h.screen.line(12), "d - delete, m - move, r - restart");
        assert_eq!(h.screen.line(13), "1: pack1");
        assert_eq!(h.screen.line(14), "2: pack2");
        assert_eq!(h.screen.line(17), "");
        assert_eq!(h.screen.line(18), "p - previous | n - next");
        assert_eq!(h.screen.line(19), "0. back to main menu");
        assert_eq!(next, 20);
    }

    #[test]
    fn test_paging_removes_letter_and_stops_at_zero() {
        let mut h = Harness::new(queue_of(12));
        let mut menu = ManageFiles::new(Destination::Queue);
        h.type_char(&mut menu, 'p');
        assert_eq!(menu.pos(), 0);
        h.type_char(&mut menu, 'n');
        h.type_char(&mut menu, 'n');
        assert_eq!(menu.pos(), 10);
        assert!(h.input.is_empty());

        menu.render_body(&mut h.ctx(), 1).unwrap();
        assert_eq!(h.screen.line(4), "11: pack11");
        assert_eq!(h.screen.line(5), "12: pack12");
        assert_eq!(h.screen.line(6), "");
    }

    #[test]
    fn test_package_cache_survives_rerender() {
        let mut h = Harness::new(queue_of(3));
        let mut menu = ManageFiles::new(Destination::Queue);
        menu.render_body(&mut h.ctx(), 1).unwrap();
        menu.render_body(&mut h.ctx(), 1).unwrap();
        assert_eq!(h.client.calls(), vec![Call::GetQueueData]);
    }

    #[test]
    fn test_move_toggles_relative_to_target() {
        let client = MockClient::new().with_packages(vec![
            package(4, Destination::Collector, &[]),
            package(5, Destination::Collector, &[]),
        ]);
        let mut h = Harness::new(client);
        let mut menu = ManageFiles::new(Destination::Collector);
        h.type_char(&mut menu, 'm');
        assert_eq!(menu.mode(), Some(Mode::Move));
        assert!(h.input.is_empty());

        assert_eq!(h.enter(&mut menu, "4-5").unwrap(), Action::Stay);
        assert_eq!(
            h.client.mutations(),
            vec![
                Call::GetCollectorData,
                Call::MovePackage { dest: Destination::Queue, pid: 4 },
                Call::MovePackage { dest: Destination::Queue, pid: 5 },
            ]
        );
        assert_eq!(menu.mode(), None);
        assert!(h.input.is_empty());
    }

    #[test]
    fn test_delete_packages_by_list() {
        let mut h = Harness::new(queue_of(3));
        let mut menu = ManageFiles::new(Destination::Queue);
        h.type_char(&mut menu, 'd');
        h.enter(&mut menu, "1,3").unwrap();
        assert!(h.client.calls().contains(&Call::DeletePackages(vec![1, 3])));
    }

    #[test]
    fn test_link_view_restart_and_backspace() {
        let client = MockClient::new().with_packages(vec![package(2, Destination::Queue, &[20, 21, 22])]);
        let mut h = Harness::new(client);
        let mut menu = ManageFiles::new(Destination::Queue);

        h.enter(&mut menu, "2").unwrap();
        assert_eq!(menu.package(), Some(2));
        menu.render_body(&mut h.ctx(), 1).unwrap();
        assert_eq!(h.screen.line(1), "Manage Links:");
        assert_eq!(h.screen.line(4), "20: file20 | queued | BasePlugin");

        h.type_char(&mut menu, 'r');
        h.enter(&mut menu, "21-22").unwrap();
        assert!(h.client.calls().ends_with(&[Call::RestartFile(21), Call::RestartFile(22)]));

        h.type_char(&mut menu, 'd');
        menu.on_backspace(&mut h.ctx()).unwrap();
        assert_eq!(menu.mode(), None);
        assert_eq!(menu.package(), Some(2));
        menu.on_backspace(&mut h.ctx()).unwrap();
        assert_eq!(menu.package(), None);
    }

    #[test]
    fn test_move_in_link_view_is_rejected() {
        let client = MockClient::new().with_packages(vec![package(2, Destination::Queue, &[20, 21])]);
        let mut h = Harness::new(client);
        let mut menu = ManageFiles::new(Destination::Queue);
        h.enter(&mut menu, "2").unwrap();

        h.type_char(&mut menu, 'm');
        let err = h.enter(&mut menu, "20").unwrap_err();
        assert!(err.to_string().contains("cannot be moved"));
        assert_eq!(menu.mode(), Some(Mode::Move));
        assert!(h.client.mutations().is_empty());
    }

    #[test]
    fn test_backspace_with_pending_input_keeps_view() {
        let mut h = Harness::new(queue_of(1));
        let mut menu = ManageFiles::new(Destination::Queue);
        h.enter(&mut menu, "1").unwrap();
        h.input.push('7');
        menu.on_backspace(&mut h.ctx()).unwrap();
        assert_eq!(menu.package(), Some(1));
    }

    #[test]
    fn test_bad_selection_keeps_mode() {
        let mut h = Harness::new(queue_of(2));
        let mut menu = ManageFiles::new(Destination::Queue);
        h.type_char(&mut menu, 'd');
        assert!(h.enter(&mut menu, "one").is_err());
        assert_eq!(menu.mode(), Some(Mode::Delete));
        assert!(!h.client.calls().iter().any(|c| matches!(c, Call::DeletePackages(_))));
    }

    #[test]
    fn test_missing_package_shows_empty_links() {
        let mut h = Harness::new(MockClient::new());
        let mut menu = ManageFiles::new(Destination::Queue);
        h.enter(&mut menu, "99").unwrap();
        menu.render_body(&mut h.ctx(), 1).unwrap();
        assert_eq!(h.screen.line(4), "");
    }

    #[test]
    fn test_lost_connection_in_link_view_propagates() {
        let mut h = Harness::new(queue_of(1));
        let mut menu = ManageFiles::new(Destination::Queue);
        h.enter(&mut menu, "1").unwrap();
        h.client.fail("get_package_data", ClientError::ConnectionClosed);
        let err = menu.render_body(&mut h.ctx(), 1).unwrap_err();
        assert!(crate::error::is_connection_lost(&err));
    }

    #[test]
    fn test_zero_resets() {
        let mut h = Harness::new(queue_of(1));
        let mut menu = ManageFiles::new(Destination::Queue);
        assert_eq!(h.enter(&mut menu, "0").unwrap(), Action::Reset);
    }
}
