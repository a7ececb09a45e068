// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Concurrency tests for the dashboard session.
//!
//! The input loop and the refresh loop share one screen lock. These tests
//! drive both against a `MockClient` and a `MemoryScreen` and check that
//! Ctrl-C never waits on the lock, that a lost connection stops the refresh
//! loop, and that the footer bookkeeping holds under interleaving.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use pyload_cli::error::ClientError;
use pyload_cli::locks::resilient_lock;
use pyload_cli::menu::MenuKind;
use pyload_cli::remote::{Call, MockClient};
use pyload_cli::session::{Flow, TickOutcome};
use pyload_cli::types::{Destination, PackageData};
use pyload_cli::{InputEvent, MemoryScreen, Session, SessionEnd};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

fn session_with(client: MockClient) -> (Session, Arc<MockClient>, MemoryScreen) {
    let client = Arc::new(client);
    let screen = MemoryScreen::new();
    let session = Session::new(client.clone(), Box::new(screen.clone()));
    (session, client, screen)
}

fn chars(text: &str) -> Vec<InputEvent> {
    text.chars().map(InputEvent::Char).collect()
}

// =============================================================================
// CTRL-C
// =============================================================================

#[test]
fn test_interrupt_while_refresh_holds_lock() {
    let (session, _, _) = session_with(MockClient::new());
    let state = session.state();
    let (locked_tx, locked_rx) = mpsc::channel();

    // Stand-in for a refresh tick stuck inside a remote call.
    let holder = thread::spawn(move || {
        let _guard = resilient_lock(&state);
        locked_tx.send(()).unwrap();
        thread::sleep(Duration::from_secs(2));
    });
    locked_rx.recv_timeout(TEST_TIMEOUT).unwrap();

    let input = session.input_loop();
    let (done_tx, done_rx) = mpsc::channel();
    thread::spawn(move || {
        done_tx.send(input.handle(InputEvent::Interrupt)).unwrap();
    });

    let flow = done_rx
        .recv_timeout(Duration::from_millis(500))
        .expect("interrupt blocked on the screen lock");
    assert_eq!(flow, Flow::Exit(SessionEnd::Interrupted));
    holder.join().unwrap();
}

#[test]
fn test_interrupt_ends_run_without_further_calls() {
    let (session, client, _) = session_with(MockClient::new());
    let (tx, rx) = mpsc::channel();
    tx.send(InputEvent::Char('1')).unwrap();
    tx.send(InputEvent::Interrupt).unwrap();
    tx.send(InputEvent::Char('5')).unwrap();

    assert_eq!(session.run(rx), SessionEnd::Interrupted);
    assert!(client.mutations().is_empty());
}

// =============================================================================
// REFRESH LOOP
// =============================================================================

#[test]
fn test_lost_connection_stops_refresh_loop() {
    let (session, client, _) = session_with(MockClient::new());
    client.fail("status_downloads", ClientError::ConnectionClosed);

    let (lost_tx, lost_rx) = mpsc::channel();
    let handle = session
        .refresh_loop(Duration::from_millis(5))
        .spawn(move || lost_tx.send(()).unwrap())
        .unwrap();

    lost_rx.recv_timeout(TEST_TIMEOUT).unwrap();
    handle.join().unwrap();
}

#[test]
fn test_stop_ends_refresh_loop() {
    let (session, _, screen) = session_with(MockClient::new());
    let handle = session
        .refresh_loop(Duration::from_millis(5))
        .spawn(|| panic!("connection reported lost"))
        .unwrap();

    thread::sleep(Duration::from_millis(50));
    session.stop();
    handle.join().unwrap();
    assert_eq!(screen.line(1), "pyLoad Command Line Interface");
}

#[test]
fn test_refresh_error_resets_menu() {
    let (session, client, screen) = session_with(MockClient::new());
    let input = session.input_loop();
    input.handle(InputEvent::Char('1'));
    assert_eq!(resilient_lock(&session.state()).active_menu(), MenuKind::AddPackage);

    client.fail_once("status_server", ClientError::Remote("temporarily unavailable".into()));
    let outcome = session.refresh_loop(Duration::ZERO).tick();

    assert!(matches!(outcome, TickOutcome::Recovered(_)));
    assert_eq!(resilient_lock(&session.state()).active_menu(), MenuKind::Main);
    assert!(screen.line(2).contains("temporarily unavailable"));
    assert_eq!(session.refresh_loop(Duration::ZERO).tick(), TickOutcome::Rendered);
}

// =============================================================================
// INTERLEAVING
// =============================================================================

#[test]
fn test_input_and_refresh_interleave() {
    let client = MockClient::new().with_packages(
        (1..=8)
            .map(|pid| PackageData {
                pid,
                name: format!("pack{}", pid),
                dest: Destination::Queue,
                ..Default::default()
            })
            .collect(),
    );
    let (session, client, screen) = session_with(client);
    let handle = session
        .refresh_loop(Duration::from_millis(1))
        .spawn(|| panic!("connection reported lost"))
        .unwrap();

    let (tx, rx) = mpsc::channel();
    let mut events = Vec::new();
    events.extend(chars("2nnp"));
    events.push(InputEvent::Escape);
    events.extend(chars("d1-3"));
    events.push(InputEvent::Enter);
    events.extend(chars("0"));
    events.push(InputEvent::Enter);
    events.extend(chars("6"));
    let feeder = thread::spawn(move || {
        for event in events {
            tx.send(event).unwrap();
            thread::sleep(Duration::from_millis(2));
        }
    });

    assert_eq!(session.run(rx), SessionEnd::Quit);
    feeder.join().unwrap();
    handle.join().unwrap();

    assert!(client.calls().contains(&Call::DeletePackages(vec![1, 2, 3])));
    assert!(screen.clears() >= 2);
}

#[test]
fn test_footer_tracks_body_for_every_event() {
    let (session, _, screen) = session_with(MockClient::new());
    let input = session.input_loop();
    session.refresh_loop(Duration::ZERO).tick();

    let mut events = chars("1Pkg");
    events.push(InputEvent::Enter);
    events.extend(chars("http://a"));
    events.push(InputEvent::Backspace);
    events.push(InputEvent::Enter);
    events.extend(chars("0"));
    events.push(InputEvent::Enter);
    events.extend(chars("3"));
    events.push(InputEvent::Backspace);
    events.extend(chars("0"));
    events.push(InputEvent::Enter);

    let mut highest = 0;
    for event in events {
        assert_eq!(input.handle(event), Flow::Continue);
        let state = session.state();
        let state = resilient_lock(&state);
        let footer = state.footer_row();
        highest = highest.max(footer);

        assert_eq!(screen.line(footer), format!(" Input: {}", state.input()));
        assert_eq!(screen.line(footer - 1), "");
        for row in footer + 1..=highest {
            assert_eq!(screen.line(row), "", "stale row {} below footer {}", row, footer);
        }
    }
}

#[test]
fn test_every_switch_clears_buffer() {
    let (session, _, _) = session_with(MockClient::new());
    let input = session.input_loop();

    for (typed, menu) in [
        ("ab1", MenuKind::AddPackage),
        ("xyz2", MenuKind::ManageFiles(Destination::Queue)),
        ("  q3", MenuKind::ManageFiles(Destination::Collector)),
    ] {
        for event in chars(typed) {
            input.handle(event);
        }
        {
            let state = session.state();
            let state = resilient_lock(&state);
            assert_eq!(state.active_menu(), menu);
            assert_eq!(state.input(), "");
        }
        for event in chars("0") {
            input.handle(event);
        }
        input.handle(InputEvent::Enter);
        assert_eq!(resilient_lock(&session.state()).active_menu(), MenuKind::Main);
    }
}
