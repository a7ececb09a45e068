// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! One-shot command scenarios against a recording client.

use std::time::Duration;

use pyload_cli::commands::COMMANDS;
use pyload_cli::format::strip_ansi;
use pyload_cli::remote::{Call, MockClient};
use pyload_cli::types::{OnlineCheck, OnlineStatus, CHECK_FINISHED};
use pyload_cli::{CommandDispatcher, Destination, PackageData, RemoteClient};

fn run(client: &MockClient, line: &str) -> String {
    let mut words = line.split_whitespace().map(str::to_string);
    let command = words.next().unwrap_or_default();
    let args: Vec<String> = words.collect();

    let mut dispatcher = CommandDispatcher::new(client, Vec::new()).with_poll_interval(Duration::ZERO);
    dispatcher.run(&command, &args).unwrap();
    strip_ansi(&String::from_utf8(dispatcher.into_output()).unwrap())
}

fn batch(rid: i64, url: &str, name: &str, status: i32) -> OnlineCheck {
    let mut check = OnlineCheck {
        rid,
        ..Default::default()
    };
    check.data.insert(
        url.to_string(),
        OnlineStatus {
            name: name.to_string(),
            plugin: "BasePlugin".into(),
            status,
            size: 1024 * 1024,
            ..Default::default()
        },
    );
    check
}

#[test]
fn test_add_sends_one_call_to_queue() {
    let client = MockClient::new();
    let out = run(&client, "add MyPack http://a http://b");

    assert_eq!(
        client.calls(),
        vec![Call::AddPackage {
            name: "MyPack".into(),
            links: vec!["http://a".into(), "http://b".into()],
            dest: Destination::Queue,
        }]
    );
    assert_eq!(out.trim(), "[+] Package added.");
}

#[test]
fn test_check_prints_batches_until_finished() {
    let client = MockClient::new().with_check(
        7,
        vec![
            batch(7, "http://a", "a.bin", 2),
            batch(CHECK_FINISHED, "http://b", "b.bin", 1),
        ],
    );
    let out = run(&client, "check http://a http://b");

    assert_eq!(
        client.calls(),
        vec![
            Call::CheckOnlineStatus(vec!["http://a".into(), "http://b".into()]),
            Call::PollResults(7),
            Call::PollResults(7),
        ]
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Checking 2 links:");
    assert_eq!(lines[1], "");
    assert_eq!(lines.len(), 4);
    assert!(lines[2].starts_with("a.bin") && lines[2].ends_with("Online"));
    assert!(lines[3].starts_with("b.bin") && lines[3].ends_with("Offline"));
}

#[test]
fn test_unknown_command_lists_commands() {
    let client = MockClient::new();
    let out = run(&client, "foobar");

    assert!(client.calls().is_empty());
    assert!(out.starts_with("List of commands:"));
    for (synopsis, _) in COMMANDS {
        assert!(out.contains(synopsis), "missing {}", synopsis);
    }
}

#[test]
fn test_move_toggles_each_package_once() {
    let client = MockClient::new().with_packages(vec![
        PackageData {
            pid: 1,
            dest: Destination::Queue,
            ..Default::default()
        },
        PackageData {
            pid: 2,
            dest: Destination::Collector,
            ..Default::default()
        },
    ]);
    run(&client, "move 1 2");

    let moves: Vec<Call> = client
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::MovePackage { .. }))
        .collect();
    assert_eq!(
        moves,
        vec![
            Call::MovePackage {
                dest: Destination::Collector,
                pid: 1
            },
            Call::MovePackage {
                dest: Destination::Queue,
                pid: 2
            },
        ]
    );

    // Moving back restores both.
    run(&client, "move 1 2");
    let queue: Vec<i64> = client.get_queue_data().unwrap().iter().map(|p| p.pid).collect();
    assert_eq!(queue, vec![1]);
}

#[test]
fn test_delete_and_pause_commands() {
    let client = MockClient::new();
    assert!(run(&client, "del_file 3 4").contains("Files deleted."));
    assert!(run(&client, "del_package 9").contains("Packages deleted."));
    run(&client, "pause");
    assert!(client.is_paused());
    run(&client, "unpause");
    assert!(!client.is_paused());
    assert_eq!(
        client.calls(),
        vec![
            Call::DeleteFiles(vec![3, 4]),
            Call::DeletePackages(vec![9]),
            Call::PauseServer,
            Call::UnpauseServer,
        ]
    );
}
