/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Integration tests that exercise the host and the engine together
//! (App + Shell + viewers + rendering). Per-module unit tests live in
//! each module's own `#[cfg(test)] mod tests` block.

use cluster_console::Gvr;
use cluster_console::Host;
use cluster_console::Viewer;
use cluster_console::testing::FakeClient;
use cluster_console::testing::deployment;
use cluster_console::testing::pod;
use cluster_console::testing::replica_set;
use cluster_console::testing::test_env;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use super::*;

fn press(app: &mut App, code: KeyCode) {
    app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
}

fn ctrl(app: &mut App, c: char) {
    app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
}

/// Apply continuations of the active viewer until none is pending.
async fn drain(app: &mut App) {
    while app.viewer.state().in_flight() > 0 {
        match app.viewer.next_deferred().await {
            Some(deferred) => app.apply(deferred),
            None => break,
        }
    }
}

fn seeded() -> std::sync::Arc<FakeClient> {
    let client = FakeClient::new();
    client.insert(&Gvr::new("apps/v1/deployments"), deployment("shop", "web", 2));
    client.insert(
        &Gvr::new("apps/v1/replicasets"),
        replica_set("shop", "web-7f9c", &[("Deployment", "web")]),
    );
    client.insert(&Gvr::new("v1/pods"), pod("shop", "web-7f9c-a", "web"));
    client
}

async fn app_on(client: std::sync::Arc<FakeClient>, kind: &str, read_only: bool) -> App {
    let mut env = test_env(client);
    env.read_only = read_only;
    let descriptor = env.catalog.lookup(kind).unwrap();
    let mut app = App::new("http://test".into(), Viewer::new(descriptor, env), ThemeName::Nord);
    app.viewer.reload();
    drain(&mut app).await;
    app
}

fn screen(app: &App) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
    terminal.draw(|frame| render::ui(frame, app)).unwrap();
    let buffer = terminal.backend().buffer();
    let mut out = String::new();
    for y in 0..buffer.area.height {
        for x in 0..buffer.area.width {
            out.push_str(buffer[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

// Owner navigation pushes history and Esc returns.
#[tokio::test]
async fn owner_navigation_and_back() {
    let mut app = app_on(seeded(), "replicasets", false).await;
    assert_eq!(app.viewer.title(), "ReplicaSets(all)");

    press(&mut app, KeyCode::Char('o'));
    drain(&mut app).await;
    assert_eq!(app.viewer.title(), "Deployments(shop/web)");
    assert_eq!(app.history.len(), 1);

    drain(&mut app).await;
    assert_eq!(app.viewer.table().rows().len(), 1);

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.viewer.title(), "ReplicaSets(all)");
    assert!(app.history.is_empty());
    assert!(!app.should_quit);
}

// Enter on a deployment lists its pods.
#[tokio::test]
async fn drill_down_to_pods() {
    let mut app = app_on(seeded(), "deployments", false).await;
    press(&mut app, KeyCode::Enter);
    drain(&mut app).await;
    drain(&mut app).await;
    assert_eq!(app.viewer.title(), "Pods(shop app=web)");
    let names: Vec<_> = app
        .viewer
        .table()
        .rows()
        .iter()
        .map(|r| r.id.name.clone())
        .collect();
    assert_eq!(names, ["web-7f9c-a"]);
}

// The rollback dialog is drawn, blocks quitting and confirms.
#[tokio::test]
async fn rollback_through_dialog() {
    let client = seeded();
    let mut app = app_on(client.clone(), "replicasets", false).await;

    ctrl(&mut app, 'l');
    let dialog = app.shell.modal.clone().unwrap();
    assert_eq!(dialog.message, "Rollback apps/v1/replicasets shop/web-7f9c?");
    let drawn = screen(&app);
    assert!(drawn.contains("Rollback apps/v1/replicasets shop/web-7f9c?"));
    assert!(drawn.contains("awaiting confirmation"));

    press(&mut app, KeyCode::Char('q'));
    assert!(!app.should_quit);

    press(&mut app, KeyCode::Tab);
    press(&mut app, KeyCode::Enter);
    assert!(app.shell.modal.is_none());
    drain(&mut app).await;

    assert_eq!(client.rollbacks().len(), 1);
    let flash = app.shell.flash.clone().unwrap();
    assert_eq!(flash.text, "shop/web-7f9c successfully rolled back");
    assert!(!flash.is_error);
}

// Read-only mode flashes instead of prompting.
#[tokio::test]
async fn read_only_flashes() {
    let client = seeded();
    let mut app = app_on(client.clone(), "replicasets", true).await;
    ctrl(&mut app, 'l');
    assert!(app.shell.modal.is_none());
    assert_eq!(
        app.shell.flash.as_ref().unwrap().text,
        "Rollback is disabled in read-only mode"
    );
    assert!(client.rollbacks().is_empty());
    assert!(screen(&app).contains("read-only"));
}

// Read-only mode with nothing selected ignores the rollback key.
#[tokio::test]
async fn read_only_empty_table_ignores_rollback() {
    let mut app = app_on(FakeClient::new(), "replicasets", true).await;
    assert!(app.viewer.table().rows().is_empty());
    ctrl(&mut app, 'l');
    assert!(app.shell.flash.is_none());
    assert!(app.shell.modal.is_none());
    assert!(!app.should_quit);
}

// A navigation answered after leaving the view does not fire on return.
#[tokio::test]
async fn back_does_not_replay_navigation() {
    let mut app = app_on(seeded(), "replicasets", false).await;
    press(&mut app, KeyCode::Char('o'));
    press(&mut app, KeyCode::Enter);
    drain(&mut app).await;
    assert_eq!(app.viewer.title(), "Pods(shop app=web)");
    assert_eq!(app.history.len(), 1);

    press(&mut app, KeyCode::Esc);
    drain(&mut app).await;
    assert_eq!(app.viewer.title(), "ReplicaSets(all)");
    assert!(app.history.is_empty());
}

// A navigation landing while a dialog is open keeps the dialog up.
#[tokio::test]
async fn navigation_waits_out_open_dialog() {
    let client = seeded();
    let mut app = app_on(client.clone(), "replicasets", false).await;
    press(&mut app, KeyCode::Char('o'));
    ctrl(&mut app, 'l');
    drain(&mut app).await;

    assert_eq!(app.viewer.title(), "ReplicaSets(all)");
    assert!(app.history.is_empty());
    assert_eq!(
        app.viewer.state().phase(),
        cluster_console::viewer::MutationPhase::AwaitingConfirmation
    );
    assert!(app.shell.modal.is_some());
    assert!(screen(&app).contains("Rollback apps/v1/replicasets shop/web-7f9c?"));

    press(&mut app, KeyCode::Esc);
    assert!(app.shell.modal.is_none());
    assert!(client.rollbacks().is_empty());
}

// The table renders headers, rows and visible hints.
#[tokio::test]
async fn renders_table_and_hints() {
    let app = app_on(seeded(), "replicasets", false).await;
    let drawn = screen(&app);
    assert!(drawn.contains("ReplicaSets(all)"));
    assert!(drawn.contains("DESIRED"));
    assert!(drawn.contains("web-7f9c"));
    assert!(drawn.contains("Show Owner"));
    assert!(drawn.contains("Rollback"));
    assert!(!drawn.contains("Sort DESIRED"));
}

// Listing failures are shown in the table pane.
#[tokio::test]
async fn listing_error_is_drawn() {
    let client = FakeClient::new();
    client.fail_list(cluster_console::RemoteError::Request("connection refused".into()));
    let app = app_on(client, "pods", false).await;
    assert!(screen(&app).contains("request failed: connection refused"));
}

// A second activation before commit is refused.
#[test]
fn shell_refuses_second_activation() {
    let mut shell = Shell::default();
    let first = cluster_console::testing::test_viewer();
    let second = cluster_console::testing::test_viewer();
    assert!(shell.request_activate(first, true).is_ok());
    assert_eq!(
        shell.request_activate(second, true).unwrap_err(),
        cluster_console::NavigationError::Pending
    );
}

// q quits when nothing else handles it.
#[tokio::test]
async fn q_quits() {
    let mut app = app_on(seeded(), "pods", false).await;
    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit);
}
