/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Interactive terminal console for cluster workloads.
//!
//! Lists deployments, replica sets and pods from the Kubernetes REST
//! API (for example behind `kubectl proxy`) and lets the user walk
//! between them: `o` reveals a row's owner, `Enter` lists the pods a
//! row selects, `Esc` goes back. Replica sets can be rolled back with
//! `Ctrl-L` after confirmation, unless `--read-only` is set.
//!
//! All screen logic lives in the `cluster_console` engine; this binary
//! is its host. It owns the terminal, the navigation history and the
//! flash/modal state viewers ask for through `Host`.
//!
//! Logs go to a file (`--log-file`) because the terminal belongs to
//! the TUI; `RUST_LOG` selects the level.
//!
//! ```bash
//! # Terminal 1
//! kubectl proxy --port 8001
//!
//! # Terminal 2
//! cargo run --bin console_tui -- --kind replicasets -n shop
//! ```

mod app;
mod client;
mod render;
mod theme;

use std::io;
use std::io::IsTerminal;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
pub(crate) use app::*;
use clap::Parser;
use cluster_console::Catalog;
use cluster_console::Viewer;
use cluster_console::ViewerEnv;
use crossterm::ExecutableCommand;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
pub(crate) use theme::*;
use tracing_subscriber::EnvFilter;

// Terminal setup / teardown

/// Put the terminal into "TUI mode".
///
/// Enables raw mode, switches to the alternate screen, and clears it,
/// returning a `ratatui::Terminal` backed by crossterm.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;
    Ok(terminal)
}

/// Restore the terminal back to normal "shell mode".
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Send `tracing` output to `args.log_path()`.
fn init_tracing(args: &Args) -> anyhow::Result<()> {
    let path = args.log_path();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

// Main loop

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if !io::stdout().is_terminal() {
        eprintln!("This TUI requires a real terminal.");
        return Ok(());
    }

    init_tracing(&args)?;

    let remote = client::build_client(&args)?;
    let base_url = remote.base_url.clone();
    let catalog = Arc::new(Catalog::builtin());
    let descriptor = catalog
        .lookup(&args.kind)
        .with_context(|| format!("unknown kind {}", args.kind))?;
    let env = ViewerEnv {
        remote: Arc::new(remote),
        catalog,
        namespace: args.namespace.clone(),
        read_only: args.read_only,
    };
    tracing::info!(addr = %base_url, kind = descriptor.kind, read_only = args.read_only, "starting");

    let mut app = App::new(base_url, Viewer::new(descriptor, env), args.theme);

    // Spinner on stderr while the first listing loads; it runs
    // before the alternate screen so it reads as a normal line.
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("valid template"),
    );
    spinner.set_message(format!("console: connecting to {} ...", app.base_url));
    spinner.enable_steady_tick(Duration::from_millis(80));

    app.viewer.reload();
    match tokio::time::timeout(Duration::from_secs(10), app.viewer.next_deferred()).await {
        Ok(Some(deferred)) => app.apply(deferred),
        Ok(None) => {}
        Err(_) => tracing::warn!("initial listing timed out"),
    }

    spinner.finish_and_clear();

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, &args, app).await;
    restore_terminal(&mut terminal)?;
    Ok(result?)
}

#[cfg(test)]
mod tests;
