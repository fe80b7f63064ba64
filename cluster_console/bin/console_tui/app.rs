/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::io;
use std::time::Duration;
use std::time::Instant;

use cluster_console::Dialog;
use cluster_console::Host;
use cluster_console::Key;
use cluster_console::NavigationError;
use cluster_console::Propagation;
use cluster_console::Viewer;
use cluster_console::viewer::Deferred;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::Args;
use crate::Theme;
use crate::ThemeName;
use crate::render::ui;

/// How long a flash message stays on screen.
const FLASH_TTL: Duration = Duration::from_secs(5);

/// A transient status-line message.
#[derive(Debug, Clone)]
pub(crate) struct Flash {
    pub(crate) text: String,
    pub(crate) is_error: bool,
    pub(crate) at: Instant,
}

/// The [`Host`] side of the application: what viewers may ask for
/// during a dispatch.
#[derive(Debug, Default)]
pub(crate) struct Shell {
    pub(crate) flash: Option<Flash>,
    /// Copy of the dialog the active viewer wants shown.
    pub(crate) modal: Option<Dialog>,
    /// Viewer to switch to once the current dispatch returns.
    pending: Option<(Viewer, bool)>,
}

impl Shell {
    fn flash(&mut self, text: String, is_error: bool) {
        self.flash = Some(Flash {
            text,
            is_error,
            at: Instant::now(),
        });
    }

    fn expire_flash(&mut self, now: Instant) {
        if self
            .flash
            .as_ref()
            .is_some_and(|f| now.duration_since(f.at) >= FLASH_TTL)
        {
            self.flash = None;
        }
    }
}

impl Host for Shell {
    fn request_activate(
        &mut self,
        viewer: Viewer,
        add_to_history: bool,
    ) -> Result<(), NavigationError> {
        if self.pending.is_some() {
            return Err(NavigationError::Pending);
        }
        self.pending = Some((viewer, add_to_history));
        Ok(())
    }

    fn notify_info(&mut self, msg: String) {
        tracing::info!(%msg, "flash");
        self.flash(msg, false);
    }

    fn notify_error(&mut self, err: &(dyn std::error::Error + 'static)) {
        tracing::warn!(error = %err, "flash");
        self.flash(err.to_string(), true);
    }

    fn show_modal(&mut self, dialog: &Dialog) {
        self.modal = Some(dialog.clone());
    }

    fn dismiss_modal(&mut self) {
        self.modal = None;
    }
}

// Application state

/// Runtime state for the console.
///
/// `App` owns the active viewer, the viewers the user can go back
/// to, and the [`Shell`] every viewer talks to.
pub(crate) struct App {
    /// Base URL of the API server (e.g. `http://127.0.0.1:8001`).
    pub(crate) base_url: String,
    /// Set when the user requests exit (`q` / `Ctrl-C`).
    pub(crate) should_quit: bool,
    pub(crate) viewer: Viewer,
    /// Previously active viewers, most recent last.
    pub(crate) history: Vec<Viewer>,
    pub(crate) shell: Shell,
    pub(crate) read_only: bool,
    /// Human-readable refresh interval (e.g. "2s").
    pub(crate) refresh_interval_label: String,
    /// Height of the table viewport in rows (updated during
    /// rendering).
    pub(crate) table_viewport_height: usize,
    pub(crate) theme: Theme,
    pub(crate) theme_name: ThemeName,
}

impl App {
    pub(crate) fn new(base_url: String, viewer: Viewer, theme_name: ThemeName) -> Self {
        let read_only = viewer.actions().is_read_only();
        Self {
            base_url,
            should_quit: false,
            viewer,
            history: Vec::new(),
            shell: Shell::default(),
            read_only,
            refresh_interval_label: String::new(),
            table_viewport_height: 20,
            theme: Theme::new(theme_name),
            theme_name,
        }
    }

    /// Handle a single keypress.
    ///
    /// The active viewer sees the key first; only keys it passes
    /// through reach the global bindings.
    pub(crate) fn on_key(&mut self, event: KeyEvent) {
        let key = Key::from(event);
        if self.viewer.handle_key(key, &mut self.shell) == Propagation::PassThrough {
            match key.code {
                KeyCode::Char('q') => self.should_quit = true,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.should_quit = true
                }
                KeyCode::Esc => self.back(),
                _ => {}
            }
        }
        self.commit_navigation();
        self.ensure_cursor_visible();
    }

    /// Apply a continuation of the active viewer.
    pub(crate) fn apply(&mut self, deferred: Deferred) {
        self.viewer.apply(deferred, &mut self.shell);
        self.commit_navigation();
        self.ensure_cursor_visible();
    }

    /// Periodic tick: expire the flash and re-list the active table.
    ///
    /// No reload is started while a dialog is open or a call is still
    /// outstanding.
    pub(crate) fn tick(&mut self) {
        self.shell.expire_flash(Instant::now());
        if self.shell.modal.is_none() && self.viewer.state().in_flight() == 0 {
            self.viewer.reload();
        }
    }

    /// Switch to the viewer requested during the last dispatch.
    fn commit_navigation(&mut self) {
        let Some((next, add_to_history)) = self.shell.pending.take() else {
            return;
        };
        tracing::info!(to = %next.title(), add_to_history, "activate");
        let mut prev = std::mem::replace(&mut self.viewer, next);
        prev.suspend();
        if add_to_history {
            self.history.push(prev);
        }
        self.sync_modal();
    }

    /// Return to the previous viewer, if any.
    pub(crate) fn back(&mut self) {
        let Some(prev) = self.history.pop() else {
            return;
        };
        tracing::info!(to = %prev.title(), "back");
        self.viewer = prev;
        self.viewer.reload();
        self.sync_modal();
    }

    fn sync_modal(&mut self) {
        self.shell.modal = self.viewer.state().dialog().cloned();
    }

    fn ensure_cursor_visible(&mut self) {
        let height = self.table_viewport_height;
        self.viewer.table_mut().ensure_cursor_visible(height);
    }
}

/// Drive the main event loop.
///
/// Renders each turn, then waits for whichever comes first: the
/// refresh tick, a continuation of the active viewer or a terminal
/// event.
pub(crate) async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    args: &Args,
    mut app: App,
) -> io::Result<()> {
    let mut refresh_interval = tokio::time::interval(Duration::from_millis(args.refresh_ms));
    refresh_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    app.refresh_interval_label = if args.refresh_ms >= 1000 && args.refresh_ms.is_multiple_of(1000)
    {
        format!("{}s", args.refresh_ms / 1000)
    } else {
        format!("{}ms", args.refresh_ms)
    };
    let mut events = EventStream::new();

    loop {
        // Body area is terminal height minus header (3), footer (2)
        // and the table's border and header row (3).
        let terminal_size = terminal.size()?;
        app.table_viewport_height = terminal_size.height.saturating_sub(8).max(1) as usize;

        terminal.draw(|frame| ui(frame, &app))?;

        tokio::select! {
            _ = refresh_interval.tick() => {
                app.tick();
            }
            Some(deferred) = app.viewer.next_deferred() => {
                app.apply(deferred);
            }
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        app.on_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e),
                    None => break,
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
