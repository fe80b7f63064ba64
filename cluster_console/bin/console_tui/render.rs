/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

pub mod dialog;
pub mod status_bar;
pub mod table_pane;

use ratatui::layout::Constraint;
use ratatui::layout::Direction;
use ratatui::layout::Layout;

use self::dialog::render_dialog;
use self::status_bar::render_footer;
use self::status_bar::render_header;
use self::table_pane::render_table;
use crate::App;

/// Render a full frame of the TUI.
///
/// Splits the screen into header/body/footer regions, then draws the
/// confirmation dialog on top when one is pending.
pub(crate) fn ui(frame: &mut ratatui::Frame<'_>, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], app);
    render_table(frame, chunks[1], app);
    render_footer(frame, chunks[2], app);

    if let Some(dialog) = &app.shell.modal {
        render_dialog(frame, frame.area(), dialog, &app.theme.scheme);
    }
}
