/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use cluster_console::viewer::MutationPhase;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;

use crate::App;
use crate::theme::ThemeName;

/// Render the top status/header bar.
///
/// Line 1 carries connection context (server, namespace, refresh
/// interval, read-only, mutation phase); line 2 the selected row or
/// the pending flash message.
pub(crate) fn render_header(frame: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let l = &app.theme.labels;
    let s = &app.theme.scheme;
    let state = app.viewer.state();

    // Line 1: console • http://127.0.0.1:8001 • ns:all • ⟳ 2s
    let namespace = state
        .scope()
        .namespace
        .as_deref()
        .unwrap_or(l.all_namespaces);
    let mut line1 = vec![
        Span::styled(l.app_name, s.app_name),
        Span::styled(l.separator, s.stat_label),
        Span::styled(&app.base_url, s.stat_url),
        Span::styled(l.separator, s.stat_label),
        Span::styled("ns:", s.stat_label),
        Span::styled(namespace, s.stat_system),
    ];

    if app.read_only {
        line1.extend([
            Span::styled(l.separator, s.stat_label),
            Span::styled(l.read_only, s.warn),
        ]);
    }

    match state.phase() {
        MutationPhase::Idle => {}
        MutationPhase::AwaitingConfirmation => line1.extend([
            Span::styled(l.separator, s.stat_label),
            Span::styled(l.phase_awaiting, s.warn),
        ]),
        MutationPhase::Mutating => line1.extend([
            Span::styled(l.separator, s.stat_label),
            Span::styled(l.phase_mutating, s.warn),
        ]),
    }

    // Skip the default theme to reduce noise.
    if !matches!(app.theme_name, ThemeName::Nord) {
        line1.extend([
            Span::styled(l.separator, s.stat_label),
            Span::styled(format!("theme:{}", app.theme_name), s.stat_system),
        ]);
    }

    if !app.refresh_interval_label.is_empty() {
        line1.extend([
            Span::styled(l.separator, s.stat_label),
            Span::styled(l.refresh_icon, s.stat_timing),
            Span::styled(&app.refresh_interval_label, s.stat_timing),
        ]);
    }

    // Line 2: flash message, else selection context.
    let line2 = match &app.shell.flash {
        Some(flash) => {
            let style = if flash.is_error { s.error } else { s.info };
            vec![Span::styled(&flash.text, style)]
        }
        None => match app.viewer.table().selected_item() {
            Some(id) => vec![
                Span::styled(l.selection_caret, s.stat_selection),
                Span::styled(state.descriptor().kind, s.stat_system),
                Span::styled(" ", Style::default()),
                Span::styled(id.to_string(), s.stat_selection),
            ],
            None => vec![Span::styled(l.no_selection, s.info)],
        },
    };

    let header = Paragraph::new(vec![Line::from(line1), Line::from(line2)]).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(s.border),
    );
    frame.render_widget(header, area);
}

/// Render the bottom hint bar.
///
/// Lists the active viewer's visible bindings followed by the global
/// keys.
pub(crate) fn render_footer(frame: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let s = &app.theme.scheme;
    let mut spans = Vec::new();
    for (key, description) in app.viewer.actions().hints() {
        spans.push(Span::styled(format!("<{}>", key), s.hint_key));
        spans.push(Span::styled(format!(" {}  ", description), s.footer_help));
    }
    spans.push(Span::styled(app.theme.labels.global_help, s.footer_help));
    let footer = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, area);
}
