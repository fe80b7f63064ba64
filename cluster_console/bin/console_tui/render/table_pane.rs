/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use ratatui::layout::Constraint;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Row;
use ratatui::widgets::Table;
use ratatui::widgets::TableState;

use crate::App;

/// Render the resource table of the active viewer.
///
/// Column widths follow the widest cell (header included). The
/// selected row is highlighted; scrolling uses the table's own
/// offset so the cursor stays visible.
pub(crate) fn render_table(frame: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let scheme = &app.theme.scheme;
    let labels = &app.theme.labels;
    let table = app.viewer.table();

    let mut title = vec![Span::styled(format!(" {} ", app.viewer.title()), scheme.app_name)];
    if let Some((column, ascending)) = table.sort_column() {
        let arrow = if ascending { "↑" } else { "↓" };
        title.push(Span::styled(format!("{}{} ", column, arrow), scheme.stat_label));
    }
    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_style(if app.shell.modal.is_some() {
            scheme.border_focused
        } else {
            scheme.border
        });

    if table.rows().is_empty() {
        let (text, style) = match table.error() {
            Some(err) => (err.to_string(), scheme.error),
            None if app.viewer.state().in_flight() > 0 => (labels.loading.to_string(), scheme.info),
            None => (labels.empty.to_string(), scheme.info),
        };
        frame.render_widget(Paragraph::new(Span::styled(text, style)).block(block), area);
        return;
    }

    let mut widths: Vec<usize> = table.headers().iter().map(|h| h.len()).collect();
    for row in table.rows() {
        for (w, cell) in widths.iter_mut().zip(&row.cells) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let constraints: Vec<Constraint> = widths
        .iter()
        .map(|w| Constraint::Length(*w as u16))
        .collect();

    let header = Row::new(table.headers().iter().copied()).style(scheme.header_row);
    let rows = table
        .rows()
        .iter()
        .map(|r| Row::new(r.cells.iter().cloned()).style(scheme.row));

    let widget = Table::new(rows, constraints)
        .header(header)
        .block(block)
        .column_spacing(2)
        .row_highlight_style(scheme.row_selected)
        .highlight_symbol(labels.selection_caret);
    let mut state = TableState::default()
        .with_selected(Some(table.cursor().pos()))
        .with_offset(table.scroll_offset());
    frame.render_stateful_widget(widget, area, &mut state);
}
