/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use cluster_console::Choice;
use cluster_console::Dialog;
use ratatui::layout::Alignment;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Clear;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;

use crate::theme::ColorScheme;

/// A `width` x `height` rect centered in `area`, clipped to it.
pub(crate) fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Render a confirmation dialog over whatever is below it.
pub(crate) fn render_dialog(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    dialog: &Dialog,
    scheme: &ColorScheme,
) {
    let width = u16::try_from(dialog.message.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(6)
        .clamp(30, 80);
    let rect = centered(area, width, 7);

    let mut buttons = Vec::new();
    for choice in Choice::ALL {
        let style = if choice == dialog.focused {
            scheme.button_focused
        } else {
            scheme.button
        };
        buttons.push(Span::styled(format!(" {} ", choice.label()), style));
        buttons.push(Span::raw("   "));
    }
    buttons.pop();

    let body = Paragraph::new(vec![
        Line::from(dialog.message.as_str()),
        Line::from(""),
        Line::from(buttons),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(format!(" {} ", dialog.title))
            .borders(Borders::ALL)
            .border_style(scheme.border_focused),
    );
    frame.render_widget(Clear, rect);
    frame.render_widget(body, rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Dialogs center and never exceed the screen.
    #[test]
    fn centered_clips_to_area() {
        let area = Rect::new(0, 0, 100, 40);
        assert_eq!(centered(area, 40, 8), Rect::new(30, 16, 40, 8));
        let small = Rect::new(0, 0, 20, 5);
        assert_eq!(centered(small, 40, 8), Rect::new(0, 0, 20, 5));
    }

    // Messages longer than a u16 still draw at the widest size.
    #[test]
    fn huge_message_draws_at_max_width() {
        let dialog = Dialog {
            title: "Confirm".into(),
            message: "x".repeat(usize::from(u16::MAX) + 10),
            focused: Choice::Cancel,
        };
        let mut terminal =
            ratatui::Terminal::new(ratatui::backend::TestBackend::new(120, 20)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_dialog(frame, area, &dialog, &ColorScheme::nord());
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        // An 80-wide dialog in 120 columns starts at x = 20.
        assert_eq!(buffer[(20, 6)].symbol(), "┌");
        assert_eq!(buffer[(99, 6)].symbol(), "┐");
    }
}
