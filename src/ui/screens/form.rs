use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::form::FormField;
use crate::ui::app::App;
use crate::ui::theme;

const LABEL_WIDTH: usize = 20;

/// Add/edit popup centered over the expense table.
pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let fields = app.form.fields();
    let focused = app.focused_field();

    let mut lines = vec![Line::from("")];
    let mut cursor = None;
    for (row, field) in fields.iter().enumerate() {
        let is_focused = *field == focused;
        let label_style = if is_focused {
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            theme::dim_style()
        };
        let label = format!(" {:<LABEL_WIDTH$}", field.label());
        let value = app.form.text(*field);

        let value_span = match field {
            FormField::Category => Span::styled(
                format!("< {value} >"),
                theme::category_style(app.form.category).add_modifier(Modifier::BOLD),
            ),
            _ => Span::styled(value.to_string(), theme::normal_style()),
        };
        if is_focused && *field != FormField::Category {
            cursor = Some((label.chars().count() + value.chars().count(), row + 1));
        }
        lines.push(Line::from(vec![Span::styled(label, label_style), value_span]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Tab next | Left/Right type | Enter save | Esc cancel",
        theme::dim_style(),
    )));

    let title = if app.editing_id.is_some() {
        " Edit Expense "
    } else {
        " Add Expense "
    };

    let popup_height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup_width = 64.min(area.width.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(x, y, popup_width, popup_height);

    f.render_widget(Clear, popup_area);
    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT))
            .title(Span::styled(
                title,
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD),
            ))
            .style(Style::default().bg(theme::HEADER_BG)),
    );
    f.render_widget(popup, popup_area);

    if let Some((col, row)) = cursor {
        let col = (popup_area.x + 1).saturating_add(col as u16);
        let row = (popup_area.y + 1).saturating_add(row as u16);
        if col < popup_area.right() && row < popup_area.bottom() {
            f.set_cursor_position((col, row));
        }
    }
}
