use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::codec;
use crate::db::DATE_FORMAT;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let title = Span::styled(
        format!(" Expenses ({}) ", app.expenses.len()),
        Style::default()
            .fg(theme::TEXT_DIM)
            .add_modifier(Modifier::BOLD),
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(title);

    if app.expenses.is_empty() {
        let msg = vec![
            Line::from(""),
            Line::from(Span::styled("No expenses recorded yet", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Press a to add one, ? for help",
                theme::dim_style(),
            )),
        ];
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["Type", "Amount", "Date", "Description", "Details"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let rows: Vec<Row> = app
        .expenses
        .iter()
        .enumerate()
        .skip(app.cursor.scroll)
        .take(app.visible_rows)
        .map(|(i, expense)| {
            let style = if i == app.cursor.index {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            let category = expense.category();
            let description = expense.description.as_deref().unwrap_or("-");

            Row::new(vec![
                Cell::from(Span::styled(
                    category.as_str(),
                    theme::category_style(category),
                )),
                Cell::from(Span::styled(
                    format_amount(expense.amount),
                    theme::amount_style(),
                )),
                Cell::from(expense.date.format(DATE_FORMAT).to_string()),
                Cell::from(truncate(description, 40)),
                Cell::from(truncate(&codec::encode_details(&expense.details), 40)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Min(20),
        Constraint::Min(20),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
