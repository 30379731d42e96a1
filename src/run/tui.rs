use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::db::Database;
use crate::ui::app::{App, InputMode};
use crate::ui::commands;

pub(crate) fn as_tui(db: &mut Database) -> Result<()> {
    let mut app = App::new();
    app.load(db)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        tracing::error!("terminal session failed: {e:#}");
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| crate::ui::render::render(f, app))?;

        if let Event::Key(key) = event::read()? {
            // Windows reports releases too
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.show_help {
                app.show_help = false;
                continue;
            }
            match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, db)?,
                InputMode::Command => handle_command_input(key, app, db)?,
                InputMode::Form => handle_form_input(key, app, db)?,
                InputMode::Confirm => handle_confirm_input(key, app, db)?,
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(
    key: event::KeyEvent,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    let len = app.expenses.len();
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('j') | KeyCode::Down => app.cursor.down(len, app.visible_rows),
        KeyCode::Char('k') | KeyCode::Up => app.cursor.up(),
        KeyCode::Char('g') | KeyCode::Home => app.cursor.top(),
        KeyCode::Char('G') | KeyCode::End => app.cursor.bottom(len, app.visible_rows),
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                app.cursor.down(len, app.visible_rows);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                app.cursor.up();
            }
        }
        KeyCode::Char('a') => commands::handle_command("add", app, db)?,
        KeyCode::Char('e') | KeyCode::Enter => commands::handle_command("edit", app, db)?,
        KeyCode::Char('D') => commands::handle_command("delete", app, db)?,
        KeyCode::Char('r') => commands::handle_command("reload", app, db)?,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Esc => app.status_message.clear(),
        _ => {}
    }
    Ok(())
}

fn handle_command_input(
    key: event::KeyEvent,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, db)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_form_input(key: event::KeyEvent, app: &mut App, db: &mut Database) -> Result<()> {
    match key.code {
        KeyCode::Enter => app.submit_form(db)?,
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Tab | KeyCode::Down => app.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.focus_prev(),
        KeyCode::Left => app.cycle_category(false),
        KeyCode::Right => app.cycle_category(true),
        KeyCode::Backspace => app.form_pop(),
        KeyCode::Char(c) => app.form_push(c),
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(
    key: event::KeyEvent,
    app: &mut App,
    db: &mut Database,
) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_pending(db)?,
        // Any other key = cancel
        _ => app.cancel_pending(),
    }
    Ok(())
}
