use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use super::app::App;
use super::util::format_amount;
use crate::db::Database;

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut Database) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit", cmd_quit, r);
    register_command!("quit", "Quit", cmd_quit, r);
    register_command!("a", "Add a new expense", cmd_add, r);
    register_command!("add", "Add a new expense", cmd_add, r);
    register_command!("e", "Edit the selected expense", cmd_edit, r);
    register_command!("edit", "Edit the selected expense", cmd_edit, r);
    register_command!("delete", "Delete the selected expense", cmd_delete, r);
    register_command!("r", "Reload expenses from the database", cmd_reload, r);
    register_command!("reload", "Reload expenses from the database", cmd_reload, r);
    register_command!("total", "Show the running total", cmd_total, r);
    register_command!(
        "export",
        "Export expenses to CSV (e.g. :export ~/expenses.csv)",
        cmd_export,
        r
    );
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!("help", "Show available commands", cmd_help, r);

    r
});

pub(crate) fn handle_command(input: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        (cmd.run)(args, app, db)?;
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_error(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| (levenshtein(input, k), **k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

// ── Commands ─────────────────────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_add(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.open_add_form();
    Ok(())
}

fn cmd_edit(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    if !app.open_edit_form() {
        app.set_status("Select an expense from the table to update.");
    }
    Ok(())
}

fn cmd_delete(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.request_delete();
    Ok(())
}

fn cmd_reload(_args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    app.refresh_expenses(db)?;
    let count = app.expenses.len();
    if app.skipped_rows > 0 {
        app.set_error(format!(
            "Loaded {count} expenses, skipped {} unreadable row(s)",
            app.skipped_rows
        ));
    } else {
        app.set_status(format!("Loaded {count} expenses"));
    }
    Ok(())
}

fn cmd_total(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.set_status(format!(
        "Total Expenses: {} across {} entries",
        format_amount(app.total),
        app.expenses.len()
    ));
    Ok(())
}

fn cmd_export(args: &str, app: &mut App, db: &mut Database) -> anyhow::Result<()> {
    let path = if args.is_empty() {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        PathBuf::from(home).join("expenses-export.csv")
    } else {
        PathBuf::from(crate::run::shellexpand(args))
    };

    match db.export_to_csv(&path) {
        Ok(count) => app.set_status(format!(
            "Exported {count} expenses to {}",
            path.display()
        )),
        Err(err) => app.set_error(format!("Export failed: {err:#}")),
    }
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _db: &mut Database) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}
