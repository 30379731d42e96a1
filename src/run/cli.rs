use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::codec;
use crate::db::{Database, DATE_FORMAT};
use crate::error::ExpenseError;
use crate::form::ExpenseForm;
use crate::models::{self, Category, Expense};
use crate::ui::util::{format_amount, truncate};

const FLAGS: &[&str] = &[
    "--date",
    "--description",
    "--restaurant",
    "--destination",
    "--transport",
    "--utility-type",
];

pub(crate) fn as_cli(args: &[String], db: &mut Database) -> Result<()> {
    match args[1].as_str() {
        "add" | "a" => cli_add(&args[2..], db),
        "update" | "u" => cli_update(&args[2..], db),
        "delete" | "rm" => cli_delete(&args[2..], db),
        "list" | "ls" => cli_list(db),
        "total" => cli_total(db),
        "export" => cli_export(&args[2..], db),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("expensetracker {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("Expense Tracker: record food, travel and utility expenses");
    println!();
    println!("Usage: expensetracker [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Launch interactive TUI");
    let types: Vec<String> = Category::all()
        .iter()
        .map(|c| c.as_str().to_lowercase())
        .collect();
    println!(
        "  add <type> <amount> [flags]     Record an expense (type: {})",
        types.join(", ")
    );
    println!("  update <id> <type> <amount> [flags]");
    println!("                                  Replace an expense; omitted flags keep their value");
    println!("  delete <id>                     Delete an expense");
    println!("  list                            List expenses, newest first");
    println!("  total                           Print the sum of all expenses");
    println!("  export [path]                   Export expenses to CSV");
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
    println!();
    println!("Flags:");
    println!("  --date <YYYY-MM-DD>             Defaults to today");
    println!("  --description <text>");
    println!("  --restaurant <name>             Food");
    println!("  --destination <place>           Travel");
    println!("  --transport <mode>              Travel");
    println!("  --utility-type <kind>           Utility");
}

fn cli_add(args: &[String], db: &mut Database) -> Result<()> {
    let [category, amount, flags @ ..] = args else {
        anyhow::bail!("Usage: expensetracker add <type> <amount> [flags]");
    };
    let mut form = ExpenseForm::new();
    apply_args(&mut form, category, amount, flags)?;
    let expense = form.to_expense()?;
    warn_if_lossy(&expense);

    let saved = db.create(&expense)?;
    println!(
        "Added expense #{}: {} {} on {}",
        saved.id.unwrap_or_default(),
        saved.category(),
        format_amount(saved.amount),
        saved.date.format(DATE_FORMAT)
    );
    Ok(())
}

fn cli_update(args: &[String], db: &mut Database) -> Result<()> {
    let [id, category, amount, flags @ ..] = args else {
        anyhow::bail!("Usage: expensetracker update <id> <type> <amount> [flags]");
    };
    let id = parse_id(id)?;
    let listing = db.read_all_checked()?;
    // An unreadable row can still be overwritten, but nothing carries over.
    let mut form = match listing.expenses.iter().find(|e| e.id == Some(id)) {
        Some(existing) => ExpenseForm::from_expense(existing),
        None if listing.skipped.iter().any(|s| s.id == id) => ExpenseForm::new(),
        None => return Err(ExpenseError::InvalidReference(Some(id)).into()),
    };
    apply_args(&mut form, category, amount, flags)?;
    let expense = form.to_expense()?.with_id(id);
    warn_if_lossy(&expense);

    db.update(&expense)?;
    println!("Updated expense #{id}");
    Ok(())
}

fn cli_delete(args: &[String], db: &mut Database) -> Result<()> {
    let [id] = args else {
        anyhow::bail!("Usage: expensetracker delete <id>");
    };
    let id = parse_id(id)?;
    db.delete(id)?;
    println!("Deleted expense #{id}");
    Ok(())
}

fn cli_list(db: &mut Database) -> Result<()> {
    let listing = db.read_all_checked()?;
    for skipped in &listing.skipped {
        eprintln!("warning: skipped expense #{}: {}", skipped.id, skipped.error);
    }
    if listing.expenses.is_empty() {
        println!("No expenses");
        return Ok(());
    }

    println!(
        "{:<5} {:<8} {:>12}  {:<10}  {:<24} Details",
        "ID", "Type", "Amount", "Date", "Description"
    );
    println!("{}", "─".repeat(80));
    for expense in &listing.expenses {
        println!(
            "{:<5} {:<8} {:>12}  {:<10}  {:<24} {}",
            expense.id.unwrap_or_default(),
            expense.category().as_str(),
            format_amount(expense.amount),
            expense.date.format(DATE_FORMAT),
            truncate(expense.description.as_deref().unwrap_or("-"), 24),
            codec::encode_details(&expense.details)
        );
    }
    println!("{}", "─".repeat(80));
    println!(
        "Total Expenses: {}",
        format_amount(models::total(&listing.expenses))
    );
    Ok(())
}

fn cli_total(db: &mut Database) -> Result<()> {
    let expenses = db.read_all()?;
    println!("Total Expenses: {}", format_amount(models::total(&expenses)));
    Ok(())
}

fn cli_export(args: &[String], db: &mut Database) -> Result<()> {
    // Output path is the first non-flag argument
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| PathBuf::from(shellexpand(a)))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join("expenses-export.csv")
        });

    let count = db.export_to_csv(&output_path)?;
    println!("Exported {count} expenses to {}", output_path.display());
    Ok(())
}

/// Fills the form from `<type> <amount>` and the trailing `--flag value` pairs.
fn apply_args(
    form: &mut ExpenseForm,
    category: &str,
    amount: &str,
    flags: &[String],
) -> Result<()> {
    form.category = Category::parse(category)?;
    form.amount = amount.to_string();

    for (i, arg) in flags.iter().enumerate().step_by(2) {
        if !FLAGS.contains(&arg.as_str()) {
            anyhow::bail!("Unknown option: {arg}");
        }
        let value = flags
            .get(i + 1)
            .with_context(|| format!("Missing value for {arg}"))?
            .clone();
        match arg.as_str() {
            "--date" => form.date = value,
            "--description" => form.description = value,
            "--restaurant" => form.restaurant = value,
            "--destination" => form.destination = value,
            "--transport" => form.transport_mode = value,
            _ => form.utility_type = value,
        }
    }
    Ok(())
}

fn parse_id(text: &str) -> Result<i64> {
    text.parse()
        .with_context(|| format!("Invalid expense id: {text}"))
}

fn warn_if_lossy(expense: &Expense) {
    if !codec::round_trips(&expense.details) {
        eprintln!(
            "warning: travel fields containing \"{}\" will not read back intact",
            codec::TRAVEL_SEPARATOR
        );
    }
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}
