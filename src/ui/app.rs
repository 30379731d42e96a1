use anyhow::Result;
use rust_decimal::Decimal;

use crate::codec;
use crate::db::{Database, DATE_FORMAT};
use crate::form::{ExpenseForm, FormField};
use crate::models::{self, Expense};
use crate::ui::util::{format_amount, ListCursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Form,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Form => write!(f, "FORM"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingAction {
    DeleteExpense { id: i64, label: String },
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) status_message: String,
    pub(crate) status_is_error: bool,
    pub(crate) show_help: bool,

    // Expenses
    pub(crate) expenses: Vec<Expense>,
    pub(crate) total: Decimal,
    pub(crate) skipped_rows: usize,
    pub(crate) cursor: ListCursor,

    // Add / edit form
    pub(crate) form: ExpenseForm,
    pub(crate) form_focus: usize,
    pub(crate) editing_id: Option<i64>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            running: true,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            status_message: String::new(),
            status_is_error: false,
            show_help: false,

            expenses: Vec::new(),
            total: Decimal::ZERO,
            skipped_rows: 0,
            cursor: ListCursor::default(),

            form: ExpenseForm::new(),
            form_focus: 0,
            editing_id: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// First load; also tells the user about rows that could not be read.
    pub(crate) fn load(&mut self, db: &Database) -> Result<()> {
        self.refresh_expenses(db)?;
        if self.skipped_rows > 0 {
            self.set_error(format!(
                "{} stored expense(s) could not be read and were skipped (see log)",
                self.skipped_rows
            ));
        }
        Ok(())
    }

    pub(crate) fn refresh_expenses(&mut self, db: &Database) -> Result<()> {
        let listing = db.read_all_checked()?;
        self.expenses = listing.expenses;
        self.skipped_rows = listing.skipped.len();
        self.total = models::total(&self.expenses);
        self.cursor.clamp(self.expenses.len());
        Ok(())
    }

    pub(crate) fn selected(&self) -> Option<&Expense> {
        self.expenses.get(self.cursor.index)
    }

    fn select_id(&mut self, id: i64) {
        if let Some(pos) = self.expenses.iter().position(|e| e.id == Some(id)) {
            self.cursor.index = pos;
            if pos < self.cursor.scroll || pos >= self.cursor.scroll + self.visible_rows {
                self.cursor.scroll = pos;
            }
        }
    }

    // ── Form ──────────────────────────────────────────────────

    pub(crate) fn open_add_form(&mut self) {
        self.form = ExpenseForm::new();
        self.form_focus = 0;
        self.editing_id = None;
        self.input_mode = InputMode::Form;
    }

    /// Returns false when nothing is selected.
    pub(crate) fn open_edit_form(&mut self) -> bool {
        let Some(expense) = self.expenses.get(self.cursor.index) else {
            return false;
        };
        self.form = ExpenseForm::from_expense(expense);
        self.editing_id = expense.id;
        self.form_focus = 0;
        self.input_mode = InputMode::Form;
        true
    }

    pub(crate) fn focused_field(&self) -> FormField {
        self.form
            .fields()
            .get(self.form_focus)
            .copied()
            .unwrap_or(FormField::Category)
    }

    pub(crate) fn focus_next(&mut self) {
        let len = self.form.fields().len();
        self.form_focus = (self.form_focus + 1) % len;
    }

    pub(crate) fn focus_prev(&mut self) {
        let len = self.form.fields().len();
        self.form_focus = (self.form_focus + len - 1) % len;
    }

    pub(crate) fn cycle_category(&mut self, forward: bool) {
        self.form.category = if forward {
            self.form.category.next()
        } else {
            self.form.category.prev()
        };
        let len = self.form.fields().len();
        if self.form_focus >= len {
            self.form_focus = len - 1;
        }
    }

    pub(crate) fn form_push(&mut self, c: char) {
        match self.focused_field() {
            FormField::Category if c == ' ' => self.cycle_category(true),
            field => {
                if let Some(buf) = self.form.text_mut(field) {
                    buf.push(c);
                }
            }
        }
    }

    pub(crate) fn form_pop(&mut self) {
        let field = self.focused_field();
        if let Some(buf) = self.form.text_mut(field) {
            buf.pop();
        }
    }

    pub(crate) fn cancel_form(&mut self) {
        self.input_mode = InputMode::Normal;
        self.editing_id = None;
        self.set_status("Edit cancelled");
    }

    /// Validates the form and saves it. Validation and database failures are
    /// reported on the status line and keep the form open.
    pub(crate) fn submit_form(&mut self, db: &Database) -> Result<()> {
        let expense = match self.form.to_expense() {
            Ok(expense) => expense,
            Err(err) => {
                self.set_error(err.to_string());
                return Ok(());
            }
        };
        let lossy = !codec::round_trips(&expense.details);

        let (verb, done, result) = match self.editing_id {
            Some(id) => (
                "update",
                "updated",
                db.update(&expense.with_id(id)).map(|_| id),
            ),
            None => (
                "add",
                "added",
                db.create(&expense)
                    .map(|saved| saved.id.unwrap_or_default()),
            ),
        };

        match result {
            Ok(id) => {
                self.input_mode = InputMode::Normal;
                self.editing_id = None;
                self.refresh_expenses(db)?;
                self.select_id(id);
                if lossy {
                    self.set_error(format!(
                        "Saved, but Travel fields containing \"{}\" will not read back intact",
                        codec::TRAVEL_SEPARATOR
                    ));
                } else {
                    self.set_status(format!("Expense {done} successfully."));
                }
            }
            Err(err) => self.set_error(format!("Failed to {verb} expense: {err}")),
        }
        Ok(())
    }

    // ── Delete ────────────────────────────────────────────────

    pub(crate) fn request_delete(&mut self) {
        let Some(expense) = self.selected() else {
            self.set_status("Select an expense from the table to delete.");
            return;
        };
        let Some(id) = expense.id else {
            return;
        };
        let label = format!(
            "{} {} on {}",
            expense.category(),
            format_amount(expense.amount),
            expense.date.format(DATE_FORMAT)
        );
        self.confirm_message = format!("Delete {label}?");
        self.pending_action = Some(PendingAction::DeleteExpense { id, label });
        self.input_mode = InputMode::Confirm;
    }

    pub(crate) fn confirm_pending(&mut self, db: &Database) -> Result<()> {
        if let Some(action) = self.pending_action.take() {
            match action {
                PendingAction::DeleteExpense { id, label } => match db.delete(id) {
                    Ok(()) => {
                        self.refresh_expenses(db)?;
                        self.set_status(format!("Deleted {label}"));
                    }
                    Err(err) => self.set_error(format!("Failed to delete expense: {err}")),
                },
            }
        }
        self.input_mode = InputMode::Normal;
        self.confirm_message.clear();
        Ok(())
    }

    pub(crate) fn cancel_pending(&mut self) {
        self.pending_action = None;
        self.input_mode = InputMode::Normal;
        self.confirm_message.clear();
        self.set_status("Cancelled");
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_is_error = false;
    }

    pub(crate) fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
        self.status_is_error = true;
    }
}
