mod schema;

use anyhow::Context;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::codec::{self, CommonFields};
use crate::error::{ExpenseError, Result};
use crate::models::Expense;

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

pub(crate) struct Database {
    conn: Connection,
}

/// A stored row that could not be decoded into an [`Expense`].
#[derive(Debug, Clone)]
pub(crate) struct SkippedRow {
    pub(crate) id: i64,
    pub(crate) error: ExpenseError,
}

/// Result of a full load: decoded expenses plus the rows that were left out.
#[derive(Debug, Default)]
pub(crate) struct ExpenseListing {
    pub(crate) expenses: Vec<Expense>,
    pub(crate) skipped: Vec<SkippedRow>,
}

struct StoredRow {
    id: i64,
    amount: String,
    date: String,
    description: Option<String>,
    category: String,
    details: String,
}

impl StoredRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            amount: row.get(1)?,
            date: row.get(2)?,
            description: row.get(3)?,
            category: row.get(4)?,
            details: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        })
    }

    fn decode(self) -> Result<Expense> {
        let amount = Decimal::from_str(self.amount.trim()).map_err(|_| {
            ExpenseError::Validation(format!("Invalid stored amount: '{}'", self.amount))
        })?;
        let date = NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).map_err(|_| {
            ExpenseError::Validation(format!("Invalid stored date: '{}'", self.date))
        })?;
        codec::decode(
            &self.category,
            &self.details,
            CommonFields {
                id: Some(self.id),
                amount,
                date,
                description: self.description,
            },
        )
    }
}

impl Database {
    pub(crate) fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::info!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Releases the connection. Dropping the handle also closes it, but this
    /// reports the error instead of swallowing it.
    pub(crate) fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, err)| err.into())
    }

    fn migrate(&mut self) -> anyhow::Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(version = schema::CURRENT_VERSION, "created expense schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                tracing::info!(from_version, "applying migration");
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Expenses ──────────────────────────────────────────────

    /// Inserts the expense under a fresh id and returns it with that id set.
    /// Any id already on `expense` is ignored.
    pub(crate) fn create(&self, expense: &Expense) -> Result<Expense> {
        let (category, details) = codec::encode(expense);
        let affected = self.conn.execute(
            "INSERT INTO expenses (amount, date, description, category, details)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                expense.amount.to_string(),
                expense.date.format(DATE_FORMAT).to_string(),
                expense.description,
                category,
                details,
            ],
        )?;
        if affected == 0 {
            return Err(ExpenseError::Persistence(
                "Insert failed, no rows affected".into(),
            ));
        }
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, category, "expense created");
        Ok(expense.clone().with_id(id))
    }

    /// All decodable expenses, most recent first.
    pub(crate) fn read_all(&self) -> Result<Vec<Expense>> {
        Ok(self.read_all_checked()?.expenses)
    }

    /// Like [`read_all`](Self::read_all) but also reports rows that failed to
    /// decode. A bad row never aborts the load.
    pub(crate) fn read_all_checked(&self) -> Result<ExpenseListing> {
        let mut stmt = self.conn.prepare(
            "SELECT id, amount, date, description, category, details
             FROM expenses ORDER BY date DESC, id DESC",
        )?;
        // Column errors stay attached to their row so one bad cell cannot
        // abort the load.
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, StoredRow::read(row)))
        })?;

        let mut listing = ExpenseListing::default();
        for row in rows {
            let (id, stored) = row?;
            let decoded = stored
                .map_err(|err| {
                    ExpenseError::Validation(format!("Unreadable stored column: {err}"))
                })
                .and_then(StoredRow::decode);
            match decoded {
                Ok(expense) => listing.expenses.push(expense),
                Err(error) => {
                    tracing::warn!(id, %error, "skipping undecodable expense row");
                    listing.skipped.push(SkippedRow { id, error });
                }
            }
        }
        tracing::debug!(
            loaded = listing.expenses.len(),
            skipped = listing.skipped.len(),
            "expenses loaded"
        );
        Ok(listing)
    }

    /// Replaces every column of the stored row with `expense.id`, category included.
    pub(crate) fn update(&self, expense: &Expense) -> Result<()> {
        let id = match expense.id {
            Some(id) if id > 0 => id,
            other => return Err(ExpenseError::InvalidReference(other)),
        };
        let (category, details) = codec::encode(expense);
        let affected = self.conn.execute(
            "UPDATE expenses SET amount = ?1, date = ?2, description = ?3, category = ?4, details = ?5
             WHERE id = ?6",
            params![
                expense.amount.to_string(),
                expense.date.format(DATE_FORMAT).to_string(),
                expense.description,
                category,
                details,
                id,
            ],
        )?;
        if affected == 0 {
            return Err(ExpenseError::InvalidReference(Some(id)));
        }
        tracing::debug!(id, category, "expense updated");
        Ok(())
    }

    pub(crate) fn delete(&self, id: i64) -> Result<()> {
        let affected = self
            .conn
            .execute("DELETE FROM expenses WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(ExpenseError::InvalidReference(Some(id)));
        }
        tracing::debug!(id, "expense deleted");
        Ok(())
    }

    // ── Export ────────────────────────────────────────────────

    pub(crate) fn export_to_csv(&self, path: &Path) -> anyhow::Result<usize> {
        let expenses = self.read_all()?;
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        wtr.write_record(["Id", "Type", "Amount", "Date", "Description", "Details"])?;
        for expense in &expenses {
            let (category, details) = codec::encode(expense);
            wtr.write_record([
                expense.id.map(|id| id.to_string()).unwrap_or_default(),
                category.to_string(),
                format!("{:.2}", expense.amount),
                expense.date.format(DATE_FORMAT).to_string(),
                expense.description.clone().unwrap_or_default(),
                details,
            ])?;
        }
        wtr.flush()?;
        tracing::info!(count = expenses.len(), path = %path.display(), "exported expenses");
        Ok(expenses.len())
    }
}

#[cfg(test)]
mod tests;
