//! Errors raised by the expense model, codec and store.
//!
//! - [`Validation`] bad user input or an undecodable stored value.
//! - [`Persistence`] the database refused a read or write.
//! - [`InvalidReference`] update/delete aimed at a record that does not exist.
//! - [`UnknownCategory`] a stored category tag outside Food/Travel/Utility.
//!
//! [`Validation`]: ExpenseError::Validation
//! [`Persistence`]: ExpenseError::Persistence
//! [`InvalidReference`]: ExpenseError::InvalidReference
//! [`UnknownCategory`]: ExpenseError::UnknownCategory
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExpenseError {
    #[error("{0}")]
    Validation(String),
    #[error("Database error: {0}")]
    Persistence(String),
    #[error("{}", describe_reference(.0))]
    InvalidReference(Option<i64>),
    #[error("Unknown expense category: \"{0}\"")]
    UnknownCategory(String),
}

impl From<rusqlite::Error> for ExpenseError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

fn describe_reference(id: &Option<i64>) -> String {
    match id {
        Some(id) => format!("No expense with id {id}"),
        None => "Expense has not been saved yet".into(),
    }
}

pub(crate) type Result<T> = std::result::Result<T, ExpenseError>;
