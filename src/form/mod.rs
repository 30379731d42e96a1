//! Raw text input for one expense, and its validation into an [`Expense`].
//!
//! Shared by the terminal UI popup and the `add`/`update` CLI commands, so both
//! reject the same input with the same messages.

use chrono::{Local, NaiveDate};
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::db::DATE_FORMAT;
use crate::error::{ExpenseError, Result};
use crate::models::{Category, Details, Expense};

static DATE_SHAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").ok());

/// One editable field of the form, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Category,
    Amount,
    Date,
    Description,
    Restaurant,
    Destination,
    TransportMode,
    UtilityType,
}

impl FormField {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Category => "Expense Type",
            Self::Amount => "Amount",
            Self::Date => "Date (YYYY-MM-DD)",
            Self::Description => "Description",
            Self::Restaurant => "Restaurant",
            Self::Destination => "Destination",
            Self::TransportMode => "Transport Mode",
            Self::UtilityType => "Utility Type",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExpenseForm {
    pub(crate) category: Category,
    pub(crate) amount: String,
    pub(crate) date: String,
    pub(crate) description: String,
    pub(crate) restaurant: String,
    pub(crate) destination: String,
    pub(crate) transport_mode: String,
    pub(crate) utility_type: String,
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpenseForm {
    /// Empty Food form dated today.
    pub(crate) fn new() -> Self {
        Self {
            category: Category::Food,
            amount: String::new(),
            date: Local::now().date_naive().format(DATE_FORMAT).to_string(),
            description: String::new(),
            restaurant: String::new(),
            destination: String::new(),
            transport_mode: String::new(),
            utility_type: String::new(),
        }
    }

    pub(crate) fn from_expense(expense: &Expense) -> Self {
        let mut form = Self {
            category: expense.category(),
            amount: expense.amount.to_string(),
            date: expense.date.format(DATE_FORMAT).to_string(),
            description: expense.description.clone().unwrap_or_default(),
            ..Self::new()
        };
        match &expense.details {
            Details::Food { restaurant } => form.restaurant = restaurant.clone(),
            Details::Travel {
                destination,
                transport_mode,
            } => {
                form.destination = destination.clone();
                form.transport_mode = transport_mode.clone();
            }
            Details::Utility { utility_type } => form.utility_type = utility_type.clone(),
        }
        form
    }

    /// Fields shown for the current category, in tab order.
    pub(crate) fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Category,
            FormField::Amount,
            FormField::Date,
            FormField::Description,
        ];
        match self.category {
            Category::Food => fields.push(FormField::Restaurant),
            Category::Travel => {
                fields.push(FormField::Destination);
                fields.push(FormField::TransportMode);
            }
            Category::Utility => fields.push(FormField::UtilityType),
        }
        fields
    }

    /// Text buffer behind a field. `Category` has none; it is cycled instead.
    pub(crate) fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Category => None,
            FormField::Amount => Some(&mut self.amount),
            FormField::Date => Some(&mut self.date),
            FormField::Description => Some(&mut self.description),
            FormField::Restaurant => Some(&mut self.restaurant),
            FormField::Destination => Some(&mut self.destination),
            FormField::TransportMode => Some(&mut self.transport_mode),
            FormField::UtilityType => Some(&mut self.utility_type),
        }
    }

    pub(crate) fn text(&self, field: FormField) -> &str {
        match field {
            FormField::Category => self.category.as_str(),
            FormField::Amount => &self.amount,
            FormField::Date => &self.date,
            FormField::Description => &self.description,
            FormField::Restaurant => &self.restaurant,
            FormField::Destination => &self.destination,
            FormField::TransportMode => &self.transport_mode,
            FormField::UtilityType => &self.utility_type,
        }
    }

    /// Validates every field and builds an unsaved expense.
    pub(crate) fn to_expense(&self) -> Result<Expense> {
        let amount = parse_amount(&self.amount)?;
        let date = parse_date(&self.date)?;
        let description = match self.description.trim() {
            "" => None,
            text => Some(text.to_string()),
        };
        let details = match self.category {
            Category::Food => Details::Food {
                restaurant: required(&self.restaurant, FormField::Restaurant, Category::Food)?,
            },
            Category::Travel => Details::Travel {
                destination: required(&self.destination, FormField::Destination, Category::Travel)?,
                transport_mode: required(
                    &self.transport_mode,
                    FormField::TransportMode,
                    Category::Travel,
                )?,
            },
            Category::Utility => Details::Utility {
                utility_type: required(&self.utility_type, FormField::UtilityType, Category::Utility)?,
            },
        };
        Ok(Expense::new(amount, date, description, details))
    }
}

fn parse_amount(text: &str) -> Result<Decimal> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ExpenseError::Validation("Amount is required.".into()));
    }
    match Decimal::from_str(text) {
        Ok(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(ExpenseError::Validation(
            "Amount must be a positive number.".into(),
        )),
    }
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    // chrono accepts unpadded fields; the form only takes the canonical shape
    let well_formed = DATE_SHAPE.as_ref().is_some_and(|re| re.is_match(text));
    if !well_formed {
        return Err(date_error());
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| date_error())
}

fn date_error() -> ExpenseError {
    ExpenseError::Validation("Date must be in YYYY-MM-DD format.".into())
}

fn required(text: &str, field: FormField, category: Category) -> Result<String> {
    match text.trim() {
        "" => Err(ExpenseError::Validation(format!(
            "{} is required for {category} expenses.",
            field.label()
        ))),
        value => Ok(value.to_string()),
    }
}
