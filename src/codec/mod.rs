//! Packing of category-specific fields into the single `details` column.
//!
//! Food and Utility store their one field verbatim. Travel joins destination and
//! transport mode with [`TRAVEL_SEPARATOR`], so a Travel expense only survives a
//! round trip when neither field contains the separator and the transport mode
//! is not empty. Stored details that do not split into exactly two parts, once
//! trailing empty parts are dropped, decode to two empty strings.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::Result;
use crate::models::{Category, Details, Expense};

pub(crate) const TRAVEL_SEPARATOR: &str = ", ";

/// Columns shared by every category, as read back from a row.
#[derive(Debug, Clone)]
pub(crate) struct CommonFields {
    pub(crate) id: Option<i64>,
    pub(crate) amount: Decimal,
    pub(crate) date: NaiveDate,
    pub(crate) description: Option<String>,
}

/// Returns the `(category, details)` column pair for an expense.
pub(crate) fn encode(expense: &Expense) -> (&'static str, String) {
    (expense.category().as_str(), encode_details(&expense.details))
}

pub(crate) fn encode_details(details: &Details) -> String {
    match details {
        Details::Food { restaurant } => restaurant.clone(),
        Details::Travel {
            destination,
            transport_mode,
        } => format!("{destination}{TRAVEL_SEPARATOR}{transport_mode}"),
        Details::Utility { utility_type } => utility_type.clone(),
    }
}

pub(crate) fn decode(tag: &str, details: &str, common: CommonFields) -> Result<Expense> {
    Ok(Expense {
        id: common.id,
        amount: common.amount,
        date: common.date,
        description: common.description,
        details: decode_details(tag, details)?,
    })
}

pub(crate) fn decode_details(tag: &str, details: &str) -> Result<Details> {
    let decoded = match Category::from_tag(tag)? {
        Category::Food => Details::Food {
            restaurant: details.to_string(),
        },
        Category::Travel => {
            let (destination, transport_mode) = split_travel(details);
            Details::Travel {
                destination,
                transport_mode,
            }
        }
        Category::Utility => Details::Utility {
            utility_type: details.to_string(),
        },
    };
    Ok(decoded)
}

/// Whether `decode_details(encode_details(d))` gives back `d`.
pub(crate) fn round_trips(details: &Details) -> bool {
    match details {
        Details::Food { .. } | Details::Utility { .. } => true,
        Details::Travel {
            destination,
            transport_mode,
        } => {
            let packed = format!("{destination}{TRAVEL_SEPARATOR}{transport_mode}");
            split_travel(&packed) == (destination.clone(), transport_mode.clone())
        }
    }
}

/// Trailing empty parts are dropped before counting, so `"Paris, "` has one
/// part and `"A, B, "` has two.
fn split_travel(details: &str) -> (String, String) {
    let mut parts: Vec<&str> = details.split(TRAVEL_SEPARATOR).collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    match parts.as_slice() {
        [destination, transport_mode] => (destination.to_string(), transport_mode.to_string()),
        _ => (String::new(), String::new()),
    }
}
