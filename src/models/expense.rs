use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::Category;

/// Category-specific fields. The variant decides the expense's category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Details {
    Food {
        restaurant: String,
    },
    Travel {
        destination: String,
        transport_mode: String,
    },
    Utility {
        utility_type: String,
    },
}

impl Details {
    pub(crate) fn category(&self) -> Category {
        match self {
            Self::Food { .. } => Category::Food,
            Self::Travel { .. } => Category::Travel,
            Self::Utility { .. } => Category::Utility,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Expense {
    /// `None` until the store assigns one on insert.
    pub(crate) id: Option<i64>,
    pub(crate) amount: Decimal,
    pub(crate) date: NaiveDate,
    pub(crate) description: Option<String>,
    pub(crate) details: Details,
}

impl Expense {
    pub(crate) fn new(
        amount: Decimal,
        date: NaiveDate,
        description: Option<String>,
        details: Details,
    ) -> Self {
        Self {
            id: None,
            amount,
            date,
            description,
            details,
        }
    }

    pub(crate) fn category(&self) -> Category {
        self.details.category()
    }

    /// Same record under an existing id; used for full-replace updates.
    pub(crate) fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Sum of all amounts in the slice. Zero when empty.
pub(crate) fn total(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|e| e.amount).sum()
}
