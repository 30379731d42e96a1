use crate::error::{ExpenseError, Result};

/// The fixed set of expense categories. Stored as its tag in the `category` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Category {
    Food,
    Travel,
    Utility,
}

impl Category {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Travel => "Travel",
            Self::Utility => "Utility",
        }
    }

    /// Exact match on the stored tag.
    pub(crate) fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "Food" => Ok(Self::Food),
            "Travel" => Ok(Self::Travel),
            "Utility" => Ok(Self::Utility),
            other => Err(ExpenseError::UnknownCategory(other.to_string())),
        }
    }

    /// Lenient match for user input (case-insensitive).
    pub(crate) fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(Self::Food),
            "travel" => Ok(Self::Travel),
            "utility" | "utilities" => Ok(Self::Utility),
            _ => Err(ExpenseError::UnknownCategory(s.trim().to_string())),
        }
    }

    pub(crate) fn all() -> &'static [Category] {
        &[Self::Food, Self::Travel, Self::Utility]
    }

    pub(crate) fn next(self) -> Self {
        match self {
            Self::Food => Self::Travel,
            Self::Travel => Self::Utility,
            Self::Utility => Self::Food,
        }
    }

    pub(crate) fn prev(self) -> Self {
        match self {
            Self::Food => Self::Utility,
            Self::Travel => Self::Food,
            Self::Utility => Self::Travel,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
