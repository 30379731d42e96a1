mod category;
mod expense;

pub(crate) use category::Category;
pub(crate) use expense::{total, Details, Expense};
