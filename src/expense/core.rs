//! Defines the expense record and the validation of expense input.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{Error, document::DocumentId, error::ValidationErrors};

/// The longest title, in characters, that an expense may have.
pub const MAX_TITLE_LENGTH: usize = 100;

/// The longest category, in characters, that an expense may have.
pub const MAX_CATEGORY_LENGTH: usize = 50;

/// The smallest amount an expense may have, 0.01.
pub const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// The largest amount an expense may have, 999,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_215_752_191, 23, 0, false, 2);

/// An amount of money spent on something.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID assigned by the store when the expense was created.
    pub id: DocumentId,
    /// A short description of what the money was spent on.
    pub title: String,
    /// How much was spent.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    /// The name of the category the expense belongs to, e.g. "Food".
    pub category: String,
    /// The day the money was spent.
    pub date: Date,
    /// The ID of the user that owns the expense, if any.
    pub user_id: Option<String>,
}

/// The JSON body for creating or replacing an expense.
///
/// Every field is optional at the parse level so that missing fields are
/// reported as validation errors rather than parse errors.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExpenseRequest {
    /// A short description of what the money was spent on.
    #[serde(default)]
    pub title: Option<String>,
    /// How much was spent, parsed from the exact digits of the JSON number.
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount: Option<Decimal>,
    /// The name of the category the expense belongs to.
    #[serde(default)]
    pub category: Option<String>,
    /// The day the money was spent.
    #[serde(default)]
    pub date: Option<Date>,
}

impl ExpenseRequest {
    /// Check every field of the request against the expense constraints.
    ///
    /// `today` is the current date in the server's time zone and is the
    /// latest date an expense may have.
    ///
    /// # Errors
    /// Returns [Error::Validation] with one message per offending field.
    pub fn validate(self, today: Date) -> Result<ExpenseFields, Error> {
        let mut errors = ValidationErrors::default();

        let title = self.title.unwrap_or_default();
        if title.trim().is_empty() {
            errors.add("title", "Title is required");
        } else if title.chars().count() > MAX_TITLE_LENGTH {
            errors.add("title", "Title must not exceed 100 characters");
        }

        let amount = match self.amount {
            None => {
                errors.add("amount", "Amount is required");
                None
            }
            Some(amount) if amount < MIN_AMOUNT => {
                errors.add("amount", "Amount must be greater than 0");
                None
            }
            Some(amount) if amount > MAX_AMOUNT => {
                errors.add("amount", "Amount is too large");
                None
            }
            Some(amount) => Some(amount),
        };

        let category = self.category.unwrap_or_default();
        if category.trim().is_empty() {
            errors.add("category", "Category is required");
        } else if !category.chars().all(is_category_char) {
            errors.add("category", "Category contains invalid characters");
        } else if category.chars().count() > MAX_CATEGORY_LENGTH {
            errors.add("category", "Category must not exceed 50 characters");
        }

        match self.date {
            None => errors.add("date", "Date is required"),
            Some(date) if date > today => errors.add("date", "Date cannot be in the future"),
            Some(_) => {}
        }

        match (amount, self.date) {
            (Some(amount), Some(date)) if errors.is_empty() => Ok(ExpenseFields {
                title,
                amount,
                category,
                date,
            }),
            _ => Err(Error::Validation(errors)),
        }
    }
}

fn is_category_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == ' ' || c == '-'
}

/// The user editable fields of an expense that have passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseFields {
    /// A short description of what the money was spent on.
    pub title: String,
    /// How much was spent.
    pub amount: Decimal,
    /// The name of the category the expense belongs to.
    pub category: String,
    /// The day the money was spent.
    pub date: Date,
}

impl ExpenseFields {
    /// Trim leading and trailing whitespace from the free-text fields.
    pub fn sanitized(self) -> Self {
        Self {
            title: self.title.trim().to_owned(),
            category: self.category.trim().to_owned(),
            ..self
        }
    }
}
