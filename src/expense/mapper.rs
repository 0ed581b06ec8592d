//! Converts expenses to and from their document representation.
//!
//! Amounts are stored as doubles and dates as the timestamp of local midnight
//! in the server's time zone.

use rust_decimal::Decimal;

use crate::{
    document::{Document, Fields, Value},
    expense::{Expense, ExpenseFields},
    timezone::LocalTimezone,
};

/// The document field holding the expense's title.
pub const TITLE: &str = "title";
/// The document field holding the expense's amount.
pub const AMOUNT: &str = "amount";
/// The document field holding the expense's category.
pub const CATEGORY: &str = "category";
/// The document field holding the expense's date.
pub const DATE: &str = "date";
/// The document field holding the ID of the expense's owner.
pub const USER_ID: &str = "userId";

/// Why a document could not be read as an expense.
#[derive(Debug, thiserror::Error, PartialEq)]
enum MappingError {
    #[error("the field \"{0}\" is missing or has the wrong type")]
    InvalidField(&'static str),

    #[error("the amount {0} is not a valid decimal")]
    InvalidAmount(f64),
}

/// Build the document fields for an expense owned by `owner`.
///
/// Returns `None` if the amount cannot be represented as a double.
pub fn to_document(
    fields: &ExpenseFields,
    owner: Option<&str>,
    timezone: &LocalTimezone,
) -> Option<Fields> {
    let amount = amount_to_double(fields.amount)?;

    Some(Fields::from([
        (TITLE.to_owned(), Value::StringValue(fields.title.clone())),
        (AMOUNT.to_owned(), Value::DoubleValue(amount)),
        (CATEGORY.to_owned(), Value::StringValue(fields.category.clone())),
        (
            DATE.to_owned(),
            Value::TimestampValue(timezone.start_of_day(fields.date)),
        ),
        (USER_ID.to_owned(), Value::from(owner)),
    ]))
}

/// Convert via the decimal string form so the double is the one nearest the
/// exact decimal value.
fn amount_to_double(amount: Decimal) -> Option<f64> {
    amount
        .to_string()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

/// Convert a stored double to a decimal via its shortest string form, so 0.1
/// reads back as exactly 0.1.
fn amount_from_double(amount: f64) -> Option<Decimal> {
    if !amount.is_finite() {
        return None;
    }

    amount.to_string().parse().ok()
}

/// Read an expense from `document`.
///
/// Returns `None`, and logs the reason, if the document is not a valid expense.
pub fn from_document(document: &Document, timezone: &LocalTimezone) -> Option<Expense> {
    match try_from_document(document, timezone) {
        Ok(expense) => Some(expense),
        Err(error) => {
            tracing::warn!("skipping malformed expense document {}: {error}", document.id);
            None
        }
    }
}

fn try_from_document(
    document: &Document,
    timezone: &LocalTimezone,
) -> Result<Expense, MappingError> {
    let title = document
        .get_string(TITLE)
        .ok_or(MappingError::InvalidField(TITLE))?;
    let raw_amount = document
        .get_double(AMOUNT)
        .ok_or(MappingError::InvalidField(AMOUNT))?;
    let amount = amount_from_double(raw_amount).ok_or(MappingError::InvalidAmount(raw_amount))?;
    let category = document
        .get_string(CATEGORY)
        .ok_or(MappingError::InvalidField(CATEGORY))?;
    let date = document
        .get_timestamp(DATE)
        .ok_or(MappingError::InvalidField(DATE))?;
    let user_id = match document.fields.get(USER_ID) {
        None | Some(Value::NullValue(_)) => None,
        Some(Value::StringValue(user_id)) => Some(user_id.clone()),
        Some(_) => return Err(MappingError::InvalidField(USER_ID)),
    };

    Ok(Expense {
        id: document.id.clone(),
        title: title.to_owned(),
        amount,
        category: category.to_owned(),
        date: timezone.date_of(date),
        user_id,
    })
}
