//! Aggregates expense amounts.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::expense::Expense;

/// The exact sum of the amounts of `expenses`, zero if there are none.
pub fn sum_amounts(expenses: &[Expense]) -> Decimal {
    expenses.iter().map(|expense| expense.amount).sum()
}

/// The total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    /// The name of the category.
    pub category: String,
    /// The sum of the amounts of the expenses in the category.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
    /// The number of expenses in the category.
    pub count: usize,
}

/// Group `expenses` by category and total each group.
///
/// The largest totals come first, ties are ordered by category name.
pub fn category_totals(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals: HashMap<&str, (Decimal, usize)> = HashMap::new();

    for expense in expenses {
        let (total, count) = totals.entry(&expense.category).or_default();
        *total += expense.amount;
        *count += 1;
    }

    let mut totals: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (total_amount, count))| CategoryTotal {
            category: category.to_owned(),
            total_amount,
            count,
        })
        .collect();

    totals.sort_by(|a, b| {
        b.total_amount
            .cmp(&a.total_amount)
            .then_with(|| a.category.cmp(&b.category))
    });

    totals
}
