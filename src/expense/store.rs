//! Ownership scoped CRUD operations for expenses on a document collection.

use std::sync::Arc;

use crate::{
    Error,
    document::{Document, DocumentCollection, Fields, Query, SortOrder, StoreError, Value},
    expense::{
        Expense, ExpenseFields,
        mapper::{self, DATE, USER_ID},
    },
    timezone::LocalTimezone,
};

/// The name of the document collection that holds expenses.
pub const EXPENSES_COLLECTION: &str = "expenses";

/// Creates, reads, updates and deletes expenses.
///
/// Updates and deletes are only allowed for the expense's owner, or anyone if
/// the expense has no owner. Each method is an independent round trip to the
/// collection, so concurrent writes to the same expense are last write wins.
#[derive(Debug, Clone)]
pub struct ExpenseStore {
    collection: Arc<dyn DocumentCollection>,
    timezone: LocalTimezone,
}

impl ExpenseStore {
    /// Create a store that keeps expenses in `collection`.
    ///
    /// Dates are converted to and from timestamps in `timezone`.
    pub fn new(collection: Arc<dyn DocumentCollection>, timezone: LocalTimezone) -> Self {
        Self {
            collection,
            timezone,
        }
    }

    /// The expenses owned by `owner`, most recent first.
    ///
    /// A `None` owner lists the expenses that have no owner. Malformed
    /// documents are skipped.
    ///
    /// # Errors
    /// Returns [Error::StoreUnavailable] if the collection cannot be queried.
    pub fn list(&self, owner: Option<&str>) -> Result<Vec<Expense>, Error> {
        let query = Query::new()
            .where_equal_to(USER_ID, Value::from(owner))
            .order_by(DATE, SortOrder::Descending);

        let expenses: Vec<Expense> = self
            .collection
            .query(&query)?
            .iter()
            .filter_map(|document| mapper::from_document(document, &self.timezone))
            .collect();

        tracing::info!(
            "Retrieved {} expenses for user {}",
            expenses.len(),
            owner.unwrap_or("<none>")
        );

        Ok(expenses)
    }

    /// The expense with `id`, regardless of who owns it.
    ///
    /// Returns `None` if there is no such expense or it cannot be read.
    ///
    /// # Errors
    /// Returns [Error::StoreUnavailable] if the collection cannot be reached.
    pub fn get_by_id(&self, id: &str) -> Result<Option<Expense>, Error> {
        Ok(self
            .fetch(id)?
            .and_then(|document| mapper::from_document(&document, &self.timezone)))
    }

    /// Save a new expense owned by `owner`.
    ///
    /// Leading and trailing whitespace is trimmed from the title and category.
    ///
    /// # Errors
    /// Returns [Error::StoreUnavailable] if the expense cannot be saved.
    pub fn create(&self, fields: ExpenseFields, owner: Option<&str>) -> Result<Expense, Error> {
        let fields = fields.sanitized();
        let document = self.collection.add(self.to_document(&fields, owner)?)?;

        tracing::info!("Created expense {} for user {}", document.id, owner.unwrap_or("<none>"));

        Ok(into_expense(document.id, fields, owner))
    }

    /// Replace the fields of the expense with `id` and give it to `owner`.
    ///
    /// Returns `None` if there is no such expense, or if it belongs to
    /// someone other than `owner`.
    ///
    /// # Errors
    /// Returns [Error::StoreUnavailable] if the collection cannot be reached.
    pub fn update(
        &self,
        id: &str,
        fields: ExpenseFields,
        owner: Option<&str>,
    ) -> Result<Option<Expense>, Error> {
        let Some(existing) = self.fetch(id)? else {
            return Ok(None);
        };

        if !can_modify(&existing, owner) {
            tracing::warn!(
                "User {} tried to update expense {id} owned by someone else",
                owner.unwrap_or("<none>")
            );
            return Ok(None);
        }

        let fields = fields.sanitized();

        match self
            .collection
            .update(id, self.to_document(&fields, owner)?)
        {
            Ok(()) => {}
            // Deleted since it was fetched.
            Err(StoreError::DocumentNotFound(_)) => return Ok(None),
            Err(error) => return Err(error.into()),
        }

        tracing::info!("Updated expense {id}");

        Ok(Some(into_expense(id.to_owned(), fields, owner)))
    }

    /// Delete the expense with `id`.
    ///
    /// Returns `false` if there is no such expense, or if it belongs to
    /// someone other than `owner`.
    ///
    /// # Errors
    /// Returns [Error::StoreUnavailable] if the collection cannot be reached.
    pub fn delete(&self, id: &str, owner: Option<&str>) -> Result<bool, Error> {
        let Some(existing) = self.fetch(id)? else {
            return Ok(false);
        };

        if !can_modify(&existing, owner) {
            tracing::warn!(
                "User {} tried to delete expense {id} owned by someone else",
                owner.unwrap_or("<none>")
            );
            return Ok(false);
        }

        self.collection.delete(id)?;

        tracing::info!("Deleted expense {id}");

        Ok(true)
    }

    /// The exact sum of the amounts of the expenses owned by `owner`.
    ///
    /// The route handlers sum the list they have already fetched with
    /// `sum_amounts` instead, so the total always matches the listed expenses.
    #[cfg(test)]
    pub(crate) fn total_amount(
        &self,
        owner: Option<&str>,
    ) -> Result<rust_decimal::Decimal, Error> {
        Ok(crate::expense::summary::sum_amounts(&self.list(owner)?))
    }

    /// Get the document with `id`, treating a corrupt document as missing.
    fn fetch(&self, id: &str) -> Result<Option<Document>, Error> {
        match self.collection.get(id) {
            Ok(document) => Ok(document),
            Err(StoreError::CorruptDocument(_)) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn to_document(&self, fields: &ExpenseFields, owner: Option<&str>) -> Result<Fields, Error> {
        mapper::to_document(fields, owner, &self.timezone).ok_or_else(|| {
            StoreError::Encoding(format!("the amount {} cannot be stored", fields.amount)).into()
        })
    }
}

/// Whether `caller` may change `document`.
///
/// Documents without an owner may be changed by anyone.
fn can_modify(document: &Document, caller: Option<&str>) -> bool {
    match document.fields.get(USER_ID) {
        None | Some(Value::NullValue(_)) => true,
        Some(Value::StringValue(owner)) => caller == Some(owner.as_str()),
        Some(_) => false,
    }
}

fn into_expense(id: String, fields: ExpenseFields, owner: Option<&str>) -> Expense {
    Expense {
        id,
        title: fields.title,
        amount: fields.amount,
        category: fields.category,
        date: fields.date,
        user_id: owner.map(str::to_owned),
    }
}

#[cfg(test)]
mod tests {
    use std::{str::FromStr, sync::Arc};

    use rust_decimal::Decimal;
    use time::{
        Date,
        macros::{date, datetime},
    };

    use crate::{
        Error,
        document::{DocumentCollection, Fields, StoreError, Value},
        expense::{Expense, ExpenseFields},
        test_utils::{FailingCollection, get_test_collection},
        timezone::LocalTimezone,
    };

    use super::ExpenseStore;

    fn get_test_store() -> ExpenseStore {
        ExpenseStore::new(get_test_collection(), LocalTimezone::new("Pacific/Auckland").unwrap())
    }

    fn fields(title: &str, amount: &str, date: Date) -> ExpenseFields {
        ExpenseFields {
            title: title.to_owned(),
            amount: Decimal::from_str(amount).unwrap(),
            category: "Food".to_owned(),
            date,
        }
    }

    fn coffee() -> ExpenseFields {
        fields("Coffee", "4.50", date!(2024 - 01 - 15))
    }

    #[test]
    fn create_then_get_by_id() {
        let store = get_test_store();

        let created = store.create(coffee(), Some("alice")).unwrap();
        let got = store.get_by_id(&created.id).unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(
            got,
            Some(Expense {
                id: created.id.clone(),
                title: "Coffee".to_owned(),
                amount: Decimal::from_str("4.50").unwrap(),
                category: "Food".to_owned(),
                date: date!(2024 - 01 - 15),
                user_id: Some("alice".to_owned()),
            })
        );
        assert_eq!(got, Some(created));
    }

    #[test]
    fn create_trims_title_and_category() {
        let store = get_test_store();
        let fields = ExpenseFields {
            title: "  Coffee  ".to_owned(),
            category: "Food ".to_owned(),
            ..coffee()
        };

        let created = store.create(fields, None).unwrap();
        let got = store.get_by_id(&created.id).unwrap().unwrap();

        assert_eq!(got.title, "Coffee");
        assert_eq!(got.category, "Food");
        assert_eq!(got.user_id, None);
    }

    #[test]
    fn get_by_id_is_not_owner_scoped() {
        let store = get_test_store();
        let created = store.create(coffee(), Some("alice")).unwrap();

        assert!(store.get_by_id(&created.id).unwrap().is_some());
    }

    #[test]
    fn get_missing_expense_returns_none() {
        let store = get_test_store();

        assert_eq!(store.get_by_id("missing"), Ok(None));
    }

    #[test]
    fn list_is_owner_scoped_and_most_recent_first() {
        let store = get_test_store();
        let older = store
            .create(fields("Lunch", "12.00", date!(2024 - 01 - 10)), Some("alice"))
            .unwrap();
        let newer = store
            .create(fields("Dinner", "30.00", date!(2024 - 01 - 20)), Some("alice"))
            .unwrap();
        store.create(coffee(), Some("bob")).unwrap();
        let unowned = store.create(coffee(), None).unwrap();

        assert_eq!(store.list(Some("alice")).unwrap(), [newer, older]);
        assert_eq!(store.list(None).unwrap(), [unowned]);
        assert!(store.list(Some("carol")).unwrap().is_empty());
    }

    #[test]
    fn list_skips_malformed_documents() {
        let collection = get_test_collection();
        let store = ExpenseStore::new(collection.clone(), LocalTimezone::new("Etc/UTC").unwrap());
        let good = store.create(coffee(), Some("alice")).unwrap();
        let malformed = collection
            .add(Fields::from([
                ("userId".to_owned(), Value::StringValue("alice".to_owned())),
                (
                    "date".to_owned(),
                    Value::TimestampValue(datetime!(2024-01-01 00:00 UTC)),
                ),
                ("title".to_owned(), Value::IntegerValue(3)),
            ]))
            .unwrap();

        assert_eq!(store.list(Some("alice")).unwrap(), [good]);
        assert_eq!(store.get_by_id(&malformed.id), Ok(None));
    }

    #[test]
    fn total_amount_is_exact() {
        let store = get_test_store();
        store
            .create(fields("Rent", "100.00", date!(2024 - 01 - 01)), Some("alice"))
            .unwrap();
        store
            .create(fields("Rent", "200.00", date!(2024 - 02 - 01)), Some("alice"))
            .unwrap();
        for _ in 0..3 {
            store
                .create(fields("Gum", "0.10", date!(2024 - 02 - 01)), Some("alice"))
                .unwrap();
        }
        store.create(coffee(), Some("bob")).unwrap();

        assert_eq!(
            store.total_amount(Some("alice")),
            Ok(Decimal::from_str("300.30").unwrap())
        );
        assert_eq!(store.total_amount(Some("carol")), Ok(Decimal::ZERO));
    }

    #[test]
    fn owner_can_update() {
        let store = get_test_store();
        let created = store.create(coffee(), Some("alice")).unwrap();
        let new_fields = ExpenseFields {
            title: " Flat white ".to_owned(),
            ..fields("", "5.00", date!(2024 - 01 - 16))
        };

        let updated = store
            .update(&created.id, new_fields, Some("alice"))
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Flat white");
        assert_eq!(updated.user_id, Some("alice".to_owned()));
        assert_eq!(store.get_by_id(&created.id).unwrap(), Some(updated));
    }

    #[test]
    fn update_missing_expense_returns_none() {
        let store = get_test_store();

        assert_eq!(store.update("missing", coffee(), Some("alice")), Ok(None));
    }

    #[test]
    fn update_by_other_user_returns_none_and_keeps_expense() {
        let store = get_test_store();
        let created = store.create(coffee(), Some("alice")).unwrap();
        let new_fields = fields("Stolen", "1.00", date!(2024 - 01 - 01));

        assert_eq!(store.update(&created.id, new_fields.clone(), Some("bob")), Ok(None));
        assert_eq!(store.update(&created.id, new_fields, None), Ok(None));
        assert_eq!(store.get_by_id(&created.id).unwrap(), Some(created));
    }

    #[test]
    fn update_of_unowned_expense_takes_callers_owner() {
        let store = get_test_store();
        let created = store.create(coffee(), None).unwrap();

        let updated = store
            .update(&created.id, coffee(), Some("bob"))
            .unwrap()
            .unwrap();

        assert_eq!(updated.user_id, Some("bob".to_owned()));
        assert_eq!(store.list(Some("bob")).unwrap(), [updated]);
        assert!(store.list(None).unwrap().is_empty());
    }

    #[test]
    fn owner_can_delete() {
        let store = get_test_store();
        let created = store.create(coffee(), Some("alice")).unwrap();

        assert_eq!(store.delete(&created.id, Some("alice")), Ok(true));
        assert_eq!(store.get_by_id(&created.id), Ok(None));
    }

    #[test]
    fn anyone_can_delete_unowned_expense() {
        let store = get_test_store();
        let created = store.create(coffee(), None).unwrap();

        assert_eq!(store.delete(&created.id, Some("bob")), Ok(true));
    }

    #[test]
    fn delete_by_other_user_returns_false_and_keeps_expense() {
        let store = get_test_store();
        let created = store.create(coffee(), Some("alice")).unwrap();

        assert_eq!(store.delete(&created.id, Some("bob")), Ok(false));
        assert_eq!(store.delete(&created.id, None), Ok(false));
        assert_eq!(store.get_by_id(&created.id).unwrap(), Some(created));
    }

    #[test]
    fn delete_missing_expense_returns_false() {
        let store = get_test_store();

        assert_eq!(store.delete("missing", Some("alice")), Ok(false));
    }

    #[test]
    fn store_failures_are_errors() {
        let store = ExpenseStore::new(
            Arc::new(FailingCollection),
            LocalTimezone::new("Etc/UTC").unwrap(),
        );

        assert_eq!(
            store.list(Some("alice")),
            Err(Error::StoreUnavailable(StoreError::Lock))
        );
        assert_eq!(
            store.create(coffee(), Some("alice")),
            Err(Error::StoreUnavailable(StoreError::Lock))
        );
        assert_eq!(
            store.delete("id", Some("alice")),
            Err(Error::StoreUnavailable(StoreError::Lock))
        );
    }

    #[test]
    fn update_of_deleted_expense_returns_none() {
        let collection = get_test_collection();
        let store = ExpenseStore::new(collection.clone(), LocalTimezone::new("Etc/UTC").unwrap());
        let created = store.create(coffee(), None).unwrap();
        collection.delete(&created.id).unwrap();

        assert_eq!(store.update(&created.id, coffee(), None), Ok(None));
    }
}
