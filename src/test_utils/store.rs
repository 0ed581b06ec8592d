use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    AppState,
    document::{
        Document, DocumentCollection, Fields, Query, SQLiteCollection, StoreError, initialize,
    },
    expense::{EXPENSES_COLLECTION, ExpenseStore},
    timezone::LocalTimezone,
};

pub(crate) const TEST_TIMEZONE: &str = "Etc/UTC";

/// A collection where every operation fails as if the database were unreachable.
#[derive(Debug)]
pub(crate) struct FailingCollection;

impl DocumentCollection for FailingCollection {
    fn get(&self, _id: &str) -> Result<Option<Document>, StoreError> {
        Err(StoreError::Lock)
    }

    fn add(&self, _fields: Fields) -> Result<Document, StoreError> {
        Err(StoreError::Lock)
    }

    fn update(&self, _id: &str, _fields: Fields) -> Result<(), StoreError> {
        Err(StoreError::Lock)
    }

    fn delete(&self, _id: &str) -> Result<(), StoreError> {
        Err(StoreError::Lock)
    }

    fn query(&self, _query: &Query) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Lock)
    }
}

pub(crate) fn get_test_collection() -> Arc<SQLiteCollection> {
    let connection = Connection::open_in_memory().unwrap();
    initialize(&connection).unwrap();

    Arc::new(SQLiteCollection::new(
        Arc::new(Mutex::new(connection)),
        EXPENSES_COLLECTION,
    ))
}

pub(crate) fn get_test_expense_store() -> ExpenseStore {
    ExpenseStore::new(
        get_test_collection(),
        LocalTimezone::new(TEST_TIMEZONE).unwrap(),
    )
}

pub(crate) fn get_test_state() -> AppState {
    AppState::new(Connection::open_in_memory().unwrap(), TEST_TIMEZONE).unwrap()
}
