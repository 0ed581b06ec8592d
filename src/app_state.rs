//! Implements a struct that holds the state of the REST server.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use rusqlite::Connection;

use crate::{
    Error,
    document::{DocumentCollection, SQLiteCollection, StoreError, initialize},
    expense::{EXPENSES_COLLECTION, ExpenseStore},
    timezone::LocalTimezone,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The store for managing expenses.
    pub expense_store: ExpenseStore,

    /// The time zone used for expense dates.
    pub local_timezone: LocalTimezone,

    /// The origins allowed to make cross-origin requests. Empty allows any origin.
    pub cors_allowed_origins: Vec<String>,

    /// The directory of front end files to serve for non-API routes, if any.
    pub static_dir: Option<PathBuf>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the document table.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the timezone
    /// is not valid.
    pub fn new(db_connection: Connection, local_timezone: &str) -> Result<Self, Error> {
        let local_timezone = LocalTimezone::new(local_timezone)?;

        initialize(&db_connection).map_err(StoreError::from)?;

        let connection = Arc::new(Mutex::new(db_connection));
        let collection = SQLiteCollection::new(connection, EXPENSES_COLLECTION);

        Ok(Self::with_collection(Arc::new(collection), local_timezone))
    }

    /// Create a new [AppState] that keeps expenses in `collection`.
    pub fn with_collection(
        collection: Arc<dyn DocumentCollection>,
        local_timezone: LocalTimezone,
    ) -> Self {
        Self {
            expense_store: ExpenseStore::new(collection, local_timezone),
            local_timezone,
            cors_allowed_origins: Vec::new(),
            static_dir: None,
        }
    }

    /// Only allow cross-origin requests from `origins`.
    pub fn with_cors_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_allowed_origins = origins;
        self
    }

    /// Serve files from `static_dir` for routes that are not part of the API.
    pub fn with_static_dir(mut self, static_dir: Option<PathBuf>) -> Self {
        self.static_dir = static_dir;
        self
    }
}
