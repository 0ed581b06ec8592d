//! Implements a SQLite backed document collection.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use super::{Document, DocumentCollection, Fields, Query, StoreError};

/// Create the table that holds the documents of every collection.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS document (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            fields TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        )",
        (),
    )?;

    Ok(())
}

/// A named collection of documents stored as JSON in a SQLite database.
///
/// Each method holds the connection lock for its whole statement sequence,
/// so single-document operations are atomic.
#[derive(Debug, Clone)]
pub struct SQLiteCollection {
    connection: Arc<Mutex<Connection>>,
    name: String,
}

impl SQLiteCollection {
    /// Create a collection called `name` in the database behind `connection`.
    ///
    /// The database must have been set up with [initialize].
    pub fn new(connection: Arc<Mutex<Connection>>, name: &str) -> Self {
        Self {
            connection,
            name: name.to_owned(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            StoreError::Lock
        })
    }

    fn select_fields(&self, id: &str, connection: &Connection) -> Result<Option<Fields>, StoreError> {
        let raw_fields: Option<String> = connection
            .query_row(
                "SELECT fields FROM document WHERE collection = ?1 AND id = ?2",
                params![self.name, id],
                |row| row.get(0),
            )
            .optional()?;

        raw_fields
            .map(|raw_fields| decode_fields(id, &raw_fields))
            .transpose()
    }
}

fn decode_fields(id: &str, raw_fields: &str) -> Result<Fields, StoreError> {
    serde_json::from_str(raw_fields).map_err(|error| {
        tracing::warn!("could not decode document {id}: {error}");
        StoreError::CorruptDocument(id.to_owned())
    })
}

fn encode_fields(fields: &Fields) -> Result<String, StoreError> {
    serde_json::to_string(fields).map_err(|error| StoreError::Encoding(error.to_string()))
}

impl DocumentCollection for SQLiteCollection {
    fn get(&self, id: &str) -> Result<Option<Document>, StoreError> {
        let connection = self.lock()?;

        Ok(self
            .select_fields(id, &connection)?
            .map(|fields| Document {
                id: id.to_owned(),
                fields,
            }))
    }

    fn add(&self, fields: Fields) -> Result<Document, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        let raw_fields = encode_fields(&fields)?;

        self.lock()?.execute(
            "INSERT INTO document (collection, id, fields) VALUES (?1, ?2, ?3)",
            params![self.name, id, raw_fields],
        )?;

        Ok(Document { id, fields })
    }

    fn update(&self, id: &str, fields: Fields) -> Result<(), StoreError> {
        let connection = self.lock()?;

        let Some(mut merged_fields) = self.select_fields(id, &connection)? else {
            return Err(StoreError::DocumentNotFound(id.to_owned()));
        };
        merged_fields.extend(fields);

        connection.execute(
            "UPDATE document SET fields = ?1 WHERE collection = ?2 AND id = ?3",
            params![encode_fields(&merged_fields)?, self.name, id],
        )?;

        Ok(())
    }

    fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.lock()?.execute(
            "DELETE FROM document WHERE collection = ?1 AND id = ?2",
            params![self.name, id],
        )?;

        Ok(())
    }

    fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let rows = {
            let connection = self.lock()?;
            let mut statement = connection.prepare(
                "SELECT id, fields FROM document WHERE collection = ?1 ORDER BY rowid",
            )?;

            statement
                .query_map(params![self.name], |row| {
                    Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?
                .collect::<Result<Vec<_>, _>>()?
        };

        let documents = rows
            .into_iter()
            .filter_map(|(id, raw_fields)| {
                decode_fields(&id, &raw_fields)
                    .ok()
                    .map(|fields| Document { id, fields })
            })
            .collect();

        Ok(query.apply(documents))
    }
}
