//! A schemaless document store.
//!
//! Each record is an independent [Document] in a named collection. A document
//! is a map of field names to typed [Value]s, encoded the same way as the
//! Firestore REST API so that documents are self-describing, e.g.
//! `{"title": {"stringValue": "Coffee"}, "amount": {"doubleValue": 4.5}}`.
//!
//! Collections are accessed through the [DocumentCollection] trait, which
//! supports atomic single-document operations and simple equality/ordering
//! queries.

mod sqlite;

pub use sqlite::{SQLiteCollection, initialize};

use std::{cmp::Ordering, collections::BTreeMap, fmt::Debug};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The store assigned identifier of a document.
pub type DocumentId = String;

/// The fields of a document.
pub type Fields = BTreeMap<String, Value>;

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    /// An explicit null.
    NullValue(()),
    /// A boolean.
    BooleanValue(bool),
    /// A 64-bit signed integer.
    IntegerValue(i64),
    /// A 64-bit float.
    DoubleValue(f64),
    /// A point in time, stored as an RFC 3339 string.
    TimestampValue(#[serde(with = "time::serde::rfc3339")] OffsetDateTime),
    /// A UTF-8 string.
    StringValue(String),
}

impl Value {
    /// The position of the value's type in the ordering of mixed-type values.
    fn type_order(&self) -> u8 {
        match self {
            Value::NullValue(_) => 0,
            Value::BooleanValue(_) => 1,
            Value::IntegerValue(_) | Value::DoubleValue(_) => 2,
            Value::TimestampValue(_) => 3,
            Value::StringValue(_) => 4,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::IntegerValue(value) => Some(*value as f64),
            Value::DoubleValue(value) => Some(*value),
            _ => None,
        }
    }

    /// Compare two values for sorting.
    ///
    /// Values of different types are ordered by type: null, booleans,
    /// numbers, timestamps, then strings. Integers and doubles compare by
    /// numeric value.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::BooleanValue(a), Value::BooleanValue(b)) => a.cmp(b),
            (Value::TimestampValue(a), Value::TimestampValue(b)) => a.cmp(b),
            (Value::StringValue(a), Value::StringValue(b)) => a.cmp(b),
            (a, b) => match (a.as_number(), b.as_number()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => a.type_order().cmp(&b.type_order()),
            },
        }
    }

    /// Whether two values are equal for the purpose of a query filter.
    ///
    /// Integers and doubles with the same numeric value are equal.
    pub fn query_eq(&self, other: &Value) -> bool {
        match (self.as_number(), other.as_number()) {
            (Some(a), Some(b)) => a == b,
            _ => self == other,
        }
    }
}

impl From<Option<&str>> for Value {
    fn from(value: Option<&str>) -> Self {
        match value {
            Some(value) => Value::StringValue(value.to_owned()),
            None => Value::NullValue(()),
        }
    }
}

/// A document and its store assigned ID.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The ID assigned by the store when the document was added.
    pub id: DocumentId,
    /// The document's data.
    pub fields: Fields,
}

impl Document {
    /// Get the string value of `field`.
    ///
    /// Returns `None` if the field is missing or not a string.
    pub fn get_string(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(Value::StringValue(value)) => Some(value),
            _ => None,
        }
    }

    /// Get the numeric value of `field` as a double.
    ///
    /// Returns `None` if the field is missing or not a number.
    pub fn get_double(&self, field: &str) -> Option<f64> {
        self.fields.get(field).and_then(Value::as_number)
    }

    /// Get the timestamp value of `field`.
    ///
    /// Returns `None` if the field is missing or not a timestamp.
    pub fn get_timestamp(&self, field: &str) -> Option<OffsetDateTime> {
        match self.fields.get(field) {
            Some(Value::TimestampValue(value)) => Some(*value),
            _ => None,
        }
    }
}

/// The order to sort documents in a [Query].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// Defines how documents should be fetched from [DocumentCollection::query].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    /// Only include documents where the field equals the value.
    ///
    /// A null value matches documents where the field is null or missing.
    pub filter: Option<(String, Value)>,
    /// Order documents by the field. Documents without the field are
    /// excluded. None returns documents in the order they were added.
    pub order_by: Option<(String, SortOrder)>,
}

impl Query {
    /// A query that matches every document in a collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only include documents where `field` equals `value`.
    pub fn where_equal_to(mut self, field: &str, value: Value) -> Self {
        self.filter = Some((field.to_owned(), value));
        self
    }

    /// Sort the results by `field`.
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by = Some((field.to_owned(), order));
        self
    }

    /// Whether `document` satisfies the query's filter and ordering field.
    pub fn matches(&self, document: &Document) -> bool {
        let passes_filter = match &self.filter {
            Some((field, Value::NullValue(_))) => matches!(
                document.fields.get(field),
                None | Some(Value::NullValue(_))
            ),
            Some((field, value)) => document
                .fields
                .get(field)
                .is_some_and(|field_value| field_value.query_eq(value)),
            None => true,
        };

        let has_order_field = match &self.order_by {
            Some((field, _)) => document.fields.contains_key(field),
            None => true,
        };

        passes_filter && has_order_field
    }

    /// Filter and sort `documents`, which must be in insertion order.
    ///
    /// The sort is stable, so documents with equal sort values stay in
    /// insertion order.
    pub fn apply(&self, documents: Vec<Document>) -> Vec<Document> {
        let mut documents: Vec<Document> = documents
            .into_iter()
            .filter(|document| self.matches(document))
            .collect();

        if let Some((field, order)) = &self.order_by {
            documents.sort_by(|a, b| {
                // `matches` guarantees both documents have the field.
                let ordering = match (a.fields.get(field), b.fields.get(field)) {
                    (Some(a), Some(b)) => a.compare(b),
                    _ => Ordering::Equal,
                };

                match order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }

        documents
    }
}

/// Errors originating from operations on a document store.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StoreError {
    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    Sql(#[from] rusqlite::Error),

    /// Could not acquire the lock on the store's connection.
    #[error("could not acquire the document store lock")]
    Lock,

    /// A stored document could not be decoded.
    #[error("the document \"{0}\" is corrupt")]
    CorruptDocument(DocumentId),

    /// Tried to update a document that does not exist.
    #[error("tried to update the document \"{0}\" which is not in the store")]
    DocumentNotFound(DocumentId),

    /// A document could not be encoded for storage.
    #[error("could not encode the document: {0}")]
    Encoding(String),
}

/// A named collection of schemaless documents.
///
/// Every operation is an independent, atomic, single-document round trip to
/// the store. There are no multi-document transactions.
pub trait DocumentCollection: Debug + Send + Sync {
    /// Retrieve the document with `id`, or `None` if it does not exist.
    ///
    /// # Errors
    /// Returns [StoreError::CorruptDocument] if the stored document cannot be
    /// decoded, or another [StoreError] if the store cannot be reached.
    fn get(&self, id: &str) -> Result<Option<Document>, StoreError>;

    /// Add a new document with a freshly assigned ID.
    fn add(&self, fields: Fields) -> Result<Document, StoreError>;

    /// Merge `fields` into the existing document with `id`.
    ///
    /// Fields in `fields` overwrite the stored values, other stored fields
    /// are kept.
    ///
    /// # Errors
    /// Returns [StoreError::DocumentNotFound] if there is no document with `id`.
    fn update(&self, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete the document with `id`.
    ///
    /// Deleting a document that does not exist is not an error.
    fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Retrieve the documents selected by `query`.
    ///
    /// Documents that cannot be decoded are skipped.
    fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;
}
