//! Defines the app level error type and its conversion to JSON responses.

use std::{collections::BTreeMap, fmt::Display};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::document::StoreError;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// One or more fields of an expense failed validation.
    ///
    /// Each offending field is reported with its own message so that clients
    /// can display the errors next to the relevant inputs.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),

    /// The request body could not be parsed as JSON.
    #[error("could not parse the request body: {0}")]
    InvalidJson(String),

    /// The requested expense was not found.
    ///
    /// This error is also used when the caller does not own the expense so
    /// that callers cannot learn whether another user's expense exists.
    #[error("the requested expense could not be found")]
    NotFound,

    /// The document store could not complete a request.
    ///
    /// The inner error should only be logged on the server. Clients receive a
    /// generic internal server error.
    #[error("the document store is unavailable: {0}")]
    StoreUnavailable(StoreError),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl From<StoreError> for Error {
    fn from(value: StoreError) -> Self {
        tracing::error!("an unhandled document store error occurred: {}", value);
        Error::StoreUnavailable(value)
    }
}

/// The JSON body sent for errors that are not validation errors.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(errors) => {
                tracing::warn!("Validation failed: {errors}");
                (StatusCode::BAD_REQUEST, Json(errors)).into_response()
            }
            Error::InvalidJson(message) => {
                tracing::warn!("Rejected malformed request body: {message}");
                (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorBody { error: &message }),
                )
                    .into_response()
            }
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorBody {
                    error: "Expense not found",
                }),
            )
                .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                internal_server_error()
            }
        }
    }
}

/// The response sent when something went wrong on the server.
pub fn internal_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "An internal error occurred",
        }),
    )
        .into_response()
}

/// The response sent for routes that do not exist.
pub async fn get_404_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorBody { error: "Not found" })).into_response()
}

/// Validation messages keyed by the name of the offending field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    /// Record `message` for `field`, keeping the first message for a field.
    pub fn add(&mut self, field: &'static str, message: &str) {
        self.0.entry(field).or_insert_with(|| message.to_owned());
    }

    /// The message recorded for `field`, if any.
    #[cfg(test)]
    pub(crate) fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Whether no field has an error.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of fields with an error.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;

        for (field, message) in &self.0 {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }

        Ok(())
    }
}
