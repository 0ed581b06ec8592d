//! Extracts the caller's user ID from request headers.

use axum::http::{HeaderName, HeaderValue};
use axum_extra::{
    TypedHeader,
    headers::{Error as HeaderError, Header},
};

static USER_ID_HEADER: HeaderName = HeaderName::from_static("x-user-id");

/// `TypedHeader` for the ID of the user making a request.
///
/// Requests may contain an "X-User-Id" header naming the user that owns the
/// expenses being read or changed. There is no authentication, the header is
/// trusted as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdHeader(pub String);

impl Header for UserIdHeader {
    fn name() -> &'static HeaderName {
        &USER_ID_HEADER
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, HeaderError>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(HeaderError::invalid)?;
        let Ok(value) = value.to_str() else {
            return Err(HeaderError::invalid());
        };

        Ok(UserIdHeader(value.to_owned()))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        match HeaderValue::from_str(&self.0) {
            Ok(value) => values.extend(std::iter::once(value)),
            Err(_) => tracing::error!("failed to encode x-user-id header"),
        }
    }
}

/// The owner ID for a request, `None` if the header is missing or blank.
pub fn owner_id(header: Option<TypedHeader<UserIdHeader>>) -> Option<String> {
    header
        .map(|TypedHeader(UserIdHeader(user_id))| user_id.trim().to_owned())
        .filter(|user_id| !user_id.is_empty())
}
