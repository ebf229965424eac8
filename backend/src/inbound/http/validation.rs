//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;

use crate::domain::Error;

/// Default page size for user listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;
/// Upper bound for the `limit` query parameter.
pub const MAX_LIST_LIMIT: i64 = 200;

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

pub(crate) fn invalid_field_error(
    field: FieldName,
    code: &'static str,
    message: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code,
    }))
}

/// Clamp a caller-supplied page size into the accepted range.
pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}
