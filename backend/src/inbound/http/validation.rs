//! Request validation failures rendered as `invalid_request` errors.
//!
//! Every failure names the offending `field` and a stable `code` in the
//! error details.

use serde_json::json;

use crate::domain::{AccountIdentifier, Error, IdentityValidationError};

/// Newtype wrapper for request field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    fn with_code(self, code: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code,
        }))
    }

    fn with_value(self, code: &str, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code,
        }))
    }
}

/// Signup field failures keep the domain's field and code names.
pub(crate) fn identity_validation_error(error: &IdentityValidationError) -> Error {
    ValidationError::new(error.field(), error.to_string()).with_code(error.code())
}

pub(crate) fn parse_account_id(value: &str, field: FieldName) -> Result<AccountIdentifier, Error> {
    value.parse().map_err(|_| {
        let field = field.as_str();
        ValidationError::new(field, format!("{field} must be an unsigned 64-bit integer"))
            .with_value("invalid_account_id", value)
    })
}

/// Absent means "use the default"; anything present must be a positive count.
pub(crate) fn parse_optional_limit(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<usize>, Error> {
    let Some(raw) = value else {
        return Ok(None);
    };
    match raw.trim().parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(Some(limit)),
        _ => {
            let field = field.as_str();
            Err(
                ValidationError::new(field, format!("{field} must be a positive integer"))
                    .with_value("invalid_limit", raw),
            )
        }
    }
}
