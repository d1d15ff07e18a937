//! Request field validation shared by the HTTP handlers.

use serde_json::{Value, json};

use crate::domain::{AuthValidationError, Error, LessonId, UserId};

/// Machine-readable codes for request field failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldErrorCode {
    MissingField,
    InvalidUuid,
    InvalidEmail,
    PasswordTooShort,
    PasswordMismatch,
    InvalidRole,
    InvalidNote,
    InvalidSort,
}

impl FieldErrorCode {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidEmail => "invalid_email",
            Self::PasswordTooShort => "password_too_short",
            Self::PasswordMismatch => "password_mismatch",
            Self::InvalidRole => "invalid_role",
            Self::InvalidNote => "invalid_note",
            Self::InvalidSort => "invalid_sort",
        }
    }
}

/// Name of the offending request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const LESSON_ID: FieldName = FieldName::new("lessonId");
pub(crate) const STUDENT_ID: FieldName = FieldName::new("studentId");

/// `invalid_request` naming `field` and `code`.
pub(crate) fn field_error(
    field: FieldName,
    code: FieldErrorCode,
    message: impl Into<String>,
) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

/// Same as [`field_error`] but echoes the submitted value.
pub(crate) fn field_error_with_value(
    field: FieldName,
    code: FieldErrorCode,
    message: impl Into<String>,
    value: &str,
) -> Error {
    field_error(field, code, message).with_detail("value", Value::String(value.to_owned()))
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    field_error(
        field,
        FieldErrorCode::MissingField,
        format!("missing required field: {name}"),
    )
}

fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    field_error_with_value(
        field,
        FieldErrorCode::InvalidUuid,
        format!("{name} must be a valid UUID"),
        value,
    )
}

/// Parse a lesson id from a body field or path segment.
pub(crate) fn parse_lesson_id(raw: Option<&str>, field: FieldName) -> Result<LessonId, Error> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| missing_field_error(field))?;
    raw.parse().map_err(|_| invalid_uuid_error(field, raw))
}

/// Parse a user id from a body field.
pub(crate) fn parse_user_id(raw: Option<&str>, field: FieldName) -> Result<UserId, Error> {
    let raw = raw
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| missing_field_error(field))?;
    UserId::new(raw).map_err(|_| invalid_uuid_error(field, raw))
}

/// Map credential validation failures onto the form field they concern.
pub(crate) fn auth_validation_error(err: &AuthValidationError) -> Error {
    let (field, code) = match err {
        AuthValidationError::Email(_) => ("email", FieldErrorCode::InvalidEmail),
        AuthValidationError::EmptyPassword => ("password", FieldErrorCode::MissingField),
        AuthValidationError::PasswordTooShort { .. } => {
            ("password", FieldErrorCode::PasswordTooShort)
        }
        AuthValidationError::PasswordMismatch => {
            ("confirmPassword", FieldErrorCode::PasswordMismatch)
        }
    };
    field_error(FieldName::new(field), code, err.to_string())
}
