//! HTTP mapping for domain errors.
//!
//! Gate denials become `303 See Other` redirects so browsers land on the
//! login page, role selection, or the actor's own dashboard. Everything else
//! is a JSON error payload. Store and provider failures are redacted to a
//! fixed message; the trace id in the payload and header ties the response
//! back to the logged detail.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use serde_json::Value;
use tracing::error;

use crate::domain::{CHOOSE_ROLE_PATH, Error, ErrorCode, LOGIN_PATH, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Landing path used when a role mismatch carries no explicit target.
const DASHBOARD_FALLBACK: &str = "/dashboard";

const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable. Please try again.";
const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::Unauthorized | ErrorCode::ProfileIncomplete | ErrorCode::RoleMismatch => {
            StatusCode::SEE_OTHER
        }
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Redirect target for gate denials.
fn location_for(error: &Error) -> Option<String> {
    let detail_target = || {
        error
            .details()
            .and_then(|details| details.get("redirect"))
            .and_then(Value::as_str)
            .filter(|path| path.starts_with('/') && !path.starts_with("//"))
            .map(str::to_owned)
    };
    match error.code() {
        ErrorCode::Unauthorized => Some(LOGIN_PATH.to_owned()),
        ErrorCode::ProfileIncomplete => Some(CHOOSE_ROLE_PATH.to_owned()),
        ErrorCode::RoleMismatch => {
            Some(detail_target().unwrap_or_else(|| DASHBOARD_FALLBACK.to_owned()))
        }
        _ => None,
    }
}

fn redact(error: &Error) -> Error {
    let replacement = match error.code() {
        ErrorCode::ServiceUnavailable => Error::service_unavailable(UNAVAILABLE_MESSAGE),
        ErrorCode::InternalError => Error::internal(INTERNAL_MESSAGE),
        _ => return error.clone(),
    };
    match error.trace_id() {
        Some(id) => replacement.with_trace_id(id.to_owned()),
        None => replacement,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        if let Some(location) = location_for(self) {
            builder.insert_header((header::LOCATION, location));
        }
        builder.json(redact(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(INTERNAL_MESSAGE)
    }
}
