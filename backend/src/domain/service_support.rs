//! Shared mapping from driven-port errors to domain errors.
//!
//! Connection failures become `service_unavailable`; everything else is an
//! internal error. Messages carry the adapter detail for logs and are redacted
//! at the HTTP boundary.

use tracing::error;

use super::Error;
use super::ports::{
    BlobStoreError, IdentityProviderError, LessonRepositoryError, ProfileRepositoryError,
    ProgressRepositoryError,
};

pub(crate) fn map_profile_error(err: ProfileRepositoryError) -> Error {
    error!(error = %err, kind = err.kind(), "profile repository failure");
    match err {
        ProfileRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("profile repository unavailable: {message}"))
        }
        ProfileRepositoryError::Query { message } | ProfileRepositoryError::Corrupt { message } => {
            Error::internal(format!("profile repository error: {message}"))
        }
    }
}

pub(crate) fn map_lesson_error(err: LessonRepositoryError) -> Error {
    error!(error = %err, kind = err.kind(), "lesson repository failure");
    match err {
        LessonRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("lesson repository unavailable: {message}"))
        }
        LessonRepositoryError::Query { message } | LessonRepositoryError::Corrupt { message } => {
            Error::internal(format!("lesson repository error: {message}"))
        }
    }
}

pub(crate) fn map_progress_error(err: ProgressRepositoryError) -> Error {
    error!(error = %err, kind = err.kind(), "progress repository failure");
    match err {
        ProgressRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("progress repository unavailable: {message}"))
        }
        ProgressRepositoryError::Query { message }
        | ProgressRepositoryError::Corrupt { message } => {
            Error::internal(format!("progress repository error: {message}"))
        }
    }
}

pub(crate) fn map_blob_error(err: BlobStoreError) -> Error {
    error!(error = %err, kind = err.kind(), "blob store failure");
    Error::internal(format!("asset upload failed: {err}"))
}

/// Map a provider failure on an auth path to a fixed user-facing message.
///
/// Rejections become an `invalid_request` carrying only `public_message`, so
/// the client cannot tell which check failed; outages become
/// `service_unavailable`.
pub(crate) fn map_identity_error(err: &IdentityProviderError, public_message: &str) -> Error {
    match err {
        IdentityProviderError::Rejected { .. } => {
            tracing::info!(error = %err, "identity provider rejected request");
            Error::invalid_request(public_message)
        }
        IdentityProviderError::Unavailable { .. } | IdentityProviderError::Decode { .. } => {
            error!(error = %err, kind = err.kind(), "identity provider failure");
            Error::service_unavailable(public_message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(ProfileRepositoryError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(ProfileRepositoryError::query("syntax"), ErrorCode::InternalError)]
    #[case(ProfileRepositoryError::corrupt("role"), ErrorCode::InternalError)]
    fn profile_errors_map_by_kind(#[case] err: ProfileRepositoryError, #[case] code: ErrorCode) {
        assert_eq!(map_profile_error(err).code(), code);
    }

    #[test]
    fn identity_rejections_use_the_public_message() {
        let err = IdentityProviderError::rejected("Email not confirmed for ada@example.com");
        let mapped = map_identity_error(&err, "Invalid login credentials.");
        assert_eq!(mapped.code(), ErrorCode::InvalidRequest);
        assert_eq!(mapped.message(), "Invalid login credentials.");
    }

    #[test]
    fn identity_outages_are_unavailable() {
        let err = IdentityProviderError::unavailable("connect timeout");
        let mapped = map_identity_error(&err, "Invalid login credentials.");
        assert_eq!(mapped.code(), ErrorCode::ServiceUnavailable);
        assert!(!mapped.message().contains("timeout"));
    }
}
