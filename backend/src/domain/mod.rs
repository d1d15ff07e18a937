//! Domain primitives, services, and the ports they drive.
//!
//! Purpose: hold the role gating, lesson catalogue, progress state machine,
//! and authoring rules independent of HTTP and storage. Services receive the
//! resolved [`Identity`] or [`Profile`] explicitly and reach storage only
//! through the traits in [`ports`].
//!
//! Public surface:
//! - Error (alias to `error::Error`) with stable `ErrorCode`s.
//! - Identity, Profile, Role: who the actor is and what they may enter.
//! - Lesson, ProgressRecord: the catalogue and per-student progress.
//! - Services: `SessionResolver`, `ProfileGate`, `LessonCatalog`,
//!   `ProgressTracker`, `LessonAuthoringGate`, `UserDirectory`,
//!   `AccountService`.

pub mod account;
pub mod auth;
pub mod authoring;
pub mod catalog;
pub mod directory;
pub mod error;
pub mod lesson;
pub mod ports;
pub mod profile;
pub mod profile_gate;
pub mod progress;
pub mod progress_tracker;
pub mod role;
mod service_support;
pub mod session_resolver;
pub mod trace_id;
pub mod unlock;
pub mod user;

pub use self::account::AccountService;
pub use self::auth::{
    AccessToken, AuthSession, AuthValidationError, LoginCredentials, NewPassword, PASSWORD_MIN,
    Registration,
};
pub use self::authoring::{AssetUpload, LessonAuthoringGate, asset_path, lesson_validation_error};
pub use self::catalog::LessonCatalog;
pub use self::directory::{
    DIRECTORY_PAGE_SIZE, DirectoryQuery, SortDir, SortField, UnsupportedSort, UserDirectory,
};
pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::lesson::{
    AssetKind, ContentType, DEFAULT_ORDER_INDEX, Lesson, LessonContent, LessonDraft, LessonForm,
    LessonId, LessonParts, LessonValidationError,
};
pub use self::profile::{
    INSTRUMENT_MAX, Instrument, Profile, ProfileDraft, ProfileValidationError,
};
pub use self::profile_gate::{
    AccessDenial, CHOOSE_ROLE_PATH, DashboardArea, LOGIN_PATH, ProfileGate,
};
pub use self::progress::{
    FieldChange, LessonNote, NOTE_MAX, NoteValidationError, ProgressChange, ProgressRecord,
    ProgressStats, ProgressStatus, UnknownProgressStatus,
};
pub use self::progress_tracker::{LessonRoster, ProgressTracker, RosterEntry, StudentOverview};
pub use self::role::{Role, SelectableRole, UnknownRole};
pub use self::session_resolver::SessionResolver;
pub use self::trace_id::TraceId;
pub use self::unlock::next_unlocked_index;
pub use self::user::{EmailAddress, Identity, IdentityValidationError, UserId};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use cadence::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
