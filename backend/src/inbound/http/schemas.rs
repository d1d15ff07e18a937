//! OpenAPI schemas for domain types.
//!
//! Domain types stay free of `ToSchema`; these mirrors describe their wire
//! shape and are published under the domain type's name. Handlers reference
//! the mirrors in their `#[utoipa::path]` response bodies.

#![expect(dead_code, reason = "schema mirrors exist only for OpenAPI generation")]

use utoipa::ToSchema;

/// Stable machine-readable error codes.
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    #[schema(rename = "unauthorized")]
    Unauthorized,
    #[schema(rename = "profile_incomplete")]
    ProfileIncomplete,
    #[schema(rename = "role_mismatch")]
    RoleMismatch,
    #[schema(rename = "forbidden")]
    Forbidden,
    #[schema(rename = "not_found")]
    NotFound,
    #[schema(rename = "conflict")]
    Conflict,
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    #[schema(rename = "internal_error")]
    InternalError,
}

/// Error payload returned by every endpoint.
#[derive(ToSchema)]
#[schema(as = Error, rename_all = "camelCase")]
pub struct ErrorSchema {
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    #[schema(example = "title is required")]
    message: String,
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Field, code, submitted values, or redirect target.
    details: Option<serde_json::Value>,
}

/// Account role.
#[derive(ToSchema)]
#[schema(as = Role, rename_all = "snake_case")]
pub enum RoleSchema {
    Student,
    Teacher,
    Parent,
    Admin,
}

/// Profile attached to an identity.
#[derive(ToSchema)]
#[schema(as = Profile, rename_all = "camelCase")]
pub struct ProfileSchema {
    #[schema(format = Uuid)]
    id: String,
    email: Option<String>,
    role: Option<RoleSchema>,
    #[schema(example = "piano")]
    instrument: Option<String>,
    full_name: String,
    avatar_url: Option<String>,
    #[schema(format = DateTime)]
    created_at: String,
}

/// Lesson body. `type` is `text` or `asset`; text lessons carry `body`,
/// asset lessons carry `kind`, `url`, and `path`.
#[derive(ToSchema)]
#[schema(as = LessonContent)]
pub struct LessonContentSchema {
    #[schema(example = "text")]
    r#type: String,
    body: Option<String>,
    #[schema(example = "pdf")]
    kind: Option<String>,
    url: Option<String>,
    path: Option<String>,
}

/// Lesson authored by a teacher.
#[derive(ToSchema)]
#[schema(as = Lesson, rename_all = "camelCase")]
pub struct LessonSchema {
    #[schema(format = Uuid)]
    id: String,
    #[schema(format = Uuid)]
    teacher_id: String,
    title: String,
    description: String,
    instrument: String,
    order_index: i32,
    published: bool,
    content: LessonContentSchema,
    #[schema(format = DateTime)]
    created_at: String,
    #[schema(format = DateTime)]
    updated_at: String,
}

/// Progress lifecycle.
#[derive(ToSchema)]
#[schema(as = ProgressStatus, rename_all = "snake_case")]
pub enum ProgressStatusSchema {
    NotStarted,
    InProgress,
    Completed,
}

/// One student's progress on one lesson.
#[derive(ToSchema)]
#[schema(as = ProgressRecord, rename_all = "camelCase")]
pub struct ProgressRecordSchema {
    #[schema(format = Uuid)]
    user_id: String,
    #[schema(format = Uuid)]
    lesson_id: String,
    status: ProgressStatusSchema,
    #[schema(format = DateTime)]
    last_viewed_at: Option<String>,
    notes: Option<String>,
}

/// Student dashboard payload.
#[derive(ToSchema)]
#[schema(as = StudentOverview, rename_all = "camelCase")]
pub struct StudentOverviewSchema {
    lessons: Vec<LessonSchema>,
    progress: Vec<ProgressRecordSchema>,
    /// Lessons with a higher order index are locked.
    unlocked_index: i32,
}

/// Per-status counts.
#[derive(ToSchema)]
#[schema(as = ProgressStats, rename_all = "camelCase")]
pub struct ProgressStatsSchema {
    total: u64,
    completed: u64,
    in_progress: u64,
    not_started: u64,
}

/// Roster line: profile fields plus the flattened progress record.
#[derive(ToSchema)]
#[schema(as = RosterEntry, rename_all = "camelCase")]
pub struct RosterEntrySchema {
    #[schema(format = Uuid)]
    user_id: String,
    #[schema(example = "Unknown")]
    full_name: String,
    #[schema(example = "N/A")]
    email: String,
    #[schema(format = Uuid)]
    lesson_id: String,
    status: ProgressStatusSchema,
    #[schema(format = DateTime)]
    last_viewed_at: Option<String>,
    notes: Option<String>,
}

/// Progress of every student on one lesson.
#[derive(ToSchema)]
#[schema(as = LessonRoster)]
pub struct LessonRosterSchema {
    lesson: LessonSchema,
    entries: Vec<RosterEntrySchema>,
    stats: ProgressStatsSchema,
}

/// Links to neighbouring directory pages.
#[derive(ToSchema)]
#[schema(as = PageLinks)]
pub struct PageLinksSchema {
    #[schema(example = "/dashboard/admin/users?page=2")]
    current: String,
    previous: Option<String>,
    next: Option<String>,
}

/// One page of the user directory.
#[derive(ToSchema)]
#[schema(as = ProfilePage, rename_all = "camelCase")]
pub struct ProfilePageSchema {
    items: Vec<ProfileSchema>,
    page: u32,
    per_page: u32,
    total: u64,
    total_pages: u64,
    links: PageLinksSchema,
}

/// Lesson form as submitted by the authoring pages.
#[derive(ToSchema)]
#[schema(as = LessonForm)]
pub struct LessonFormSchema {
    #[schema(example = "C major scale")]
    title: String,
    description: String,
    /// `text`, `pdf`, `video`, or `docx`.
    #[schema(example = "text")]
    content_type: String,
    /// Required for text lessons.
    content_body: Option<String>,
    content_url: Option<String>,
    /// Falls back to 1 when missing or not a number.
    #[schema(example = "1")]
    order_index: Option<String>,
}

/// Lesson form for an existing lesson.
#[derive(ToSchema)]
#[schema(as = UpdateLessonForm)]
pub struct UpdateLessonSchema {
    #[schema(rename = "lessonId", format = Uuid)]
    lesson_id: String,
    title: String,
    description: String,
    content_type: String,
    content_body: Option<String>,
    content_url: Option<String>,
    order_index: Option<String>,
}
