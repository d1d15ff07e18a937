//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the schema mirrors in [`crate::inbound::http::schemas`], which describe
//! domain types without coupling them to utoipa. The document is served by
//! Swagger UI in debug builds and exported via `cargo run --bin openapi-dump`.

use crate::inbound::http::auth::{
    ChooseRoleRequest, EmailRequest, LoginRequest, MessageResponse, SignupRequest,
    UpdatePasswordRequest,
};
use crate::inbound::http::dashboard::{ParentDashboard, ProfileView};
use crate::inbound::http::schemas::{
    ErrorCodeSchema, ErrorSchema, LessonContentSchema, LessonFormSchema, LessonRosterSchema,
    LessonSchema, PageLinksSchema, ProfilePageSchema, ProfileSchema, ProgressRecordSchema,
    ProgressStatsSchema, ProgressStatusSchema, RoleSchema, RosterEntrySchema,
    StudentOverviewSchema, UpdateLessonSchema,
};
use crate::inbound::http::student::{LessonActionRequest, NoteRequest, StudentDashboard};
use crate::inbound::http::teacher::{StudentActionRequest, TeacherDashboard};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Cadence API",
        description = "Role-gated lesson catalogue, progress tracking, and authoring for music students and teachers."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::signup,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::choose_role,
        crate::inbound::http::auth::reset_password,
        crate::inbound::http::auth::update_password,
        crate::inbound::http::auth::resend_confirmation,
        crate::inbound::http::dashboard::landing,
        crate::inbound::http::dashboard::profile_page,
        crate::inbound::http::dashboard::parent,
        crate::inbound::http::student::student_dashboard,
        crate::inbound::http::student::start_lesson,
        crate::inbound::http::student::complete_lesson,
        crate::inbound::http::student::note_lesson,
        crate::inbound::http::teacher::teacher_dashboard,
        crate::inbound::http::teacher::create_lesson,
        crate::inbound::http::teacher::update_lesson,
        crate::inbound::http::teacher::toggle_publish,
        crate::inbound::http::teacher::delete_lesson,
        crate::inbound::http::teacher::owned_lesson,
        crate::inbound::http::teacher::upload_asset,
        crate::inbound::http::teacher::lesson_roster,
        crate::inbound::http::teacher::mark_student_complete,
        crate::inbound::http::teacher::reset_student_progress,
        crate::inbound::http::admin::users,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RoleSchema,
        ProfileSchema,
        LessonSchema,
        LessonContentSchema,
        LessonFormSchema,
        UpdateLessonSchema,
        ProgressStatusSchema,
        ProgressRecordSchema,
        ProgressStatsSchema,
        RosterEntrySchema,
        LessonRosterSchema,
        StudentOverviewSchema,
        PageLinksSchema,
        ProfilePageSchema,
        LoginRequest,
        SignupRequest,
        ChooseRoleRequest,
        EmailRequest,
        UpdatePasswordRequest,
        MessageResponse,
        LessonActionRequest,
        NoteRequest,
        StudentActionRequest,
        ProfileView,
        ParentDashboard,
        StudentDashboard,
        TeacherDashboard,
    )),
    tags(
        (name = "auth", description = "Sign-in, sign-up, and password management"),
        (name = "dashboard", description = "Role-neutral dashboard pages"),
        (name = "student", description = "Lesson catalogue and progress for students"),
        (name = "teacher", description = "Lesson authoring and student oversight"),
        (name = "admin", description = "User directory"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
